const BLACK_MAX_LIGHTNESS: f32 = 0.05;
const WHITE_MIN_LIGHTNESS: f32 = 0.95;

/// A trait used to drop pixels before they are clustered.
///
/// Every colour vector taken from the image is offered to each filter of the builder, and it is clustered only if all
/// of them allow it. The same colour is given in both sRGB and HSL for convenience.
///
/// See [`crate::PaletteBuilder::add_filter`] on how to add filters.
pub trait Filter {
    fn is_allowed(&self, rgb: (u8, u8, u8), hsl: (f32, f32, f32)) -> bool;
}

/// Rejects colours very close to black and colours very close to white, so backgrounds and borders don't take up
/// clusters.
#[derive(Debug)]
pub struct ExtremesFilter;
impl Filter for ExtremesFilter {
    fn is_allowed(&self, _: (u8, u8, u8), (_, _, l): (f32, f32, f32)) -> bool {
        !is_black(l) && !is_white(l)
    }
}

fn is_black(l: f32) -> bool {
    l <= BLACK_MAX_LIGHTNESS
}

fn is_white(l: f32) -> bool {
    l >= WHITE_MIN_LIGHTNESS
}
