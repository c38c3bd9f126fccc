use crate::kmeans::Centroid;

/// One cluster of a palette: its centroid and how much of the image it covers.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Swatch {
    label: usize,
    red: f64,
    green: f64,
    blue: f64,
    population: usize,
    fraction: f64,
}

impl Swatch {
    pub fn new(label: usize, (red, green, blue): Centroid, population: usize, fraction: f64) -> Swatch {
        Self {
            label,
            red,
            green,
            blue,
            population,
            fraction,
        }
    }

    /// The cluster label this swatch was produced from.
    pub fn label(self) -> usize {
        self.label
    }

    pub fn centroid(self) -> Centroid {
        (self.red, self.green, self.blue)
    }

    /// The centroid as 8-bit colour. Channels are truncated toward zero.
    pub fn rgb(self) -> (u8, u8, u8) {
        (to_channel(self.red), to_channel(self.green), to_channel(self.blue))
    }

    /// The colour as `#rrggbb`.
    pub fn hex(self) -> String {
        let (r, g, b) = self.rgb();
        format!("#{:x}", palette::Srgb::new(r, g, b))
    }

    pub fn hsl(self) -> (f32, f32, f32) {
        crate::rgb_to_hsl(self.rgb())
    }

    pub fn population(self) -> usize {
        self.population
    }

    /// Share of the clustered pixels in this swatch, in `[0, 1]`.
    pub fn fraction(self) -> f64 {
        self.fraction
    }

    pub fn percentage(self) -> f64 {
        self.fraction * 100.0
    }
}

fn to_channel(value: f64) -> u8 {
    value.clamp(0.0, 255.0) as u8
}
