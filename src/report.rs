//! Turning a palette into something to look at: text lines and colour figures.

use crate::{naming::ColourNamer, Palette};
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{ImageError, ImageResult, Rgb, RgbImage};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_BAR_WIDTH: u32 = 300;
pub const DEFAULT_BAR_HEIGHT: u32 = 50;
pub const DEFAULT_CELL_SIZE: u32 = 200;

const GRID_COLUMNS: u32 = 2;
const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

// tiles smaller than this are left without labels
const MIN_LABELLED_CELL: u32 = 64;
const GLYPH_SIZE: u32 = 8;

/// One reported colour.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub rgb: (u8, u8, u8),
    pub hex: String,
    pub percentage: f64,
    pub name: String,
}

/// The palette's colours, most prominent first, each with a name.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    entries: Vec<ReportEntry>,
}

impl Report {
    /// Name every swatch of `palette`. The namer is asked once per swatch.
    pub fn new(palette: &Palette, namer: &dyn ColourNamer) -> Report {
        let entries = palette
            .swatches()
            .iter()
            .rev()
            .map(|swatch| {
                let hex = swatch.hex();
                let name = namer.name(&hex);

                ReportEntry {
                    rgb: swatch.rgb(),
                    hex,
                    percentage: swatch.percentage(),
                    name,
                }
            })
            .collect();

        Self { entries }
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// `#rrggbb 12.34% Name` for every entry.
    pub fn lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| format!("{} {}", entry.caption(), entry.name))
            .collect()
    }
}

impl ReportEntry {
    /// `#rrggbb 12.34%`, the first line of the entry's tile.
    pub fn caption(&self) -> String {
        format!("{} {:.2}%", self.hex, self.percentage)
    }
}

/// A strip of the palette's colours, least prominent on the left, each as wide as its share.
pub fn render_bar(palette: &Palette, width: u32, height: u32) -> RgbImage {
    let mut image = RgbImage::from_pixel(width, height, BACKGROUND);
    let swatches = palette.swatches();
    let mut start = 0.0;

    for (i, swatch) in swatches.iter().enumerate() {
        let end = start + swatch.fraction() * width as f64;

        // the shares may not add up to exactly one, so the last colour always reaches the edge
        let (from, to) = if i + 1 == swatches.len() {
            (start as u32, width)
        } else {
            (start as u32, (end as u32).min(width))
        };

        fill(&mut image, (from, 0), (to, height), swatch.rgb());
        start = end;
    }

    image
}

/// One square tile per report entry, most prominent first, two tiles to a row. Tiles of at least 64 pixels carry the
/// entry's hex code and percentage with its name below, in black or white depending on the tile's brightness.
pub fn render_grid(report: &Report, cell: u32) -> RgbImage {
    let count = report.entries().len() as u32;
    let rows = (count + GRID_COLUMNS - 1) / GRID_COLUMNS;
    let mut image = RgbImage::from_pixel(cell * GRID_COLUMNS, cell * rows.max(1), BACKGROUND);

    for (i, entry) in report.entries().iter().enumerate() {
        let i = i as u32;
        let (x, y) = ((i % GRID_COLUMNS) * cell, (i / GRID_COLUMNS) * cell);

        fill(&mut image, (x, y), (x + cell, y + cell), entry.rgb);

        if cell >= MIN_LABELLED_CELL {
            let scale = (cell / 128).max(1);
            let (left, middle, gap) = (x + cell / 10, y + cell / 2, 2 * scale);
            let colour = text_colour(entry.rgb);
            let bounds = (x + cell, y + cell);

            draw_text(&mut image, (left, middle - gap - GLYPH_SIZE * scale), &entry.caption(), scale, colour, bounds);
            draw_text(&mut image, (left, middle + gap), &entry.name, scale, colour, bounds);
        }
    }

    image
}

/// Where the figure for `input` goes: `<output_dir>/<input stem>_analysis.png`.
pub fn analysis_path(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_else(|| "image".into());

    output_dir.join(format!("{}_analysis.png", stem))
}

/// Write `image` to `path`, creating missing parent directories. The format follows the extension.
pub fn save(image: &RgbImage, path: &Path) -> ImageResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(ImageError::IoError)?;
    }

    debug!(path = %path.display(), "saving figure");
    image.save(path)
}

fn fill(image: &mut RgbImage, (x0, y0): (u32, u32), (x1, y1): (u32, u32), (r, g, b): (u8, u8, u8)) {
    for y in y0..y1 {
        for x in x0..x1 {
            image.put_pixel(x, y, Rgb([r, g, b]));
        }
    }
}

fn text_colour((r, g, b): (u8, u8, u8)) -> Rgb<u8> {
    let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;

    if luma > 140.0 {
        Rgb([0, 0, 0])
    } else {
        Rgb([255, 255, 255])
    }
}

/// Draw `text` with its top left corner at `(x0, y0)`, each glyph pixel `scale` pixels wide. Anything reaching past
/// `bounds` is clipped. Characters without a glyph are left blank.
fn draw_text(
    image: &mut RgbImage,
    (x0, y0): (u32, u32),
    text: &str,
    scale: u32,
    colour: Rgb<u8>,
    (x_max, y_max): (u32, u32),
) {
    let (x_max, y_max) = (x_max.min(image.width()), y_max.min(image.height()));

    for (i, c) in text.chars().enumerate() {
        let glyph = BASIC_FONTS.get(c).unwrap_or([0; 8]);
        let glyph_x = x0 + i as u32 * GLYPH_SIZE * scale;

        for (row, bits) in glyph.iter().enumerate() {
            for column in 0..GLYPH_SIZE {
                // the lowest bit is the leftmost pixel
                if bits & (1 << column) == 0 {
                    continue;
                }

                for dy in 0..scale {
                    for dx in 0..scale {
                        let x = glyph_x + column * scale + dx;
                        let y = y0 + row as u32 * scale + dy;

                        if x < x_max && y < y_max {
                            image.put_pixel(x, y, colour);
                        }
                    }
                }
            }
        }
    }
}
