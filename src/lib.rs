// Copyright 2022 Spanfile
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A library to extract the dominant colours of an image.
//!
//! Every pixel is treated as a point in RGB space and the points are partitioned into a fixed number of clusters with
//! Lloyd's algorithm (k-means). Each cluster becomes a [`Swatch`]: its centroid colour and the share of the image it
//! covers. Swatches are ranked by ascending share, ties broken by cluster label, so a seeded run always reports the same
//! palette in the same order.
//!
//! ```no_run
//! use colour_checker::{image::io::Reader as ImageReader, Palette};
//!
//! let image = ImageReader::open("dress.jpeg")?.decode()?;
//! let palette = Palette::from_image(image).clusters(5).seed(42).generate()?;
//!
//! for swatch in palette.swatches().iter().rev() {
//!     println!("{} {:.2}%", swatch.hex(), swatch.percentage());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod filter;
mod histogram;
mod kmeans;
pub mod naming;
pub mod report;
mod swatch;

pub const DEFAULT_CLUSTER_COUNT: usize = 5;
pub const DEFAULT_RESIZE_IMAGE_AREA: u32 = 0;

pub use crate::{
    error::Error,
    filter::{ExtremesFilter, Filter},
    histogram::{population_counts, population_histogram, rank},
    kmeans::{Centroid, Clustering, Init, KMeans, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE},
    swatch::Swatch,
};
pub use image;
pub use palette;

use image::{DynamicImage, RgbImage};
use palette::IntoColor;
use tracing::debug;

/// One pixel's colour as red, green and blue intensities.
pub type ColourVector = (u8, u8, u8);

/// The dominant colours of an image, ranked by ascending share.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Palette {
    swatches: Vec<Swatch>,
    iterations: usize,
    converged: bool,
    sample_count: usize,
}

pub struct PaletteBuilder {
    source: Source,
    kmeans: KMeans,
    resize_area: u32,
    filters: Vec<Box<dyn Filter>>,
}

enum Source {
    Image(RgbImage),
    Vectors(Vec<ColourVector>),
}

impl Palette {
    pub fn from_image<I>(image: I) -> PaletteBuilder
    where
        I: Into<DynamicImage>,
    {
        PaletteBuilder::from_image(image)
    }

    pub fn from_vectors(vectors: Vec<ColourVector>) -> PaletteBuilder {
        PaletteBuilder::from_vectors(vectors)
    }

    /// Build a palette out of a finished clustering run.
    pub fn from_clustering(clustering: &Clustering) -> Palette {
        Self {
            swatches: clustering.ranked(),
            iterations: clustering.iterations(),
            converged: clustering.converged(),
            sample_count: clustering.assignments().len(),
        }
    }

    /// The swatches, least prominent first.
    pub fn swatches(&self) -> &[Swatch] {
        &self.swatches
    }

    /// The swatch covering the largest share of the image.
    pub fn dominant_swatch(&self) -> Option<Swatch> {
        self.swatches.last().copied()
    }

    pub fn most_prominent_color(&self) -> Option<(u8, u8, u8)> {
        self.dominant_swatch().map(|swatch| swatch.rgb())
    }

    /// The `#rrggbb` code of every swatch, least prominent first.
    pub fn hex_codes(&self) -> Vec<String> {
        self.swatches.iter().map(|swatch| swatch.hex()).collect()
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn converged(&self) -> bool {
        self.converged
    }

    /// How many colour vectors were clustered, after filtering.
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }
}

impl PaletteBuilder {
    /// Accepts any decoded image or image buffer. RGB8 images are taken as they are, everything else is converted.
    pub fn from_image<I>(image: I) -> Self
    where
        I: Into<DynamicImage>,
    {
        Self::new(Source::Image(image.into().into_rgb8()))
    }

    pub fn from_vectors(vectors: Vec<ColourVector>) -> Self {
        Self::new(Source::Vectors(vectors))
    }

    fn new(source: Source) -> Self {
        Self {
            source,
            kmeans: KMeans::new(DEFAULT_CLUSTER_COUNT),
            resize_area: DEFAULT_RESIZE_IMAGE_AREA,
            filters: Vec::new(),
        }
    }

    pub fn clusters(self, clusters: usize) -> Self {
        Self {
            kmeans: self.kmeans.clusters(clusters),
            ..self
        }
    }

    pub fn seed(self, seed: u64) -> Self {
        Self {
            kmeans: self.kmeans.seed(seed),
            ..self
        }
    }

    pub fn max_iterations(self, max_iterations: usize) -> Self {
        Self {
            kmeans: self.kmeans.max_iterations(max_iterations),
            ..self
        }
    }

    pub fn tolerance(self, tolerance: f64) -> Self {
        Self {
            kmeans: self.kmeans.tolerance(tolerance),
            ..self
        }
    }

    pub fn init(self, init: Init) -> Self {
        Self {
            kmeans: self.kmeans.init(init),
            ..self
        }
    }

    /// Downscale images larger than `resize_area` pixels before clustering. Zero disables downscaling. Has no effect on
    /// builders made from colour vectors.
    pub fn resize_image_area(self, resize_area: u32) -> Self {
        Self { resize_area, ..self }
    }

    pub fn add_filter<F>(mut self, filter: F) -> Self
    where
        F: Filter + 'static,
    {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn clear_filters(self) -> Self {
        Self {
            filters: Vec::new(),
            ..self
        }
    }

    pub fn generate(self) -> Result<Palette, Error> {
        let Self {
            source,
            kmeans,
            resize_area,
            filters,
        } = self;

        let vectors: Vec<ColourVector> = match source {
            Source::Image(image) => scale_image_down(image, resize_area)
                .pixels()
                .map(|pixel| (pixel.0[0], pixel.0[1], pixel.0[2]))
                .collect(),
            Source::Vectors(vectors) => vectors,
        };

        let extracted = vectors.len();
        let vectors = if filters.is_empty() {
            vectors
        } else {
            vectors
                .into_iter()
                .filter(|&rgb| {
                    let hsl = rgb_to_hsl(rgb);
                    filters.iter().all(|filter| filter.is_allowed(rgb, hsl))
                })
                .collect()
        };

        debug!(extracted, kept = vectors.len(), k = kmeans.k(), "clustering colour vectors");

        let clustering = kmeans.run(&vectors)?;
        Ok(Palette::from_clustering(&clustering))
    }
}

fn scale_image_down(image: RgbImage, resize_area: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    let area = width as u64 * height as u64;

    let scale_ratio = if resize_area > 0 && area > resize_area as u64 {
        (resize_area as f32 / area as f32).sqrt()
    } else {
        0.0
    };

    if scale_ratio > 0.0 {
        debug!(width, height, scale_ratio, "scaling image down");

        image::imageops::resize(
            &image,
            (width as f32 * scale_ratio).ceil() as u32,
            (height as f32 * scale_ratio).ceil() as u32,
            image::imageops::FilterType::Nearest,
        )
    } else {
        image
    }
}

fn rgb_to_hsl(rgb: (u8, u8, u8)) -> (f32, f32, f32) {
    let raw = palette::Srgb::from_components(rgb);
    let raw_float: palette::Srgb<f32> = raw.into_format();
    let hsl: palette::Hsl = raw_float.into_color();
    let (h, s, l) = hsl.into_components();

    (h.into_positive_degrees(), s, l)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba, RgbaImage};

    #[test]
    fn palette_from_vectors() {
        let palette = Palette::from_vectors(vec![(0, 0, 0), (0, 0, 0), (255, 255, 255)])
            .clusters(2)
            .seed(1)
            .generate()
            .unwrap();

        assert_eq!(palette.hex_codes(), vec!["#ffffff", "#000000"]);
        assert_eq!(palette.most_prominent_color(), Some((0, 0, 0)));
        assert_eq!(palette.sample_count(), 3);
    }

    #[test]
    fn palette_from_rgba_image() {
        let image = RgbaImage::from_fn(4, 4, |x, _| {
            if x < 3 {
                Rgba([200, 10, 10, 255])
            } else {
                Rgba([10, 10, 200, 255])
            }
        });

        let palette = Palette::from_image(image).clusters(2).seed(5).generate().unwrap();
        let dominant = palette.dominant_swatch().unwrap();

        assert_eq!(dominant.rgb(), (200, 10, 10));
        assert!((dominant.fraction() - 0.75).abs() < 1e-9);
        assert_eq!(palette.swatches()[0].rgb(), (10, 10, 200));
    }

    #[test]
    fn palette_from_decoded_image() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_fn(3, 2, |_, y| {
            if y == 0 {
                Rgb([40, 200, 90])
            } else {
                Rgb([240, 220, 20])
            }
        }));

        let palette = Palette::from_image(image).clusters(2).seed(3).generate().unwrap();

        // both colours cover half the image, so their order depends on the labels they drew
        let mut hex_codes = palette.hex_codes();
        hex_codes.sort();

        assert_eq!(palette.sample_count(), 6);
        assert_eq!(hex_codes, vec!["#28c85a", "#f0dc14"]);
    }

    #[test]
    fn filters_drop_pixels() {
        let image = RgbImage::from_fn(10, 1, |x, _| {
            if x < 6 {
                Rgb([255, 255, 255])
            } else {
                Rgb([30, 90, 160])
            }
        });

        let palette = Palette::from_image(image)
            .clusters(1)
            .add_filter(ExtremesFilter)
            .generate()
            .unwrap();

        assert_eq!(palette.sample_count(), 4);
        assert_eq!(palette.hex_codes(), vec!["#1e5aa0"]);
    }

    #[test]
    fn everything_filtered_is_empty_input() {
        let result = Palette::from_vectors(vec![(0, 0, 0); 8])
            .clusters(1)
            .add_filter(ExtremesFilter)
            .generate();

        assert_eq!(result, Err(Error::EmptyInput));
    }

    #[test]
    fn large_images_are_scaled_down() {
        let image = RgbImage::from_pixel(100, 50, Rgb([1, 2, 3]));
        let scaled = scale_image_down(image.clone(), 50 * 25);

        assert_eq!(scaled.dimensions(), (50, 25));
        assert_eq!(scale_image_down(image, 0).dimensions(), (100, 50));
    }

    #[test]
    fn invalid_cluster_count_from_builder() {
        let result = Palette::from_vectors(vec![(1, 1, 1)]).clusters(2).generate();

        assert_eq!(result, Err(Error::InvalidClusterCount { k: 2, n: 1 }));
    }
}
