use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colour_checker::{
    image::{io::Reader as ImageReader, GenericImageView},
    naming::{ColorNameCom, ColourNamer, Unnamed},
    report::{self, Report},
    ExtremesFilter, Init, Palette,
};
use std::path::PathBuf;
use tracing::{debug, info};

/// Report the dominant colours of an image with their share, hex code and name
#[derive(Parser, Debug)]
#[command(name = "colour-checker", version, about)]
struct Args {
    /// Image to analyze
    image: PathBuf,

    /// How many colours to extract
    #[arg(short = 'k', long, default_value_t = colour_checker::DEFAULT_CLUSTER_COUNT)]
    clusters: usize,

    /// Seed for reproducible clustering
    #[arg(long)]
    seed: Option<u64>,

    /// Upper bound on k-means iterations
    #[arg(long, default_value_t = colour_checker::DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,

    /// Stop once no centroid moves further than this
    #[arg(long, default_value_t = colour_checker::DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// How initial centroids are chosen
    #[arg(long, value_enum, default_value_t = InitArg::KmeansPlusPlus)]
    init: InitArg,

    /// Downscale images with more pixels than this before clustering (0 keeps every pixel)
    #[arg(long, default_value_t = colour_checker::DEFAULT_RESIZE_IMAGE_AREA)]
    resize_area: u32,

    /// Ignore near-black and near-white pixels
    #[arg(long)]
    ignore_extremes: bool,

    /// Don't look up colour names online
    #[arg(long)]
    no_names: bool,

    /// Save the colour figure into this directory instead of only printing
    #[arg(long)]
    save: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum InitArg {
    #[value(name = "kmeans++")]
    KmeansPlusPlus,
    Random,
}

impl From<InitArg> for Init {
    fn from(init: InitArg) -> Self {
        match init {
            InitArg::KmeansPlusPlus => Init::KMeansPlusPlus,
            InitArg::Random => Init::Random,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("{},reqwest=warn,hyper=warn", log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let image = ImageReader::open(&args.image)
        .with_context(|| format!("failed to open {}", args.image.display()))?
        .decode()
        .with_context(|| format!("failed to decode {}", args.image.display()))?;

    info!("analyzing {} ({}x{})", args.image.display(), image.width(), image.height());

    let mut builder = Palette::from_image(image)
        .clusters(args.clusters)
        .max_iterations(args.max_iterations)
        .tolerance(args.tolerance)
        .init(args.init.into())
        .resize_image_area(args.resize_area);

    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }

    if args.ignore_extremes {
        builder = builder.add_filter(ExtremesFilter);
    }

    let palette = builder.generate().context("failed to cluster image colours")?;

    if !palette.converged() {
        info!("clustering stopped after {} iterations without converging", palette.iterations());
    }

    for swatch in palette.swatches() {
        debug!("{:?} {:.2}%", swatch.centroid(), swatch.percentage());
    }

    let namer: Box<dyn ColourNamer> = if args.no_names {
        Box::new(Unnamed)
    } else {
        Box::new(ColorNameCom::new().context("failed to build the colour name client")?)
    };

    let report = Report::new(&palette, namer.as_ref());
    for line in report.lines() {
        println!("{}", line);
    }

    if let Some(output_dir) = args.save {
        let path = report::analysis_path(&args.image, &output_dir);
        let figure = report::render_grid(&report, report::DEFAULT_CELL_SIZE);

        report::save(&figure, &path).with_context(|| format!("failed to save {}", path.display()))?;
        info!("saved figure to {}", path.display());
    }

    Ok(())
}
