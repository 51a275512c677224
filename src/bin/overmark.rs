use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use overmark::{
    Anchor, Canvas, Color, Engine, EngineOpts, FontOpts, Layer, LayerKind, LayerOrder,
    PremulImage, ProcessingJob, RasterOpts, Rasterizer, TiledKind, VideoOpts, compose,
    probe_video,
};

#[derive(Parser, Debug)]
#[command(name = "overmark", version, about = "Stamp watermark layers onto images and videos")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watermark an image or video.
    Apply(ApplyArgs),
    /// Rasterize one layer onto a transparent PNG (preview).
    RenderLayer(RenderLayerArgs),
    /// Print a video's size and whether it has audio (requires `ffprobe`).
    Probe(ProbeArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Text,
    Logo,
    Tiled,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TiledArg {
    Text,
    Logo,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OrderArg {
    /// Tiled, then text, then logo.
    Priority,
    /// Job order.
    Input,
}

/// One layer described on the command line.
#[derive(Args, Debug)]
struct LayerArgs {
    /// Layer kind.
    #[arg(long = "type", value_enum, default_value_t = KindArg::Text)]
    kind: KindArg,

    /// What a tiled layer repeats.
    #[arg(long = "tiled-type", value_enum, default_value_t = TiledArg::Text)]
    tiled_kind: TiledArg,

    /// Text for text kinds.
    #[arg(long)]
    text: Option<String>,

    /// Text color (`#RRGGBB`, `#RRGGBBAA`, a CSS name such as `red`, or `rgb(..)`).
    #[arg(long)]
    color: Option<Color>,

    /// Size as a percentage of the canvas width.
    #[arg(long)]
    size: Option<f64>,

    /// Opacity, 0 to 100.
    #[arg(long)]
    opacity: Option<f64>,

    /// Horizontal center, percent of width.
    #[arg(long)]
    x: Option<f64>,

    /// Vertical center, percent of height.
    #[arg(long)]
    y: Option<f64>,

    /// Logo image for logo kinds.
    #[arg(long)]
    logo: Option<PathBuf>,
}

impl LayerArgs {
    fn to_layer(&self) -> Layer {
        let defaults = Layer::default();
        Layer {
            kind: match self.kind {
                KindArg::Text => LayerKind::Text,
                KindArg::Logo => LayerKind::Logo,
                KindArg::Tiled => LayerKind::Tiled,
            },
            tiled_kind: match self.tiled_kind {
                TiledArg::Text => TiledKind::Text,
                TiledArg::Logo => TiledKind::Logo,
            },
            text: self.text.clone().unwrap_or(defaults.text),
            color: self.color.unwrap_or(defaults.color),
            size_pct: self.size.unwrap_or(defaults.size_pct),
            opacity_pct: self.opacity.unwrap_or(defaults.opacity_pct),
            anchor: Anchor::new(
                self.x.unwrap_or(defaults.anchor.x_pct),
                self.y.unwrap_or(defaults.anchor.y_pct),
            ),
            asset_path: self.logo.clone(),
        }
    }
}

#[derive(Args, Debug)]
struct FontArgs {
    /// Extra font file to load (repeatable).
    #[arg(long = "font")]
    font_files: Vec<PathBuf>,

    /// Skip system fonts and use only `--font` files.
    #[arg(long, default_value_t = false)]
    no_system_fonts: bool,
}

impl FontArgs {
    fn raster_opts(&self) -> RasterOpts {
        RasterOpts {
            fonts: FontOpts {
                load_system_fonts: !self.no_system_fonts,
                font_files: self.font_files.clone(),
                ..FontOpts::default()
            },
            ..RasterOpts::default()
        }
    }
}

#[derive(Parser, Debug)]
struct ApplyArgs {
    /// Source image or video.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Layer settings JSON (`{"layers":[...]}` or one layer); replaces the layer flags.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Output file.
    #[arg(long, conflicts_with = "out_dir")]
    out: Option<PathBuf>,

    /// Directory for a generated output name.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    #[command(flatten)]
    layer: LayerArgs,

    #[command(flatten)]
    fonts: FontArgs,

    /// Layer stacking order for videos.
    #[arg(long, value_enum, default_value_t = OrderArg::Priority)]
    order: OrderArg,

    /// `ffmpeg` executable.
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// `ffprobe` executable.
    #[arg(long, default_value = "ffprobe")]
    ffprobe: PathBuf,

    /// Video codec passed to ffmpeg as `-c:v`.
    #[arg(long)]
    video_codec: Option<String>,

    /// Directory for intermediate layer images.
    #[arg(long)]
    temp_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderLayerArgs {
    /// Canvas width in pixels.
    #[arg(long)]
    width: u32,

    /// Canvas height in pixels.
    #[arg(long)]
    height: u32,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    layer: LayerArgs,

    #[command(flatten)]
    fonts: FontArgs,
}

#[derive(Parser, Debug)]
struct ProbeArgs {
    /// Source video.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// `ffprobe` executable.
    #[arg(long, default_value = "ffprobe")]
    ffprobe: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Apply(args) => cmd_apply(args),
        Command::RenderLayer(args) => cmd_render_layer(args),
        Command::Probe(args) => cmd_probe(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_job(args: &ApplyArgs) -> anyhow::Result<ProcessingJob> {
    let Some(settings) = &args.settings else {
        return Ok(ProcessingJob::new(&args.in_path, vec![args.layer.to_layer()]));
    };
    let json = std::fs::read_to_string(settings)
        .with_context(|| format!("read settings '{}'", settings.display()))?;
    let base = settings.parent().unwrap_or_else(|| Path::new("."));
    Ok(ProcessingJob::from_settings_json(&args.in_path, &json)?.resolve_assets_against(base))
}

fn cmd_apply(args: ApplyArgs) -> anyhow::Result<()> {
    let job = load_job(&args)?;
    let opts = EngineOpts {
        raster: args.fonts.raster_opts(),
        video: VideoOpts {
            ffmpeg_bin: args.ffmpeg.clone(),
            ffprobe_bin: args.ffprobe.clone(),
            temp_dir: args.temp_dir.clone(),
            layer_order: match args.order {
                OrderArg::Priority => LayerOrder::TypePriority,
                OrderArg::Input => LayerOrder::Input,
            },
            video_codec: args.video_codec.clone(),
            ..VideoOpts::default()
        },
    };
    let engine = Engine::new(&opts)?;

    let out = match (&args.out, &args.out_dir) {
        (Some(out), _) => {
            engine.process_to(&job, out)?;
            out.clone()
        }
        (None, dir) => engine.process(&job, dir.as_deref().unwrap_or_else(|| Path::new(".")))?,
    };

    println!("{}", out.display());
    Ok(())
}

fn cmd_render_layer(args: RenderLayerArgs) -> anyhow::Result<()> {
    let layer = args.layer.to_layer();
    layer.validate()?;
    let canvas = Canvas::new(args.width, args.height)?;
    let rasterizer = Rasterizer::new(&args.fonts.raster_opts())?;

    let raster = rasterizer.rasterize(&layer, canvas)?;
    let mut out = PremulImage::transparent(canvas.width, canvas.height);
    compose(&mut out, std::slice::from_ref(&raster));

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    out.to_straight()?
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_probe(args: ProbeArgs) -> anyhow::Result<()> {
    let info = probe_video(&args.ffprobe, &args.in_path)?;
    println!(
        "{}x{} audio={} duration={:.3}s codec={}",
        info.canvas.width,
        info.canvas.height,
        if info.has_audio { "yes" } else { "no" },
        info.duration_sec,
        info.video_codec.as_deref().unwrap_or("unknown")
    );
    Ok(())
}
