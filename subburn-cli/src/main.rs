use std::path::{Path, PathBuf};
use std::sync::mpsc;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod serve;

#[derive(Parser, Debug)]
#[command(name = "subburn", version)]
struct Cli {
    /// Export settings JSON; flags override its fields.
    #[arg(long, global = true, env = "SUBBURN_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the subtitle overlay at one instant as a PNG.
    Frame(FrameArgs),
    /// Burn subtitles into a video (tries each export strategy in turn).
    Export(ExportArgs),
    /// Convert subtitles between formats.
    Convert(ConvertArgs),
    /// List built-in style presets.
    Presets,
    /// Run the HTTP export service.
    Serve(ServeArgs),
}

#[derive(Parser, Debug)]
struct SubsArgs {
    /// Subtitles: a document JSON (`{language, style, segments}`), `.srt` or `.vtt`.
    #[arg(long)]
    subs: PathBuf,

    /// Replace the document style with a built-in preset.
    #[arg(long)]
    preset: Option<String>,

    /// Extra font files to make available to the renderer.
    #[arg(long = "font")]
    fonts: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    subs: SubsArgs,

    /// Playback time in seconds.
    #[arg(long)]
    time: f64,

    /// Draw over the frame of this video at `--time` instead of a transparent surface.
    #[arg(long)]
    video: Option<PathBuf>,

    /// Surface width when no video is given.
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Surface height when no video is given.
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    #[command(flatten)]
    subs: SubsArgs,

    /// Source video: a local path or an http(s) URL.
    #[arg(long)]
    video: String,

    /// Output path; the extension is corrected to the container produced.
    #[arg(long)]
    out: PathBuf,

    /// Base URL of an export service to try first.
    #[arg(long, env = "SUBBURN_EXPORT_URL")]
    export_url: Option<String>,

    /// Bearer token for the export service.
    #[arg(long, env = "SUBBURN_EXPORT_TOKEN", hide_env_values = true)]
    export_token: Option<String>,

    /// Directory for job workspaces.
    #[arg(long, env = "SUBBURN_TEMP_DIR")]
    temp_dir: Option<PathBuf>,

    /// Constant rate factor.
    #[arg(long)]
    crf: Option<u8>,

    /// Capture frame rate (frames per second).
    #[arg(long)]
    fps: Option<u32>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum FormatArg {
    Srt,
    Vtt,
    Ass,
    Txt,
    Json,
}

impl From<FormatArg> for subburn::SubtitleFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Srt => Self::Srt,
            FormatArg::Vtt => Self::Vtt,
            FormatArg::Ass => Self::Ass,
            FormatArg::Txt => Self::Txt,
            FormatArg::Json => Self::Json,
        }
    }
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    #[command(flatten)]
    subs: SubsArgs,

    /// Target format.
    #[arg(long)]
    to: FormatArg,

    /// ASS play resolution width.
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// ASS play resolution height.
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Output file; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Listen address.
    #[arg(long, env = "SUBBURN_BIND")]
    bind: Option<String>,

    /// Directory for job workspaces.
    #[arg(long, env = "SUBBURN_TEMP_DIR")]
    temp_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let settings = match &cli.config {
        Some(p) => subburn::ExportSettings::from_path(p)?,
        None => subburn::ExportSettings::default(),
    };
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args, &settings),
        Command::Export(args) => cmd_export(args, settings),
        Command::Convert(args) => cmd_convert(args),
        Command::Presets => cmd_presets(),
        Command::Serve(args) => serve::run(args, settings),
    }
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load_document(args: &SubsArgs) -> anyhow::Result<subburn::Document> {
    let ext = args
        .subs
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let mut doc = match ext.as_str() {
        "srt" | "vtt" => {
            let text = std::fs::read_to_string(&args.subs)
                .with_context(|| format!("read subtitles '{}'", args.subs.display()))?;
            let segments = if ext == "srt" {
                subburn::format::srt::parse_srt(&text)?
            } else {
                subburn::format::vtt::parse_vtt(&text)?
            };
            subburn::Document::new(
                "en",
                subburn::Style::default(),
                subburn::Track::from_unsorted(segments)?,
            )
        }
        _ => subburn::Document::from_path(&args.subs)?,
    };
    if let Some(id) = &args.preset {
        let preset = subburn::preset(id)
            .with_context(|| format!("unknown preset \"{id}\" (see `subburn presets`)"))?;
        doc.style = preset.apply();
    }
    Ok(doc)
}

fn compositor(fonts: &[PathBuf]) -> anyhow::Result<subburn::Compositor> {
    let mut engine = subburn::TextLayoutEngine::new();
    for path in fonts {
        let families = engine.register_font_file(path)?;
        tracing::debug!(font = %path.display(), ?families, "registered font");
    }
    Ok(subburn::Compositor::with_engine(engine))
}

fn cmd_frame(args: FrameArgs, settings: &subburn::ExportSettings) -> anyhow::Result<()> {
    let doc = load_document(&args.subs)?;
    let mut surface = match &args.video {
        Some(video) => video_frame_at(video, args.time, settings)?,
        None => subburn::FrameRGBA::transparent(args.width, args.height),
    };

    let mut comp = compositor(&args.subs.fonts)?;
    let mut cursor = subburn::SegmentCursor::new();
    let outcome = comp.render_at(&mut surface, &doc.segments, &mut cursor, &doc.style, args.time)?;
    tracing::debug!(?outcome, t = args.time, "rendered frame");

    subburn::export::ffmpeg::ensure_parent_dir(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &surface.to_straight_rgba(),
        surface.width,
        surface.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn video_frame_at(
    video: &Path,
    t: f64,
    settings: &subburn::ExportSettings,
) -> anyhow::Result<subburn::FrameRGBA> {
    use subburn::export::media::{FrameReader, FrameSource as _, probe};

    let info = probe(&settings.ffprobe, video)?;
    let fps = settings.fps;
    let idx = subburn::FrameIndex((t.max(0.0) * fps.as_f64()).floor() as u64);
    let mut reader = FrameReader::new(settings.ffmpeg.clone(), info, fps);
    Ok(reader.frame_at(idx, t)?)
}

fn cmd_export(args: ExportArgs, mut settings: subburn::ExportSettings) -> anyhow::Result<()> {
    if args.export_url.is_some() {
        settings.remote_url = args.export_url.clone();
    }
    if args.export_token.is_some() {
        settings.remote_token = args.export_token.clone();
    }
    if args.temp_dir.is_some() {
        settings.temp_dir = args.temp_dir.clone();
    }
    if let Some(crf) = args.crf {
        settings.crf = crf;
    }
    if let Some(fps) = args.fps {
        settings.fps = subburn::Fps::new(fps, 1)?;
    }
    settings.validate()?;

    let doc = load_document(&args.subs)?;
    let source = if args.video.starts_with("http://") || args.video.starts_with("https://") {
        subburn::SourceMedia::Url(args.video.clone())
    } else {
        subburn::SourceMedia::File(PathBuf::from(&args.video))
    };
    let job = subburn::ExportJob::from_document(source, &doc, &args.out);

    let (tx, rx) = mpsc::channel();
    let control = subburn::ExportControl::new().with_progress(tx);
    let pipeline = subburn::ExportPipeline::from_settings(&settings);
    tracing::info!(strategies = ?pipeline.strategies(), "starting export");
    let handle = pipeline.spawn(job, control)?;

    for p in rx {
        eprint!("\r{}: {:>3}% ({}/{})", p.strategy, p.percent(), p.frames_done, p.frames_total);
    }
    eprintln!();

    let result = handle
        .join()
        .map_err(|_| anyhow::anyhow!("export worker panicked"))?;
    match result {
        Ok(artifact) => {
            eprintln!(
                "wrote {} ({}, via {})",
                artifact.path.display(),
                artifact.container.content_type(),
                artifact.strategy
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "export failed");
            anyhow::bail!("{}", e.category().user_message())
        }
    }
}

fn cmd_convert(args: ConvertArgs) -> anyhow::Result<()> {
    let doc = load_document(&args.subs)?;
    let play_res = subburn::Canvas::new(args.width, args.height);
    let text = subburn::format::render_format(args.to.into(), &doc, play_res)?;
    match &args.out {
        Some(out) => {
            subburn::export::ffmpeg::ensure_parent_dir(out)?;
            std::fs::write(out, text).with_context(|| format!("write '{}'", out.display()))?;
            eprintln!("wrote {}", out.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn cmd_presets() -> anyhow::Result<()> {
    for p in subburn::presets() {
        println!("{:<16} {:<16} {:?}", p.id, p.name, p.category);
    }
    Ok(())
}
