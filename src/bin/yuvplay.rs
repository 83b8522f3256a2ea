use std::{path::PathBuf, sync::Arc};

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use yuvplay::{
    DEFAULT_INPUT, FAILURE_EXIT_CODE, FfmpegLogLevel, MediaSource, PlaybackError, PlaybackMode,
    Player, PlayerOptions, ProgressCallback, ProgressInfo, ScalingFilter, StopReason,
};

const CLI_AFTER_HELP: &str = "Examples:\n  yuvplay\n  yuvplay play input.mkv --scale 3 --filter lanczos --paced\n  yuvplay play input.mp4 --first-packet --no-dump\n  yuvplay probe input.mp4 --json\n  yuvplay completions zsh > _yuvplay";

#[derive(Debug, Parser)]
#[command(
    name = "yuvplay",
    version,
    about = "Play the video stream of a media file in an SDL window",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    /// Defaults to `play` with every option at its default.
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Play a media file.
    #[command(
        about = "Play a media file",
        after_help = "Examples:\n  yuvplay play\n  yuvplay play input.mp4 --scale 1 --title Preview\n  yuvplay play input.mp4 --flush --progress"
    )]
    Play(PlayArgs),

    /// Print metadata and validation findings for a media file.
    #[command(
        about = "Print media metadata",
        visible_alias = "info",
        after_help = "Examples:\n  yuvplay probe input.mp4\n  yuvplay probe input.mp4 --json"
    )]
    Probe {
        /// Input media path (defaults to video.mp4).
        input: Option<PathBuf>,

        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

#[derive(Debug, Args, Clone, Default)]
struct PlayArgs {
    /// Input media path (defaults to video.mp4).
    input: Option<PathBuf>,

    /// Process only the first packet, then exit.
    #[arg(long)]
    first_packet: bool,

    /// Present frames still buffered in the decoder at end of stream.
    #[arg(long)]
    flush: bool,

    /// Divide the source resolution by N (default 2).
    #[arg(long, value_name = "N")]
    scale: Option<u32>,

    /// Scaling filter (fast-bilinear, bilinear, bicubic, point, area, lanczos).
    #[arg(long, value_name = "NAME")]
    filter: Option<String>,

    /// Window title (default "SDL").
    #[arg(long, value_name = "T")]
    title: Option<String>,

    /// Skip the container dumps on stderr.
    #[arg(long)]
    no_dump: bool,

    /// Follow the stream's frame rate instead of presenting as fast as possible.
    #[arg(long)]
    paced: bool,

    /// Show a spinner with the number of presented frames.
    #[arg(long)]
    progress: bool,
}

fn parse_log_level(value: &str) -> Option<FfmpegLogLevel> {
    match value.to_ascii_lowercase().as_str() {
        "quiet" => Some(FfmpegLogLevel::Quiet),
        "panic" => Some(FfmpegLogLevel::Panic),
        "fatal" => Some(FfmpegLogLevel::Fatal),
        "error" => Some(FfmpegLogLevel::Error),
        "warning" | "warn" => Some(FfmpegLogLevel::Warning),
        "info" => Some(FfmpegLogLevel::Info),
        "verbose" => Some(FfmpegLogLevel::Verbose),
        "debug" => Some(FfmpegLogLevel::Debug),
        "trace" => Some(FfmpegLogLevel::Trace),
        _ => None,
    }
}

fn parse_filter(value: &str) -> Option<ScalingFilter> {
    match value.to_ascii_lowercase().replace('_', "-").as_str() {
        "fast-bilinear" | "fast" => Some(ScalingFilter::FastBilinear),
        "bilinear" => Some(ScalingFilter::Bilinear),
        "bicubic" => Some(ScalingFilter::Bicubic),
        "point" | "nearest" => Some(ScalingFilter::Point),
        "area" => Some(ScalingFilter::Area),
        "lanczos" => Some(ScalingFilter::Lanczos),
        _ => None,
    }
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    let default_filter = if global.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Some(level) = &global.log_level {
        let parsed = parse_log_level(level).ok_or(format!("unsupported --log-level: {level}"))?;
        yuvplay::set_ffmpeg_log_level(parsed);
    }

    Ok(())
}

fn player_options(args: &PlayArgs) -> Result<PlayerOptions, Box<dyn std::error::Error>> {
    let input = args
        .input
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT));

    let mut options = PlayerOptions::new(input)
        .with_flush_on_end_of_stream(args.flush)
        .with_dump_format(!args.no_dump)
        .with_frame_pacing(args.paced);

    if args.first_packet {
        options = options.with_mode(PlaybackMode::FirstPacket);
    }
    if let Some(divisor) = args.scale {
        options = options.with_scale_divisor(divisor);
    }
    if let Some(name) = &args.filter {
        let filter = parse_filter(name).ok_or(format!("unsupported --filter: {name}"))?;
        options = options.with_filter(filter);
    }
    if let Some(title) = &args.title {
        options = options.with_window_title(title.clone());
    }

    Ok(options)
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new_spinner();
        bar.set_style(ProgressStyle::with_template(
            "{spinner:.green} {pos} frames [{elapsed_precise}] {msg}",
        )?);
        Ok(Self { bar })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.bar.set_position(info.frames_presented);
        match (info.percentage, info.current_timestamp) {
            (Some(percentage), Some(timestamp)) => self.bar.set_message(format!(
                "{percentage:.1}% at {:.2}s",
                timestamp.as_secs_f64()
            )),
            (Some(percentage), None) => self.bar.set_message(format!("{percentage:.1}%")),
            _ => {}
        }
    }
}

fn play(args: &PlayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = player_options(args)?;

    let progress = if args.progress {
        let progress = Arc::new(TerminalProgress::new()?);
        options = options.with_progress(progress.clone());
        Some(progress)
    } else {
        None
    };

    let result = Player::new(options).play();
    if let Some(progress) = &progress {
        progress.bar.finish_and_clear();
    }
    let report = result?;

    let reason = match &report.pipeline.stop_reason {
        StopReason::EndOfStream => "end of stream".to_string(),
        StopReason::ReadError(reason) => format!("read error: {reason}"),
        StopReason::Cancelled => "quit".to_string(),
        StopReason::FirstPacketDone => "first packet".to_string(),
    };
    eprintln!(
        "{} {} frames at {}x{} ({reason})",
        "played".green().bold(),
        report.pipeline.frames_presented,
        report.output_width,
        report.output_height,
    );

    Ok(())
}

fn probe(input: Option<PathBuf>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let options = PlayerOptions::new(input.unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT)));
    let source = MediaSource::open(options.input(), false)?;
    let metadata = source.metadata();
    let report = source.validate(&options);

    if json {
        let payload = json!({
            "path": source.path().display().to_string(),
            "format": metadata.format,
            "duration_seconds": metadata.duration.as_secs_f64(),
            "stream_count": metadata.stream_count,
            "video": metadata.video.as_ref().map(|video| json!({
                "stream_index": video.stream_index,
                "width": video.width,
                "height": video.height,
                "fps": video.frames_per_second,
                "frame_count": video.frame_count,
                "codec": video.codec,
                "pixel_format": video.pixel_format,
            })),
            "valid": report.is_valid(),
            "warnings": report.warnings,
            "errors": report.errors,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("Format: {}", metadata.format);
    println!("Duration: {:?}", metadata.duration);
    println!("Streams: {}", metadata.stream_count);
    if let Some(video) = &metadata.video {
        println!(
            "Video: stream {} {}x{} @ {:.2} fps [{}]",
            video.stream_index, video.width, video.height, video.frames_per_second, video.codec,
        );
    }
    for warning in &report.warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning.yellow());
    }
    for error in &report.errors {
        eprintln!("{} {}", "error:".red().bold(), error);
    }

    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;

    match cli.command {
        None => play(&PlayArgs::default())?,
        Some(Commands::Play(args)) => play(&args)?,
        Some(Commands::Probe { input, json }) => probe(input, json)?,
        Some(Commands::Completions { shell }) => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "yuvplay", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        if let Some(playback_error) = error.downcast_ref::<PlaybackError>() {
            log::debug!("{playback_error:?}");
        }
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(FAILURE_EXIT_CODE);
    }
}
