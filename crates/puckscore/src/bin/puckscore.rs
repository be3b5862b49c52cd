//! puckscore CLI: score a shuffleboard frame from an image file.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{info, LevelFilter};
use puckscore::config::BoardConfig;
use puckscore::core::{LetterboxRect, Team};
use puckscore::detect::{profile_from_sample, sample_pixel, TeamBlobCounts};
use puckscore::frame::{letterbox_image, load_rgba};
use puckscore::session::ScoringSession;
use puckscore::{DriftOffset, Puck, RoundScore};
use serde::Serialize;

#[cfg(feature = "tracing")]
use tracing_log::LogTracer;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "puckscore")]
#[command(about = "Detect and score shuffleboard pucks in a camera frame")]
#[command(version)]
struct Cli {
    /// Log per-stage debug output.
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Emit JSON log lines (builds with the `tracing` feature only).
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect and score pucks in one image.
    Score(ScoreArgs),
    /// Write the default configuration.
    Defaults {
        /// Output config path (JSON).
        #[arg(long)]
        out: PathBuf,
    },
    /// Calibrate a team color from one pixel of an image.
    Sample(SampleArgs),
}

#[derive(Args)]
struct BufferArgs {
    /// Working buffer width; defaults to the image width.
    #[arg(long)]
    width: Option<usize>,
    /// Working buffer height; defaults to the image height.
    #[arg(long)]
    height: Option<usize>,
}

#[derive(Args)]
struct ScoreArgs {
    /// Input frame.
    #[arg(long)]
    image: PathBuf,
    /// Board config (JSON). Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(flatten)]
    buffer: BufferArgs,
    /// Drift offset along x, in buffer pixels.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    dx: f32,
    /// Drift offset along y, in buffer pixels.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    dy: f32,
    /// Report path (JSON); printed to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args)]
struct SampleArgs {
    #[arg(long)]
    image: PathBuf,
    /// Config to update in place (created from defaults if missing).
    #[arg(long)]
    config: PathBuf,
    /// Buffer x coordinate of the puck pixel.
    #[arg(long)]
    x: f32,
    /// Buffer y coordinate of the puck pixel.
    #[arg(long)]
    y: f32,
    #[arg(long, value_enum)]
    team: TeamArg,
    #[command(flatten)]
    buffer: BufferArgs,
}

#[derive(Clone, Copy, ValueEnum)]
enum TeamArg {
    Red,
    Blue,
}

impl From<TeamArg> for Team {
    fn from(t: TeamArg) -> Self {
        match t {
            TeamArg::Red => Team::Red,
            TeamArg::Blue => Team::Blue,
        }
    }
}

#[derive(Serialize)]
struct ScoreReport {
    image: String,
    buffer: [usize; 2],
    letterbox: LetterboxRect,
    drift: DriftOffset,
    pucks: Vec<Puck>,
    counts: TeamBlobCounts,
    round: Option<RoundScore>,
    elapsed_ms: f64,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    match cli.command {
        Commands::Score(args) => run_score(&args),
        Commands::Defaults { out } => run_defaults(&out),
        Commands::Sample(args) => run_sample(&args),
    }
}

fn init_logging(verbose: bool, json: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    #[cfg(feature = "tracing")]
    {
        let _ = LogTracer::init();
        puckscore::core::init_tracing(level, json);
    }

    #[cfg(not(feature = "tracing"))]
    {
        let _ = json;
        let _ = puckscore::core::init_with_level(level);
    }
}

fn load_config(path: Option<&Path>) -> CliResult<BoardConfig> {
    match path {
        Some(p) => {
            let config = BoardConfig::load_json(p);
            config.map_err(|e| format!("config {}: {e}", p.display()).into())
        }
        None => {
            info!("no config given, using defaults");
            Ok(BoardConfig::default())
        }
    }
}

fn run_score(args: &ScoreArgs) -> CliResult<()> {
    let config = load_config(args.config.as_deref())?;
    info!("loading image: {}", args.image.display());
    let img = load_rgba(&args.image)?;
    let started = Instant::now();

    let (buffer, letterbox) = letterbox_image(&img, args.buffer.width, args.buffer.height);
    info!(
        "image {}x{} -> buffer {}x{} (scale {:.3})",
        img.width(),
        img.height(),
        buffer.width,
        buffer.height,
        letterbox.scale
    );

    let drift = DriftOffset::new(args.dx, args.dy);
    let mut session = ScoringSession::new(config);
    session.set_drift(drift);
    let report = session.rescore(&buffer.view(), started).clone();
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

    match &report.round {
        Some(round) => info!(
            "{} pucks: red {} blue {} ({} borderline)",
            round.results.len(),
            round.red,
            round.blue,
            round.borderline().count()
        ),
        None => info!(
            "{} pucks detected, court not calibrated",
            report.detection.pucks.len()
        ),
    }

    let out = ScoreReport {
        image: args.image.to_string_lossy().into_owned(),
        buffer: [buffer.width, buffer.height],
        letterbox,
        drift,
        pucks: report.detection.pucks,
        counts: report.detection.counts,
        round: report.round,
        elapsed_ms,
    };
    let json = serde_json::to_string_pretty(&out)?;
    match &args.out {
        Some(path) => {
            std::fs::write(path, &json)?;
            info!("report written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn run_defaults(out: &Path) -> CliResult<()> {
    BoardConfig::default().write_json(out)?;
    info!("default config written to {}", out.display());
    Ok(())
}

fn run_sample(args: &SampleArgs) -> CliResult<()> {
    let mut config = if args.config.exists() {
        BoardConfig::load_json(&args.config)?
    } else {
        BoardConfig::default()
    };
    let img = load_rgba(&args.image)?;
    let (buffer, _) = letterbox_image(&img, args.buffer.width, args.buffer.height);

    let Some(rgb) = sample_pixel(&buffer.view(), args.x, args.y) else {
        return Err("image buffer is empty".into());
    };
    let team = Team::from(args.team);
    let profile = profile_from_sample(rgb, team);
    info!(
        "{team} sampled rgb {:?} -> hue {:.1} tol {:.0} s>={:.2} v>={:.2}",
        rgb, profile.hue, profile.hue_tolerance, profile.min_saturation, profile.min_value
    );

    config.set_profile(team, profile);
    config.validate()?;
    config.write_json(&args.config)?;
    info!("config updated: {}", args.config.display());
    Ok(())
}
