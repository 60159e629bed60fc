use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand};
use pokervision::batch::{inspect_frame, run_batch, BatchConfig};
use pokervision::detect::DetectorProfile;
use pokervision::equity::{simulate, Card, SimulationResult};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

#[derive(Parser, Debug)]
#[command(name = "pokervision", version, about = "Extract playing cards from table frames and estimate hand equity")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Detect and rectify every card in a directory of frames.
    Extract(ExtractArgs),
    /// Run detection on a single image and write a debug overlay.
    Detect(DetectArgs),
    /// Estimate win/tie rates against one random opponent.
    Equity(EquityArgs),
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Directory of input frames.
    #[arg(long, required_unless_present = "config")]
    frames: Option<PathBuf>,
    /// Directory for extracted cards and overlays.
    #[arg(long, required_unless_present = "config")]
    out: Option<PathBuf>,
    /// Threshold preset (`tight` or `loose`).
    #[arg(long)]
    profile: Option<DetectorProfile>,
    /// JSON batch config; command-line flags override its fields.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Process frames one at a time.
    #[arg(long)]
    sequential: bool,
    /// Write a JSON report of the run.
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DetectArgs {
    #[arg(long)]
    image: PathBuf,
    #[arg(long, default_value = "outputs")]
    out: PathBuf,
    #[arg(long, default_value = "loose")]
    profile: DetectorProfile,
    /// Also write gray/blur/edge stage images and print rejection counts.
    #[arg(long)]
    diagnostics: bool,
}

#[derive(Args, Debug)]
struct EquityArgs {
    /// Two hole card ids in 0..52.
    #[arg(long, num_args = 2, required = true)]
    hole: Vec<u8>,
    /// Up to five community card ids.
    #[arg(long, num_args = 0..=5)]
    community: Vec<u8>,
    #[arg(long, default_value_t = 10_000)]
    trials: usize,
    /// Seed for reproducible runs; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Worker threads, each with its own seeded stream.
    #[arg(long, default_value_t = 1)]
    workers: usize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let outcome = match cli.command {
        Command::Extract(args) => extract(args),
        Command::Detect(args) => detect(args),
        Command::Equity(args) => equity(args),
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "tracing"))]
fn init_logging(verbose: u8) {
    let level = pokervision::core::level_from_verbosity(verbose);
    if let Err(err) = pokervision::core::init_with_level(level) {
        eprintln!("logger already installed: {err}");
    }
}

#[cfg(feature = "tracing")]
fn init_logging(_verbose: u8) {
    let _ = tracing_log::LogTracer::init();
    pokervision::init_tracing(false);
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn extract(args: ExtractArgs) -> CliResult {
    let mut cfg = match &args.config {
        Some(path) => BatchConfig::load_json(path)?,
        None => {
            let (Some(frames), Some(out)) = (&args.frames, &args.out) else {
                return Err("either --config or both --frames and --out are required".into());
            };
            BatchConfig::new(frames, out)
        }
    };
    if let Some(frames) = args.frames {
        cfg.frames_dir = frames;
    }
    if let Some(out) = args.out {
        cfg.output_dir = out;
    }
    if let Some(profile) = args.profile {
        cfg.profile = profile;
        cfg.detector = None;
    }
    if args.sequential {
        cfg.parallel = false;
    }
    if let Some(report) = args.report {
        cfg.report_path = Some(report);
    }

    let report = run_batch(&cfg)?;
    if report.frames_found == 0 {
        println!("no frames in {}", cfg.frames_dir.display());
    }
    println!("saved {} cards", report.cards_extracted);
    Ok(())
}

fn detect(args: DetectArgs) -> CliResult {
    let params = args.profile.params();
    let report = inspect_frame(&args.image, &params, &args.out, "jpg", args.diagnostics)?;

    println!(
        "{} ({}x{}): {} found",
        report.frame.display(),
        report.width,
        report.height,
        report.quads.len()
    );
    for (i, quad) in report.quads.iter().enumerate() {
        let corners = quad.ordered().corners();
        let text: Vec<String> = corners
            .iter()
            .map(|p| format!("({:.1}, {:.1})", p.x, p.y))
            .collect();
        println!("  quad {i}: {}", text.join(" "));
    }
    if args.diagnostics {
        println!("  contours: {}", report.contours);
        for (kind, count) in &report.rejections {
            println!("  rejected {kind:?}: {count}");
        }
        for path in &report.stage_images {
            println!("  stage image: {}", path.display());
        }
    }
    println!("overlay saved to {}", report.debug_overlay.display());
    Ok(())
}

fn equity(args: EquityArgs) -> CliResult {
    let hole = to_cards(&args.hole)?;
    let community = to_cards(&args.community)?;
    let seed = args.seed.unwrap_or_else(|| rand::rng().random());

    let result = run_simulation(&hole, &community, args.trials, seed, args.workers)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

#[cfg(feature = "rayon")]
fn run_simulation(
    hole: &[Card],
    community: &[Card],
    trials: usize,
    seed: u64,
    workers: usize,
) -> Result<SimulationResult, pokervision::equity::EquityError> {
    if workers > 1 {
        return pokervision::equity::simulate_parallel(hole, community, trials, seed, workers);
    }
    simulate(hole, community, trials, &mut SmallRng::seed_from_u64(seed))
}

#[cfg(not(feature = "rayon"))]
fn run_simulation(
    hole: &[Card],
    community: &[Card],
    trials: usize,
    seed: u64,
    _workers: usize,
) -> Result<SimulationResult, pokervision::equity::EquityError> {
    simulate(hole, community, trials, &mut SmallRng::seed_from_u64(seed))
}

fn to_cards(ids: &[u8]) -> Result<Vec<Card>, pokervision::equity::EquityError> {
    ids.iter().map(|&id| Card::new(id)).collect()
}
