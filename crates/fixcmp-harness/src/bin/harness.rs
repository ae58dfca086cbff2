//! CLI entrypoint for the fixcmp comparison harness.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use fixcmp_core::Precision;
use fixcmp_harness::config::{RunConfig, parse_seed};
use fixcmp_harness::report::{DatasetArtifact, write_dataset};
use fixcmp_harness::structured_log::{ArtifactIndex, LogEmitter, validate_log_file};
use fixcmp_harness::{CaseFamily, ComparisonRunner, NativeInvoker, NativeRoutine};

/// Differential accuracy and cost runs for fixed-point math routines.
#[derive(Debug, Parser)]
#[command(name = "fixcmp-harness")]
#[command(about = "Compare fixed-point routines against an arbitrary-precision reference")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Directory receiving `data/<family>.json`.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
    /// Seed for replayable runs (decimal or 0x...). Overrides FIXCMP_SEED.
    #[arg(long)]
    seed: Option<String>,
    /// Write a structured JSONL log here, plus an artifact index beside it.
    /// `-` logs to stderr without an index.
    #[arg(long)]
    log: Option<PathBuf>,
    /// Working precision in significant decimal digits.
    #[arg(long)]
    precision: Option<usize>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RewardFormulation {
    Powf,
    ExpLn,
}

impl From<RewardFormulation> for NativeRoutine {
    fn from(value: RewardFormulation) -> Self {
        match value {
            RewardFormulation::Powf => NativeRoutine::RewardPowf,
            RewardFormulation::ExpLn => NativeRoutine::RewardExpLn,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Head-to-head reward split comparison.
    RewardSplit {
        #[command(flatten)]
        run: RunArgs,
        /// Formulation treated as the old implementation.
        #[arg(long, value_enum, default_value = "powf")]
        baseline: RewardFormulation,
        /// Formulation treated as the new implementation.
        #[arg(long, value_enum, default_value = "exp-ln")]
        candidate: RewardFormulation,
    },
    /// Sample exp(x) over [-65, 0).
    Exp {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Sample ln(x) over (0, 1].
    Ln {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Validate a structured JSONL log.
    ValidateLog {
        #[arg(long)]
        log: PathBuf,
    },
}

struct Prepared {
    config: RunConfig,
    runner: ComparisonRunner,
    log_path: Option<PathBuf>,
}

fn prepare(family: CaseFamily, args: RunArgs) -> Result<Prepared, Box<dyn std::error::Error>> {
    let mut config = RunConfig::from_env(family)?;
    config.output_dir = args.output_dir;
    if let Some(seed) = args.seed.as_deref() {
        config.seed = Some(parse_seed(seed)?);
    }
    if let Some(digits) = args.precision {
        config.precision = Precision::new(digits)?;
    }

    let run_id = match config.seed {
        Some(seed) => format!("seed-{seed:x}"),
        None => {
            let secs = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs();
            format!("run-{secs}")
        }
    };

    let mut runner = ComparisonRunner::from_config(&config);
    match args.log.as_deref() {
        Some(path) if is_stderr(path) => {
            runner = runner.with_log(LogEmitter::to_stderr(family, &run_id));
        }
        Some(path) => runner = runner.with_log(LogEmitter::to_file(path, family, &run_id)?),
        None => {}
    }
    eprintln!(
        "Running {} {family} cases (precision {} digits)",
        config.samples,
        config.precision.digits()
    );
    Ok(Prepared {
        config,
        runner,
        log_path: args.log,
    })
}

fn is_stderr(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn finish(
    family: CaseFamily,
    runner: ComparisonRunner,
    log_path: Option<&Path>,
    dataset: &DatasetArtifact,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!(
        "Wrote {} (sha256 {})",
        dataset.path.display(),
        dataset.sha256
    );
    let (Some(log_path), Some(mut log)) = (log_path, runner.into_log()) else {
        return Ok(());
    };
    log.emit_artifact(&dataset.path.display().to_string(), &dataset.sha256)?;
    log.flush()?;
    if is_stderr(log_path) {
        return Ok(());
    }
    let mut index = ArtifactIndex::new(log.run_id(), family);
    index.add(
        dataset.path.display().to_string(),
        "dataset",
        &dataset.sha256,
        Some(dataset.size_bytes),
    );
    let index_path = log_path.with_extension("index.json");
    std::fs::write(&index_path, index.to_json()?)?;
    eprintln!("Wrote {}", index_path.display());
    Ok(())
}

async fn run_single(
    family: CaseFamily,
    routine: NativeRoutine,
    args: RunArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let Prepared {
        config,
        mut runner,
        log_path,
    } = prepare(family, args)?;
    let invoker = NativeInvoker::new(routine, config.precision);
    let result = runner.run_samples(config.samples, &invoker).await?;
    let dataset = write_dataset(&config.dataset_path(), &result.records())?;
    for failure in &result.failures {
        eprintln!("case {} failed: {}", failure.case_index, failure.reason);
    }
    print!("{}", result.statistics.render());
    finish(family, runner, log_path.as_deref(), &dataset)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::RewardSplit {
            run,
            baseline,
            candidate,
        } => {
            let family = CaseFamily::RewardSplit;
            let Prepared {
                config,
                mut runner,
                log_path,
            } = prepare(family, run)?;
            let old = NativeInvoker::new(baseline.into(), config.precision);
            let new = NativeInvoker::new(candidate.into(), config.precision);
            let result = runner.run_pairs(config.samples, &old, &new).await?;
            let dataset = write_dataset(&config.dataset_path(), &result.records())?;
            for failure in &result.failures {
                eprintln!("case {} failed: {}", failure.case_index, failure.reason);
            }
            print!("{}", result.statistics.render());
            finish(family, runner, log_path.as_deref(), &dataset)?;
        }
        Command::Exp { run } => run_single(CaseFamily::Exp, NativeRoutine::Exp, run).await?,
        Command::Ln { run } => run_single(CaseFamily::Ln, NativeRoutine::Ln, run).await?,
        Command::ValidateLog { log } => {
            let (lines, errors) = validate_log_file(&log)?;
            for err in &errors {
                eprintln!("{err}");
            }
            if !errors.is_empty() {
                return Err(format!("{} of {lines} lines invalid", errors.len()).into());
            }
            println!("{lines} lines valid");
        }
    }

    Ok(())
}
