use clap::Parser;
use std::path::PathBuf;
use tradegrid::config::ConfigManager;
use tradegrid::data::MarketData;
use tradegrid::engines::scheduler::{CheckpointWriter, ConsoleProgressCallback, Scheduler};

/// Quality-diversity search over trading-strategy configurations
#[derive(Parser)]
#[command(name = "tradegrid")]
struct Args {
    /// OHLCV CSV file to optimize against
    #[arg(long)]
    data: PathBuf,

    /// TOML configuration file (defaults applied when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Optimization iterations to run
    #[arg(long, default_value_t = 100)]
    iterations: usize,

    /// Persistence root for checkpoints
    #[arg(long)]
    checkpoint_dir: Option<PathBuf>,

    /// Resume from an existing archive snapshot
    #[arg(long)]
    warm_start: bool,

    /// RNG seed override for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let manager = ConfigManager::new();
    if let Some(path) = &args.config {
        manager.load_from_file(path)?;
    }
    if let Some(seed) = args.seed {
        manager.update(|c| c.search.seed = Some(seed))?;
    }
    if let Some(dir) = &args.checkpoint_dir {
        let dir = dir.clone();
        manager.update(|c| c.checkpoint.root = dir)?;
    }
    let config = manager.get();

    let data = MarketData::from_csv(&args.data)?;
    log::info!("Loaded {} bars from {}", data.num_bars(), args.data.display());

    let mut scheduler = Scheduler::from_config(&config)?;
    let writer = CheckpointWriter::new(&config.checkpoint.root)?;
    let resumable = writer.has_archive_snapshot();
    scheduler.attach_checkpoint_writer(writer);

    if args.warm_start {
        if resumable {
            let restored = scheduler.warm_start()?;
            println!("Resumed from snapshot: {} elites restored", restored);
        } else {
            log::warn!("No archive snapshot found; starting cold");
        }
    }

    let promoted =
        scheduler.run_with_progress(&data, args.iterations, &mut ConsoleProgressCallback)?;

    let status = scheduler.status();
    println!(
        "Run complete: {} newly promoted elites, {} total, coverage {:.2}%, QD-score {:.4}",
        promoted.len(),
        status.num_elites,
        status.coverage * 100.0,
        status.qd_score
    );

    Ok(())
}
