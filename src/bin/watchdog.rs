use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tradegrid::engines::scheduler::checkpoint::{CHECKPOINT_DIR, STATUS_FILE};
use tradegrid::watchdog::{self, StatusHealth, DEFAULT_MAX_AGE_SECONDS};

/// Independent liveness check for the optimizer's checkpoint status file.
///
/// Exit codes: 0 = fresh, 1 = status missing or unreadable, 3 = critical
/// staleness (alert attempted). 2 is reserved.
#[derive(Parser)]
#[command(name = "tradegrid-watchdog")]
struct Args {
    /// Maximum checkpoint age in seconds before escalation
    #[arg(default_value_t = DEFAULT_MAX_AGE_SECONDS)]
    max_age_seconds: f64,

    /// Status file to inspect
    #[arg(long)]
    status_path: Option<PathBuf>,

    /// Alert webhook URL
    #[arg(long, env = "RIBS_ALERT_WEBHOOK")]
    webhook: Option<String>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let status_path = args
        .status_path
        .unwrap_or_else(|| PathBuf::from(CHECKPOINT_DIR).join(STATUS_FILE));

    let health = watchdog::evaluate_status(&status_path, args.max_age_seconds);

    match &health {
        StatusHealth::Ok => println!("OK"),
        StatusHealth::Missing(msg) | StatusHealth::Unreadable(msg) => {
            log::warn!("{}", msg);
            println!("{}", msg);
        }
        StatusHealth::Stale(msg) => {
            log::error!("{}", msg);
            println!("{}", msg);
            match &args.webhook {
                Some(url) => watchdog::post_alert(url, msg, &status_path),
                None => log::warn!(
                    "No alert webhook configured (set RIBS_ALERT_WEBHOOK or pass --webhook)"
                ),
            }
        }
    }

    ExitCode::from(health.exit_code() as u8)
}
