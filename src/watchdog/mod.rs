use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

/// Seconds a checkpoint may age before the watchdog escalates (6 hours)
pub const DEFAULT_MAX_AGE_SECONDS: f64 = 21600.0;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of a status-file inspection, ordered by severity. Missing or
/// unreadable files are minor (the optimizer may simply not have started);
/// staleness is the critical signal.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusHealth {
    Ok,
    Missing(String),
    Unreadable(String),
    Stale(String),
}

impl StatusHealth {
    pub fn is_ok(&self) -> bool {
        matches!(self, StatusHealth::Ok)
    }

    pub fn message(&self) -> String {
        match self {
            StatusHealth::Ok => "OK".to_string(),
            StatusHealth::Missing(msg)
            | StatusHealth::Unreadable(msg)
            | StatusHealth::Stale(msg) => msg.clone(),
        }
    }

    /// 0 = healthy, 1 = minor (no alert), 3 = critical staleness.
    /// Exit code 2 is reserved.
    pub fn exit_code(&self) -> i32 {
        match self {
            StatusHealth::Ok => 0,
            StatusHealth::Missing(_) | StatusHealth::Unreadable(_) => 1,
            StatusHealth::Stale(_) => 3,
        }
    }
}

/// Contract-shaped wrapper: `(ok, message)`.
pub fn check_status(path: &Path, max_age_seconds: f64) -> (bool, String) {
    let health = evaluate_status(path, max_age_seconds);
    (health.is_ok(), health.message())
}

/// Inspect the checkpoint status file and classify its freshness.
///
/// The age signal is taken from, in priority order: the recorded
/// `latest_checkpoint.mtime`, the `last_completed` ISO-8601 timestamp
/// (trailing `Z` stripped, naive times treated as UTC), and finally the
/// status file's own filesystem mtime.
pub fn evaluate_status(path: &Path, max_age_seconds: f64) -> StatusHealth {
    if !path.exists() {
        return StatusHealth::Missing(format!("Status file missing: {}", path.display()));
    }

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            return StatusHealth::Unreadable(format!("Failed to read status file: {}", e));
        }
    };

    let status: Value = match serde_json::from_str(&contents) {
        Ok(status) => status,
        Err(e) => {
            return StatusHealth::Unreadable(format!("Failed to read status file: {}", e));
        }
    };

    let now = Utc::now().timestamp() as f64;

    let age = checkpoint_mtime_age(&status, now)
        .or_else(|| last_completed_age(&status, now))
        .or_else(|| file_mtime_age(path, now));

    let age = match age {
        Some(age) => age,
        None => {
            return StatusHealth::Unreadable(format!(
                "Failed to read status file: no usable freshness signal in {}",
                path.display()
            ));
        }
    };

    if age > max_age_seconds {
        StatusHealth::Stale(format!(
            "RIBS checkpoint stale: age={:.0}s > threshold={:.0}s",
            age, max_age_seconds
        ))
    } else {
        StatusHealth::Ok
    }
}

fn checkpoint_mtime_age(status: &Value, now: f64) -> Option<f64> {
    let mtime = status.get("latest_checkpoint")?.get("mtime")?.as_f64()?;
    Some(now - mtime)
}

fn last_completed_age(status: &Value, now: f64) -> Option<f64> {
    let raw = status.get("last_completed")?.as_str()?;

    // Offset-carrying timestamps parse directly; naive ones (trailing Z
    // stripped) are treated as UTC.
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(now - dt.timestamp() as f64);
    }

    let stripped = raw.trim_end_matches('Z');
    let naive = NaiveDateTime::parse_from_str(stripped, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    Some(now - naive.and_utc().timestamp() as f64)
}

fn file_mtime_age(path: &Path, now: f64) -> Option<f64> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    let epoch = modified
        .duration_since(std::time::UNIX_EPOCH)
        .ok()?
        .as_secs_f64();
    Some(now - epoch)
}

/// JSON body posted to the alert webhook.
pub fn alert_payload(message: &str, path: &Path) -> Value {
    serde_json::json!({
        "text": message,
        "path": path.display().to_string(),
    })
}

/// Best-effort alert delivery: POST failures are logged, never raised.
pub fn post_alert(webhook_url: &str, message: &str, path: &Path) {
    let payload = alert_payload(message, path);

    let client = match reqwest::blocking::Client::builder()
        .timeout(WEBHOOK_TIMEOUT)
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            log::warn!("Failed to build webhook client: {}", e);
            return;
        }
    };

    match client.post(webhook_url).json(&payload).send() {
        Ok(response) => log::info!("Alert webhook responded {}", response.status()),
        Err(e) => log::warn!("Alert webhook POST failed: {}", e),
    }
}
