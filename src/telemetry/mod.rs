use std::collections::BTreeMap;
use std::sync::OnceLock;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::TelemetryConfig;

const CAPTURE_ENV: &str = "STRATUS_CAPTURE_TELEMETRY";
const INGEST_URL: &str = "https://telemetry.stratus.cloud/v1/events";

static SESSION_ID: OnceLock<String> = OnceLock::new();

/// Whether event capture is enabled. Opt-out model: enabled unless the
/// config switches it off or the env var is set to anything but "true".
pub fn capture_enabled(config: &TelemetryConfig) -> bool {
    if !config.enabled {
        return false;
    }
    match std::env::var(CAPTURE_ENV) {
        Ok(v) => v.eq_ignore_ascii_case("true"),
        Err(_) => true,
    }
}

/// Anonymous session id: sha256 over pid + timestamp.
pub fn session_id(timestamp_millis: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(std::process::id().to_string());
    hasher.update(timestamp_millis.to_string());
    hex::encode(hasher.finalize())
}

fn current_session_id() -> &'static str {
    SESSION_ID.get_or_init(|| session_id(chrono::Utc::now().timestamp_millis()))
}

/// Fire-and-forget event. Failures never surface to the caller.
pub fn collect_event(config: &TelemetryConfig, event: &str, properties: &[(&str, &str)]) {
    if !capture_enabled(config) {
        return;
    }
    let properties: BTreeMap<&str, &str> = properties.iter().copied().collect();
    let payload = serde_json::json!({
        "event": event,
        "session": current_session_id(),
        "properties": properties,
    });

    debug!(event, "sending telemetry event");
    let agent = ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(5))
        .build();
    if let Err(e) = agent.post(INGEST_URL).send_json(payload) {
        debug!(error = %e, "telemetry event dropped");
    }
}
