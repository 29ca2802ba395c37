use std::time::Duration;

use common::utils::logging::init_logging_json;
use dotenvy::dotenv;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

fn init_logging() {
    dotenv().ok();
    init_logging_json();
    info!(service = "feeder", event = "logger_init", "tracing subscriber initialized");
}

/// Fixed roster the feeder cycles through; two of the names carry the token
/// the intake service routes on in its conditional-shard mode.
fn sample_users() -> Vec<serde_json::Value> {
    vec![
        json!({"name": "David Smith", "email": "david@example.com"}),
        json!({"name": "Jane Doe", "email": "jane@example.com"}),
        json!({"name": "David Johnson", "email": "david.johnson@example.com"}),
        json!({"name": "John Smith", "email": "john@example.com"}),
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let service_id = Uuid::new_v4();
    let base_url =
        std::env::var("INTAKE_URL").unwrap_or_else(|_| "http://127.0.0.1:8081".to_string());
    info!(service = "feeder", event = "start", %service_id, %base_url, "feeder starting");

    let roster = sample_users();
    let mut interval = tokio::time::interval(Duration::from_secs(30));
    let mut next = 0usize;

    loop {
        interval.tick().await;
        let user = &roster[next % roster.len()];
        next += 1;

        match common::intake::submit_user(&base_url, user).await {
            Ok(resp) => info!(
                service = "feeder",
                event = "submitted",
                user = %user["name"],
                message = %resp["message"],
                "user submitted"
            ),
            Err(e) => error!(
                service = "feeder",
                event = "submit_failed",
                user = %user["name"],
                error = %e,
                "failed to submit user"
            ),
        }
    }
}
