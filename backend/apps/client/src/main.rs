//! Bill Client Entry Point
//!
//! Headless status check: loads configuration from the environment,
//! restores the persisted session and reports what a dashboard page
//! would show.

use std::env;
use std::sync::Arc;

use bill_client::{DEFAULT_FILTER, HostedClient, init_tracing};
use platform::config::ClientConfig;
use platform::navigation::{MemoryNavigator, Navigator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(DEFAULT_FILTER);

    let config = ClientConfig::from_env()?;
    let origin = env::var("BILL_SITE_ORIGIN").unwrap_or_else(|_| "http://localhost:5500".into());
    let navigator = Arc::new(MemoryNavigator::new(origin, "dashboard.html"));

    let client = HostedClient::connect(&config, navigator.clone())?;

    if !client.require_auth().await {
        tracing::info!(
            redirected_to = %navigator.current_path(),
            recent_users = ?client.recent_users().list(),
            "No active session"
        );
        return Ok(());
    }

    let email = client.session().current_email().await.unwrap_or_default();
    let calculations = client.calculations().user_calculations().await;
    if !calculations.is_success() {
        tracing::warn!(message = %calculations.message, "Could not load calculations");
    }

    tracing::info!(
        email = %email,
        calculations = calculations.data().map_or(0, Vec::len),
        last_bill_amount = client.calculations().last_bill_amount().await,
        last_kwh_used = client.calculations().last_kwh_used().await,
        "Signed in"
    );

    Ok(())
}
