//! Audit-log inspection commands.

use clap::Subcommand;
use taskbridge_core::integrations::Provider;

#[derive(Subcommand)]
pub enum LogsAction {
    /// Show recent outbound calls for a provider
    Recent {
        /// Provider name (slack, discord, google)
        provider: Provider,
        /// Maximum number of rows
        #[arg(long, default_value = "20")]
        limit: i64,
        /// Print full rows as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: LogsAction) -> Result<(), Box<dyn std::error::Error>> {
    let (store, config) = super::open()?;

    match action {
        LogsAction::Recent {
            provider,
            limit,
            json,
        } => {
            let integration = store
                .find_integration(&config.user_id, provider)?
                .ok_or(format!("{provider} is not connected"))?;
            let logs = store.recent_logs(integration.id, limit)?;
            if logs.is_empty() {
                println!("No calls logged for {provider}.");
                return Ok(());
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&logs)?);
            } else {
                for log in logs {
                    println!(
                        "{} {:<8} {:<24} {}ms  {}",
                        log.created_at.format("%Y-%m-%d %H:%M:%S"),
                        log.status.as_str(),
                        log.action,
                        log.duration_ms,
                        log.message,
                    );
                }
            }
        }
    }
    Ok(())
}
