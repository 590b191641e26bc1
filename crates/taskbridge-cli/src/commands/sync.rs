//! Sync commands: run one provider, or every active one.

use clap::Subcommand;
use taskbridge_core::integrations::{IntegrationService, Provider, Service};
use taskbridge_core::SyncReport;

#[derive(Subcommand)]
pub enum SyncAction {
    /// Sync one provider
    Provider {
        /// Provider name (slack, discord, google)
        provider: Provider,
    },
    /// Sync every active integration
    All,
}

pub fn run(action: SyncAction) -> Result<(), Box<dyn std::error::Error>> {
    let (store, config) = super::open()?;

    match action {
        SyncAction::Provider { provider } => {
            let integration = store
                .find_integration(&config.user_id, provider)?
                .ok_or(format!("{provider} is not connected"))?;
            let mut service = Service::build(&store, integration, &config)?;
            let report = super::block_on(service.sync())??;
            print_report(&report);
        }
        SyncAction::All => {
            let integrations = store.list_integrations(&config.user_id)?;
            let active: Vec<_> = integrations.into_iter().filter(|i| i.active).collect();
            if active.is_empty() {
                println!("No active integrations.");
                return Ok(());
            }
            for integration in active {
                let provider = integration.provider;
                let mut service = Service::build(&store, integration, &config)?;
                match super::block_on(service.sync())? {
                    Ok(report) => print_report(&report),
                    Err(e) => eprintln!("{provider}: sync failed - {e}"),
                }
            }
        }
    }
    Ok(())
}

fn print_report(report: &SyncReport) {
    println!("{}: {} items synced", report.provider, report.synced);
    for error in &report.errors {
        println!("  failed: {} ({})", error.title, error.message);
    }
}
