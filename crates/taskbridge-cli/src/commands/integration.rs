//! Integration lifecycle commands: connect, test, refresh, disconnect.

use clap::Subcommand;
use taskbridge_core::integrations::{Credentials, IntegrationService, Provider, Service};

#[derive(Subcommand)]
pub enum IntegrationAction {
    /// Connect a provider
    Connect {
        /// Provider name (slack, discord, google)
        provider: Provider,
        /// OAuth authorization code (Slack, Google)
        #[arg(long)]
        code: Option<String>,
        /// Webhook URL (Discord)
        #[arg(long)]
        webhook_url: Option<String>,
    },
    /// Verify stored credentials against the provider
    Test {
        /// Provider name (slack, discord, google)
        provider: Provider,
    },
    /// Force an access-token refresh
    Refresh {
        /// Provider name (slack, discord, google)
        provider: Provider,
    },
    /// List integrations and their state
    List,
    /// Delete an integration and its logs
    Disconnect {
        /// Provider name (slack, discord, google)
        provider: Provider,
    },
}

pub fn run(action: IntegrationAction) -> Result<(), Box<dyn std::error::Error>> {
    let (store, config) = super::open()?;

    match action {
        IntegrationAction::Connect {
            provider,
            code,
            webhook_url,
        } => {
            let credentials = match provider {
                Provider::Discord => Credentials::WebhookUrl(
                    webhook_url.ok_or("--webhook-url required for Discord")?,
                ),
                Provider::Slack | Provider::GoogleCalendar => {
                    Credentials::OAuthCode(code.ok_or(format!("--code required for {provider}"))?)
                }
            };
            let integration = store.find_or_create_integration(&config.user_id, provider)?;
            let mut service = Service::build(&store, integration, &config)?;
            super::block_on(service.authenticate(credentials))??;
            println!("{provider} connected");
        }
        IntegrationAction::Test { provider } => {
            let integration = store
                .find_integration(&config.user_id, provider)?
                .ok_or(format!("{provider} is not connected"))?;
            let mut service = Service::build(&store, integration, &config)?;
            let info = super::block_on(service.test_connection())??;
            println!("{}: {}", info.provider, info.account);
            if let Some(detail) = info.detail {
                println!("  {detail}");
            }
        }
        IntegrationAction::Refresh { provider } => {
            let integration = store
                .find_integration(&config.user_id, provider)?
                .ok_or(format!("{provider} is not connected"))?;
            let mut service = Service::build(&store, integration, &config)?;
            super::block_on(service.refresh_token())??;
            println!("{provider} token refreshed");
        }
        IntegrationAction::List => {
            let integrations = store.list_integrations(&config.user_id)?;
            if integrations.is_empty() {
                println!("No integrations connected.");
            }
            for integration in integrations {
                let state = if integration.active { "active" } else { "inactive" };
                print!("{}: {state}", integration.provider);
                if let Some(synced) = integration.last_synced_at {
                    print!(", last synced {}", synced.format("%Y-%m-%d %H:%M"));
                }
                if let Some(error) = &integration.last_error {
                    print!(", last error: {error}");
                }
                println!();
            }
        }
        IntegrationAction::Disconnect { provider } => {
            let integration = store
                .find_integration(&config.user_id, provider)?
                .ok_or(format!("{provider} is not connected"))?;
            store.delete_integration(integration.id)?;
            println!("{provider} disconnected");
        }
    }
    Ok(())
}
