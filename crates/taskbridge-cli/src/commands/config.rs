//! Configuration management commands.

use clap::Subcommand;
use taskbridge_core::storage::AppConfig;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the current configuration
    Show,
    /// Store OAuth application credentials for a provider
    SetApp {
        /// Provider name (slack, google)
        provider: String,
        /// OAuth client id
        #[arg(long)]
        client_id: String,
        /// OAuth client secret
        #[arg(long)]
        client_secret: String,
        /// Redirect URI registered with the provider
        #[arg(long)]
        redirect_uri: String,
    },
    /// Set the local user id
    SetUser {
        /// User id integrations and tasks are keyed under
        user_id: String,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = AppConfig::load()?;
            println!("user_id: {}", config.user_id);
            println!(
                "slack app: {}",
                if config.slack.is_configured() { "configured" } else { "not configured" }
            );
            println!(
                "google app: {}",
                if config.google.is_configured() { "configured" } else { "not configured" }
            );
        }
        ConfigAction::SetApp {
            provider,
            client_id,
            client_secret,
            redirect_uri,
        } => {
            let mut config = AppConfig::load()?;
            let app = match provider.as_str() {
                "slack" => &mut config.slack,
                "google" | "google_calendar" | "google-calendar" => &mut config.google,
                _ => return Err(format!("no OAuth app for provider '{provider}'").into()),
            };
            app.client_id = client_id;
            app.client_secret = client_secret;
            app.redirect_uri = redirect_uri;
            config.save()?;
            println!("{provider} app credentials saved");
        }
        ConfigAction::SetUser { user_id } => {
            let mut config = AppConfig::load()?;
            config.user_id = user_id;
            config.save()?;
            println!("user_id saved");
        }
    }
    Ok(())
}
