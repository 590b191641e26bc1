pub mod config;
pub mod integration;
pub mod logs;
pub mod project;
pub mod sync;
pub mod task;

use taskbridge_core::storage::{AppConfig, IntegrationStore};

/// Open the default store and load app configuration.
pub(crate) fn open() -> Result<(IntegrationStore, AppConfig), Box<dyn std::error::Error>> {
    let store = IntegrationStore::open_default()?;
    let config = AppConfig::load()?;
    Ok((store, config))
}

/// Run an integration future to completion.
///
/// Services borrow the store's SQLite connection, so their futures are
/// not `Send`; a current-thread runtime drives them without spawning.
pub(crate) fn block_on<F: std::future::Future>(
    future: F,
) -> Result<F::Output, Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(future))
}
