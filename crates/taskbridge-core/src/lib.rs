//! # TaskBridge Core Library
//!
//! This library connects a local task store to external services. Each
//! provider adapter implements the same four-step lifecycle:
//! authenticate, refresh tokens, test the connection, and sync.
//!
//! ## Architecture
//!
//! - **Storage**: SQLite persistence for integrations, their audit log,
//!   and the tasks/projects being mirrored; TOML app configuration
//! - **Integrations**: Slack (OAuth bot posting daily digests), Discord
//!   (webhook digests), Google Calendar (OAuth event mirroring)
//! - **Audit log**: every outbound provider call writes exactly one
//!   `integration_logs` row, success or failure
//!
//! ## Key Components
//!
//! - [`IntegrationStore`]: integration, log, and task persistence
//! - [`IntegrationService`]: the lifecycle contract each adapter implements
//! - [`Service`]: provider dispatch over the concrete adapters
//! - [`IntegrationError`]: typed failure taxonomy for every operation

pub mod error;
pub mod integrations;
pub mod storage;
pub mod task;

pub use error::{ConfigError, IntegrationError};
pub use integrations::{
    ConnectionInfo, Credentials, Digest, DiscordService, GoogleCalendarService,
    IntegrationService, Provider, Service, SlackService, SyncItemError, SyncReport,
};
pub use storage::{
    AppConfig, Integration, IntegrationLog, IntegrationStore, LogStatus, NewLog,
};
pub use task::{Priority, Project, ProjectStatus, Task, TaskStatus};
