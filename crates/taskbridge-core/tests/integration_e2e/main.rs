//! E2E tests for provider services.
//!
//! Every test runs against an in-memory store and a mockito HTTP server;
//! no real credentials or external APIs are involved.

mod google_e2e;
mod slack_e2e;
mod support;
