//! API E2E test suite.
//!
//! Runs the full actix-web app against a migrated in-memory SQLite database,
//! an in-memory blob store and a stubbed recognition service.
//!
//! Run with: cargo test --test api_e2e

mod test_helpers;

mod test_auth;
mod test_cascade;
mod test_classes;
