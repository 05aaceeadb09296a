//! Attendance server library.
//!
//! Class sections, students, attendance recaps and the cascade deletes that
//! keep them consistent, exposed through an actix-web API.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
