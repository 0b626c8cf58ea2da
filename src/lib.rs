//! # HR Sync Service Library
//!
//! Multi-tenant synchronization of HR records (companies, employees,
//! absences) from an external provider into local storage, driven by a
//! polled job queue and exposed through an operator HTTP API.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod provider;
pub mod repositories;
pub mod server;
pub mod sync;
pub mod telemetry;
pub mod worker;
pub use migration;
