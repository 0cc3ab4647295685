//! Command handlers.

pub mod analyze;
pub mod config;
pub mod credentials;
pub mod dashboard;
pub mod interactive;
pub mod sandbox;
