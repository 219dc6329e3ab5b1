//! appstore-publisher core library
//!
//! This crate provides configuration loading and validation, error handling
//! and the publish workflow that ties configuration to the Appstore client.

pub mod config;
pub mod error;
pub mod workflow;

pub use config::Config;
pub use error::{ConfigError, PublisherError, Result};
pub use workflow::{connect, PublishWorkflow};
