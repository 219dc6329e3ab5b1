//! Exit codes for the CLI

use appstore_publisher_core::{ConfigError, PublisherError};
use appstore_publisher_stores::StoreError;

/// Success
#[allow(dead_code)]
pub const SUCCESS: i32 = 0;

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Exit code for a failed command
pub fn for_error(err: &anyhow::Error) -> i32 {
    let is_configuration = if let Some(e) = err.downcast_ref::<PublisherError>() {
        e.is_configuration()
    } else if let Some(e) = err.downcast_ref::<StoreError>() {
        e.is_configuration()
    } else {
        err.downcast_ref::<ConfigError>().is_some()
    };

    if is_configuration {
        CONFIG_ERROR
    } else {
        ERROR
    }
}
