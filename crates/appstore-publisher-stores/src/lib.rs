//! Amazon Appstore API client and APK publishing for appstore-publisher
//!
//! This crate talks to the Amazon Appstore edits API and orchestrates putting
//! new APKs on an edit.
//!
//! ## Layers
//!
//! - [`AppstoreApi`]: one method per REST call, implemented over HTTP by
//!   [`amazon::AppstoreClient`]
//! - [`amazon`]: edit, APK and targeting services that keep ETags fresh
//! - [`Publisher`]: the publish run, either replacing APKs in place or
//!   uploading new ones and moving the old device targeting onto them
//!
//! ## Usage
//!
//! ```ignore
//! use appstore_publisher_stores::{amazon::AppstoreClient, Publisher, PublishOptions};
//!
//! let client = AppstoreClient::authenticate(&api_config, app_id, &profile).await?;
//! let report = Publisher::new(&client, PublishOptions::default())
//!     .publish(&apk_paths)
//!     .await?;
//! ```

pub mod amazon;
pub mod error;
pub mod publish;
pub mod traits;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use error::StoreError;
pub use publish::Publisher;
pub use traits::AppstoreApi;
pub use types::*;
