//! Amazon Appstore integration
//!
//! Provides APK publishing via the Amazon Appstore edits API.
//!
//! ## Authentication
//!
//! Uses a Login with Amazon security profile (client id and secret) with
//! access to the Appstore submission API.
//!
//! ## Concurrency
//!
//! The API uses optimistic concurrency: every mutating call carries an
//! `If-Match` header with the ETag of a previous read. The services in this
//! module always read right before they write and never keep ETags around.
//!
//! ## Usage
//!
//! ```ignore
//! use appstore_publisher_stores::amazon::{AppstoreClient, SecurityProfile};
//! use appstore_publisher_stores::{ApiConfig, Publisher, PublishOptions};
//!
//! let profile = SecurityProfile::from_file(&profile_path)?;
//! let client = AppstoreClient::authenticate(&ApiConfig::default(), app_id, &profile).await?;
//! let report = Publisher::new(&client, PublishOptions::default()).publish(&apks).await?;
//! ```

pub mod apks;
pub mod auth;
pub mod client;
pub mod edits;
pub mod targeting;

pub use apks::ApkService;
pub use auth::{fetch_token, AccessToken, SecurityProfile};
pub use client::AppstoreClient;
pub use edits::EditService;
pub use targeting::{disable_targeting, TargetingService};
