//! Client for the Spikkl geolocation API
//!
//! Provides postal code lookup and reverse geocoding against the
//! [Spikkl](https://www.spikkl.nl) geo API, with country-specific input
//! validation and a typed error taxonomy for every way a call can fail.
//!
//! # Architecture
//!
//! The crate follows a client-trait pattern. [`GeolocationClient`] defines
//! the lookup and reverse operations, implemented by [`SpikklClient`] on top
//! of reqwest. [`Validator`] normalizes postal codes, street numbers, and
//! coordinates per country before a request is built, and
//! [`ApiError::classify`] maps failed responses onto [`ErrorKind`] using the
//! service's failure envelope with an HTTP-status fallback.
//!
//! # Example
//!
//! ```rust,ignore
//! use spikkl::{GeolocationClient, SpikklClient, SpikklConfig};
//!
//! let mut client = SpikklClient::new(&SpikklConfig::default())?;
//! client.set_api_key("0ddf2aa8717c1d3dba1a4bcf2866eb4f")?;
//!
//! let results = client.lookup("nld", "2611HB", Some("175"), None).await?;
//! for record in results {
//!     println!("{record}");
//! }
//! ```

mod client;
mod config;
mod error;
mod models;
mod validator;

pub use client::{API_ENDPOINT, GeolocationClient, SpikklClient};
pub use config::SpikklConfig;
pub use error::{ApiError, ErrorKind};
pub use models::ApiResponse;
pub use validator::{ValidationError, Validator};
