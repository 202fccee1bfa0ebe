//! # apikr
//!
//! Rust client library for the SK Planet TMap and Iamport HTTP APIs.
//!
//! One authenticated transport ([`Api`]) is shared by two facades: [`TMap`]
//! for routing and geocoding, and [`Iamport`] for subscription payments.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use apikr::{Api, Configuration, LatLng, Provider, Result, TMap};
//! use apikr::tmap::{RouteOptions, SearchOption};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Configuration::from_env(Provider::TMap)?;
//!     let tmap = TMap::new(Api::new(config));
//!
//!     let seoul = LatLng::new("37.55510690", "126.97069110")?;
//!     let daegu = LatLng::new("35.87143540", "128.60144500")?;
//!     let meters = tmap
//!         .get_distance(&seoul, &daegu, &RouteOptions::new(SearchOption::Shortest))
//!         .await?;
//!
//!     println!("{} m", meters);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod iamport;
pub mod mapper;
pub mod models;
pub mod result;
pub mod tmap;
pub mod transport;

// Re-exports for ergonomic usage
pub use auth::{BearerToken, Clock, SystemClock};
pub use client::{Api, ApiBuilder};
pub use config::{Configuration, Provider};
pub use error::{Error, ErrorKind, ProviderFailure, Result};
pub use iamport::Iamport;
pub use mapper::{ErrorShape, Outcome};
pub use models::{CardExpiry, CardNumber, LatLng, SpatialPoint};
pub use result::ApiResult;
pub use tmap::TMap;
pub use transport::{
    ApiRequest, AuthMode, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport,
    TransportError,
};
