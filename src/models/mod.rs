//! Validated domain value objects.

pub mod card;
pub mod geo;

pub use self::card::{CardExpiry, CardNumber};
pub use self::geo::{LatLng, SpatialPoint};
