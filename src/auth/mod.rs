//! Credentials and bearer-token lifecycle.

pub mod cache;
pub mod clock;
pub mod token;

pub use self::cache::TokenCache;
pub use self::clock::{Clock, SystemClock};
pub use self::token::BearerToken;
