#![cfg_attr(not(feature = "std"), no_std)]

pub mod audio;
pub mod config;
pub mod errors;
#[cfg(feature = "std")]
pub mod fps;
pub mod logging;
pub mod session;

pub use config::{AutoScaleConfig, SessionConfig};
pub use errors::{ScaleError, ScaleResult};
pub use session::ScopeSession;
