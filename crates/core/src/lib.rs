#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod time;
pub mod xp;

pub use error::Error;
pub use time::Clock;
