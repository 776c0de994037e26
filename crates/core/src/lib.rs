#![forbid(unsafe_code)]

pub mod error;
pub mod i18n;
pub mod model;
pub mod problem;
pub mod scoring;
pub mod time;

pub use error::Error;
pub use time::Clock;
