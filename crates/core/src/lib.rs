#![forbid(unsafe_code)]

pub mod countdown;
pub mod model;
pub mod scoring;
pub mod time;

pub use countdown::Countdown;
pub use time::Clock;
