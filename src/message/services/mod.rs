//! Services operating on message histories.

mod sanitizer;

pub use sanitizer::sanitize;
