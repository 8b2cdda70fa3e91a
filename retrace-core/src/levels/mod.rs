//! Support/resistance: extrema detection, then touch validation.

pub mod detector;
pub mod validator;

pub use detector::detect;
pub use validator::{touch_count, validate, Validation};
