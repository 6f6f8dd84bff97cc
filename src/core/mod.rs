//! Core types and constants for the positioning system

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
