//! Dashboard configuration

pub mod dashboard;
pub mod null_handling;

pub use dashboard::*;
pub use null_handling::*;
