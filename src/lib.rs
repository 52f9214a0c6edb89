pub mod charset;
pub mod codegen;
pub mod config;
pub mod driver;
pub mod engine;
pub mod ergonomics;
pub mod error;
pub mod mapping;
pub mod report;
pub mod segment;
pub mod stats;

pub use error::{RbResult, RimeBenchError};
