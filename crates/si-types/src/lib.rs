//! # si-types
//!
//! Shared vocabulary for the exploration stack: parameter spaces, study
//! configuration, trial bookkeeping, build results, the design trait, and
//! the error hierarchy.

pub mod config;
pub mod design;
pub mod errors;
pub mod parameter;
pub mod result;
pub mod trial;

pub use config::*;
pub use design::*;
pub use errors::*;
pub use parameter::*;
pub use result::*;
pub use trial::*;
