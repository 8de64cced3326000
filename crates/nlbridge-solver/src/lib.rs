//! Shared abstractions between the model translator and the target engine.
//!
//! # Overview
//!
//! - [`NlOptions`]: Run options embedded in a compiled model
//! - [`OptimizerSettings`]: Options resolved against engine defaults
//! - [`OptimizerStatus`]: Engine outcomes and their result codes
//! - [`SystemBuilder`]: Sink receiving variable, objective and constraint declarations
//! - [`Bounds`], [`Sense`], [`SimplifyLevel`]: Plain model types

mod config;
mod status;
mod traits;
pub mod types;

pub use config::{NlOptions, OptimizerSettings};
pub use status::OptimizerStatus;
pub use traits::SystemBuilder;
pub use types::{Bounds, Sense, SimplifyLevel};
