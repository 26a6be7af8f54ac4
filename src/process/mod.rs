//! Unit processing pipeline.
//!
//! - [`Loader`] - Runs one configuration unit
//! - [`Batcher`] - Runs many units in parallel

mod session;
pub mod loader;
#[cfg(feature = "batch")]
pub mod batch;

pub use loader::{Loader, LoaderOutput};
pub use session::{Dependencies, DependencySession};

#[cfg(feature = "batch")]
pub use batch::Batcher;
