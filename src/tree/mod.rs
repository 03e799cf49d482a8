//! Directory tree encryption and reconstruction.

mod engine;
mod walk;

pub use engine::{ProgressObserver, TreeProcessor, TreeSummary};
