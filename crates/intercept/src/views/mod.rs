//! Lazy bulk-access views over whole-map snapshots.

mod env;
mod properties;

pub use env::{EnvIter, EnvView};
pub use properties::{PropertiesIter, PropertiesView};
