//! Command implementations.

mod list;
mod run;

pub use list::List;
pub use run::Run;

use std::path::PathBuf;

/// Content shipped with the workspace.
pub(crate) const DEFAULT_DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../content/data");

pub(crate) fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}
