//! Configuration lookup, parsing and validation.
//!
//! Options are sourced from two inputs and merged on top of defaults:
//!  * "options": configuration fragments (CLI flags, the JSON `source` block).
//!  * "resource settings": runtime settings, result of the merge.

pub mod cli;
mod settings;

pub use self::cli::{CliOptions, Command};
pub use self::settings::ResourceSettings;
