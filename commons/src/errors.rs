//! Error handling.

/// Fallible result, with a dynamic error carrying its context chain.
pub type Fallible<T> = anyhow::Result<T>;

pub mod prelude {
    //! Re-exports for error handling.

    pub use super::Fallible;
    pub use anyhow::{anyhow, bail, ensure, format_err, Context, Error, Result};
}
