//! Pipeline resource for products published on Pivotal Network.
//!
//! The three resource operations are exposed as library functions:
//!  * [`check::run`] lists new product versions.
//!  * [`fetch::run`] downloads a release into a directory (`in`).
//!  * [`publish::run`] creates a release and uploads its artifact (`out`).
//!
//! Network access goes through the [`clients::ReleaseService`] and
//! [`clients::ObjectStore`] traits.

#[macro_use]
extern crate commons;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate smart_default;
#[macro_use]
extern crate structopt;

pub mod check;
pub mod clients;
pub mod concourse;
pub mod config;
pub mod fetch;
mod files;
pub mod globs;
pub mod metadata;
pub mod publish;
#[cfg(any(test, feature = "test"))]
pub mod testing;
mod unpack;
pub mod validator;
pub mod versions;

pub use crate::config::ResourceSettings;
