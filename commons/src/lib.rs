//! Common utilities for the pivnet resource crates.

#![deny(missing_docs)]

#[macro_use]
mod config;
pub use crate::config::MergeOptions;

pub mod de;
pub mod testing;

mod errors;
pub use errors::Fallible;

/// Commonly used imports for error handling.
pub mod prelude_errors {
    pub use crate::errors::prelude::*;
}

use crate::prelude_errors::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Strip all leading and trailing slashes from an object-key prefix.
pub fn parse_key_prefix<S>(key_prefix: S) -> String
where
    S: AsRef<str>,
{
    key_prefix.as_ref().trim_matches('/').to_string()
}

/// Join non-empty key segments with a single slash.
pub fn join_key<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    segments
        .into_iter()
        .map(|s| parse_key_prefix(s))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Read the first line of a file, without trailing whitespace.
///
/// Fails if the file cannot be read or if its first line is empty.
pub fn read_first_line<P>(path: P) -> Fallible<String>
where
    P: AsRef<Path>,
{
    let filepath = path.as_ref();
    let file = File::open(filepath).context(format!("could not open '{}'", filepath.display()))?;

    let first_line = BufReader::new(file)
        .lines()
        .next()
        .ok_or_else(|| format_err!("'{}' is empty", filepath.display()))?;

    let line = first_line
        .context(format!("could not read '{}'", filepath.display()))?
        .trim()
        .to_string();

    if line.is_empty() {
        bail!("found an empty first line in '{}'", filepath.display())
    }

    Ok(line)
}

/// Map a verbosity count to a log level.
///
/// Informational messages are always shown, as they are the only feedback
/// a pipeline user gets.
pub fn verbosity_to_level(occurrences: u64) -> log::LevelFilter {
    match occurrences {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

/// Initialize logging on stderr for the given crates.
///
/// `RUST_LOG` is honoured, then `level` is applied to each crate in `targets`.
pub fn init_logging(targets: &[&str], level: log::LevelFilter) {
    let mut builder = env_logger::Builder::from_default_env();
    builder.target(env_logger::Target::Stderr);
    for target in targets {
        builder.filter(Some(target), level);
    }
    // A logger may already be installed, e.g. by tests.
    let _ = builder.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_key_prefix() {
        assert_eq!(parse_key_prefix(""), "");
        assert_eq!(parse_key_prefix("/"), "");
        assert_eq!(parse_key_prefix("//a/b/"), "a/b");
        assert_eq!(parse_key_prefix("a"), "a");
    }

    #[test]
    fn test_join_key() {
        assert_eq!(join_key(vec!["product_files", "/prefix/", "file.tgz"]), "product_files/prefix/file.tgz");
        assert_eq!(join_key(vec!["product_files", "", "file.tgz"]), "product_files/file.tgz");
    }

    #[test]
    fn test_read_first_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  1.2.3  \nsecond line").unwrap();

        let line = read_first_line(file.path()).unwrap();
        assert_eq!(line, "1.2.3");
    }

    #[test]
    fn test_read_first_line_empty() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(read_first_line(file.path()).is_err());

        let mut blank = tempfile::NamedTempFile::new().unwrap();
        writeln!(blank, "   ").unwrap();
        let err = read_first_line(blank.path()).unwrap_err();
        assert!(err.to_string().contains("empty first line"));
    }

    #[test]
    fn test_read_first_line_missing() {
        let err = read_first_line("/nonexistent/version").unwrap_err();
        assert!(err.to_string().contains("could not open"));
    }

    #[test]
    fn test_verbosity_to_level() {
        use log::LevelFilter;

        assert_eq!(verbosity_to_level(0), LevelFilter::Info);
        assert_eq!(verbosity_to_level(1), LevelFilter::Debug);
        assert_eq!(verbosity_to_level(2), LevelFilter::Trace);
        assert_eq!(verbosity_to_level(7), LevelFilter::Trace);
    }
}
