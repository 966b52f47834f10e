//! Test helpers.

use crate::Fallible;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Initialize logging.
pub fn init_logger() -> Fallible<()> {
    env_logger::Builder::from_default_env()
        .is_test(true)
        .try_init()?;
    Ok(())
}

/// Write `content` to `name` inside `dir`, returning the full path.
pub fn write_file<P, S>(dir: P, name: &str, content: S) -> Fallible<PathBuf>
where
    P: AsRef<Path>,
    S: AsRef<[u8]>,
{
    let path = dir.as_ref().join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::File::create(&path)?;
    file.write_all(content.as_ref())?;
    Ok(path)
}
