//! Glob matching, for local files to upload and remote files to download.

use commons::prelude_errors::*;
use itertools::Itertools;
use pivnet::v2::ProductFile;
use std::path::{Path, PathBuf};

/// Resolve `pattern` inside `dir` to exactly one regular file.
pub fn single_match(dir: &Path, pattern: &str) -> Fallible<PathBuf> {
    let full_pattern = format!(
        "{}/{}",
        glob::Pattern::escape(&dir.to_string_lossy()).trim_end_matches('/'),
        pattern.trim_start_matches('/')
    );

    let mut matches: Vec<PathBuf> = glob::glob(&full_pattern)
        .context(format!("invalid glob pattern '{}'", pattern))?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    trace!("pattern '{}' matched {:?}", full_pattern, matches);

    match matches.len() {
        0 => bail!("no matches found for pattern: '{}'", pattern),
        1 => Ok(matches.remove(0)),
        _ => bail!(
            "more than one match found for pattern: '{}': [{}]",
            pattern,
            matches.iter().map(|p| p.display()).join(", ")
        ),
    }
}

/// Select product files whose file name matches any of `globs`.
///
/// Without globs every file is selected. Each glob must match at least one
/// file. Selected files keep their original order.
pub fn select_product_files<'a>(
    files: &'a [ProductFile],
    globs: Option<&[String]>,
) -> Fallible<Vec<&'a ProductFile>> {
    let globs = match globs {
        Some(globs) => globs,
        None => return Ok(files.iter().collect()),
    };

    let patterns = globs
        .iter()
        .map(|g| glob::Pattern::new(g).context(format!("invalid glob pattern '{}'", g)))
        .collect::<Fallible<Vec<_>>>()?;

    for (pattern, raw) in patterns.iter().zip(globs) {
        if !files.iter().any(|f| pattern.matches(f.file_name())) {
            bail!("no product files match glob '{}'", raw);
        }
    }

    Ok(files
        .iter()
        .filter(|f| patterns.iter().any(|p| p.matches(f.file_name())))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use commons::testing::write_file;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_match_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let expected = write_file(dir.path(), "build/product-1.2.3.tgz", "x").unwrap();
        write_file(dir.path(), "build/notes.txt", "x").unwrap();

        let found = single_match(dir.path(), "build/*.tgz").unwrap();
        assert_eq!(found, expected);
    }

    #[test]
    fn single_match_no_file() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "notes.txt", "x").unwrap();

        let err = single_match(dir.path(), "*.tgz").unwrap_err();
        assert_eq!(err.to_string(), "no matches found for pattern: '*.tgz'");
    }

    #[test]
    fn single_match_ignores_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("product.tgz")).unwrap();

        let err = single_match(dir.path(), "*.tgz").unwrap_err();
        assert!(err.to_string().starts_with("no matches found"));
    }

    #[test]
    fn single_match_ambiguous() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "a.tgz", "x").unwrap();
        write_file(dir.path(), "b.tgz", "x").unwrap();

        let err = single_match(dir.path(), "*.tgz").unwrap_err();
        assert!(err
            .to_string()
            .starts_with("more than one match found for pattern: '*.tgz'"));
    }

    fn product_file(id: i64, key: &str) -> ProductFile {
        ProductFile {
            id,
            name: format!("file {}", id),
            aws_object_key: key.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn select_all_without_globs() {
        let files = vec![product_file(1, "p/a.tgz"), product_file(2, "p/b.zip")];
        let selected = select_product_files(&files, None).unwrap();
        assert_eq!(selected.len(), 2);

        let selected = select_product_files(&files, Some(&[][..])).unwrap();
        assert!(selected.is_empty());
    }

    #[test]
    fn select_by_file_name() {
        let files = vec![
            product_file(1, "product_files/p/a.tgz"),
            product_file(2, "product_files/p/b.zip"),
            product_file(3, "product_files/p/c.tgz"),
        ];
        let globs = vec!["*.tgz".to_string(), "a*".to_string()];

        let ids: Vec<i64> = select_product_files(&files, Some(globs.as_slice()))
            .unwrap()
            .into_iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn select_glob_without_match() {
        let files = vec![product_file(1, "p/a.tgz")];
        let globs = vec!["*.tgz".to_string(), "*.pivotal".to_string()];

        let err = select_product_files(&files, Some(globs.as_slice())).unwrap_err();
        assert_eq!(err.to_string(), "no product files match glob '*.pivotal'");
    }
}
