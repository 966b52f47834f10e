//! Product file transfer helpers.

use crate::clients::ReleaseService;
use commons::prelude_errors::*;
use pivnet::v2::ProductFile;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Writer computing the SHA-256 digest of everything written through it.
struct HashingWriter<W> {
    inner: W,
    hasher: Sha256,
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.hasher.update(&buf[..written]);
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Hex-encoded SHA-256 digest of a local file.
pub(crate) fn sha256_file(path: &Path) -> Fallible<String> {
    let mut file = File::open(path).context(format!("could not open '{}'", path.display()))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).context(format!("could not read '{}'", path.display()))?;
    Ok(hex::encode(hasher.finalize()))
}

/// Download a product file into `dir`, under its file name.
///
/// When the API knows the file checksum, the downloaded content must match
/// it; a mismatching file is removed.
pub(crate) fn download_product_file<R>(
    service: &R,
    product_slug: &str,
    release_id: i64,
    product_file: &ProductFile,
    dir: &Path,
) -> Fallible<PathBuf>
where
    R: ReleaseService + ?Sized,
{
    let path = dir.join(product_file.file_name());
    info!(
        "Downloading '{}' to '{}'",
        product_file.name,
        path.display()
    );

    let file = File::create(&path).context(format!("could not create '{}'", path.display()))?;
    let mut writer = HashingWriter {
        inner: io::BufWriter::new(file),
        hasher: Sha256::new(),
    };
    service.download_product_file(product_slug, release_id, product_file.id, &mut writer)?;
    writer.flush()?;

    let actual = hex::encode(writer.hasher.finalize());
    match product_file.sha256.as_deref().filter(|s| !s.is_empty()) {
        Some(expected) if !expected.eq_ignore_ascii_case(&actual) => {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!("could not remove '{}': {}", path.display(), e);
            }
            bail!(
                "sha256 mismatch for '{}': expected {}, got {}",
                product_file.file_name(),
                expected,
                actual
            );
        }
        Some(_) => debug!("verified sha256 of '{}'", path.display()),
        None => debug!("no sha256 known for '{}'", product_file.file_name()),
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeReleaseService;
    use pretty_assertions::assert_eq;

    // sha256("some content")
    static CONTENT_SHA256: &str = "290f493c44f5d63d06b374d0a5abd292fae38b92cab2fae5efefe1b0e9347f56";

    fn product_file(sha256: Option<&str>) -> ProductFile {
        ProductFile {
            id: 7,
            name: "Some Product".to_string(),
            aws_object_key: "product_files/some-product/product.tgz".to_string(),
            sha256: sha256.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn hash_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = commons::testing::write_file(dir.path(), "f", "some content").unwrap();
        assert_eq!(sha256_file(&path).unwrap(), CONTENT_SHA256);
    }

    #[test]
    fn download_verifies_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let file = product_file(Some(&CONTENT_SHA256.to_uppercase()));
        let service = FakeReleaseService::new().with_product_file(1, file.clone(), "some content");

        let path = download_product_file(&service, "some-product", 1, &file, dir.path()).unwrap();
        assert_eq!(path, dir.path().join("product.tgz"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "some content");
    }

    #[test]
    fn download_checksum_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let file = product_file(Some("0000"));
        let service = FakeReleaseService::new().with_product_file(1, file.clone(), "some content");

        let err = download_product_file(&service, "some-product", 1, &file, dir.path()).unwrap_err();
        assert!(err.to_string().starts_with("sha256 mismatch for 'product.tgz'"));
        assert!(!dir.path().join("product.tgz").exists());
    }

    #[test]
    fn download_without_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let file = product_file(None);
        let service = FakeReleaseService::new().with_product_file(1, file.clone(), "");

        let path = download_product_file(&service, "some-product", 1, &file, dir.path()).unwrap();
        assert_eq!(std::fs::read(&path).unwrap().len(), 0);
    }
}
