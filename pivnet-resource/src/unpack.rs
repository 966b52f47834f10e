//! Extraction of downloaded tarballs.

use commons::prelude_errors::*;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tar::Archive;

#[derive(Debug, PartialEq, Eq)]
enum Format {
    Tar,
    TarGz,
}

fn format_of(path: &Path) -> Option<Format> {
    let name = path.file_name()?.to_str()?.to_ascii_lowercase();
    if name.ends_with(".tgz") || name.ends_with(".tar.gz") {
        Some(Format::TarGz)
    } else if name.ends_with(".tar") {
        Some(Format::Tar)
    } else {
        None
    }
}

/// Extract `archive` into `dir` if it is a tarball.
///
/// Returns whether anything was extracted; other files are left untouched.
pub(crate) fn unpack_archive(archive: &Path, dir: &Path) -> Fallible<bool> {
    let format = match format_of(archive) {
        Some(format) => format,
        None => {
            debug!("not unpacking '{}'", archive.display());
            return Ok(false);
        }
    };

    let file = File::open(archive).context(format!("could not open '{}'", archive.display()))?;
    let reader: Box<dyn Read> = match format {
        Format::TarGz => Box::new(GzDecoder::new(file)),
        Format::Tar => Box::new(file),
    };

    info!("Unpacking '{}'", archive.display());
    Archive::new(reader)
        .unpack(dir)
        .context(format!("failed to unpack '{}'", archive.display()))?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use pretty_assertions::assert_eq;

    fn tarball<W: std::io::Write>(writer: W) -> W {
        let mut builder = tar::Builder::new(writer);
        let content = b"#!/bin/sh\necho hello\n";
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(&mut header, "bin/hello.sh", &content[..])
            .unwrap();
        builder.into_inner().unwrap()
    }

    #[test]
    fn formats() {
        assert_eq!(format_of(Path::new("a/b.tgz")), Some(Format::TarGz));
        assert_eq!(format_of(Path::new("b.TAR.GZ")), Some(Format::TarGz));
        assert_eq!(format_of(Path::new("b.tar")), Some(Format::Tar));
        assert_eq!(format_of(Path::new("b.zip")), None);
        assert_eq!(format_of(Path::new("b.pivotal")), None);
    }

    #[test]
    fn unpack_gzipped_tarball() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("product.tgz");
        let encoder = tarball(GzEncoder::new(File::create(&path).unwrap(), Compression::default()));
        encoder.finish().unwrap();

        assert!(unpack_archive(&path, dir.path()).unwrap());
        let extracted = std::fs::read_to_string(dir.path().join("bin/hello.sh")).unwrap();
        assert_eq!(extracted, "#!/bin/sh\necho hello\n");
    }

    #[test]
    fn unpack_plain_tarball() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("product.tar");
        tarball(File::create(&path).unwrap());

        assert!(unpack_archive(&path, dir.path()).unwrap());
        assert!(dir.path().join("bin/hello.sh").is_file());
    }

    #[test]
    fn other_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = commons::testing::write_file(dir.path(), "product.zip", "zip").unwrap();

        assert!(!unpack_archive(&path, dir.path()).unwrap());
    }

    #[test]
    fn corrupt_tarball() {
        let dir = tempfile::tempdir().unwrap();
        let path = commons::testing::write_file(dir.path(), "product.tgz", "not gzip").unwrap();

        let err = unpack_archive(&path, dir.path()).unwrap_err();
        assert!(err.to_string().starts_with("failed to unpack"));
    }
}
