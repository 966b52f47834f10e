//! `in`: download a release into the destination directory.

use crate::clients::ReleaseService;
use crate::concourse::{InRequest, InResponse, Version};
use crate::config::ResourceSettings;
use crate::metadata::{self, MetadataFile};
use crate::{files, globs, unpack};
use commons::prelude_errors::*;
use std::path::Path;

/// File holding the fetched version.
pub static VERSION_FILE: &str = "version";

pub fn run<R>(
    service: &R,
    settings: &ResourceSettings,
    request: &InRequest,
    destination: &Path,
) -> Fallible<InResponse>
where
    R: ReleaseService + ?Sized,
{
    let slug = settings.product_slug.as_str();
    let version = request.version.product_version.as_str();

    std::fs::create_dir_all(destination)
        .context(format!("could not create '{}'", destination.display()))?;

    info!("Getting release '{}' of '{}'", version, slug);
    let release = service.release_for_version(slug, version)?;

    info!("Accepting EULA");
    service.accept_eula(slug, release.id)?;

    let product_files = service.product_files(slug, release.id)?;
    let selected = globs::select_product_files(&product_files, request.params.globs.as_deref())?;
    debug!(
        "downloading {} of {} product files",
        selected.len(),
        product_files.len()
    );

    let mut downloaded = Vec::with_capacity(selected.len());
    for listed in selected {
        // Listed entries may lack the checksum.
        let product_file = service.product_file(slug, release.id, listed.id)?;
        let path = files::download_product_file(service, slug, release.id, &product_file, destination)?;
        if request.params.unpack {
            unpack::unpack_archive(&path, destination)?;
        }
        downloaded.push(product_file);
    }

    let dependencies = service.release_dependencies(slug, release.id)?;
    debug!("release has {} dependencies", dependencies.len());

    let version_path = destination.join(VERSION_FILE);
    std::fs::write(&version_path, version)
        .context(format!("could not write '{}'", version_path.display()))?;

    MetadataFile::describe(&release, &downloaded, &dependencies).write_to(destination)?;

    Ok(InResponse {
        version: Version::new(version),
        metadata: metadata::release_metadata(&release),
    })
}
