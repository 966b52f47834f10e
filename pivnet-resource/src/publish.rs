//! `out`: create a release and upload its product file.

use crate::clients::{ObjectStore, ReleaseService};
use crate::concourse::{OutRequest, OutResponse, Version};
use crate::config::ResourceSettings;
use crate::metadata::{self, MetadataFile, ProductFileMetadata, ReleaseMetadata};
use crate::{files, globs, versions};
use commons::prelude_errors::*;
use pivnet::v2::{CreateProductFile, CreateRelease, Eula, Release, ReleaseDependency};
use std::path::Path;

/// Object key prefix of all product files.
pub static PRODUCT_FILES_PREFIX: &str = "product_files";

/// Product file type of uploaded artifacts.
pub static FILE_TYPE_SOFTWARE: &str = "Software";

/// Value acknowledging open-source compliance on release creation.
static OSS_COMPLIANT: &str = "confirm";

/// Release to copy unset metadata from.
struct Template {
    release: Release,
    dependencies: Vec<ReleaseDependency>,
}

/// Pick a field from metadata, then from the template release.
fn pick(explicit: &Option<String>, copied: Option<&Option<String>>) -> Option<String> {
    explicit
        .clone()
        .or_else(|| copied.and_then(|c| c.clone()))
        .filter(|v| !v.trim().is_empty())
}

fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

fn build_release(
    settings: &ResourceSettings,
    version: &str,
    meta: &ReleaseMetadata,
    template: Option<&Release>,
) -> Fallible<CreateRelease> {
    let release_type = meta
        .release_type
        .clone()
        .or_else(|| settings.release_type.clone())
        .or_else(|| template.and_then(|t| t.release_type.clone()))
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| format_err!("release_type must be provided in metadata_file or source"))?;

    let eula_slug = meta
        .eula_slug
        .clone()
        .or_else(|| template.and_then(|t| t.eula.as_ref().map(|e| e.slug.clone())))
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| format_err!("eula_slug must be provided in metadata_file"))?;

    Ok(CreateRelease {
        version: version.to_string(),
        release_type,
        eula: Eula {
            slug: eula_slug,
            ..Default::default()
        },
        release_date: Some(
            pick(&meta.release_date, template.map(|t| &t.release_date)).unwrap_or_else(today),
        ),
        release_notes_url: pick(
            &meta.release_notes_url,
            template.map(|t| &t.release_notes_url),
        ),
        description: pick(&meta.description, template.map(|t| &t.description)),
        availability: pick(&meta.availability, template.map(|t| &t.availability)),
        oss_compliant: OSS_COMPLIANT.to_string(),
    })
}

/// Register an uploaded object as a product file of `release`.
fn register_product_file<R>(
    service: &R,
    slug: &str,
    release: &Release,
    product_file: &CreateProductFile,
) -> Fallible<()>
where
    R: ReleaseService + ?Sized,
{
    let created = service.create_product_file(slug, product_file)?;
    service.add_product_file(slug, release.id, created.id)?;
    info!(
        "Added product file '{}' to release '{}'",
        created.name, release.version
    );
    Ok(())
}

/// Upload `local_file` below `prefix` and attach it to `release`.
///
/// The uploaded object is removed again when registration fails.
fn upload_product_file<R, O>(
    service: &R,
    store: &O,
    slug: &str,
    release: &Release,
    local_file: &Path,
    prefix: &str,
    file_meta: ProductFileMetadata,
) -> Fallible<()>
where
    R: ReleaseService + ?Sized,
    O: ObjectStore + ?Sized,
{
    let file_name = local_file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| format_err!("'{}' has no file name", local_file.display()))?;
    let key = commons::join_key(vec![PRODUCT_FILES_PREFIX, prefix, file_name.as_str()]);

    store.upload_object(&key, local_file)?;

    let product_file = CreateProductFile {
        name: file_meta.upload_as.unwrap_or_else(|| file_name.clone()),
        aws_object_key: key.clone(),
        file_type: FILE_TYPE_SOFTWARE.to_string(),
        file_version: release.version.clone(),
        sha256: Some(files::sha256_file(local_file)?),
        description: file_meta.description,
    };
    if let Err(e) = register_product_file(service, slug, release, &product_file) {
        warn!("removing s3://{}/{} after failed registration", store.bucket(), key);
        if let Err(cleanup) = store.delete_object(&key) {
            warn!("could not remove s3://{}/{}: {}", store.bucket(), key, cleanup);
        }
        return Err(e);
    }
    Ok(())
}

pub fn run<R, O>(
    service: &R,
    store: &O,
    settings: &ResourceSettings,
    request: &OutRequest,
    sources: &Path,
) -> Fallible<OutResponse>
where
    R: ReleaseService + ?Sized,
    O: ObjectStore + ?Sized,
{
    let params = &request.params;
    let slug = settings.product_slug.as_str();

    let version_file = params
        .version_file
        .as_deref()
        .ok_or_else(|| format_err!("version_file must be provided"))?;
    let version = commons::read_first_line(sources.join(version_file))
        .context(format!("failed to read version file '{}'", version_file))?;
    info!("Publishing version '{}' of '{}'", version, slug);

    let meta = match params.metadata_file {
        Some(ref path) => MetadataFile::read(&sources.join(path))?,
        None => MetadataFile::default(),
    };
    let release_meta = meta.release.clone().unwrap_or_default();

    let file_glob = params
        .file_glob
        .as_deref()
        .ok_or_else(|| format_err!("file_glob must be provided"))?;
    let local_file = globs::single_match(sources, file_glob)?;

    let (existing, releases): (Vec<Release>, Vec<Release>) = service
        .releases(slug)?
        .into_iter()
        .partition(|r| r.version == version);
    let existing = existing.into_iter().next();
    if existing.is_some() && !params.override_existing {
        bail!("release already exists with version '{}'", version);
    }

    let template = if settings.copy_metadata {
        match versions::sort_releases(settings.sort_by, releases)
            .into_iter()
            .next()
        {
            Some(release) => {
                info!("Copying metadata from release '{}'", release.version);
                let dependencies = service.release_dependencies(slug, release.id)?;
                Some(Template {
                    release,
                    dependencies,
                })
            }
            None => {
                warn!("no existing release to copy metadata from");
                None
            }
        }
    } else {
        None
    };

    let new_release = build_release(
        settings,
        &version,
        &release_meta,
        template.as_ref().map(|t| &t.release),
    )?;

    if let Some(existing) = existing {
        info!("Deleting existing release '{}'", version);
        service.delete_release(slug, existing.id)?;
    }

    info!("Creating new release '{}'", version);
    let release = service.create_release(slug, &new_release)?;

    let relative_path = local_file
        .strip_prefix(sources)
        .unwrap_or(&local_file)
        .to_string_lossy()
        .to_string();
    let file_meta = meta.product_file_for(&relative_path).cloned().unwrap_or_default();
    let prefix = params.s3_filepath_prefix.as_deref().unwrap_or_default();
    upload_product_file(service, store, slug, &release, &local_file, prefix, file_meta)
        .with_context(|| {
            format!(
                "release '{}' (id {}) was created without its product file",
                release.version, release.id
            )
        })?;

    if let Some(template) = template {
        for dependency in &template.dependencies {
            debug!(
                "adding dependency on '{}' {}",
                dependency.release.product.slug, dependency.release.version
            );
            service.add_dependency(slug, release.id, dependency.release.id)?;
        }
    }

    info!("Created release '{}'", release.version);
    Ok(OutResponse {
        version: Version::new(version),
        metadata: metadata::release_metadata(&release),
    })
}
