//! Capabilities of the two remote services, and their production clients.

use crate::config::ResourceSettings;
use commons::prelude_errors::*;
use pivnet::v2::{CreateProductFile, CreateRelease, ProductFile, Release, ReleaseDependency};
use std::io::Write;
use std::path::Path;

/// Release-distribution service.
pub trait ReleaseService {
    /// All releases of a product, newest first.
    fn releases(&self, product_slug: &str) -> Fallible<Vec<Release>>;

    /// The release with exactly `version`; not finding one is an error.
    fn release_for_version(&self, product_slug: &str, version: &str) -> Fallible<Release>;

    fn accept_eula(&self, product_slug: &str, release_id: i64) -> Fallible<()>;

    /// Product files of a release, as listed. Entries may lack details
    /// such as the checksum.
    fn product_files(&self, product_slug: &str, release_id: i64) -> Fallible<Vec<ProductFile>>;

    /// Full record of a single product file.
    fn product_file(
        &self,
        product_slug: &str,
        release_id: i64,
        product_file_id: i64,
    ) -> Fallible<ProductFile>;

    fn release_dependencies(
        &self,
        product_slug: &str,
        release_id: i64,
    ) -> Fallible<Vec<ReleaseDependency>>;

    /// Stream a product file into `writer`, returning the number of bytes written.
    fn download_product_file(
        &self,
        product_slug: &str,
        release_id: i64,
        product_file_id: i64,
        writer: &mut dyn Write,
    ) -> Fallible<u64>;

    fn create_release(&self, product_slug: &str, release: &CreateRelease) -> Fallible<Release>;

    fn delete_release(&self, product_slug: &str, release_id: i64) -> Fallible<()>;

    fn create_product_file(
        &self,
        product_slug: &str,
        product_file: &CreateProductFile,
    ) -> Fallible<ProductFile>;

    fn add_product_file(
        &self,
        product_slug: &str,
        release_id: i64,
        product_file_id: i64,
    ) -> Fallible<()>;

    fn add_dependency(
        &self,
        product_slug: &str,
        release_id: i64,
        dependent_release_id: i64,
    ) -> Fallible<()>;
}

/// Object storage holding product files.
pub trait ObjectStore {
    fn bucket(&self) -> &str;

    /// Upload a local file under `key`.
    fn upload_object(&self, key: &str, path: &Path) -> Fallible<()>;

    fn delete_object(&self, key: &str) -> Fallible<()>;
}

impl ReleaseService for pivnet::v2::Client {
    fn releases(&self, product_slug: &str) -> Fallible<Vec<Release>> {
        pivnet::v2::Client::releases(self, product_slug)
    }

    fn release_for_version(&self, product_slug: &str, version: &str) -> Fallible<Release> {
        pivnet::v2::Client::release_for_version(self, product_slug, version)
    }

    fn accept_eula(&self, product_slug: &str, release_id: i64) -> Fallible<()> {
        pivnet::v2::Client::accept_eula(self, product_slug, release_id)
    }

    fn product_files(&self, product_slug: &str, release_id: i64) -> Fallible<Vec<ProductFile>> {
        pivnet::v2::Client::product_files(self, product_slug, release_id)
    }

    fn product_file(
        &self,
        product_slug: &str,
        release_id: i64,
        product_file_id: i64,
    ) -> Fallible<ProductFile> {
        pivnet::v2::Client::product_file(self, product_slug, release_id, product_file_id)
    }

    fn release_dependencies(
        &self,
        product_slug: &str,
        release_id: i64,
    ) -> Fallible<Vec<ReleaseDependency>> {
        pivnet::v2::Client::release_dependencies(self, product_slug, release_id)
    }

    fn download_product_file(
        &self,
        product_slug: &str,
        release_id: i64,
        product_file_id: i64,
        writer: &mut dyn Write,
    ) -> Fallible<u64> {
        pivnet::v2::Client::download_product_file(
            self,
            product_slug,
            release_id,
            product_file_id,
            writer,
        )
    }

    fn create_release(&self, product_slug: &str, release: &CreateRelease) -> Fallible<Release> {
        pivnet::v2::Client::create_release(self, product_slug, release)
    }

    fn delete_release(&self, product_slug: &str, release_id: i64) -> Fallible<()> {
        pivnet::v2::Client::delete_release(self, product_slug, release_id)
    }

    fn create_product_file(
        &self,
        product_slug: &str,
        product_file: &CreateProductFile,
    ) -> Fallible<ProductFile> {
        pivnet::v2::Client::create_product_file(self, product_slug, product_file)
    }

    fn add_product_file(
        &self,
        product_slug: &str,
        release_id: i64,
        product_file_id: i64,
    ) -> Fallible<()> {
        pivnet::v2::Client::add_product_file(self, product_slug, release_id, product_file_id)
    }

    fn add_dependency(
        &self,
        product_slug: &str,
        release_id: i64,
        dependent_release_id: i64,
    ) -> Fallible<()> {
        pivnet::v2::Client::add_dependency(self, product_slug, release_id, dependent_release_id)
    }
}

impl ObjectStore for s3::Client {
    fn bucket(&self) -> &str {
        s3::Client::bucket(self)
    }

    fn upload_object(&self, key: &str, path: &Path) -> Fallible<()> {
        self.put_object(key, path)
    }

    fn delete_object(&self, key: &str) -> Fallible<()> {
        s3::Client::delete_object(self, key)
    }
}

/// Build the release API client.
pub fn release_service(settings: &ResourceSettings) -> Fallible<pivnet::v2::Client> {
    debug!("using release API endpoint {}", settings.endpoint);
    pivnet::v2::Client::builder()
        .api_base(Some(pivnet::v2::api_base_for(&settings.endpoint)))
        .access_token(Some(settings.api_token.clone()))
        .accept_invalid_certs(Some(settings.skip_ssl_verification))
        .build()
        .context("failed to build release API client")
}

/// Build the object storage client.
pub fn object_store(settings: &ResourceSettings) -> Fallible<s3::Client> {
    let config = s3::ClientConfig {
        access_key_id: settings.access_key_id.clone(),
        secret_access_key: settings.secret_access_key.clone(),
        session_token: settings.session_token.clone(),
        region: settings.region.clone(),
        bucket: settings.bucket.clone(),
        endpoint: settings.s3_endpoint.clone(),
        skip_ssl_validation: settings.skip_ssl_verification,
    };
    debug!("using object storage {:?}", config);
    s3::Client::new(config).context("failed to build object storage client")
}
