//! In-memory doubles of the remote services.
//!
//! Both doubles record every call and can be told to fail a given
//! operation, which is identified by its trait method name.

use crate::clients::{ObjectStore, ReleaseService};
use commons::prelude_errors::*;
use pivnet::v2::{
    CreateProductFile, CreateRelease, DependentRelease, ProductFile, Release, ReleaseDependency,
};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Call received by a test double.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Releases(String),
    ReleaseForVersion(String, String),
    AcceptEula(String, i64),
    ProductFiles(String, i64),
    ProductFile(String, i64, i64),
    ReleaseDependencies(String, i64),
    DownloadProductFile(String, i64, i64),
    CreateRelease(String, CreateRelease),
    DeleteRelease(String, i64),
    CreateProductFile(String, CreateProductFile),
    AddProductFile(String, i64, i64),
    AddDependency(String, i64, i64),
    UploadObject(String, PathBuf),
    DeleteObject(String),
}

fn fail_if_configured(failures: &HashMap<&'static str, String>, operation: &str) -> Fallible<()> {
    match failures.get(operation) {
        Some(message) => Err(format_err!("{}", message)),
        None => Ok(()),
    }
}

/// Release service backed by in-memory state.
#[derive(Debug)]
pub struct FakeReleaseService {
    releases: RefCell<Vec<Release>>,
    product_files: RefCell<HashMap<i64, Vec<ProductFile>>>,
    file_details: HashMap<i64, ProductFile>,
    created_files: RefCell<HashMap<i64, ProductFile>>,
    contents: HashMap<i64, Vec<u8>>,
    dependencies: RefCell<HashMap<i64, Vec<ReleaseDependency>>>,
    failures: HashMap<&'static str, String>,
    next_id: Cell<i64>,
    calls: RefCell<Vec<Call>>,
}

impl Default for FakeReleaseService {
    fn default() -> Self {
        Self {
            releases: RefCell::default(),
            product_files: RefCell::default(),
            file_details: HashMap::new(),
            created_files: RefCell::default(),
            contents: HashMap::new(),
            dependencies: RefCell::default(),
            failures: HashMap::new(),
            next_id: Cell::new(1000),
            calls: RefCell::default(),
        }
    }
}

impl FakeReleaseService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a release; releases are listed in insertion order.
    pub fn with_release(self, release: Release) -> Self {
        self.releases.borrow_mut().push(release);
        self
    }

    /// Attach a product file with the given content to a release.
    pub fn with_product_file<C: Into<Vec<u8>>>(
        mut self,
        release_id: i64,
        product_file: ProductFile,
        content: C,
    ) -> Self {
        self.contents.insert(product_file.id, content.into());
        self.product_files
            .borrow_mut()
            .entry(release_id)
            .or_default()
            .push(product_file);
        self
    }

    /// Serve `product_file` as the full record of the file with its id,
    /// in place of the listed entry.
    pub fn with_product_file_details(mut self, product_file: ProductFile) -> Self {
        self.file_details.insert(product_file.id, product_file);
        self
    }

    pub fn with_dependency(self, release_id: i64, dependency: ReleaseDependency) -> Self {
        self.dependencies
            .borrow_mut()
            .entry(release_id)
            .or_default()
            .push(dependency);
        self
    }

    /// Make `operation` fail with `message`.
    pub fn failing<S: Into<String>>(mut self, operation: &'static str, message: S) -> Self {
        self.failures.insert(operation, message.into());
        self
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Current releases, in listing order.
    pub fn current_releases(&self) -> Vec<Release> {
        self.releases.borrow().clone()
    }

    /// Product files currently attached to a release.
    pub fn attached_files(&self, release_id: i64) -> Vec<ProductFile> {
        self.product_files
            .borrow()
            .get(&release_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Ids of the releases a release depends on.
    pub fn dependency_ids(&self, release_id: i64) -> Vec<i64> {
        self.dependencies
            .borrow()
            .get(&release_id)
            .map(|deps| deps.iter().map(|d| d.release.id).collect())
            .unwrap_or_default()
    }

    fn record(&self, operation: &str, call: Call) -> Fallible<()> {
        self.calls.borrow_mut().push(call);
        fail_if_configured(&self.failures, operation)
    }

    fn allocate_id(&self) -> i64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    fn find_release(&self, release_id: i64) -> Fallible<Release> {
        self.releases
            .borrow()
            .iter()
            .find(|r| r.id == release_id)
            .cloned()
            .ok_or_else(|| format_err!("release {} not found", release_id))
    }
}

impl ReleaseService for FakeReleaseService {
    fn releases(&self, product_slug: &str) -> Fallible<Vec<Release>> {
        self.record("releases", Call::Releases(product_slug.to_string()))?;
        Ok(self.current_releases())
    }

    fn release_for_version(&self, product_slug: &str, version: &str) -> Fallible<Release> {
        self.record(
            "release_for_version",
            Call::ReleaseForVersion(product_slug.to_string(), version.to_string()),
        )?;
        self.current_releases()
            .into_iter()
            .find(|r| r.version == version)
            .ok_or_else(|| format_err!("release not found for version '{}'", version))
    }

    fn accept_eula(&self, product_slug: &str, release_id: i64) -> Fallible<()> {
        self.record(
            "accept_eula",
            Call::AcceptEula(product_slug.to_string(), release_id),
        )?;
        self.find_release(release_id).map(|_| ())
    }

    fn product_files(&self, product_slug: &str, release_id: i64) -> Fallible<Vec<ProductFile>> {
        self.record(
            "product_files",
            Call::ProductFiles(product_slug.to_string(), release_id),
        )?;
        Ok(self.attached_files(release_id))
    }

    fn product_file(
        &self,
        product_slug: &str,
        release_id: i64,
        product_file_id: i64,
    ) -> Fallible<ProductFile> {
        self.record(
            "product_file",
            Call::ProductFile(product_slug.to_string(), release_id, product_file_id),
        )?;
        if let Some(details) = self.file_details.get(&product_file_id) {
            return Ok(details.clone());
        }
        self.attached_files(release_id)
            .into_iter()
            .find(|f| f.id == product_file_id)
            .ok_or_else(|| format_err!("product file {} not found", product_file_id))
    }

    fn release_dependencies(
        &self,
        product_slug: &str,
        release_id: i64,
    ) -> Fallible<Vec<ReleaseDependency>> {
        self.record(
            "release_dependencies",
            Call::ReleaseDependencies(product_slug.to_string(), release_id),
        )?;
        Ok(self
            .dependencies
            .borrow()
            .get(&release_id)
            .cloned()
            .unwrap_or_default())
    }

    fn download_product_file(
        &self,
        product_slug: &str,
        release_id: i64,
        product_file_id: i64,
        writer: &mut dyn Write,
    ) -> Fallible<u64> {
        self.record(
            "download_product_file",
            Call::DownloadProductFile(product_slug.to_string(), release_id, product_file_id),
        )?;
        let content = self
            .contents
            .get(&product_file_id)
            .ok_or_else(|| format_err!("product file {} not found", product_file_id))?;
        writer.write_all(content)?;
        Ok(content.len() as u64)
    }

    fn create_release(&self, product_slug: &str, release: &CreateRelease) -> Fallible<Release> {
        self.record(
            "create_release",
            Call::CreateRelease(product_slug.to_string(), release.clone()),
        )?;
        let created = Release {
            id: self.allocate_id(),
            version: release.version.clone(),
            release_type: Some(release.release_type.clone()),
            release_date: release.release_date.clone(),
            release_notes_url: release.release_notes_url.clone(),
            description: release.description.clone(),
            availability: release.availability.clone(),
            eula: Some(release.eula.clone()),
            updated_at: None,
        };
        self.releases.borrow_mut().insert(0, created.clone());
        Ok(created)
    }

    fn delete_release(&self, product_slug: &str, release_id: i64) -> Fallible<()> {
        self.record(
            "delete_release",
            Call::DeleteRelease(product_slug.to_string(), release_id),
        )?;
        self.find_release(release_id)?;
        self.releases.borrow_mut().retain(|r| r.id != release_id);
        Ok(())
    }

    fn create_product_file(
        &self,
        product_slug: &str,
        product_file: &CreateProductFile,
    ) -> Fallible<ProductFile> {
        self.record(
            "create_product_file",
            Call::CreateProductFile(product_slug.to_string(), product_file.clone()),
        )?;
        let created = ProductFile {
            id: self.allocate_id(),
            name: product_file.name.clone(),
            aws_object_key: product_file.aws_object_key.clone(),
            file_type: Some(product_file.file_type.clone()),
            file_version: Some(product_file.file_version.clone()),
            sha256: product_file.sha256.clone(),
            description: product_file.description.clone(),
        };
        self.created_files
            .borrow_mut()
            .insert(created.id, created.clone());
        Ok(created)
    }

    fn add_product_file(
        &self,
        product_slug: &str,
        release_id: i64,
        product_file_id: i64,
    ) -> Fallible<()> {
        self.record(
            "add_product_file",
            Call::AddProductFile(product_slug.to_string(), release_id, product_file_id),
        )?;
        self.find_release(release_id)?;
        let product_file = self
            .created_files
            .borrow()
            .get(&product_file_id)
            .cloned()
            .ok_or_else(|| format_err!("product file {} not found", product_file_id))?;
        self.product_files
            .borrow_mut()
            .entry(release_id)
            .or_default()
            .push(product_file);
        Ok(())
    }

    fn add_dependency(
        &self,
        product_slug: &str,
        release_id: i64,
        dependent_release_id: i64,
    ) -> Fallible<()> {
        self.record(
            "add_dependency",
            Call::AddDependency(product_slug.to_string(), release_id, dependent_release_id),
        )?;
        let dependency = ReleaseDependency {
            release: DependentRelease {
                id: dependent_release_id,
                ..Default::default()
            },
        };
        self.dependencies
            .borrow_mut()
            .entry(release_id)
            .or_default()
            .push(dependency);
        Ok(())
    }
}

/// Object store keeping uploaded content in memory.
#[derive(Debug, Default)]
pub struct FakeObjectStore {
    bucket: String,
    objects: RefCell<BTreeMap<String, Vec<u8>>>,
    failures: HashMap<&'static str, String>,
    calls: RefCell<Vec<Call>>,
}

impl FakeObjectStore {
    pub fn new<S: Into<String>>(bucket: S) -> Self {
        Self {
            bucket: bucket.into(),
            ..Default::default()
        }
    }

    /// Make `operation` fail with `message`.
    pub fn failing<S: Into<String>>(mut self, operation: &'static str, message: S) -> Self {
        self.failures.insert(operation, message.into());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Content stored under `key`, if any.
    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.borrow().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.borrow().keys().cloned().collect()
    }
}

impl ObjectStore for FakeObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn upload_object(&self, key: &str, path: &Path) -> Fallible<()> {
        self.calls
            .borrow_mut()
            .push(Call::UploadObject(key.to_string(), path.to_path_buf()));
        fail_if_configured(&self.failures, "upload_object")?;

        let content =
            std::fs::read(path).context(format!("could not open '{}'", path.display()))?;
        self.objects.borrow_mut().insert(key.to_string(), content);
        Ok(())
    }

    fn delete_object(&self, key: &str) -> Fallible<()> {
        self.calls
            .borrow_mut()
            .push(Call::DeleteObject(key.to_string()));
        fail_if_configured(&self.failures, "delete_object")?;

        self.objects
            .borrow_mut()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| format_err!("object '{}' not found", key))
    }
}
