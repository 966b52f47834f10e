//! Product files API.

use super::Client;
use anyhow::{Context, Result as Fallible};
use reqwest::Method;
use std::io::Write;

/// API result with all files of a release.
#[derive(Debug, Deserialize)]
pub(crate) struct ProductFiles {
    pub(crate) product_files: Vec<ProductFile>,
}

/// API result (and request body) wrapping a single product file.
#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct ProductFileEnvelope<T> {
    pub(crate) product_file: T,
}

/// Downloadable artifact attached to a release.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ProductFile {
    /// Product file identifier.
    pub id: i64,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Object key in the backing bucket; its basename is the file name.
    #[serde(default)]
    pub aws_object_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_version: Option<String>,
    /// Hex-encoded SHA-256 digest of the content, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProductFile {
    /// File name, derived from the object key.
    pub fn file_name(&self) -> &str {
        self.aws_object_key
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or(self.name.as_str())
    }
}

/// Request body for product file creation.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct CreateProductFile {
    pub name: String,
    pub aws_object_key: String,
    pub file_type: String,
    pub file_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Client {
    /// Fetch all product files of a release.
    pub fn product_files<S: AsRef<str>>(
        &self,
        product_slug: S,
        release_id: i64,
    ) -> Fallible<Vec<ProductFile>> {
        let endpoint = format!(
            "products/{}/releases/{}/product_files",
            product_slug.as_ref(),
            release_id
        );
        let req = self.new_request(Method::GET, endpoint)?;
        let files: ProductFiles = self.send(req)?.json()?;
        Ok(files.product_files)
    }

    /// Fetch a single product file of a release, with full details.
    pub fn product_file<S: AsRef<str>>(
        &self,
        product_slug: S,
        release_id: i64,
        product_file_id: i64,
    ) -> Fallible<ProductFile> {
        let endpoint = format!(
            "products/{}/releases/{}/product_files/{}",
            product_slug.as_ref(),
            release_id,
            product_file_id
        );
        let req = self.new_request(Method::GET, endpoint)?;
        let file: ProductFileEnvelope<ProductFile> = self.send(req)?.json()?;
        Ok(file.product_file)
    }

    /// Download the content of a product file into `writer`.
    ///
    /// The API answers with a redirect to the backing storage, which is
    /// followed. Returns the number of bytes written.
    pub fn download_product_file<S, W>(
        &self,
        product_slug: S,
        release_id: i64,
        product_file_id: i64,
        writer: &mut W,
    ) -> Fallible<u64>
    where
        S: AsRef<str>,
        W: Write + ?Sized,
    {
        let endpoint = format!(
            "products/{}/releases/{}/product_files/{}/download",
            product_slug.as_ref(),
            release_id,
            product_file_id
        );
        let req = self.new_request(Method::POST, endpoint)?;
        let mut response = self.send(req)?;
        let written = response
            .copy_to(writer)
            .context(format!("failed to download product file {}", product_file_id))?;
        debug!("downloaded {} bytes for product file {}", written, product_file_id);
        Ok(written)
    }

    /// Create a new product file, not yet attached to any release.
    pub fn create_product_file<S: AsRef<str>>(
        &self,
        product_slug: S,
        product_file: &CreateProductFile,
    ) -> Fallible<ProductFile> {
        let endpoint = format!("products/{}/product_files", product_slug.as_ref());
        let body = ProductFileEnvelope { product_file };
        let req = self.new_request(Method::POST, endpoint)?.json(&body);
        let created: ProductFileEnvelope<ProductFile> = self.send(req)?.json()?;
        Ok(created.product_file)
    }

    /// Attach an existing product file to a release.
    pub fn add_product_file<S: AsRef<str>>(
        &self,
        product_slug: S,
        release_id: i64,
        product_file_id: i64,
    ) -> Fallible<()> {
        let endpoint = format!(
            "products/{}/releases/{}/add_product_file",
            product_slug.as_ref(),
            release_id
        );
        let body = serde_json::json!({ "product_file": { "id": product_file_id } });
        let req = self.new_request(Method::PATCH, endpoint)?.json(&body);
        self.send(req)?;
        Ok(())
    }
}
