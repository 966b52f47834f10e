//! Release metadata documents.
//!
//! The same document shape is read by `out` from a user-provided YAML file,
//! and written by `in` next to the downloaded files as `metadata.yaml` and
//! `metadata.json`.

use crate::concourse::Metadata;
use commons::prelude_errors::*;
use pivnet::v2::{ProductFile, Release, ReleaseDependency};
use std::path::Path;

/// File name of the YAML metadata written by `in`.
pub static METADATA_YAML: &str = "metadata.yaml";
/// File name of the JSON metadata written by `in`.
pub static METADATA_JSON: &str = "metadata.json";

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReleaseMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eula_slug: Option<String>,
    /// Release date, `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_notes_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProductFileMetadata {
    /// Local path (for `out`) or file name (for `in`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Display name to register the file under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_as: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_object_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DependencyMetadata {
    pub id: i64,
    pub version: String,
    pub product_slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
}

/// Metadata document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct MetadataFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<ReleaseMetadata>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub product_files: Vec<ProductFileMetadata>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<DependencyMetadata>,
}

impl MetadataFile {
    /// Read a YAML metadata file; an empty file yields empty metadata.
    pub fn read(path: &Path) -> Fallible<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("could not read metadata file '{}'", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content)
            .context(format!("could not parse metadata file '{}'", path.display()))
    }

    /// Describe a release with its files and dependencies.
    pub fn describe(
        release: &Release,
        product_files: &[ProductFile],
        dependencies: &[ReleaseDependency],
    ) -> Self {
        let release_meta = ReleaseMetadata {
            id: Some(release.id),
            version: Some(release.version.clone()),
            release_type: release.release_type.clone(),
            eula_slug: release.eula.as_ref().map(|eula| eula.slug.clone()),
            release_date: release.release_date.clone(),
            description: release.description.clone(),
            release_notes_url: release.release_notes_url.clone(),
            availability: release.availability.clone(),
        };

        let product_files = product_files
            .iter()
            .map(|pf| ProductFileMetadata {
                file: Some(pf.file_name().to_string()),
                upload_as: Some(pf.name.clone()),
                description: pf.description.clone(),
                id: Some(pf.id),
                aws_object_key: Some(pf.aws_object_key.clone()),
                sha256: pf.sha256.clone(),
            })
            .collect();

        let dependencies = dependencies
            .iter()
            .map(|dep| DependencyMetadata {
                id: dep.release.id,
                version: dep.release.version.clone(),
                product_slug: dep.release.product.slug.clone(),
                product_name: dep.release.product.name.clone(),
            })
            .collect();

        Self {
            release: Some(release_meta),
            product_files,
            dependencies,
        }
    }

    /// Write the document into `dir` as both YAML and JSON.
    pub fn write_to(&self, dir: &Path) -> Fallible<()> {
        let yaml_path = dir.join(METADATA_YAML);
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(&yaml_path, yaml)
            .context(format!("could not write '{}'", yaml_path.display()))?;

        let json_path = dir.join(METADATA_JSON);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&json_path, json)
            .context(format!("could not write '{}'", json_path.display()))?;

        Ok(())
    }

    /// Entry describing the local file at `relative_path`.
    ///
    /// Entries name the file either by its path relative to the sources
    /// directory or by its bare file name.
    pub fn product_file_for(&self, relative_path: &str) -> Option<&ProductFileMetadata> {
        let file_name = Path::new(relative_path)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(relative_path);

        self.product_files.iter().find(|entry| {
            entry
                .file
                .as_deref()
                .map(|f| f.trim_start_matches("./"))
                .map_or(false, |f| f == relative_path || f == file_name)
        })
    }
}

/// Name/value pairs describing a release, for pipeline responses.
pub fn release_metadata(release: &Release) -> Vec<Metadata> {
    let fields = vec![
        ("version", Some(release.version.as_str())),
        ("release_type", release.release_type.as_deref()),
        ("release_date", release.release_date.as_deref()),
        ("description", release.description.as_deref()),
        ("release_notes_url", release.release_notes_url.as_deref()),
        ("availability", release.availability.as_deref()),
        ("eula_slug", release.eula.as_ref().map(|e| e.slug.as_str())),
    ];

    fields
        .into_iter()
        .filter_map(|(name, value)| value.filter(|v| !v.is_empty()).map(|v| Metadata::new(name, v)))
        .collect()
}
