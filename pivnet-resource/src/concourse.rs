//! Request and response envelopes exchanged with the pipeline on stdin/stdout.

use commons::de::de_nonempty_string;
use custom_debug_derive::Debug as CustomDebug;

/// Ordering applied to product versions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, SmartDefault)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    /// Keep the order returned by the release API (newest first).
    #[default]
    None,
    /// Semantic-version precedence.
    Semver,
}

/// Resource configuration, shared by all operations.
///
/// Every field is optional on the wire; blank strings count as unset.
#[derive(Clone, CustomDebug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Source {
    #[serde(
        deserialize_with = "de_nonempty_string",
        skip_serializing_if = "Option::is_none"
    )]
    #[debug(skip)]
    pub api_token: Option<String>,
    #[serde(
        deserialize_with = "de_nonempty_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub product_slug: Option<String>,
    /// Regular expression restricting the versions reported by `check`.
    #[serde(
        deserialize_with = "de_nonempty_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub product_version: Option<String>,
    #[serde(
        deserialize_with = "de_nonempty_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub release_type: Option<String>,
    #[serde(
        deserialize_with = "de_nonempty_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub endpoint: Option<String>,
    #[serde(
        deserialize_with = "de_nonempty_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub bucket: Option<String>,
    #[serde(
        deserialize_with = "de_nonempty_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub region: Option<String>,
    #[serde(
        deserialize_with = "de_nonempty_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub s3_endpoint: Option<String>,
    #[serde(
        deserialize_with = "de_nonempty_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub access_key_id: Option<String>,
    #[serde(
        deserialize_with = "de_nonempty_string",
        skip_serializing_if = "Option::is_none"
    )]
    #[debug(skip)]
    pub secret_access_key: Option<String>,
    #[serde(
        deserialize_with = "de_nonempty_string",
        skip_serializing_if = "Option::is_none"
    )]
    #[debug(skip)]
    pub session_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_ssl_verification: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copy_metadata: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
}

/// A product version, as tracked by the pipeline.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Version {
    #[serde(default)]
    pub product_version: String,
}

impl Version {
    pub fn new<S: Into<String>>(product_version: S) -> Self {
        Self {
            product_version: product_version.into(),
        }
    }
}

/// Informational name/value pair shown by the pipeline UI.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
}

impl Metadata {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct CheckRequest {
    #[serde(default)]
    pub source: Source,
    /// Last version seen by the pipeline, if any.
    #[serde(default)]
    pub version: Option<Version>,
}

impl CheckRequest {
    /// The current version, ignoring a blank one.
    pub fn current_version(&self) -> Option<&str> {
        self.version
            .as_ref()
            .map(|v| v.product_version.as_str())
            .filter(|v| !v.trim().is_empty())
    }
}

pub type CheckResponse = Vec<Version>;

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct InParams {
    /// File-name globs selecting product files; all files when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub globs: Option<Vec<String>>,
    /// Extract downloaded tarballs.
    #[serde(default, deserialize_with = "commons::de::de_null_as_false")]
    pub unpack: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct InRequest {
    #[serde(default)]
    pub source: Source,
    #[serde(default)]
    pub version: Version,
    #[serde(default)]
    pub params: InParams,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutParams {
    /// Glob, relative to the sources directory, matching the file to upload.
    #[serde(
        deserialize_with = "de_nonempty_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub file_glob: Option<String>,
    /// Object key prefix under `product_files/`.
    #[serde(
        deserialize_with = "de_nonempty_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub s3_filepath_prefix: Option<String>,
    /// File containing the version to publish, relative to the sources directory.
    #[serde(
        deserialize_with = "de_nonempty_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub version_file: Option<String>,
    /// YAML file with release and product file metadata.
    #[serde(
        deserialize_with = "de_nonempty_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub metadata_file: Option<String>,
    /// Replace an existing release with the same version.
    #[serde(rename = "override", deserialize_with = "commons::de::de_null_as_false")]
    pub override_existing: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct OutRequest {
    #[serde(default)]
    pub source: Source,
    #[serde(default)]
    pub params: OutParams,
}

/// Response to `in` and `out`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct VersionResponse {
    pub version: Version,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<Metadata>,
}

pub type InResponse = VersionResponse;
pub type OutResponse = VersionResponse;
