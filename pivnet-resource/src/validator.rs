//! Request validation, performed before any network call.

use crate::concourse::{CheckRequest, InRequest, OutRequest, Source};
use thiserror::Error;

/// Invalid resource configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must be provided")]
    MissingField(&'static str),
    #[error("{field} is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

fn require(field: &'static str, value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(ValidationError::MissingField(field)),
    }
}

fn validate_source(source: &Source) -> Result<(), ValidationError> {
    require("api_token", source.api_token.as_deref())?;
    require("product_slug", source.product_slug.as_deref())?;

    if let Some(ref pattern) = source.product_version {
        regex::Regex::new(pattern).map_err(|e| ValidationError::InvalidField {
            field: "product_version",
            reason: e.to_string(),
        })?;
    }

    Ok(())
}

pub fn validate_check(request: &CheckRequest) -> Result<(), ValidationError> {
    validate_source(&request.source)
}

pub fn validate_in(request: &InRequest) -> Result<(), ValidationError> {
    validate_source(&request.source)?;
    require("product_version", Some(&request.version.product_version))
}

pub fn validate_out(request: &OutRequest) -> Result<(), ValidationError> {
    let source = &request.source;
    let params = &request.params;

    validate_source(source)?;
    require("access_key_id", source.access_key_id.as_deref())?;
    require("secret_access_key", source.secret_access_key.as_deref())?;
    require("bucket", source.bucket.as_deref())?;
    require("file_glob", params.file_glob.as_deref())?;
    require("s3_filepath_prefix", params.s3_filepath_prefix.as_deref())?;
    require("version_file", params.version_file.as_deref())?;

    Ok(())
}
