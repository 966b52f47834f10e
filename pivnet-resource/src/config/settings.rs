//! Runtime settings for pivnet-resource.

use crate::concourse::{SortBy, Source};
use commons::prelude_errors::*;
use commons::MergeOptions;
use custom_debug_derive::Debug as CustomDebug;

/// Runtime resource settings (merged config).
#[derive(Clone, CustomDebug, SmartDefault)]
pub struct ResourceSettings {
    /// Global log level.
    #[default(log::LevelFilter::Info)]
    pub verbosity: log::LevelFilter,

    /// Release API token.
    #[debug(skip)]
    pub api_token: String,

    /// Product the resource tracks.
    pub product_slug: String,

    /// Regular expression restricting the reported versions.
    pub product_version: Option<String>,

    /// Release type restricting the reported versions, or the default for new releases.
    pub release_type: Option<String>,

    /// Release API endpoint.
    #[default(pivnet::v2::DEFAULT_ENDPOINT.to_string())]
    pub endpoint: String,

    pub bucket: String,

    #[default(s3::DEFAULT_REGION.to_string())]
    pub region: String,

    /// Custom endpoint for S3-compatible storage.
    pub s3_endpoint: Option<String>,

    pub access_key_id: String,

    #[debug(skip)]
    pub secret_access_key: String,

    #[debug(skip)]
    pub session_token: Option<String>,

    pub sort_by: SortBy,

    /// Disable TLS certificate validation, for both the release API and storage.
    pub skip_ssl_verification: bool,

    /// Fill unset metadata of new releases from the latest existing one.
    pub copy_metadata: bool,
}

impl ResourceSettings {
    /// Merge CLI flags and the request `source` block on top of defaults.
    pub fn assemble(cli: &super::CliOptions, source: &Source) -> Fallible<Self> {
        let mut settings = Self::default();
        settings.try_merge(Some(source.clone()))?;
        settings.try_merge(cli)?;
        Ok(settings)
    }
}

impl MergeOptions<Option<Source>> for ResourceSettings {
    fn try_merge(&mut self, opts: Option<Source>) -> Fallible<()> {
        if let Some(source) = opts {
            assign_if_some!(self.api_token, source.api_token);
            assign_if_some!(self.product_slug, source.product_slug);
            fill_if_none!(self.product_version, source.product_version);
            fill_if_none!(self.release_type, source.release_type);
            assign_if_some!(self.endpoint, source.endpoint);
            assign_if_some!(self.bucket, source.bucket);
            assign_if_some!(self.region, source.region);
            fill_if_none!(self.s3_endpoint, source.s3_endpoint);
            assign_if_some!(self.access_key_id, source.access_key_id);
            assign_if_some!(self.secret_access_key, source.secret_access_key);
            fill_if_none!(self.session_token, source.session_token);
            assign_if_some!(self.sort_by, source.sort_by);
            assign_if_some!(self.skip_ssl_verification, source.skip_ssl_verification);
            assign_if_some!(self.copy_metadata, source.copy_metadata);

            if source.verbose == Some(true) {
                self.verbosity = self.verbosity.max(log::LevelFilter::Debug);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let settings = ResourceSettings::default();
        assert_eq!(settings.endpoint, "https://network.pivotal.io");
        assert_eq!(settings.region, "eu-west-1");
        assert_eq!(settings.sort_by, SortBy::None);
        assert_eq!(settings.verbosity, log::LevelFilter::Info);
        assert!(!settings.skip_ssl_verification);
        assert!(!settings.copy_metadata);
    }

    #[test]
    fn merge_source() {
        let source: Source = serde_json::from_str(
            r#"{
                "api_token": "some-token",
                "product_slug": "some-product",
                "endpoint": "https://example.com",
                "region": "",
                "sort_by": "semver",
                "copy_metadata": true,
                "verbose": true
            }"#,
        )
        .unwrap();

        let mut settings = ResourceSettings::default();
        settings.try_merge(Some(source)).unwrap();

        assert_eq!(settings.api_token, "some-token");
        assert_eq!(settings.product_slug, "some-product");
        assert_eq!(settings.endpoint, "https://example.com");
        assert_eq!(settings.region, "eu-west-1");
        assert_eq!(settings.sort_by, SortBy::Semver);
        assert!(settings.copy_metadata);
        assert_eq!(settings.verbosity, log::LevelFilter::Debug);
    }

    #[test]
    fn debug_hides_secrets() {
        let mut settings = ResourceSettings::default();
        settings.api_token = "api-secret".to_string();
        settings.secret_access_key = "s3-secret".to_string();
        settings.session_token = Some("session-secret".to_string());

        let printed = format!("{:?}", settings);
        assert!(!printed.contains("secret"));
        assert!(printed.contains("network.pivotal.io"));
    }
}
