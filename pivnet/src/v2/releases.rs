//! Releases API.

use super::Client;
use anyhow::{format_err, Result as Fallible};
use reqwest::Method;

/// API result with all releases of a product.
#[derive(Debug, Deserialize)]
pub(crate) struct Releases {
    pub(crate) releases: Vec<Release>,
}

/// API result (and request body) wrapping a single release.
#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct ReleaseEnvelope<T> {
    pub(crate) release: T,
}

/// End-user license agreement.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Eula {
    /// EULA identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// EULA slug.
    pub slug: String,
    /// EULA display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Product release.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Release {
    /// Release identifier.
    pub id: i64,
    /// Product version.
    pub version: String,
    /// Release type, e.g. "Minor Release".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_type: Option<String>,
    /// Release date, in `YYYY-MM-DD` format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_notes_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Who can see the release, e.g. "All Users".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eula: Option<Eula>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Request body for release creation.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct CreateRelease {
    pub version: String,
    pub release_type: String,
    pub eula: Eula,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_notes_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
    /// Open-source compliance acknowledgement, required by the API.
    pub oss_compliant: String,
}

impl Client {
    /// Fetch all releases of a product, in API order (newest first).
    pub fn releases<S: AsRef<str>>(&self, product_slug: S) -> Fallible<Vec<Release>> {
        let endpoint = format!("products/{}/releases", product_slug.as_ref());
        let req = self.new_request(Method::GET, endpoint)?;
        let page: Releases = self.send(req)?.json()?;
        debug!(
            "found {} releases for product '{}'",
            page.releases.len(),
            product_slug.as_ref()
        );
        Ok(page.releases)
    }

    /// Fetch the release with exactly the given version.
    pub fn release_for_version<S: AsRef<str>>(
        &self,
        product_slug: S,
        version: &str,
    ) -> Fallible<Release> {
        self.releases(product_slug)?
            .into_iter()
            .find(|r| r.version == version)
            .ok_or_else(|| format_err!("release not found for version '{}'", version))
    }

    /// Accept the EULA of a release, on behalf of the token owner.
    pub fn accept_eula<S: AsRef<str>>(&self, product_slug: S, release_id: i64) -> Fallible<()> {
        let endpoint = format!(
            "products/{}/releases/{}/eula_acceptance",
            product_slug.as_ref(),
            release_id
        );
        let req = self.new_request(Method::POST, endpoint)?;
        self.send(req)?;
        Ok(())
    }

    /// Create a new release.
    pub fn create_release<S: AsRef<str>>(
        &self,
        product_slug: S,
        release: &CreateRelease,
    ) -> Fallible<Release> {
        let endpoint = format!("products/{}/releases", product_slug.as_ref());
        let body = ReleaseEnvelope { release };
        let req = self.new_request(Method::POST, endpoint)?.json(&body);
        let created: ReleaseEnvelope<Release> = self.send(req)?.json()?;
        Ok(created.release)
    }

    /// Delete a release.
    pub fn delete_release<S: AsRef<str>>(&self, product_slug: S, release_id: i64) -> Fallible<()> {
        let endpoint = format!(
            "products/{}/releases/{}",
            product_slug.as_ref(),
            release_id
        );
        let req = self.new_request(Method::DELETE, endpoint)?;
        self.send(req)?;
        Ok(())
    }
}
