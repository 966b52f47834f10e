//! Release dependencies API.

use super::Client;
use anyhow::Result as Fallible;
use reqwest::Method;

/// API result with all dependencies of a release.
#[derive(Debug, Deserialize)]
pub(crate) struct ReleaseDependencies {
    pub(crate) dependencies: Vec<ReleaseDependency>,
}

/// Product owning a dependent release.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Product {
    pub id: i64,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Release another release depends on.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct DependentRelease {
    pub id: i64,
    pub version: String,
    pub product: Product,
}

/// Transitive link from a release to another product release.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ReleaseDependency {
    pub release: DependentRelease,
}

impl Client {
    /// Fetch the dependencies of a release.
    pub fn release_dependencies<S: AsRef<str>>(
        &self,
        product_slug: S,
        release_id: i64,
    ) -> Fallible<Vec<ReleaseDependency>> {
        let endpoint = format!(
            "products/{}/releases/{}/dependencies",
            product_slug.as_ref(),
            release_id
        );
        let req = self.new_request(Method::GET, endpoint)?;
        let deps: ReleaseDependencies = self.send(req)?.json()?;
        Ok(deps.dependencies)
    }

    /// Make a release depend on another (possibly foreign-product) release.
    pub fn add_dependency<S: AsRef<str>>(
        &self,
        product_slug: S,
        release_id: i64,
        dependent_release_id: i64,
    ) -> Fallible<()> {
        let endpoint = format!(
            "products/{}/releases/{}/add_dependency",
            product_slug.as_ref(),
            release_id
        );
        let body = serde_json::json!({ "dependency": { "release_id": dependent_release_id } });
        let req = self.new_request(Method::PATCH, endpoint)?.json(&body);
        self.send(req)?;
        Ok(())
    }
}
