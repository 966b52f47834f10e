//! `check`: report new product versions.

use crate::clients::ReleaseService;
use crate::concourse::{CheckRequest, CheckResponse, Version};
use crate::config::ResourceSettings;
use crate::versions;
use commons::prelude_errors::*;
use regex::Regex;

/// List the versions the pipeline has not seen yet, oldest first.
pub fn run<R>(
    service: &R,
    settings: &ResourceSettings,
    request: &CheckRequest,
) -> Fallible<CheckResponse>
where
    R: ReleaseService + ?Sized,
{
    let version_filter = match settings.product_version {
        Some(ref pattern) => Some(
            Regex::new(pattern).context(format!("invalid product_version regex '{}'", pattern))?,
        ),
        None => None,
    };

    info!("Getting all releases of '{}'", settings.product_slug);
    let releases = service.releases(&settings.product_slug)?;
    debug!("found {} releases", releases.len());

    let filtered: Vec<_> = releases
        .into_iter()
        .filter(|r| match settings.release_type {
            Some(ref wanted) => r.release_type.as_deref() == Some(wanted.as_str()),
            None => true,
        })
        .filter(|r| match version_filter {
            Some(ref re) => re.is_match(&r.version),
            None => true,
        })
        .collect();
    debug!("{} releases left after filtering", filtered.len());

    let ordered: Vec<String> = versions::sort_releases(settings.sort_by, filtered)
        .into_iter()
        .map(|r| r.version)
        .collect();

    let new_versions = versions::versions_since(&ordered, request.current_version());
    info!("New versions: {:?}", new_versions);

    Ok(new_versions.into_iter().map(Version::new).collect())
}
