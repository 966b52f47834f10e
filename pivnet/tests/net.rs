//! Tests against the live Pivotal Network API.
//!
//! They require the `test-net` feature and a `PIVNET_API_TOKEN` env variable.

#![cfg(feature = "test-net")]

use std::env;

static PUBLIC_PRODUCT: &str = "stemcells-ubuntu-xenial";

fn common_init() -> pivnet::v2::Client {
    let _ = env_logger::try_init_from_env(env_logger::Env::default());
    let token = env::var("PIVNET_API_TOKEN").expect("PIVNET_API_TOKEN unset");
    let endpoint =
        env::var("PIVNET_ENDPOINT").unwrap_or_else(|_| pivnet::v2::DEFAULT_ENDPOINT.to_string());

    pivnet::v2::Client::builder()
        .api_base(Some(pivnet::v2::api_base_for(endpoint)))
        .access_token(Some(token))
        .build()
        .unwrap()
}

#[test]
fn test_public_releases() {
    let client = common_init();

    let releases = client.releases(PUBLIC_PRODUCT).unwrap();
    assert!(!releases.is_empty());

    let newest = &releases[0];
    let found = client
        .release_for_version(PUBLIC_PRODUCT, &newest.version)
        .unwrap();
    assert_eq!(found.id, newest.id);
}

#[test]
fn test_public_product_files() {
    let client = common_init();

    let releases = client.releases(PUBLIC_PRODUCT).unwrap();
    let files = client.product_files(PUBLIC_PRODUCT, releases[0].id).unwrap();
    assert!(files.iter().all(|f| !f.file_name().is_empty()));
}

#[test]
fn test_missing_product() {
    let client = common_init();

    let err = client
        .releases("this-product-does-not-exist-at-all")
        .unwrap_err();
    let api_err = err.downcast_ref::<pivnet::ApiError>().unwrap();
    assert_eq!(api_err.status(), 404);
}
