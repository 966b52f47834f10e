//! AWS Signature Version 4.
//!
//! See https://docs.aws.amazon.com/AmazonS3/latest/API/sig-v4-authenticating-requests.html

use anyhow::{format_err, Result as Fallible};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

pub(crate) static AMZ_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";
static SCOPE_DATE_FORMAT: &str = "%Y%m%d";
static ALGORITHM: &str = "AWS4-HMAC-SHA256";
static SERVICE: &str = "s3";

/// Payload hash placeholder for streamed uploads.
pub(crate) static UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

/// Characters left as-is in URI components: `A-Za-z0-9-._~`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub(crate) struct Credentials<'a> {
    pub(crate) access_key_id: &'a str,
    pub(crate) secret_access_key: &'a str,
    pub(crate) region: &'a str,
}

/// Percent-encode an object path, keeping `/` separators.
pub(crate) fn uri_encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, URI_COMPONENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Value of the `Host` header the HTTP client will send for `url`.
pub(crate) fn host_header(url: &reqwest::Url) -> Fallible<String> {
    let host = url
        .host_str()
        .ok_or_else(|| format_err!("url '{}' has no host", url))?;
    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Fallible<Vec<u8>> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key)
        .map_err(|e| format_err!("HMAC-SHA256 key error: {}", e))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Canonical request and the list of signed header names.
fn canonical_request(
    method: &str,
    canonical_uri: &str,
    canonical_query: &str,
    headers: &BTreeMap<String, String>,
    payload_hash: &str,
) -> (String, String) {
    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name.to_lowercase(), value.trim()))
        .collect();
    let signed_headers = headers
        .keys()
        .map(|name| name.to_lowercase())
        .collect::<Vec<_>>()
        .join(";");

    let request = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        method, canonical_uri, canonical_query, canonical_headers, signed_headers, payload_hash
    );
    (request, signed_headers)
}

fn signing_key(secret_access_key: &str, date: &str, region: &str) -> Fallible<Vec<u8>> {
    let date_key = hmac_sha256(
        format!("AWS4{}", secret_access_key).as_bytes(),
        date.as_bytes(),
    )?;
    let region_key = hmac_sha256(&date_key, region.as_bytes())?;
    let service_key = hmac_sha256(&region_key, SERVICE.as_bytes())?;
    hmac_sha256(&service_key, b"aws4_request")
}

/// Compute the `Authorization` header value for a request.
///
/// `headers` must contain every header to sign, including `host` and
/// `x-amz-date`, keyed by lowercase name.
pub(crate) fn authorization(
    credentials: &Credentials,
    time: DateTime<Utc>,
    method: &str,
    canonical_uri: &str,
    canonical_query: &str,
    headers: &BTreeMap<String, String>,
    payload_hash: &str,
) -> Fallible<String> {
    let amz_date = time.format(AMZ_DATE_FORMAT).to_string();
    let scope_date = time.format(SCOPE_DATE_FORMAT).to_string();
    let scope = format!(
        "{}/{}/{}/aws4_request",
        scope_date, credentials.region, SERVICE
    );

    let (request, signed_headers) = canonical_request(
        method,
        canonical_uri,
        canonical_query,
        headers,
        payload_hash,
    );
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        amz_date,
        scope,
        sha256_hex(request.as_bytes())
    );

    let key = signing_key(credentials.secret_access_key, &scope_date, credentials.region)?;
    let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes())?);

    Ok(format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        ALGORITHM, credentials.access_key_id, scope, signed_headers, signature
    ))
}
