//! Blocking client for S3-compatible object storage.
//!
//! Only the handful of operations needed to publish release artifacts are
//! implemented. Requests are signed with AWS Signature Version 4 and always
//! use path-style addressing.

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

mod signing;

use anyhow::{Context, Result as Fallible};
use chrono::Utc;
use custom_debug_derive::Debug as CustomDebug;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

/// Default region, where the release artifacts bucket lives.
pub static DEFAULT_REGION: &str = "eu-west-1";

/// Non-successful storage response.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("s3 request failed with status {status}: {code}: {message}")]
pub struct S3Error {
    pub status: u16,
    pub code: String,
    pub message: String,
}

/// Error document returned by the store.
#[derive(Debug, Default, Deserialize)]
struct ErrorDocument {
    #[serde(rename = "Code", default)]
    code: Option<String>,
    #[serde(rename = "Message", default)]
    message: Option<String>,
}

impl S3Error {
    fn from_response(status: reqwest::StatusCode, body: &str) -> Self {
        let document = quick_xml::de::from_str::<ErrorDocument>(body).unwrap_or_else(|e| {
            debug!("unparseable s3 error document: {}", e);
            ErrorDocument::default()
        });

        S3Error {
            status: status.as_u16(),
            code: document
                .code
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_string()),
            message: document
                .message
                .unwrap_or_else(|| body.trim().to_string()),
        }
    }
}

/// Client configuration.
#[derive(Clone, CustomDebug, Default)]
pub struct ClientConfig {
    pub access_key_id: String,
    #[debug(skip)]
    pub secret_access_key: String,
    #[debug(skip)]
    pub session_token: Option<String>,
    pub region: String,
    pub bucket: String,
    /// Custom endpoint for S3-compatible stores, e.g. `http://minio:9000`.
    pub endpoint: Option<String>,
    pub skip_ssl_validation: bool,
}

/// Client for a single bucket.
#[derive(Clone, CustomDebug)]
pub struct Client {
    config: ClientConfig,
    endpoint: String,
    #[debug(skip)]
    hclient: reqwest::blocking::Client,
}

impl Client {
    /// Build a client, validating the endpoint.
    pub fn new(config: ClientConfig) -> Fallible<Self> {
        let endpoint = match config.endpoint {
            Some(ref endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://s3.{}.amazonaws.com", config.region),
        };
        reqwest::Url::parse(&endpoint).context(format!("invalid s3 endpoint '{}'", endpoint))?;

        let hclient = reqwest::blocking::ClientBuilder::new()
            .danger_accept_invalid_certs(config.skip_ssl_validation)
            .timeout(None::<std::time::Duration>)
            .build()?;

        Ok(Self {
            config,
            endpoint,
            hclient,
        })
    }

    /// Bucket all operations apply to.
    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    /// URL of an object in the bucket.
    pub fn object_url(&self, key: &str) -> Fallible<reqwest::Url> {
        let url = format!(
            "{}/{}/{}",
            self.endpoint,
            signing::uri_encode_path(&self.config.bucket),
            signing::uri_encode_path(key.trim_start_matches('/')),
        );
        reqwest::Url::parse(&url).context(format!("invalid object url '{}'", url))
    }

    /// Upload a local file as `key`.
    pub fn put_object<P: AsRef<Path>>(&self, key: &str, local_path: P) -> Fallible<()> {
        let local_path = local_path.as_ref();
        let file = File::open(local_path)
            .context(format!("could not open '{}'", local_path.display()))?;
        let length = file.metadata()?.len();

        info!(
            "Uploading {} to s3://{}/{}",
            local_path.display(),
            self.config.bucket,
            key
        );

        let url = self.object_url(key)?;
        let req = self
            .signed_request(Method::PUT, url)?
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(reqwest::blocking::Body::sized(file, length));
        self.send(req)?;

        info!(
            "Successfully uploaded '{}' to 's3://{}/{}'",
            local_path.display(),
            self.config.bucket,
            key
        );
        Ok(())
    }

    /// Delete the object stored as `key`.
    pub fn delete_object(&self, key: &str) -> Fallible<()> {
        let url = self.object_url(key)?;
        let req = self.signed_request(Method::DELETE, url)?;
        self.send(req)?;
        debug!("deleted s3://{}/{}", self.config.bucket, key);
        Ok(())
    }

    /// Build a request carrying SigV4 authentication headers.
    fn signed_request(
        &self,
        method: Method,
        url: reqwest::Url,
    ) -> Fallible<reqwest::blocking::RequestBuilder> {
        let now = Utc::now();
        let amz_date = now.format(signing::AMZ_DATE_FORMAT).to_string();

        let mut signed = BTreeMap::new();
        signed.insert("host".to_string(), signing::host_header(&url)?);
        signed.insert(
            "x-amz-content-sha256".to_string(),
            signing::UNSIGNED_PAYLOAD.to_string(),
        );
        signed.insert("x-amz-date".to_string(), amz_date);
        if let Some(ref token) = self.config.session_token {
            signed.insert("x-amz-security-token".to_string(), token.clone());
        }

        let credentials = signing::Credentials {
            access_key_id: &self.config.access_key_id,
            secret_access_key: &self.config.secret_access_key,
            region: &self.config.region,
        };
        let authorization = signing::authorization(
            &credentials,
            now,
            method.as_str(),
            url.path(),
            url.query().unwrap_or_default(),
            &signed,
            signing::UNSIGNED_PAYLOAD,
        )?;

        let mut headers = HeaderMap::new();
        for (name, value) in signed.iter().filter(|(name, _)| name.as_str() != "host") {
            headers.insert(
                reqwest::header::HeaderName::from_bytes(name.as_bytes())?,
                HeaderValue::from_str(value)?,
            );
        }
        headers.insert(
            reqwest::header::AUTHORIZATION,
            HeaderValue::from_str(&authorization)?,
        );

        trace!("{} '{}'", method, url);
        Ok(self.hclient.request(method, url).headers(headers))
    }

    fn send(
        &self,
        req: reqwest::blocking::RequestBuilder,
    ) -> Fallible<reqwest::blocking::Response> {
        let response = req.send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(S3Error::from_response(status, &body).into())
    }
}
