//! Blocking Pivotal Network HTTP API client, v2 endpoints.

use crate::ApiError;
use anyhow::{bail, Result as Fallible};
use custom_debug_derive::Debug as CustomDebug;
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION};

mod dependencies;
pub use self::dependencies::{DependentRelease, Product, ReleaseDependency};

mod product_files;
pub use self::product_files::{CreateProductFile, ProductFile};

mod releases;
pub use self::releases::{CreateRelease, Eula, Release};

/// Default Pivotal Network endpoint.
pub static DEFAULT_ENDPOINT: &str = "https://network.pivotal.io";

/// Path of the v2 API, relative to the endpoint.
pub static API_PATH_SUFFIX: &str = "/api/v2/";

/// Default user-agent for outgoing requests.
pub static DEFAULT_USER_AGENT: &str = concat!("pivnet-resource/", env!("CARGO_PKG_VERSION"));

/// Return the v2 API base URL for an endpoint.
pub fn api_base_for<S: AsRef<str>>(endpoint: S) -> String {
    format!(
        "{}{}",
        endpoint.as_ref().trim_end_matches('/'),
        API_PATH_SUFFIX
    )
}

/// Client to make outgoing API requests to a Pivotal Network instance.
#[derive(Clone, CustomDebug)]
pub struct Client {
    /// Base URL for API endpoint.
    api_base: reqwest::Url,
    /// Blocking reqwest client.
    hclient: reqwest::blocking::Client,
    /// API token.
    #[debug(skip)]
    token: Option<String>,
}

impl Client {
    /// Return a client builder with default options.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Base URL for API endpoint.
    pub fn api_base(&self) -> &reqwest::Url {
        &self.api_base
    }

    /// Return a request builder with base URL and parameters set.
    pub(crate) fn new_request<S: AsRef<str>>(
        &self,
        method: reqwest::Method,
        url_suffix: S,
    ) -> Fallible<reqwest::blocking::RequestBuilder> {
        let url = self.api_base.clone().join(url_suffix.as_ref())?;
        trace!("{} '{}'", method, url);
        let builder = {
            let plain = self
                .hclient
                .request(method, url)
                .header(ACCEPT, HeaderValue::from_static("application/json"));
            match self.token {
                None => plain,
                Some(ref token) => plain.header(AUTHORIZATION, format!("Token {}", token)),
            }
        };
        Ok(builder)
    }

    /// Send a request, turning non-successful responses into `ApiError`.
    pub(crate) fn send(
        &self,
        request: reqwest::blocking::RequestBuilder,
    ) -> Fallible<reqwest::blocking::Response> {
        let response = request.send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        debug!("request failed with status {}: {}", status, body);
        Err(ApiError::from_response(status, &body).into())
    }
}

/// Builder for `Client`.
#[derive(Clone, CustomDebug, Default)]
pub struct ClientBuilder {
    api_base: Option<String>,
    hclient: Option<reqwest::blocking::Client>,
    #[debug(skip)]
    token: Option<String>,
    user_agent: Option<String>,
    danger_accept_invalid_certs: Option<bool>,
}

impl ClientBuilder {
    /// Set (or reset) the HTTP client to use.
    pub fn http_client(self, hclient: Option<reqwest::blocking::Client>) -> Self {
        let mut builder = self;
        builder.hclient = hclient;
        builder
    }

    /// Set (or reset) the API token to use.
    pub fn access_token(self, token: Option<String>) -> Self {
        let mut builder = self;
        builder.token = token;
        builder
    }

    /// Set (or reset) the base API endpoint URL to use.
    pub fn api_base(self, api_base: Option<String>) -> Self {
        let mut builder = self;
        builder.api_base = api_base;
        builder
    }

    /// Set (or reset) the user-agent to send.
    pub fn user_agent(self, user_agent: Option<String>) -> Self {
        let mut builder = self;
        builder.user_agent = user_agent;
        builder
    }

    /// Set (or reset) whether invalid TLS certificates are accepted.
    pub fn accept_invalid_certs(self, accept_invalid_certs: Option<bool>) -> Self {
        let mut builder = self;
        builder.danger_accept_invalid_certs = accept_invalid_certs;
        builder
    }

    /// Build a client with specified parameters.
    pub fn build(self) -> Fallible<Client> {
        let hclient = match self.hclient {
            Some(client) => client,
            None => reqwest::blocking::ClientBuilder::new()
                .user_agent(
                    self.user_agent
                        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
                )
                .danger_accept_invalid_certs(self.danger_accept_invalid_certs.unwrap_or_default())
                .build()?,
        };
        let api_base = match self.api_base {
            Some(ref base) => reqwest::Url::parse(base)?,
            None => reqwest::Url::parse(&api_base_for(DEFAULT_ENDPOINT))?,
        };
        if api_base.cannot_be_a_base() {
            bail!("invalid api_base '{}'", api_base);
        }

        Ok(Client {
            api_base,
            hclient,
            token: self.token,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a client against a mock server.
    pub(crate) fn mock_client(server: &mockito::ServerGuard) -> Client {
        let _ = commons::testing::init_logger();
        Client::builder()
            .api_base(Some(api_base_for(server.url())))
            .access_token(Some("some-token".to_string()))
            .build()
            .unwrap()
    }

    #[test]
    fn api_base_from_endpoint() {
        assert_eq!(
            api_base_for("https://network.pivotal.io"),
            "https://network.pivotal.io/api/v2/"
        );
        assert_eq!(
            api_base_for("http://localhost:8080/"),
            "http://localhost:8080/api/v2/"
        );
    }

    #[test]
    fn default_api_base() {
        let client = Client::builder().build().unwrap();
        assert_eq!(
            client.api_base().as_str(),
            "https://network.pivotal.io/api/v2/"
        );
    }

    #[test]
    fn invalid_api_base() {
        let res = Client::builder()
            .api_base(Some("not a url".to_string()))
            .build();
        assert!(res.is_err());
    }

    #[test]
    fn token_is_sent() {
        let mut server = mockito::Server::new();
        let m = server
            .mock("GET", "/api/v2/products/some-product/releases")
            .match_header("authorization", "Token some-token")
            .match_header("accept", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"releases":[]}"#)
            .create();

        let client = mock_client(&server);
        let releases = client.releases("some-product").unwrap();
        assert!(releases.is_empty());
        m.assert();
    }

    #[test]
    fn error_status_is_mapped() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("GET", "/api/v2/products/some-product/releases")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":401,"message":"Access Denied"}"#)
            .create();

        let client = mock_client(&server);
        let err = client.releases("some-product").unwrap_err();
        let api_err = err.downcast_ref::<ApiError>().unwrap();
        assert_eq!(api_err, &ApiError::Unauthorized("Access Denied".to_string()));
    }

    #[test]
    fn token_is_not_debug_printed() {
        let client = Client::builder()
            .access_token(Some("super-secret".to_string()))
            .build()
            .unwrap();
        assert!(!format!("{:?}", client).contains("super-secret"));
    }
}
