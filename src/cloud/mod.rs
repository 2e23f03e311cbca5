pub mod auth;
pub mod client;
pub mod models;
pub mod response;
pub mod transport;

#[cfg(test)]
pub(crate) mod mock;

use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "api.venafi.cloud/";
pub const API_KEY_HEADER: &str = "tppl-api-key";

const API_VERSION: &str = "v1/";
const BASE_PATH: &str = "outagedetection/v1/";

/// Relative API paths, joined onto the normalized base URL
pub mod paths {
    use super::{API_VERSION, BASE_PATH};

    pub fn user_accounts() -> String {
        format!("{API_VERSION}useraccounts")
    }

    pub fn certificate_requests() -> String {
        format!("{BASE_PATH}certificaterequests")
    }

    pub fn certificate_request(id: &str) -> String {
        format!("{BASE_PATH}certificaterequests/{}", urlencoding::encode(id))
    }

    pub fn certificates() -> String {
        format!("{BASE_PATH}certificates")
    }

    pub fn certificate(id: &str) -> String {
        format!("{BASE_PATH}certificates/{}", urlencoding::encode(id))
    }

    pub fn certificate_contents(id: &str) -> String {
        format!(
            "{BASE_PATH}certificates/{}/contents",
            urlencoding::encode(id)
        )
    }

    pub fn certificate_search() -> String {
        format!("{BASE_PATH}certificatesearch")
    }

    pub fn application_by_name(name: &str) -> String {
        format!("{BASE_PATH}applications/name/{}", urlencoding::encode(name))
    }

    pub fn issuing_template(application: &str, alias: &str) -> String {
        format!(
            "{BASE_PATH}applications/{}/certificateissuingtemplates/{}",
            urlencoding::encode(application),
            urlencoding::encode(alias)
        )
    }
}

/// Build the reqwest client used by [`transport::HttpTransport`]
pub fn create_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .use_rustls_tls() // Use rustls with system certificate store
        .build()
}

/// Normalize a user supplied base URL: force https, lowercase, trailing slash.
/// An empty input falls back to the public service host.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    let url = if url.is_empty() { DEFAULT_BASE_URL } else { url };
    let lowered = url.to_lowercase();

    let host = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);

    let mut normalized = format!("https://{host}");
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}
