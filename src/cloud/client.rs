use super::auth::Session;
use super::models::{
    ApiClientInformation, ApplicationDetails, CertificateRequestPayload,
    CertificateRequestsResponse, CertificateSearchResponse, CertificateStatus,
    ManagedCertificate, SearchRequest, ZoneTemplate,
};
use super::response::{decode, unexpected_status};
use super::transport::{HttpTransport, Transport, TransportResponse};
use super::{create_http_client, normalize_url, paths};
use crate::cert::{ChainOption, Fingerprint};
use crate::utils::config::ConnectorConfig;
use crate::utils::errors::{CloudPkiError, Result};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

pub const SDK_NAME: &str = "cloud-pki-rs";

/// Thin typed wrapper over the service's REST endpoints
pub struct CloudClient<T = HttpTransport> {
    transport: T,
    base_url: String,
    client_identifier: String,
}

impl CloudClient<HttpTransport> {
    /// Build a client with the reqwest transport from loaded configuration
    pub fn from_config(config: &ConnectorConfig) -> Result<Self> {
        let http = create_http_client(Duration::from_secs(config.http_timeout_secs))?;
        Ok(Self::new(HttpTransport::new(http), &config.base_url)
            .with_client_identifier(&config.client_identifier))
    }
}

impl<T: Transport> CloudClient<T> {
    pub fn new(transport: T, base_url: &str) -> Self {
        Self {
            transport,
            base_url: normalize_url(base_url),
            client_identifier: "localhost".to_string(),
        }
    }

    pub fn with_client_identifier(mut self, identifier: &str) -> Self {
        self.client_identifier = identifier.to_string();
        self
    }

    /// Get the normalized base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Client information attached to writes; `origin` overrides the SDK name
    pub fn api_client_information(&self, origin: Option<&str>) -> ApiClientInformation {
        ApiClientInformation {
            client_type: origin.unwrap_or(SDK_NAME).to_string(),
            identifier: self.client_identifier.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Generic GET request
    pub async fn get(&self, api_key: Option<&str>, path: &str) -> Result<TransportResponse> {
        self.transport
            .request(Method::GET, &self.url(path), None, api_key)
            .await
    }

    /// Generic POST request with a JSON body
    pub async fn post<P: Serialize>(
        &self,
        api_key: Option<&str>,
        path: &str,
        payload: &P,
    ) -> Result<TransportResponse> {
        let body: Value = serde_json::to_value(payload)?;
        self.transport
            .request(Method::POST, &self.url(path), Some(&body), api_key)
            .await
    }

    /// Submit a create-request payload; returns the record of the created request
    pub async fn create_certificate_request(
        &self,
        session: &Session,
        payload: &CertificateRequestPayload,
    ) -> Result<CertificateStatus> {
        let response = self
            .post(
                Some(session.api_key()),
                &paths::certificate_requests(),
                payload,
            )
            .await?;
        let created: CertificateRequestsResponse =
            decode(&response, 201, "certificate request")?;

        created
            .certificate_requests
            .into_iter()
            .next()
            .ok_or_else(|| {
                CloudPkiError::NotFound(
                    "certificate request response did not contain any request".to_string(),
                )
            })
    }

    /// Get the issuance status of a certificate request
    pub async fn get_certificate_status(
        &self,
        session: &Session,
        request_id: &str,
    ) -> Result<CertificateStatus> {
        tracing::trace!("Fetching status for certificate request {}", request_id);
        let response = self
            .get(
                Some(session.api_key()),
                &paths::certificate_request(request_id),
            )
            .await?;
        decode(&response, 200, "certificate request status")
    }

    /// Get a certificate record by id
    pub async fn get_certificate(
        &self,
        session: &Session,
        certificate_id: &str,
    ) -> Result<ManagedCertificate> {
        let response = self
            .get(Some(session.api_key()), &paths::certificate(certificate_id))
            .await?;
        decode(&response, 200, "certificate lookup")
    }

    /// Run a structured certificate search
    pub async fn search_certificates(
        &self,
        session: &Session,
        request: &SearchRequest,
    ) -> Result<CertificateSearchResponse> {
        let response = self
            .post(
                Some(session.api_key()),
                &paths::certificate_search(),
                request,
            )
            .await?;
        decode(&response, 200, "certificate search")
    }

    /// Search for certificates with an exact fingerprint
    pub async fn search_by_fingerprint(
        &self,
        session: &Session,
        fingerprint: &Fingerprint,
    ) -> Result<CertificateSearchResponse> {
        tracing::debug!("Searching certificates by fingerprint {}", fingerprint);
        self.search_certificates(session, &SearchRequest::by_fingerprint(fingerprint.as_str()))
            .await
    }

    /// Look up an application and its template alias map by name
    pub async fn get_application_by_name(
        &self,
        session: &Session,
        name: &str,
    ) -> Result<ApplicationDetails> {
        let response = self
            .get(Some(session.api_key()), &paths::application_by_name(name))
            .await?;

        match response.status {
            200 => decode(&response, 200, "application lookup"),
            404 => Err(CloudPkiError::NotFound(format!(
                "application '{name}' does not exist"
            ))),
            401 => Err(CloudPkiError::Auth(format!(
                "not authorized to read application '{name}'"
            ))),
            _ => Err(unexpected_status(&response, "application lookup")),
        }
    }

    /// Read the issuing template behind an application/alias pair
    pub async fn get_zone_template(
        &self,
        session: &Session,
        application: &str,
        alias: &str,
    ) -> Result<ZoneTemplate> {
        let response = self
            .get(
                Some(session.api_key()),
                &paths::issuing_template(application, alias),
            )
            .await?;

        match response.status {
            200 => decode(&response, 200, "issuing template lookup"),
            404 => Err(CloudPkiError::NotFound(format!(
                "issuing template '{alias}' not found for application '{application}'"
            ))),
            _ => Err(unexpected_status(&response, "issuing template lookup")),
        }
    }

    /// Fetch certificate PEM content. With a chain option the service orders the chain;
    /// without one it returns the single certificate.
    pub async fn get_certificate_contents(
        &self,
        session: &Session,
        certificate_id: &str,
        chain: Option<ChainOption>,
    ) -> Result<TransportResponse> {
        let mut path = paths::certificate_contents(certificate_id);
        if let Some(option) = chain {
            path.push_str(&format!(
                "?chainOrder={}&format=PEM",
                option.wire_value()
            ));
        }
        self.get(Some(session.api_key()), &path).await
    }
}
