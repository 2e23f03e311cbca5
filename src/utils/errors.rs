use crate::cloud::models::{CertificateStatus, IssuanceStatus, ResponseError};
use std::fmt;
use thiserror::Error;

/// Error entries returned by the remote service, one line per entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteErrors(pub Vec<ResponseError>);

impl fmt::Display for RemoteErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for e in &self.0 {
            write!(f, "\nError Code: {} Error: {}", e.code, e.message)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum CloudPkiError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("more than one certificate request id was found with fingerprint {fingerprint}: {request_ids:?}")]
    AmbiguousIdentity {
        fingerprint: String,
        request_ids: Vec<String>,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("certificate {pickup_id} is still pending{}", .status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    CertificatePending {
        pickup_id: String,
        status: Option<IssuanceStatus>,
    },

    #[error("timed out waiting for certificate {pickup_id} to be issued")]
    RetrieveTimeout { pickup_id: String },

    #[error(
        "certificate request {pickup_id} failed{}",
        .status.error_information.as_ref().map(|info| format!(": {info}")).unwrap_or_default()
    )]
    IssuanceFailed {
        pickup_id: String,
        status: Box<CertificateStatus>,
    },

    #[error(
        "certificate under request {request_id}{} is not the latest under certificate {certificate_id}. \
         The latest request is {latest_request_id}. This happens when a revoked certificate is requested to be renewed",
        .fingerprint.as_ref().map(|fp| format!(" with thumbprint {fp}")).unwrap_or_default()
    )]
    LineageMismatch {
        request_id: String,
        certificate_id: String,
        latest_request_id: String,
        fingerprint: Option<String>,
    },

    #[error("failed to submit renewal request: {field} is empty, certificate status is {status}")]
    MissingRenewalField {
        field: &'static str,
        status: IssuanceStatus,
    },

    #[error("service temporarily unavailable{}: {detail}", .status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    RemoteUnavailable { status: Option<u16>, detail: String },

    #[error("certificate data rejected by the service: {status} {status_text} {body}")]
    RemoteBadData {
        status: u16,
        status_text: String,
        body: String,
    },

    #[error("unexpected status code on {context}. Status: {status}{errors}")]
    Server {
        context: String,
        status: u16,
        errors: RemoteErrors,
    },

    #[error("certificate with fingerprint {fingerprint} was imported but {matches} matching records were found afterwards")]
    ImportInconsistent { fingerprint: String, matches: usize },

    #[error("Certificate integrity error: {0}")]
    Integrity(String),

    #[error("Certificate parsing error: {0}")]
    CertParsing(String),

    #[error("failed to parse {context} response: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CloudPkiError {
    /// Conditions a caller can resolve by polling again later
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            Self::CertificatePending { .. } | Self::RetrieveTimeout { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CloudPkiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_errors_display() {
        let err = CloudPkiError::Server {
            context: "certificate search".to_string(),
            status: 400,
            errors: RemoteErrors(vec![
                ResponseError {
                    code: 10001,
                    message: "bad filter".to_string(),
                },
                ResponseError {
                    code: 10002,
                    message: "bad paging".to_string(),
                },
            ]),
        };

        assert_eq!(
            err.to_string(),
            "unexpected status code on certificate search. Status: 400\n\
             Error Code: 10001 Error: bad filter\n\
             Error Code: 10002 Error: bad paging"
        );
    }

    #[test]
    fn test_lineage_message_includes_ids() {
        let err = CloudPkiError::LineageMismatch {
            request_id: "req-1".to_string(),
            certificate_id: "cert-1".to_string(),
            latest_request_id: "req-2".to_string(),
            fingerprint: Some("AABB".to_string()),
        };
        let message = err.to_string();
        assert!(message.contains("req-1"));
        assert!(message.contains("req-2"));
        assert!(message.contains("with thumbprint AABB"));
    }

    #[test]
    fn test_pending_classification() {
        let pending = CloudPkiError::CertificatePending {
            pickup_id: "req-1".to_string(),
            status: Some(IssuanceStatus::Pending),
        };
        assert!(pending.is_pending());
        assert_eq!(
            pending.to_string(),
            "certificate req-1 is still pending (status PENDING)"
        );

        let timeout = CloudPkiError::RetrieveTimeout {
            pickup_id: "req-1".to_string(),
        };
        assert!(timeout.is_pending());
        assert!(!CloudPkiError::NotFound("x".to_string()).is_pending());
    }
}
