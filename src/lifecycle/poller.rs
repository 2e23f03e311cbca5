use crate::cloud::auth::Session;
use crate::cloud::client::CloudClient;
use crate::cloud::models::IssuanceStatus;
use crate::cloud::transport::Transport;
use crate::utils::errors::{CloudPkiError, Result};
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// How long and how often to re-read the status of a pending request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval: Duration,
    /// Zero means report the current state without waiting
    pub timeout: Duration,
}

impl RetryPolicy {
    pub fn new(timeout: Duration) -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Poll a certificate request until it is issued, fails, or the policy runs out.
///
/// Returns the id of the issued certificate, or `None` for an empty pickup id.
pub async fn await_issuance<T: Transport>(
    client: &CloudClient<T>,
    session: &Session,
    pickup_id: &str,
    policy: RetryPolicy,
) -> Result<Option<String>> {
    if pickup_id.is_empty() {
        return Ok(None);
    }

    let started = Instant::now();
    loop {
        let status = client.get_certificate_status(session, pickup_id).await?;
        tracing::debug!("Certificate request {} is {}", pickup_id, status.status);

        match status.status {
            IssuanceStatus::Issued => {
                let certificate_id = status.certificate_id().ok_or_else(|| {
                    CloudPkiError::NotFound(format!(
                        "certificate request {pickup_id} is issued but lists no certificate"
                    ))
                })?;
                return Ok(Some(certificate_id.to_string()));
            }
            IssuanceStatus::Failed => {
                return Err(CloudPkiError::IssuanceFailed {
                    pickup_id: pickup_id.to_string(),
                    status: Box::new(status),
                });
            }
            IssuanceStatus::Requested | IssuanceStatus::Pending => {}
        }

        if policy.timeout.is_zero() {
            return Err(CloudPkiError::CertificatePending {
                pickup_id: pickup_id.to_string(),
                status: Some(status.status),
            });
        }

        tokio::time::sleep(policy.interval).await;
        if started.elapsed() > policy.timeout {
            tracing::warn!(
                "Gave up on certificate request {} after {:?}",
                pickup_id,
                policy.timeout
            );
            return Err(CloudPkiError::RetrieveTimeout {
                pickup_id: pickup_id.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::mock::{json_response, test_session, MockTransport};
    use serde_json::json;

    const STATUS: &str = "outagedetection/v1/certificaterequests/req-1";

    fn status(value: &str) -> crate::cloud::transport::TransportResponse {
        json_response(200, json!({"id": "req-1", "status": value}))
    }

    #[tokio::test]
    async fn test_empty_pickup_id() {
        let client = CloudClient::new(MockTransport::new(), "");
        let result = await_issuance(&client, &test_session(), "", RetryPolicy::new(Duration::ZERO))
            .await
            .unwrap();
        assert_eq!(result, None);
        assert!(client.transport().calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_reports_pending_without_sleeping() {
        let transport = MockTransport::new();
        transport.on("GET", STATUS, status("PENDING"));
        let client = CloudClient::new(transport, "");

        let started = Instant::now();
        let err = await_issuance(&client, &test_session(), "req-1", RetryPolicy::new(Duration::ZERO))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CloudPkiError::CertificatePending {
                status: Some(IssuanceStatus::Pending),
                ..
            }
        ));
        assert!(err.is_pending());
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(client.transport().count("GET", STATUS), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_stops_polling() {
        let transport = MockTransport::new();
        transport.on("GET", STATUS, status("REQUESTED"));
        let client = CloudClient::new(transport, "");

        let err = await_issuance(
            &client,
            &test_session(),
            "req-1",
            RetryPolicy::new(Duration::from_secs(5)),
        )
        .await
        .unwrap_err();

        match err {
            CloudPkiError::RetrieveTimeout { pickup_id } => assert_eq!(pickup_id, "req-1"),
            other => panic!("unexpected error: {other:?}"),
        }
        // Polls at 0s, 2s and 4s; the deadline passes during the sleep to 6s
        assert_eq!(client.transport().count("GET", STATUS), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_issued_after_pending() {
        let transport = MockTransport::new();
        transport.on("GET", STATUS, status("PENDING"));
        transport.on(
            "GET",
            STATUS,
            json_response(
                200,
                json!({"id": "req-1", "status": "ISSUED", "certificateIds": ["cert-1", "cert-0"]}),
            ),
        );
        let client = CloudClient::new(transport, "");

        let id = await_issuance(
            &client,
            &test_session(),
            "req-1",
            RetryPolicy::new(Duration::from_secs(60)),
        )
        .await
        .unwrap();
        assert_eq!(id.as_deref(), Some("cert-1"));
        assert_eq!(client.transport().count("GET", STATUS), 2);
    }

    #[tokio::test]
    async fn test_failed_is_not_retried() {
        let transport = MockTransport::new();
        transport.on("GET", STATUS, status("FAILED"));
        let client = CloudClient::new(transport, "");

        let err = await_issuance(
            &client,
            &test_session(),
            "req-1",
            RetryPolicy::new(Duration::from_secs(60)),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CloudPkiError::IssuanceFailed { .. }));
        assert!(!err.is_pending());
        assert_eq!(client.transport().count("GET", STATUS), 1);
    }

    #[tokio::test]
    async fn test_failure_reports_error_information() {
        let transport = MockTransport::new();
        transport.on(
            "GET",
            STATUS,
            json_response(
                200,
                json!({
                    "id": "req-1",
                    "status": "FAILED",
                    "errorInformation": {"message": "CN not allowed by policy"}
                }),
            ),
        );
        let client = CloudClient::new(transport, "");

        let err = await_issuance(&client, &test_session(), "req-1", RetryPolicy::new(Duration::ZERO))
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("certificate request req-1 failed: "));
        assert!(message.contains("CN not allowed by policy"));
    }

    #[tokio::test]
    async fn test_issued_without_certificate_ids() {
        let transport = MockTransport::new();
        transport.on("GET", STATUS, status("ISSUED"));
        let client = CloudClient::new(transport, "");

        let err = await_issuance(&client, &test_session(), "req-1", RetryPolicy::new(Duration::ZERO))
            .await
            .unwrap_err();
        assert!(matches!(err, CloudPkiError::NotFound(_)));
    }
}
