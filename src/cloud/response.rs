use super::models::{ResponseError, ResponseErrors};
use super::transport::TransportResponse;
use crate::utils::errors::{CloudPkiError, RemoteErrors, Result};
use serde::de::DeserializeOwned;

/// Extract the `{"errors": [{code, message}]}` payload, if the body has that shape
pub fn parse_response_errors(body: &[u8]) -> Option<Vec<ResponseError>> {
    if body.is_empty() {
        return None;
    }
    serde_json::from_slice::<ResponseErrors>(body)
        .ok()
        .map(|e| e.errors)
}

/// Build the error for a response whose status did not match the expected one
pub fn unexpected_status(response: &TransportResponse, context: &str) -> CloudPkiError {
    let errors = parse_response_errors(&response.body).unwrap_or_default();
    CloudPkiError::Server {
        context: context.to_string(),
        status: response.status,
        errors: RemoteErrors(errors),
    }
}

/// Deserialize a body without checking the status
pub fn parse_body<T: DeserializeOwned>(body: &[u8], context: &str) -> Result<T> {
    serde_json::from_slice(body).map_err(|source| CloudPkiError::Decode {
        context: context.to_string(),
        source,
    })
}

/// Decode a JSON body when the status equals `expected`, otherwise surface the remote error
pub fn decode<T: DeserializeOwned>(
    response: &TransportResponse,
    expected: u16,
    context: &str,
) -> Result<T> {
    if response.status == expected {
        parse_body(&response.body, context)
    } else {
        Err(unexpected_status(response, context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::models::ManagedCertificate;

    fn response(status: u16, body: &str) -> TransportResponse {
        TransportResponse {
            status,
            status_text: status.to_string(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_decode_expected_status() {
        let cert: ManagedCertificate = decode(
            &response(200, r#"{"id":"c1","companyId":"co","certificateRequestId":"r1"}"#),
            200,
            "certificate lookup",
        )
        .unwrap();
        assert_eq!(cert.certificate_request_id, "r1");
    }

    #[test]
    fn test_decode_collects_remote_errors() {
        let err = decode::<ManagedCertificate>(
            &response(
                400,
                r#"{"errors":[{"code":1,"message":"first"},{"code":2,"message":"second"}]}"#,
            ),
            200,
            "certificate lookup",
        )
        .unwrap_err();

        match err {
            CloudPkiError::Server {
                status, errors, ..
            } => {
                assert_eq!(status, 400);
                assert_eq!(errors.0.len(), 2);
                assert_eq!(errors.0[1].message, "second");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_without_error_body_is_generic() {
        let err =
            decode::<ManagedCertificate>(&response(502, "<html>bad gateway</html>"), 200, "lookup")
                .unwrap_err();
        assert_eq!(
            err.to_string(),
            "unexpected status code on lookup. Status: 502"
        );
    }

    #[test]
    fn test_malformed_json_wraps_parse_error() {
        let err = decode::<ManagedCertificate>(&response(200, "{not json"), 200, "lookup")
            .unwrap_err();
        assert!(matches!(err, CloudPkiError::Decode { .. }));
        assert!(err.to_string().starts_with("failed to parse lookup response"));
    }
}
