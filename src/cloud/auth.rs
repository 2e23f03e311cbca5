use super::client::CloudClient;
use super::models::{Company, UserDetails};
use super::paths;
use super::response::decode;
use super::transport::Transport;
use crate::utils::errors::{CloudPkiError, Result};

/// Authenticated context: the API key plus the account it resolved to.
///
/// Returned by [`CloudClient::authenticate`] and passed to every later call.
#[derive(Debug, Clone)]
pub struct Session {
    api_key: String,
    user: UserDetails,
}

impl Session {
    pub fn new(api_key: String, user: UserDetails) -> Self {
        Self { api_key, user }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn user(&self) -> &UserDetails {
        &self.user
    }

    pub fn company(&self) -> Option<&Company> {
        self.user.company.as_ref()
    }

    /// Fail unless the account belongs to a company; `action` names the operation
    pub fn require_company(&self, action: &str) -> Result<&Company> {
        self.company().ok_or_else(|| {
            CloudPkiError::Auth(format!("must be authenticated to {action}"))
        })
    }
}

impl<T: Transport> CloudClient<T> {
    /// Validate an API key against the user-account endpoint
    pub async fn authenticate(&self, api_key: &str) -> Result<Session> {
        if api_key.trim().is_empty() {
            return Err(CloudPkiError::Auth(
                "failed to authenticate: missing credentials".to_string(),
            ));
        }

        let response = self.get(Some(api_key), &paths::user_accounts()).await?;
        if response.status == 401 {
            return Err(CloudPkiError::Auth(
                "API key was rejected by the service".to_string(),
            ));
        }
        let user: UserDetails = decode(&response, 200, "user account lookup")?;

        tracing::info!(
            "Authenticated as {} (company: {})",
            user.user.username,
            user.company
                .as_ref()
                .map(|c| c.name.as_str())
                .unwrap_or("none")
        );

        Ok(Session::new(api_key.to_string(), user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::mock::{json_response, MockTransport};
    use serde_json::json;

    #[tokio::test]
    async fn test_authenticate_returns_session() {
        let transport = MockTransport::new();
        transport.on(
            "GET",
            "v1/useraccounts",
            json_response(
                200,
                json!({
                    "user": {"username": "bot@example.com", "id": "u1", "companyId": "co1"},
                    "company": {"id": "co1", "name": "Example", "active": true}
                }),
            ),
        );
        let client = CloudClient::new(transport, "");

        let session = client.authenticate("secret").await.unwrap();
        assert_eq!(session.api_key(), "secret");
        assert_eq!(session.require_company("request").unwrap().id, "co1");

        let calls = client.transport().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].api_key.as_deref(), Some("secret"));
        assert_eq!(calls[0].url, "https://api.venafi.cloud/v1/useraccounts");
    }

    #[tokio::test]
    async fn test_authenticate_rejects_empty_key() {
        let client = CloudClient::new(MockTransport::new(), "");
        let err = client.authenticate("").await.unwrap_err();
        assert!(matches!(err, CloudPkiError::Auth(_)));
        assert!(client.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn test_authenticate_rejected_key() {
        let transport = MockTransport::new();
        transport.on("GET", "v1/useraccounts", json_response(401, json!({})));
        let client = CloudClient::new(transport, "");
        assert!(matches!(
            client.authenticate("bad").await,
            Err(CloudPkiError::Auth(_))
        ));
    }

    #[test]
    fn test_session_without_company() {
        let session = Session::new(
            "k".to_string(),
            serde_json::from_value(json!({"user": {"username": "u", "id": "1"}, "company": null}))
                .unwrap(),
        );
        let err = session.require_company("request a certificate").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Authentication error: must be authenticated to request a certificate"
        );
    }
}
