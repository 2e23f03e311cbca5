//! Scripted transport for unit tests.

use super::transport::{Transport, TransportResponse};
use crate::utils::errors::{CloudPkiError, Result};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub method: Method,
    pub url: String,
    pub payload: Option<Value>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
enum Scripted {
    Response(TransportResponse),
    Failure(String),
}

struct Route {
    method: Method,
    path: String,
    replies: VecDeque<Scripted>,
}

/// Replies are matched on method and URL path suffix (query string ignored).
/// Replies queue per route; the last one repeats.
#[derive(Default)]
pub(crate) struct MockTransport {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<RecordedCall>>,
}

pub(crate) fn json_response(status: u16, body: Value) -> TransportResponse {
    TransportResponse {
        status,
        status_text: status.to_string(),
        body: serde_json::to_vec(&body).unwrap(),
    }
}

pub(crate) fn text_response(status: u16, body: &str) -> TransportResponse {
    TransportResponse {
        status,
        status_text: status.to_string(),
        body: body.as_bytes().to_vec(),
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, method: &str, path: &str, response: TransportResponse) {
        self.push(method, path, Scripted::Response(response));
    }

    pub fn fail(&self, method: &str, path: &str, message: &str) {
        self.push(method, path, Scripted::Failure(message.to_string()));
    }

    fn push(&self, method: &str, path: &str, reply: Scripted) {
        let method = Method::from_bytes(method.as_bytes()).unwrap();
        let mut routes = self.routes.lock().unwrap();
        match routes
            .iter_mut()
            .find(|r| r.method == method && r.path == path)
        {
            Some(route) => route.replies.push_back(reply),
            None => routes.push(Route {
                method,
                path: path.to_string(),
                replies: VecDeque::from([reply]),
            }),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls made to `method` on a URL whose path ends with `path`
    pub fn count(&self, method: &str, path: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.method.as_str() == method && strip_query(&c.url).ends_with(path))
            .count()
    }
}

fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(
        &self,
        method: Method,
        url: &str,
        payload: Option<&Value>,
        api_key: Option<&str>,
    ) -> Result<TransportResponse> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: method.clone(),
            url: url.to_string(),
            payload: payload.cloned(),
            api_key: api_key.map(str::to_string),
        });

        let path = strip_query(url);
        let mut routes = self.routes.lock().unwrap();
        let route = routes
            .iter_mut()
            .find(|r| r.method == method && path.ends_with(&r.path))
            .unwrap_or_else(|| panic!("no scripted reply for {method} {url}"));

        let reply = if route.replies.len() > 1 {
            route.replies.pop_front().unwrap()
        } else {
            route.replies[0].clone()
        };

        match reply {
            Scripted::Response(response) => Ok(response),
            Scripted::Failure(message) => Err(CloudPkiError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                message,
            ))),
        }
    }
}

/// Session for a user belonging to a company
pub(crate) fn test_session() -> super::auth::Session {
    super::auth::Session::new(
        "test-key".to_string(),
        serde_json::from_value(serde_json::json!({
            "user": {"username": "bot@example.com", "id": "u1", "companyId": "co1"},
            "company": {"id": "co1", "name": "Example", "active": true}
        }))
        .unwrap(),
    )
}

/// One record of a certificate search response
pub(crate) fn search_record(id: &str, request_id: &str, fingerprint: &str) -> Value {
    serde_json::json!({
        "id": id,
        "certificateRequestId": request_id,
        "subjectCN": [format!("{id}.example.com")],
        "fingerprint": fingerprint,
    })
}

pub(crate) fn search_response(records: Vec<Value>) -> TransportResponse {
    json_response(
        200,
        serde_json::json!({"count": records.len(), "certificates": records}),
    )
}
