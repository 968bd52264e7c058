//! Shared HTTP plumbing for the Canary API clients.
//!
//! Builds the URL, attaches the bearer token, injects trace headers and an
//! `x-request-id`, and turns non-2xx responses into [`ClientError`]s.

use crate::error::{ClientError, ClientResult};
use crate::storage::CredentialStore;
use canary_core::observability::TracedRequest;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;

/// Whether an operation sends the stored bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Auth {
    Anonymous,
    Bearer,
}

#[derive(Clone)]
pub struct ApiTransport {
    client: Client,
    base_url: String,
    credentials: CredentialStore,
    request_timeout: Option<Duration>,
}

impl ApiTransport {
    pub fn new(
        base_url: &str,
        credentials: CredentialStore,
        request_timeout: Option<Duration>,
    ) -> ClientResult<Self> {
        let client = Client::builder().build()?;

        tracing::debug!(base_url = %base_url, "API transport configured");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            request_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        fallback: &'static str,
    ) -> ClientResult<T> {
        let body = self
            .execute::<()>(Method::GET, path, None, Auth::Bearer, fallback)
            .await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub(crate) async fn post<B, T>(
        &self,
        path: &str,
        payload: &B,
        auth: Auth,
        fallback: &'static str,
    ) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self
            .execute(Method::POST, path, Some(payload), auth, fallback)
            .await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub(crate) async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        fallback: &'static str,
    ) -> ClientResult<T> {
        let body = self
            .execute::<()>(Method::DELETE, path, None, Auth::Bearer, fallback)
            .await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Sends one request and returns the raw body of a 2xx response.
    pub(crate) async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        payload: Option<&B>,
        auth: Auth,
        fallback: &'static str,
    ) -> ClientResult<Vec<u8>> {
        let url = format!("{}{}", self.base_url, path);
        let request_id = Uuid::new_v4().to_string();

        let mut request = TracedRequest::new(self.client.request(method.clone(), &url));

        if let Some(timeout) = self.request_timeout {
            request = request.timeout(timeout);
        }

        if auth == Auth::Bearer {
            if let Some(token) = self.credentials.token().await? {
                request = request.bearer_auth(token);
            }
        }

        if let Some(payload) = payload {
            request = request.json(payload);
        }

        let response = request
            .send_with_request_id(&request_id)
            .await
            .map_err(|e| self.transport_error(e, &request_id, &method, path))?;

        let status = response.status();
        // The timeout also covers reading the body.
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e, &request_id, &method, path))?
            .to_vec();

        if status.is_success() {
            tracing::debug!(request_id = %request_id, method = %method, path = %path, status = status.as_u16(), "API request succeeded");
            return Ok(body);
        }

        tracing::warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            "API request failed"
        );

        if status == StatusCode::UNAUTHORIZED && auth == Auth::Bearer {
            return Err(ClientError::SessionExpired);
        }

        Err(ClientError::RequestFailed {
            status: status.as_u16(),
            message: error_message(&body).unwrap_or_else(|| fallback.to_string()),
        })
    }

    fn transport_error(
        &self,
        error: reqwest::Error,
        request_id: &str,
        method: &Method,
        path: &str,
    ) -> ClientError {
        match self.request_timeout {
            Some(timeout) if error.is_timeout() => {
                tracing::warn!(request_id = %request_id, method = %method, path = %path, "API request timed out");
                ClientError::RequestTimedOut(timeout)
            }
            _ => {
                tracing::error!(error = %error, request_id = %request_id, method = %method, path = %path, "API request failed in transport");
                ClientError::Transport(error)
            }
        }
    }
}

/// Pulls the server's error text out of a JSON error body, preferring
/// `error` over `message`.
fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;

    ["error", "message"].iter().find_map(|key| {
        value
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answers one request with headers and a partial body, then stalls.
    async fn stalling_body_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 64\r\n\r\n{\"chats\":")
                .await
                .unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_stalled_body_reports_timeout() {
        let base_url = stalling_body_server().await;
        let credentials = CredentialStore::new(Arc::new(MemoryStore::new()));
        let transport =
            ApiTransport::new(&base_url, credentials, Some(Duration::from_secs(1))).unwrap();

        let err = transport
            .get::<Value>("/chat", "Failed to get chats")
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::RequestTimedOut(timeout) if timeout == Duration::from_secs(1)));
    }

    #[test]
    fn test_error_message_prefers_error_key() {
        let body = br#"{"error":"Invalid credentials","message":"ignored"}"#;
        assert_eq!(error_message(body).as_deref(), Some("Invalid credentials"));
    }

    #[test]
    fn test_error_message_falls_back_to_message_key() {
        let body = br#"{"message":"Chat not found"}"#;
        assert_eq!(error_message(body).as_deref(), Some("Chat not found"));
    }

    #[test]
    fn test_error_message_absent_for_non_json_or_blank() {
        assert_eq!(error_message(b"<html>502</html>"), None);
        assert_eq!(error_message(br#"{"error":"  "}"#), None);
        assert_eq!(error_message(b""), None);
    }
}
