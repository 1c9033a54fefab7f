//! HTTP client for the record API.

use std::sync::Once;

use reqwest::Response;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, instrument};
use url::Url;

use crate::{
    api::models::{
        auth::{LoginRequest, LoginResponse},
        records::{MessageResponse, RecordCreatedResponse, RecordPayload, RecordResponse},
    },
    client::{ClientError, Result},
    types::RecordId,
};

static CRYPTO_PROVIDER: Once = Once::new();

/// reqwest is built without a bundled rustls provider; install the process default once.
fn ensure_crypto_provider() {
    CRYPTO_PROVIDER.call_once(|| {
        // Already installed by the binary is fine
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    });
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Typed calls for each endpoint. Authenticated calls take the bearer token explicitly.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// `base_url` may carry a path prefix; endpoints are resolved beneath it.
    pub fn new(mut base_url: Url) -> Result<Self> {
        ensure_crypto_provider();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Turn a response into `T`, or into [`ClientError::Api`] carrying the server's message
    async fn handle<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.message)
            .unwrap_or_else(|_| if text.is_empty() { status.to_string() } else { text });
        debug!("Request failed with {status}: {message}");

        Err(ClientError::Api { status, message })
    }

    #[instrument(skip_all)]
    pub async fn login(&self, request: &LoginRequest) -> Result<String> {
        let response = self.http.post(self.endpoint("login")?).json(request).send().await?;
        Ok(Self::handle::<LoginResponse>(response).await?.token)
    }

    #[instrument(skip_all)]
    pub async fn list_records(&self, token: &str) -> Result<Vec<RecordResponse>> {
        let response = self.http.get(self.endpoint("users")?).bearer_auth(token).send().await?;
        Self::handle(response).await
    }

    #[instrument(skip_all)]
    pub async fn create_record(&self, token: &str, payload: &RecordPayload) -> Result<RecordCreatedResponse> {
        let response = self
            .http
            .post(self.endpoint("users")?)
            .bearer_auth(token)
            .json(payload)
            .send()
            .await?;
        Self::handle(response).await
    }

    #[instrument(skip(self, token, payload))]
    pub async fn update_record(&self, token: &str, id: RecordId, payload: &RecordPayload) -> Result<MessageResponse> {
        let response = self
            .http
            .patch(self.endpoint(&format!("users/{id}"))?)
            .bearer_auth(token)
            .json(payload)
            .send()
            .await?;
        Self::handle(response).await
    }

    #[instrument(skip(self, token))]
    pub async fn delete_record(&self, token: &str, id: RecordId) -> Result<Vec<RecordResponse>> {
        let response = self
            .http
            .delete(self.endpoint(&format!("users/{id}"))?)
            .bearer_auth(token)
            .send()
            .await?;
        Self::handle(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;
    use uuid::Uuid;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, header, method, path},
    };

    async fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(Url::parse(&server.uri()).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_login_returns_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .and(body_json(json!({"username": "admin", "password": "admin123"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "abc.def.ghi"})))
            .expect(1)
            .mount(&server)
            .await;

        let token = client_for(&server).await.login(&LoginRequest::new("admin", "admin123")).await.unwrap();
        assert_eq!(token, "abc.def.ghi");
    }

    #[tokio::test]
    async fn test_error_body_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "Invalid credentials"})))
            .mount(&server)
            .await;

        let err = client_for(&server).await.login(&LoginRequest::new("admin", "nope")).await.unwrap_err();
        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(message, "Invalid credentials");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_authenticated_calls_send_bearer_token() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();

        Mock::given(method("GET"))
            .and(path("/users"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"_id": id, "name": "Ana", "age": 30, "city": "Lima"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(format!("/users/{id}")))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let records = client.list_records("tok").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);

        assert!(client.delete_record("tok", id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_base_url_path_prefix_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(Url::parse(&format!("{}/api", server.uri())).unwrap()).unwrap();
        assert_eq!(client.base_url().path(), "/api/");
        assert!(client.list_records("tok").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unauthorized_is_detected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid or expired token"})))
            .mount(&server)
            .await;

        let err = client_for(&server).await.list_records("stale").await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_non_json_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.list_records("tok").await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
        assert!(err.to_string().contains("bad gateway"));
    }
}
