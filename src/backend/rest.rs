use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, instrument};

use super::Backend;
use crate::actor_framework::Resource;
use crate::error::GatewayError;

/// JSON-over-HTTP collection at `{base_url}/{collection}`.
///
/// Every call is a single request; failures are returned to the caller as is.
#[derive(Debug, Clone)]
pub struct RestBackend<T: Resource> {
    http: Client,
    base_url: String,
    _resource: PhantomData<fn() -> T>,
}

impl<T: Resource> RestBackend<T> {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            _resource: PhantomData,
        }
    }

    /// Builds a client with a per-request timeout.
    ///
    /// # Errors
    /// Fails when the TLS backend cannot be initialised.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::new(http, base_url))
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, T::COLLECTION)
    }

    fn record_url(&self, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, T::COLLECTION, id)
    }

    async fn ensure_success(response: Response) -> Result<Response, GatewayError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        Err(GatewayError::UnexpectedStatus {
            collection: T::COLLECTION,
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl<T: Resource> Backend<T> for RestBackend<T> {
    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    async fn list(&self) -> Result<Vec<T>, GatewayError> {
        debug!("Sending request");
        let response = self.http.get(self.collection_url()).send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.json().await?)
    }

    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    async fn get(&self, id: &str) -> Result<Option<T>, GatewayError> {
        debug!("Sending request");
        let response = self.http.get(self.record_url(id)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::ensure_success(response).await?;
        Ok(Some(response.json().await?))
    }

    #[instrument(skip(self, payload), fields(collection = T::COLLECTION))]
    async fn create(&mut self, payload: &T::Payload) -> Result<T, GatewayError> {
        debug!("Sending request");
        let response = self
            .http
            .post(self.collection_url())
            .json(payload)
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.json().await?)
    }

    #[instrument(skip(self, payload), fields(collection = T::COLLECTION))]
    async fn update(&mut self, id: &str, payload: &T::Payload) -> Result<T, GatewayError> {
        debug!("Sending request");
        let response = self
            .http
            .put(self.record_url(id))
            .json(payload)
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.json().await?)
    }

    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    async fn delete(&mut self, id: &str) -> Result<(), GatewayError> {
        debug!("Sending request");
        let response = self.http.delete(self.record_url(id)).send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;
    use crate::domain::User;

    /// Answers a single HTTP request with `status` and `body`, returning the
    /// request head it received.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 1024];
            while !received.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
            }
            let reply = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            let head = String::from_utf8_lossy(&received).to_string();
            head.lines().next().unwrap_or_default().to_string()
        });

        (base_url, handle)
    }

    #[tokio::test]
    async fn lists_the_collection() {
        let body = r#"[{"id":"101","first_name":"Ada","last_name":"L","username":"ada","email":"a@b.c","password":"x"}]"#;
        let (base_url, server) = serve_once("200 OK", body).await;
        let backend = RestBackend::<User>::new(Client::new(), &format!("{base_url}/"));

        let users = backend.list().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, "101");
        assert_eq!(server.await.unwrap(), "GET /users HTTP/1.1");
    }

    #[tokio::test]
    async fn missing_record_is_none() {
        let (base_url, server) = serve_once("404 Not Found", "{}").await;
        let backend = RestBackend::<User>::new(Client::new(), &base_url);

        assert!(backend.get("77").await.unwrap().is_none());
        assert_eq!(server.await.unwrap(), "GET /users/77 HTTP/1.1");
    }

    #[tokio::test]
    async fn error_status_carries_the_body() {
        let (base_url, server) = serve_once("500 Internal Server Error", "\"boom\"").await;
        let mut backend = RestBackend::<User>::new(Client::new(), &base_url);

        let err = backend.delete("5").await.unwrap_err();
        match err {
            GatewayError::UnexpectedStatus { collection, status, body } => {
                assert_eq!(collection, "users");
                assert_eq!(status, 500);
                assert_eq!(body, "\"boom\"");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(server.await.unwrap(), "DELETE /users/5 HTTP/1.1");
    }
}
