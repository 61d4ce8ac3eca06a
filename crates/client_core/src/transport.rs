use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{header::HeaderMap, Client};
use serde::de::DeserializeOwned;
use shared::{protocol::Method, SyncError};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<D: DeserializeOwned>(&self) -> Result<D, SyncError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// One HTTP exchange. Connection and read failures come back as
/// `SyncError::Transport`; any status code is a successful exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, request: TransportRequest) -> Result<TransportResponse, SyncError>;
}

#[async_trait]
impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    async fn request(&self, request: TransportRequest) -> Result<TransportResponse, SyncError> {
        (**self).request(request).await
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn request(&self, request: TransportRequest) -> Result<TransportResponse, SyncError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.http.request(method, request.url).headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(SyncError::transport)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(SyncError::transport)?;
        Ok(TransportResponse {
            status,
            body: body.to_vec(),
        })
    }
}
