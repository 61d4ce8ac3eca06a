//! HTTP side of the resource synchronizer.
//!
//! A [`ResourceClient`] owns one mirrored collection. Each of its operations
//! runs one request cycle: start a sequenced cycle in the store, perform a
//! single exchange over the [`Transport`], classify the outcome and reconcile
//! exactly one terminal action. Failures never surface as `Err`; they become
//! the `Error` status of the collection.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use shared::{protocol::Method, Record, ResourceState, SyncError};
use state_store::{Action, Applied, Sequence, Store};
use tokio::sync::{watch, Mutex};
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info, warn};

pub mod classify;
pub mod config;
pub mod transport;

pub use config::{header_pair, ClientConfig, RequestOptions, APPLICATION_JSON};
pub use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
pub use transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};

use classify::{classify_create, classify_fetch, classify_put, classify_remove, response_data};

pub struct ResourceClient<T, Tr = ReqwestTransport> {
    transport: Tr,
    config: ClientConfig,
    store: Mutex<Store<T>>,
    updates: watch::Sender<ResourceState<T>>,
}

impl<T> ResourceClient<T, ReqwestTransport>
where
    T: Record + DeserializeOwned,
{
    pub fn new(initial: Vec<T>, config: ClientConfig) -> Self {
        Self::with_transport(initial, config, ReqwestTransport::new())
    }
}

impl<T, Tr> ResourceClient<T, Tr>
where
    T: Record + DeserializeOwned,
    Tr: Transport,
{
    pub fn with_transport(initial: Vec<T>, config: ClientConfig, transport: Tr) -> Self {
        let store = Store::new(initial, config.reducer.clone(), config.ordering);
        let (updates, _) = watch::channel(store.state().clone());
        Self {
            transport,
            config,
            store: Mutex::new(store),
            updates,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Current snapshot of the collection.
    pub fn state(&self) -> ResourceState<T> {
        self.updates.borrow().clone()
    }

    /// Receives every state the store moves through, `Loading` included.
    pub fn subscribe(&self) -> watch::Receiver<ResourceState<T>> {
        self.updates.subscribe()
    }

    /// GET `target` and replace the collection with the server's `Data`.
    pub async fn get_data(&self, target: &str, options: RequestOptions) -> ResourceState<T> {
        self.run(Method::Get, target, &options, None, |_, data| {
            classify_fetch(data)
        })
        .await
    }

    /// POST `body`; append the returned record, or records when
    /// `append_as_list` is set.
    pub async fn post_data(
        &self,
        target: &str,
        options: RequestOptions,
        body: impl Into<Vec<u8>>,
        append_as_list: bool,
    ) -> ResourceState<T> {
        self.run(Method::Post, target, &options, Some(body.into()), |_, data| {
            classify_create(data, append_as_list)
        })
        .await
    }

    /// PUT `body`. 200 adds what the server returns, 201 merges it into the
    /// matching elements.
    pub async fn put_data(
        &self,
        target: &str,
        options: RequestOptions,
        body: impl Into<Vec<u8>>,
    ) -> ResourceState<T> {
        self.run(Method::Put, target, &options, Some(body.into()), classify_put)
            .await
    }

    /// DELETE `target` and drop the elements whose `identifier_field` equals
    /// the identifier the server echoes back.
    pub async fn delete_data(
        &self,
        target: &str,
        identifier_field: &str,
        options: RequestOptions,
    ) -> ResourceState<T> {
        self.run(Method::Delete, target, &options, None, |_, data| {
            Ok(classify_remove(identifier_field, data))
        })
        .await
    }

    pub async fn post_json<B>(
        &self,
        target: &str,
        options: RequestOptions,
        body: &B,
        append_as_list: bool,
    ) -> ResourceState<T>
    where
        B: Serialize + ?Sized,
    {
        match serde_json::to_vec(body) {
            Ok(bytes) => {
                self.post_data(target, json_options(options), bytes, append_as_list)
                    .await
            }
            Err(err) => self.fail_locally(Method::Post, target, err.into()).await,
        }
    }

    pub async fn put_json<B>(&self, target: &str, options: RequestOptions, body: &B) -> ResourceState<T>
    where
        B: Serialize + ?Sized,
    {
        match serde_json::to_vec(body) {
            Ok(bytes) => self.put_data(target, json_options(options), bytes).await,
            Err(err) => self.fail_locally(Method::Put, target, err.into()).await,
        }
    }

    async fn run<F>(
        &self,
        method: Method,
        target: &str,
        options: &RequestOptions,
        body: Option<Vec<u8>>,
        classify: F,
    ) -> ResourceState<T>
    where
        F: FnOnce(u16, Value) -> Result<Action<T>, SyncError> + Send,
    {
        let seq = self.begin().await;
        let outcome = match self.exchange(method, target, options, body).await {
            Ok((status, data)) => classify(status, data),
            Err(err) => Err(err),
        };
        let action = match outcome {
            Ok(action) => action,
            Err(err) => {
                warn!(
                    seq = seq.0,
                    method = %method,
                    resource = target,
                    error = %err,
                    "resource: request failed"
                );
                Action::Failure(err.to_string())
            }
        };
        self.finish(seq, action).await
    }

    async fn exchange(
        &self,
        method: Method,
        target: &str,
        options: &RequestOptions,
        body: Option<Vec<u8>>,
    ) -> Result<(u16, Value), SyncError> {
        let url = self.config.resolve(target)?;
        let headers = self.config.request_headers(method, options);
        debug!(method = %method, url = %url, "resource: sending request");

        let response = self
            .transport
            .request(TransportRequest {
                method,
                url,
                headers,
                body,
            })
            .await?;
        let data = response_data(&response)?;
        Ok((response.status, data))
    }

    /// A request that could not even be built still runs a full cycle, so
    /// observers see `Loading` followed by `Error` like any other failure.
    async fn fail_locally(&self, method: Method, target: &str, err: SyncError) -> ResourceState<T> {
        let seq = self.begin().await;
        warn!(
            seq = seq.0,
            method = %method,
            resource = target,
            error = %err,
            "resource: request failed"
        );
        self.finish(seq, Action::Failure(err.to_string())).await
    }

    async fn begin(&self) -> Sequence {
        let mut store = self.store.lock().await;
        let seq = store.begin();
        self.updates.send_replace(store.state().clone());
        seq
    }

    async fn finish(&self, seq: Sequence, action: Action<T>) -> ResourceState<T> {
        let mut store = self.store.lock().await;
        let kind = action.kind();
        if let Applied::Stale { latest } = store.apply(seq, action) {
            info!(
                seq = seq.0,
                latest = latest.0,
                action = kind,
                "resource: response superseded by a newer request"
            );
        }
        let snapshot = store.state().clone();
        self.updates.send_replace(snapshot.clone());
        snapshot
    }
}

fn json_options(mut options: RequestOptions) -> RequestOptions {
    if options.content_type.is_none() && !options.headers.contains_key(CONTENT_TYPE) {
        options.content_type = Some(HeaderValue::from_static(APPLICATION_JSON));
    }
    options
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
