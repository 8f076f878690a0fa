//! HTTP Store Client
//!
//! Talks to a remote key-value store over JSON/HTTP.
//!
//! ## Routes
//!
//! ```text
//! GET    /instances                       -> {"instances": [..]}
//! POST   /instances                       {"name"}
//! GET    /instances/{i}                   (existence check for SELECT)
//! DELETE /instances/{i}
//! GET    /instances/{i}/keys              -> {"keys": [..]}
//! PUT    /instances/{i}/str/{name}        {"value", "ttl"}
//! GET    /instances/{i}/str/{name}        -> {"value"}
//! DELETE /instances/{i}/keys/{name}
//! PUT    /instances/{i}/ttl/{name}        {"ttl"}
//! DELETE /instances/{i}/ttl/{name}
//! PUT    /instances/{i}/arr/{name}        {"value": [..], "ttl"}
//! GET    /instances/{i}/arr/{name}        -> {"value": [..]}
//! POST   /instances/{i}/arr/{name}        {"value"}   (append)
//! GET    /instances/{i}/arr/{name}/{idx}  -> {"value"}
//! PUT    /instances/{i}/arr/{name}/{idx}  {"value"}
//! DELETE /instances/{i}/arr/{name}/{idx}
//! PUT    /instances/{i}/hash/{name}       {"value": {..}, "ttl"}
//! GET    /instances/{i}/hash/{name}       -> {"value": {..}}
//! GET    /instances/{i}/hash/{name}/{key} -> {"value"}
//! PUT    /instances/{i}/hash/{name}/{key} {"value"}
//! DELETE /instances/{i}/hash/{name}/{key}
//! ```
//!
//! Any non-2xx answer becomes [`StoreError::Server`]; the message is taken
//! from an `{"error": ".."}` body when the store sends one.

use super::{Hash, StoreClient, StoreError, StoreResult};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

#[derive(Serialize)]
struct NameBody<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct ValueBody<'a, T: ?Sized> {
    value: &'a T,
}

#[derive(Serialize)]
struct ExpiringValueBody<'a, T: ?Sized> {
    value: &'a T,
    ttl: i64,
}

#[derive(Serialize)]
struct TtlBody {
    ttl: i64,
}

#[derive(Deserialize)]
struct ValueReply<T> {
    value: T,
}

#[derive(Deserialize)]
struct InstancesReply {
    instances: Vec<String>,
}

#[derive(Deserialize)]
struct KeysReply {
    keys: Vec<String>,
}

#[derive(Deserialize)]
struct ErrorReply {
    error: String,
}

/// A [`StoreClient`] backed by a remote store reachable over HTTP.
#[derive(Debug, Clone)]
pub struct HttpClient {
    base: Url,
    http: reqwest::Client,
    current: String,
}

impl HttpClient {
    /// Creates a client for the store at `addr` (e.g. `http://localhost:3000`).
    ///
    /// No request is made; an unreachable store only shows up on first use.
    pub fn new(addr: &str) -> StoreResult<Self> {
        let base = Url::parse(addr).map_err(|_| StoreError::InvalidAddress(addr.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(StoreError::InvalidAddress(addr.to_string()));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("kvshell/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base,
            http,
            current: String::new(),
        })
    }

    /// The store address this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Builds a URL below the base address; segments are percent-encoded.
    fn url(&self, segments: &[&str]) -> StoreResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidAddress(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Builds a URL below the selected instance.
    fn instance_url(&self, segments: &[&str]) -> StoreResult<Url> {
        if self.current.is_empty() {
            return Err(StoreError::NoInstanceSelected);
        }
        let mut path = vec!["instances", self.current.as_str()];
        path.extend_from_slice(segments);
        self.url(&path)
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> StoreResult<String> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "Store responded");

        if status.is_success() {
            Ok(body)
        } else {
            Err(StoreError::Server {
                status: status.as_u16(),
                message: error_message(status, &body),
            })
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, url: Url) -> StoreResult<T> {
        trace!(%url, "GET");
        let body = self.execute(self.http.get(url)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn send<B: Serialize>(&self, method: Method, url: Url, body: &B) -> StoreResult<()> {
        trace!(%method, %url, "Sending");
        self.execute(self.http.request(method, url).json(body))
            .await
            .map(|_| ())
    }

    async fn delete(&self, url: Url) -> StoreResult<()> {
        trace!(%url, "DELETE");
        self.execute(self.http.delete(url)).await.map(|_| ())
    }
}

/// Picks the most useful message out of an error response.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(reply) = serde_json::from_str::<ErrorReply>(body) {
        return reply.error;
    }
    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        body.to_string()
    }
}

impl StoreClient for HttpClient {
    fn current_instance_name(&self) -> &str {
        &self.current
    }

    async fn list_instances(&self) -> StoreResult<Vec<String>> {
        let reply: InstancesReply = self.fetch(self.url(&["instances"])?).await?;
        Ok(reply.instances)
    }

    async fn create_instance(&self, name: &str) -> StoreResult<()> {
        self.send(Method::POST, self.url(&["instances"])?, &NameBody { name }).await
    }

    async fn select_instance(&mut self, name: &str) -> StoreResult<()> {
        let url = self.url(&["instances", name])?;
        self.execute(self.http.get(url)).await?;
        self.current = name.to_string();
        debug!(instance = name, "Instance selected");
        Ok(())
    }

    async fn destroy(&mut self, name: &str) -> StoreResult<()> {
        self.delete(self.url(&["instances", name])?).await?;
        if self.current == name {
            self.current.clear();
        }
        Ok(())
    }

    async fn keys(&self) -> StoreResult<Vec<String>> {
        let reply: KeysReply = self.fetch(self.instance_url(&["keys"])?).await?;
        Ok(reply.keys)
    }

    async fn set(&self, name: &str, value: &str, ttl: i64) -> StoreResult<()> {
        let body = ExpiringValueBody { value, ttl };
        self.send(Method::PUT, self.instance_url(&["str", name])?, &body).await
    }

    async fn get(&self, name: &str) -> StoreResult<String> {
        let reply: ValueReply<String> = self.fetch(self.instance_url(&["str", name])?).await?;
        Ok(reply.value)
    }

    async fn del(&self, name: &str) -> StoreResult<()> {
        self.delete(self.instance_url(&["keys", name])?).await
    }

    async fn set_ttl(&self, name: &str, seconds: i64) -> StoreResult<()> {
        let body = TtlBody { ttl: seconds };
        self.send(Method::PUT, self.instance_url(&["ttl", name])?, &body).await
    }

    async fn del_ttl(&self, name: &str) -> StoreResult<()> {
        self.delete(self.instance_url(&["ttl", name])?).await
    }

    async fn set_array(&self, name: &str, elements: &[String], ttl: i64) -> StoreResult<()> {
        let body = ExpiringValueBody {
            value: elements,
            ttl,
        };
        self.send(Method::PUT, self.instance_url(&["arr", name])?, &body).await
    }

    async fn get_array(&self, name: &str) -> StoreResult<Vec<String>> {
        let reply: ValueReply<Vec<String>> = self.fetch(self.instance_url(&["arr", name])?).await?;
        Ok(reply.value)
    }

    async fn get_array_element(&self, name: &str, index: i64) -> StoreResult<String> {
        let index = index.to_string();
        let reply: ValueReply<String> = self
            .fetch(self.instance_url(&["arr", name, index.as_str()])?)
            .await?;
        Ok(reply.value)
    }

    async fn add_array_element(&self, name: &str, value: &str) -> StoreResult<()> {
        self.send(
            Method::POST,
            self.instance_url(&["arr", name])?,
            &ValueBody { value },
        )
        .await
    }

    async fn set_array_element(&self, name: &str, index: i64, value: &str) -> StoreResult<()> {
        let index = index.to_string();
        self.send(
            Method::PUT,
            self.instance_url(&["arr", name, index.as_str()])?,
            &ValueBody { value },
        )
        .await
    }

    async fn del_array_element(&self, name: &str, index: i64) -> StoreResult<()> {
        let index = index.to_string();
        self.delete(self.instance_url(&["arr", name, index.as_str()])?).await
    }

    async fn set_hash(&self, name: &str, hash: &Hash, ttl: i64) -> StoreResult<()> {
        let body = ExpiringValueBody { value: hash, ttl };
        self.send(Method::PUT, self.instance_url(&["hash", name])?, &body).await
    }

    async fn get_hash(&self, name: &str) -> StoreResult<Hash> {
        let reply: ValueReply<Hash> = self.fetch(self.instance_url(&["hash", name])?).await?;
        Ok(reply.value)
    }

    async fn get_hash_element(&self, name: &str, key: &str) -> StoreResult<String> {
        let reply: ValueReply<String> = self.fetch(self.instance_url(&["hash", name, key])?).await?;
        Ok(reply.value)
    }

    async fn set_hash_element(&self, name: &str, key: &str, value: &str) -> StoreResult<()> {
        self.send(
            Method::PUT,
            self.instance_url(&["hash", name, key])?,
            &ValueBody { value },
        )
        .await
    }

    async fn del_hash_element(&self, name: &str, key: &str) -> StoreResult<()> {
        self.delete(self.instance_url(&["hash", name, key])?).await
    }
}
