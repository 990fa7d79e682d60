// JSON-RPC service proxy
//
// Turns named operations into JSON-RPC POST requests against one URI.
// The RpcConnector/RpcProxy traits let connections swap the HTTP
// transport out (tests use in-memory proxies).

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use super::error::RpcError;
use crate::defaults;

/// Arguments for a remote operation
///
/// Positional arguments go out first; keyword arguments, when present,
/// follow as one trailing object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    pub args: Vec<Value>,
    pub kwargs: Map<String, Value>,
}

impl Params {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn positional(args: Vec<Value>) -> Self {
        Self {
            args,
            kwargs: Map::new(),
        }
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(name.into(), value.into());
        self
    }

    /// Wire form of the `params` member
    pub fn to_json(&self) -> Value {
        let mut params = self.args.clone();
        if !self.kwargs.is_empty() {
            params.push(Value::Object(self.kwargs.clone()));
        }
        Value::Array(params)
    }
}

/// Client-side stub for one remote service
#[async_trait]
pub trait RpcProxy: Send + Sync {
    /// Invoke `operation` remotely and return its raw result
    async fn call(&self, operation: &str, params: &Params) -> Result<Value, RpcError>;
}

/// Builds proxies bound to a URI and a set of request headers
pub trait RpcConnector: Send + Sync {
    fn connect(&self, uri: &str, headers: &[(String, String)])
        -> Result<Box<dyn RpcProxy>, RpcError>;
}

/// Connector producing reqwest-backed [`ServiceProxy`] instances
#[derive(Debug, Clone)]
pub struct HttpConnector {
    timeout: Duration,
}

impl HttpConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for HttpConnector {
    fn default() -> Self {
        Self::new(Duration::from_secs(defaults::TIMEOUT_SECONDS))
    }
}

impl RpcConnector for HttpConnector {
    fn connect(
        &self,
        uri: &str,
        headers: &[(String, String)],
    ) -> Result<Box<dyn RpcProxy>, RpcError> {
        Ok(Box::new(ServiceProxy::new(uri, headers, self.timeout)?))
    }
}

/// JSON-RPC proxy talking to a single service URI over HTTP
pub struct ServiceProxy {
    uri: String,
    client: Client,
    next_id: AtomicU64,
}

impl ServiceProxy {
    /// Create a proxy sending `headers` with every request
    ///
    /// A header that cannot be put on the wire is reported as an
    /// authentication failure: the only headers we send carry identity.
    pub fn new(
        uri: impl Into<String>,
        headers: &[(String, String)],
        timeout: Duration,
    ) -> Result<Self, RpcError> {
        let mut header_map = HeaderMap::new();
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| RpcError::Auth(format!("bad header name '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| RpcError::Auth(format!("bad value for header '{}': {}", name, e)))?;
            header_map.insert(name, value);
        }

        let client = Client::builder()
            .default_headers(header_map)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            uri: uri.into(),
            client,
            next_id: AtomicU64::new(0),
        })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

#[async_trait]
impl RpcProxy for ServiceProxy {
    async fn call(&self, operation: &str, params: &Params) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "id": id,
            "method": operation,
            "params": params.to_json(),
        });

        debug!(uri = %self.uri, operation, id, "Sending JSON-RPC request");

        let response = self.client.post(&self.uri).json(&request).send().await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RpcError::Auth(format!("server answered HTTP {}", status.as_u16())));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RpcError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply: Map<String, Value> = response
            .json()
            .await
            .map_err(|e| RpcError::InvalidResponse(e.to_string()))?;

        parse_reply(reply)
    }
}

/// Split a decoded JSON-RPC reply into its result or error
fn parse_reply(mut reply: Map<String, Value>) -> Result<Value, RpcError> {
    match reply.remove("error") {
        Some(Value::Null) | None => {}
        Some(error) => return Err(remote_error(error)),
    }

    reply
        .remove("result")
        .ok_or_else(|| RpcError::InvalidResponse("reply has neither result nor error".into()))
}

// Autotest servers report {"name", "message", "traceback"}; JSON-RPC 2.0
// servers report {"code", "message", "data"}. Accept both.
fn remote_error(error: Value) -> RpcError {
    let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
    let message = error
        .get("message")
        .or_else(|| error.get("name"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string());

    RpcError::Remote {
        code,
        message,
        data: Some(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn auth_headers(user: &str) -> Vec<(String, String)> {
        vec![("AUTHORIZATION".to_string(), user.to_string())]
    }

    #[test]
    fn test_params_wire_form() {
        assert_eq!(Params::none().to_json(), json!([]));
        assert_eq!(Params::none().arg(1).arg("x").to_json(), json!([1, "x"]));
        assert_eq!(
            Params::none().arg(1).kwarg("hostname", "box1").to_json(),
            json!([1, {"hostname": "box1"}])
        );
    }

    #[test]
    fn test_parse_reply_prefers_error() {
        let reply = json!({"id": 0, "result": null, "error": {"name": "ValidationError", "message": "bad host"}});
        let err = parse_reply(reply.as_object().unwrap().clone()).unwrap_err();
        match err {
            RpcError::Remote { code, message, .. } => {
                assert_eq!(code, 0);
                assert_eq!(message, "bad host");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_reply_without_result_is_invalid() {
        let reply = json!({"id": 0});
        assert!(matches!(
            parse_reply(reply.as_object().unwrap().clone()),
            Err(RpcError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_unencodable_header_is_auth_error() {
        let result = ServiceProxy::new(
            "http://localhost/",
            &auth_headers("bad\nuser"),
            Duration::from_secs(1),
        );
        assert!(matches!(result, Err(RpcError::Auth(_))));
    }

    #[tokio::test]
    async fn test_call_posts_method_and_returns_result() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/afe/server/rpc/")
            .match_header("authorization", "alice")
            .match_body(Matcher::PartialJson(json!({
                "method": "get_server_time",
                "params": [],
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": 0, "result": "2014-02-03 10:00", "error": null}"#)
            .create_async()
            .await;

        let uri = format!("{}/afe/server/rpc/", server.url());
        let proxy = ServiceProxy::new(uri, &auth_headers("alice"), Duration::from_secs(5)).unwrap();
        let result = proxy.call("get_server_time", &Params::none()).await.unwrap();

        assert_eq!(result, json!("2014-02-03 10:00"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_auth_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(401)
            .create_async()
            .await;

        let proxy = ServiceProxy::new(server.url() + "/", &[], Duration::from_secs(5)).unwrap();
        let err = proxy.call("anything", &Params::none()).await.unwrap_err();
        assert!(matches!(err, RpcError::Auth(_)));
    }

    #[tokio::test]
    async fn test_server_error_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let proxy = ServiceProxy::new(server.url() + "/", &[], Duration::from_secs(5)).unwrap();
        match proxy.call("anything", &Params::none()).await.unwrap_err() {
            RpcError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
