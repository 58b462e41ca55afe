//! The single HTTP entry point. Every call resolves to an [`ApiResponse`];
//! transport problems, bad statuses and unreadable bodies become failure
//! envelopes instead of errors.

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE},
    Client, Method,
};
use serde::Serialize;
use serde_json::{Map, Value};
use shared::normalize::ApiResponse;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointFamily {
    /// Storefront routes under `{base}/public`, no credentials.
    Public,
    /// Management routes under `{base}`, bearer token expected.
    Admin,
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub family: EndpointFamily,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub headers: HeaderMap,
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, family: EndpointFamily, path: impl Into<String>) -> Self {
        Self {
            method,
            family,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
            bearer: None,
        }
    }

    pub fn get(family: EndpointFamily, path: impl Into<String>) -> Self {
        Self::new(Method::GET, family, path)
    }

    pub fn post(family: EndpointFamily, path: impl Into<String>) -> Self {
        Self::new(Method::POST, family, path)
    }

    pub fn put(family: EndpointFamily, path: impl Into<String>) -> Self {
        Self::new(Method::PUT, family, path)
    }

    pub fn delete(family: EndpointFamily, path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, family, path)
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Flattens a serializable struct into query pairs, dropping absent fields.
    pub fn query<T: Serialize>(mut self, query: &T) -> Result<Self, serde_json::Error> {
        if let Value::Object(fields) = serde_json::to_value(query)? {
            for (key, value) in fields {
                match value {
                    Value::Null => {}
                    Value::String(s) => self.query.push((key, s)),
                    other => self.query.push((key, other.to_string())),
                }
            }
        }
        Ok(self)
    }

    pub fn query_pair(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct ApiTransport {
    http: Client,
    base_url: String,
}

impl ApiTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint_url(&self, family: EndpointFamily, path: &str) -> String {
        let path = path.trim_start_matches('/');
        match family {
            EndpointFamily::Public => format!("{}/public/{path}", self.base_url),
            EndpointFamily::Admin => format!("{}/{path}", self.base_url),
        }
    }

    pub async fn send(&self, request: ApiRequest) -> ApiResponse {
        let url = self.endpoint_url(request.family, &request.path);
        debug!(
            method = %request.method,
            %url,
            authenticated = request.bearer.is_some(),
            "api request"
        );

        let mut headers = default_headers();
        headers.extend(request.headers);

        let mut builder = self.http.request(request.method, &url).headers(headers);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(error) => {
                warn!(%url, %error, "api request failed before a response arrived");
                return ApiResponse::network_error(error.to_string());
            }
        };

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!(%url, %status, %error, "failed to read api response body");
                return ApiResponse::network_error(error.to_string());
            }
        };

        let parsed = if bytes.iter().all(u8::is_ascii_whitespace) {
            Ok(empty_body(status.is_success()))
        } else {
            serde_json::from_slice::<Value>(&bytes)
        };

        if !status.is_success() {
            warn!(%url, %status, "api request returned an error status");
            let payload = parsed.unwrap_or_else(|_| Value::Object(Map::new()));
            return ApiResponse::http_failure(status.as_u16(), payload);
        }

        match parsed {
            Ok(payload) => ApiResponse::from_value(Some(status.as_u16()), payload),
            Err(error) => {
                warn!(%url, %status, %error, "api response body is not valid json");
                ApiResponse::malformed_body(status.as_u16())
            }
        }
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

// 204-style replies to deletes carry no body at all.
fn empty_body(success: bool) -> Value {
    let mut object = Map::new();
    if success {
        object.insert("success".to_string(), Value::Bool(true));
    }
    Value::Object(object)
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
