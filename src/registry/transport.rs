//! The HTTP seam between the lookup pipeline and the network.

use std::sync::Mutex;

use crate::core::LookupError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A single outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body.into()),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends requests to the registries.
///
/// Implementations only report transport failures as errors; any HTTP
/// status, including 4xx and 5xx, is a successful [`HttpReply`].
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpReply, LookupError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest) -> Result<HttpReply, LookupError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: &HttpRequest) -> Result<HttpReply, LookupError> {
        (**self).send(request)
    }
}

/// Blocking `reqwest` transport used in production.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "http")]
impl ReqwestTransport {
    /// Build a client with the configured timeout and user agent.
    pub fn new(config: &crate::core::CheckerConfig) -> Result<Self, LookupError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| LookupError::Transport(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "http")]
impl Transport for ReqwestTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpReply, LookupError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let resp = builder.send().map_err(|e| {
            if e.is_timeout() {
                LookupError::Transport(format!("request to {} timed out", request.url))
            } else {
                LookupError::Transport(e.to_string())
            }
        })?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .map_err(|e| LookupError::Transport(e.to_string()))?;
        tracing::debug!(url = %request.url, status, "registry replied");
        Ok(HttpReply { status, body })
    }
}

/// Transport answering from canned replies, for tests and offline use.
///
/// Each route is a URL substring; the first route contained in the request
/// URL answers. Requests matching no route fail like an unreachable host.
/// Every request is recorded, so callers can assert how many were made.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    routes: Vec<(String, Result<HttpReply, LookupError>)>,
    sent: Mutex<Vec<HttpRequest>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests whose URL contains `url_part` with `reply`.
    pub fn route(mut self, url_part: impl Into<String>, reply: HttpReply) -> Self {
        self.routes.push((url_part.into(), Ok(reply)));
        self
    }

    /// Fail requests whose URL contains `url_part` with a transport error.
    pub fn fail(mut self, url_part: impl Into<String>, message: impl Into<String>) -> Self {
        self.routes
            .push((url_part.into(), Err(LookupError::Transport(message.into()))));
        self
    }

    /// Requests sent so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.sent.lock().map(|s| s.len()).unwrap_or_default()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpReply, LookupError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(request.clone());
        }
        self.routes
            .iter()
            .find(|(part, _)| request.url.contains(part.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| {
                Err(LookupError::Transport(format!(
                    "no route to {}",
                    request.url
                )))
            })
    }
}
