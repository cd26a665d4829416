//! reqwest-backed implementation of the [`Transport`] port.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use access::{
    AccessError, RequestId, Transport, Verb, WireRequest, WireResponse, HEADER_REQUEST_ID,
};

/// Transport tuning knobs.
///
/// These bound every call made through the transport; the bounded-wait
/// decorator in [`crate::with_deadline`] adds a per-call ceiling on top
/// where one is needed.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// TCP connection establishment timeout.
    pub connect_timeout: Duration,
    /// Whole-request timeout (connect + send + receive).
    pub request_timeout: Duration,
    /// `User-Agent` value sent with every request.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
            user_agent: concat!("switchboard/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Issues one blocking (awaited) HTTP round trip per [`invoke`] call.
///
/// The transport interprets nothing: status, headers, and body bytes come
/// back raw for the envelope decoder. Each request is stamped with a fresh
/// [`RequestId`] for correlation.
///
/// [`invoke`]: Transport::invoke
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds a transport from the given configuration.
    pub fn new(config: TransportConfig) -> Result<Self, AccessError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|err| AccessError::Transport {
                message: format!("client construction: {err}"),
            })?;
        Ok(Self { client })
    }

    fn method(verb: Verb) -> reqwest::Method {
        match verb {
            Verb::Get => reqwest::Method::GET,
            Verb::Post => reqwest::Method::POST,
            Verb::Put => reqwest::Method::PUT,
            Verb::Patch => reqwest::Method::PATCH,
            Verb::Delete => reqwest::Method::DELETE,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn invoke(&self, request: WireRequest) -> Result<WireResponse, AccessError> {
        let url = request.address.join(&request.path);
        let request_id = RequestId::new_random();

        let mut builder = self
            .client
            .request(Self::method(request.verb), url.as_str())
            .header(HEADER_REQUEST_ID, request_id.to_string());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(verb = request.verb.as_str(), url = %url, request_id = %request_id, "issuing request");
        let response = builder.send().await.map_err(|err| AccessError::Transport {
            message: err.to_string(),
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|err| AccessError::Transport {
                message: format!("reading response body: {err}"),
            })?
            .to_vec();

        debug!(status, bytes = body.len(), request_id = %request_id, "response received");
        Ok(WireResponse {
            status,
            headers,
            body,
        })
    }
}
