//! Outbound client used to reach relay targets.

use std::time::Duration;

use axum::body::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use url::Url;

use crate::config::UpstreamConfig;

/// Media type requested from GraphQL servers.
pub const GRAPHQL_RESPONSE_MEDIA_TYPE: &str = "application/graphql-response+json";

/// Thin wrapper around a configured `reqwest::Client`.
///
/// The client carries the connect/request deadlines and the fixed
/// User-Agent; every call is a single POST with no retries. Redirects are
/// never followed, so only the checked target is ever contacted.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig, user_agent: &str) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(user_agent.to_string())
            .redirect(reqwest::redirect::Policy::none());

        if !config.use_env_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// POST `body` to `target` unchanged.
    pub async fn post(&self, target: Url, body: Bytes) -> Result<reqwest::Response, reqwest::Error> {
        self.client
            .post(target)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, GRAPHQL_RESPONSE_MEDIA_TYPE)
            .body(body)
            .send()
            .await
    }
}

/// Upstream body read up to a byte cap.
#[derive(Debug)]
pub struct LimitedBody {
    pub bytes: Vec<u8>,
    /// The upstream sent more than the cap; `bytes` holds the first `limit`.
    pub truncated: bool,
}

/// Read at most `limit` bytes of `response`, chunk by chunk.
///
/// Stops pulling from the connection as soon as the cap is reached.
pub async fn read_limited(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<LimitedBody, reqwest::Error> {
    let mut bytes = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let room = limit - bytes.len();
        if chunk.len() > room {
            bytes.extend_from_slice(&chunk[..room]);
            return Ok(LimitedBody {
                bytes,
                truncated: true,
            });
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(LimitedBody {
        bytes,
        truncated: false,
    })
}
