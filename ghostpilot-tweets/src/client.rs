//! Thin wrapper mapping the tweets API routes onto the stateless dispatcher.
//!
//! Every call is a single dispatch; nothing is retried and no connection is
//! kept between calls.
use bytes::Bytes;
use ghostpilot_http::{DispatchDefaults, DispatchError, DispatchResponse, Dispatcher};
use thiserror::Error;

use crate::types::{EmojiResults, TweetRecord};

#[derive(Debug, Error)]
pub enum TweetsError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error("encode tweet: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("decode emoji results: {message}, body_snippet: {body_snippet}")]
    Decode {
        message: String,
        body_snippet: String,
    },
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Route paths relative to the server base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routes {
    pub create: String,
    pub emojis: String,
    pub health: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            create: "/tweets/create".into(),
            emojis: "/tweets/emojis".into(),
            health: "/_healthcheck".into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct TweetsApi {
    dispatcher: Dispatcher,
    health_endpoint: String,
}

impl TweetsApi {
    /// Client for a server at `base_url` using the stock routes and `"Test"` GET body.
    ///
    /// ```
    /// use ghostpilot_tweets::TweetsApi;
    ///
    /// let api = TweetsApi::new("http://0.0.0.0:8080/");
    /// assert_eq!(api.dispatcher().defaults().post_endpoint, "http://0.0.0.0:8080/tweets/create");
    /// assert_eq!(api.health_endpoint(), "http://0.0.0.0:8080/_healthcheck");
    /// ```
    pub fn new(base_url: &str) -> Self {
        Self::with_routes(base_url, &Routes::default(), None)
    }

    /// Client with custom routes; `get_body` replaces the `"Test"` GET placeholder when set.
    /// The POST default body is left alone.
    pub fn with_routes(base_url: &str, routes: &Routes, get_body: Option<Bytes>) -> Self {
        let mut defaults = DispatchDefaults {
            get_endpoint: join_endpoint(base_url, &routes.emojis),
            post_endpoint: join_endpoint(base_url, &routes.create),
            ..DispatchDefaults::default()
        };
        if let Some(body) = get_body {
            defaults.get_payload = body;
        }
        Self {
            dispatcher: Dispatcher::new(defaults),
            health_endpoint: join_endpoint(base_url, &routes.health),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn health_endpoint(&self) -> &str {
        &self.health_endpoint
    }

    /// POST the tweet as JSON to the create route.
    pub async fn create_tweet(&self, tweet: &TweetRecord) -> Result<DispatchResponse, TweetsError> {
        let body = tweet.to_json_bytes().map_err(TweetsError::Encode)?;
        tracing::info!(id = %tweet.id, username = %tweet.username, bytes = body.len(), "tweets.create");
        Ok(self.dispatcher.post(None, Some(body)).await?)
    }

    /// GET the emoji route with the placeholder body, returning the raw response.
    pub async fn emojis(&self) -> Result<DispatchResponse, TweetsError> {
        tracing::info!("tweets.emojis");
        Ok(self.dispatcher.get(None, None).await?)
    }

    /// GET the emoji route and decode the tally.
    pub async fn emoji_results(&self) -> Result<EmojiResults, TweetsError> {
        let resp = self.emojis().await?;
        decode_emoji_results(&resp)
    }

    /// GET the health route. The server answers 200 with an empty body.
    pub async fn health(&self) -> Result<DispatchResponse, TweetsError> {
        let resp = self
            .dispatcher
            .get(Some(&self.health_endpoint), Some(Bytes::new()))
            .await?;
        tracing::debug!(status = %resp.status(), "tweets.health");
        Ok(resp)
    }
}

fn decode_emoji_results(resp: &DispatchResponse) -> Result<EmojiResults, TweetsError> {
    if !resp.status().is_success() {
        return Err(TweetsError::Status {
            status: resp.status().as_u16(),
            body: resp.text().trim_end().to_string(),
        });
    }
    serde_json::from_slice(resp.body()).map_err(|e| {
        let body_snippet: String = resp.text().chars().take(200).collect();
        tracing::warn!(error = %e, %body_snippet, "tweets.emojis.decode_error");
        TweetsError::Decode {
            message: e.to_string(),
            body_snippet,
        }
    })
}

fn join_endpoint(base_url: &str, route: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        route.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_endpoint_normalises_slashes() {
        assert_eq!(
            join_endpoint("http://localhost:8080/", "/tweets/create"),
            "http://localhost:8080/tweets/create"
        );
        assert_eq!(
            join_endpoint("http://localhost:8080", "tweets/emojis"),
            "http://localhost:8080/tweets/emojis"
        );
    }

    #[test]
    fn get_body_override_only_touches_the_get_default() {
        let api = TweetsApi::with_routes(
            "http://localhost:8080",
            &Routes::default(),
            Some(Bytes::from("ping")),
        );
        let req = api.dispatcher().build_get(None, None).unwrap();
        assert_eq!(req.body().and_then(|b| b.as_bytes()), Some(&b"ping"[..]));
        assert_eq!(req.url().path(), "/tweets/emojis");

        let post = api.dispatcher().build_post(None, None).unwrap();
        assert_eq!(post.body().and_then(|b| b.as_bytes()), Some(&b"Test"[..]));
    }
}
