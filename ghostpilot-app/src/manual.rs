//! The manual run: post one tweet, then read the emoji tally, printing both responses.
use bytes::Bytes;
use ghostpilot_common::{GhostpilotError, Result};
use ghostpilot_config::GhostpilotConfig;
use ghostpilot_tweets::{Routes, TweetRecord, TweetsApi};
use std::io::Write;
use std::path::Path;

/// The tweet to post: the JSON file when one is configured, the built-in sample otherwise.
pub fn load_tweet(file: Option<&Path>) -> Result<TweetRecord> {
    let Some(path) = file else {
        return Ok(TweetRecord::sample());
    };
    let raw = std::fs::read(path).map_err(|source| GhostpilotError::PayloadRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&raw).map_err(|e| GhostpilotError::PayloadParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

pub fn tweets_api(cfg: &GhostpilotConfig) -> Result<TweetsApi> {
    let base_url = cfg.target.base_url.trim();
    if base_url.is_empty() {
        return Err(GhostpilotError::Config("target.base_url is empty".into()));
    }
    let routes = Routes {
        create: cfg.target.create_path.clone(),
        emojis: cfg.target.emojis_path.clone(),
        health: cfg.target.health_path.clone(),
    };
    let get_body = Bytes::from(cfg.payload.get_body.clone());
    Ok(TweetsApi::with_routes(base_url, &routes, Some(get_body)))
}

/// POST then GET, sequentially, writing one line per response to `out`.
///
/// Request failures keep their [`TweetsError`](ghostpilot_tweets::TweetsError) type inside the `anyhow` chain.
pub async fn run<W: Write>(api: &TweetsApi, tweet: &TweetRecord, out: &mut W) -> anyhow::Result<()> {
    let written = api.create_tweet(tweet).await?;
    tracing::info!(status = %written.status(), id = %tweet.id, "manual.create.done");
    writeln!(out, "{written}")?;

    let read = api.emojis().await?;
    tracing::info!(status = %read.status(), body_len = read.body().len(), "manual.emojis.done");
    writeln!(out, "{read}")?;

    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghostpilot_tweets::TweetsError;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(base_url: &str) -> GhostpilotConfig {
        let mut cfg = GhostpilotConfig::default();
        cfg.target.base_url = base_url.to_string();
        cfg
    }

    #[tokio::test]
    async fn run_posts_then_gets_and_prints_both_responses() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tweets/create"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tweets/emojis"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "emojis": null })))
            .expect(1)
            .mount(&server)
            .await;

        let api = tweets_api(&config_for(&server.uri())).unwrap();
        let mut out = Vec::new();
        run(&api, &TweetRecord::sample(), &mut out).await.unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "<Response [200]>\n<Response [200]>\n");

        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].method.as_str(), "POST");
        assert_eq!(received[1].method.as_str(), "GET");
        assert_eq!(received[1].body, b"Test");
    }

    #[tokio::test]
    async fn failed_post_stops_before_the_get() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let api = tweets_api(&config_for(&format!("http://127.0.0.1:{port}"))).unwrap();
        let mut out = Vec::new();

        let err = run(&api, &TweetRecord::sample(), &mut out)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TweetsError>(),
            Some(TweetsError::Dispatch(_))
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn empty_base_url_is_a_config_error() {
        let err = tweets_api(&config_for("  ")).unwrap_err();
        assert!(matches!(err, GhostpilotError::Config(_)));
    }

    #[test]
    fn tweet_defaults_to_the_sample() {
        assert_eq!(load_tweet(None).unwrap(), TweetRecord::sample());
    }

    #[test]
    fn tweet_file_is_read_when_configured() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("tweet.json");
        std::fs::write(
            &file,
            r#"{"id":"1","username":"u","tweet_content":"hi","metadata":{}}"#,
        )
        .unwrap();

        let tweet = load_tweet(Some(file.as_path())).unwrap();
        assert_eq!(tweet.id, "1");
        assert_eq!(tweet.tweet_content, "hi");
    }

    #[test]
    fn unreadable_or_invalid_tweet_files_are_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.json");
        assert!(matches!(
            load_tweet(Some(missing.as_path())),
            Err(GhostpilotError::PayloadRead { .. })
        ));

        let broken = tmp.path().join("broken.json");
        std::fs::write(&broken, "{").unwrap();
        assert!(matches!(
            load_tweet(Some(broken.as_path())),
            Err(GhostpilotError::PayloadParse { .. })
        ));
    }
}
