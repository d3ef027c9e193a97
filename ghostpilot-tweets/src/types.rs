use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single tweet as the create endpoint expects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweetRecord {
    /// Numeric tweet id, carried as a string.
    pub id: String,
    pub username: String,
    pub tweet_content: String,
    #[serde(default)]
    pub metadata: TweetMetadata,
}

/// Loosely typed tweet metadata; any field may be null, empty or absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TweetMetadata {
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub media: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub hashtags: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub created_date: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub retweet_data: Value,
}

impl TweetRecord {
    /// The tweet the manual run posts when no payload file is configured.
    pub fn sample() -> Self {
        Self {
            id: "1320825299236325122".into(),
            username: "bvtujo".into(),
            tweet_content: "So fun to hang out with Adam and @brentContained \u{1F9C3} talking \
                about the new Scheduled Jobs feature in #awscopilot \
                \u{1F47B}\u{2620}\u{FE0F}\u{1F916}\u{1F920}\u{1F383} https://t.co/MPmXuDg3Xn"
                .into(),
            metadata: TweetMetadata {
                media: Value::String("None".into()),
                hashtags: Value::String("[Hashtag(Text='awscopilot')]".into()),
                created_date: Value::String("Mon Oct 26 20:31:05 +0000 2020".into()),
                retweet_data: Value::String("None".into()),
            },
        }
    }

    /// UTF-8 JSON body for the create endpoint.
    pub fn to_json_bytes(&self) -> Result<Bytes, serde_json::Error> {
        serde_json::to_vec(self).map(Bytes::from)
    }
}

/// One emoji tally row. `emoji` is the decimal code point, e.g. `"129475"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiCount {
    pub emoji: String,
    pub count: i64,
}

impl EmojiCount {
    /// The emoji as a character, when `emoji` is a valid decimal code point.
    pub fn as_char(&self) -> Option<char> {
        self.emoji.trim().parse::<u32>().ok().and_then(char::from_u32)
    }
}

/// Body of `GET /tweets/emojis`. The server sends `null` before any tweet is stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiResults {
    #[serde(default)]
    pub emojis: Option<Vec<EmojiCount>>,
}

impl EmojiResults {
    pub fn counts(&self) -> &[EmojiCount] {
        self.emojis.as_deref().unwrap_or_default()
    }

    pub fn total(&self) -> i64 {
        self.counts().iter().map(|c| c.count).sum()
    }
}
