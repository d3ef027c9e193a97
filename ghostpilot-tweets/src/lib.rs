//! Tweet records and the tweets API routes the manual client exercises.
//!
//! [`types`] holds the wire models (the tweet payload and the emoji tally the
//! server reports back). [`client`] maps the server's three routes onto the
//! stateless dispatcher from `ghostpilot-http`.
pub mod client;
pub mod types;

pub use client::{Routes, TweetsApi, TweetsError};
pub use types::{EmojiCount, EmojiResults, TweetMetadata, TweetRecord};
