//! Reply and word-cloud statistics for exported Telegram chats.

pub mod error;
pub mod message_parse;
pub mod normalizer;
pub mod parsing_types;
pub mod reshape;
pub mod stats;
pub mod stop_words;
pub mod utils;
pub mod word_cloud;

pub use error::MainError;
pub use stats::ChatStatistics;
