use serde::{Deserialize, Serialize};

pub type MessageId = i64;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChatExport {
    pub messages: Vec<MessageData>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageData {
    pub id: MessageId,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub text: Text,
    #[serde(default)]
    pub reply_to_message_id: Option<MessageId>,
}

/// Message body as exported: either a plain string or a list of rich-text
/// segments (links, mentions, formatting runs).
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum Text {
    Plain(String),
    Rich(Vec<TextData>),
}

impl Default for Text {
    fn default() -> Self {
        Text::Plain(String::new())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum TextData {
    String(String),
    Typed {
        #[serde(rename = "type", default)]
        text_type: Option<String>,
        text: String,
    },
    /// Segment without a usable `text`; contributes nothing when flattened.
    Other(serde_json::Value),
}
