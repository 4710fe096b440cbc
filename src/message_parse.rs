use crate::normalizer::Normalizer;
use crate::parsing_types::{MessageData, MessageId, Text, TextData};
use crate::stop_words::StopWords;
use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    static ref SENTENCE_END: regex::Regex =
        regex::Regex::new(r"([!.?⸮؟]+)[ \n]+|\n\s*\n").unwrap();
    static ref WORD_SEPARATED: regex::Regex =
        regex::Regex::new(r#"([؟!?]+|\d[\d.:/\\]+\d|[:.،؛»\]\)\}"«\[\(\{])"#).unwrap();
}

/// Concatenates the text carried by rich-text segments, in order.
pub fn flatten(segments: &[TextData]) -> String {
    let mut text = String::new();
    for segment in segments {
        match segment {
            TextData::String(s) => text.push_str(s),
            TextData::Typed { text: t, .. } => text.push_str(t),
            TextData::Other(_) => {}
        }
    }
    text
}

/// Flattened message texts, memoized by message id.
#[derive(Debug, Default)]
pub struct FlatTextCache {
    flattened: HashMap<MessageId, String>,
}

impl FlatTextCache {
    pub fn get<'a>(&'a mut self, msg: &'a MessageData) -> &'a str {
        match &msg.text {
            Text::Plain(text) => text.as_str(),
            Text::Rich(segments) => self
                .flattened
                .entry(msg.id)
                .or_insert_with(|| flatten(segments))
                .as_str(),
        }
    }

    pub fn len(&self) -> usize {
        self.flattened.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flattened.is_empty()
    }
}

pub fn sentence_tokenize(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for caps in SENTENCE_END.captures_iter(text) {
        let whole = match caps.get(0) {
            Some(m) => m,
            None => continue,
        };
        let end = caps.get(1).map_or(whole.start(), |punct| punct.end());
        push_trimmed(&mut sentences, &text[start..end]);
        start = whole.end();
    }
    push_trimmed(&mut sentences, &text[start..]);
    sentences
}

fn push_trimmed<'a>(sentences: &mut Vec<&'a str>, sentence: &'a str) {
    let sentence = sentence.trim();
    if !sentence.is_empty() {
        sentences.push(sentence);
    }
}

pub fn has_question(text: &str) -> bool {
    sentence_tokenize(text)
        .into_iter()
        .any(|sentence| sentence.contains(|c: char| c == '?' || c == '؟'))
}

pub fn word_tokenize(text: &str) -> Vec<String> {
    WORD_SEPARATED
        .replace_all(text, " ${1} ")
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

pub fn remove_stop_words(
    tokens: Vec<String>,
    stop_words: &StopWords,
    normalizer: &Normalizer,
) -> Vec<String> {
    tokens
        .into_iter()
        .filter(|token| !stop_words.contains(&normalizer.normalize(token)))
        .collect()
}
