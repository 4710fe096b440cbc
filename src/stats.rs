use crate::error::MainError;
use crate::message_parse::{has_question, remove_stop_words, word_tokenize, FlatTextCache};
use crate::normalizer::Normalizer;
use crate::parsing_types::{ChatExport, MessageData, MessageId, Text};
use crate::reshape::{get_display, reshape};
use crate::stop_words::StopWords;
use crate::utils::read_json;
use crate::word_cloud::{FontMetrics, WordCloud, WordCloudConfig};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

pub const WORD_CLOUD_FILE: &str = "wordcloud.png";

/// Statistics over one exported chat, loaded once and kept in memory.
pub struct ChatStatistics {
    chat: ChatExport,
    normalizer: Normalizer,
    stop_words: StopWords,
    flat_texts: FlatTextCache,
    include_rich_text: bool,
}

impl ChatStatistics {
    pub fn new(
        chat_json: &Path,
        normalizer: Normalizer,
        stop_words: StopWords,
    ) -> Result<Self, MainError> {
        log::info!("Loading chat data from {}", chat_json.display());
        let chat: ChatExport = read_json(chat_json)?;
        log::debug!("{} messages loaded", chat.messages.len());
        Ok(Self::from_export(chat, normalizer, stop_words))
    }

    pub fn from_export(chat: ChatExport, normalizer: Normalizer, stop_words: StopWords) -> Self {
        Self {
            chat,
            normalizer,
            stop_words,
            flat_texts: FlatTextCache::default(),
            include_rich_text: false,
        }
    }

    /// Also flatten rich-text messages for the word cloud; by default only
    /// plain-text messages contribute to it.
    pub fn with_rich_text(mut self, include: bool) -> Self {
        self.include_rich_text = include;
        self
    }

    pub fn messages(&self) -> &[MessageData] {
        &self.chat.messages
    }

    pub fn msg_has_question(&mut self, msg: &MessageData) -> bool {
        has_question(self.flat_texts.get(msg))
    }

    fn question_map(&mut self) -> HashMap<MessageId, bool> {
        let mut is_question = HashMap::new();
        for msg in &self.chat.messages {
            if has_question(self.flat_texts.get(msg)) {
                is_question.insert(msg.id, true);
            }
        }
        is_question
    }

    /// Users who most often reply to messages containing a question, most
    /// frequent first. Ties keep the order in which repliers first appear.
    /// Replies without a sender (`"from": null`, e.g. deleted accounts) are
    /// not counted.
    pub fn top_users(&mut self, top_n: usize) -> IndexMap<String, usize> {
        let is_question = self.question_map();

        log::info!("Generating top users statistics...");
        let mut votes: IndexMap<&str, usize> = IndexMap::new();
        for msg in &self.chat.messages {
            let target = match msg.reply_to_message_id {
                Some(id) if id != 0 => id,
                _ => continue,
            };
            if !is_question.get(&target).copied().unwrap_or(false) {
                continue;
            }
            match &msg.from {
                Some(from) => *votes.entry(from.as_str()).or_insert(0) += 1,
                None => log::debug!("reply {} has no sender, skipped", msg.id),
            }
        }

        let mut votes: Vec<(&str, usize)> = votes.into_iter().collect();
        votes.sort_by(|a, b| b.1.cmp(&a.1));
        votes
            .into_iter()
            .take(top_n)
            .map(|(from, count)| (from.to_owned(), count))
            .collect()
    }

    /// Stop-word-free, normalized, reshaped text in visual order.
    pub fn word_cloud_text(&mut self) -> String {
        log::info!("Generating text from chat data...");
        let mut text_content = String::new();
        for msg in &self.chat.messages {
            let text = match &msg.text {
                Text::Plain(text) => text.as_str(),
                Text::Rich(_) if self.include_rich_text => self.flat_texts.get(msg),
                Text::Rich(_) => continue,
            };
            let tokens = remove_stop_words(word_tokenize(text), &self.stop_words, &self.normalizer);
            text_content.push_str(&tokens.join(" "));
        }

        let text_content = self.normalizer.normalize(&text_content);
        get_display(&reshape(&text_content))
    }

    /// Renders the word cloud to `output_dir/wordcloud.png`.
    pub fn generate_word_cloud(
        &mut self,
        output_dir: &Path,
        font_path: &Path,
        config: &WordCloudConfig,
    ) -> Result<PathBuf, MainError> {
        if !output_dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("output directory {} does not exist", output_dir.display()),
            )
            .into());
        }
        let font = FontMetrics::load(font_path)?;
        let text = self.word_cloud_text();

        log::info!("Generating word cloud...");
        let layout = WordCloud::new(config.clone()).generate(&text, &font);

        let path = output_dir.join(WORD_CLOUD_FILE);
        log::info!("Saving word cloud to {}", output_dir.display());
        layout.to_file(&path, &font)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn stats(json: &str) -> ChatStatistics {
        stats_with_stop_words(json, &[])
    }

    fn stats_with_stop_words(json: &str, stop_words: &[&str]) -> ChatStatistics {
        let normalizer = Normalizer::default();
        let stop_words = StopWords::from_words(stop_words.iter().copied(), &normalizer);
        ChatStatistics::from_export(serde_json::from_str(json).unwrap(), normalizer, stop_words)
    }

    fn top(stats: &mut ChatStatistics, n: usize) -> Vec<(String, usize)> {
        stats.top_users(n).into_iter().collect()
    }

    const REPLIES: &str = r#"{"messages": [
        {"id": 1, "text": "Why?", "from": "Q"},
        {"id": 2, "text": "ok", "from": "A", "reply_to_message_id": 1},
        {"id": 3, "text": ["is it ", {"type": "bold", "text": "done"}, "?"], "from": "Q"},
        {"id": 4, "text": "yes", "from": "C", "reply_to_message_id": 3},
        {"id": 5, "text": "yes", "from": "A", "reply_to_message_id": 3},
        {"id": 6, "text": "sure", "from": "B", "reply_to_message_id": 1},
        {"id": 7, "text": "sure", "from": "C", "reply_to_message_id": 1},
        {"id": 8, "text": "again", "from": "A", "reply_to_message_id": 3},
        {"id": 9, "text": "again", "from": "C", "reply_to_message_id": 1},
        {"id": 10, "text": "statement.", "from": "Q"},
        {"id": 11, "text": "reply to statement", "from": "B", "reply_to_message_id": 10}
    ]}"#;

    #[test]
    fn end_to_end_scenario() {
        let mut stats = stats(
            r#"{"messages": [
                {"id": 1, "text": "Why?", "from": "X"},
                {"id": 2, "text": "Because.", "from": "Y", "reply_to_message_id": 1}
            ]}"#,
        );
        assert_eq!(top(&mut stats, 1), vec![("Y".to_owned(), 1)]);
    }

    #[test]
    fn top_users_stable_tie_break() {
        let mut stats = stats(REPLIES);
        assert_eq!(
            top(&mut stats, 2),
            vec![("A".to_owned(), 3), ("C".to_owned(), 3)]
        );
    }

    #[test]
    fn top_users_returns_all_without_padding() {
        let mut stats = stats(REPLIES);
        assert_eq!(
            top(&mut stats, 10),
            vec![
                ("A".to_owned(), 3),
                ("C".to_owned(), 3),
                ("B".to_owned(), 1)
            ]
        );
    }

    #[test]
    fn top_users_zero() {
        let mut stats = stats(REPLIES);
        assert!(stats.top_users(0).is_empty());
    }

    #[test]
    fn top_users_repeated_calls_agree() {
        let mut stats = stats(REPLIES);
        let first = stats.top_users(10);
        assert_eq!(stats.top_users(10), first);
    }

    #[test]
    fn reply_to_unknown_message_is_not_counted() {
        let mut stats = stats(
            r#"{"messages": [
                {"id": 1, "text": "Why?", "from": "X"},
                {"id": 2, "text": "lost", "from": "Y", "reply_to_message_id": 404},
                {"id": 3, "text": "zero", "from": "Z", "reply_to_message_id": 0},
                {"id": 4, "text": "anon", "reply_to_message_id": 1},
                {"id": 5, "text": "found", "from": "W", "reply_to_message_id": 1}
            ]}"#,
        );
        assert_eq!(top(&mut stats, 10), vec![("W".to_owned(), 1)]);
    }

    #[test]
    fn reply_from_deleted_account_is_not_counted() {
        let mut stats = stats(
            r#"{"messages": [
                {"id": 1, "text": "Why?", "from": "X"},
                {"id": 2, "text": "gone", "from": null, "from_id": "user7", "reply_to_message_id": 1},
                {"id": 3, "text": "gone too", "from": null, "reply_to_message_id": 1},
                {"id": 4, "text": "here", "from": "Y", "reply_to_message_id": 1}
            ]}"#,
        );
        assert_eq!(top(&mut stats, 10), vec![("Y".to_owned(), 1)]);
    }

    #[test]
    fn persian_question_mark() {
        let mut stats = stats(
            r#"{"messages": [
                {"id": 1, "text": "واقعا؟", "from": "X"},
                {"id": 2, "text": "آره", "from": "Y", "reply_to_message_id": 1}
            ]}"#,
        );
        assert_eq!(top(&mut stats, 10), vec![("Y".to_owned(), 1)]);
    }

    #[test]
    fn msg_has_question_test() {
        let mut stats = stats(REPLIES);
        let messages = stats.messages().to_vec();
        assert!(stats.msg_has_question(&messages[0]));
        assert!(stats.msg_has_question(&messages[2]));
        assert!(!stats.msg_has_question(&messages[9]));
    }

    #[test]
    fn word_cloud_text_removes_stop_words() {
        let mut stats = stats_with_stop_words(
            r#"{"messages": [
                {"id": 1, "text": "The rust book"},
                {"id": 2, "text": "THE crab"}
            ]}"#,
            &["the"],
        );
        // Token groups of consecutive messages are appended without a separator.
        assert_eq!(stats.word_cloud_text(), "rust bookcrab");
    }

    #[test]
    fn word_cloud_text_skips_rich_text_by_default() {
        let json = r#"{"messages": [
            {"id": 1, "text": "plain "},
            {"id": 2, "text": [" rich", {"type": "link", "text": "text"}]}
        ]}"#;

        let mut plain_only = stats(json);
        assert_eq!(plain_only.word_cloud_text(), "plain");

        let mut with_rich = stats(json).with_rich_text(true);
        assert_eq!(with_rich.word_cloud_text(), "plainrichtext");
    }

    #[test]
    fn word_cloud_text_is_reshaped_and_visual() {
        let mut stats = stats_with_stop_words(
            r#"{"messages": [{"id": 1, "text": "سلام از دنیا"}]}"#,
            &["از"],
        );
        let expected = get_display(&reshape(&Normalizer::default().normalize("سلام دنیا")));
        assert_eq!(stats.word_cloud_text(), expected);
    }

    #[test]
    fn new_loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"messages": [{{"id": 1, "text": "Why?", "from": "X"}},
                {{"id": 2, "text": "Because.", "from": "Y", "reply_to_message_id": 1}}]}}"#
        )
        .unwrap();

        let mut stats =
            ChatStatistics::new(file.path(), Normalizer::default(), StopWords::default()).unwrap();
        assert_eq!(stats.messages().len(), 2);
        assert_eq!(top(&mut stats, 10), vec![("Y".to_owned(), 1)]);
    }

    #[test]
    fn generate_word_cloud_missing_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut stats = stats(REPLIES);
        let res = stats.generate_word_cloud(
            &dir.path().join("missing"),
            &dir.path().join("font.ttf"),
            &WordCloudConfig::default(),
        );
        match res {
            Err(MainError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("expected io error, got {:?}", other.map(|_| ())),
        }
    }

    fn test_font() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("data/fonts/DejaVuSans.ttf")
    }

    #[test]
    fn generate_word_cloud_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let mut stats = stats(
            r#"{"messages": [
                {"id": 1, "text": "سلام دنیا سلام", "from": "X"},
                {"id": 2, "text": "rust crab rust rust", "from": "Y"}
            ]}"#,
        );
        let path = stats
            .generate_word_cloud(dir.path(), &test_font(), &WordCloudConfig::default())
            .unwrap();
        assert_eq!(path, dir.path().join(WORD_CLOUD_FILE));

        let png = resvg::tiny_skia::Pixmap::load_png(&path).unwrap();
        assert_eq!((png.width(), png.height()), (800, 600));
        let inked = png
            .pixels()
            .iter()
            .filter(|p| p.red() != 255 || p.green() != 255 || p.blue() != 255)
            .count();
        assert!(inked > 0, "word cloud is blank");
    }

    #[test]
    fn generate_word_cloud_missing_font() {
        let dir = tempfile::tempdir().unwrap();
        let mut stats = stats(REPLIES);
        let res = stats.generate_word_cloud(
            dir.path(),
            &dir.path().join("font.ttf"),
            &WordCloudConfig::default(),
        );
        assert!(matches!(res, Err(MainError::Io(_))));
        assert!(!dir.path().join(WORD_CLOUD_FILE).exists());
    }
}
