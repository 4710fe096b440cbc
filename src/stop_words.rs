use crate::error::MainError;
use crate::normalizer::Normalizer;
use crate::utils::read_lines;
use std::collections::HashSet;
use std::path::Path;

/// Normalized stop word set. Tokens are normalized with the same
/// [`Normalizer`] before the membership test.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    pub fn load(path: &Path, normalizer: &Normalizer) -> Result<Self, MainError> {
        log::info!("Loading stop words from {}", path.display());
        let lines = read_lines(path)?;
        let stop_words = Self::from_words(lines.iter().map(String::as_str), normalizer);
        log::debug!("{} stop words loaded", stop_words.len());
        Ok(stop_words)
    }

    pub fn from_words<'a>(words: impl IntoIterator<Item = &'a str>, normalizer: &Normalizer) -> Self {
        Self {
            words: words
                .into_iter()
                .map(|w| normalizer.normalize(w.trim_end()))
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, normalized: &str) -> bool {
        self.words.contains(normalized)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
