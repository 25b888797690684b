use crate::error::{InsightsError, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Counts case-insensitive, non-overlapping occurrences of `word` in the file at `path`.
pub fn count_occurrences(path: impl AsRef<Path>, word: &str) -> Result<usize> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| InsightsError::io(path, source))?;
    let count = count_in_text(&content, word);
    debug!(path = %path.display(), word, count, "counted word occurrences");
    Ok(count)
}

pub(crate) fn count_in_text(text: &str, word: &str) -> usize {
    if word.is_empty() {
        return 0;
    }
    text.to_lowercase().matches(&word.to_lowercase()).count()
}
