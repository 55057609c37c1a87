use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

pub const HISTORY_LIMIT: usize = 20;

/// Most recent results first, capped at [`HISTORY_LIMIT`] display strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: VecDeque<String>,
}

impl History {
    pub fn new() -> Self {
        History::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = String>) -> Self {
        History {
            entries: entries.into_iter().take(HISTORY_LIMIT).collect(),
        }
    }

    pub fn push(&mut self, entry: String) {
        self.entries.push_front(entry);
        self.entries.truncate(HISTORY_LIMIT);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_first_and_bounded() {
        let mut history = History::new();
        for i in 0..25 {
            history.push(format!("{i} = {i}"));
        }
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history.get(0), Some("24 = 24"));
        assert_eq!(history.iter().last(), Some("5 = 5"));
    }

    #[test]
    fn serializes_as_plain_list() {
        let history = History::from_entries(vec!["1+1 = 2".to_string()]);
        assert_eq!(serde_json::to_string(&history).unwrap(), r#"["1+1 = 2"]"#);
    }
}
