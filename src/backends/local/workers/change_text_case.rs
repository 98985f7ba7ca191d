// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::transform_and_forward;
use crate::config::consts::DEFAULT_ADMISSION_TIMEOUT;
use crate::engine::Conveyor;
use crate::traits::{Done, Worker};

/// Target case for [`ChangeTextCaseWorker`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextCase {
    Upper,
    Lower,
    /// First letter of every word capitalized
    Proper,
    /// Like `Proper`, but short articles and prepositions stay lowercase
    Title,
}

const TITLE_SMALL_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

impl TextCase {
    pub fn apply(self, input: &str) -> String {
        match self {
            TextCase::Upper => input.to_uppercase(),
            TextCase::Lower => input.to_lowercase(),
            TextCase::Proper => input
                .split_whitespace()
                .map(capitalize)
                .collect::<Vec<_>>()
                .join(" "),
            TextCase::Title => input
                .split_whitespace()
                .enumerate()
                .map(|(i, word)| {
                    let lower = word.to_lowercase();
                    if i > 0 && TITLE_SMALL_WORDS.contains(&lower.as_str()) {
                        lower
                    } else {
                        capitalize(word)
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
    }
}

/// Change Text Case worker - converts each part to a case and forwards it
pub struct ChangeTextCaseWorker {
    case: TextCase,
    forward_timeout: Duration,
}

impl ChangeTextCaseWorker {
    pub fn new(case: TextCase) -> Self {
        Self {
            case,
            forward_timeout: DEFAULT_ADMISSION_TIMEOUT,
        }
    }

    pub fn upper() -> Self {
        Self::new(TextCase::Upper)
    }

    pub fn lower() -> Self {
        Self::new(TextCase::Lower)
    }

    pub fn proper() -> Self {
        Self::new(TextCase::Proper)
    }

    pub fn title() -> Self {
        Self::new(TextCase::Title)
    }

    pub fn with_forward_timeout(mut self, timeout: Duration) -> Self {
        self.forward_timeout = timeout;
        self
    }
}

#[async_trait]
impl Worker<String> for ChangeTextCaseWorker {
    async fn working(&self, part: String, done: Done, next: Option<Arc<Conveyor<String>>>) {
        let case = self.case;
        transform_and_forward(self.name(), part, done, next, self.forward_timeout, |text| {
            case.apply(text)
        })
        .await;
    }

    fn name(&self) -> &str {
        "change_text_case"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_conversions() {
        let cases = [
            (TextCase::Upper, "hello", "HELLO"),
            (TextCase::Lower, "HELLO", "hello"),
            (TextCase::Proper, "hello wORLD", "Hello World"),
            (TextCase::Title, "the lord of the rings", "The Lord of the Rings"),
            (TextCase::Proper, "", ""),
        ];

        for (case, input, expected) in cases {
            assert_eq!(case.apply(input), expected, "{case:?} of {input:?}");
        }
    }

    #[tokio::test]
    async fn test_terminal_stage_signals_done() {
        ChangeTextCaseWorker::upper()
            .working("hello".to_string(), Done::detached(), None)
            .await;
    }
}
