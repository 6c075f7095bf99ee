/*!
 * Non-interactive stand-ins for modal dialogs.
 *
 * Headless runs never block on a prompt. Message boxes go to the log, and
 * choice and file prompts are answered from responses supplied on the command
 * line with `--dialog` and `--file`. Answers are consumed last-in first-out.
 * A prompt with no usable answer falls back to a safe default and is recorded
 * as a [`DialogFallback`].
 */

use log::{error, info, warn};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::errors::ArgumentError;

/// Icon requested for a message box; decides the log severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageIcon {
    #[default]
    Information,
    Warning,
    Error,
}

/// Result of a message box. Headless runs always acknowledge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogResult {
    Ok,
}

/// Why a prompt could not use a supplied answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// No answer was queued for the key
    NoAnswer,
    /// The queued answer matched no choice and is not a valid index
    InvalidAnswer(String),
    /// A file picker had no queued paths
    NoFile,
}

/// A prompt that was answered with a default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogFallback {
    /// Dialog key of a choice prompt; file pickers have none
    pub key: Option<String>,
    pub caption: String,
    pub reason: FallbackReason,
}

/// Choice answers keyed by dialog key, each key a stack
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogResponses {
    answers: HashMap<String, Vec<String>>,
}

impl DialogResponses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every `--dialog` value in command-line order.
    ///
    /// Each value is a JSON object mapping a key to an answer or a list of
    /// answers, e.g. `{"fmt": ["A", "B"]}`.
    pub fn parse(values: &[String]) -> Result<Self, ArgumentError> {
        let mut responses = Self::new();
        for raw in values {
            let invalid = |reason: &str| ArgumentError::InvalidDialogResponse {
                input: raw.clone(),
                reason: reason.to_string(),
            };
            let value: Value = serde_json::from_str(raw).map_err(|e| invalid(&e.to_string()))?;
            let object = value
                .as_object()
                .ok_or_else(|| invalid("expected a JSON object of key to answers"))?;
            for (key, answers) in object {
                match answers {
                    Value::String(answer) => responses.push(key, answer.clone()),
                    Value::Array(items) => {
                        for item in items {
                            let answer = item
                                .as_str()
                                .ok_or_else(|| invalid("answers must be strings"))?;
                            responses.push(key, answer.to_string());
                        }
                    }
                    _ => return Err(invalid("answers must be a string or a list of strings")),
                }
            }
        }
        Ok(responses)
    }

    pub fn push(&mut self, key: &str, answer: String) {
        self.answers.entry(key.to_string()).or_default().push(answer);
    }

    /// Take the most recently supplied answer for `key`
    pub fn pop(&mut self, key: &str) -> Option<String> {
        self.answers.get_mut(key).and_then(Vec::pop)
    }

    pub fn remaining(&self, key: &str) -> usize {
        self.answers.get(key).map_or(0, Vec::len)
    }
}

/// File picker answers, a single stack; each answer may name several files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileResponses {
    answers: Vec<Vec<PathBuf>>,
}

impl FileResponses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every `--file` value. A value is a path, or a JSON list of paths
    /// for pickers that accept several files. Relative paths are resolved
    /// against the current directory now, before any macro can change it.
    pub fn parse(values: &[String]) -> Result<Self, ArgumentError> {
        let mut responses = Self::new();
        for raw in values {
            let invalid = |reason: String| ArgumentError::InvalidFileResponse {
                input: raw.clone(),
                reason,
            };
            let paths: Vec<String> = if raw.trim_start().starts_with('[') {
                serde_json::from_str(raw).map_err(|e| invalid(e.to_string()))?
            } else {
                vec![raw.clone()]
            };
            if paths.iter().any(|p| p.is_empty()) {
                return Err(invalid("empty path".to_string()));
            }
            let absolute = paths
                .iter()
                .map(|p| std::path::absolute(p).map_err(|e| invalid(e.to_string())))
                .collect::<Result<Vec<_>, _>>()?;
            responses.push(absolute);
        }
        Ok(responses)
    }

    pub fn push(&mut self, paths: Vec<PathBuf>) {
        self.answers.push(paths);
    }

    pub fn pop(&mut self) -> Option<Vec<PathBuf>> {
        self.answers.pop()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

/// Answers prompts raised while a macro runs
#[derive(Debug, Default)]
pub struct DialogResponder {
    choices: DialogResponses,
    files: FileResponses,
    fallbacks: Vec<DialogFallback>,
}

impl DialogResponder {
    pub fn new(choices: DialogResponses, files: FileResponses) -> Self {
        Self {
            choices,
            files,
            fallbacks: Vec::new(),
        }
    }

    /// Log a message box and acknowledge it immediately
    pub fn message_box(&self, icon: MessageIcon, caption: &str, message: &str) -> DialogResult {
        match icon {
            MessageIcon::Error => error!("{}: {}", caption, message),
            MessageIcon::Warning => warn!("{}: {}", caption, message),
            MessageIcon::Information => info!("{}: {}", caption, message),
        }
        DialogResult::Ok
    }

    /// Answer a single-choice prompt, returning the chosen index.
    ///
    /// The answer is matched against the choice texts first, then read as an
    /// index. Anything else falls back to the first choice.
    pub fn choose(&mut self, key: &str, message: &str, caption: &str, choices: &[String]) -> usize {
        let first = choices.first().map(String::as_str).unwrap_or("");

        let Some(answer) = self.choices.pop(key) else {
            warn!(
                "No answer given for choice \"{}\". Using first choice \"{}\".",
                caption, first
            );
            self.record(Some(key), caption, FallbackReason::NoAnswer);
            return 0;
        };

        if let Some(index) = choices.iter().position(|c| *c == answer) {
            return index;
        }

        match answer.trim().parse::<usize>() {
            Ok(index) if index < choices.len() => index,
            _ => {
                warn!(
                    "Invalid answer \"{}\" given for choice \"{}\". Using first choice \"{}\".",
                    answer, caption, first
                );
                log::debug!("Prompt was: {}", message);
                self.record(Some(key), caption, FallbackReason::InvalidAnswer(answer));
                0
            }
        }
    }

    /// Answer a file picker. `None` means the picker was cancelled.
    pub fn pick_file(&mut self, caption: &str) -> Option<Vec<PathBuf>> {
        let answer = self.files.pop();
        if answer.is_none() {
            warn!("No file given for \"{}\". Treating the dialog as cancelled.", caption);
            self.record(None, caption, FallbackReason::NoFile);
        }
        answer
    }

    fn record(&mut self, key: Option<&str>, caption: &str, reason: FallbackReason) {
        self.fallbacks.push(DialogFallback {
            key: key.map(str::to_string),
            caption: caption.to_string(),
            reason,
        });
    }

    /// Prompts answered with a default so far
    pub fn fallbacks(&self) -> &[DialogFallback] {
        &self.fallbacks
    }

    pub fn into_fallbacks(self) -> Vec<DialogFallback> {
        self.fallbacks
    }
}
