//! Source Store - the curated FAQ, the knowledge base, and the system prompt.
//!
//! Files are re-read on every lookup so corpus edits take effect on the next
//! message without a reload step. Missing or unreadable files degrade to
//! empty corpora, never to errors.

use crate::config::Config;
use crate::prompts;
use std::fs;
use std::path::{Path, PathBuf};

/// A question/answer pair treated as ground truth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

/// Read a file as trimmed UTF-8, or empty string if missing/unreadable.
pub fn read_text(path: &Path) -> String {
    fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Parse the `Q:`/`A:` block format.
///
/// A `Q:` line starts a new entry and flushes the previous one; `A:` lines
/// and bare continuation lines extend the current answer. A blank line inside
/// a started answer is kept as a paragraph break. Entries without any answer
/// lines are dropped.
pub fn parse_faq(text: &str) -> Vec<FaqEntry> {
    let mut entries = Vec::new();
    let mut question: Option<String> = None;
    let mut answer_lines: Vec<String> = Vec::new();

    let mut flush = |question: &mut Option<String>, answer_lines: &mut Vec<String>| {
        if let Some(q) = question.take() {
            if !answer_lines.is_empty() {
                entries.push(FaqEntry {
                    question: q,
                    answer: answer_lines.join("\n").trim().to_string(),
                });
            }
        }
        answer_lines.clear();
    };

    for raw in text.lines() {
        let line = raw.trim();
        let lower = line.to_lowercase();
        if lower.starts_with("q:") {
            flush(&mut question, &mut answer_lines);
            question = Some(line[2..].trim().to_string());
        } else if lower.starts_with("a:") {
            answer_lines.push(line[2..].trim().to_string());
        } else if question.is_some() {
            if line.is_empty() {
                if !answer_lines.is_empty() {
                    answer_lines.push(String::new());
                }
            } else {
                answer_lines.push(line.to_string());
            }
        }
    }
    flush(&mut question, &mut answer_lines);

    entries
}

/// Split plain text into paragraphs on blank-line delimiters.
pub fn parse_paragraphs(text: &str) -> Vec<String> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

/// Handle on the three source files.
pub struct SourceStore {
    faq_path: PathBuf,
    kb_path: PathBuf,
    prompt_path: PathBuf,
}

impl SourceStore {
    pub fn new(config: &Config) -> Self {
        Self {
            faq_path: config.faq_path(),
            kb_path: config.kb_path(),
            prompt_path: config.prompt_path(),
        }
    }

    /// FAQ entries in file order, freshly parsed.
    pub fn faq_entries(&self) -> Vec<FaqEntry> {
        parse_faq(&read_text(&self.faq_path))
    }

    /// KB paragraphs in file order, freshly parsed.
    pub fn kb_paragraphs(&self) -> Vec<String> {
        parse_paragraphs(&read_text(&self.kb_path))
    }

    /// System prompt file, or the built-in default when absent.
    pub fn system_prompt(&self) -> String {
        let text = read_text(&self.prompt_path);
        if text.is_empty() {
            prompts::DEFAULT_SYSTEM_PROMPT.to_string()
        } else {
            text
        }
    }
}
