//! ARK support daemon library - exposes modules for testing.

pub mod audit;
pub mod config;
pub mod faq;
pub mod kb;
pub mod lock;
pub mod matcher;
pub mod ollama;
pub mod prompts;
pub mod resilience;
pub mod server;
pub mod sources;
pub mod telegram;
pub mod triage;
pub mod unanswered;
