//! Chat-completion client for revlens.
//!
//! Everything above this crate talks to the model through [`CompletionService`]:
//! one role-tagged instruction plus one user prompt in, one text out. The
//! production implementation is [`OpenAiClient`].

pub mod client;
pub mod error;
pub mod service;

mod retry;

pub use client::{ClientOptions, OpenAiClient};
pub use error::LlmError;
pub use service::{CompletionRequest, CompletionService};
