//! Gemma code generator - turn a one-line description into code.
//!
//! The crate reads a natural-language description, wraps it into a prompt
//! asking for code only, sends it to the Gemini API and prints the answer
//! while it streams in.
//!
//! # Architecture
//!
//! - [`config`] - Configuration (model, temperature, language, endpoint) and credential lookup
//! - [`input`] - Interactive description prompt
//! - [`prompt`] - Prompt template
//! - [`http_client`] - HTTP client abstraction with streamed response bodies
//! - [`sse`] - Server-sent-events decoding
//! - [`llm_generator`] - Streaming generation client and mock generator
//! - [`session`] - The straight-line run: input, prompt, generation, report
//!
//! # Example
//!
//! ```ignore
//! use gemma_codegen::{config::Config, session::CodeSession};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<std::process::ExitCode> {
//!     let session = CodeSession::new(Config::load()?);
//!     let outcome = session
//!         .run(Some("a function to check if a number is prime".to_string()))
//!         .await?;
//!     Ok(outcome.exit_code())
//! }
//! ```
//!
//! # Credentials
//!
//! The API key is read from `GEMINI_API_KEY` when the request is about to be
//! made. Without it the run stops with exit status 1 before any network
//! traffic:
//!
//! ```bash
//! export GEMINI_API_KEY=your-key
//! gemgen --language Rust
//! ```

pub mod config;
pub mod http_client;
pub mod input;
pub mod llm_generator;
pub mod prompt;
pub mod session;
pub mod sse;
