//! rtfdom - A Rust library for parsing Rich Text Format (RTF) documents
//! into a structured DOM of paragraphs, runs, hyperlinks and images.
//!
//! # Example
//!
//! ```rust,no_run
//! use rtfdom::rtf::RtfDocument;
//!
//! # fn main() -> Result<(), rtfdom::rtf::RtfError> {
//! let doc = RtfDocument::parse(r#"{\rtf1\ansi Hello World!\par}"#)?;
//! println!("{}", doc.text());
//! # Ok(())
//! # }
//! ```

/// Utilities shared across the crate (codepage-aware text decoding).
pub mod common;

/// The RTF tokenizer, state machine parser, and DOM builder.
pub mod rtf;

pub use rtf::RtfDocument;
