//! RTF (Rich Text Format) parser that builds a DOM of paragraphs, runs,
//! hyperlinks and images.
//!
//! # Architecture
//!
//! - **lexer**: byte-level tokenizer — `{`, `}`, control-word-or-symbol,
//!   character, EOF.
//! - **state**: the formatting state stack; computes the effective merged
//!   state at any brace depth.
//! - **color** / **stylesheet**: side tables consulted by `\cfN`/`\cbN`
//!   and `\sN`/`\dsN`/`\tsN`/`\csN`.
//! - **picture** / **field**: the `\pict` and `\field` destination models.
//! - **parser**: the state machine that drives all of the above and emits
//!   events.
//! - **dom**: the tree the parser's events build.
//! - **document**: the public facade.
//!
//! # Example
//!
//! ```rust,no_run
//! use rtfdom::rtf::RtfDocument;
//!
//! let rtf_text = r#"{\rtf1\ansi Hello World!\par}"#;
//! let doc = RtfDocument::parse(rtf_text)?;
//! # Ok::<(), rtfdom::rtf::RtfError>(())
//! ```

mod color;
mod document;
mod dom;
mod error;
mod field;
mod lexer;
mod parser;
mod picture;
mod state;
mod stylesheet;

pub use color::{ColorRecord, ColorTable, ColorValue};
pub use document::RtfDocument;
pub use dom::{AttrValue, DomBuilder, FieldAction, FieldDriver, Node, NodeId, NodeType, NodeValue, RtfEventSink, Tree};
pub use error::{RtfError, RtfResult};
pub use field::{split_fldinst, strip_quotes};
pub use lexer::{split_control_word, ControlWord, Lexer, Token};
pub use parser::{Clock, Parser, SystemClock};
pub use picture::{detect_image_type_by_signature, ImageSource, PictureAttributes};
pub use state::{Alignment, Frame, PublicState, StateStack};
pub use stylesheet::{Style, StyleProperties, StyleType, Stylesheet};
