//! The DOM: an arena-based tree of paragraph/run/hyperlink/image nodes
//! (§3), built from parser events by [`builder::DomBuilder`] (§4.6).

pub mod builder;
pub mod elements;

pub use builder::{DomBuilder, FieldAction, FieldDriver, RtfEventSink};
pub use elements::{AttrValue, Node, NodeId, NodeType, NodeValue, Tree};
