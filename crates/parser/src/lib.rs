//! Streaming Wavefront OBJ parser.
//!
//! One synchronous pass over a byte buffer or text string, segmented into
//! sub-meshes at object boundaries (explicit `o` lines, or vertex data
//! following faces). Each finalized segment hands its surviving
//! (object, group, material, smoothing group) descriptors to a [`MeshSink`];
//! only forward 1-based absolute indices are supported.

pub mod directive;
pub mod error;
pub mod parser;
pub mod raw;
pub mod report;
mod scanner;
pub mod sink;

pub use error::{ParseError, ParseResult};
pub use parser::Parser;
pub use raw::RawObjectDescriptor;
pub use report::{LogReporter, ParseReporter, SegmentReport};
pub use sink::MeshSink;
