//! Mesh assembly for parsed OBJ sub-objects: CPU-side mesh types plus an
//! indexed builder that plugs into the parser's output boundary.

pub mod builder;
pub mod data;

pub use builder::{BuiltMesh, IndexedMeshBuilder};
pub use data::{MeshData, MeshVertex};
