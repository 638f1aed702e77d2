//! Output boundary towards mesh assembly.

use crate::raw::RawObjectDescriptor;

/// Collaborator that turns finalized segments into meshes.
///
/// Called exactly once per finalized segment, in parse order, including
/// segments where pruning left no descriptor (the list is then empty).
/// `segment_index` starts at 1 and counts input objects; the float counts
/// aggregate the payload lengths of the surviving descriptors.
pub trait MeshSink {
    fn receive(
        &mut self,
        descriptors: Vec<RawObjectDescriptor>,
        segment_index: usize,
        vertex_floats: usize,
        normal_floats: usize,
        uv_floats: usize,
    );
}
