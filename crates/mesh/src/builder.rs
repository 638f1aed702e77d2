//! Indexed mesh assembly from finalized parser segments.

use std::collections::HashMap;

use objstream::{MeshSink, RawObjectDescriptor};

use crate::data::{MeshData, MeshVertex};

/// Renderer-ready mesh along with the identity of the descriptor it was
/// built from.
#[derive(Clone, Debug)]
pub struct BuiltMesh {
    pub name: String,
    pub group_name: String,
    pub material_name: String,
    pub smoothing_group: u32,
    pub segment_index: usize,
    pub data: MeshData,
}

/// Sink that folds each descriptor's triangle soup into an indexed mesh by
/// deduplicating identical corners.
#[derive(Debug, Default)]
pub struct IndexedMeshBuilder {
    meshes: Vec<BuiltMesh>,
}

impl IndexedMeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn meshes(&self) -> &[BuiltMesh] {
        &self.meshes
    }

    pub fn into_meshes(self) -> Vec<BuiltMesh> {
        self.meshes
    }
}

impl MeshSink for IndexedMeshBuilder {
    fn receive(
        &mut self,
        descriptors: Vec<RawObjectDescriptor>,
        segment_index: usize,
        vertex_floats: usize,
        normal_floats: usize,
        uv_floats: usize,
    ) {
        log::debug!(
            "building segment {}: {} descriptors, {} vertex / {} normal / {} uv floats",
            segment_index,
            descriptors.len(),
            vertex_floats,
            normal_floats,
            uv_floats,
        );
        for descriptor in descriptors {
            let data = index_descriptor(&descriptor);
            self.meshes.push(BuiltMesh {
                name: descriptor.object_name,
                group_name: descriptor.group_name,
                material_name: descriptor.material_name,
                smoothing_group: descriptor.smoothing_group,
                segment_index,
                data,
            });
        }
    }
}

/// Collapses repeated corners into shared vertices.
///
/// Corners compare by the bit patterns of their 8 floats, so `-0.0` and
/// `0.0` (or NaN payloads) never merge. Missing normals default to
/// `[0, 0, 1]` and missing uvs to `[0, 0]`, including short tails when only
/// part of a descriptor carried them.
fn index_descriptor(descriptor: &RawObjectDescriptor) -> MeshData {
    let corner_count = descriptor.vertices.len() / 3;
    let mut unique: HashMap<[u32; 8], u32> = HashMap::with_capacity(corner_count);
    let mut vertices: Vec<MeshVertex> = Vec::new();
    let mut indices: Vec<u32> = Vec::with_capacity(corner_count);

    for corner in 0..corner_count {
        let position = [
            descriptor.vertices[corner * 3],
            descriptor.vertices[corner * 3 + 1],
            descriptor.vertices[corner * 3 + 2],
        ];
        let normal = [
            component(&descriptor.normals, corner * 3, 0.0),
            component(&descriptor.normals, corner * 3 + 1, 0.0),
            component(&descriptor.normals, corner * 3 + 2, 1.0),
        ];
        let uv = [
            component(&descriptor.uvs, corner * 2, 0.0),
            component(&descriptor.uvs, corner * 2 + 1, 0.0),
        ];

        let key = [
            position[0].to_bits(),
            position[1].to_bits(),
            position[2].to_bits(),
            normal[0].to_bits(),
            normal[1].to_bits(),
            normal[2].to_bits(),
            uv[0].to_bits(),
            uv[1].to_bits(),
        ];
        let next = vertices.len() as u32;
        let index = *unique.entry(key).or_insert_with(|| {
            vertices.push(MeshVertex::new(position, normal, uv));
            next
        });
        indices.push(index);
    }

    MeshData::new(vertices, indices)
}

fn component(pool: &[f32], index: usize, default: f32) -> f32 {
    pool.get(index).copied().unwrap_or(default)
}
