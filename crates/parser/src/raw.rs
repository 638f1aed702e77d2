//! Segment state: vertex pools, sub-object descriptors and face
//! dereferencing.
//!
//! A [`RawObject`] covers one contiguous parse segment between object
//! boundaries. Face indices are absolute across the whole input; each
//! segment inherits cumulative offsets from its predecessors and resolves
//! indices against its own pools only.

use crate::directive::FaceFormat;
use crate::error::{ParseError, ParseResult};
use crate::report::SegmentReport;

/// Placeholder for object/group/material names never set by a directive.
pub(crate) const DEFAULT_NAME: &str = "none";

// Two triangles per quad, corners {0,1,2} and {2,3,0}, addressed as token
// positions for each record shape (single token, v/vt or v//vn pair,
// v/vt/vn triple).
const QUAD_CORNERS_SINGLE: [usize; 6] = [1, 2, 3, 3, 4, 1];
const QUAD_CORNERS_PAIR: [usize; 6] = [1, 3, 5, 5, 7, 1];
const QUAD_CORNERS_TRIPLE: [usize; 6] = [1, 4, 7, 7, 10, 1];

/// Accumulated triangle data for one (object, group, material,
/// smoothing group) combination.
///
/// Payloads are flat and append-only: vertices and normals in triples, uvs
/// in pairs, already dereferenced from the segment pools.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawObjectDescriptor {
    pub object_name: String,
    pub group_name: String,
    pub material_name: String,
    /// 0 means smoothing is off.
    pub smoothing_group: u32,
    pub vertices: Vec<f32>,
    pub uvs: Vec<f32>,
    pub normals: Vec<f32>,
}

impl RawObjectDescriptor {
    fn new(
        object_name: &str,
        group_name: &str,
        material_name: &str,
        smoothing_group: u32,
    ) -> Self {
        Self {
            object_name: object_name.to_owned(),
            group_name: group_name.to_owned(),
            material_name: material_name.to_owned(),
            smoothing_group,
            vertices: Vec::new(),
            uvs: Vec::new(),
            normals: Vec::new(),
        }
    }
}

/// Cumulative 1-based pool offsets: how many elements all prior segments
/// consumed, per pool.
#[derive(Clone, Copy, Debug)]
struct SegmentOffsets {
    vertex: usize,
    uv: usize,
    normal: usize,
}

impl Default for SegmentOffsets {
    fn default() -> Self {
        Self {
            vertex: 1,
            uv: 1,
            normal: 1,
        }
    }
}

/// One contiguous parse segment.
///
/// Owns the pools and the descriptor collection exclusively; exactly one
/// descriptor is "in use" at a time, tracked as a cached index that is
/// re-resolved whenever a key component changes.
#[derive(Debug)]
pub(crate) struct RawObject {
    offsets: SegmentOffsets,
    object_name: String,
    mtllib_name: String,
    vertices: Vec<f32>,
    uvs: Vec<f32>,
    normals: Vec<f32>,
    active_group_name: String,
    active_material_name: String,
    active_smoothing_group: u32,
    group_count: usize,
    material_count: usize,
    smoothing_group_count: usize,
    descriptors: Vec<RawObjectDescriptor>,
    in_use: Option<usize>,
}

/// Result of finalizing a segment: surviving descriptors, their aggregate
/// payload sizes and the diagnostic snapshot.
pub(crate) struct FinalizedSegment {
    pub(crate) descriptors: Vec<RawObjectDescriptor>,
    pub(crate) vertex_floats: usize,
    pub(crate) normal_floats: usize,
    pub(crate) uv_floats: usize,
    pub(crate) report: SegmentReport,
}

impl RawObject {
    pub(crate) fn new() -> Self {
        Self {
            offsets: SegmentOffsets::default(),
            object_name: DEFAULT_NAME.to_owned(),
            mtllib_name: String::new(),
            vertices: Vec::new(),
            uvs: Vec::new(),
            normals: Vec::new(),
            active_group_name: DEFAULT_NAME.to_owned(),
            active_material_name: DEFAULT_NAME.to_owned(),
            active_smoothing_group: 0,
            group_count: 0,
            material_count: 0,
            smoothing_group_count: 0,
            descriptors: Vec::new(),
            in_use: None,
        }
    }

    /// Builds the successor segment from an offsets snapshot.
    ///
    /// Only the cumulative offsets carry over, plus the active group name
    /// when the boundary was detected implicitly (vertex data after faces).
    /// Material and smoothing state always reset.
    pub(crate) fn next_segment(&self, inherit_group: bool) -> Self {
        let mut next = Self::new();
        next.offsets = SegmentOffsets {
            vertex: self.offsets.vertex + self.vertices.len() / 3,
            uv: self.offsets.uv + self.uvs.len() / 2,
            normal: self.offsets.normal + self.normals.len() / 3,
        };
        if inherit_group {
            next.active_group_name = self.active_group_name.clone();
        }
        next
    }

    pub(crate) fn has_vertices(&self) -> bool {
        !self.vertices.is_empty()
    }

    pub(crate) fn push_vertex(&mut self, tokens: &[String]) -> ParseResult<()> {
        for position in 1..=3 {
            let value = parse_float("v", tokens, position)?;
            self.vertices.push(value);
        }
        Ok(())
    }

    pub(crate) fn push_uv(&mut self, tokens: &[String]) -> ParseResult<()> {
        for position in 1..=2 {
            let value = parse_float("vt", tokens, position)?;
            self.uvs.push(value);
        }
        Ok(())
    }

    pub(crate) fn push_normal(&mut self, tokens: &[String]) -> ParseResult<()> {
        for position in 1..=3 {
            let value = parse_float("vn", tokens, position)?;
            self.normals.push(value);
        }
        Ok(())
    }

    /// Renames the segment. An already-active descriptor keeps the name it
    /// was created under; only descriptors created from here on see the new
    /// name.
    pub(crate) fn push_object(&mut self, tokens: &[String]) -> ParseResult<()> {
        self.object_name = require("o", tokens, 1)?.to_owned();
        Ok(())
    }

    /// Records the referenced material library name for external resolution.
    pub(crate) fn push_mtllib(&mut self, tokens: &[String]) -> ParseResult<()> {
        self.mtllib_name = require("mtllib", tokens, 1)?.to_owned();
        Ok(())
    }

    pub(crate) fn push_group(&mut self, tokens: &[String]) -> ParseResult<()> {
        let name = require("g", tokens, 1)?;
        if self.active_group_name == name {
            return Ok(());
        }
        self.active_group_name = name.to_owned();
        self.group_count += 1;
        self.refresh_in_use();
        Ok(())
    }

    pub(crate) fn push_usemtl(&mut self, tokens: &[String]) -> ParseResult<()> {
        let name = require("usemtl", tokens, 1)?;
        if self.active_material_name == name {
            return Ok(());
        }
        self.active_material_name = name.to_owned();
        self.material_count += 1;
        self.refresh_in_use();
        Ok(())
    }

    pub(crate) fn push_smoothing_group(&mut self, tokens: &[String]) -> ParseResult<()> {
        let token = require("s", tokens, 1)?;
        let normalized = if token == "off" {
            0
        } else {
            token.parse::<u32>().map_err(|_| ParseError::Number {
                directive: "s",
                token: token.to_owned(),
            })?
        };
        if self.active_smoothing_group == normalized {
            return Ok(());
        }
        self.active_smoothing_group = normalized;
        self.smoothing_group_count += 1;
        self.refresh_in_use();
        Ok(())
    }

    /// Dereferences one triangle record into the in-use descriptor.
    pub(crate) fn build_face(&mut self, format: FaceFormat, tokens: &[String]) -> ParseResult<()> {
        match format {
            FaceFormat::V => {
                for position in 1..=3 {
                    self.attach_vertex(tokens, position)?;
                }
            }
            FaceFormat::VVt => {
                for position in (1..7).step_by(2) {
                    self.attach_vertex(tokens, position)?;
                    self.attach_uv(tokens, position + 1)?;
                }
            }
            FaceFormat::VVn => {
                for position in (1..7).step_by(2) {
                    self.attach_vertex(tokens, position)?;
                    self.attach_normal(tokens, position + 1)?;
                }
            }
            FaceFormat::VVtVn => {
                for position in (1..10).step_by(3) {
                    self.attach_vertex(tokens, position)?;
                    self.attach_uv(tokens, position + 1)?;
                    self.attach_normal(tokens, position + 2)?;
                }
            }
        }
        Ok(())
    }

    /// Dereferences one quad record as two triangles.
    ///
    /// Corner order assumes a convex planar quad; extra corners beyond the
    /// fourth are ignored (n-gons are not supported).
    pub(crate) fn build_quad(&mut self, format: FaceFormat, tokens: &[String]) -> ParseResult<()> {
        match format {
            FaceFormat::V => {
                for &position in &QUAD_CORNERS_SINGLE {
                    self.attach_vertex(tokens, position)?;
                }
            }
            FaceFormat::VVt => {
                for &position in &QUAD_CORNERS_PAIR {
                    self.attach_vertex(tokens, position)?;
                    self.attach_uv(tokens, position + 1)?;
                }
            }
            FaceFormat::VVn => {
                for &position in &QUAD_CORNERS_PAIR {
                    self.attach_vertex(tokens, position)?;
                    self.attach_normal(tokens, position + 1)?;
                }
            }
            FaceFormat::VVtVn => {
                for &position in &QUAD_CORNERS_TRIPLE {
                    self.attach_vertex(tokens, position)?;
                    self.attach_uv(tokens, position + 1)?;
                    self.attach_normal(tokens, position + 2)?;
                }
            }
        }
        Ok(())
    }

    /// Appends line-primitive indices to the segment pools raw. Unlike
    /// faces, these are never dereferenced into a descriptor.
    pub(crate) fn build_line(&mut self, tokens: &[String], with_uvs: bool) -> ParseResult<()> {
        for position in 1..tokens.len() {
            let index = parse_index("l", tokens, position)?;
            self.vertices.push(index as f32);
            if with_uvs {
                self.uvs.push(index as f32);
            }
        }
        Ok(())
    }

    fn attach_vertex(&mut self, tokens: &[String], position: usize) -> ParseResult<()> {
        let index = parse_index("f", tokens, position)?;
        let local = (index - self.offsets.vertex as i64) * 3;
        let slot = self.in_use_slot();
        let values = pool_slice(&self.vertices, index, local, 3)?;
        self.descriptors[slot].vertices.extend_from_slice(values);
        Ok(())
    }

    fn attach_uv(&mut self, tokens: &[String], position: usize) -> ParseResult<()> {
        let index = parse_index("f", tokens, position)?;
        let local = (index - self.offsets.uv as i64) * 2;
        let slot = self.in_use_slot();
        let values = pool_slice(&self.uvs, index, local, 2)?;
        self.descriptors[slot].uvs.extend_from_slice(values);
        Ok(())
    }

    fn attach_normal(&mut self, tokens: &[String], position: usize) -> ParseResult<()> {
        let index = parse_index("f", tokens, position)?;
        let local = (index - self.offsets.normal as i64) * 3;
        let slot = self.in_use_slot();
        let values = pool_slice(&self.normals, index, local, 3)?;
        self.descriptors[slot].normals.extend_from_slice(values);
        Ok(())
    }

    /// Index of the in-use descriptor, resolving (and lazily creating) it on
    /// first demand after a key change.
    fn in_use_slot(&mut self) -> usize {
        if let Some(slot) = self.in_use {
            slot
        } else {
            let slot = self
                .find_descriptor()
                .unwrap_or_else(|| self.create_descriptor());
            self.in_use = Some(slot);
            slot
        }
    }

    fn refresh_in_use(&mut self) {
        self.in_use = None;
        self.in_use_slot();
    }

    /// All non-zero smoothing groups share one descriptor per
    /// (object, group, material); the descriptor records the first non-zero
    /// value it was created with.
    fn find_descriptor(&self) -> Option<usize> {
        self.descriptors.iter().position(|descriptor| {
            descriptor.object_name == self.object_name
                && descriptor.group_name == self.active_group_name
                && descriptor.material_name == self.active_material_name
                && (descriptor.smoothing_group != 0) == (self.active_smoothing_group != 0)
        })
    }

    fn create_descriptor(&mut self) -> usize {
        self.descriptors.push(RawObjectDescriptor::new(
            &self.object_name,
            &self.active_group_name,
            &self.active_material_name,
            self.active_smoothing_group,
        ));
        self.descriptors.len() - 1
    }

    /// Prunes empty descriptors, applies the object-name fallback and
    /// aggregates payload counts.
    pub(crate) fn finalize(self, segment_index: usize) -> FinalizedSegment {
        let Self {
            object_name,
            mtllib_name,
            vertices,
            uvs,
            normals,
            group_count,
            material_count,
            smoothing_group_count,
            descriptors,
            ..
        } = self;

        let mut surviving = Vec::with_capacity(descriptors.len());
        let mut vertex_floats = 0;
        let mut normal_floats = 0;
        let mut uv_floats = 0;
        for mut descriptor in descriptors {
            if descriptor.vertices.is_empty() {
                continue;
            }
            if descriptor.object_name == DEFAULT_NAME {
                descriptor.object_name = descriptor.group_name.clone();
            }
            vertex_floats += descriptor.vertices.len();
            uv_floats += descriptor.uvs.len();
            normal_floats += descriptor.normals.len();
            surviving.push(descriptor);
        }

        let report = SegmentReport {
            segment_index,
            object_name,
            mtllib_name,
            vertex_count: vertices.len() / 3,
            normal_count: normals.len() / 3,
            uv_count: uvs.len() / 2,
            group_count,
            smoothing_group_count,
            material_count,
            descriptor_count: surviving.len(),
        };

        FinalizedSegment {
            descriptors: surviving,
            vertex_floats,
            normal_floats,
            uv_floats,
            report,
        }
    }
}

fn require<'a>(
    directive: &'static str,
    tokens: &'a [String],
    position: usize,
) -> ParseResult<&'a str> {
    tokens
        .get(position)
        .map(String::as_str)
        .ok_or(ParseError::MissingArgument { directive })
}

fn parse_float(directive: &'static str, tokens: &[String], position: usize) -> ParseResult<f32> {
    let token = require(directive, tokens, position)?;
    token.parse::<f32>().map_err(|_| ParseError::Number {
        directive,
        token: token.to_owned(),
    })
}

fn parse_index(directive: &'static str, tokens: &[String], position: usize) -> ParseResult<i64> {
    let token = require(directive, tokens, position)?;
    token.parse::<i64>().map_err(|_| ParseError::Number {
        directive,
        token: token.to_owned(),
    })
}

/// Bounds-checked window into a pool; rejects dereferences that fall before
/// the segment start or past the pool end.
fn pool_slice(pool: &[f32], index: i64, local: i64, width: usize) -> ParseResult<&[f32]> {
    if local < 0 || local as usize + width > pool.len() {
        return Err(ParseError::Index {
            index,
            local,
            pool_len: pool.len(),
        });
    }
    let start = local as usize;
    Ok(&pool[start..start + width])
}
