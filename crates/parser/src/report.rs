//! Per-segment diagnostics, delivered through an injected reporter.

/// Snapshot of one parse segment, taken as it is finalized.
///
/// Observational only: the counts describe the segment's pools (including
/// raw line-primitive indices) and counters, not the surviving descriptor
/// payloads the sink receives. The mtllib name travels here so a caller can
/// resolve the companion material library; this parser does not.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SegmentReport {
    pub segment_index: usize,
    pub object_name: String,
    pub mtllib_name: String,
    pub vertex_count: usize,
    pub normal_count: usize,
    pub uv_count: usize,
    pub group_count: usize,
    pub smoothing_group_count: usize,
    pub material_count: usize,
    pub descriptor_count: usize,
}

/// Observer invoked by the finalizer, once per segment.
pub trait ParseReporter {
    fn segment_finalized(&mut self, report: &SegmentReport);
}

/// Reporter that forwards each segment summary to the `log` facade.
#[derive(Debug, Default)]
pub struct LogReporter;

impl ParseReporter for LogReporter {
    fn segment_finalized(&mut self, report: &SegmentReport) {
        log::debug!(
            "segment {}: object '{}' (mtllib '{}'), {} vertices, {} normals, {} uvs, \
             {} groups, {} smoothing groups, {} materials, {} descriptors",
            report.segment_index,
            report.object_name,
            report.mtllib_name,
            report.vertex_count,
            report.normal_count,
            report.uv_count,
            report.group_count,
            report.smoothing_group_count,
            report.material_count,
            report.descriptor_count,
        );
    }
}
