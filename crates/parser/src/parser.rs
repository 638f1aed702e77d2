//! Line dispatch and object-boundary tracking over the scanner's output.

use crate::directive::{detect_face_format, Directive};
use crate::error::ParseResult;
use crate::raw::RawObject;
use crate::report::ParseReporter;
use crate::scanner;
use crate::sink::MeshSink;

/// Streaming OBJ parser.
///
/// Feed input with [`parse_bytes`](Self::parse_bytes) or
/// [`parse_text`](Self::parse_text), then call
/// [`finalize`](Self::finalize) exactly once to flush the last segment and
/// recover the sink. The sink is invoked synchronously whenever an object
/// boundary completes a segment; there are no suspension points and no
/// shared state, so parallel parses just use one `Parser` each.
pub struct Parser<S> {
    sink: S,
    reporter: Option<Box<dyn ParseReporter>>,
    raw: RawObject,
    segment_index: usize,
}

impl<S: MeshSink> Parser<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            reporter: None,
            raw: RawObject::new(),
            segment_index: 1,
        }
    }

    /// Like [`new`](Self::new), with an observer that receives a
    /// [`SegmentReport`](crate::report::SegmentReport) per finalized segment.
    pub fn with_reporter(sink: S, reporter: Box<dyn ParseReporter>) -> Self {
        Self {
            sink,
            reporter: Some(reporter),
            raw: RawObject::new(),
            segment_index: 1,
        }
    }

    /// Parses a byte buffer, one byte per character code.
    pub fn parse_bytes(&mut self, input: &[u8]) -> ParseResult<()> {
        let mut reached_faces = false;
        scanner::scan_bytes(input, |tokens, slashes| {
            self.process_line(tokens, slashes, &mut reached_faces)
        })
    }

    /// Parses a text string of the same grammar. For ASCII content the
    /// result is identical to [`parse_bytes`](Self::parse_bytes) on the
    /// encoded bytes.
    pub fn parse_text(&mut self, input: &str) -> ParseResult<()> {
        let mut reached_faces = false;
        scanner::scan_text(input, |tokens, slashes| {
            self.process_line(tokens, slashes, &mut reached_faces)
        })
    }

    /// Flushes the segment in progress as if an object boundary had been
    /// reached, then returns the sink.
    pub fn finalize(mut self) -> S {
        self.complete_object(false);
        self.sink
    }

    fn process_line(
        &mut self,
        tokens: &[String],
        slashes: &[usize],
        reached_faces: &mut bool,
    ) -> ParseResult<()> {
        let Some(first) = tokens.first() else {
            return Ok(());
        };
        let buffer_len = tokens.len() - 1;

        match Directive::classify(first) {
            Directive::Vertex => {
                // Vertex data after faces means the next object began
                // without an `o` line.
                if *reached_faces {
                    self.complete_object(true);
                    *reached_faces = false;
                }
                self.raw.push_vertex(tokens)?;
            }
            Directive::Uv => self.raw.push_uv(tokens)?,
            Directive::Normal => self.raw.push_normal(tokens)?,
            Directive::Face => {
                *reached_faces = true;
                let format = detect_face_format(buffer_len, slashes);
                if buffer_len % 4 == 0 {
                    self.raw.build_quad(format, tokens)?;
                } else {
                    self.raw.build_face(format, tokens)?;
                }
            }
            Directive::Line => {
                let with_uvs = buffer_len == slashes.len() * 2;
                self.raw.build_line(tokens, with_uvs)?;
            }
            Directive::Group => self.raw.push_group(tokens)?,
            Directive::SmoothingGroup => self.raw.push_smoothing_group(tokens)?,
            Directive::Object => {
                if self.raw.has_vertices() {
                    self.complete_object(false);
                    *reached_faces = false;
                }
                self.raw.push_object(tokens)?;
            }
            Directive::UseMtl => self.raw.push_usemtl(tokens)?,
            Directive::MtlLib => self.raw.push_mtllib(tokens)?,
            Directive::Unknown => {}
        }
        Ok(())
    }

    /// Finalizes the current segment and installs its successor.
    fn complete_object(&mut self, inherit_group: bool) {
        let next = self.raw.next_segment(inherit_group);
        let finished = std::mem::replace(&mut self.raw, next);
        let segment = finished.finalize(self.segment_index);

        self.sink.receive(
            segment.descriptors,
            self.segment_index,
            segment.vertex_floats,
            segment.normal_floats,
            segment.uv_floats,
        );
        if let Some(reporter) = self.reporter.as_mut() {
            reporter.segment_finalized(&segment.report);
        }
        self.segment_index += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::error::ParseError;
    use crate::raw::RawObjectDescriptor;
    use crate::report::SegmentReport;

    struct Segment {
        descriptors: Vec<RawObjectDescriptor>,
        index: usize,
        vertex_floats: usize,
        normal_floats: usize,
        uv_floats: usize,
    }

    #[derive(Default)]
    struct Collect {
        segments: Vec<Segment>,
    }

    impl MeshSink for Collect {
        fn receive(
            &mut self,
            descriptors: Vec<RawObjectDescriptor>,
            segment_index: usize,
            vertex_floats: usize,
            normal_floats: usize,
            uv_floats: usize,
        ) {
            self.segments.push(Segment {
                descriptors,
                index: segment_index,
                vertex_floats,
                normal_floats,
                uv_floats,
            });
        }
    }

    #[derive(Clone, Default)]
    struct Reports(Rc<RefCell<Vec<SegmentReport>>>);

    impl ParseReporter for Reports {
        fn segment_finalized(&mut self, report: &SegmentReport) {
            self.0.borrow_mut().push(report.clone());
        }
    }

    fn parse(input: &str) -> Collect {
        let mut parser = Parser::new(Collect::default());
        parser.parse_text(input).expect("parse");
        parser.finalize()
    }

    /// X coordinates of the vertex triples in a descriptor, for checking
    /// corner order with vertices placed at x = 0, 1, 2, ...
    fn corner_xs(descriptor: &RawObjectDescriptor) -> Vec<f32> {
        descriptor.vertices.iter().step_by(3).copied().collect()
    }

    #[test]
    fn plain_triangles_fill_a_single_descriptor() {
        let sink = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\nf 3 2 1\n");
        assert_eq!(sink.segments.len(), 1);
        let segment = &sink.segments[0];
        assert_eq!(segment.index, 1);
        assert_eq!(segment.descriptors.len(), 1);
        assert_eq!(segment.descriptors[0].vertices.len(), 18);
        assert!(segment.descriptors[0].uvs.is_empty());
        assert!(segment.descriptors[0].normals.is_empty());
        assert_eq!(segment.vertex_floats, 18);
    }

    #[test]
    fn quad_splits_into_two_triangles_for_every_format() {
        let pools = "v 0 0 0\nv 1 0 0\nv 2 0 0\nv 3 0 0\n\
                     vt 0 0\nvt 1 0\nvt 2 0\nvt 3 0\n\
                     vn 0 0 1\nvn 1 0 1\nvn 2 0 1\nvn 3 0 1\n";
        let faces = [
            "f 1 2 3 4\n",
            "f 1/1 2/2 3/3 4/4\n",
            "f 1//1 2//2 3//3 4//4\n",
            "f 1/1/1 2/2/2 3/3/3 4/4/4\n",
        ];
        for face in faces {
            let sink = parse(&format!("{pools}{face}"));
            let descriptor = &sink.segments[0].descriptors[0];
            assert_eq!(
                corner_xs(descriptor),
                vec![0.0, 1.0, 2.0, 2.0, 3.0, 0.0],
                "corner order for {face:?}"
            );
        }
    }

    #[test]
    fn quad_attaches_uvs_and_normals_in_corner_order() {
        let input = "v 0 0 0\nv 1 0 0\nv 2 0 0\nv 3 0 0\n\
                     vt 10 0\nvt 11 0\nvt 12 0\nvt 13 0\n\
                     vn 20 0 0\nvn 21 0 0\nvn 22 0 0\nvn 23 0 0\n\
                     f 1/1/1 2/2/2 3/3/3 4/4/4\n";
        let sink = parse(input);
        let descriptor = &sink.segments[0].descriptors[0];
        let uv_us: Vec<f32> = descriptor.uvs.iter().step_by(2).copied().collect();
        let normal_xs: Vec<f32> = descriptor.normals.iter().step_by(3).copied().collect();
        assert_eq!(uv_us, vec![10.0, 11.0, 12.0, 12.0, 13.0, 10.0]);
        assert_eq!(normal_xs, vec![20.0, 21.0, 22.0, 22.0, 23.0, 20.0]);
    }

    #[test]
    fn global_offsets_span_explicit_object_boundaries() {
        let input = "o first\nv 0 0 0\nv 1 0 0\nv 2 0 0\nf 1 2 3\n\
                     o second\nv 0 1 0\nv 1 1 0\nv 2 1 0\nf 4 5 6\n";
        let sink = parse(input);
        assert_eq!(sink.segments.len(), 2);
        assert_eq!(sink.segments[1].index, 2);

        let second = &sink.segments[1].descriptors[0];
        assert_eq!(second.object_name, "second");
        assert_eq!(
            second.vertices,
            vec![0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 2.0, 1.0, 0.0]
        );
    }

    #[test]
    fn vertex_after_faces_starts_a_new_segment_inheriting_group() {
        let input = "g wheels\nv 0 0 0\nv 1 0 0\nv 2 0 0\nf 1 2 3\n\
                     v 0 1 0\nv 1 1 0\nv 2 1 0\nf 4 5 6\n";
        let sink = parse(input);
        assert_eq!(sink.segments.len(), 2);

        let first = &sink.segments[0].descriptors[0];
        let second = &sink.segments[1].descriptors[0];
        assert_eq!(first.group_name, "wheels");
        assert_eq!(second.group_name, "wheels");
        // Placeholder object names fall back to the group name.
        assert_eq!(second.object_name, "wheels");
        assert_eq!(
            second.vertices,
            vec![0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 2.0, 1.0, 0.0]
        );
    }

    #[test]
    fn repeated_usemtl_reuses_the_descriptor() {
        let input = "v 0 0 0\nv 1 0 0\nv 2 0 0\n\
                     usemtl steel\nf 1 2 3\nusemtl steel\nf 3 2 1\n\
                     usemtl chrome\nf 1 3 2\n";
        let sink = parse(input);
        let descriptors = &sink.segments[0].descriptors;
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].material_name, "steel");
        assert_eq!(descriptors[0].vertices.len(), 18);
        assert_eq!(descriptors[1].material_name, "chrome");
        assert_eq!(descriptors[1].vertices.len(), 9);
        assert_eq!(descriptors[0].object_name, descriptors[1].object_name);
        assert_eq!(descriptors[0].group_name, descriptors[1].group_name);
    }

    #[test]
    fn nonzero_smoothing_groups_share_one_descriptor() {
        let input = "v 0 0 0\nv 1 0 0\nv 2 0 0\n\
                     s 2\nf 1 2 3\ns 4\nf 1 2 3\ns off\nf 1 2 3\n";
        let sink = parse(input);
        let descriptors = &sink.segments[0].descriptors;
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].smoothing_group, 2);
        assert_eq!(descriptors[0].vertices.len(), 18);
        assert_eq!(descriptors[1].smoothing_group, 0);
        assert_eq!(descriptors[1].vertices.len(), 9);
    }

    #[test]
    fn box_round_trip_finalizes_once() {
        let input = "o Box\nv 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let sink = parse(input);
        assert_eq!(sink.segments.len(), 1);
        let segment = &sink.segments[0];
        assert_eq!(segment.index, 1);
        assert_eq!(segment.descriptors.len(), 1);

        let descriptor = &segment.descriptors[0];
        assert_eq!(descriptor.object_name, "Box");
        assert_eq!(descriptor.vertices.len(), 18);
        assert!(descriptor.uvs.is_empty());
        assert!(descriptor.normals.is_empty());
    }

    #[test]
    fn group_only_segment_delivers_an_empty_list() {
        let sink = parse("g port\ng starboard\n");
        assert_eq!(sink.segments.len(), 1);
        assert!(sink.segments[0].descriptors.is_empty());
        assert_eq!(sink.segments[0].vertex_floats, 0);
    }

    #[test]
    fn byte_and_text_parses_agree() {
        let input = "mtllib scene.mtl\no lid\nv 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n\
                     vt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\n\
                     f 1/1 2/2 3/3 4/4\n\
                     v 0 0 1\nv 1 0 1\nv 1 1 1\nf 5 6 7\n";
        let mut byte_parser = Parser::new(Collect::default());
        byte_parser.parse_bytes(input.as_bytes()).expect("bytes");
        let from_bytes = byte_parser.finalize();
        let from_text = parse(input);

        assert_eq!(from_bytes.segments.len(), from_text.segments.len());
        for (a, b) in from_bytes.segments.iter().zip(&from_text.segments) {
            assert_eq!(a.index, b.index);
            assert_eq!(a.descriptors, b.descriptors);
            assert_eq!(a.vertex_floats, b.vertex_floats);
            assert_eq!(a.normal_floats, b.normal_floats);
            assert_eq!(a.uv_floats, b.uv_floats);
        }
    }

    #[test]
    fn final_line_without_terminator_is_parsed() {
        let sink = parse("v 0 0 0\nv 1 0 0\nv 2 0 0\nf 1 2 3");
        assert_eq!(sink.segments[0].descriptors.len(), 1);
        assert_eq!(sink.segments[0].descriptors[0].vertices.len(), 9);
    }

    #[test]
    fn unknown_directives_and_comments_are_ignored() {
        let sink = parse("# a comment\ncurv2 1 2 3\nv 0 0 0\nv 1 0 0\nv 2 0 0\nf 1 2 3\n");
        assert_eq!(sink.segments[0].descriptors.len(), 1);
        assert_eq!(sink.segments[0].vertex_floats, 9);
    }

    #[test]
    fn malformed_number_fails_the_parse() {
        let mut parser = Parser::new(Collect::default());
        let err = parser.parse_text("v 0 zero 0\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::Number { directive: "v", .. }
        ));
    }

    #[test]
    fn face_index_before_segment_start_fails() {
        let input = "o first\nv 0 0 0\nv 1 0 0\nv 2 0 0\nf 1 2 3\n\
                     o second\nv 0 1 0\nv 1 1 0\nv 2 1 0\nf 1 2 3\n";
        let mut parser = Parser::new(Collect::default());
        let err = parser.parse_text(input).unwrap_err();
        assert!(matches!(err, ParseError::Index { index: 1, .. }));
    }

    #[test]
    fn reporter_observes_segment_state() {
        let reports = Reports::default();
        let mut parser =
            Parser::with_reporter(Collect::default(), Box::new(reports.clone()));
        parser
            .parse_text(
                "mtllib scene.mtl\nv 0 0 0\nv 1 0 0\nv 2 0 0\nvt 0 0\nvn 0 0 1\n\
                 g deck\nf 1 2 3\n",
            )
            .expect("parse");
        parser.finalize();

        let reports = reports.0.borrow();
        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.segment_index, 1);
        assert_eq!(report.mtllib_name, "scene.mtl");
        assert_eq!(report.vertex_count, 3);
        assert_eq!(report.uv_count, 1);
        assert_eq!(report.normal_count, 1);
        assert_eq!(report.group_count, 1);
        assert_eq!(report.descriptor_count, 1);
    }

    #[test]
    fn line_primitives_grow_the_pool_without_descriptors() {
        let reports = Reports::default();
        let mut parser =
            Parser::with_reporter(Collect::default(), Box::new(reports.clone()));
        parser
            .parse_text("v 0 0 0\nl 1 2 3\n")
            .expect("parse");
        let sink = parser.finalize();

        // Three raw indices join the three vertex components in the pool.
        assert_eq!(reports.0.borrow()[0].vertex_count, 2);
        assert!(sink.segments[0].descriptors.is_empty());
    }
}
