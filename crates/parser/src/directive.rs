//! Line classification: directives and face-record formats.

/// Recognized first tokens of a logical line.
///
/// Resolved once per line; anything else falls into `Unknown` and the line
/// is dropped without effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Directive {
    Vertex,
    Uv,
    Normal,
    Face,
    Line,
    Group,
    SmoothingGroup,
    Object,
    UseMtl,
    MtlLib,
    Unknown,
}

impl Directive {
    pub fn classify(token: &str) -> Self {
        match token {
            "v" => Self::Vertex,
            "vt" => Self::Uv,
            "vn" => Self::Normal,
            "f" => Self::Face,
            "l" => Self::Line,
            "g" => Self::Group,
            "s" => Self::SmoothingGroup,
            "o" => Self::Object,
            "usemtl" => Self::UseMtl,
            "mtllib" => Self::MtlLib,
            _ => Self::Unknown,
        }
    }
}

/// Layout of one face-vertex reference within an `f` record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaceFormat {
    /// `f v v v`
    V,
    /// `f v/vt v/vt v/vt`
    VVt,
    /// `f v//vn v//vn v//vn`
    VVn,
    /// `f v/vt/vn v/vt/vn v/vt/vn`
    VVtVn,
}

/// Detects the face format from the argument count and the slash layout.
///
/// `buffer_len` excludes the directive token. Two adjacent slashes signal
/// the uv-less `v//vn` shape; otherwise the token/slash ratio decides.
/// Anything that matches none of the patterns degrades to vertex-only.
pub fn detect_face_format(buffer_len: usize, slashes: &[usize]) -> FaceFormat {
    if slashes.len() > 2 && slashes[1] - slashes[0] == 1 {
        FaceFormat::VVn
    } else if buffer_len == slashes.len() * 2 {
        FaceFormat::VVt
    } else if buffer_len * 2 == slashes.len() * 3 {
        FaceFormat::VVtVn
    } else {
        FaceFormat::V
    }
}
