//! Event variant selection shared by the encoder and decoder.

use wire::EventKind;

use crate::sink::ABSENT;

/// Number of components a vertex-like event carries on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Arity {
    One,
    Two,
    Three,
    Four,
}

impl Arity {
    pub(crate) const fn count(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
        }
    }
}

/// Omitted trailing components decode to these values.
pub(crate) const VERTEX_DEFAULTS: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
pub(crate) const NORMAL_DEFAULTS: [f32; 4] = [0.0, 0.0, 0.0, 0.0];
pub(crate) const TEXCOORD_DEFAULTS: [f32; 3] = [0.0, 0.0, 0.0];

/// Bitwise so that `-0.0` and NaN payloads never collapse into a default.
fn differs(value: f32, default: f32) -> bool {
    value.to_bits() != default.to_bits()
}

/// Narrowest arity that reproduces `values` given per-component defaults.
///
/// The first `min` components are always carried.
pub(crate) fn arity(values: &[f32], defaults: &[f32], min: usize) -> Arity {
    let carried = values
        .iter()
        .zip(defaults)
        .rposition(|(&v, &d)| differs(v, d))
        .map_or(min, |last| (last + 1).max(min));
    match carried {
        0 | 1 => Arity::One,
        2 => Arity::Two,
        3 => Arity::Three,
        _ => Arity::Four,
    }
}

pub(crate) const fn vertex_kind(arity: Arity) -> EventKind {
    match arity {
        Arity::One | Arity::Two => EventKind::Vertex2,
        Arity::Three => EventKind::Vertex3,
        Arity::Four => EventKind::Vertex4,
    }
}

pub(crate) const fn param_vertex_kind(arity: Arity) -> EventKind {
    match arity {
        Arity::One | Arity::Two => EventKind::ParamVertex2,
        Arity::Three => EventKind::ParamVertex3,
        Arity::Four => EventKind::ParamVertex4,
    }
}

pub(crate) const fn normal_kind(arity: Arity) -> EventKind {
    match arity {
        Arity::One | Arity::Two => EventKind::Normal2,
        Arity::Three => EventKind::Normal3,
        Arity::Four => EventKind::Normal4,
    }
}

pub(crate) const fn texcoord_kind(arity: Arity) -> EventKind {
    match arity {
        Arity::One => EventKind::TexCoord1,
        Arity::Two => EventKind::TexCoord2,
        Arity::Three | Arity::Four => EventKind::TexCoord3,
    }
}

/// How a face carries its normal indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NormalLayout {
    /// No normal block; every normal index is absent.
    Absent,
    /// One index shared by every vertex.
    Shared,
    /// One index per vertex.
    PerVertex,
}

impl NormalLayout {
    pub(crate) fn classify(normals: &[i32]) -> Self {
        match normals.split_first() {
            None => Self::Absent,
            Some((&first, rest)) if rest.iter().all(|&n| n == first) => {
                if first == ABSENT {
                    Self::Absent
                } else {
                    Self::Shared
                }
            }
            Some(_) => Self::PerVertex,
        }
    }
}

/// Index blocks present in a face event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FaceLayout {
    pub(crate) texcoords: bool,
    pub(crate) normals: NormalLayout,
}

impl FaceLayout {
    pub(crate) const fn new(texcoords: bool, normals: NormalLayout) -> Self {
        Self { texcoords, normals }
    }

    pub(crate) const fn kind(self) -> EventKind {
        match (self.texcoords, self.normals) {
            (false, NormalLayout::Absent) => EventKind::FaceV,
            (true, NormalLayout::Absent) => EventKind::FaceVt,
            (false, NormalLayout::PerVertex) => EventKind::FaceVn,
            (true, NormalLayout::PerVertex) => EventKind::FaceVtn,
            (false, NormalLayout::Shared) => EventKind::FaceVnFill,
            (true, NormalLayout::Shared) => EventKind::FaceVtnFill,
        }
    }

}

/// `true` if any index in the slice is present.
pub(crate) fn any_present(indices: &[i32]) -> bool {
    indices.iter().any(|&i| i != ABSENT)
}
