//! Event kinds and their prefix codes.
//!
//! Each code is `group` set bits, one clear bit, then a 2-bit subcode; the
//! pair selects row `group * 4 + subcode` of the event table. Frequent events
//! (3-component vertices and normals, plain faces) sit in the shortest group.
//! Every event is preceded by a repeat bit: a set bit means "same kind as the
//! previous event" and no code follows.

use bitstream::{BitReader, BitWriter};

use crate::error::{DecodeError, EncodeError, WireResult};

/// Largest group prefix in the table.
pub const MAX_GROUP: u8 = 5;

/// Number of distinct event kinds.
pub const EVENT_KIND_COUNT: usize = 23;

/// A geometry event kind.
///
/// The discriminant is a dense index used for statistics tables, not the
/// wire code; see [`EventKind::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum EventKind {
    Object = 0,
    Vertex2 = 1,
    Vertex3 = 2,
    Vertex4 = 3,
    ParamVertex2 = 4,
    ParamVertex3 = 5,
    ParamVertex4 = 6,
    Normal2 = 7,
    Normal3 = 8,
    Normal4 = 9,
    TexCoord1 = 10,
    TexCoord2 = 11,
    TexCoord3 = 12,
    /// Face with vertex indices only.
    FaceV = 13,
    /// Face with vertex and texture coordinate indices.
    FaceVt = 14,
    /// Face with vertex and per-vertex normal indices.
    FaceVn = 15,
    /// Face with vertex, texture coordinate and per-vertex normal indices.
    FaceVtn = 16,
    /// Face with vertex indices and one normal index shared by every vertex.
    FaceVnFill = 17,
    /// Face with vertex and texture coordinate indices and one shared normal index.
    FaceVtnFill = 18,
    Line = 19,
    LineVt = 20,
    Points = 21,
    End = 22,
}

/// A prefix code: `group` set bits, a clear bit, then a 2-bit subcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventCode {
    pub group: u8,
    pub subcode: u8,
}

impl EventCode {
    const fn new(group: u8, subcode: u8) -> Self {
        Self { group, subcode }
    }

    /// Table row selected by this code.
    #[must_use]
    pub const fn row(self) -> usize {
        self.group as usize * 4 + self.subcode as usize
    }

    /// Width of the code on the wire, excluding the repeat bit.
    #[must_use]
    pub const fn bit_len(self) -> u8 {
        self.group + 1 + 2
    }

    /// The code bits, right-aligned.
    #[must_use]
    pub const fn bits(self) -> u64 {
        let prefix = ((1u64 << self.group) - 1) << 1;
        (prefix << 2) | self.subcode as u64
    }
}

/// Row → kind. Row 23 aliases `End` so every 2-bit subcode of the last group decodes.
const DECODE_TABLE: [EventKind; (MAX_GROUP as usize + 1) * 4] = [
    EventKind::Vertex3,
    EventKind::Normal3,
    EventKind::FaceVtn,
    EventKind::FaceV,
    EventKind::TexCoord2,
    EventKind::FaceVn,
    EventKind::FaceVt,
    EventKind::FaceVnFill,
    EventKind::Vertex2,
    EventKind::Vertex4,
    EventKind::TexCoord1,
    EventKind::TexCoord3,
    EventKind::Normal2,
    EventKind::Normal4,
    EventKind::FaceVtnFill,
    EventKind::Object,
    EventKind::Line,
    EventKind::LineVt,
    EventKind::Points,
    EventKind::ParamVertex2,
    EventKind::ParamVertex3,
    EventKind::ParamVertex4,
    EventKind::End,
    EventKind::End,
];

impl EventKind {
    /// All kinds in index order.
    pub const ALL: [Self; EVENT_KIND_COUNT] = [
        Self::Object,
        Self::Vertex2,
        Self::Vertex3,
        Self::Vertex4,
        Self::ParamVertex2,
        Self::ParamVertex3,
        Self::ParamVertex4,
        Self::Normal2,
        Self::Normal3,
        Self::Normal4,
        Self::TexCoord1,
        Self::TexCoord2,
        Self::TexCoord3,
        Self::FaceV,
        Self::FaceVt,
        Self::FaceVn,
        Self::FaceVtn,
        Self::FaceVnFill,
        Self::FaceVtnFill,
        Self::Line,
        Self::LineVt,
        Self::Points,
        Self::End,
    ];

    /// Dense index in `0..EVENT_KIND_COUNT`.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The canonical wire code for this kind.
    #[must_use]
    pub const fn code(self) -> EventCode {
        match self {
            Self::Vertex3 => EventCode::new(0, 0),
            Self::Normal3 => EventCode::new(0, 1),
            Self::FaceVtn => EventCode::new(0, 2),
            Self::FaceV => EventCode::new(0, 3),
            Self::TexCoord2 => EventCode::new(1, 0),
            Self::FaceVn => EventCode::new(1, 1),
            Self::FaceVt => EventCode::new(1, 2),
            Self::FaceVnFill => EventCode::new(1, 3),
            Self::Vertex2 => EventCode::new(2, 0),
            Self::Vertex4 => EventCode::new(2, 1),
            Self::TexCoord1 => EventCode::new(2, 2),
            Self::TexCoord3 => EventCode::new(2, 3),
            Self::Normal2 => EventCode::new(3, 0),
            Self::Normal4 => EventCode::new(3, 1),
            Self::FaceVtnFill => EventCode::new(3, 2),
            Self::Object => EventCode::new(3, 3),
            Self::Line => EventCode::new(4, 0),
            Self::LineVt => EventCode::new(4, 1),
            Self::Points => EventCode::new(4, 2),
            Self::ParamVertex2 => EventCode::new(4, 3),
            Self::ParamVertex3 => EventCode::new(5, 0),
            Self::ParamVertex4 => EventCode::new(5, 1),
            Self::End => EventCode::new(5, 2),
        }
    }

    /// Looks up the kind stored at a table row.
    #[must_use]
    pub fn from_row(row: usize) -> Option<Self> {
        DECODE_TABLE.get(row).copied()
    }

    /// Short human-readable name, as used by tooling output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Vertex2 => "vertex2",
            Self::Vertex3 => "vertex3",
            Self::Vertex4 => "vertex4",
            Self::ParamVertex2 => "param_vertex2",
            Self::ParamVertex3 => "param_vertex3",
            Self::ParamVertex4 => "param_vertex4",
            Self::Normal2 => "normal2",
            Self::Normal3 => "normal3",
            Self::Normal4 => "normal4",
            Self::TexCoord1 => "texcoord1",
            Self::TexCoord2 => "texcoord2",
            Self::TexCoord3 => "texcoord3",
            Self::FaceV => "face_v",
            Self::FaceVt => "face_vt",
            Self::FaceVn => "face_vn",
            Self::FaceVtn => "face_vtn",
            Self::FaceVnFill => "face_vn_fill",
            Self::FaceVtnFill => "face_vtn_fill",
            Self::Line => "line",
            Self::LineVt => "line_vt",
            Self::Points => "points",
            Self::End => "end",
        }
    }
}

/// Per-stream event code state: remembers the previous kind for the repeat bit.
///
/// Encoder and decoder each own one; it must be reset whenever a stream
/// closes so the next stream starts without a previous kind.
#[derive(Debug, Clone, Default)]
pub struct EventCoder {
    last: Option<EventKind>,
}

impl EventCoder {
    #[must_use]
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// The most recently written or read kind.
    #[must_use]
    pub const fn last(&self) -> Option<EventKind> {
        self.last
    }

    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Writes the repeat bit and, when the kind changes, its full code.
    pub fn write(&mut self, writer: &mut BitWriter, kind: EventKind) -> Result<(), EncodeError> {
        if self.last == Some(kind) {
            writer.write_bit(true);
            return Ok(());
        }
        writer.write_bit(false);
        let code = kind.code();
        writer.write_bits(code.bits(), code.bit_len())?;
        self.last = Some(kind);
        Ok(())
    }

    /// Reads the repeat bit and, when clear, a full code.
    pub fn read(&mut self, reader: &mut BitReader<'_>) -> WireResult<EventKind> {
        if reader.read_bit()? {
            // A repeat bit before any event has nothing to repeat.
            return self.last.ok_or(DecodeError::UnknownEventCode { group: 0 });
        }
        let mut group = 0u8;
        while reader.read_bit()? {
            group += 1;
            if group > MAX_GROUP {
                return Err(DecodeError::UnknownEventCode { group });
            }
        }
        // Two bits always fit in a usize row offset.
        let subcode = reader.read_bits(2)? as usize;
        let kind = EventKind::from_row(group as usize * 4 + subcode)
            .ok_or(DecodeError::UnknownEventCode { group })?;
        self.last = Some(kind);
        Ok(kind)
    }
}
