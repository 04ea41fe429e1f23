//! Streaming mesh encoder.

use std::io::Write;

use bitstream::BitWriter;
use tracing::{debug, trace};
use wire::{
    encode_header, write_icount, write_varint, zigzag_encode, EventCoder, EventKind, LimitKind,
    HEADER_SIZE,
};

use crate::config::EncoderConfig;
use crate::error::{CodecError, CodecResult, IndexTable};
use crate::float_cache::FloatCache;
use crate::layout::{
    any_present, arity, normal_kind, param_vertex_kind, texcoord_kind, vertex_kind, FaceLayout,
    NormalLayout, NORMAL_DEFAULTS, TEXCOORD_DEFAULTS, VERTEX_DEFAULTS,
};
use crate::sink::MeshSink;
use crate::stats::StreamStats;

/// Completed bytes buffered before they are handed to the sink.
const FLUSH_THRESHOLD: usize = 8 * 1024;

/// Lifecycle of an encoder or decoder stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// No stream; only `open` is accepted.
    Closed,
    /// Header written, no event yet.
    Open,
    /// At least one event written.
    Streaming,
}

/// Per-stream state, dropped as a whole when the stream closes.
#[derive(Debug)]
struct Session<W> {
    sink: W,
    writer: BitWriter,
    floats: FloatCache,
    events: EventCoder,
    stats: StreamStats,
}

impl<W: Write> Session<W> {
    fn event(&mut self, kind: EventKind) -> CodecResult<()> {
        let repeat = self.events.last() == Some(kind);
        self.events.write(&mut self.writer, kind)?;
        self.stats.record_event(kind, repeat);
        trace!(event = kind.name(), repeat, "encode event");
        Ok(())
    }

    fn floats(&mut self, values: &[f32]) -> CodecResult<()> {
        for &value in values {
            let path = self.floats.encode(&mut self.writer, value)?;
            self.stats.record_float(path);
        }
        Ok(())
    }

    /// Writes `first` then every other entry relative to it.
    fn indices(&mut self, indices: &[i32]) -> CodecResult<()> {
        let Some((&first, rest)) = indices.split_first() else {
            return Ok(());
        };
        write_icount(&mut self.writer, zigzag_encode(first))?;
        for &index in rest {
            write_icount(&mut self.writer, zigzag_encode(index.wrapping_sub(first)))?;
        }
        Ok(())
    }

    fn count(&mut self, count: usize) -> CodecResult<()> {
        let count32 = u32::try_from(count).map_err(|_| CodecError::ElementTooLarge { count })?;
        write_icount(&mut self.writer, count32)?;
        Ok(())
    }

    fn maybe_flush(&mut self) -> CodecResult<()> {
        if self.writer.buffered_bytes() >= FLUSH_THRESHOLD {
            self.writer.drain_into(&mut self.sink)?;
        }
        Ok(())
    }

    fn write_end(&mut self) -> CodecResult<()> {
        self.event(EventKind::End)?;
        self.stats.payload_bits = self.writer.bits_written() as u64;
        Ok(())
    }

    fn finish(mut self) -> CodecResult<W> {
        self.writer.drain_into(&mut self.sink)?;
        let tail = self.writer.finish();
        self.sink.write_all(&tail)?;
        self.sink.flush()?;
        Ok(self.sink)
    }
}

/// Encodes mesh events into a byte sink.
///
/// ```text
/// Closed --open--> Open --event--> Streaming --close--> Closed
/// ```
///
/// Events outside an open stream fail with [`CodecError::NotOpen`].
#[derive(Debug)]
pub struct Encoder<W> {
    config: EncoderConfig,
    session: Option<Session<W>>,
    streaming: bool,
    last_stats: StreamStats,
}

impl<W: Write> Encoder<W> {
    #[must_use]
    pub fn new(config: EncoderConfig) -> Self {
        Self {
            config,
            session: None,
            streaming: false,
            last_stats: StreamStats::default(),
        }
    }

    /// Creates an encoder and opens a stream on `sink`.
    pub fn create(sink: W, config: EncoderConfig) -> CodecResult<Self> {
        let mut encoder = Self::new(config);
        encoder.open(sink)?;
        Ok(encoder)
    }

    #[must_use]
    pub const fn config(&self) -> &EncoderConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> StreamState {
        match (&self.session, self.streaming) {
            (None, _) => StreamState::Closed,
            (Some(_), false) => StreamState::Open,
            (Some(_), true) => StreamState::Streaming,
        }
    }

    /// Statistics of the open stream, or of the last closed one.
    #[must_use]
    pub fn stats(&self) -> &StreamStats {
        self.session
            .as_ref()
            .map_or(&self.last_stats, |session| &session.stats)
    }

    /// Writes the stream header to `sink` and starts a new stream.
    pub fn open(&mut self, mut sink: W) -> CodecResult<()> {
        if self.session.is_some() {
            return Err(CodecError::AlreadyOpen);
        }
        self.config.validate()?;
        let header = self.config.header();
        let floats = FloatCache::new(header.float_bits)?;

        let mut bytes = [0u8; HEADER_SIZE];
        encode_header(&header, &mut bytes)?;
        sink.write_all(&bytes)?;

        debug!(float_bits = header.float_bits, "opened encoder stream");
        self.session = Some(Session {
            sink,
            writer: BitWriter::with_capacity(FLUSH_THRESHOLD),
            floats,
            events: EventCoder::new(),
            stats: StreamStats::new(),
        });
        self.streaming = false;
        Ok(())
    }

    /// Writes the end event, flushes, and returns the sink.
    ///
    /// The stream is closed afterwards even if writing fails.
    pub fn close(&mut self) -> CodecResult<W> {
        let mut session = self.session.take().ok_or(CodecError::NotOpen)?;
        self.streaming = false;
        let ended = session.write_end();
        self.last_stats = session.stats.clone();
        let sink = ended.and_then(|()| session.finish())?;
        debug!(
            events = self.last_stats.total_events(),
            payload_bits = self.last_stats.payload_bits,
            "closed encoder stream"
        );
        Ok(sink)
    }

    fn session(&mut self) -> CodecResult<&mut Session<W>> {
        let session = self.session.as_mut().ok_or(CodecError::NotOpen)?;
        self.streaming = true;
        Ok(session)
    }

    pub fn begin_object(&mut self, name: &str) -> CodecResult<()> {
        check_limit(
            LimitKind::NameBytes,
            self.config.limits.max_name_bytes,
            name.len(),
        )?;
        let bytes = u32::try_from(name.len()).map_err(|_| CodecError::NameTooLong {
            bytes: name.len(),
        })?;
        let session = self.session()?;
        session.event(EventKind::Object)?;
        write_varint(&mut session.writer, bytes)?;
        for &byte in name.as_bytes() {
            session.writer.write_byte(byte);
        }
        session.maybe_flush()
    }

    /// Objects end implicitly at the next object or the end of the stream.
    pub fn end_object(&mut self) -> CodecResult<()> {
        if self.session.is_none() {
            return Err(CodecError::NotOpen);
        }
        trace!("end object");
        Ok(())
    }

    pub fn add_vertex(&mut self, x: f32, y: f32, z: f32, w: f32) -> CodecResult<()> {
        let values = [x, y, z, w];
        let arity = arity(&values, &VERTEX_DEFAULTS, 2);
        self.vertex_like(vertex_kind(arity), &values[..arity.count()])
    }

    pub fn add_param_vertex(&mut self, u: f32, v: f32, w: f32, q: f32) -> CodecResult<()> {
        let values = [u, v, w, q];
        let arity = arity(&values, &VERTEX_DEFAULTS, 2);
        self.vertex_like(param_vertex_kind(arity), &values[..arity.count()])
    }

    pub fn add_normal(&mut self, x: f32, y: f32, z: f32, w: f32) -> CodecResult<()> {
        let values = [x, y, z, w];
        let arity = arity(&values, &NORMAL_DEFAULTS, 2);
        self.vertex_like(normal_kind(arity), &values[..arity.count()])
    }

    pub fn add_texture_vertex(&mut self, u: f32, v: f32, w: f32) -> CodecResult<()> {
        let values = [u, v, w];
        let arity = arity(&values, &TEXCOORD_DEFAULTS, 1);
        self.vertex_like(texcoord_kind(arity), &values[..arity.count()])
    }

    fn vertex_like(&mut self, kind: EventKind, values: &[f32]) -> CodecResult<()> {
        let session = self.session()?;
        session.event(kind)?;
        session.floats(values)?;
        session.maybe_flush()
    }

    /// Writes a face.
    ///
    /// `texcoords` and `normals` are either empty (all absent) or one entry
    /// per vertex, with `-1` marking an absent index.
    pub fn add_face(
        &mut self,
        vertices: &[i32],
        texcoords: &[i32],
        normals: &[i32],
    ) -> CodecResult<()> {
        self.check_element(vertices)?;
        check_parallel(IndexTable::TexCoords, vertices.len(), texcoords)?;
        check_parallel(IndexTable::Normals, vertices.len(), normals)?;
        let layout = FaceLayout {
            texcoords: any_present(texcoords),
            normals: NormalLayout::classify(normals),
        };

        let session = self.session()?;
        session.event(layout.kind())?;
        session.count(vertices.len())?;
        session.indices(vertices)?;
        if layout.texcoords {
            session.indices(texcoords)?;
        }
        match layout.normals {
            NormalLayout::Absent => {}
            NormalLayout::Shared => {
                write_icount(&mut session.writer, zigzag_encode(normals[0]))?;
            }
            NormalLayout::PerVertex => session.indices(normals)?,
        }
        session.maybe_flush()
    }

    pub fn add_line(&mut self, vertices: &[i32], texcoords: &[i32]) -> CodecResult<()> {
        self.check_element(vertices)?;
        check_parallel(IndexTable::TexCoords, vertices.len(), texcoords)?;
        let with_texcoords = any_present(texcoords);
        let kind = if with_texcoords {
            EventKind::LineVt
        } else {
            EventKind::Line
        };

        let session = self.session()?;
        session.event(kind)?;
        session.count(vertices.len())?;
        session.indices(vertices)?;
        if with_texcoords {
            session.indices(texcoords)?;
        }
        session.maybe_flush()
    }

    pub fn add_points(&mut self, vertices: &[i32]) -> CodecResult<()> {
        self.check_element(vertices)?;
        let session = self.session()?;
        session.event(EventKind::Points)?;
        session.count(vertices.len())?;
        session.indices(vertices)?;
        session.maybe_flush()
    }

    fn check_element(&self, vertices: &[i32]) -> CodecResult<()> {
        check_limit(
            LimitKind::ElementIndices,
            self.config.limits.max_element_indices,
            vertices.len(),
        )
    }
}

fn check_limit(kind: LimitKind, limit: usize, actual: usize) -> CodecResult<()> {
    if actual > limit {
        return Err(CodecError::LimitsExceeded {
            kind,
            limit,
            actual,
        });
    }
    Ok(())
}

fn check_parallel(table: IndexTable, expected: usize, indices: &[i32]) -> CodecResult<()> {
    if indices.is_empty() || indices.len() == expected {
        Ok(())
    } else {
        Err(CodecError::IndexCountMismatch {
            table,
            expected,
            actual: indices.len(),
        })
    }
}

/// Lets a decoder feed an encoder directly. `end_of_data` does not close the
/// stream; call [`Encoder::close`] to get the sink back.
impl<W: Write> MeshSink for Encoder<W> {
    fn begin_object(&mut self, name: &str) -> CodecResult<()> {
        Self::begin_object(self, name)
    }

    fn end_object(&mut self) -> CodecResult<()> {
        Self::end_object(self)
    }

    fn add_vertex(&mut self, x: f32, y: f32, z: f32, w: f32) -> CodecResult<()> {
        Self::add_vertex(self, x, y, z, w)
    }

    fn add_param_vertex(&mut self, u: f32, v: f32, w: f32, q: f32) -> CodecResult<()> {
        Self::add_param_vertex(self, u, v, w, q)
    }

    fn add_normal(&mut self, x: f32, y: f32, z: f32, w: f32) -> CodecResult<()> {
        Self::add_normal(self, x, y, z, w)
    }

    fn add_texture_vertex(&mut self, u: f32, v: f32, w: f32) -> CodecResult<()> {
        Self::add_texture_vertex(self, u, v, w)
    }

    fn add_face(
        &mut self,
        vertices: &[i32],
        texcoords: &[i32],
        normals: &[i32],
    ) -> CodecResult<()> {
        Self::add_face(self, vertices, texcoords, normals)
    }

    fn add_line(&mut self, vertices: &[i32], texcoords: &[i32]) -> CodecResult<()> {
        Self::add_line(self, vertices, texcoords)
    }

    fn add_points(&mut self, vertices: &[i32]) -> CodecResult<()> {
        Self::add_points(self, vertices)
    }
}
