//! Stream decoder: validates the header and drives a [`MeshSink`].

use std::io::Read;

use bitstream::{BitError, BitReader};
use tracing::{debug, trace};
use wire::{
    decode_header, read_icount, read_varint, zigzag_decode, DecodeError, EventCoder, EventKind,
    LimitKind, Limits, StreamHeader, HEADER_SIZE,
};

use crate::error::{CodecError, CodecResult};
use crate::float_cache::FloatCache;
use crate::layout::{
    FaceLayout, NormalLayout, NORMAL_DEFAULTS, TEXCOORD_DEFAULTS, VERTEX_DEFAULTS,
};
use crate::scratch::DecodeScratch;
use crate::sink::MeshSink;
use crate::stats::StreamStats;

/// Smallest encoding of one index entry (a 4-bit `icount`).
const MIN_INDEX_BITS: usize = 4;

/// Decodes complete streams into a [`MeshSink`].
///
/// A decoder can be reused; each call to [`parse`](Self::parse) or
/// [`parse_bytes`](Self::parse_bytes) starts from a fresh float cache and
/// event state.
#[derive(Debug, Default)]
pub struct Decoder {
    limits: Limits,
    stats: StreamStats,
    scratch: DecodeScratch,
}

/// State for one stream being read.
struct Stream<'a, 'b, S: ?Sized> {
    reader: BitReader<'a>,
    floats: FloatCache,
    events: EventCoder,
    limits: &'b Limits,
    stats: &'b mut StreamStats,
    scratch: &'b mut DecodeScratch,
    sink: &'b mut S,
    in_object: bool,
}

impl Decoder {
    #[must_use]
    pub fn new(limits: Limits) -> Self {
        Self {
            limits,
            stats: StreamStats::new(),
            scratch: DecodeScratch::new(),
        }
    }

    #[must_use]
    pub const fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Statistics of the most recently parsed stream.
    #[must_use]
    pub const fn stats(&self) -> &StreamStats {
        &self.stats
    }

    /// Reads `source` to the end and decodes it.
    pub fn parse<R, S>(&mut self, source: R, sink: &mut S) -> CodecResult<StreamHeader>
    where
        R: Read,
        S: MeshSink + ?Sized,
    {
        let max = self.limits.max_stream_bytes;
        let cap = u64::try_from(max).unwrap_or(u64::MAX).saturating_add(1);
        let mut bytes = Vec::new();
        source.take(cap).read_to_end(&mut bytes)?;
        self.parse_bytes(&bytes, sink)
    }

    /// Decodes a complete in-memory stream.
    pub fn parse_bytes<S>(&mut self, bytes: &[u8], sink: &mut S) -> CodecResult<StreamHeader>
    where
        S: MeshSink + ?Sized,
    {
        self.stats = StreamStats::new();
        if bytes.len() > self.limits.max_stream_bytes {
            return Err(DecodeError::LimitsExceeded {
                kind: LimitKind::StreamBytes,
                limit: self.limits.max_stream_bytes,
                actual: bytes.len(),
            }
            .into());
        }

        let header = decode_header(bytes)?;
        debug!(
            version = header.version,
            float_bits = header.float_bits,
            bytes = bytes.len(),
            "decoding stream"
        );

        let mut stream = Stream {
            reader: BitReader::new(&bytes[HEADER_SIZE..]),
            floats: FloatCache::new(header.float_bits)?,
            events: EventCoder::new(),
            limits: &self.limits,
            stats: &mut self.stats,
            scratch: &mut self.scratch,
            sink,
            in_object: false,
        };
        stream.run()?;

        debug!(
            events = self.stats.total_events(),
            floats = self.stats.floats.total(),
            "decoded stream"
        );
        Ok(header)
    }
}

impl<S: MeshSink + ?Sized> Stream<'_, '_, S> {
    fn run(&mut self) -> CodecResult<()> {
        loop {
            let previous = self.events.last();
            let kind = self.events.read(&mut self.reader)?;
            self.stats.record_event(kind, previous == Some(kind));
            trace!(event = kind.name(), bit = self.reader.bit_position(), "decode event");
            if kind == EventKind::End {
                break;
            }
            self.dispatch(kind)?;
        }

        self.stats.payload_bits = self.reader.bit_position() as u64;
        self.reader.align_to_byte()?;
        let trailing = self.reader.bits_remaining() / 8;
        if trailing > 0 {
            return Err(CodecError::TrailingData { bytes: trailing });
        }

        if self.in_object {
            self.sink.end_object()?;
        }
        self.sink.end_of_data()
    }

    fn dispatch(&mut self, kind: EventKind) -> CodecResult<()> {
        match kind {
            EventKind::Object => self.object(),
            EventKind::Vertex2 => self.vertex(2),
            EventKind::Vertex3 => self.vertex(3),
            EventKind::Vertex4 => self.vertex(4),
            EventKind::ParamVertex2 => self.param_vertex(2),
            EventKind::ParamVertex3 => self.param_vertex(3),
            EventKind::ParamVertex4 => self.param_vertex(4),
            EventKind::Normal2 => self.normal(2),
            EventKind::Normal3 => self.normal(3),
            EventKind::Normal4 => self.normal(4),
            EventKind::TexCoord1 => self.texture_vertex(1),
            EventKind::TexCoord2 => self.texture_vertex(2),
            EventKind::TexCoord3 => self.texture_vertex(3),
            EventKind::Line => self.line(false),
            EventKind::LineVt => self.line(true),
            EventKind::Points => self.points(),
            EventKind::FaceV => self.face(FaceLayout::new(false, NormalLayout::Absent)),
            EventKind::FaceVt => self.face(FaceLayout::new(true, NormalLayout::Absent)),
            EventKind::FaceVn => self.face(FaceLayout::new(false, NormalLayout::PerVertex)),
            EventKind::FaceVtn => self.face(FaceLayout::new(true, NormalLayout::PerVertex)),
            EventKind::FaceVnFill => self.face(FaceLayout::new(false, NormalLayout::Shared)),
            EventKind::FaceVtnFill => self.face(FaceLayout::new(true, NormalLayout::Shared)),
            EventKind::End => Ok(()),
        }
    }

    /// Reads `count` floats over `defaults`.
    fn floats<const N: usize>(
        &mut self,
        count: usize,
        defaults: [f32; N],
    ) -> CodecResult<[f32; N]> {
        let mut values = defaults;
        for value in values.iter_mut().take(count) {
            let (decoded, path) = self.floats.decode(&mut self.reader)?;
            self.stats.record_float(path);
            *value = decoded;
        }
        Ok(values)
    }

    fn vertex(&mut self, count: usize) -> CodecResult<()> {
        let [x, y, z, w] = self.floats(count, VERTEX_DEFAULTS)?;
        self.sink.add_vertex(x, y, z, w)
    }

    fn param_vertex(&mut self, count: usize) -> CodecResult<()> {
        let [u, v, w, q] = self.floats(count, VERTEX_DEFAULTS)?;
        self.sink.add_param_vertex(u, v, w, q)
    }

    fn normal(&mut self, count: usize) -> CodecResult<()> {
        let [x, y, z, w] = self.floats(count, NORMAL_DEFAULTS)?;
        self.sink.add_normal(x, y, z, w)
    }

    fn texture_vertex(&mut self, count: usize) -> CodecResult<()> {
        let [u, v, w] = self.floats(count, TEXCOORD_DEFAULTS)?;
        self.sink.add_texture_vertex(u, v, w)
    }

    fn object(&mut self) -> CodecResult<()> {
        let len = read_varint(&mut self.reader)? as usize;
        if len > self.limits.max_name_bytes {
            return Err(DecodeError::LimitsExceeded {
                kind: LimitKind::NameBytes,
                limit: self.limits.max_name_bytes,
                actual: len,
            }
            .into());
        }
        self.ensure_bits(len.saturating_mul(8))?;

        let name = self.scratch.name_mut();
        for _ in 0..len {
            name.push(self.reader.read_byte()?);
        }
        let name = std::str::from_utf8(name).map_err(|_| CodecError::InvalidObjectName)?;

        if self.in_object {
            self.sink.end_object()?;
        }
        self.in_object = true;
        self.sink.begin_object(name)
    }

    fn face(&mut self, layout: FaceLayout) -> CodecResult<()> {
        let count = self.count()?;
        let reader = &mut self.reader;
        let (vertices, texcoords, normals) = self.scratch.index_lists_mut(count);
        read_indices(reader, vertices)?;
        if layout.texcoords {
            read_indices(reader, texcoords)?;
        }
        match layout.normals {
            NormalLayout::Absent => {}
            NormalLayout::Shared => normals.fill(zigzag_decode(read_icount(reader)?)),
            NormalLayout::PerVertex => read_indices(reader, normals)?,
        }
        self.sink.add_face(vertices, texcoords, normals)
    }

    fn line(&mut self, with_texcoords: bool) -> CodecResult<()> {
        let count = self.count()?;
        let reader = &mut self.reader;
        let (vertices, texcoords, _) = self.scratch.index_lists_mut(count);
        read_indices(reader, vertices)?;
        if with_texcoords {
            read_indices(reader, texcoords)?;
        }
        self.sink.add_line(vertices, texcoords)
    }

    fn points(&mut self) -> CodecResult<()> {
        let count = self.count()?;
        let reader = &mut self.reader;
        let (vertices, _, _) = self.scratch.index_lists_mut(count);
        read_indices(reader, vertices)?;
        self.sink.add_points(vertices)
    }

    /// Reads an element's index count and checks it before anything is sized
    /// from it.
    fn count(&mut self) -> CodecResult<usize> {
        let count = read_icount(&mut self.reader)? as usize;
        if count > self.limits.max_element_indices {
            return Err(DecodeError::LimitsExceeded {
                kind: LimitKind::ElementIndices,
                limit: self.limits.max_element_indices,
                actual: count,
            }
            .into());
        }
        self.ensure_bits(count.saturating_mul(MIN_INDEX_BITS))?;
        Ok(count)
    }

    fn ensure_bits(&self, requested: usize) -> CodecResult<()> {
        let available = self.reader.bits_remaining();
        if requested > available {
            return Err(BitError::UnexpectedEof {
                requested,
                available,
            }
            .into());
        }
        Ok(())
    }
}

/// Reads `first` then every other entry relative to it.
fn read_indices(reader: &mut BitReader<'_>, out: &mut [i32]) -> CodecResult<()> {
    let Some((first, rest)) = out.split_first_mut() else {
        return Ok(());
    };
    *first = zigzag_decode(read_icount(reader)?);
    for index in rest {
        *index = first.wrapping_add(zigzag_decode(read_icount(reader)?));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Encoder, EncoderConfig, EventRecorder, MeshEvent};

    fn encode(build: impl FnOnce(&mut Encoder<Vec<u8>>)) -> Vec<u8> {
        let mut encoder = Encoder::create(Vec::new(), EncoderConfig::default()).unwrap();
        build(&mut encoder);
        encoder.close().unwrap()
    }

    fn decode(bytes: &[u8]) -> CodecResult<Vec<MeshEvent>> {
        let mut recorder = EventRecorder::new();
        Decoder::new(Limits::for_testing()).parse_bytes(bytes, &mut recorder)?;
        Ok(recorder.into_events())
    }

    #[test]
    fn empty_stream_delivers_end_of_data_only() {
        let bytes = encode(|_| {});
        assert_eq!(decode(&bytes).unwrap(), vec![MeshEvent::EndOfData]);
    }

    #[test]
    fn every_face_kind_decodes() {
        let faces: [(&[i32], &[i32]); 6] = [
            (&[], &[]),
            (&[4, 5, 6], &[]),
            (&[], &[7, 8, 9]),
            (&[4, 5, 6], &[7, 8, 9]),
            (&[], &[7, 7, 7]),
            (&[4, -1, 6], &[7, 7, 7]),
        ];
        let bytes = encode(|e| {
            for (texcoords, normals) in faces {
                e.add_face(&[1, 2, 3], texcoords, normals).unwrap();
            }
        });

        let mut decoder = Decoder::new(Limits::for_testing());
        let mut recorder = EventRecorder::new();
        decoder.parse_bytes(&bytes, &mut recorder).unwrap();
        for kind in [
            EventKind::FaceV,
            EventKind::FaceVt,
            EventKind::FaceVn,
            EventKind::FaceVtn,
            EventKind::FaceVnFill,
            EventKind::FaceVtnFill,
        ] {
            assert_eq!(decoder.stats().event_count(kind), 1, "{kind:?}");
        }

        let events = recorder.into_events();
        for ((texcoords, normals), event) in faces.iter().zip(&events) {
            let expect = |list: &[i32]| {
                if list.is_empty() {
                    vec![-1; 3]
                } else {
                    list.to_vec()
                }
            };
            assert_eq!(
                *event,
                MeshEvent::Face {
                    vertices: vec![1, 2, 3],
                    texcoords: expect(texcoords),
                    normals: expect(normals),
                }
            );
        }
    }

    #[test]
    fn objects_are_closed_implicitly() {
        let bytes = encode(|e| {
            e.begin_object("a").unwrap();
            e.add_points(&[1]).unwrap();
            e.begin_object("b").unwrap();
        });
        assert_eq!(
            decode(&bytes).unwrap(),
            vec![
                MeshEvent::BeginObject { name: "a".into() },
                MeshEvent::Points { vertices: vec![1] },
                MeshEvent::EndObject,
                MeshEvent::BeginObject { name: "b".into() },
                MeshEvent::EndObject,
                MeshEvent::EndOfData,
            ]
        );
    }

    #[test]
    fn absent_blocks_decode_as_minus_one() {
        let bytes = encode(|e| {
            e.add_face(&[1, 2, 3], &[], &[]).unwrap();
            e.add_line(&[4, 5], &[]).unwrap();
        });
        assert_eq!(
            decode(&bytes).unwrap()[..2],
            [
                MeshEvent::Face {
                    vertices: vec![1, 2, 3],
                    texcoords: vec![-1; 3],
                    normals: vec![-1; 3],
                },
                MeshEvent::Line {
                    vertices: vec![4, 5],
                    texcoords: vec![-1; 2],
                },
            ]
        );
    }

    #[test]
    fn shared_normal_expands_to_every_vertex() {
        let bytes = encode(|e| e.add_face(&[1, 2, 3], &[7, 8, 9], &[5, 5, 5]).unwrap());
        assert_eq!(
            decode(&bytes).unwrap()[0],
            MeshEvent::Face {
                vertices: vec![1, 2, 3],
                texcoords: vec![7, 8, 9],
                normals: vec![5, 5, 5],
            }
        );
    }

    #[test]
    fn omitted_components_take_defaults() {
        let bytes = encode(|e| {
            e.add_vertex(1.0, 2.0, 0.0, 1.0).unwrap();
            e.add_normal(0.0, 1.0, 0.0, 0.0).unwrap();
            e.add_texture_vertex(0.5, 0.0, 0.0).unwrap();
        });
        let events = decode(&bytes).unwrap();
        assert_eq!(
            events[..3],
            [
                MeshEvent::Vertex {
                    x: 1.0,
                    y: 2.0,
                    z: 0.0,
                    w: 1.0
                },
                MeshEvent::Normal {
                    x: 0.0,
                    y: 1.0,
                    z: 0.0,
                    w: 0.0
                },
                MeshEvent::TextureVertex {
                    u: 0.5,
                    v: 0.0,
                    w: 0.0
                },
            ]
        );
    }

    #[test]
    fn stats_match_encoder() {
        let mut encoder = Encoder::create(Vec::new(), EncoderConfig::default()).unwrap();
        for i in 0..10 {
            encoder.add_vertex(i as f32, 1.0, 2.0, 1.0).unwrap();
        }
        encoder.add_face(&[1, 2, 3], &[], &[]).unwrap();
        let bytes = encoder.close().unwrap();

        let mut decoder = Decoder::new(Limits::for_testing());
        decoder.parse_bytes(&bytes, &mut EventRecorder::new()).unwrap();
        assert_eq!(decoder.stats(), encoder.stats());
    }

    #[test]
    fn trailing_bytes_rejected() {
        let mut bytes = encode(|e| e.add_points(&[1]).unwrap());
        bytes.push(0);
        assert!(matches!(
            decode(&bytes),
            Err(CodecError::TrailingData { bytes: 1 })
        ));
    }

    #[test]
    fn truncated_stream_rejected() {
        let bytes = encode(|e| e.add_vertex(1.5, 2.5, 3.5, 1.0).unwrap());
        let truncated = &bytes[..bytes.len() - 2];
        assert!(matches!(
            decode(truncated),
            Err(CodecError::Wire(DecodeError::Bitstream(_)) | CodecError::Bitstream(_))
        ));
    }

    #[test]
    fn oversized_element_rejected_before_allocation() {
        let limits = Limits::for_testing();
        let vertices: Vec<i32> = (0..=limits.max_element_indices as i32).collect();
        let bytes = encode(|e| e.add_points(&vertices).unwrap());
        assert!(matches!(
            decode(&bytes),
            Err(CodecError::Wire(DecodeError::LimitsExceeded {
                kind: LimitKind::ElementIndices,
                ..
            }))
        ));
    }

    #[test]
    fn oversized_name_rejected() {
        let name = "n".repeat(Limits::for_testing().max_name_bytes + 1);
        let bytes = encode(|e| e.begin_object(&name).unwrap());
        assert!(matches!(
            decode(&bytes),
            Err(CodecError::Wire(DecodeError::LimitsExceeded {
                kind: LimitKind::NameBytes,
                ..
            }))
        ));
    }

    #[test]
    fn oversized_stream_rejected() {
        let limits = Limits {
            max_stream_bytes: 12,
            ..Limits::for_testing()
        };
        let bytes = encode(|e| e.add_vertex(1.5, 2.5, 3.5, 1.0).unwrap());
        let mut decoder = Decoder::new(limits);
        let err = decoder
            .parse(bytes.as_slice(), &mut EventRecorder::new())
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::Wire(DecodeError::LimitsExceeded {
                kind: LimitKind::StreamBytes,
                ..
            })
        ));
    }

    #[test]
    fn sink_error_aborts_decoding() {
        struct Refuse;
        impl MeshSink for Refuse {
            fn begin_object(&mut self, _: &str) -> CodecResult<()> {
                Err(CodecError::sink("no objects"))
            }
            fn end_object(&mut self) -> CodecResult<()> {
                Ok(())
            }
            fn add_vertex(&mut self, _: f32, _: f32, _: f32, _: f32) -> CodecResult<()> {
                Ok(())
            }
            fn add_param_vertex(&mut self, _: f32, _: f32, _: f32, _: f32) -> CodecResult<()> {
                Ok(())
            }
            fn add_normal(&mut self, _: f32, _: f32, _: f32, _: f32) -> CodecResult<()> {
                Ok(())
            }
            fn add_texture_vertex(&mut self, _: f32, _: f32, _: f32) -> CodecResult<()> {
                Ok(())
            }
            fn add_face(&mut self, _: &[i32], _: &[i32], _: &[i32]) -> CodecResult<()> {
                Ok(())
            }
            fn add_line(&mut self, _: &[i32], _: &[i32]) -> CodecResult<()> {
                Ok(())
            }
            fn add_points(&mut self, _: &[i32]) -> CodecResult<()> {
                Ok(())
            }
        }

        let bytes = encode(|e| e.begin_object("cube").unwrap());
        let err = Decoder::default().parse_bytes(&bytes, &mut Refuse).unwrap_err();
        assert!(matches!(err, CodecError::Sink(_)));
    }

    #[test]
    fn invalid_utf8_name_rejected() {
        let mut bytes = encode(|e| e.begin_object("ab").unwrap());
        // Object: repeat 0 + 1110 11 (7 bits), 7-bit length, then "ab"
        // starting at payload bit 14. Flip the top bit of 'a' to make 0xE1.
        bytes[HEADER_SIZE + 1] ^= 0b0000_0010;
        assert!(matches!(
            decode(&bytes),
            Err(CodecError::InvalidObjectName)
        ));
    }
}
