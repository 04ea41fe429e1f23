//! Introspection and conversion tools for objz mesh streams.
//!
//! This crate provides utilities for understanding and reworking encoded
//! streams:
//!
//! - Inspect the header, event mix and float coding paths of a stream
//! - Dump decoded events as JSON or as OBJ-like text
//! - Recompress a stream with a different float cache size
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to understand what the codec is doing.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use codec::{
    Decoder, Encoder, EncoderConfig, EventRecorder, Limits, MeshEvent, StreamHeader, StreamStats,
};
use serde::Serialize;

/// Summary of one encoded stream.
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub version: u8,
    pub float_bits: u8,
    pub total_bytes: usize,
    pub payload_bits: u64,
    pub objects: Vec<String>,
    pub events: Vec<EventCount>,
    pub repeats: u64,
    pub floats: FloatReport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventCount {
    pub kind: &'static str,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FloatReport {
    pub exact: u64,
    pub delta: u64,
    pub literal: u64,
}

impl InspectReport {
    fn new(
        header: StreamHeader,
        total_bytes: usize,
        stats: &StreamStats,
        objects: Vec<String>,
    ) -> Self {
        Self {
            version: header.version,
            float_bits: header.float_bits,
            total_bytes,
            payload_bits: stats.payload_bits,
            objects,
            events: stats
                .iter()
                .map(|(kind, count)| EventCount {
                    kind: kind.name(),
                    count,
                })
                .collect(),
            repeats: stats.repeats,
            floats: FloatReport {
                exact: stats.floats.exact,
                delta: stats.floats.delta,
                literal: stats.floats.literal,
            },
        }
    }

    /// Average payload bits spent per float, if any float was coded.
    #[must_use]
    pub fn bits_per_float(&self) -> Option<f64> {
        let floats = self.floats.exact + self.floats.delta + self.floats.literal;
        (floats > 0).then(|| self.payload_bits as f64 / floats as f64)
    }
}

/// Decodes `bytes` and summarises the stream.
pub fn inspect_stream(bytes: &[u8], limits: &Limits) -> Result<InspectReport> {
    let (header, stats, events) = decode(bytes, limits)?;
    let objects = events
        .into_iter()
        .filter_map(|event| match event {
            MeshEvent::BeginObject { name } => Some(name),
            _ => None,
        })
        .collect();
    Ok(InspectReport::new(header, bytes.len(), &stats, objects))
}

/// Decoded events of a stream, for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct DumpOutput {
    pub float_bits: u8,
    pub events: Vec<MeshEvent>,
}

/// Decodes `bytes` into owned events.
pub fn dump_stream(bytes: &[u8], limits: &Limits) -> Result<DumpOutput> {
    let (header, _, events) = decode(bytes, limits)?;
    Ok(DumpOutput {
        float_bits: header.float_bits,
        events,
    })
}

/// Renders events as OBJ-like text, one statement per line.
///
/// Indices are printed as stored; absent texture coordinate and normal
/// indices are left empty in `v/vt/vn` triplets.
#[must_use]
pub fn format_events_pretty(events: &[MeshEvent]) -> String {
    let mut out = String::new();
    for event in events {
        // Writing to a String cannot fail.
        let _ = match event {
            MeshEvent::BeginObject { name } => writeln!(out, "o {name}"),
            MeshEvent::EndObject => writeln!(out, "# end object"),
            MeshEvent::Vertex { x, y, z, w } => writeln!(out, "v {x} {y} {z} {w}"),
            MeshEvent::ParamVertex { u, v, w, q } => writeln!(out, "vp {u} {v} {w} {q}"),
            MeshEvent::Normal { x, y, z, w } => writeln!(out, "vn {x} {y} {z} {w}"),
            MeshEvent::TextureVertex { u, v, w } => writeln!(out, "vt {u} {v} {w}"),
            MeshEvent::Face {
                vertices,
                texcoords,
                normals,
            } => writeln!(out, "f {}", triplets(vertices, texcoords, normals)),
            MeshEvent::Line {
                vertices,
                texcoords,
            } => writeln!(out, "l {}", triplets(vertices, texcoords, &[])),
            MeshEvent::Points { vertices } => writeln!(out, "p {}", triplets(vertices, &[], &[])),
            MeshEvent::EndOfData => writeln!(out, "# end of data"),
        };
    }
    out
}

fn triplets(vertices: &[i32], texcoords: &[i32], normals: &[i32]) -> String {
    let present = |list: &[i32], i: usize| {
        list.get(i)
            .copied()
            .filter(|&index| index != codec::ABSENT)
    };
    vertices
        .iter()
        .enumerate()
        .map(|(i, v)| match (present(texcoords, i), present(normals, i)) {
            (None, None) => v.to_string(),
            (Some(t), None) => format!("{v}/{t}"),
            (None, Some(n)) => format!("{v}//{n}"),
            (Some(t), Some(n)) => format!("{v}/{t}/{n}"),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Re-encodes a stream with `config`, returning the new bytes and their stats.
pub fn recompress(
    bytes: &[u8],
    limits: &Limits,
    config: EncoderConfig,
) -> Result<(Vec<u8>, StreamStats)> {
    let mut encoder = Encoder::create(Vec::new(), config).context("open encoder")?;
    Decoder::new(*limits)
        .parse_bytes(bytes, &mut encoder)
        .context("decode stream")?;
    let out = encoder.close().context("finish stream")?;
    Ok((out, encoder.stats().clone()))
}

fn decode(bytes: &[u8], limits: &Limits) -> Result<(StreamHeader, StreamStats, Vec<MeshEvent>)> {
    let mut decoder = Decoder::new(*limits);
    let mut recorder = EventRecorder::new();
    let header = decoder
        .parse_bytes(bytes, &mut recorder)
        .context("decode stream")?;
    Ok((header, decoder.stats().clone(), recorder.into_events()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use codec::encode_events;

    fn sample() -> Vec<u8> {
        let events = vec![
            MeshEvent::BeginObject {
                name: "quad".into(),
            },
            MeshEvent::Vertex {
                x: 0.0,
                y: 0.0,
                z: 1.0,
                w: 1.0,
            },
            MeshEvent::Vertex {
                x: 1.0,
                y: 0.0,
                z: 1.0,
                w: 1.0,
            },
            MeshEvent::Face {
                vertices: vec![1, 2, 3],
                texcoords: vec![],
                normals: vec![1, 1, 1],
            },
            MeshEvent::Line {
                vertices: vec![1, 2],
                texcoords: vec![4, -1],
            },
        ];
        encode_events(&events, EncoderConfig::default()).unwrap()
    }

    #[test]
    fn inspect_counts_events() {
        let report = inspect_stream(&sample(), &Limits::for_testing()).unwrap();
        assert_eq!(report.float_bits, 8);
        assert_eq!(report.objects, vec!["quad".to_string()]);
        assert!(report.events.contains(&EventCount {
            kind: "vertex3",
            count: 2
        }));
        assert_eq!(report.repeats, 1);
        assert_eq!(report.floats.literal + report.floats.exact + report.floats.delta, 6);
        assert!(report.bits_per_float().is_some());
    }

    #[test]
    fn dump_serializes_to_tagged_json() {
        let dump = dump_stream(&sample(), &Limits::for_testing()).unwrap();
        let json = serde_json::to_value(&dump).unwrap();
        assert_eq!(json["events"][0]["type"], "begin_object");
        assert_eq!(json["events"][0]["name"], "quad");
    }

    #[test]
    fn json_dump_reads_back_exactly() {
        let events = vec![
            MeshEvent::Vertex {
                x: f32::from_bits(0x7FC0_1234),
                y: 0.1,
                z: f32::INFINITY,
                w: f32::NEG_INFINITY,
            },
            MeshEvent::TextureVertex {
                u: 0.5,
                v: 1e-30,
                w: 3.0,
            },
        ];
        let bytes = encode_events(&events, EncoderConfig::default()).unwrap();
        let dump = dump_stream(&bytes, &Limits::for_testing()).unwrap();

        let json = serde_json::to_string(&dump.events).unwrap();
        assert!(json.contains("\"x\":\"0x7FC01234\""));
        assert!(json.contains("\"z\":\"0x7F800000\""));
        let parsed: Vec<MeshEvent> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, dump.events);
        assert_eq!(&parsed[..2], &events[..]);
    }

    #[test]
    fn pretty_output_uses_obj_statements() {
        let dump = dump_stream(&sample(), &Limits::for_testing()).unwrap();
        let text = format_events_pretty(&dump.events);
        assert!(text.contains("o quad\n"));
        assert!(text.contains("f 1//1 2//1 3//1\n"));
        assert!(text.contains("l 1/4 2\n"));
    }

    #[test]
    fn recompress_keeps_events() {
        let original = sample();
        let config = EncoderConfig::new().with_float_bits(12);
        let (wide, stats) = recompress(&original, &Limits::for_testing(), config).unwrap();
        assert_eq!(wide[5], 12);
        assert_eq!(stats.event_count(codec::EventKind::Vertex3), 2);
        let before = dump_stream(&original, &Limits::for_testing()).unwrap();
        let after = dump_stream(&wide, &Limits::for_testing()).unwrap();
        assert_eq!(before.events, after.events);
    }

    #[test]
    fn corrupt_stream_reports_context() {
        let mut bytes = sample();
        bytes[0] = b'X';
        let err = inspect_stream(&bytes, &Limits::for_testing()).unwrap_err();
        assert!(format!("{err:#}").contains("decode stream"));
    }
}
