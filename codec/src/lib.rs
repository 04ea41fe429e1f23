//! Lossless binary mesh encoding and decoding for objz.
//!
//! This is the main codec crate that ties together bitstream and wire to turn
//! a sequence of geometry events into a compact bit stream and back.
//!
//! # Features
//!
//! - Streaming [`Encoder`] that picks the narrowest event variant per call
//! - Adaptive float cache with exact back-references and delta coding
//! - [`Decoder`] that drives any [`MeshSink`]
//! - Owned [`MeshEvent`] values and an [`EventRecorder`] sink
//!
//! # Design Principles
//!
//! - **Lossless** - Every float round-trips bit for bit, NaN payloads included.
//! - **Bounded decoding** - Length fields are checked against [`Limits`] before use.
//! - **Per-stream state** - Caches live in the encoder or decoder that owns them.
//!
//! # Example
//!
//! ```
//! use codec::{decode_events, encode_events, EncoderConfig, Limits, MeshEvent};
//!
//! let events = vec![
//!     MeshEvent::Vertex { x: 1.0, y: 2.0, z: 3.0, w: 1.0 },
//!     MeshEvent::Points { vertices: vec![1] },
//!     MeshEvent::EndOfData,
//! ];
//! let bytes = encode_events(&events, EncoderConfig::default()).unwrap();
//! assert_eq!(decode_events(&bytes, Limits::default()).unwrap(), events);
//! ```

mod config;
mod decoder;
mod encoder;
mod error;
mod event;
mod float_cache;
#[cfg(feature = "serde")]
mod float_serde;
mod layout;
mod ring;
mod scratch;
mod sink;
mod stats;

pub use config::EncoderConfig;
pub use decoder::Decoder;
pub use encoder::{Encoder, StreamState};
pub use error::{CodecError, CodecResult, IndexTable, SinkError};
pub use event::{EventRecorder, MeshEvent};
pub use float_cache::{FloatCache, FloatPath};
pub use scratch::DecodeScratch;
pub use sink::{MeshSink, ABSENT};
pub use stats::{FloatPathCounts, StreamStats};
pub use wire::{EventKind, LimitKind, Limits, StreamHeader};

/// Encodes `events` into a complete in-memory stream.
///
/// `EndObject` and `EndOfData` carry nothing on the wire and are skipped.
pub fn encode_events(events: &[MeshEvent], config: EncoderConfig) -> CodecResult<Vec<u8>> {
    let mut encoder = Encoder::create(Vec::new(), config)?;
    for event in events {
        event.replay(&mut encoder)?;
    }
    encoder.close()
}

/// Decodes a complete in-memory stream into owned events.
pub fn decode_events(bytes: &[u8], limits: Limits) -> CodecResult<Vec<MeshEvent>> {
    let mut recorder = EventRecorder::new();
    Decoder::new(limits).parse_bytes(bytes, &mut recorder)?;
    Ok(recorder.into_events())
}
