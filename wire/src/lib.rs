//! Wire format for the objz mesh codec.
//!
//! This crate owns everything both sides of the codec must agree on bit for
//! bit: the stream header, the event code table with its repeat bit, and the
//! variable-length integer encodings. It does not know about float caches or
//! mesh consumers.
//!
//! # Design Principles
//!
//! - **Stable wire format** - The format is versioned; the event table is fixed.
//! - **Bounded decoding** - Length fields are validated against [`Limits`] before use.
//! - **Per-stream state** - The only state here, [`EventCoder`], is owned by its caller.
//!
//! # Stream layout
//!
//! ```text
//! [header: "OBJZ" | version u8 | float_bits u8 | "LS"] [event]* [end event] [zero padding]
//! ```

mod error;
mod event;
mod header;
mod limits;
mod varint;

pub use error::{DecodeError, EncodeError, LimitKind, WireResult};
pub use event::{EventCode, EventCoder, EventKind, EVENT_KIND_COUNT, MAX_GROUP};
pub use header::{
    decode_header, encode_header, StreamHeader, DEFAULT_FLOAT_BITS, HEADER_SIZE, MAGIC,
    MAX_FLOAT_BITS, MIN_FLOAT_BITS, PADDING, VERSION,
};
pub use limits::Limits;
pub use varint::{
    icount_bits, read_icount, read_varint, varint_bits, write_icount, write_varint,
    zigzag_decode, zigzag_encode,
};
