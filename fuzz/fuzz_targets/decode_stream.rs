#![no_main]

use codec::{Decoder, Encoder, EncoderConfig, EventRecorder, Limits};
use libfuzzer_sys::fuzz_target;
use wire::{HEADER_SIZE, MAGIC, PADDING, VERSION};

fuzz_target!(|data: &[u8]| {
    let limits = Limits::for_testing();

    // Raw input exercises header validation.
    let _ = Decoder::new(limits).parse_bytes(data, &mut EventRecorder::new());

    // A valid header in front of the input exercises the event loop.
    let Some((&bits, payload)) = data.split_first() else {
        return;
    };
    let float_bits = 3 + bits % 14;
    let mut stream = Vec::with_capacity(HEADER_SIZE + payload.len());
    stream.extend_from_slice(&MAGIC);
    stream.push(VERSION);
    stream.push(float_bits);
    stream.extend_from_slice(&PADDING);
    stream.extend_from_slice(payload);

    let mut recorder = EventRecorder::new();
    if Decoder::new(limits)
        .parse_bytes(&stream, &mut recorder)
        .is_err()
    {
        return;
    }

    // Whatever decodes must survive a re-encode and decode unchanged.
    let events = recorder.into_events();
    let config = EncoderConfig::new().with_float_bits(float_bits);
    let mut encoder = Encoder::create(Vec::new(), config).expect("valid float bits");
    for event in &events {
        event.replay(&mut encoder).expect("decoded events re-encode");
    }
    let bytes = encoder.close().expect("in-memory sink");
    let again = codec::decode_events(&bytes, Limits::unlimited()).expect("re-encoded stream decodes");
    assert_eq!(again, events);
});
