use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use codec::{decode_events, encode_events, EncoderConfig, Limits, MeshEvent};

/// A `rows x cols` grid: one vertex, normal and texture coordinate per point,
/// two triangles per cell.
fn grid(rows: i32, cols: i32) -> Vec<MeshEvent> {
    let mut events = vec![MeshEvent::BeginObject {
        name: "grid".into(),
    }];
    for r in 0..rows {
        for c in 0..cols {
            events.push(MeshEvent::Vertex {
                x: c as f32 * 0.1,
                y: (r * c) as f32 * 0.001,
                z: r as f32 * 0.1,
                w: 1.0,
            });
        }
    }
    for r in 0..rows {
        for c in 0..cols {
            events.push(MeshEvent::TextureVertex {
                u: c as f32 / cols as f32,
                v: r as f32 / rows as f32,
                w: 0.0,
            });
        }
    }
    events.push(MeshEvent::Normal {
        x: 0.0,
        y: 1.0,
        z: 0.0,
        w: 0.0,
    });
    for r in 0..rows - 1 {
        for c in 0..cols - 1 {
            let a = r * cols + c + 1;
            let b = a + 1;
            let d = a + cols;
            let e = d + 1;
            for tri in [[a, b, e], [a, e, d]] {
                events.push(MeshEvent::Face {
                    vertices: tri.to_vec(),
                    texcoords: tri.to_vec(),
                    normals: vec![1; 3],
                });
            }
        }
    }
    events.push(MeshEvent::EndObject);
    events.push(MeshEvent::EndOfData);
    events
}

fn bench_grid(c: &mut Criterion) {
    let events = grid(100, 100);
    let encoded = encode_events(&events, EncoderConfig::default()).unwrap();

    let mut group = c.benchmark_group("grid 100x100");
    group.throughput(Throughput::Elements(events.len() as u64));
    group.bench_function("encode", |b| {
        b.iter(|| black_box(encode_events(black_box(&events), EncoderConfig::default())))
    });
    group.bench_function("decode", |b| {
        b.iter(|| black_box(decode_events(black_box(&encoded), Limits::default())))
    });
    group.bench_function("encode float_bits=12", |b| {
        let config = EncoderConfig::new().with_float_bits(12);
        b.iter(|| black_box(encode_events(black_box(&events), config)))
    });
    group.finish();
}

criterion_group!(benches, bench_grid);
criterion_main!(benches);
