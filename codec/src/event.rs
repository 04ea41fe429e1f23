//! Owned mesh events and a sink that records them.

use crate::error::CodecResult;
use crate::sink::MeshSink;

/// One logical geometry event, as delivered to a [`MeshSink`].
///
/// Equality compares floats by bit pattern, so `-0.0 != 0.0` and a NaN equals
/// itself; this matches what the codec preserves. With the `serde` feature,
/// non-finite floats serialize as bit-pattern strings so dumps read back
/// exactly.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum MeshEvent {
    BeginObject {
        name: String,
    },
    EndObject,
    Vertex {
        #[cfg_attr(feature = "serde", serde(with = "crate::float_serde"))]
        x: f32,
        #[cfg_attr(feature = "serde", serde(with = "crate::float_serde"))]
        y: f32,
        #[cfg_attr(feature = "serde", serde(with = "crate::float_serde"))]
        z: f32,
        #[cfg_attr(feature = "serde", serde(with = "crate::float_serde"))]
        w: f32,
    },
    ParamVertex {
        #[cfg_attr(feature = "serde", serde(with = "crate::float_serde"))]
        u: f32,
        #[cfg_attr(feature = "serde", serde(with = "crate::float_serde"))]
        v: f32,
        #[cfg_attr(feature = "serde", serde(with = "crate::float_serde"))]
        w: f32,
        #[cfg_attr(feature = "serde", serde(with = "crate::float_serde"))]
        q: f32,
    },
    Normal {
        #[cfg_attr(feature = "serde", serde(with = "crate::float_serde"))]
        x: f32,
        #[cfg_attr(feature = "serde", serde(with = "crate::float_serde"))]
        y: f32,
        #[cfg_attr(feature = "serde", serde(with = "crate::float_serde"))]
        z: f32,
        #[cfg_attr(feature = "serde", serde(with = "crate::float_serde"))]
        w: f32,
    },
    TextureVertex {
        #[cfg_attr(feature = "serde", serde(with = "crate::float_serde"))]
        u: f32,
        #[cfg_attr(feature = "serde", serde(with = "crate::float_serde"))]
        v: f32,
        #[cfg_attr(feature = "serde", serde(with = "crate::float_serde"))]
        w: f32,
    },
    Face {
        vertices: Vec<i32>,
        texcoords: Vec<i32>,
        normals: Vec<i32>,
    },
    Line {
        vertices: Vec<i32>,
        texcoords: Vec<i32>,
    },
    Points {
        vertices: Vec<i32>,
    },
    EndOfData,
}

impl MeshEvent {
    /// Delivers this event to `sink`.
    pub fn replay<S: MeshSink + ?Sized>(&self, sink: &mut S) -> CodecResult<()> {
        match self {
            Self::BeginObject { name } => sink.begin_object(name),
            Self::EndObject => sink.end_object(),
            Self::Vertex { x, y, z, w } => sink.add_vertex(*x, *y, *z, *w),
            Self::ParamVertex { u, v, w, q } => sink.add_param_vertex(*u, *v, *w, *q),
            Self::Normal { x, y, z, w } => sink.add_normal(*x, *y, *z, *w),
            Self::TextureVertex { u, v, w } => sink.add_texture_vertex(*u, *v, *w),
            Self::Face {
                vertices,
                texcoords,
                normals,
            } => sink.add_face(vertices, texcoords, normals),
            Self::Line {
                vertices,
                texcoords,
            } => sink.add_line(vertices, texcoords),
            Self::Points { vertices } => sink.add_points(vertices),
            Self::EndOfData => sink.end_of_data(),
        }
    }
}

fn same_floats<const N: usize>(a: [f32; N], b: [f32; N]) -> bool {
    a.iter().zip(&b).all(|(x, y)| x.to_bits() == y.to_bits())
}

impl PartialEq for MeshEvent {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::BeginObject { name: a }, Self::BeginObject { name: b }) => a == b,
            (Self::EndObject, Self::EndObject) | (Self::EndOfData, Self::EndOfData) => true,
            (
                Self::Vertex { x, y, z, w },
                Self::Vertex {
                    x: x2,
                    y: y2,
                    z: z2,
                    w: w2,
                },
            )
            | (
                Self::Normal { x, y, z, w },
                Self::Normal {
                    x: x2,
                    y: y2,
                    z: z2,
                    w: w2,
                },
            ) => same_floats([*x, *y, *z, *w], [*x2, *y2, *z2, *w2]),
            (
                Self::ParamVertex { u, v, w, q },
                Self::ParamVertex {
                    u: u2,
                    v: v2,
                    w: w2,
                    q: q2,
                },
            ) => same_floats([*u, *v, *w, *q], [*u2, *v2, *w2, *q2]),
            (
                Self::TextureVertex { u, v, w },
                Self::TextureVertex {
                    u: u2,
                    v: v2,
                    w: w2,
                },
            ) => same_floats([*u, *v, *w], [*u2, *v2, *w2]),
            (
                Self::Face {
                    vertices,
                    texcoords,
                    normals,
                },
                Self::Face {
                    vertices: v2,
                    texcoords: t2,
                    normals: n2,
                },
            ) => vertices == v2 && texcoords == t2 && normals == n2,
            (
                Self::Line {
                    vertices,
                    texcoords,
                },
                Self::Line {
                    vertices: v2,
                    texcoords: t2,
                },
            ) => vertices == v2 && texcoords == t2,
            (Self::Points { vertices }, Self::Points { vertices: v2 }) => vertices == v2,
            _ => false,
        }
    }
}

impl Eq for MeshEvent {}

/// A sink that stores every event it receives.
#[derive(Debug, Default, Clone)]
pub struct EventRecorder {
    events: Vec<MeshEvent>,
}

impl EventRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> &[MeshEvent] {
        &self.events
    }

    #[must_use]
    pub fn into_events(self) -> Vec<MeshEvent> {
        self.events
    }
}

impl MeshSink for EventRecorder {
    fn begin_object(&mut self, name: &str) -> CodecResult<()> {
        self.events.push(MeshEvent::BeginObject {
            name: name.to_owned(),
        });
        Ok(())
    }

    fn end_object(&mut self) -> CodecResult<()> {
        self.events.push(MeshEvent::EndObject);
        Ok(())
    }

    fn add_vertex(&mut self, x: f32, y: f32, z: f32, w: f32) -> CodecResult<()> {
        self.events.push(MeshEvent::Vertex { x, y, z, w });
        Ok(())
    }

    fn add_param_vertex(&mut self, u: f32, v: f32, w: f32, q: f32) -> CodecResult<()> {
        self.events.push(MeshEvent::ParamVertex { u, v, w, q });
        Ok(())
    }

    fn add_normal(&mut self, x: f32, y: f32, z: f32, w: f32) -> CodecResult<()> {
        self.events.push(MeshEvent::Normal { x, y, z, w });
        Ok(())
    }

    fn add_texture_vertex(&mut self, u: f32, v: f32, w: f32) -> CodecResult<()> {
        self.events.push(MeshEvent::TextureVertex { u, v, w });
        Ok(())
    }

    fn add_face(
        &mut self,
        vertices: &[i32],
        texcoords: &[i32],
        normals: &[i32],
    ) -> CodecResult<()> {
        self.events.push(MeshEvent::Face {
            vertices: vertices.to_vec(),
            texcoords: texcoords.to_vec(),
            normals: normals.to_vec(),
        });
        Ok(())
    }

    fn add_line(&mut self, vertices: &[i32], texcoords: &[i32]) -> CodecResult<()> {
        self.events.push(MeshEvent::Line {
            vertices: vertices.to_vec(),
            texcoords: texcoords.to_vec(),
        });
        Ok(())
    }

    fn add_points(&mut self, vertices: &[i32]) -> CodecResult<()> {
        self.events.push(MeshEvent::Points {
            vertices: vertices.to_vec(),
        });
        Ok(())
    }

    fn end_of_data(&mut self) -> CodecResult<()> {
        self.events.push(MeshEvent::EndOfData);
        Ok(())
    }
}
