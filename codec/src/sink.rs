//! Consumer interface for mesh events.

use crate::error::CodecResult;

/// Index value marking an absent texture coordinate or normal.
pub const ABSENT: i32 = -1;

/// Receives geometry events, in stream order.
///
/// The decoder calls these as it reads a stream; the [`Encoder`](crate::Encoder)
/// implements it so a decoded stream can be fed straight back into a new
/// encoder. Returning an error aborts the decode loop.
///
/// Index slices passed by the decoder always have one entry per vertex;
/// absent texture coordinate and normal indices are [`ABSENT`].
pub trait MeshSink {
    fn begin_object(&mut self, name: &str) -> CodecResult<()>;

    fn end_object(&mut self) -> CodecResult<()>;

    fn add_vertex(&mut self, x: f32, y: f32, z: f32, w: f32) -> CodecResult<()>;

    fn add_param_vertex(&mut self, u: f32, v: f32, w: f32, q: f32) -> CodecResult<()>;

    fn add_normal(&mut self, x: f32, y: f32, z: f32, w: f32) -> CodecResult<()>;

    fn add_texture_vertex(&mut self, u: f32, v: f32, w: f32) -> CodecResult<()>;

    fn add_face(
        &mut self,
        vertices: &[i32],
        texcoords: &[i32],
        normals: &[i32],
    ) -> CodecResult<()>;

    fn add_line(&mut self, vertices: &[i32], texcoords: &[i32]) -> CodecResult<()>;

    fn add_points(&mut self, vertices: &[i32]) -> CodecResult<()>;

    /// Called once after the last event of a stream.
    fn end_of_data(&mut self) -> CodecResult<()> {
        Ok(())
    }
}
