//! Reusable scratch buffers for decoding.

use crate::sink::ABSENT;

/// Index and name buffers reused across elements of a stream.
#[derive(Debug, Default)]
pub struct DecodeScratch {
    vertices: Vec<i32>,
    texcoords: Vec<i32>,
    normals: Vec<i32>,
    name: Vec<u8>,
}

impl DecodeScratch {
    /// Creates a new scratch buffer with no pre-allocated capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Three index lists of `count` entries, texture coordinates and normals
    /// pre-filled with [`ABSENT`].
    pub(crate) fn index_lists_mut(
        &mut self,
        count: usize,
    ) -> (&mut [i32], &mut [i32], &mut [i32]) {
        for list in [&mut self.vertices, &mut self.texcoords, &mut self.normals] {
            list.clear();
            list.resize(count, ABSENT);
        }
        (&mut self.vertices, &mut self.texcoords, &mut self.normals)
    }

    pub(crate) fn name_mut(&mut self) -> &mut Vec<u8> {
        self.name.clear();
        &mut self.name
    }
}
