use zerocopy::{AsBytes, FromBytes, FromZeroes};

/// Interleaved model vertex as laid out in the vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, AsBytes, FromBytes, FromZeroes)]
#[repr(C)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub nrm: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn new(pos: glam::Vec3, nrm: glam::Vec3, uv: glam::Vec2) -> Self {
        Self {
            pos: pos.to_array(),
            nrm: nrm.normalize_or_zero().to_array(),
            uv: uv.to_array(),
        }
    }
}
