use std::{
    mem::size_of,
    path::{Path, PathBuf},
};

use eframe::glow;
use serde::Deserialize;
use zerocopy::AsBytes;

use crate::{error::AssetError, gfx::GlResource};

/// Indices drawn for the 12 triangles of the cube.
pub const SKYBOX_INDEX_COUNT: usize = 36;

#[rustfmt::skip]
const CUBE_VERTICES: [f32; 24] = [
    -1.0,  1.0, -1.0,
    -1.0, -1.0, -1.0,
     1.0, -1.0, -1.0,
     1.0,  1.0, -1.0,
    -1.0,  1.0,  1.0,
    -1.0, -1.0,  1.0,
     1.0, -1.0,  1.0,
     1.0,  1.0,  1.0,
];

// Wound to face inwards, the camera always sits inside the cube.
#[rustfmt::skip]
const CUBE_INDICES: [u32; SKYBOX_INDEX_COUNT] = [
    0, 1, 2, 2, 3, 0, // back   (-Z)
    5, 1, 0, 0, 4, 5, // left   (-X)
    2, 6, 7, 7, 3, 2, // right  (+X)
    5, 4, 7, 7, 6, 5, // front  (+Z)
    0, 3, 7, 7, 4, 0, // top    (+Y)
    1, 5, 2, 2, 5, 6, // bottom (-Y)
];

/// The six face images of a skybox.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SkyboxConfig {
    pub right: PathBuf,
    pub left: PathBuf,
    pub top: PathBuf,
    pub bottom: PathBuf,
    pub front: PathBuf,
    pub back: PathBuf,
}

impl SkyboxConfig {
    pub fn from_dir(dir: &Path, extension: &str) -> Self {
        let face = |name: &str| dir.join(format!("{name}.{extension}"));
        Self {
            right: face("right"),
            left: face("left"),
            top: face("top"),
            bottom: face("bottom"),
            front: face("front"),
            back: face("back"),
        }
    }

    /// Faces in cube map target order: +X, -X, +Y, -Y, +Z, -Z.
    pub fn faces(&self) -> [&Path; 6] {
        [
            &self.right,
            &self.left,
            &self.top,
            &self.bottom,
            &self.front,
            &self.back,
        ]
    }
}

impl Default for SkyboxConfig {
    fn default() -> Self {
        Self::from_dir(Path::new("assets/skybox"), "png")
    }
}

/// Decoded RGB8 face pixels, all of the same square size.
#[derive(Debug, Clone)]
pub struct CubemapImages {
    pub size: u32,
    pub faces: [Vec<u8>; 6],
}

impl CubemapImages {
    pub fn load(config: &SkyboxConfig) -> Result<Self, AssetError> {
        let mut size = None;
        let mut faces: [Vec<u8>; 6] = Default::default();

        for (slot, path) in faces.iter_mut().zip(config.faces()) {
            let img = image::open(path)
                .map_err(|source| AssetError::Image {
                    path: path.to_path_buf(),
                    source,
                })?
                .to_rgb8();
            let (width, height) = img.dimensions();
            let expected = *size.get_or_insert(width);
            if width != height || width != expected {
                return Err(AssetError::FaceSize {
                    path: path.to_path_buf(),
                    width,
                    height,
                    expected,
                });
            }
            log::debug!("{}: loaded {width}x{height} skybox face", path.display());
            *slot = img.into_raw();
        }

        Ok(Self {
            size: size.unwrap_or(0),
            faces,
        })
    }
}

/// Textured cube drawn around the camera as the scene background.
#[derive(Debug)]
pub struct Skybox {
    images: CubemapImages,

    vao: Option<glow::VertexArray>,
    vbo: Option<glow::Buffer>,
    ebo: Option<glow::Buffer>,
    texture: Option<glow::Texture>,
}

impl Skybox {
    /// Loads the faces listed in `config` and uploads the cube and its cube map.
    pub fn build(gl: &glow::Context, config: &SkyboxConfig) -> Result<Self, AssetError> {
        let mut skybox = Self {
            images: CubemapImages::load(config)?,
            vao: None,
            vbo: None,
            ebo: None,
            texture: None,
        };
        if let Err(e) = skybox.setup_gl(gl) {
            skybox.destroy_gl(gl);
            return Err(e);
        }
        log::info!("Created {0}x{0} skybox", skybox.images.size);
        Ok(skybox)
    }

    pub fn vertex_array(&self) -> Option<glow::VertexArray> {
        self.vao
    }

    pub fn texture(&self) -> Option<glow::Texture> {
        self.texture
    }
}

impl GlResource for Skybox {
    fn setup_gl(&mut self, gl: &glow::Context) -> Result<(), AssetError> {
        if self.vao.is_some() {
            log::warn!("Skybox GPU buffers already created");
            return Ok(());
        }

        unsafe {
            use glow::HasContext as _;

            let vao = gl.create_vertex_array().map_err(AssetError::Gpu)?;
            self.vao = Some(vao);
            let vbo = gl.create_buffer().map_err(AssetError::Gpu)?;
            self.vbo = Some(vbo);
            let ebo = gl.create_buffer().map_err(AssetError::Gpu)?;
            self.ebo = Some(ebo);

            gl.bind_vertex_array(self.vao);
            gl.bind_buffer(glow::ARRAY_BUFFER, self.vbo);
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                CUBE_VERTICES.as_bytes(),
                glow::STATIC_DRAW,
            );
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, self.ebo);
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                CUBE_INDICES.as_bytes(),
                glow::STATIC_DRAW,
            );
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, 3 * size_of::<f32>() as i32, 0);
            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);

            let texture = gl.create_texture().map_err(AssetError::Gpu)?;
            self.texture = Some(texture);
            gl.bind_texture(glow::TEXTURE_CUBE_MAP, self.texture);
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            let size = self.images.size as i32;
            for (i, face) in self.images.faces.iter().enumerate() {
                gl.tex_image_2d(
                    glow::TEXTURE_CUBE_MAP_POSITIVE_X + i as u32,
                    0,
                    glow::RGB8 as i32,
                    size,
                    size,
                    0,
                    glow::RGB,
                    glow::UNSIGNED_BYTE,
                    Some(face.as_slice()),
                );
            }
            for (param, value) in [
                (glow::TEXTURE_MIN_FILTER, glow::LINEAR),
                (glow::TEXTURE_MAG_FILTER, glow::LINEAR),
                (glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE),
                (glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE),
                (glow::TEXTURE_WRAP_R, glow::CLAMP_TO_EDGE),
            ] {
                gl.tex_parameter_i32(glow::TEXTURE_CUBE_MAP, param, value as i32);
            }
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 4);
            gl.bind_texture(glow::TEXTURE_CUBE_MAP, None);
        }
        Ok(())
    }

    fn destroy_gl(&mut self, gl: &glow::Context) {
        unsafe {
            use glow::HasContext as _;

            if let Some(vao) = self.vao.take() {
                gl.delete_vertex_array(vao);
            }
            if let Some(vbo) = self.vbo.take() {
                gl.delete_buffer(vbo);
            }
            if let Some(ebo) = self.ebo.take() {
                gl.delete_buffer(ebo);
            }
            if let Some(texture) = self.texture.take() {
                gl.delete_texture(texture);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn write_face(dir: &Path, name: &str, width: u32, height: u32) {
        image::RgbImage::from_pixel(width, height, image::Rgb([10, 20, 30]))
            .save(dir.join(format!("{name}.png")))
            .unwrap();
    }

    #[test]
    fn faces_are_in_cube_map_order() {
        let config = SkyboxConfig::from_dir(Path::new("sky"), "jpg");
        let names: Vec<_> = config
            .faces()
            .iter()
            .map(|p| p.file_stem().unwrap().to_str().unwrap().to_owned())
            .collect();
        assert_eq!(names, ["right", "left", "top", "bottom", "front", "back"]);
    }

    #[test]
    fn loads_six_square_faces() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["right", "left", "top", "bottom", "front", "back"] {
            write_face(dir.path(), name, 4, 4);
        }
        let images = CubemapImages::load(&SkyboxConfig::from_dir(dir.path(), "png")).unwrap();
        assert_eq!(images.size, 4);
        assert!(images.faces.iter().all(|f| f.len() == 4 * 4 * 3));
        assert_eq!(&images.faces[5][..3], &[10, 20, 30]);
    }

    #[test]
    fn mismatched_face_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["right", "left", "top", "bottom", "front"] {
            write_face(dir.path(), name, 4, 4);
        }
        write_face(dir.path(), "back", 8, 8);
        let err = CubemapImages::load(&SkyboxConfig::from_dir(dir.path(), "png")).unwrap_err();
        assert!(matches!(err, AssetError::FaceSize { expected: 4, width: 8, .. }));
    }

    #[test]
    fn missing_face_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_face(dir.path(), "right", 2, 2);
        let err = CubemapImages::load(&SkyboxConfig::from_dir(dir.path(), "png")).unwrap_err();
        match err {
            AssetError::Image { path, .. } => assert!(path.ends_with("left.png")),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn cube_triangles_face_inwards() {
        let vertex = |i: u32| Vec3::from_slice(&CUBE_VERTICES[i as usize * 3..i as usize * 3 + 3]);
        for tri in CUBE_INDICES.chunks_exact(3) {
            let (a, b, c) = (vertex(tri[0]), vertex(tri[1]), vertex(tri[2]));
            let normal = (b - a).cross(c - a);
            let centre = (a + b + c) / 3.0;
            assert!(normal.dot(centre) < 0.0, "triangle {tri:?} faces outwards");
        }
    }
}
