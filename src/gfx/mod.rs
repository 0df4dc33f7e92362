pub mod camera;
pub mod draw_properties;
pub mod mesh;
pub mod renderer;
pub mod shader;
pub mod skybox;
pub mod subroutine;
pub mod vertex;

pub use camera::Camera;
pub use draw_properties::DrawProperties;
pub use mesh::Mesh;
pub use renderer::Renderer;
pub use shader::Shader;
pub use skybox::{Skybox, SkyboxConfig};
pub use vertex::Vertex;

use eframe::glow;

use crate::error::AssetError;

/// Something that owns GPU objects. `destroy_gl` must release every handle exactly once and be
/// harmless to call again.
pub trait GlResource {
    fn setup_gl(&mut self, gl: &glow::Context) -> Result<(), AssetError>;
    fn destroy_gl(&mut self, gl: &glow::Context);
}

/// The flavour of GL the context speaks. Decides which shader files are loaded and how lighting
/// terms are switched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlBackend {
    /// Desktop OpenGL 4.3+.
    Gl4,
    /// Desktop OpenGL 3.3 to 4.2.
    Gl3,
    /// OpenGL ES 3.x / WebGL 2.
    Gles3,
}

impl GlBackend {
    pub fn detect(version: &glow::Version) -> Option<Self> {
        let v = (version.major, version.minor);
        match (version.is_embedded, v) {
            (true, v) if v >= (3, 0) => Some(Self::Gles3),
            (false, v) if v >= (4, 3) => Some(Self::Gl4),
            (false, v) if v >= (3, 3) => Some(Self::Gl3),
            _ => None,
        }
    }

    /// Suffix of the shader files written for this backend, e.g. `model_gl4.vert.glsl`.
    pub fn shader_suffix(&self) -> &'static str {
        match self {
            Self::Gl4 => "gl4",
            Self::Gl3 => "gl3",
            Self::Gles3 => "gles3",
        }
    }

    /// Whether this backend's model shader switches lighting terms through subroutines.
    pub fn uses_subroutines(&self) -> bool {
        matches!(self, Self::Gl4)
    }

    /// Drops to the GL 3.3 shaders when the subroutine entry points could not be loaded. A 4.3
    /// context compiles `#version 330` sources just fine.
    pub fn with_subroutine_support(self, loaded: bool) -> Self {
        match self {
            Self::Gl4 if !loaded => Self::Gl3,
            backend => backend,
        }
    }

    /// `glPolygonMode` does not exist in GLES.
    pub fn supports_polygon_mode(&self) -> bool {
        !matches!(self, Self::Gles3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(major: u32, minor: u32, is_embedded: bool) -> glow::Version {
        glow::Version {
            major,
            minor,
            is_embedded,
            revision: None,
            vendor_info: String::new(),
        }
    }

    #[test]
    fn backend_detection() {
        assert_eq!(GlBackend::detect(&version(4, 6, false)), Some(GlBackend::Gl4));
        assert_eq!(GlBackend::detect(&version(4, 3, false)), Some(GlBackend::Gl4));
        assert_eq!(GlBackend::detect(&version(4, 1, false)), Some(GlBackend::Gl3));
        assert_eq!(GlBackend::detect(&version(3, 3, false)), Some(GlBackend::Gl3));
        assert_eq!(GlBackend::detect(&version(3, 0, true)), Some(GlBackend::Gles3));
        assert_eq!(GlBackend::detect(&version(3, 2, false)), None);
        assert_eq!(GlBackend::detect(&version(2, 0, true)), None);
    }

    #[test]
    fn only_gl4_uses_subroutines() {
        assert!(GlBackend::Gl4.uses_subroutines());
        assert!(!GlBackend::Gl3.uses_subroutines());
        assert!(!GlBackend::Gles3.uses_subroutines());
        assert!(!GlBackend::Gles3.supports_polygon_mode());
    }

    #[test]
    fn gl4_without_entry_points_uses_gl3_shaders() {
        assert_eq!(GlBackend::Gl4.with_subroutine_support(true), GlBackend::Gl4);
        assert_eq!(GlBackend::Gl4.with_subroutine_support(false), GlBackend::Gl3);
        assert_eq!(GlBackend::Gles3.with_subroutine_support(false), GlBackend::Gles3);
        assert_eq!(GlBackend::Gl3.with_subroutine_support(true), GlBackend::Gl3);
    }

    fn model_fragment_source(backend: GlBackend) -> &'static str {
        match backend {
            GlBackend::Gl4 => include_str!("../../assets/shaders/model_gl4.frag.glsl"),
            GlBackend::Gl3 => include_str!("../../assets/shaders/model_gl3.frag.glsl"),
            GlBackend::Gles3 => include_str!("../../assets/shaders/model_gles3.frag.glsl"),
        }
    }

    #[test]
    fn model_shaders_declare_what_their_backend_uploads() {
        let toggles = [(false, false), (true, false), (false, true), (true, true)];
        for backend in [GlBackend::Gl4, GlBackend::Gl3, GlBackend::Gles3] {
            let source = model_fragment_source(backend);
            for (diffuse, specular) in toggles {
                let terms = shader::ShadingTerms { diffuse, specular };
                if backend.uses_subroutines() {
                    for name in terms.subroutine_names() {
                        let declaration = format!("subroutine(LightTerm) vec3 {name}(");
                        assert!(source.contains(&declaration), "{backend:?} lacks {name}");
                    }
                } else {
                    assert!(source.contains("uniform AdsProps u_adsProps;"), "{backend:?}");
                    for (name, _) in terms.bool_uniforms() {
                        let field = name.trim_start_matches("u_adsProps.");
                        assert!(source.contains(&format!("bool {field};")), "{backend:?} lacks {field}");
                    }
                }
            }
        }

        // One subroutine uniform per uploaded index, at locations 0 and 1.
        let gl4 = model_fragment_source(GlBackend::Gl4);
        let names = shader::ShadingTerms {
            diffuse: true,
            specular: true,
        }
        .subroutine_names();
        assert_eq!(gl4.matches("subroutine uniform LightTerm").count(), names.len());
        assert!(gl4.contains("layout(location = 0) subroutine uniform"));
        assert!(gl4.contains("layout(location = 1) subroutine uniform"));
    }
}
