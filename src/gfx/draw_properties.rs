use super::shader::ShadingTerms;

/// Everything the settings panel can change. Written by the overlay each frame, then read by
/// the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawProperties {
    pub background_color: [f32; 3],
    pub model_color: [f32; 3],
    /// Euler angles in degrees around X, Y and Z.
    pub model_rotation: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub light_direction: [f32; 3],
    pub diffuse_enabled: bool,
    pub specular_enabled: bool,
    pub wireframe_mode_enabled: bool,
    pub skybox_enabled: bool,
    pub selected_model_index: usize,
}

impl Default for DrawProperties {
    fn default() -> Self {
        Self {
            background_color: [0.1, 0.1, 0.12],
            model_color: [0.83, 0.69, 0.22],
            model_rotation: [0.0, 0.0, 0.0],
            fov: 60.0,
            light_direction: [-0.5, -1.0, -0.3],
            diffuse_enabled: true,
            specular_enabled: true,
            wireframe_mode_enabled: false,
            skybox_enabled: true,
            selected_model_index: 0,
        }
    }
}

impl DrawProperties {
    pub const FOV_RANGE: std::ops::RangeInclusive<f32> = 20.0..=120.0;

    pub fn shading_terms(&self) -> ShadingTerms {
        ShadingTerms {
            diffuse: self.diffuse_enabled,
            specular: self.specular_enabled,
        }
    }
}
