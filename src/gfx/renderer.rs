use std::path::Path;

use eframe::glow;
use glam::{Mat3, Mat4, Quat, Vec3};

use crate::error::RenderError;

use super::{
    shader::{ShadingStrategy, Uniform},
    skybox::SKYBOX_INDEX_COUNT,
    subroutine::{ProcAddressLoader, SubroutineFns},
    Camera, DrawProperties, GlBackend, Mesh, Shader, Skybox,
};

pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 100.0;

/// Region of the framebuffer the scene is drawn into, in physical pixels with a bottom-left
/// origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    pub fn aspect_ratio(&self) -> f32 {
        if self.width <= 0 || self.height <= 0 {
            return 1.0;
        }
        self.width as f32 / self.height as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthFunc {
    Less,
    LessEqual,
}

/// The fixed-function state a pass runs with. Every pass applies its own state and puts
/// [`RasterState::DEFAULT`] back afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterState {
    pub wireframe: bool,
    pub depth_func: DepthFunc,
}

impl RasterState {
    pub const DEFAULT: Self = Self {
        wireframe: false,
        depth_func: DepthFunc::Less,
    };

    pub fn model_pass(props: &DrawProperties) -> Self {
        Self {
            wireframe: props.wireframe_mode_enabled,
            ..Self::DEFAULT
        }
    }

    /// The skybox is drawn at maximum depth, so it has to pass against a depth buffer cleared to
    /// 1.0 while still losing against everything already drawn.
    pub fn skybox_pass() -> Self {
        Self {
            depth_func: DepthFunc::LessEqual,
            ..Self::DEFAULT
        }
    }

    fn apply(&self, gl: &glow::Context, backend: GlBackend) {
        unsafe {
            use glow::HasContext as _;

            if backend.supports_polygon_mode() {
                let mode = if self.wireframe { glow::LINE } else { glow::FILL };
                gl.polygon_mode(glow::FRONT_AND_BACK, mode);
            }
            gl.depth_func(match self.depth_func {
                DepthFunc::Less => glow::LESS,
                DepthFunc::LessEqual => glow::LEQUAL,
            });
        }
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//                                                Transform Math                                                     //
///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub fn projection_matrix(fov_degrees: f32, viewport: Viewport) -> Mat4 {
    Mat4::perspective_rh_gl(
        fov_degrees.to_radians(),
        viewport.aspect_ratio(),
        Z_NEAR,
        Z_FAR,
    )
}

/// Model rotation from Euler degrees. Each axis becomes a quaternion and they are composed as
/// `z * y * x`, so X is applied first.
pub fn model_matrix(rotation_degrees: [f32; 3]) -> Mat4 {
    let [x, y, z] = rotation_degrees.map(f32::to_radians);
    let quat_x = Quat::from_axis_angle(Vec3::X, x);
    let quat_y = Quat::from_axis_angle(Vec3::Y, y);
    let quat_z = Quat::from_axis_angle(Vec3::Z, z);
    Mat4::from_quat(quat_z * quat_y * quat_x)
}

/// Inverse-transpose of the upper 3x3, keeps normals perpendicular under non-uniform scale.
pub fn normal_matrix(model: Mat4) -> Mat3 {
    Mat3::from_mat4(model).inverse().transpose()
}

/// Drops the translation column of `view` so the skybox never gets closer as the camera moves.
pub fn skybox_projection_view(projection: Mat4, view: Mat4) -> Mat4 {
    projection * Mat4::from_mat3(Mat3::from_mat4(view))
}

/// Per-draw model uniforms, all computed on the CPU once instead of once per vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelUniforms {
    pub model: Mat4,
    pub mvp: Mat4,
    pub normal_matrix: Mat3,
    pub color: Vec3,
    pub light_direction: Vec3,
    pub view_pos: Vec3,
}

impl ModelUniforms {
    pub fn new(projection: Mat4, camera: &Camera, props: &DrawProperties) -> Self {
        let model = model_matrix(props.model_rotation);
        Self {
            model,
            mvp: projection * camera.view_matrix() * model,
            normal_matrix: normal_matrix(model),
            color: Vec3::from_array(props.model_color),
            light_direction: Vec3::from_array(props.light_direction),
            view_pos: camera.position(),
        }
    }

    pub fn uniforms(&self) -> [(&'static str, Uniform); 6] {
        [
            ("u_model", Uniform::Mat4(self.model)),
            ("u_mvp", Uniform::Mat4(self.mvp)),
            ("u_normalMatrix", Uniform::Mat3(self.normal_matrix)),
            ("u_color", Uniform::Vec3(self.color)),
            ("u_light.direction", Uniform::Vec3(self.light_direction)),
            ("u_viewPos", Uniform::Vec3(self.view_pos)),
        ]
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//                                                   Renderer                                                        //
///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Owns the model and skybox programs. Only exists once every program compiled.
#[derive(Debug)]
pub struct Renderer {
    backend: GlBackend,
    model_shader: Shader,
    skybox_shader: Shader,
    projection: Mat4,
}

impl Renderer {
    /// `get_proc_address` is needed for subroutine selection on GL 4.3+. Without it the GL 3.3
    /// shaders are used.
    pub fn init(
        gl: &glow::Context,
        get_proc_address: Option<ProcAddressLoader<'_>>,
        shader_dir: &Path,
    ) -> Result<Self, RenderError> {
        use glow::HasContext as _;

        let version = gl.version();
        let detected =
            GlBackend::detect(version).ok_or(RenderError::UnsupportedContext {
                major: version.major,
                minor: version.minor,
            })?;

        let subroutines = if detected.uses_subroutines() {
            get_proc_address.and_then(SubroutineFns::load)
        } else {
            None
        };
        let backend = detected.with_subroutine_support(subroutines.is_some());
        let strategy = match subroutines {
            Some(fns) if backend.uses_subroutines() => ShadingStrategy::Subroutines(fns),
            _ => ShadingStrategy::BoolUniforms,
        };
        log::info!(
            "OpenGL{} {}.{} ({}), using {:?} shaders",
            if version.is_embedded { " ES" } else { "" },
            version.major,
            version.minor,
            version.vendor_info,
            backend
        );

        let suffix = backend.shader_suffix();
        let program = |name: &str, strategy: ShadingStrategy| {
            Shader::from_files(
                gl,
                &shader_dir.join(format!("{name}_{suffix}.vert.glsl")),
                &shader_dir.join(format!("{name}_{suffix}.frag.glsl")),
                strategy,
            )
        };

        let mut model_shader = program("model", strategy)?;
        let skybox_shader = match program("skybox", ShadingStrategy::BoolUniforms) {
            Ok(shader) => shader,
            Err(e) => {
                model_shader.destroy(gl);
                return Err(e.into());
            }
        };

        enable_capabilities(gl);

        Ok(Self {
            backend,
            model_shader,
            skybox_shader,
            projection: Mat4::IDENTITY,
        })
    }

    /// Sets the viewport, recomputes the projection and clears colour and depth.
    pub fn prepare_draw(&mut self, gl: &glow::Context, viewport: Viewport, props: &DrawProperties) {
        self.projection = projection_matrix(props.fov, viewport);

        unsafe {
            use glow::HasContext as _;

            // The overlay resets GL state every frame, turn our capabilities back on
            enable_capabilities(gl);
            gl.viewport(viewport.x, viewport.y, viewport.width, viewport.height);
            let [r, g, b] = props.background_color;
            gl.clear_color(r, g, b, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }

    pub fn draw_model(
        &self,
        gl: &glow::Context,
        mesh: &Mesh,
        camera: &Camera,
        props: &DrawProperties,
    ) {
        let Some(vao) = mesh.vertex_array() else {
            log::warn!("{}: drawn before its GPU buffers were created", mesh.name);
            return;
        };

        let shader = &self.model_shader;
        shader.use_program(gl);

        unsafe {
            use glow::HasContext as _;

            gl.bind_vertex_array(Some(vao));
        }

        for (name, uniform) in ModelUniforms::new(self.projection, camera, props).uniforms() {
            shader.set_uniform(gl, name, uniform);
        }
        shader.select_shading_terms(gl, props.shading_terms());

        RasterState::model_pass(props).apply(gl, self.backend);
        unsafe {
            use glow::HasContext as _;

            gl.draw_elements(
                glow::TRIANGLES,
                mesh.index_count() as i32,
                glow::UNSIGNED_INT,
                0,
            );
        }
        RasterState::DEFAULT.apply(gl, self.backend);

        unsafe {
            use glow::HasContext as _;

            gl.bind_vertex_array(None);
        }
    }

    /// Must come after every opaque draw: the skybox only fills pixels nothing else covered.
    pub fn draw_skybox(&self, gl: &glow::Context, skybox: &Skybox, camera: &Camera) {
        let (Some(vao), Some(texture)) = (skybox.vertex_array(), skybox.texture()) else {
            log::warn!("skybox drawn before its GPU objects were created");
            return;
        };

        RasterState::skybox_pass().apply(gl, self.backend);

        let shader = &self.skybox_shader;
        shader.use_program(gl);

        unsafe {
            use glow::HasContext as _;

            gl.bind_vertex_array(Some(vao));
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_CUBE_MAP, Some(texture));
        }

        let projection_view = skybox_projection_view(self.projection, camera.view_matrix());
        shader.set_uniform(gl, "u_projectionView", Uniform::Mat4(projection_view));
        shader.set_uniform(gl, "u_skyboxTexture", Uniform::I32(0));

        unsafe {
            use glow::HasContext as _;

            gl.draw_elements(
                glow::TRIANGLES,
                SKYBOX_INDEX_COUNT as i32,
                glow::UNSIGNED_INT,
                0,
            );
            gl.bind_vertex_array(None);
            gl.bind_texture(glow::TEXTURE_CUBE_MAP, None);
        }

        RasterState::DEFAULT.apply(gl, self.backend);
    }

    pub fn destroy(&mut self, gl: &glow::Context) {
        self.model_shader.destroy(gl);
        self.skybox_shader.destroy(gl);
    }
}

fn enable_capabilities(gl: &glow::Context) {
    unsafe {
        use glow::HasContext as _;

        gl.enable(glow::DEPTH_TEST);
        gl.enable(glow::BLEND);
        gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
    }
}
