use std::{fs, path::Path};

use eframe::glow;
use glam::{Mat3, Mat4, Vec3};

use crate::error::ShaderError;

use super::subroutine::{resolve_indices, SubroutineFns};

/// A value that can be uploaded to a named uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uniform {
    Bool(bool),
    I32(i32),
    Vec3(Vec3),
    Mat3(Mat3),
    Mat4(Mat4),
}

/// Which lighting terms the model shader should evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadingTerms {
    pub diffuse: bool,
    pub specular: bool,
}

impl ShadingTerms {
    /// Subroutine implementations to select, in subroutine uniform location order.
    pub fn subroutine_names(&self) -> [&'static str; 2] {
        [
            if self.diffuse { "DiffuseEnabled" } else { "Disabled" },
            if self.specular { "SpecularEnabled" } else { "Disabled" },
        ]
    }

    pub fn bool_uniforms(&self) -> [(&'static str, Uniform); 2] {
        [
            ("u_adsProps.diffuseEnabled", Uniform::Bool(self.diffuse)),
            ("u_adsProps.specularEnabled", Uniform::Bool(self.specular)),
        ]
    }
}

/// How lighting terms get switched on a given context.
#[derive(Debug, Clone, Copy)]
pub enum ShadingStrategy {
    /// Dynamic subroutine selection in the fragment stage (desktop GL 4.3+).
    Subroutines(SubroutineFns),
    /// Boolean uniforms read by branches in the shader (GL 3.3, GLES 3).
    BoolUniforms,
}

/// Owns one linked program. Not `Clone`: the handle is released exactly once by [`Shader::destroy`].
#[derive(Debug)]
pub struct Shader {
    program: Option<glow::Program>,
    strategy: ShadingStrategy,
}

impl Shader {
    pub fn from_files(
        gl: &glow::Context,
        vtx_path: &Path,
        frag_path: &Path,
        strategy: ShadingStrategy,
    ) -> Result<Self, ShaderError> {
        let read = |path: &Path| {
            fs::read_to_string(path).map_err(|source| ShaderError::Read {
                path: path.to_path_buf(),
                source,
            })
        };
        let vtx = read(vtx_path)?;
        let frag = read(frag_path)?;

        log::debug!(
            "Compiling shader program {} + {}",
            vtx_path.display(),
            frag_path.display()
        );
        Self::from_src(gl, &vtx, &frag, strategy).inspect_err(|e| {
            log::error!("{} / {}: {e}", vtx_path.display(), frag_path.display())
        })
    }

    pub fn from_src(
        gl: &glow::Context,
        vtx: &str,
        frag: &str,
        strategy: ShadingStrategy,
    ) -> Result<Self, ShaderError> {
        use glow::HasContext as _;

        unsafe {
            let program = gl.create_program().map_err(ShaderError::Create)?;

            let shader_sources = [
                (glow::VERTEX_SHADER, "vertex", vtx),
                (glow::FRAGMENT_SHADER, "fragment", frag),
            ];

            let mut shaders = Vec::with_capacity(shader_sources.len());
            let mut result = Ok(());
            for (shader_type, stage, source) in shader_sources {
                let shader = match gl.create_shader(shader_type) {
                    Ok(shader) => shader,
                    Err(e) => {
                        result = Err(ShaderError::Create(e));
                        break;
                    }
                };
                gl.shader_source(shader, source);
                gl.compile_shader(shader);
                shaders.push(shader);
                if !gl.get_shader_compile_status(shader) {
                    result = Err(ShaderError::Compile {
                        stage,
                        log: gl.get_shader_info_log(shader),
                    });
                    break;
                }
                gl.attach_shader(program, shader);
            }

            if result.is_ok() {
                gl.link_program(program);
                if !gl.get_program_link_status(program) {
                    result = Err(ShaderError::Link(gl.get_program_info_log(program)));
                }
            }

            for shader in shaders {
                gl.detach_shader(program, shader);
                gl.delete_shader(shader);
            }

            match result {
                Ok(()) => Ok(Self {
                    program: Some(program),
                    strategy,
                }),
                Err(e) => {
                    gl.delete_program(program);
                    Err(e)
                }
            }
        }
    }

    pub fn use_program(&self, gl: &glow::Context) {
        unsafe {
            use glow::HasContext as _;

            gl.use_program(self.program);
        }
    }

    /// Uploads to the active program. Names the linker optimised away or that were never declared
    /// are skipped.
    pub fn set_uniform(&self, gl: &glow::Context, name: &str, uniform: Uniform) {
        use glow::HasContext as _;

        let Some(program) = self.program else {
            return;
        };
        unsafe {
            let Some(location) = gl.get_uniform_location(program, name) else {
                log::trace!("uniform {name} not found in program, skipping upload");
                return;
            };
            let location = Some(&location);
            match uniform {
                Uniform::Bool(uniform) => gl.uniform_1_i32(location, uniform as i32),
                Uniform::I32(uniform) => gl.uniform_1_i32(location, uniform),
                Uniform::Vec3(uniform) => gl.uniform_3_f32_slice(location, &uniform.to_array()),
                Uniform::Mat3(uniform) => {
                    gl.uniform_matrix_3_f32_slice(location, false, &uniform.to_cols_array())
                }
                Uniform::Mat4(uniform) => {
                    gl.uniform_matrix_4_f32_slice(location, false, &uniform.to_cols_array())
                }
            }
        }
    }

    /// Resolves each subroutine name in `stage` and uploads the whole index array in one call.
    /// Only valid after [`Shader::use_program`]. Nothing is uploaded if any name is unknown.
    pub fn update_subroutines(&self, stage: u32, names: &[&str]) {
        let (Some(program), ShadingStrategy::Subroutines(fns)) = (self.program, self.strategy) else {
            log::trace!("program does not use subroutines, ignoring selection");
            return;
        };
        unsafe {
            match resolve_indices(names, |name| fns.index(program, stage, name)) {
                Ok(indices) => fns.upload(stage, &indices),
                Err(name) => log::warn!("subroutine {name} not found, keeping previous selection"),
            }
        }
    }

    pub fn select_shading_terms(&self, gl: &glow::Context, terms: ShadingTerms) {
        match self.strategy {
            ShadingStrategy::Subroutines(_) => {
                self.update_subroutines(glow::FRAGMENT_SHADER, &terms.subroutine_names())
            }
            ShadingStrategy::BoolUniforms => {
                for (name, uniform) in terms.bool_uniforms() {
                    self.set_uniform(gl, name, uniform);
                }
            }
        }
    }

    pub fn destroy(&mut self, gl: &glow::Context) {
        if let Some(program) = self.program.take() {
            unsafe {
                use glow::HasContext as _;

                gl.delete_program(program);
            }
        }
    }
}
