use std::{
    fs::File,
    io::{BufRead, BufReader},
    mem::{offset_of, size_of},
    path::Path,
};

use eframe::glow;
use glam::{Vec2, Vec3};
use zerocopy::AsBytes;

use crate::{
    error::AssetError,
    gfx::{GlResource, Vertex},
};

/// A loaded model: triangle list geometry plus the GPU buffers it is uploaded into.
#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    verts: Vec<Vertex>,
    indices: Vec<u32>,

    vao: Option<glow::VertexArray>,
    vbo: Option<glow::Buffer>,
    ebo: Option<glow::Buffer>,
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//                                               Creation Functions                                                  //
///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

impl Mesh {
    pub fn from_geometry(name: impl Into<String>, verts: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            verts,
            indices,
            vao: None,
            vbo: None,
            ebo: None,
        }
    }

    /// Loads a Wavefront OBJ file. Every object in the file is merged into one mesh.
    pub fn from_obj(path: &Path) -> Result<Self, AssetError> {
        let file = File::open(path).map_err(|e| {
            log::debug!("{}: {e}", path.display());
            AssetError::Mesh {
                path: path.to_path_buf(),
                source: tobj::LoadError::OpenFileFailed,
            }
        })?;
        let mesh = Self::from_obj_reader(path, &mut BufReader::new(file))?;
        log::info!(
            "{}: loaded {} vertices, {} triangles",
            path.display(),
            mesh.vertices().len(),
            mesh.index_count() / 3
        );
        Ok(mesh)
    }

    /// Parses OBJ text from `reader`. `origin` names the mesh (by file stem) and labels errors.
    /// Material libraries are not resolved.
    pub fn from_obj_reader<R: BufRead>(
        origin: impl AsRef<Path>,
        reader: &mut R,
    ) -> Result<Self, AssetError> {
        let origin = origin.as_ref();
        let (models, _materials) =
            tobj::load_obj_buf(reader, &tobj::GPU_LOAD_OPTIONS, |_| {
                Err(tobj::LoadError::OpenFileFailed)
            })
            .map_err(|source| AssetError::Mesh {
                path: origin.to_path_buf(),
                source,
            })?;

        let name = origin
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| origin.display().to_string());

        let mesh = Self::from_tobj(name, &models);
        if mesh.indices.is_empty() {
            return Err(AssetError::EmptyMesh(origin.to_path_buf()));
        }
        Ok(mesh)
    }

    fn from_tobj(name: String, models: &[tobj::Model]) -> Self {
        let mut verts = Vec::new();
        let mut indices = Vec::new();

        for model in models {
            let mesh = &model.mesh;
            let base = verts.len() as u32;
            let vertex_count = mesh.positions.len() / 3;
            let has_normals = mesh.normals.len() == mesh.positions.len();
            let has_uvs = mesh.texcoords.len() / 2 == vertex_count;

            let normals = if has_normals {
                mesh.normals
                    .chunks_exact(3)
                    .map(Vec3::from_slice)
                    .collect()
            } else {
                log::debug!("{}: no normals in file, generating smooth normals", model.name);
                smooth_normals(&mesh.positions, &mesh.indices)
            };

            for i in 0..vertex_count {
                let pos = Vec3::from_slice(&mesh.positions[i * 3..i * 3 + 3]);
                let uv = if has_uvs {
                    Vec2::from_slice(&mesh.texcoords[i * 2..i * 2 + 2])
                } else {
                    Vec2::ZERO
                };
                verts.push(Vertex::new(pos, normals[i], uv));
            }
            indices.extend(mesh.indices.iter().map(|&index| base + index));
        }

        Self::from_geometry(name, verts, indices)
    }
}

/// Area-weighted vertex normals for an indexed triangle list.
fn smooth_normals(positions: &[f32], indices: &[u32]) -> Vec<Vec3> {
    let pos = |i: u32| Vec3::from_slice(&positions[i as usize * 3..i as usize * 3 + 3]);
    let mut normals = vec![Vec3::ZERO; positions.len() / 3];

    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0], tri[1], tri[2]);
        let face = (pos(b) - pos(a)).cross(pos(c) - pos(a));
        normals[a as usize] += face;
        normals[b as usize] += face;
        normals[c as usize] += face;
    }

    normals.iter().map(|n| n.normalize_or_zero()).collect()
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//                                              Get / Set Functions                                                  //
///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

impl Mesh {
    pub fn vertices(&self) -> &[Vertex] {
        &self.verts
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// `None` until [`GlResource::setup_gl`] has run.
    pub fn vertex_array(&self) -> Option<glow::VertexArray> {
        self.vao
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//                                                  GPU Side                                                         //
///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

impl GlResource for Mesh {
    fn setup_gl(&mut self, gl: &glow::Context) -> Result<(), AssetError> {
        // Do not setup twice!
        if self.vao.is_some() {
            log::warn!("{}: GPU buffers already created", self.name);
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
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, self.verts.as_bytes(), glow::STATIC_DRAW);

            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, self.ebo);
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                self.indices.as_bytes(),
                glow::STATIC_DRAW,
            );

            let stride = size_of::<Vertex>() as i32;
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);

            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(
                1,
                3,
                glow::FLOAT,
                false,
                stride,
                offset_of!(Vertex, nrm) as _,
            );

            gl.enable_vertex_attrib_array(2);
            gl.vertex_attrib_pointer_f32(
                2,
                2,
                glow::FLOAT,
                false,
                stride,
                offset_of!(Vertex, uv) as _,
            );

            // The element buffer binding is part of the vertex array state, so unbind the array first
            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);
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
        }
    }
}
