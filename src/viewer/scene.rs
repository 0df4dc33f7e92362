use std::path::PathBuf;

use eframe::glow;

use crate::{
    config::ViewerConfig,
    error::{AssetError, ViewerError},
    gfx::{
        renderer::Viewport, subroutine::ProcAddressLoader, Camera, DrawProperties, GlResource,
        Mesh, Renderer, Skybox,
    },
};

/// The models the user can pick between. Built once at startup, never empty.
#[derive(Debug)]
pub struct ModelCollection {
    models: Vec<Mesh>,
}

impl ModelCollection {
    pub fn new(models: Vec<Mesh>) -> Result<Self, AssetError> {
        if models.is_empty() {
            return Err(AssetError::NoModels);
        }
        Ok(Self { models })
    }

    /// Loads every path in order. The first failure aborts the whole collection.
    pub fn load(paths: &[PathBuf]) -> Result<Self, AssetError> {
        let models = paths
            .iter()
            .map(|path| Mesh::from_obj(path))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(models)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Nearest valid index to `index`.
    pub fn clamp_index(&self, index: usize) -> usize {
        index.min(self.models.len() - 1)
    }

    /// The model a given `selected_model_index` refers to.
    pub fn active(&self, index: usize) -> &Mesh {
        &self.models[self.clamp_index(index)]
    }

    pub fn names(&self) -> Vec<String> {
        self.models.iter().map(|model| model.name.clone()).collect()
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut Mesh> {
        self.models.iter_mut()
    }
}

/// Everything that lives on the GPU: the renderer, the model collection and the skybox.
#[derive(Debug)]
pub struct Scene {
    renderer: Renderer,
    models: ModelCollection,
    skybox: Skybox,
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//                                               Building the Scene                                                  //
///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

impl Scene {
    /// Compiles the programs and loads every asset. Nothing is left allocated on failure.
    pub fn new(
        gl: &glow::Context,
        get_proc_address: Option<ProcAddressLoader<'_>>,
        config: &ViewerConfig,
    ) -> Result<Self, ViewerError> {
        let mut models = ModelCollection::load(&config.models)?;
        let mut renderer = Renderer::init(gl, get_proc_address, &config.shader_dir)?;

        let mut uploaded = Ok(());
        for model in models.iter_mut() {
            uploaded = model.setup_gl(gl);
            if uploaded.is_err() {
                break;
            }
        }
        let skybox = uploaded.and_then(|()| Skybox::build(gl, &config.skybox));

        match skybox {
            Ok(skybox) => {
                log::info!("Scene ready with {} models", models.len());
                Ok(Self {
                    renderer,
                    models,
                    skybox,
                })
            }
            Err(e) => {
                models.iter_mut().for_each(|model| model.destroy_gl(gl));
                renderer.destroy(gl);
                Err(e.into())
            }
        }
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//                                            Outer Scene Interfacing                                                //
///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

impl Scene {
    pub fn models(&self) -> &ModelCollection {
        &self.models
    }

    /// Draws one frame: clear, the selected model, then the skybox behind it.
    pub fn paint(
        &mut self,
        gl: &glow::Context,
        viewport: Viewport,
        camera: &Camera,
        props: &DrawProperties,
    ) {
        self.renderer.prepare_draw(gl, viewport, props);
        self.renderer
            .draw_model(gl, self.models.active(props.selected_model_index), camera, props);
        if props.skybox_enabled {
            self.renderer.draw_skybox(gl, &self.skybox, camera);
        }
    }

    pub fn destroy_gl(&mut self, gl: &glow::Context) {
        self.models.iter_mut().for_each(|model| model.destroy_gl(gl));
        self.skybox.destroy_gl(gl);
        self.renderer.destroy(gl);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::Vertex;
    use glam::{Vec2, Vec3};

    fn triangle(name: &str, scale: f32) -> Mesh {
        let verts = [Vec3::ZERO, Vec3::X, Vec3::Y]
            .map(|p| Vertex::new(p * scale, Vec3::Z, Vec2::ZERO))
            .to_vec();
        Mesh::from_geometry(name, verts, vec![0, 1, 2])
    }

    fn collection() -> ModelCollection {
        ModelCollection::new(vec![
            triangle("cube", 1.0),
            triangle("teapot", 2.0),
            triangle("bunny", 3.0),
        ])
        .unwrap()
    }

    #[test]
    fn selected_index_picks_that_model() {
        let models = collection();
        for (i, name) in ["cube", "teapot", "bunny"].iter().enumerate() {
            let props = DrawProperties {
                selected_model_index: i,
                ..Default::default()
            };
            let active = models.active(props.selected_model_index);
            assert_eq!(active.name, *name);
            assert_eq!(active.vertices()[1].pos, [i as f32 + 1.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn out_of_range_index_is_clamped() {
        let models = collection();
        assert_eq!(models.clamp_index(7), 2);
        assert_eq!(models.active(usize::MAX).name, "bunny");
    }

    #[test]
    fn empty_collection_is_rejected() {
        assert!(matches!(
            ModelCollection::new(Vec::new()),
            Err(AssetError::NoModels)
        ));
        assert!(matches!(
            ModelCollection::load(&[]),
            Err(AssetError::NoModels)
        ));
    }

    #[test]
    fn names_keep_load_order() {
        assert_eq!(collection().names(), ["cube", "teapot", "bunny"]);
    }

    #[test]
    fn first_missing_path_fails_the_load() {
        let err = ModelCollection::load(&[PathBuf::from("missing/one.obj")]).unwrap_err();
        assert!(matches!(err, AssetError::Mesh { .. }));
    }
}
