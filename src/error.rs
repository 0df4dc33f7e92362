use std::path::PathBuf;

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//                                         Errors Arising During Startup                                             //
///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("could not read shader source {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not create {0}")]
    Create(String),
    #[error("failed to compile {stage} shader:\n{log}")]
    Compile { stage: &'static str, log: String },
    #[error("failed to link shader program:\n{0}")]
    Link(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("unable to load mesh {}: {source}", path.display())]
    Mesh {
        path: PathBuf,
        source: tobj::LoadError,
    },
    #[error("no model paths configured, at least one model is required")]
    NoModels,
    #[error("mesh {} contains no triangles", .0.display())]
    EmptyMesh(PathBuf),
    #[error("unable to load skybox face {}: {source}", path.display())]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("skybox face {} is {width}x{height}, expected a square {expected}x{expected} image", path.display())]
    FaceSize {
        path: PathBuf,
        width: u32,
        height: u32,
        expected: u32,
    },
    #[error("could not create GPU {0}")]
    Gpu(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("unsupported OpenGL context {major}.{minor}; at least OpenGL 3.3 or OpenGL ES 3.0 is required")]
    UnsupportedContext { major: u32, minor: u32 },
    #[error(transparent)]
    Shader(#[from] ShaderError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Every way startup can fail. None of these are recoverable: the viewer refuses to run.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("the glow renderer is required but eframe did not provide a GL context")]
    NoGlContext,
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
