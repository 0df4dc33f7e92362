use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{error::ConfigError, gfx::SkyboxConfig};

pub const CONFIG_FILE: &str = "viewer.toml";

/// Startup settings. Every field has a default, so a config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub shader_dir: PathBuf,
    pub models: Vec<PathBuf>,
    pub skybox: SkyboxConfig,
    pub camera: CameraConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: f32,
    pub height: f32,
    pub resizable: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    /// Degrees.
    pub yaw: f32,
    /// Degrees, clamped to the camera's pitch limit.
    pub pitch: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            shader_dir: PathBuf::from("assets/shaders"),
            models: ["cube", "octahedron", "prism"]
                .iter()
                .map(|name| PathBuf::from(format!("assets/meshes/{name}.obj")))
                .collect(),
            skybox: SkyboxConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "3D Model Viewer".to_owned(),
            width: 1024.0,
            height: 768.0,
            resizable: false,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        // Looks back at the origin from the front right, slightly above.
        Self {
            position: [1.7, 1.3, 4.0],
            yaw: 240.0,
            pitch: -15.0,
        }
    }
}

impl ViewerConfig {
    pub fn from_toml(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(path, &contents)
    }

    /// Reads `path` when it exists, otherwise falls back to the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("{} not found, using default configuration", path.display());
            return Ok(Self::default());
        }
        log::info!("Loading configuration from {}", path.display());
        Self::load_from_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_gives_defaults() {
        let config = ViewerConfig::from_toml(Path::new("viewer.toml"), "").unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.models.len(), 3);
        assert_eq!(config.window.width, 1024.0);
        assert!(!config.window.resizable);
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let config = ViewerConfig::from_toml(
            Path::new("viewer.toml"),
            r#"
                models = ["a.obj"]

                [window]
                title = "Bunny"

                [camera]
                pitch = 10.0
            "#,
        )
        .unwrap();
        assert_eq!(config.models, [PathBuf::from("a.obj")]);
        assert_eq!(config.window.title, "Bunny");
        assert_eq!(config.window.height, 768.0);
        assert_eq!(config.camera.pitch, 10.0);
        assert_eq!(config.camera.yaw, 240.0);
        assert_eq!(config.skybox, SkyboxConfig::default());
    }

    #[test]
    fn skybox_needs_all_faces() {
        let err = ViewerConfig::from_toml(
            Path::new("broken.toml"),
            "[skybox]\nright = \"r.png\"\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ViewerConfig::load_or_default(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn existing_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        writeln!(fs::File::create(&path).unwrap(), "shader_dir = \"glsl\"").unwrap();

        let config = ViewerConfig::load_or_default(&path).unwrap();
        assert_eq!(config.shader_dir, PathBuf::from("glsl"));
    }
}
