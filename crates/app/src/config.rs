use std::path::PathBuf;

pub const WINDOW_TITLE: &str = "spinach";
pub const WINDOW_WIDTH: u32 = 1280;
pub const WINDOW_HEIGHT: u32 = 720;

/// Size of the offscreen world target, upscaled to the window.
pub const OFFSCREEN_WIDTH: u32 = 320;
pub const OFFSCREEN_HEIGHT: u32 = 180;

/// Startup settings for an [`crate::Application`].
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub offscreen_width: u32,
    pub offscreen_height: u32,
    /// Directory holding shaders, textures and the `skybox/` folder.
    pub data_dir: PathBuf,
    /// YAML body table; the built-in table is used when unset.
    pub system: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: WINDOW_TITLE.into(),
            width: WINDOW_WIDTH,
            height: WINDOW_HEIGHT,
            offscreen_width: OFFSCREEN_WIDTH,
            offscreen_height: OFFSCREEN_HEIGHT,
            data_dir: PathBuf::from("data"),
            system: None,
        }
    }
}

impl AppConfig {
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}
