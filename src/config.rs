use std::path::PathBuf;

use clap::Parser;

use crate::model::TextureOptions;
use crate::scene::ModelMotion;

/// Renders a mesh into an offscreen target and composites it to the window.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(author, version, about, long_about = None)]
pub struct ViewerConfig {
    /// OBJ or glTF file to display. A unit cube is drawn when omitted.
    #[arg(long, value_name = "PATH")]
    pub model: Option<PathBuf>,

    /// Image applied to the model. Plain white when omitted.
    #[arg(long, value_name = "PATH")]
    pub texture: Option<PathBuf>,

    /// Keep image rows in file order instead of flipping them on load
    #[arg(long)]
    pub no_flip_texture: bool,

    /// Spin the model about Z instead of holding it at 30 degrees
    #[arg(long, value_name = "RADIANS_PER_SEC", allow_negative_numbers = true)]
    pub spin: Option<f32>,

    /// Initial window width
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Initial window height
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Window title
    #[arg(long, default_value = "Offscreen Viewer")]
    pub title: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            model: None,
            texture: None,
            no_flip_texture: false,
            spin: None,
            width: 1280,
            height: 720,
            title: "Offscreen Viewer".to_string(),
        }
    }
}

impl ViewerConfig {
    pub fn motion(&self) -> ModelMotion {
        match self.spin {
            Some(radians_per_second) => ModelMotion::Spinning { radians_per_second },
            None => ModelMotion::default(),
        }
    }

    pub fn texture_options(&self) -> TextureOptions {
        TextureOptions {
            flip_y: !self.no_flip_texture,
            ..TextureOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::try_parse_from(["viewer"]).unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.motion(), ModelMotion::default());
        assert!(config.texture_options().flip_y);
    }

    #[test]
    fn test_all_options() {
        let config = ViewerConfig::try_parse_from([
            "viewer",
            "--model",
            "assets/teapot.obj",
            "--texture",
            "assets/checker.png",
            "--no-flip-texture",
            "--spin",
            "-1.5",
            "--width",
            "640",
            "--height",
            "480",
            "--title",
            "Teapot",
        ])
        .unwrap();

        assert_eq!(config.model, Some(PathBuf::from("assets/teapot.obj")));
        assert_eq!(config.texture, Some(PathBuf::from("assets/checker.png")));
        assert!(!config.texture_options().flip_y);
        assert_eq!(config.motion(), ModelMotion::Spinning { radians_per_second: -1.5 });
        assert_eq!((config.width, config.height), (640, 480));
        assert_eq!(config.title, "Teapot");
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(ViewerConfig::try_parse_from(["viewer", "--width", "wide"]).is_err());
        assert!(ViewerConfig::try_parse_from(["viewer", "--spin"]).is_err());
        assert!(ViewerConfig::try_parse_from(["viewer", "--unknown"]).is_err());
    }
}
