//! Functions for loading renderer settings.

use std::fs;
use std::path::Path;

use crate::assets::prelude::*;
use crate::errors::*;
use crate::logging::DebugLevel;
use crate::renderer::RendererId;

/// A structure containing configuration data for a `GpuSystem`: which
/// renderers to try, what they must support and the window to create.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Replaces the platform renderer order when present.
    pub renderer_order: Option<Vec<RendererId>>,
    pub debug_level: DebugLevel,
    pub preinit_flags: InitFlags,
    pub required_features: Features,
    /// An existing window to render into, `0` creates one.
    pub init_window: u32,
    pub window: WindowParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowParams {
    /// Sets the size in *points* of the client area of the window.
    pub width: u16,
    pub height: u16,
    pub flags: WindowFlags,
}

impl Default for WindowParams {
    fn default() -> Self {
        WindowParams {
            width: 800,
            height: 600,
            flags: WindowFlags::empty(),
        }
    }
}

impl Settings {
    /// Parses settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Settings> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads settings from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Settings> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|err| match Error::from(err) {
            Error {
                code: ErrorCode::FileNotFound,
                ..
            } => Error::file_not_found(format!("{}", path.display())),
            other => other,
        })?;

        Settings::from_json(&json)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::renderer::RendererFamily;

    #[test]
    fn defaults() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.window.width, 800);
        assert!(settings.renderer_order.is_none());
    }

    #[test]
    fn basic() {
        let json = r#"{
            "renderer_order": [{ "family": "Headless", "major_version": 1, "minor_version": 0 }],
            "debug_level": 2,
            "required_features": 768,
            "window": { "width": 320, "height": 240 }
        }"#;

        let settings = Settings::from_json(json).unwrap();
        let order = settings.renderer_order.unwrap();
        assert_eq!(order, vec![RendererId::new(RendererFamily::Headless, 1, 0)]);
        assert_eq!(settings.debug_level, DebugLevel::Level2);
        assert_eq!(settings.required_features, Features::BASIC_SHADERS);
        assert_eq!(settings.window.width, 320);
        assert_eq!(settings.window.flags, WindowFlags::empty());
    }

    #[test]
    fn malformed() {
        let err = Settings::from_json("{ \"debug_level\": ").unwrap_err();
        assert_eq!(err.code, ErrorCode::Data);

        let err = Settings::load("does/not/exist.json").unwrap_err();
        assert_eq!(err.code, ErrorCode::FileNotFound);
    }
}
