use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::errors::*;

/// The graphics API track a backend binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RendererFamily {
    Unknown,
    OpenGL1Base,
    OpenGL1,
    OpenGL2,
    OpenGL3,
    OpenGL4,
    GLES1,
    GLES2,
    GLES3,
    /// In-memory renderer without any graphics API behind it.
    Headless,
    /// Families registered by client code.
    Custom(u32),
}

impl Default for RendererFamily {
    fn default() -> Self {
        RendererFamily::Unknown
    }
}

impl RendererFamily {
    /// The textual alias of this family.
    pub fn name(self) -> &'static str {
        match self {
            RendererFamily::Unknown => "Unknown",
            RendererFamily::OpenGL1Base => "OpenGL 1 BASE",
            RendererFamily::OpenGL1 => "OpenGL 1",
            RendererFamily::OpenGL2 => "OpenGL 2",
            RendererFamily::OpenGL3 => "OpenGL 3",
            RendererFamily::OpenGL4 => "OpenGL 4",
            RendererFamily::GLES1 => "OpenGLES 1",
            RendererFamily::GLES2 => "OpenGLES 2",
            RendererFamily::GLES3 => "OpenGLES 3",
            RendererFamily::Headless => "Headless",
            RendererFamily::Custom(_) => "Custom",
        }
    }
}

impl fmt::Display for RendererFamily {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RendererFamily::Custom(v) => write!(f, "Custom {}", v),
            _ => f.write_str(self.name()),
        }
    }
}

impl FromStr for RendererFamily {
    type Err = Error;

    /// Parses a family alias, ignoring case and whitespace. Both `"OpenGL 3"`
    /// and `"opengl3"` name the same family, as do `"OpenGLES 2"` and `"gles2"`.
    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();

        let family = match key.as_str() {
            "unknown" => RendererFamily::Unknown,
            "opengl1base" => RendererFamily::OpenGL1Base,
            "opengl1" => RendererFamily::OpenGL1,
            "opengl2" => RendererFamily::OpenGL2,
            "opengl3" => RendererFamily::OpenGL3,
            "opengl4" => RendererFamily::OpenGL4,
            "opengles1" | "gles1" => RendererFamily::GLES1,
            "opengles2" | "gles2" => RendererFamily::GLES2,
            "opengles3" | "gles3" => RendererFamily::GLES3,
            "headless" => RendererFamily::Headless,
            _ => {
                if key.starts_with("custom") {
                    if let Ok(v) = key["custom".len()..].parse::<u32>() {
                        return Ok(RendererFamily::Custom(v));
                    }
                }

                return Err(Error::data(format!("Unknown renderer family \"{}\".", s)));
            }
        };

        Ok(family)
    }
}

/// Identifies a renderer: its family, the API version it targets and, once it
/// is alive, the slot it occupies in the active renderer table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RendererId {
    pub family: RendererFamily,
    pub major_version: i32,
    pub minor_version: i32,
    /// Slot in the active renderer table, or `-1` if not bound.
    #[serde(default = "RendererId::unbound")]
    pub index: i32,
}

impl Default for RendererId {
    fn default() -> Self {
        RendererId::new(RendererFamily::Unknown, 0, 0)
    }
}

impl RendererId {
    /// Constructs an unbound identity.
    #[inline]
    pub fn new(family: RendererFamily, major_version: i32, minor_version: i32) -> Self {
        RendererId {
            family,
            major_version,
            minor_version,
            index: -1,
        }
    }

    #[inline]
    fn unbound() -> i32 {
        -1
    }

    #[inline]
    pub fn is_bound(&self) -> bool {
        self.index >= 0
    }

    /// Returns a copy of this identity bound to `index`.
    #[inline]
    pub fn with_index(mut self, index: i32) -> Self {
        self.index = index;
        self
    }

    /// Family-only comparison, as used by registry lookups.
    #[inline]
    pub fn same_family(&self, rhs: &RendererId) -> bool {
        self.family == rhs.family
    }

    /// Family and version comparison, as used by active renderer lookups.
    #[inline]
    pub fn matches(&self, rhs: &RendererId) -> bool {
        self.family == rhs.family
            && self.major_version == rhs.major_version
            && self.minor_version == rhs.minor_version
    }
}

impl PartialOrd for RendererId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RendererId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.family
            .cmp(&other.family)
            .then(self.major_version.cmp(&other.major_version))
            .then(self.minor_version.cmp(&other.minor_version))
            .then(self.index.cmp(&other.index))
    }
}

impl fmt::Display for RendererId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {}.{}",
            self.family, self.major_version, self.minor_version
        )
    }
}
