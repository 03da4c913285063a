bitflags::bitflags! {
    /// Window creation flags.
    #[derive(Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct WindowFlags: u32 {
        const FULLSCREEN = 0x1;
        const HIDDEN = 0x2;
        const BORDERLESS = 0x4;
        const RESIZABLE = 0x8;
        const ALLOW_HIGHDPI = 0x10;
    }
}

impl Default for WindowFlags {
    fn default() -> Self {
        WindowFlags::empty()
    }
}

bitflags::bitflags! {
    /// Flags applied to the context created by the next initialization.
    #[derive(Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct InitFlags: u32 {
        const DISABLE_VSYNC = 0x1;
        const DISABLE_DOUBLE_BUFFER = 0x2;
        const DISABLE_AUTO_VIRTUAL_RESOLUTION = 0x4;
        const REQUEST_COMPATIBILITY_PROFILE = 0x8;
    }
}

impl Default for InitFlags {
    fn default() -> Self {
        InitFlags::empty()
    }
}

bitflags::bitflags! {
    /// Optional capabilities of a renderer.
    #[derive(Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Features: u32 {
        const NON_POWER_OF_TWO = 0x1;
        const RENDER_TARGETS = 0x2;
        const BLEND_EQUATIONS = 0x4;
        const BLEND_FUNC_SEPARATE = 0x8;
        const BLEND_EQUATIONS_SEPARATE = 0x10;
        const GL_BGR = 0x20;
        const GL_BGRA = 0x40;
        const GL_ABGR = 0x80;
        const VERTEX_SHADER = 0x100;
        const FRAGMENT_SHADER = 0x200;
        const GEOMETRY_SHADER = 0x400;
        const WRAP_REPEAT_MIRRORED = 0x800;

        const PIXEL_SHADER = Self::FRAGMENT_SHADER.bits;
        const BASIC_SHADERS = Self::VERTEX_SHADER.bits | Self::FRAGMENT_SHADER.bits;
        const ALL_BLEND_PRESETS = Self::BLEND_EQUATIONS.bits | Self::BLEND_FUNC_SEPARATE.bits;
        const ALL_BASE = Self::RENDER_TARGETS.bits;
        const ALL_SHADERS = Self::BASIC_SHADERS.bits | Self::GEOMETRY_SHADER.bits;
    }
}

impl Default for Features {
    fn default() -> Self {
        Features::empty()
    }
}
