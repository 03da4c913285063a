/// The 2D view transform of a render target.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Rotation in degrees.
    pub angle: f32,
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            x: 0.0,
            y: 0.0,
            z: -10.0,
            angle: 0.0,
            zoom: 1.0,
        }
    }
}
