/// An axis-aligned rectangle with its top-left corner at (`x`, `y`).
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    #[inline]
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    /// Returns the overlapping area of two rectangles, or `None` if they are
    /// disjoint.
    pub fn intersection(&self, rhs: &Rect) -> Option<Rect> {
        let x0 = self.x.max(rhs.x);
        let y0 = self.y.max(rhs.y);
        let x1 = (self.x + self.w).min(rhs.x + rhs.w);
        let y1 = (self.y + self.h).min(rhs.y + rhs.h);

        if x1 > x0 && y1 > y0 {
            Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
        } else {
            None
        }
    }

    #[inline]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.w && y < self.y + self.h
    }
}
