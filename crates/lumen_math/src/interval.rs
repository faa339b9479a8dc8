/// A range `[min, max]` of ray distances or channel values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// Every distance in front of a ray origin.
    pub const FORWARD: Interval = Interval::new(0.0, f32::INFINITY);

    /// Displayable channel range.
    pub const UNIT: Interval = Interval::new(0.0, 1.0);

    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// `min < x < max`; false for NaN.
    ///
    /// Hit distances are accepted with this, so a hit exactly at a ray
    /// origin or exactly at a light is ignored.
    pub fn surrounds(&self, x: f32) -> bool {
        self.min < x && x < self.max
    }

    pub fn clamp(&self, x: f32) -> f32 {
        x.clamp(self.min, self.max)
    }
}
