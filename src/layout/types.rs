use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardSize {
    pub width: f32,
    pub height: f32,
}

impl CardSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned box grown one rectangle at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::empty()
    }
}

impl Bounds {
    pub fn empty() -> Self {
        Self {
            min_x: f32::INFINITY,
            min_y: f32::INFINITY,
            max_x: f32::NEG_INFINITY,
            max_y: f32::NEG_INFINITY,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn include_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x + width);
        self.max_y = self.max_y.max(y + height);
    }

    pub fn width(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            self.max_x - self.min_x
        }
    }

    pub fn height(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            self.max_y - self.min_y
        }
    }

    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        !self.is_empty() && x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_accumulate() {
        let mut bounds = Bounds::empty();
        assert!(bounds.is_empty());
        assert_eq!(bounds.width(), 0.0);
        bounds.include_rect(10.0, 20.0, 100.0, 50.0);
        bounds.include_rect(150.0, 0.0, 20.0, 20.0);
        assert_eq!(bounds.min_x, 10.0);
        assert_eq!(bounds.min_y, 0.0);
        assert_eq!(bounds.width(), 160.0);
        assert_eq!(bounds.height(), 70.0);
        assert!(bounds.contains_point(110.0, 70.0));
        assert!(!bounds.contains_point(5.0, 5.0));
    }
}
