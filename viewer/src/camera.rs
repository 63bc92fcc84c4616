#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

/// 2D coordinates; the space is implied by where the value came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Canvas size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Screen-space center of the canvas.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.width * 0.5, self.height * 0.5)
    }

    /// Length of the shorter side, used to size the default view.
    #[must_use]
    pub fn min_side(&self) -> f64 {
        self.width.min(self.height)
    }
}

/// World-to-screen transform for the Y-up simulation plane.
///
/// `offset_x` / `offset_y` are the screen position of the world origin, in CSS
/// pixels. `scale` is pixels per world unit and is always strictly positive.
/// World Y grows upward while screen Y grows downward, so the Y axis flips.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { offset_x: 0.0, offset_y: 0.0, scale: 1.0 }
    }
}

impl Camera {
    /// Project a simulation point onto the canvas, flipping Y.
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point {
            x: world.x.mul_add(self.scale, self.offset_x),
            y: (-world.y).mul_add(self.scale, self.offset_y),
        }
    }

    /// Inverse of [`Camera::world_to_screen`].
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.offset_x) / self.scale,
            y: (self.offset_y - screen.y) / self.scale,
        }
    }

    /// Pixel length expressed in world units.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.scale
    }

    /// The offset that maps `world` onto `screen` at the current scale.
    #[must_use]
    pub fn offset_placing(&self, world: Point, screen: Point) -> Point {
        Point {
            x: (-world.x).mul_add(self.scale, screen.x),
            y: world.y.mul_add(self.scale, screen.y),
        }
    }
}
