use serde::{Serialize, Serializer};

/// Axis-aligned rectangle in screen coordinates.
///
/// Serialises as `[x, y, width, height]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Rect {
    /// Builds a rectangle from its origin and size.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The empty rectangle reported when geometry is unavailable.
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0, 0, 0, 0)
    }
}

impl Serialize for Rect {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        [self.x, self.y, self.width, self.height].serialize(serializer)
    }
}
