use bevy::prelude::*;

/// Axis-aligned rectangle in layout space: logical pixels, origin at the top
/// left of the parent container, y growing downward.
///
/// Draggable items and the face zone store their bounds relative to the
/// container they live in. Containers store theirs relative to the window.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn top_left(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub const fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        self.top_left() + self.size() / 2.0
    }

    /// Inclusive on every edge: a point lying exactly on the border is inside.
    pub fn contains(&self, point: Vec2) -> bool {
        (self.x..=self.x + self.width).contains(&point.x)
            && (self.y..=self.y + self.height).contains(&point.y)
    }

    /// Same size, moved so that `center` becomes its center.
    #[must_use]
    pub fn centered_on(&self, center: Vec2) -> Self {
        let top_left = center - self.size() / 2.0;
        Self::new(top_left.x, top_left.y, self.width, self.height)
    }

    /// Converts a point from the parent space into this rectangle's own space.
    pub fn to_local(&self, point: Vec2) -> Vec2 {
        point - self.top_left()
    }

    /// Moves a rectangle expressed in this rectangle's space into the parent space.
    #[must_use]
    pub fn to_parent(&self, child: Self) -> Self {
        Self::new(child.x + self.x, child.y + self.y, child.width, child.height)
    }
}

/// Whether a drop at `point` lands on the target zone. Both are expressed in
/// the same container space.
pub fn is_on_target(point: Vec2, zone: &Bounds) -> bool {
    zone.contains(point)
}
