use core::time::Duration;

use bevy::prelude::*;
use bits_helpers::toast::ToastLength;

use crate::drag::{DragController, DragSession, DropOutcome};

/// Text attached to every drag this bit starts.
pub const MASK_DRAG_MESSAGE: &str = "Mask Added";

/// Tunables for the drag gesture.
#[derive(Resource, Debug, Clone)]
pub struct DragSettings {
    /// How long the pointer must stay down on an item before it is picked up.
    pub long_press: Duration,
    /// Movement, in pixels, that cancels a pending long press.
    pub touch_slop: f32,
    /// Opacity of the drop area while an item hovers over it.
    pub dim_opacity: f32,
    pub toast_length: ToastLength,
}

impl Default for DragSettings {
    fn default() -> Self {
        Self {
            long_press: Duration::from_millis(500),
            touch_slop: 8.0,
            dim_opacity: 0.3,
            toast_length: ToastLength::Short,
        }
    }
}

impl DragSettings {
    pub const fn controller(&self) -> DragController {
        DragController {
            dim_opacity: self.dim_opacity,
        }
    }
}

/// The drag currently in progress, if any.
#[derive(Resource, Debug, Default)]
pub struct ActiveDrag(pub Option<DragSession>);

/// Outcome of the drops made since the scene was built.
#[derive(Resource, Debug, Default)]
pub struct DropRecord {
    pub drops: u32,
    pub last: Option<DropOutcome>,
}

impl DropRecord {
    pub fn record(&mut self, outcome: DropOutcome) {
        self.drops += 1;
        self.last = Some(outcome);
    }

    pub fn mask_on(&self) -> bool {
        self.last == Some(DropOutcome::OnTarget)
    }
}

/// Rebuilds the whole screen from scratch.
#[derive(Event, Debug, Default)]
pub struct ResetScene;

/// Container that receives drops and holds the face.
#[derive(Component)]
pub struct DropArea;

/// Container the items start in.
#[derive(Component)]
pub struct Tray;

/// The rectangle a drop must land in to count as "mask on".
#[derive(Component)]
pub struct FaceZone;

/// Something the player can long-press and drag.
#[derive(Component, Debug, Clone)]
pub struct Draggable {
    pub name: &'static str,
    pub color: Color,
}

/// Opacity of a container. Applied to its background by `apply_opacity`.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Opacity(pub f32);

impl Default for Opacity {
    fn default() -> Self {
        Self(1.0)
    }
}

/// The floating copy of an item that follows the pointer during a drag.
#[derive(Component)]
pub struct DragShadow;

/// Tag for everything `ResetScene` tears down.
#[derive(Component)]
pub struct SceneElement;

/// Systems of one frame of drag handling, in order.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum DragSystems {
    Pointer,
    Dispatch,
    Layout,
}
