use bevy::prelude::*;
use bevy::window::RequestRedraw;
use bits_helpers::BitConfig;
use bits_helpers::toast::ToastPlugin;
use ribbit::Masky;

pub mod core;
pub mod drag;
pub mod geometry;
mod pointer;
mod ribbit;
mod scene;
mod view;

use crate::core::{ActiveDrag, DragSettings, DragSystems, DropRecord, ResetScene};
use crate::drag::DragEvent;
use crate::pointer::{PointerTracker, track_pointer};
use crate::scene::{apply_opacity, reset_scene, restart_on_key, setup, sync_layout};
use crate::view::dispatch_drag_events;

pub fn run() {
    let config = BitConfig::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
        .with_clear_color(Color::srgb(0.1, 0.1, 0.12))
        .with_log_filter("wgpu=error,naga=warn,masky=debug");

    let mut app = bits_helpers::get_default_app::<Masky>(&config);
    app.add_plugins(MaskyPlugin);
    app.run();
}

/// Long-press a mask, drag it onto the face, and see whether it fits.
pub struct MaskyPlugin;

impl Plugin for MaskyPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<ToastPlugin>() {
            app.add_plugins(ToastPlugin);
        }

        app.add_event::<RequestRedraw>()
            .add_event::<DragEvent>()
            .add_event::<ResetScene>()
            .init_resource::<DragSettings>()
            .init_resource::<ActiveDrag>()
            .init_resource::<DropRecord>()
            .init_resource::<PointerTracker>()
            .configure_sets(
                Update,
                (
                    DragSystems::Pointer,
                    DragSystems::Dispatch,
                    DragSystems::Layout,
                )
                    .chain(),
            )
            .add_systems(Startup, setup)
            .add_systems(
                Update,
                (restart_on_key, reset_scene)
                    .chain()
                    .before(DragSystems::Pointer),
            )
            .add_systems(Update, track_pointer.in_set(DragSystems::Pointer))
            .add_systems(Update, dispatch_drag_events.in_set(DragSystems::Dispatch))
            .add_systems(
                Update,
                (sync_layout, apply_opacity).in_set(DragSystems::Layout),
            );
    }
}
