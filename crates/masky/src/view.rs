use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::window::RequestRedraw;
use bits_helpers::toast::ShowToast;

use crate::core::{ActiveDrag, DragSettings, Draggable, DropArea, DropRecord, FaceZone, Opacity};
use crate::drag::{DragEvent, DragView};
use crate::geometry::Bounds;

/// The drag controller's window onto the ECS world.
#[derive(SystemParam)]
pub struct SceneView<'w, 's> {
    commands: Commands<'w, 's>,
    settings: Res<'w, DragSettings>,
    drop_area: Query<'w, 's, (Entity, &'static mut Opacity), With<DropArea>>,
    items: Query<'w, 's, (&'static mut Bounds, &'static mut Visibility), With<Draggable>>,
    face: Query<'w, 's, &'static Bounds, (With<FaceZone>, Without<Draggable>)>,
    toasts: EventWriter<'w, ShowToast>,
    redraws: EventWriter<'w, RequestRedraw>,
}

impl DragView for SceneView<'_, '_> {
    fn set_drop_area_opacity(&mut self, opacity: f32) {
        for (_, mut current) in &mut self.drop_area {
            current.0 = opacity;
        }
    }

    fn set_item_visible(&mut self, item: Entity, visible: bool) {
        let Ok((_, mut visibility)) = self.items.get_mut(item) else {
            warn!("{item} is not a draggable item");
            return;
        };
        *visibility = if visible {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
    }

    fn item_bounds(&self, item: Entity) -> Option<Bounds> {
        self.items.get(item).ok().map(|(bounds, _)| *bounds)
    }

    fn move_item(&mut self, item: Entity, bounds: Bounds) {
        if let Ok((mut current, _)) = self.items.get_mut(item) {
            *current = bounds;
        }
    }

    fn attach_to_drop_area(&mut self, item: Entity) {
        let Ok((drop_area, _)) = self.drop_area.get_single() else {
            warn!("no drop area to attach {item} to");
            return;
        };
        self.commands.entity(item).set_parent(drop_area);
    }

    fn target_zone(&self) -> Option<Bounds> {
        self.face.get_single().ok().copied()
    }

    fn request_redraw(&mut self) {
        self.redraws.send(RequestRedraw);
    }

    fn notify(&mut self, message: &str) {
        self.toasts.send(ShowToast::new(message, self.settings.toast_length));
    }
}

/// Feeds every pending drag event through the controller, in arrival order.
pub fn dispatch_drag_events(
    mut events: EventReader<DragEvent>,
    mut active: ResMut<ActiveDrag>,
    mut record: ResMut<DropRecord>,
    mut view: SceneView,
) {
    let controller = view.settings.controller();

    for event in events.read() {
        let response = controller.handle(active.0.take(), event, &mut view);
        if let Some(outcome) = response.outcome {
            record.record(outcome);
        }
        active.0 = response.session;
    }
}
