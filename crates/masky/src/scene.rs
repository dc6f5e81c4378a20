use bevy::color::palettes::css::{LIGHT_SKY_BLUE, MEDIUM_AQUAMARINE, WHEAT};
use bevy::prelude::*;
use bits_helpers::{WINDOW_HEIGHT, WINDOW_WIDTH};

use crate::core::{
    ActiveDrag, Draggable, DropArea, DropRecord, FaceZone, Opacity, ResetScene,
    SceneElement, Tray,
};
use crate::geometry::Bounds;
use crate::pointer::PointerTracker;

const TRAY_HEIGHT: f32 = 180.0;

pub const DROP_AREA_BOUNDS: Bounds =
    Bounds::new(0.0, 0.0, WINDOW_WIDTH, WINDOW_HEIGHT - TRAY_HEIGHT);
pub const TRAY_BOUNDS: Bounds =
    Bounds::new(0.0, WINDOW_HEIGHT - TRAY_HEIGHT, WINDOW_WIDTH, TRAY_HEIGHT);
/// In drop-area space.
pub const FACE_BOUNDS: Bounds = Bounds::new(105.0, 110.0, 150.0, 190.0);

const ITEM_SIZE: Vec2 = Vec2::new(110.0, 50.0);

/// Items available in the tray, with their tray-space position.
fn tray_items() -> [(Draggable, Vec2); 2] {
    [
        (
            Draggable {
                name: "mask",
                color: Color::Srgba(LIGHT_SKY_BLUE),
            },
            Vec2::new(40.0, 60.0),
        ),
        (
            Draggable {
                name: "visor",
                color: Color::Srgba(MEDIUM_AQUAMARINE),
            },
            Vec2::new(210.0, 60.0),
        ),
    ]
}

pub fn setup(mut commands: Commands) {
    commands.spawn(Camera2d);
    spawn_scene(&mut commands);
}

/// Node positioned by its `Bounds`. `sync_layout` keeps the two in step.
fn positioned(bounds: Bounds) -> Node {
    Node {
        position_type: PositionType::Absolute,
        left: Val::Px(bounds.x),
        top: Val::Px(bounds.y),
        width: Val::Px(bounds.width),
        height: Val::Px(bounds.height),
        justify_content: JustifyContent::Center,
        align_items: AlignItems::Center,
        ..default()
    }
}

pub fn spawn_scene(commands: &mut Commands) {
    commands
        .spawn((
            positioned(DROP_AREA_BOUNDS),
            DROP_AREA_BOUNDS,
            BackgroundColor(Color::srgb(0.18, 0.2, 0.25)),
            Opacity::default(),
            DropArea,
            SceneElement,
        ))
        .with_children(|drop_area| {
            drop_area
                .spawn((
                    positioned(FACE_BOUNDS),
                    FACE_BOUNDS,
                    BackgroundColor(Color::Srgba(WHEAT)),
                    BorderRadius::all(Val::Percent(50.0)),
                    FaceZone,
                ))
                .with_children(spawn_eyes);
        });

    commands
        .spawn((
            positioned(TRAY_BOUNDS),
            TRAY_BOUNDS,
            BackgroundColor(Color::srgb(0.1, 0.1, 0.12)),
            Tray,
            SceneElement,
        ))
        .with_children(|tray| {
            for (draggable, position) in tray_items() {
                let bounds = Bounds::new(position.x, position.y, ITEM_SIZE.x, ITEM_SIZE.y);
                tray.spawn((
                    positioned(bounds),
                    bounds,
                    BackgroundColor(draggable.color),
                    BorderRadius::all(Val::Px(20.0)),
                    Visibility::Visible,
                    Text::new(draggable.name),
                    TextFont {
                        font_size: 18.0,
                        ..default()
                    },
                    TextColor(Color::BLACK),
                    draggable,
                ));
            }
        });
}

fn spawn_eyes(face: &mut ChildBuilder) {
    for left in [40.0, 90.0] {
        face.spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(left),
                top: Val::Px(60.0),
                width: Val::Px(20.0),
                height: Val::Px(20.0),
                ..default()
            },
            BackgroundColor(Color::BLACK),
            BorderRadius::all(Val::Percent(50.0)),
        ));
    }
}

pub fn sync_layout(mut nodes: Query<(&Bounds, &mut Node), Changed<Bounds>>) {
    for (bounds, mut node) in &mut nodes {
        node.left = Val::Px(bounds.x);
        node.top = Val::Px(bounds.y);
        node.width = Val::Px(bounds.width);
        node.height = Val::Px(bounds.height);
    }
}

/// Applies a container's `Opacity` to it and everything inside it.
pub fn apply_opacity(
    containers: Query<(Entity, &Opacity), Changed<Opacity>>,
    children: Query<&Children>,
    mut backgrounds: Query<&mut BackgroundColor>,
    mut labels: Query<&mut TextColor>,
) {
    for (container, opacity) in &containers {
        for entity in core::iter::once(container).chain(children.iter_descendants(container)) {
            if let Ok(mut background) = backgrounds.get_mut(entity) {
                background.0.set_alpha(opacity.0);
            }
            if let Ok(mut label) = labels.get_mut(entity) {
                label.0.set_alpha(opacity.0);
            }
        }
    }
}

/// Sends `ResetScene` when `R` is pressed, like a restart from the host.
pub fn restart_on_key(keys: Res<ButtonInput<KeyCode>>, mut resets: EventWriter<ResetScene>) {
    if keys.just_pressed(KeyCode::KeyR) {
        resets.send(ResetScene);
    }
}

pub fn reset_scene(
    mut commands: Commands,
    mut resets: EventReader<ResetScene>,
    elements: Query<Entity, With<SceneElement>>,
    mut active: ResMut<ActiveDrag>,
    mut record: ResMut<DropRecord>,
    mut tracker: ResMut<PointerTracker>,
) {
    if resets.read().count() == 0 {
        return;
    }

    info!("resetting scene");
    for entity in &elements {
        commands.entity(entity).despawn_recursive();
    }
    active.0 = None;
    *record = DropRecord::default();
    *tracker = PointerTracker::default();
    spawn_scene(&mut commands);
}
