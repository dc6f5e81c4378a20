//! Drag source: turns raw mouse and touch input into drag events.

use core::time::Duration;

use bevy::prelude::*;
use bits_helpers::input::{
    PointerId, just_pressed_pointer, just_released, pressed_position, released_position,
};

use crate::core::{
    ActiveDrag, DragSettings, DragShadow, Draggable, DropArea, MASK_DRAG_MESSAGE, SceneElement,
};
use crate::drag::{DragAction, DragEvent, DragPayload};
use crate::geometry::Bounds;

/// Pointer input for one frame, in window space.
///
/// `pressed_by` and `pressed_at` describe a pointer that went down this
/// frame. The other fields describe the pointer the tracker follows.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerSample {
    pub pressed_by: Option<PointerId>,
    pub pressed_at: Option<Vec2>,
    pub held_at: Option<Vec2>,
    pub released: bool,
    pub released_at: Option<Vec2>,
}

/// What the tracker wants done this frame.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureStep {
    /// Long press completed on `item`: hide it, show its shadow under `at`.
    PickUp { item: Entity, at: Vec2 },
    /// Drag event for the drop area. `at` is in window space.
    Notify {
        action: DragAction,
        item: Entity,
        at: Vec2,
    },
    /// The shadow follows the pointer.
    Follow { at: Vec2 },
    /// The gesture is over, remove the shadow.
    Release,
}

#[derive(Debug, Default)]
enum Gesture {
    #[default]
    Idle,
    Pressing {
        item: Entity,
        origin: Vec2,
        timer: Timer,
    },
    Dragging {
        item: Entity,
        inside: bool,
        last: Vec2,
    },
}

#[derive(Resource, Debug, Default)]
pub struct PointerTracker {
    gesture: Gesture,
    /// The mouse or finger that started the current gesture.
    pointer: Option<PointerId>,
}

impl PointerTracker {
    pub const fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::Dragging { .. })
    }

    pub const fn followed(&self) -> Option<PointerId> {
        self.pointer
    }

    /// Advances the gesture by one frame.
    ///
    /// `hit` finds the draggable item under a window position. `drop_area` is
    /// the drop-area container in window space.
    pub fn step(
        &mut self,
        sample: PointerSample,
        delta: Duration,
        settings: &DragSettings,
        drop_area: &Bounds,
        hit: impl FnOnce(Vec2) -> Option<Entity>,
    ) -> Vec<GestureStep> {
        let mut steps = Vec::new();

        self.gesture = match core::mem::take(&mut self.gesture) {
            Gesture::Idle => {
                let target = sample.pressed_at.and_then(|at| hit(at).map(|item| (item, at)));
                match target {
                    Some((item, origin)) => {
                        self.pointer = sample.pressed_by;
                        Gesture::Pressing {
                            item,
                            origin,
                            timer: Timer::new(settings.long_press, TimerMode::Once),
                        }
                    }
                    None => Gesture::Idle,
                }
            }
            Gesture::Pressing {
                item,
                origin,
                mut timer,
            } => match sample.held_at {
                Some(at) if !sample.released && at.distance(origin) <= settings.touch_slop => {
                    if timer.tick(delta).finished() {
                        steps.push(GestureStep::PickUp { item, at });
                        let inside = drop_area.contains(at);
                        if inside {
                            steps.push(notify(DragAction::Entered, item, at));
                        }
                        Gesture::Dragging {
                            item,
                            inside,
                            last: at,
                        }
                    } else {
                        Gesture::Pressing {
                            item,
                            origin,
                            timer,
                        }
                    }
                }
                // Released early, or moved too far: a tap or a scroll, not a pick-up.
                _ => Gesture::Idle,
            },
            Gesture::Dragging { item, inside, last } => {
                if sample.released {
                    let at = sample.released_at.unwrap_or(last);
                    let now_inside = drop_area.contains(at);
                    match (inside, now_inside) {
                        (false, true) => steps.push(notify(DragAction::Entered, item, at)),
                        (true, false) => steps.push(notify(DragAction::Exited, item, at)),
                        _ => {}
                    }
                    if now_inside {
                        steps.push(notify(DragAction::Drop, item, at));
                    }
                    steps.push(notify(DragAction::Ended, item, at));
                    steps.push(GestureStep::Release);
                    Gesture::Idle
                } else if let Some(at) = sample.held_at {
                    if at != last {
                        steps.push(GestureStep::Follow { at });
                    }
                    let now_inside = drop_area.contains(at);
                    match (inside, now_inside) {
                        (false, true) => steps.push(notify(DragAction::Entered, item, at)),
                        (true, true) if at != last => {
                            steps.push(notify(DragAction::Location, item, at));
                        }
                        (true, false) => steps.push(notify(DragAction::Exited, item, at)),
                        _ => {}
                    }
                    Gesture::Dragging {
                        item,
                        inside: now_inside,
                        last: at,
                    }
                } else {
                    Gesture::Dragging { item, inside, last }
                }
            }
        };

        if matches!(self.gesture, Gesture::Idle) {
            self.pointer = None;
        }
        steps
    }
}

const fn notify(action: DragAction, item: Entity, at: Vec2) -> GestureStep {
    GestureStep::Notify { action, item, at }
}

/// Window-space bounds of an item, given the bounds of the container it lives in.
fn window_bounds(
    item: &Bounds,
    parent: Option<&Parent>,
    containers: &Query<&Bounds, ContainerFilter>,
) -> Bounds {
    parent
        .and_then(|parent| containers.get(parent.get()).ok())
        .map_or(*item, |container| container.to_parent(*item))
}

type ContainerFilter = (Without<Draggable>, Without<DragShadow>);

pub fn track_pointer(
    mut commands: Commands,
    mouse: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    windows: Query<&Window>,
    time: Res<Time>,
    settings: Res<DragSettings>,
    active: Res<ActiveDrag>,
    mut tracker: ResMut<PointerTracker>,
    drop_area: Query<&Bounds, (With<DropArea>, Without<DragShadow>)>,
    items: Query<
        (Entity, &Bounds, &Visibility, Option<&Parent>, &Draggable),
        Without<DragShadow>,
    >,
    containers: Query<&Bounds, ContainerFilter>,
    mut shadows: Query<(Entity, &mut Bounds), With<DragShadow>>,
    mut drag_events: EventWriter<DragEvent>,
) {
    let Ok(drop_area) = drop_area.get_single() else {
        return;
    };

    let pressed = just_pressed_pointer(&mouse, &touches, &windows);
    let sample = match tracker.followed().or(pressed.map(|(pointer, _)| pointer)) {
        Some(pointer) => PointerSample {
            pressed_by: pressed.map(|(pointer, _)| pointer),
            pressed_at: pressed.map(|(_, at)| at),
            held_at: pressed_position(pointer, &mouse, &touches, &windows),
            released: just_released(pointer, &mouse, &touches),
            released_at: released_position(pointer, &mouse, &touches, &windows),
        },
        None => PointerSample::default(),
    };

    let busy = active.0.is_some() && !tracker.is_dragging();
    let hit = |at: Vec2| {
        if busy {
            return None;
        }
        items
            .iter()
            .filter(|(_, _, visibility, _, _)| **visibility != Visibility::Hidden)
            .find(|(_, bounds, _, parent, _)| {
                window_bounds(bounds, *parent, &containers).contains(at)
            })
            .map(|(entity, ..)| entity)
    };

    let steps = tracker.step(sample, time.delta(), &settings, drop_area, hit);

    for step in steps {
        match step {
            GestureStep::PickUp { item, at } => {
                let Ok((_, bounds, _, _, draggable)) = items.get(item) else {
                    warn!("picked up {item} but it no longer exists");
                    continue;
                };
                info!("picked up {}", draggable.name);
                commands.entity(item).insert(Visibility::Hidden);
                spawn_shadow(&mut commands, draggable, bounds.centered_on(at));
                drag_events.send(DragEvent::started(
                    item,
                    drop_area.to_local(at),
                    DragPayload::plain_text(MASK_DRAG_MESSAGE),
                ));
            }
            GestureStep::Notify { action, item, at } => {
                drag_events.send(DragEvent::new(action, item, drop_area.to_local(at)));
            }
            GestureStep::Follow { at } => {
                for (_, mut bounds) in &mut shadows {
                    *bounds = bounds.centered_on(at);
                }
            }
            GestureStep::Release => {
                for (entity, _) in &shadows {
                    commands.entity(entity).despawn_recursive();
                }
            }
        }
    }
}

/// The drag representation: same size as the item, touch point at its center.
fn spawn_shadow(commands: &mut Commands, draggable: &Draggable, bounds: Bounds) {
    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(bounds.x),
            top: Val::Px(bounds.y),
            width: Val::Px(bounds.width),
            height: Val::Px(bounds.height),
            ..default()
        },
        bounds,
        BackgroundColor(draggable.color.with_alpha(0.7)),
        BorderRadius::all(Val::Px(20.0)),
        GlobalZIndex(50),
        DragShadow,
        SceneElement,
    ));
}

#[cfg(test)]
mod tests {
    use bevy::input::InputPlugin;
    use bevy::input::touch::{TouchInput, TouchPhase};
    use bevy::time::TimeUpdateStrategy;

    use super::*;
    use crate::drag::{DragPhase, DragSession};

    const DROP_AREA: Bounds = Bounds::new(0.0, 0.0, 360.0, 460.0);
    const IN_TRAY: Vec2 = Vec2::new(95.0, 545.0);
    const FRAME: Duration = Duration::from_millis(100);

    fn mask() -> Entity {
        Entity::from_raw(3)
    }

    fn press(at: Vec2) -> PointerSample {
        PointerSample {
            pressed_at: Some(at),
            held_at: Some(at),
            ..default()
        }
    }

    fn hold(at: Vec2) -> PointerSample {
        PointerSample {
            held_at: Some(at),
            ..default()
        }
    }

    fn release(at: Vec2) -> PointerSample {
        PointerSample {
            released: true,
            released_at: Some(at),
            ..default()
        }
    }

    fn actions(steps: &[GestureStep]) -> Vec<DragAction> {
        steps
            .iter()
            .filter_map(|step| match step {
                GestureStep::Notify { action, .. } => Some(*action),
                _ => None,
            })
            .collect()
    }

    /// Presses on the mask and holds until it is picked up.
    fn picked_up(tracker: &mut PointerTracker, settings: &DragSettings) -> Vec<GestureStep> {
        tracker.step(press(IN_TRAY), Duration::ZERO, settings, &DROP_AREA, |_| Some(mask()));
        let mut steps = Vec::new();
        for _ in 0..5 {
            steps = tracker.step(hold(IN_TRAY), FRAME, settings, &DROP_AREA, |_| None);
            if tracker.is_dragging() {
                break;
            }
        }
        steps
    }

    #[test]
    fn long_press_picks_up_the_item() {
        let settings = DragSettings::default();
        let mut tracker = PointerTracker::default();

        let steps = picked_up(&mut tracker, &settings);

        assert!(tracker.is_dragging(), "500ms hold starts a drag");
        assert_eq!(
            steps,
            vec![GestureStep::PickUp {
                item: mask(),
                at: IN_TRAY
            }],
            "pick up happens once, outside the drop area"
        );
    }

    #[test]
    fn short_tap_does_not_pick_up() {
        let settings = DragSettings::default();
        let mut tracker = PointerTracker::default();

        tracker.step(press(IN_TRAY), Duration::ZERO, &settings, &DROP_AREA, |_| Some(mask()));
        tracker.step(hold(IN_TRAY), FRAME, &settings, &DROP_AREA, |_| None);
        let steps = tracker.step(release(IN_TRAY), FRAME, &settings, &DROP_AREA, |_| None);

        assert!(steps.is_empty(), "a tap produces nothing");
        assert!(!tracker.is_dragging(), "tracker is idle");
    }

    #[test]
    fn moving_beyond_slop_cancels_the_press() {
        let settings = DragSettings::default();
        let mut tracker = PointerTracker::default();

        tracker.step(press(IN_TRAY), Duration::ZERO, &settings, &DROP_AREA, |_| Some(mask()));
        let swiped = IN_TRAY + Vec2::new(20.0, 0.0);
        tracker.step(hold(swiped), FRAME, &settings, &DROP_AREA, |_| None);
        for _ in 0..10 {
            tracker.step(hold(IN_TRAY), FRAME, &settings, &DROP_AREA, |_| None);
        }

        assert!(!tracker.is_dragging(), "a swipe is not a long press");
    }

    #[test]
    fn press_on_empty_space_is_ignored() {
        let settings = DragSettings::default();
        let mut tracker = PointerTracker::default();

        tracker.step(press(IN_TRAY), Duration::ZERO, &settings, &DROP_AREA, |_| None);
        for _ in 0..10 {
            tracker.step(hold(IN_TRAY), FRAME, &settings, &DROP_AREA, |_| None);
        }

        assert!(!tracker.is_dragging(), "nothing under the pointer");
    }

    #[test]
    fn drag_into_drop_area_and_release_drops() {
        let settings = DragSettings::default();
        let mut tracker = PointerTracker::default();
        picked_up(&mut tracker, &settings);

        let face = Vec2::new(180.0, 200.0);
        let entering = tracker.step(hold(face), FRAME, &settings, &DROP_AREA, |_| None);
        let moving = tracker.step(hold(face + Vec2::ONE), FRAME, &settings, &DROP_AREA, |_| None);
        let releasing = tracker.step(release(face), FRAME, &settings, &DROP_AREA, |_| None);

        assert_eq!(actions(&entering), vec![DragAction::Entered], "crossing in enters");
        assert_eq!(actions(&moving), vec![DragAction::Location], "moving inside reports location");
        assert_eq!(
            actions(&releasing),
            vec![DragAction::Drop, DragAction::Ended],
            "release inside drops then ends"
        );
        assert_eq!(releasing.last(), Some(&GestureStep::Release), "shadow goes away");
        assert!(!tracker.is_dragging(), "tracker is idle again");
    }

    #[test]
    fn leaving_drop_area_exits_and_release_outside_only_ends() {
        let settings = DragSettings::default();
        let mut tracker = PointerTracker::default();
        picked_up(&mut tracker, &settings);

        tracker.step(hold(Vec2::new(180.0, 200.0)), FRAME, &settings, &DROP_AREA, |_| None);
        let leaving = tracker.step(hold(IN_TRAY), FRAME, &settings, &DROP_AREA, |_| None);
        let releasing = tracker.step(release(IN_TRAY), FRAME, &settings, &DROP_AREA, |_| None);

        assert_eq!(actions(&leaving), vec![DragAction::Exited], "crossing out exits");
        assert_eq!(actions(&releasing), vec![DragAction::Ended], "no drop outside");
    }

    #[test]
    fn release_without_position_uses_last_known_point() {
        let settings = DragSettings::default();
        let mut tracker = PointerTracker::default();
        picked_up(&mut tracker, &settings);

        let face = Vec2::new(180.0, 200.0);
        tracker.step(hold(face), FRAME, &settings, &DROP_AREA, |_| None);
        let releasing = tracker.step(
            PointerSample {
                released: true,
                ..default()
            },
            FRAME,
            &settings,
            &DROP_AREA,
            |_| None,
        );

        assert!(
            releasing.contains(&GestureStep::Notify {
                action: DragAction::Drop,
                item: mask(),
                at: face
            }),
            "drop happens where the pointer was last seen"
        );
    }

    #[test]
    fn tracker_follows_the_pointer_that_pressed() {
        let settings = DragSettings::default();
        let mut tracker = PointerTracker::default();

        let first_finger = PointerSample {
            pressed_by: Some(PointerId::Touch(0)),
            ..press(IN_TRAY)
        };
        tracker.step(first_finger, Duration::ZERO, &settings, &DROP_AREA, |_| Some(mask()));
        assert_eq!(tracker.followed(), Some(PointerId::Touch(0)), "press picks the finger");

        tracker.step(release(IN_TRAY), FRAME, &settings, &DROP_AREA, |_| None);
        assert_eq!(tracker.followed(), None, "finger is forgotten once idle");
    }

    const TRAY: Bounds = Bounds::new(0.0, 460.0, 360.0, 180.0);
    const ITEM: Bounds = Bounds::new(40.0, 60.0, 110.0, 50.0);
    /// Inside the item, away from its center.
    const GRAB: Vec2 = Vec2::new(60.0, 530.0);
    const FACE: Vec2 = Vec2::new(180.0, 200.0);

    #[derive(Resource, Default)]
    struct Sent(Vec<DragAction>);

    fn record_sent(mut events: EventReader<DragEvent>, mut sent: ResMut<Sent>) {
        sent.0.extend(events.read().filter_map(|event| event.action().ok()));
    }

    struct Screen {
        app: App,
        item: Entity,
    }

    impl Screen {
        fn new() -> Self {
            let mut app = App::new();
            app.add_plugins((MinimalPlugins, InputPlugin))
                .insert_resource(TimeUpdateStrategy::ManualDuration(FRAME))
                .add_event::<DragEvent>()
                .init_resource::<DragSettings>()
                .init_resource::<ActiveDrag>()
                .init_resource::<PointerTracker>()
                .init_resource::<Sent>()
                .add_systems(Update, (track_pointer, record_sent).chain());

            let world = app.world_mut();
            world.spawn((DROP_AREA, DropArea));
            let tray = world.spawn(TRAY).id();
            let item = world
                .spawn((
                    ITEM,
                    Visibility::Visible,
                    Draggable {
                        name: "mask",
                        color: Color::WHITE,
                    },
                ))
                .set_parent(tray)
                .id();

            Self { app, item }
        }

        fn touch(&mut self, id: u64, phase: TouchPhase, at: Vec2) {
            self.app.world_mut().send_event(TouchInput {
                phase,
                position: at,
                window: Entity::PLACEHOLDER,
                force: None,
                id,
            });
            self.app.update();
        }

        /// Presses the first finger on the item and keeps it still well past the long press.
        fn long_press(&mut self) {
            self.touch(0, TouchPhase::Started, GRAB);
            for _ in 0..8 {
                self.app.update();
            }
        }

        fn shadows(&mut self) -> Vec<Bounds> {
            self.app
                .world_mut()
                .query_filtered::<&Bounds, With<DragShadow>>()
                .iter(self.app.world())
                .copied()
                .collect()
        }

        fn item_visibility(&self) -> Option<Visibility> {
            self.app.world().get::<Visibility>(self.item).copied()
        }

        fn sent(&self) -> &[DragAction] {
            &self.app.world().resource::<Sent>().0
        }
    }

    #[test]
    fn long_press_hides_item_and_shows_its_shadow() {
        let mut screen = Screen::new();

        screen.long_press();

        assert_eq!(screen.item_visibility(), Some(Visibility::Hidden), "source item is hidden");
        let shadows = screen.shadows();
        assert_eq!(shadows.len(), 1, "one shadow follows the finger");
        assert_eq!(shadows[0].size(), ITEM.size(), "shadow has the item's size");
        assert_eq!(shadows[0].center(), GRAB, "touch point is the shadow's center");
        assert_eq!(screen.sent(), [DragAction::Started], "drag starts once");
    }

    #[test]
    fn shadow_follows_the_finger_and_goes_away_on_release() {
        let mut screen = Screen::new();
        screen.long_press();

        screen.touch(0, TouchPhase::Moved, FACE);
        let shadows = screen.shadows();
        assert_eq!(shadows.len(), 1, "shadow survives the move");
        assert_eq!(shadows[0].center(), FACE, "shadow moved with the finger");

        screen.touch(0, TouchPhase::Ended, FACE);
        assert!(screen.shadows().is_empty(), "shadow removed on release");
        assert_eq!(
            screen.sent(),
            [
                DragAction::Started,
                DragAction::Entered,
                DragAction::Drop,
                DragAction::Ended
            ],
            "full drag over the drop area"
        );
    }

    #[test]
    fn second_finger_does_not_steal_the_drag() {
        let mut screen = Screen::new();
        screen.long_press();

        screen.touch(1, TouchPhase::Started, Vec2::new(300.0, 100.0));
        screen.touch(1, TouchPhase::Moved, Vec2::new(310.0, 110.0));
        assert_eq!(
            screen.shadows().first().map(Bounds::center),
            Some(GRAB),
            "shadow stays under the first finger"
        );

        screen.touch(1, TouchPhase::Ended, Vec2::new(310.0, 110.0));
        assert_eq!(screen.sent(), [DragAction::Started], "lifting the other finger ends nothing");
    }

    #[test]
    fn no_pick_up_while_another_drag_is_active() {
        let mut screen = Screen::new();
        screen.app.insert_resource(ActiveDrag(Some(DragSession {
            item: Entity::from_raw(99),
            payload: None,
            phase: DragPhase::Started,
        })));

        screen.long_press();

        assert_eq!(screen.item_visibility(), Some(Visibility::Visible), "item stays put");
        assert!(screen.shadows().is_empty(), "no shadow");
        assert!(screen.sent().is_empty(), "no drag started");
    }
}
