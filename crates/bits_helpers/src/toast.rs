use core::time::Duration;

use bevy::prelude::*;

/// How long a toast stays on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ToastLength {
    #[default]
    Short,
    Long,
}

impl ToastLength {
    pub const fn duration(self) -> Duration {
        match self {
            Self::Short => Duration::from_millis(2000),
            Self::Long => Duration::from_millis(3500),
        }
    }
}

/// Ask for a short-lived message at the bottom of the screen.
#[derive(Event, Debug, Clone)]
pub struct ShowToast {
    pub text: String,
    pub length: ToastLength,
}

impl ShowToast {
    pub fn new(text: impl Into<String>, length: ToastLength) -> Self {
        Self {
            text: text.into(),
            length,
        }
    }
}

#[derive(Component)]
pub struct Toast {
    timer: Timer,
}

// Last quarter of the lifetime is spent fading out.
const FADE_START: f32 = 0.75;

pub struct ToastPlugin;

impl Plugin for ToastPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ShowToast>()
            .add_systems(Update, (spawn_toasts, expire_toasts).chain());
    }
}

/// Only one toast is visible at a time, a new one replaces whatever is showing.
pub fn spawn_toasts(
    mut commands: Commands,
    mut requests: EventReader<ShowToast>,
    current: Query<Entity, With<Toast>>,
) {
    let Some(request) = requests.read().last() else {
        return;
    };

    for entity in &current {
        commands.entity(entity).despawn_recursive();
    }

    debug!("toast: {}", request.text);

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                bottom: Val::Percent(12.0),
                width: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                ..default()
            },
            Toast {
                timer: Timer::new(request.length.duration(), TimerMode::Once),
            },
            GlobalZIndex(100),
        ))
        .with_children(|parent| {
            parent.spawn((
                Node {
                    padding: UiRect::axes(Val::Px(16.0), Val::Px(10.0)),
                    ..default()
                },
                BackgroundColor(Color::srgba(0.2, 0.2, 0.2, 0.9)),
                BorderRadius::all(Val::Px(18.0)),
                Text::new(request.text.clone()),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });
}

pub fn expire_toasts(
    mut commands: Commands,
    time: Res<Time>,
    mut toasts: Query<(Entity, &mut Toast, &Children)>,
    mut bubbles: Query<(&mut BackgroundColor, &mut TextColor)>,
) {
    for (entity, mut toast, children) in &mut toasts {
        toast.timer.tick(time.delta());

        if toast.timer.finished() {
            commands.entity(entity).despawn_recursive();
            continue;
        }

        let progress = toast.timer.fraction();
        if progress < FADE_START {
            continue;
        }
        let alpha = 1.0 - (progress - FADE_START) / (1.0 - FADE_START);
        for &child in children {
            if let Ok((mut background, mut text_color)) = bubbles.get_mut(child) {
                background.0.set_alpha(0.9 * alpha);
                text_color.0.set_alpha(alpha);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bevy::time::TimeUpdateStrategy;

    use super::*;

    fn toast_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins).add_plugins(ToastPlugin);
        app
    }

    fn toast_count(app: &mut App) -> usize {
        app.world_mut()
            .query_filtered::<Entity, With<Toast>>()
            .iter(app.world())
            .count()
    }

    #[test]
    fn short_and_long_follow_platform_lengths() {
        assert_eq!(ToastLength::Short.duration(), Duration::from_secs(2), "short is 2s");
        assert_eq!(
            ToastLength::Long.duration(),
            Duration::from_millis(3500),
            "long is 3.5s"
        );
    }

    #[test]
    fn new_toast_replaces_the_current_one() {
        let mut app = toast_app();

        app.world_mut().send_event(ShowToast::new("first", ToastLength::Short));
        app.update();
        app.world_mut().send_event(ShowToast::new("second", ToastLength::Long));
        app.update();

        assert_eq!(toast_count(&mut app), 1, "only one toast is visible");
    }

    #[test]
    fn toast_disappears_after_its_length() {
        let mut app = toast_app();
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(200)));

        app.world_mut().send_event(ShowToast::new("Mask off", ToastLength::Short));
        app.update();
        assert_eq!(toast_count(&mut app), 1, "toast is shown");

        for _ in 0..12 {
            app.update();
        }
        assert_eq!(toast_count(&mut app), 0, "toast expired");
    }
}
