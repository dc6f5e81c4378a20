#![allow(
    clippy::allow_attributes,
    reason = "allow attributes are needed for wasm"
)]

use bevy::asset::{AssetMetaCheck, AssetPlugin};
use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use bevy::render::RenderPlugin;
use bevy::render::settings::{WgpuSettings, WgpuSettingsPriority};
use bevy::window::{WindowMode, WindowResolution};

#[cfg(target_arch = "wasm32")]
use crate::RibbitCommunicationPlugin;
use crate::RibbitMessageHandler;
use crate::toast::ToastPlugin;
#[cfg(target_arch = "wasm32")]
use crate::window_resizing::handle_browser_resize;

// typical smartphone screen ratio (9:16)
pub const WINDOW_WIDTH: f32 = 360.0;
pub const WINDOW_HEIGHT: f32 = 640.0;

/// Everything a bit needs to describe itself to the shared app builder.
#[derive(Debug, Clone)]
pub struct BitConfig {
    pub name: String,
    pub version: String,
    pub resolution: Vec2,
    pub clear_color: Color,
    /// `EnvFilter` directives. `RUST_LOG` takes precedence when set.
    pub log_filter: String,
    pub log_level: Level,
}

impl BitConfig {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            resolution: Vec2::new(WINDOW_WIDTH, WINDOW_HEIGHT),
            clear_color: Color::BLACK,
            log_filter: "wgpu=error,naga=warn".to_string(),
            log_level: Level::INFO,
        }
    }

    #[must_use]
    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    #[must_use]
    pub fn with_log_filter(mut self, filter: &str) -> Self {
        self.log_filter = filter.to_string();
        self
    }

    /// Folder the asset server reads from. On the web every bit is served
    /// from its own versioned directory.
    pub fn asset_path(&self) -> String {
        #[cfg(not(target_arch = "wasm32"))]
        {
            "assets".to_string()
        }
        #[cfg(target_arch = "wasm32")]
        {
            format!("bits/{}-{}/assets", self.name, self.version)
        }
    }

    fn asset_plugin(&self) -> AssetPlugin {
        AssetPlugin {
            mode: bevy::asset::AssetMode::Unprocessed,
            file_path: self.asset_path(),
            processed_file_path: "imported_assets/Default".to_string(),
            watch_for_changes_override: None,
            meta_check: AssetMetaCheck::Never,
        }
    }

    fn window_plugin(&self) -> WindowPlugin {
        WindowPlugin {
            primary_window: Some(Window {
                title: self.name.clone(),
                present_mode: bevy::window::PresentMode::Fifo,
                resolution: WindowResolution::new(self.resolution.x, self.resolution.y),
                canvas: Some("#bit".into()),
                fit_canvas_to_parent: true,
                mode: WindowMode::Windowed,
                // Tells wasm not to override default event handling, like F5, Ctrl+R etc.
                prevent_default_event_handling: false,
                ..default()
            }),
            ..default()
        }
    }

    fn log_plugin(&self) -> LogPlugin {
        LogPlugin {
            filter: self.log_filter.clone(),
            level: self.log_level,
            ..default()
        }
    }
}

fn render_plugin() -> RenderPlugin {
    RenderPlugin {
        render_creation: bevy::render::settings::RenderCreation::Automatic(WgpuSettings {
            backends: Some(
                bevy::render::settings::Backends::BROWSER_WEBGPU
                    | bevy::render::settings::Backends::GL,
            ),
            power_preference: bevy::render::settings::PowerPreference::HighPerformance,
            priority: WgpuSettingsPriority::Functionality,
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Creates a Bevy app with the window, renderer, logging and platform
/// messaging every bit shares.
#[allow(clippy::extra_unused_type_parameters)]
pub fn get_default_app<T: RibbitMessageHandler>(config: &BitConfig) -> App {
    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(config.asset_plugin())
            .set(config.window_plugin())
            .set(config.log_plugin())
            .set(render_plugin()),
    );

    // Keeps the frame rate down when nothing moves, saving battery on mobile.
    // https://github.com/aevyrie/bevy_framepace
    app.add_plugins(bevy_framepace::FramepacePlugin);
    app.add_plugins(ToastPlugin);

    app.insert_resource(ClearColor(config.clear_color));

    #[cfg(target_arch = "wasm32")]
    {
        app.add_plugins(RibbitCommunicationPlugin::<T>::default());
        app.add_systems(PreUpdate, handle_browser_resize);
    }

    info!("{} {} ready to start", config.name, config.version);

    app
}
