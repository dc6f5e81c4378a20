use bevy::math::Vec2;

// Surfaces larger than this fail to configure on most mobile GPUs:
// "`Surface` width and height must be within the maximum supported texture size."
const MAX_SURFACE_SIZE: Vec2 = Vec2::splat(2048.0);

/// Size the window should take to fill the browser viewport without
/// exceeding what the GPU can present.
pub fn clamp_surface_size(viewport: Vec2) -> Vec2 {
    viewport.min(MAX_SURFACE_SIZE)
}

fn needs_resize(current: Vec2, target: Vec2) -> bool {
    (current - target).abs().max_element() > f32::EPSILON
}

#[cfg(target_arch = "wasm32")]
pub fn handle_browser_resize(
    mut primary_query: bevy::ecs::system::Query<
        &mut bevy::window::Window,
        bevy::ecs::query::With<bevy::window::PrimaryWindow>,
    >,
) {
    let Some(wasm_window) = web_sys::window() else {
        return;
    };
    let (Ok(inner_width), Ok(inner_height)) =
        (wasm_window.inner_width(), wasm_window.inner_height())
    else {
        return;
    };
    let (Some(width), Some(height)) = (inner_width.as_f64(), inner_height.as_f64()) else {
        return;
    };
    let viewport = Vec2::new(width as f32, height as f32);

    for mut window in &mut primary_query {
        let current = Vec2::new(window.resolution.width(), window.resolution.height());
        if needs_resize(current, viewport) {
            let size = clamp_surface_size(viewport);
            window.resolution.set(size.x, size.y);
        }
    }
}
