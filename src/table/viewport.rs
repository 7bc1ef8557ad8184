//! Viewport observer - converts the window size into world units at the
//! camera distance, republishing after resizes settle.

use std::time::Duration;

use bevy::{
    prelude::*,
    window::{PrimaryWindow, WindowResized},
};

use super::TableSystems;
use crate::settings::TableSettings;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<Viewport>();
    app.add_systems(Startup, init_viewport);
    // Runs on every screen so the table opens with the current size.
    app.add_systems(Update, track_window_resize.in_set(TableSystems::Input));
}

/// Window size in pixels and the matching visible area in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMetrics {
    pub pixel_size: Vec2,
    pub world_size: Vec2,
}

impl ViewportMetrics {
    pub fn from_pixels(pixel_size: Vec2, fov_degrees: f32, distance: f32) -> Self {
        let half_height = (fov_degrees.to_radians() / 2.0).tan() * distance;
        let aspect = if pixel_size.y > 0.0 {
            pixel_size.x / pixel_size.y
        } else {
            1.0
        };
        Self {
            pixel_size,
            world_size: Vec2::new(half_height * 2.0 * aspect, half_height * 2.0),
        }
    }

    pub fn world_width(&self) -> f32 {
        self.world_size.x
    }

    pub fn world_height(&self) -> f32 {
        self.world_size.y
    }
}

/// Collapses bursts of resize notifications into one update.
#[derive(Debug, Clone, Default)]
pub struct ResizeDebounce {
    pending: Option<(Vec2, Duration)>,
}

impl ResizeDebounce {
    pub fn note_resize(&mut self, size: Vec2, now: Duration) {
        self.pending = Some((size, now));
    }

    /// Returns the latest size once no resize was seen for `quiet`.
    pub fn poll(&mut self, now: Duration, quiet: Duration) -> Option<Vec2> {
        let (size, seen_at) = self.pending?;
        if now.saturating_sub(seen_at) < quiet {
            return None;
        }
        self.pending = None;
        Some(size)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[derive(Resource, Debug, Clone)]
pub struct Viewport {
    metrics: ViewportMetrics,
    debounce: ResizeDebounce,
}

impl Default for Viewport {
    fn default() -> Self {
        let settings = TableSettings::default();
        Self {
            metrics: ViewportMetrics::from_pixels(
                Vec2::new(1280.0, 720.0),
                settings.fov_degrees,
                settings.camera_distance,
            ),
            debounce: ResizeDebounce::default(),
        }
    }
}

impl Viewport {
    pub fn metrics(&self) -> ViewportMetrics {
        self.metrics
    }

    pub fn world_width(&self) -> f32 {
        self.metrics.world_width()
    }
}

fn init_viewport(
    windows: Query<&Window, With<PrimaryWindow>>,
    settings: Res<TableSettings>,
    mut viewport: ResMut<Viewport>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    viewport.metrics = ViewportMetrics::from_pixels(
        window.size(),
        settings.fov_degrees,
        settings.camera_distance,
    );
}

fn track_window_resize(
    mut resized: MessageReader<WindowResized>,
    primary: Query<Entity, With<PrimaryWindow>>,
    time: Res<Time<Real>>,
    settings: Res<TableSettings>,
    mut viewport: ResMut<Viewport>,
) {
    let now = time.elapsed();
    let primary = primary.single().ok();
    for message in resized.read() {
        if Some(message.window) != primary {
            continue;
        }
        viewport
            .debounce
            .note_resize(Vec2::new(message.width, message.height), now);
    }

    if !viewport.debounce.is_pending() {
        return;
    }
    let Some(size) = viewport.debounce.poll(now, settings.resize_debounce) else {
        return;
    };
    viewport.metrics =
        ViewportMetrics::from_pixels(size, settings.fov_degrees, settings.camera_distance);
    debug!(
        "Viewport now {:.1} x {:.1} world units",
        viewport.metrics.world_width(),
        viewport.metrics.world_height()
    );
}
