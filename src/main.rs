// Support configuring Bevy lints within code.
#![cfg_attr(bevy_lint, feature(register_tool), register_tool(bevy))]
// Disable console on Windows for non-dev builds.
#![cfg_attr(not(feature = "dev"), windows_subsystem = "windows")]

mod input;
mod screens;
mod settings;
mod table;

#[cfg(feature = "dev_native")]
use bevy::remote::http::RemoteHttpPlugin;
use bevy::{asset::AssetMetaCheck, prelude::*};
use bevy_rich_text3d::Text3dPlugin;
use clap::Parser;

use settings::{Cli, TableSettings};

fn main() -> AppExit {
    App::new().add_plugins(AppPlugin).run()
}

pub struct AppPlugin;

impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        // Add Bevy plugins.
        app.add_plugins((
            DefaultPlugins
                .set(AssetPlugin {
                    // Wasm builds will check for meta files (that don't exist) if this isn't set.
                    // This causes errors and even panics on web build on itch.
                    // See https://github.com/bevyengine/bevy_github_ci_template/issues/48.
                    meta_check: AssetMetaCheck::Never,
                    ..default()
                })
                .set(WindowPlugin {
                    primary_window: Window {
                        title: "Card Wall".to_string(),
                        fit_canvas_to_parent: true,
                        ..default()
                    }
                    .into(),
                    ..default()
                }),
            MeshPickingPlugin,
            Text3dPlugin {
                load_system_fonts: cfg!(not(target_family = "wasm")),
                ..default()
            },
        ));

        app.insert_resource(UiPickingSettings {
            require_markers: true,
        });
        app.insert_resource(MeshPickingSettings {
            require_markers: true,
            ..default()
        });

        let settings = TableSettings::from(Cli::parse());
        #[cfg(not(feature = "dev"))]
        if settings.skip_title {
            warn!("--table is only available in dev builds");
        }
        info!(
            "Camera fov {:.0} deg at distance {:.1}",
            settings.fov_degrees, settings.camera_distance
        );

        // Add Bevy Remote Protocol for debugging (native dev only)
        #[cfg(feature = "dev_native")]
        {
            use bevy::remote::RemotePlugin;

            app.add_plugins(RemotePlugin::default());
            app.add_plugins(RemoteHttpPlugin::default().with_port(settings.brp_port));
            info!("BRP listening on port {}", settings.brp_port);
        }

        app.insert_resource(settings);

        // Add other plugins.
        app.add_plugins((screens::plugin, table::plugin));

        // Order new `AppSystems` variants by adding them here:
        app.configure_sets(
            Update,
            (AppSystems::RecordInput, AppSystems::Update).chain(),
        );

        // Spawn the main camera.
        app.add_systems(Startup, spawn_camera);
    }
}

/// High-level groupings of systems for the app in the `Update` schedule.
/// When adding a new variant, make sure to order it in the `configure_sets`
/// call above.
#[derive(SystemSet, Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub(crate) enum AppSystems {
    /// Record player input.
    RecordInput,
    /// Do everything else (consider splitting this into further variants).
    Update,
}

/// Perspective camera looking straight at the card plane.
fn spawn_camera(mut commands: Commands, settings: Res<TableSettings>) {
    commands.spawn((
        Name::new("Camera"),
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: settings.fov_degrees.to_radians(),
            ..default()
        }),
        Transform::from_xyz(0.0, 0.0, settings.camera_distance).looking_at(Vec3::ZERO, Vec3::Y),
        IsDefaultUiCamera,
        UiPickingCamera,
        MeshPickingCamera,
    ));
}
