//! The card table: a hand of cards at the bottom of the screen and a wall
//! of played cards above it.

mod animation;
mod card;
pub mod ease;
mod input_buffer;
mod interaction;
pub mod layout;
mod scene;
mod store;
mod texture;
mod ui;
mod viewport;

pub use animation::*;
pub use card::*;
pub use input_buffer::*;
pub use interaction::*;
pub use scene::*;
pub use store::*;
pub use texture::*;
pub use viewport::*;

use bevy::prelude::*;

use crate::{AppSystems, screens::Screen};

/// Execution order for the table, inside [`AppSystems::Update`].
#[derive(SystemSet, Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum TableSystems {
    /// Turn buffered input into requests.
    Input,
    /// Apply requests to the store and the controllers.
    Store,
    /// Step play animations.
    Animate,
    /// Move cards toward their hand or wall slots.
    Layout,
    /// Face effects, draw order and UI.
    Present,
}

pub fn plugin(app: &mut App) {
    app.configure_sets(
        Update,
        (
            TableSystems::Input,
            TableSystems::Store,
            TableSystems::Animate,
            TableSystems::Layout,
            TableSystems::Present,
        )
            .chain()
            .in_set(AppSystems::Update),
    );

    app.add_plugins((
        store::plugin,
        viewport::plugin,
        texture::plugin,
        input_buffer::plugin,
        scene::plugin,
        ui::plugin,
    ));

    app.add_systems(
        Update,
        (
            (
                store::handle_reset_requests,
                scene::handle_card_press,
                interaction::handle_hover_messages,
            )
                .chain()
                .in_set(TableSystems::Store),
            (
                animation::reset_animators_on_reset,
                interaction::reset_interactions_on_reset,
                animation::restore_stored_animations,
                animation::drive_play_animations,
            )
                .chain()
                .in_set(TableSystems::Animate),
            (
                scene::sync_hand_layout,
                scene::sync_wall_layout,
                scene::sync_card_faces,
            )
                .chain()
                .in_set(TableSystems::Layout),
            (
                (interaction::animate_card_faces, scene::apply_render_order).chain(),
                scene::highlight_hovered_faces,
            )
                .in_set(TableSystems::Present),
        )
            .run_if(in_state(Screen::Table)),
    );
    app.add_systems(OnExit(Screen::Table), animation::cancel_play_animations);
}
