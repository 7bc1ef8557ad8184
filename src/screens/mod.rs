//! The app's screen states and transitions between them.

mod title;

use bevy::prelude::*;

#[cfg(feature = "dev")]
use crate::settings::TableSettings;

pub(super) fn plugin(app: &mut App) {
    app.init_state::<Screen>();
    app.register_type::<Screen>();

    app.add_plugins(title::plugin);

    // BRP remote control for testing (dev only)
    #[cfg(feature = "dev")]
    {
        app.register_type::<GotoScreen>();
        app.add_systems(Update, handle_goto_screen);

        // --table CLI arg: skip the title screen
        app.add_systems(
            OnEnter(Screen::Title),
            skip_title_screen.run_if(|settings: Res<TableSettings>| settings.skip_title),
        );
    }
}

/// The app's screen states.
#[derive(States, Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Reflect)]
pub enum Screen {
    #[default]
    Title,
    Table,
}

/// Resource to trigger screen transition via BRP.
/// Insert this resource with the target screen to transition.
#[cfg(feature = "dev")]
#[derive(Resource, Reflect, Default)]
#[reflect(Resource)]
pub struct GotoScreen(pub Screen);

#[cfg(feature = "dev")]
fn skip_title_screen(mut next: ResMut<NextState<Screen>>) {
    next.set(Screen::Table);
}

#[cfg(feature = "dev")]
fn handle_goto_screen(
    mut commands: Commands,
    goto: Option<Res<GotoScreen>>,
    mut next_screen: ResMut<NextState<Screen>>,
) {
    if let Some(goto) = goto {
        next_screen.set(goto.0);
        commands.remove_resource::<GotoScreen>();
    }
}
