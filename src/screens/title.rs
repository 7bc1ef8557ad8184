//! The title screen.

use bevy::prelude::*;

use crate::{AppSystems, screens::Screen, table::GameStore};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(Screen::Title), spawn_title_screen);
    app.add_systems(
        Update,
        (handle_play_click, handle_start_keys)
            .in_set(AppSystems::RecordInput)
            .run_if(in_state(Screen::Title)),
    );
}

#[derive(Component)]
struct PlayButton;

fn spawn_title_screen(mut commands: Commands, store: Res<GameStore>) {
    let label = if store.played_ids().is_empty() {
        "Play"
    } else {
        "Continue"
    };

    commands.spawn((
        Name::new("Title Screen"),
        Node {
            position_type: PositionType::Absolute,
            width: percent(100),
            height: percent(100),
            flex_direction: FlexDirection::Column,
            align_items: AlignItems::Center,
            justify_content: JustifyContent::Center,
            row_gap: px(24),
            ..default()
        },
        BackgroundColor(Color::srgb(0.07, 0.08, 0.11)),
        GlobalZIndex(2),
        DespawnOnExit(Screen::Title),
        children![
            (
                Text::new("Card Wall"),
                TextFont::from_font_size(56.0),
                TextColor(Color::srgb(0.95, 0.9, 0.8)),
            ),
            (
                Name::new("Play Button"),
                PlayButton,
                Button,
                Node {
                    width: px(200),
                    height: px(64),
                    justify_content: JustifyContent::Center,
                    align_items: AlignItems::Center,
                    border_radius: BorderRadius::all(px(10)),
                    ..default()
                },
                BackgroundColor(Color::srgb(0.25, 0.3, 0.45)),
                children![(
                    Text::new(label),
                    TextFont::from_font_size(26.0),
                    TextColor(Color::WHITE),
                )],
            ),
            (
                Text::new("Enter or Space to start"),
                TextFont::from_font_size(16.0),
                TextColor(Color::srgb(0.6, 0.6, 0.65)),
            ),
        ],
    ));
}

fn handle_play_click(
    play_button: Query<&Interaction, (Changed<Interaction>, With<PlayButton>)>,
    mut next_screen: ResMut<NextState<Screen>>,
) {
    for interaction in &play_button {
        if *interaction == Interaction::Pressed {
            next_screen.set(Screen::Table);
        }
    }
}

fn handle_start_keys(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut next_screen: ResMut<NextState<Screen>>,
) {
    if keyboard.any_just_pressed([KeyCode::Enter, KeyCode::Space]) {
        next_screen.set(Screen::Table);
    }
}
