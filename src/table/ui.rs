//! Table UI - hand and wall counters, reset button.

use bevy::prelude::*;

use super::{CardPlayed, GameReset, GameStore, PendingInput, TableSystems};
use crate::{
    AppSystems,
    input::{INPUT_BACK, INPUT_RESET},
    screens::Screen,
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(Screen::Table), spawn_table_ui);
    app.add_systems(
        Update,
        update_counters
            .in_set(TableSystems::Present)
            .run_if(in_state(Screen::Table)),
    );
    app.add_systems(
        Update,
        (handle_reset_click, handle_back_click)
            .in_set(AppSystems::RecordInput)
            .run_if(in_state(Screen::Table)),
    );
}

/// Marker for the hand counter text.
#[derive(Component)]
struct HandCounter;

/// Marker for the wall counter text.
#[derive(Component)]
struct WallCounter;

#[derive(Component)]
struct ResetButton;

#[derive(Component)]
struct BackButton;

fn spawn_table_ui(mut commands: Commands, store: Res<GameStore>) {
    commands.spawn((
        Name::new("Table UI"),
        Node {
            position_type: PositionType::Absolute,
            width: percent(100),
            height: percent(100),
            flex_direction: FlexDirection::Column,
            justify_content: JustifyContent::SpaceBetween,
            padding: UiRect::all(px(20)),
            ..default()
        },
        Pickable::IGNORE,
        DespawnOnExit(Screen::Table),
        children![
            (
                Name::new("Counters"),
                Node {
                    flex_direction: FlexDirection::Row,
                    column_gap: px(20),
                    ..default()
                },
                children![
                    (
                        HandCounter,
                        Text::new(format!("Hand: {}", store.available_ids().len())),
                        TextFont::from_font_size(22.0),
                        TextColor(Color::srgb(0.9, 0.9, 0.9)),
                    ),
                    (
                        WallCounter,
                        Text::new(format!("Wall: {}", store.played_ids().len())),
                        TextFont::from_font_size(22.0),
                        TextColor(Color::srgb(0.9, 0.9, 0.9)),
                    ),
                ],
            ),
            (
                Name::new("Bottom Bar"),
                Node {
                    flex_direction: FlexDirection::Row,
                    justify_content: JustifyContent::SpaceBetween,
                    align_items: AlignItems::End,
                    ..default()
                },
                children![
                    (
                        Text::new("Click a card or press 1-0 to play it, R to reset, Esc to leave"),
                        TextFont::from_font_size(14.0),
                        TextColor(Color::srgb(0.6, 0.6, 0.65)),
                    ),
                    (
                        Node {
                            flex_direction: FlexDirection::Row,
                            column_gap: px(10),
                            ..default()
                        },
                        children![
                            table_button("Back Button", "Back", BackButton),
                            table_button("Reset Button", "Reset", ResetButton),
                        ],
                    ),
                ],
            ),
        ],
    ));
}

fn table_button(name: &'static str, label: &'static str, marker: impl Component) -> impl Bundle {
    (
        Name::new(name),
        marker,
        Button,
        Node {
            width: px(100),
            height: px(44),
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            border_radius: BorderRadius::all(px(8)),
            ..default()
        },
        BackgroundColor(Color::srgb(0.25, 0.3, 0.45)),
        children![(
            Text::new(label),
            TextFont::from_font_size(18.0),
            TextColor(Color::WHITE),
        )],
    )
}

fn update_counters(
    mut played: MessageReader<CardPlayed>,
    mut resets: MessageReader<GameReset>,
    store: Res<GameStore>,
    mut hand_text: Query<&mut Text, (With<HandCounter>, Without<WallCounter>)>,
    mut wall_text: Query<&mut Text, (With<WallCounter>, Without<HandCounter>)>,
) {
    let played = played.read().count();
    let resets = resets.read().count();
    if played + resets == 0 {
        return;
    }
    for mut text in &mut hand_text {
        text.0 = format!("Hand: {}", store.available_ids().len());
    }
    for mut text in &mut wall_text {
        text.0 = format!("Wall: {}", store.played_ids().len());
    }
}

fn handle_reset_click(
    mut pending_input: ResMut<PendingInput>,
    reset_button: Query<&Interaction, (Changed<Interaction>, With<ResetButton>)>,
) {
    for interaction in &reset_button {
        if *interaction != Interaction::Pressed {
            continue;
        }

        pending_input.push_flags(INPUT_RESET);
    }
}

fn handle_back_click(
    mut pending_input: ResMut<PendingInput>,
    back_button: Query<&Interaction, (Changed<Interaction>, With<BackButton>)>,
) {
    for interaction in &back_button {
        if *interaction == Interaction::Pressed {
            pending_input.push_flags(INPUT_BACK);
        }
    }
}
