//! Shared input buffer for keyboard, UI buttons and simulated input.

use bevy::prelude::*;

use super::{CardPress, GameStore, ResetRequest, TableCard, TableSystems};
use crate::{
    AppSystems,
    input::{
        INPUT_BACK, INPUT_CARD_MASK, INPUT_RESET, flags_from_keyboard, pressed_card_indices,
    },
    screens::Screen,
};

/// One-frame input buffer that UI and keyboard systems can write into.
#[derive(Resource, Default)]
pub struct PendingInput {
    flags: u16,
}

impl PendingInput {
    pub fn push_flags(&mut self, flags: u16) {
        self.flags |= flags;
    }

    pub fn take_flags(&mut self) -> u16 {
        let flags = self.flags;
        self.flags = 0;
        flags
    }
}

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<PendingInput>();
    app.add_systems(
        Update,
        capture_keyboard_input
            .in_set(AppSystems::RecordInput)
            .run_if(in_state(Screen::Table)),
    );
    app.add_systems(
        Update,
        apply_pending_inputs
            .in_set(TableSystems::Input)
            .run_if(in_state(Screen::Table)),
    );
    app.add_systems(OnExit(Screen::Table), clear_pending_input);

    // BRP remote input simulation (dev only)
    #[cfg(feature = "dev")]
    {
        app.register_type::<SimulateInput>();
        app.add_systems(
            Update,
            handle_simulated_input
                .in_set(AppSystems::RecordInput)
                .run_if(in_state(Screen::Table)),
        );
    }
}

/// Resource to simulate keyboard input via BRP.
/// Insert with a key name: "R" to reset, "1"-"9" for cards, "0" for the 10th card.
#[cfg(feature = "dev")]
#[derive(Resource, Reflect, Default)]
#[reflect(Resource)]
pub struct SimulateInput(pub String);

#[cfg(feature = "dev")]
fn handle_simulated_input(
    mut commands: Commands,
    sim_input: Option<Res<SimulateInput>>,
    mut pending_input: ResMut<PendingInput>,
) {
    let Some(input) = sim_input else {
        return;
    };

    commands.remove_resource::<SimulateInput>();
    let flags = crate::input::flags_from_key_string(&input.0);
    if flags != 0 {
        pending_input.push_flags(flags);
    }
}

fn capture_keyboard_input(keyboard: Res<ButtonInput<KeyCode>>, mut pending: ResMut<PendingInput>) {
    pending.push_flags(flags_from_keyboard(&keyboard));
}

fn clear_pending_input(mut pending: ResMut<PendingInput>) {
    pending.take_flags();
}

fn apply_pending_inputs(
    mut pending: ResMut<PendingInput>,
    store: Res<GameStore>,
    cards: Query<(Entity, &TableCard)>,
    mut presses: MessageWriter<CardPress>,
    mut resets: MessageWriter<ResetRequest>,
    mut next_screen: ResMut<NextState<Screen>>,
) {
    let flags = pending.take_flags();
    if flags == 0 {
        return;
    }

    if flags & INPUT_RESET != 0 {
        resets.write(ResetRequest);
    }

    if flags & INPUT_BACK != 0 {
        next_screen.set(Screen::Title);
        return;
    }

    if flags & INPUT_CARD_MASK == 0 {
        return;
    }

    // One card per frame, like a single click.
    if let Some(index) = pressed_card_indices(flags).next() {
        let Some(card_id) = store.available_ids().get(index).copied() else {
            debug!("No card at hand slot {}", index + 1);
            return;
        };
        if let Some((entity, _)) = cards.iter().find(|(_, card)| card.id == card_id) {
            presses.write(CardPress { entity });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        input::{INPUT_CARD_1, INPUT_CARD_2},
        table::CardId,
    };

    fn input_app() -> App {
        let mut app = App::new();
        app.init_resource::<PendingInput>();
        app.init_resource::<GameStore>();
        app.init_resource::<NextState<Screen>>();
        app.add_message::<CardPress>();
        app.add_message::<ResetRequest>();
        app.add_systems(Update, apply_pending_inputs);
        for id in 1..=4 {
            app.world_mut().spawn(TableCard { id: CardId(id) });
        }
        app
    }

    fn pressed_cards(app: &App) -> Vec<CardId> {
        let messages = app.world().resource::<Messages<CardPress>>();
        messages
            .get_cursor()
            .read(messages)
            .filter_map(|press| app.world().get::<TableCard>(press.entity))
            .map(|card| card.id)
            .collect()
    }

    fn reset_requests(app: &App) -> usize {
        let messages = app.world().resource::<Messages<ResetRequest>>();
        messages.get_cursor().read(messages).count()
    }

    #[test]
    fn digit_picks_the_nth_card_still_in_hand() {
        let mut app = input_app();
        app.world_mut()
            .resource_mut::<GameStore>()
            .play_card(CardId(1));

        app.world_mut()
            .resource_mut::<PendingInput>()
            .push_flags(INPUT_CARD_2);
        app.update();

        assert_eq!(pressed_cards(&app), vec![CardId(3)]);
    }

    #[test]
    fn digit_past_the_hand_presses_nothing() {
        let mut app = input_app();
        for id in 1..=10 {
            app.world_mut()
                .resource_mut::<GameStore>()
                .play_card(CardId(id));
        }

        app.world_mut()
            .resource_mut::<PendingInput>()
            .push_flags(INPUT_CARD_1);
        app.update();

        assert!(pressed_cards(&app).is_empty());
    }

    #[test]
    fn back_and_reset_in_one_frame_both_apply() {
        let mut app = input_app();
        app.world_mut()
            .resource_mut::<PendingInput>()
            .push_flags(INPUT_BACK | INPUT_RESET | INPUT_CARD_1);
        app.update();

        assert_eq!(reset_requests(&app), 1);
        assert!(matches!(
            *app.world().resource::<NextState<Screen>>(),
            NextState::Pending(Screen::Title)
        ));
        // Leaving the table does not also play a card.
        assert!(pressed_cards(&app).is_empty());
    }

    #[test]
    fn pending_flags_accumulate_until_taken() {
        let mut pending = PendingInput::default();
        pending.push_flags(INPUT_RESET);
        pending.push_flags(INPUT_CARD_2);
        assert_eq!(pending.take_flags(), INPUT_RESET | INPUT_CARD_2);
        assert_eq!(pending.take_flags(), 0);
    }
}
