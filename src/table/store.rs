//! Game state store - the catalog, which cards are on the wall, and the
//! per-card animation records that let animations survive a respawn.

use std::time::Duration;

use bevy::{ecs::message::Message, platform::collections::HashMap, prelude::*};

use super::{Card, CardId, default_catalog, load_catalog};
use crate::settings::TableSettings;

/// Duration used when a caller registers an animation without its own.
pub const DEFAULT_ANIMATION_DURATION: Duration = Duration::from_millis(1500);

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<GameStore>();
    app.add_message::<ResetRequest>();
    app.add_message::<GameReset>();
    app.add_message::<CardPlayed>();
    app.add_systems(Startup, load_configured_catalog);
}

/// Replace the built-in cards with the `--catalog` file, if one was given.
fn load_configured_catalog(settings: Res<TableSettings>, mut store: ResMut<GameStore>) {
    let Some(path) = settings.catalog_path.as_deref() else {
        return;
    };
    match load_catalog(path) {
        Ok(cards) => {
            info!("Loaded {} cards from {}", cards.len(), path.display());
            *store = GameStore::new(cards);
        }
        Err(err) => warn!("Using built-in cards: {err}"),
    }
}

/// Lifecycle of a card's play animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum AnimationPhase {
    #[default]
    Idle,
    Playing,
    Completed,
}

/// Stored record of a play animation.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct CardAnimationState {
    pub card_id: CardId,
    pub start_position: Vec3,
    pub target_position: Vec3,
    /// Real time since startup when the animation began.
    pub start_time: Duration,
    pub animation_duration: Duration,
    pub animation_state: AnimationPhase,
}

impl CardAnimationState {
    /// Elapsed / duration, clamped to `[0, 1]`.
    pub fn progress(&self, now: Duration) -> f32 {
        if self.animation_duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.start_time);
        (elapsed.as_secs_f32() / self.animation_duration.as_secs_f32()).clamp(0.0, 1.0)
    }
}

/// Request to reset the table, written by the UI and keyboard input.
#[derive(Message, Debug, Clone, Copy)]
pub struct ResetRequest;

/// Fired after the store has been reset.
#[derive(Message, Debug, Clone, Copy)]
pub struct GameReset {
    pub reset_counter: u64,
}

/// Fired when a card moves from the hand to the wall.
#[derive(Message, Debug, Clone, Copy)]
pub struct CardPlayed {
    pub card_id: CardId,
}

/// Single authoritative record of the table.
///
/// Derived views (`available_*` / `played_*`) are recomputed after every
/// mutation, so reads never see a stale split of the catalog.
#[derive(Resource, Debug, Clone)]
pub struct GameStore {
    cards: Vec<Card>,
    index: HashMap<CardId, usize>,
    played_ids: Vec<CardId>,
    available_ids: Vec<CardId>,
    animations: HashMap<CardId, CardAnimationState>,
    reset_counter: u64,
}

impl Default for GameStore {
    fn default() -> Self {
        Self::new(default_catalog())
    }
}

impl GameStore {
    pub fn new(cards: Vec<Card>) -> Self {
        let mut index = HashMap::default();
        for (position, card) in cards.iter().enumerate() {
            index.entry(card.id).or_insert(position);
        }

        let mut store = Self {
            cards,
            index,
            played_ids: Vec::new(),
            available_ids: Vec::new(),
            animations: HashMap::default(),
            reset_counter: 0,
        };
        store.recompute();
        store
    }

    /// Move a card from the hand to the wall.
    ///
    /// Returns `false` without changing anything if the card is already
    /// played or is not part of the catalog.
    pub fn play_card(&mut self, id: CardId) -> bool {
        if !self.index.contains_key(&id) || self.is_played(id) {
            return false;
        }
        self.played_ids.push(id);
        self.recompute();
        true
    }

    /// Insert or overwrite the animation record for `id` as playing.
    pub fn start_card_animation(
        &mut self,
        id: CardId,
        start_position: Vec3,
        target_position: Vec3,
        animation_duration: Duration,
        now: Duration,
    ) {
        self.animations.insert(
            id,
            CardAnimationState {
                card_id: id,
                start_position,
                target_position,
                start_time: now,
                animation_duration,
                animation_state: AnimationPhase::Playing,
            },
        );
    }

    /// Mark an existing record as completed. No-op without a record.
    pub fn complete_card_animation(&mut self, id: CardId) -> bool {
        match self.animations.get_mut(&id) {
            Some(record) => {
                record.animation_state = AnimationPhase::Completed;
                true
            }
            None => false,
        }
    }

    pub fn card_animation_state(&self, id: CardId) -> Option<&CardAnimationState> {
        self.animations.get(&id)
    }

    /// Clear played cards and animation records, then bump the reset counter.
    pub fn reset_game(&mut self) {
        self.played_ids.clear();
        self.animations.clear();
        self.reset_counter += 1;
        self.recompute();
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.index.get(&id).map(|&position| &self.cards[position])
    }

    pub fn catalog(&self) -> &[Card] {
        &self.cards
    }

    pub fn is_played(&self, id: CardId) -> bool {
        self.played_ids.contains(&id)
    }

    /// Played card ids in play order.
    pub fn played_ids(&self) -> &[CardId] {
        &self.played_ids
    }

    /// Hand card ids in catalog order.
    pub fn available_ids(&self) -> &[CardId] {
        &self.available_ids
    }

    pub fn played_cards(&self) -> impl Iterator<Item = &Card> + '_ {
        self.played_ids.iter().filter_map(|id| self.card(*id))
    }

    pub fn available_cards(&self) -> impl Iterator<Item = &Card> + '_ {
        self.available_ids.iter().filter_map(|id| self.card(*id))
    }

    /// Monotonic change signal for anything holding transient state.
    pub fn reset_counter(&self) -> u64 {
        self.reset_counter
    }

    fn recompute(&mut self) {
        self.available_ids = self
            .cards
            .iter()
            .map(|card| card.id)
            .filter(|id| !self.played_ids.contains(id))
            .collect();
    }
}

/// Apply reset requests and announce them.
pub(super) fn handle_reset_requests(
    mut requests: MessageReader<ResetRequest>,
    mut store: ResMut<GameStore>,
    mut resets: MessageWriter<GameReset>,
) {
    if requests.read().count() == 0 {
        return;
    }

    store.reset_game();
    info!("Table reset (#{})", store.reset_counter());
    resets.write(GameReset {
        reset_counter: store.reset_counter(),
    });
}
