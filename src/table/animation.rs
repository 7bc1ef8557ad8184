//! Play animation - flies a card from the hand onto the wall.
//!
//! Each rendered card carries a [`PlayAnimator`]. Clicking a card starts a
//! one-way `Idle -> Playing -> Completed` run; the per-frame system steps every
//! running animator and reports completion back to the [`GameStore`]. The store
//! keeps the animation record, so a card despawned mid-flight (leaving the
//! table screen) picks up where it left off when it is spawned again.
//!
//! The running part of an animator is a [`FrameTask`]. Stepping requires the
//! task; `cleanup` closes it, and despawning the card drops it with the
//! component, so nothing can keep writing to a removed transform.

use std::time::Duration;

use bevy::prelude::*;

use super::{AnimationPhase, CardId, GameStore};

/// Clicks closer together than this are ignored.
pub const CLICK_DEBOUNCE: Duration = Duration::from_millis(500);
pub const PLAY_DURATION: Duration = Duration::from_millis(800);
/// Uniform scale of a card once it rests on the wall.
pub const WALL_CARD_SCALE: f32 = 0.7;
/// Depth added per card already on the wall, so stacked cards never z-fight.
pub const STACK_DEPTH_STEP: f32 = 0.01;
/// Stored animations further along than this are snapped to the end on restore.
pub const SNAP_THRESHOLD: f32 = 0.95;

pub fn stack_offset(played_count: usize) -> Vec3 {
    Vec3::Z * (STACK_DEPTH_STEP * played_count as f32)
}

/// Pose of a card that finished its flight to `target`.
pub fn landed_transform(target: Vec3) -> Transform {
    Transform::from_translation(target).with_scale(Vec3::splat(WALL_CARD_SCALE))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Inactive,
    Running,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// No stored animation for this card.
    Nothing,
    /// Picked up mid-flight.
    Resumed,
    /// Nearly done; jumped straight to the end.
    Snapped,
    /// Already finished before the card was spawned.
    Landed,
}

/// Handle of a running animation. Closed by `cleanup`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTask {
    started_at: Duration,
    duration: Duration,
}

impl FrameTask {
    fn progress(&self, now: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started_at);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }
}

#[derive(Component, Debug, Clone)]
pub struct PlayAnimator {
    card_id: CardId,
    phase: AnimationPhase,
    progress: f32,
    start: Transform,
    target: Vec3,
    last_accepted: Option<Duration>,
    task: Option<FrameTask>,
}

impl PlayAnimator {
    pub fn new(card_id: CardId) -> Self {
        Self {
            card_id,
            phase: AnimationPhase::Idle,
            progress: 0.0,
            start: Transform::IDENTITY,
            target: Vec3::ZERO,
            last_accepted: None,
            task: None,
        }
    }

    pub fn card_id(&self) -> CardId {
        self.card_id
    }

    pub fn phase(&self) -> AnimationPhase {
        self.phase
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    pub fn is_clickable(&self, now: Duration) -> bool {
        self.phase == AnimationPhase::Idle
            && self
                .last_accepted
                .is_none_or(|last| now.saturating_sub(last) >= CLICK_DEBOUNCE)
    }

    /// Start flying toward `wall_slot`.
    ///
    /// Rejected while not idle or inside the click debounce window. On
    /// acceptance the animation is registered in the store; the caller is
    /// responsible for actually playing the card.
    pub fn start_animation(
        &mut self,
        current: &Transform,
        wall_slot: Vec3,
        played_count: usize,
        store: &mut GameStore,
        now: Duration,
    ) -> bool {
        if self.phase != AnimationPhase::Idle {
            debug!("Card {} is already animating, ignoring", self.card_id);
            return false;
        }
        if !self.is_clickable(now) {
            return false;
        }

        self.last_accepted = Some(now);
        self.start = *current;
        self.target = wall_slot + stack_offset(played_count);
        self.phase = AnimationPhase::Playing;
        self.progress = 0.0;
        store.start_card_animation(
            self.card_id,
            self.start.translation,
            self.target,
            PLAY_DURATION,
            now,
        );
        self.task = Some(FrameTask {
            started_at: now,
            duration: PLAY_DURATION,
        });

        info!("Card {} animating to wall at {}", self.card_id, self.target);
        true
    }

    /// Advance one frame.
    pub fn step(
        &mut self,
        transform: &mut Transform,
        store: &mut GameStore,
        now: Duration,
    ) -> StepOutcome {
        let Some(task) = self.task else {
            return StepOutcome::Inactive;
        };
        if self.phase != AnimationPhase::Playing {
            return StepOutcome::Inactive;
        }

        let progress = task.progress(now);
        self.progress = progress;

        // X/Y overshoot slightly; Z uses a monotonic curve so the card never
        // dips behind cards already on the wall.
        let eased = EaseFunction::BackOut.sample_clamped(progress);
        let depth = EaseFunction::CubicInOut.sample_clamped(progress);
        let from = self.start.translation;
        transform.translation = Vec3::new(
            from.x.lerp(self.target.x, eased),
            from.y.lerp(self.target.y, eased),
            from.z.lerp(self.target.z, depth),
        );

        let straighten = (progress * 2.0).min(1.0);
        transform.rotation = self.start.rotation.slerp(Quat::IDENTITY, straighten);
        transform.scale = self
            .start
            .scale
            .lerp(Vec3::splat(WALL_CARD_SCALE), eased);

        if progress < 1.0 {
            return StepOutcome::Running;
        }

        self.finish(transform);
        store.complete_card_animation(self.card_id);
        StepOutcome::Completed
    }

    /// Pick up an animation recorded in the store, e.g. after the card was
    /// despawned and spawned again.
    pub fn check_stored_animation(
        &mut self,
        transform: &mut Transform,
        store: &mut GameStore,
        now: Duration,
    ) -> Recovery {
        let Some(record) = store.card_animation_state(self.card_id).cloned() else {
            return Recovery::Nothing;
        };

        match record.animation_state {
            AnimationPhase::Idle => Recovery::Nothing,
            AnimationPhase::Completed => {
                self.target = record.target_position;
                self.finish(transform);
                Recovery::Landed
            }
            AnimationPhase::Playing => {
                self.phase = AnimationPhase::Playing;
                self.start = Transform {
                    translation: record.start_position,
                    rotation: transform.rotation,
                    scale: Vec3::ONE,
                };
                self.target = record.target_position;

                if record.progress(now) > SNAP_THRESHOLD {
                    self.finish(transform);
                    store.complete_card_animation(self.card_id);
                    return Recovery::Snapped;
                }

                self.task = Some(FrameTask {
                    started_at: record.start_time,
                    duration: record.animation_duration,
                });
                self.step(transform, store, now);
                Recovery::Resumed
            }
        }
    }

    /// Close the running task. Returns whether one was open.
    pub fn cleanup(&mut self) -> bool {
        let cancelled = self.task.take().is_some();
        if cancelled {
            debug!("Canceling animation for card {}", self.card_id);
        }
        cancelled
    }

    /// Back to the hand after a table reset. The click debounce survives.
    pub fn reset(&mut self) {
        self.phase = AnimationPhase::Idle;
        self.progress = 0.0;
        self.task = None;
    }

    /// Treat the card as resting on the wall without a stored animation.
    pub fn mark_landed(&mut self) {
        self.phase = AnimationPhase::Completed;
        self.progress = 1.0;
        self.task = None;
    }

    fn finish(&mut self, transform: &mut Transform) {
        *transform = landed_transform(self.target);
        self.phase = AnimationPhase::Completed;
        self.progress = 1.0;
        self.task = None;
    }
}

pub(super) fn restore_stored_animations(
    time: Res<Time<Real>>,
    mut store: ResMut<GameStore>,
    mut cards: Query<(&mut PlayAnimator, &mut Transform), Added<PlayAnimator>>,
) {
    let now = time.elapsed();
    for (mut animator, mut transform) in &mut cards {
        match animator.check_stored_animation(&mut transform, &mut store, now) {
            Recovery::Nothing => {
                if store.is_played(animator.card_id()) {
                    animator.mark_landed();
                }
            }
            Recovery::Resumed => info!(
                "Card {} animation at {:.0}% - continuing",
                animator.card_id(),
                animator.progress() * 100.0
            ),
            Recovery::Snapped => info!(
                "Card {} animation was nearly complete - jumped to final position",
                animator.card_id()
            ),
            Recovery::Landed => {}
        }
    }
}

pub(super) fn drive_play_animations(
    time: Res<Time<Real>>,
    mut store: ResMut<GameStore>,
    mut cards: Query<(&mut PlayAnimator, &mut Transform)>,
) {
    let now = time.elapsed();
    for (mut animator, mut transform) in &mut cards {
        if !animator.is_running() {
            continue;
        }
        if animator.step(&mut transform, &mut store, now) == StepOutcome::Completed {
            info!("Card {} animation completed", animator.card_id());
        }
    }
}

/// Send every card back to idle when the store's reset counter moves.
pub(super) fn reset_animators_on_reset(
    store: Res<GameStore>,
    mut seen: Local<u64>,
    mut animators: Query<&mut PlayAnimator>,
) {
    if store.reset_counter() == *seen {
        return;
    }
    *seen = store.reset_counter();
    for mut animator in &mut animators {
        animator.reset();
    }
}

pub(super) fn cancel_play_animations(mut animators: Query<&mut PlayAnimator>) {
    for mut animator in &mut animators {
        animator.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Card;

    const CARD: CardId = CardId(1);

    fn store() -> GameStore {
        GameStore::new(vec![
            Card::new(1, "One", "#e74c3c"),
            Card::new(2, "Two", "#2ecc71"),
        ])
    }

    fn hand_pose() -> Transform {
        Transform::from_xyz(-2.0, -5.0, 0.03).with_rotation(Quat::from_rotation_x(-0.08))
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn start_registers_animation_in_store() {
        let mut store = store();
        let mut animator = PlayAnimator::new(CARD);
        let slot = Vec3::new(1.0, 4.0, 0.0);

        assert!(animator.start_animation(&hand_pose(), slot, 3, &mut store, ms(1000)));
        assert_eq!(animator.phase(), AnimationPhase::Playing);
        assert_eq!(animator.target(), slot + stack_offset(3));

        let record = store.card_animation_state(CARD).unwrap();
        assert_eq!(record.animation_state, AnimationPhase::Playing);
        assert_eq!(record.start_position, hand_pose().translation);
        assert_eq!(record.target_position, animator.target());
        assert_eq!(record.animation_duration, PLAY_DURATION);
    }

    #[test]
    fn second_start_within_debounce_is_ignored() {
        let mut store = store();
        let mut animator = PlayAnimator::new(CARD);
        assert!(animator.start_animation(&hand_pose(), Vec3::Y, 0, &mut store, ms(1000)));
        let before = animator.clone();

        assert!(!animator.start_animation(
            &Transform::IDENTITY,
            Vec3::X,
            5,
            &mut store,
            ms(1200)
        ));
        assert_eq!(animator.phase(), before.phase());
        assert_eq!(animator.target(), before.target());
        assert_eq!(animator.progress(), before.progress());
        assert_eq!(
            store.card_animation_state(CARD).unwrap().start_time,
            ms(1000)
        );
    }

    #[test]
    fn debounce_applies_after_reset() {
        let mut store = store();
        let mut animator = PlayAnimator::new(CARD);
        assert!(animator.start_animation(&hand_pose(), Vec3::Y, 0, &mut store, ms(1000)));
        animator.reset();

        assert!(!animator.is_clickable(ms(1300)));
        assert!(!animator.start_animation(&hand_pose(), Vec3::Y, 0, &mut store, ms(1300)));
        assert!(animator.start_animation(&hand_pose(), Vec3::Y, 0, &mut store, ms(1600)));
    }

    #[test]
    fn completion_snaps_exactly_to_target() {
        let mut store = store();
        let mut animator = PlayAnimator::new(CARD);
        let mut transform = hand_pose();
        let slot = Vec3::new(3.3, 4.7, 0.02);
        animator.start_animation(&transform, slot, 2, &mut store, ms(0));

        for frame in 1..48 {
            let outcome = animator.step(&mut transform, &mut store, ms(frame * 16));
            assert_eq!(outcome, StepOutcome::Running);
        }
        let outcome = animator.step(&mut transform, &mut store, ms(801));
        assert_eq!(outcome, StepOutcome::Completed);

        assert_eq!(transform.translation, slot + stack_offset(2));
        assert_eq!(transform.rotation, Quat::IDENTITY);
        assert_eq!(transform.scale, Vec3::splat(WALL_CARD_SCALE));
        assert_eq!(animator.phase(), AnimationPhase::Completed);
        assert!(!animator.is_running());
        assert_eq!(
            store.card_animation_state(CARD).unwrap().animation_state,
            AnimationPhase::Completed
        );

        assert_eq!(
            animator.step(&mut transform, &mut store, ms(900)),
            StepOutcome::Inactive
        );
    }

    #[test]
    fn depth_moves_monotonically() {
        let mut store = store();
        let mut animator = PlayAnimator::new(CARD);
        let mut transform = hand_pose();
        animator.start_animation(&transform, Vec3::new(0.0, 4.0, 0.5), 0, &mut store, ms(0));

        let mut previous = transform.translation.z;
        for frame in 1..=50 {
            animator.step(&mut transform, &mut store, ms(frame * 16));
            assert!(transform.translation.z >= previous - 1e-6);
            assert!(transform.translation.z <= 0.5 + 1e-6);
            previous = transform.translation.z;
        }
    }

    #[test]
    fn card_straightens_halfway() {
        let mut store = store();
        let mut animator = PlayAnimator::new(CARD);
        let mut transform = hand_pose();
        animator.start_animation(&transform, Vec3::Y, 0, &mut store, ms(0));

        animator.step(&mut transform, &mut store, ms(400));
        assert!(transform.rotation.angle_between(Quat::IDENTITY) < 1e-4);
        assert!(transform.scale.x < 1.0);
    }

    #[test]
    fn nearly_finished_stored_animation_snaps() {
        let mut store = store();
        let target = Vec3::new(2.0, 3.0, 0.01);
        store.start_card_animation(CARD, Vec3::ZERO, target, PLAY_DURATION, ms(0));

        let mut animator = PlayAnimator::new(CARD);
        let mut transform = hand_pose();
        let recovery = animator.check_stored_animation(&mut transform, &mut store, ms(770));

        assert_eq!(recovery, Recovery::Snapped);
        assert_eq!(animator.phase(), AnimationPhase::Completed);
        assert!(!animator.is_running());
        assert_eq!(transform, landed_transform(target));
        assert_eq!(
            store.card_animation_state(CARD).unwrap().animation_state,
            AnimationPhase::Completed
        );
    }

    #[test]
    fn early_stored_animation_resumes() {
        let mut store = store();
        let target = Vec3::new(2.0, 3.0, 0.01);
        store.start_card_animation(CARD, Vec3::ZERO, target, PLAY_DURATION, ms(0));

        let mut animator = PlayAnimator::new(CARD);
        let mut transform = hand_pose();
        let recovery = animator.check_stored_animation(&mut transform, &mut store, ms(400));

        assert_eq!(recovery, Recovery::Resumed);
        assert_eq!(animator.phase(), AnimationPhase::Playing);
        assert!(animator.is_running());
        assert!((animator.progress() - 0.5).abs() < 1e-4);
        assert_ne!(transform.translation, hand_pose().translation);

        assert_eq!(
            animator.step(&mut transform, &mut store, ms(800)),
            StepOutcome::Completed
        );
        assert_eq!(transform.translation, target);
    }

    #[test]
    fn completed_record_lands_without_touching_store() {
        let mut store = store();
        let target = Vec3::new(-1.0, 2.0, 0.0);
        store.start_card_animation(CARD, Vec3::ZERO, target, PLAY_DURATION, ms(0));
        store.complete_card_animation(CARD);

        let mut animator = PlayAnimator::new(CARD);
        let mut transform = Transform::IDENTITY;
        assert_eq!(
            animator.check_stored_animation(&mut transform, &mut store, ms(10)),
            Recovery::Landed
        );
        assert_eq!(transform.translation, target);
        assert_eq!(animator.phase(), AnimationPhase::Completed);
    }

    #[test]
    fn no_record_means_nothing_to_restore() {
        let mut store = store();
        let mut animator = PlayAnimator::new(CardId(2));
        let mut transform = hand_pose();
        assert_eq!(
            animator.check_stored_animation(&mut transform, &mut store, ms(10)),
            Recovery::Nothing
        );
        assert_eq!(transform, hand_pose());
        assert_eq!(animator.phase(), AnimationPhase::Idle);
    }

    #[test]
    fn cleanup_stops_stepping() {
        let mut store = store();
        let mut animator = PlayAnimator::new(CARD);
        let mut transform = hand_pose();
        animator.start_animation(&transform, Vec3::Y, 0, &mut store, ms(0));

        assert!(animator.cleanup());
        assert!(!animator.cleanup());
        let before = transform;
        assert_eq!(
            animator.step(&mut transform, &mut store, ms(400)),
            StepOutcome::Inactive
        );
        assert_eq!(transform, before);
        assert_eq!(
            store.card_animation_state(CARD).unwrap().animation_state,
            AnimationPhase::Playing
        );
    }

    #[test]
    fn respawned_cards_played_without_a_record_count_as_landed() {
        let mut app = App::new();
        let mut store = store();
        store.play_card(CARD);
        app.insert_resource(store);
        app.init_resource::<Time<Real>>();
        app.add_systems(Update, restore_stored_animations);

        let played = app
            .world_mut()
            .spawn((PlayAnimator::new(CARD), hand_pose()))
            .id();
        let in_hand = app
            .world_mut()
            .spawn((PlayAnimator::new(CardId(2)), hand_pose()))
            .id();
        app.update();

        let landed = app.world().get::<PlayAnimator>(played).unwrap();
        assert_eq!(landed.phase(), AnimationPhase::Completed);
        assert!(!landed.is_running());
        // Wall layout owns the transform from here.
        assert_eq!(app.world().get::<Transform>(played), Some(&hand_pose()));

        let idle = app.world().get::<PlayAnimator>(in_hand).unwrap();
        assert_eq!(idle.phase(), AnimationPhase::Idle);
    }
}
