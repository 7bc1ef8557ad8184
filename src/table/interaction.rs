//! Hover and idle effects on card faces.
//!
//! These are purely visual: they move the face mesh relative to its card
//! root and never touch the store.

use std::time::Duration;

use bevy::prelude::*;

use super::{
    AnimationPhase, CardFace, CardHover, CardOut, GameStore, PlayAnimator,
    ease::{TweenEase, idle_wave},
    layout::normalized_position,
};

const HOVER_LIFT: Vec3 = Vec3::new(0.0, 0.75, 0.5);
const HOVER_TILT: f32 = -0.1;
/// Yaw toward the center of the hand, scaled by the normalized position.
const HOVER_TURN: f32 = 0.15;
const HOVER_IN_MOVE: Duration = Duration::from_millis(500);
const HOVER_IN_TURN: Duration = Duration::from_millis(400);
const HOVER_OUT_MOVE: Duration = Duration::from_millis(350);
const HOVER_OUT_TURN: Duration = Duration::from_millis(300);

const FLOAT_AMPLITUDE: f32 = 0.15;
const FLOAT_HALF_PERIOD: f32 = 1.5;
const WOBBLE_AMPLITUDE: f32 = 0.05;
const WOBBLE_HALF_PERIOD: f32 = 2.2;
/// How fast the idle motion fades in and out, per second.
const IDLE_BLEND_RATE: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct HoverTween {
    started_at: Duration,
    from_offset: Vec3,
    to_offset: Vec3,
    from_angles: Vec3,
    to_angles: Vec3,
    move_duration: Duration,
    turn_duration: Duration,
    move_ease: TweenEase,
    turn_ease: TweenEase,
}

impl HoverTween {
    /// Returns (offset, angles, finished).
    fn sample(&self, now: Duration) -> (Vec3, Vec3, bool) {
        let elapsed = now.saturating_sub(self.started_at);
        let fraction = |duration: Duration| {
            if duration.is_zero() {
                1.0
            } else {
                (elapsed.as_secs_f32() / duration.as_secs_f32()).min(1.0)
            }
        };
        let moved = fraction(self.move_duration);
        let turned = fraction(self.turn_duration);

        let offset = self
            .from_offset
            .lerp(self.to_offset, self.move_ease.sample_clamped(moved));
        let angles = self
            .from_angles
            .lerp(self.to_angles, self.turn_ease.sample_clamped(turned));
        (offset, angles, moved >= 1.0 && turned >= 1.0)
    }
}

#[derive(Component, Debug, Clone)]
pub struct CardInteraction {
    normalized: f32,
    idle_phase: f32,
    hovered: bool,
    offset: Vec3,
    /// Euler XYZ angles of the face.
    angles: Vec3,
    tween: Option<HoverTween>,
    idle_weight: f32,
    last_sample: Option<Duration>,
}

impl CardInteraction {
    pub fn new(index: usize, total: usize) -> Self {
        Self {
            normalized: normalized_position(index, total),
            // Spread the idle motion so cards do not bob in lockstep.
            idle_phase: index as f32 * 0.37,
            hovered: false,
            offset: Vec3::ZERO,
            angles: Vec3::ZERO,
            tween: None,
            idle_weight: 0.0,
            last_sample: None,
        }
    }

    pub fn set_slot(&mut self, index: usize, total: usize) {
        self.normalized = normalized_position(index, total);
    }

    pub fn normalized_position(&self) -> f32 {
        self.normalized
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn hover_in(&mut self, now: Duration) -> bool {
        if self.hovered {
            return false;
        }
        self.hovered = true;
        self.tween = Some(HoverTween {
            started_at: now,
            from_offset: self.offset,
            to_offset: HOVER_LIFT,
            from_angles: self.angles,
            to_angles: Vec3::new(HOVER_TILT, -self.normalized * HOVER_TURN, 0.0),
            move_duration: HOVER_IN_MOVE,
            turn_duration: HOVER_IN_TURN,
            move_ease: TweenEase::BackOut(1.5),
            turn_ease: TweenEase::Function(EaseFunction::QuadraticOut),
        });
        true
    }

    pub fn hover_out(&mut self, now: Duration) -> bool {
        if !self.hovered {
            return false;
        }
        self.hovered = false;
        self.tween = Some(HoverTween {
            started_at: now,
            from_offset: self.offset,
            to_offset: Vec3::ZERO,
            from_angles: self.angles,
            to_angles: Vec3::ZERO,
            move_duration: HOVER_OUT_MOVE,
            turn_duration: HOVER_OUT_TURN,
            move_ease: TweenEase::Function(EaseFunction::QuadraticOut),
            turn_ease: TweenEase::BackOut(1.0),
        });
        true
    }

    /// Drop every transient effect.
    pub fn reset(&mut self) {
        self.hovered = false;
        self.offset = Vec3::ZERO;
        self.angles = Vec3::ZERO;
        self.tween = None;
        self.idle_weight = 0.0;
    }

    /// Local pose of the face at `now`. `idle_allowed` is false while the
    /// card is flying to the wall.
    pub fn sample(&mut self, now: Duration, idle_allowed: bool) -> Transform {
        let dt = self
            .last_sample
            .map(|last| now.saturating_sub(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_sample = Some(now);

        if let Some(tween) = self.tween {
            let (offset, angles, finished) = tween.sample(now);
            self.offset = offset;
            self.angles = angles;
            if finished {
                self.tween = None;
            }
        }

        let idle_target = if idle_allowed && !self.hovered && self.tween.is_none() {
            1.0
        } else {
            0.0
        };
        self.idle_weight += (idle_target - self.idle_weight) * (1.0 - (-IDLE_BLEND_RATE * dt).exp());

        let clock = now.as_secs_f32() + self.idle_phase;
        let float = FLOAT_AMPLITUDE * idle_wave(clock / FLOAT_HALF_PERIOD);
        let wobble = WOBBLE_AMPLITUDE * idle_wave(clock / WOBBLE_HALF_PERIOD);

        Transform {
            translation: self.offset + Vec3::Y * (float * self.idle_weight),
            rotation: Quat::from_euler(
                EulerRot::XYZ,
                self.angles.x,
                self.angles.y,
                self.angles.z + wobble * self.idle_weight,
            ),
            scale: Vec3::ONE,
        }
    }
}

fn is_idle(animators: &Query<&PlayAnimator>, root: Entity) -> bool {
    animators
        .get(root)
        .map(|animator| animator.phase() == AnimationPhase::Idle)
        .unwrap_or(false)
}

pub(super) fn handle_hover_messages(
    mut hovers: MessageReader<CardHover>,
    mut outs: MessageReader<CardOut>,
    time: Res<Time<Real>>,
    animators: Query<&PlayAnimator>,
    mut faces: Query<(&CardFace, &mut CardInteraction)>,
) {
    let now = time.elapsed();
    for hover in hovers.read() {
        let Ok((face, mut interaction)) = faces.get_mut(hover.entity) else {
            continue;
        };
        // Only cards still in the hand react to hovering.
        if is_idle(&animators, face.root) {
            interaction.hover_in(now);
        }
    }
    for out in outs.read() {
        if let Ok((_, mut interaction)) = faces.get_mut(out.entity) {
            interaction.hover_out(now);
        }
    }
}

pub(super) fn animate_card_faces(
    time: Res<Time<Real>>,
    animators: Query<&PlayAnimator>,
    mut faces: Query<(&CardFace, &mut CardInteraction, &mut Transform)>,
) {
    let now = time.elapsed();
    for (face, mut interaction, mut transform) in &mut faces {
        let idle_allowed = animators
            .get(face.root)
            .map(|animator| animator.phase() != AnimationPhase::Playing)
            .unwrap_or(false);
        let pose = interaction.sample(now, idle_allowed);
        transform.translation = pose.translation;
        transform.rotation = pose.rotation;
    }
}

pub(super) fn reset_interactions_on_reset(
    store: Res<GameStore>,
    mut seen: Local<u64>,
    mut faces: Query<&mut CardInteraction>,
) {
    if store.reset_counter() == *seen {
        return;
    }
    *seen = store.reset_counter();
    for mut interaction in &mut faces {
        interaction.reset();
    }
}
