//! 3D table scene - card entities, pointer routing and layout sync.
//!
//! Each card is two entities: a root carrying [`TableCard`], [`PlayAnimator`]
//! and [`RenderOrder`] whose transform is owned by layout and the play
//! animation, and a pickable face child whose local transform is owned by
//! the [`CardInteraction`] effects.

use std::{num::NonZeroU32, time::Duration};

use bevy::{prelude::*, render::alpha::AlphaMode};
use bevy_rich_text3d::{Text3d, Text3dStyling, TextAlign, TextAnchor, TextAtlas};

use super::{
    AnimationPhase, Card, CardInteraction, CardPlayed, CardTextureCache, GameStore, PlayAnimator,
    TableCard, Viewport,
    animation::{WALL_CARD_SCALE, landed_transform, stack_offset},
    layout::{
        HandLayout, WallLayout, hand_render_order, render_order_depth, stack_render_order,
        wall_render_order,
    },
    texture::text_color_for,
    viewport::ViewportMetrics,
};
use crate::screens::Screen;

/// Size of the card mesh before layout scaling.
pub const CARD_MESH_SIZE: Vec2 = Vec2::new(2.0, 3.0);
const HAND_BOTTOM_MARGIN: f32 = 0.6;
const WALL_TOP_MARGIN: f32 = 0.3;
const CARD_TEXT_LIFT: f32 = 0.002;
/// Approach rate of cards sliding to new slots, per second.
const LAYOUT_SMOOTHING: f32 = 10.0;
const HOVER_GLOW: LinearRgba = LinearRgba::new(0.12, 0.12, 0.1, 1.0);

pub(super) fn plugin(app: &mut App) {
    app.add_message::<CardPress>();
    app.add_message::<CardHover>();
    app.add_message::<CardOut>();
    app.clear_messages_on_exit::<CardPress>(Screen::Table)
        .clear_messages_on_exit::<CardHover>(Screen::Table)
        .clear_messages_on_exit::<CardOut>(Screen::Table);

    app.add_systems(
        OnEnter(Screen::Table),
        (spawn_table_scene, spawn_table_cards).chain(),
    );
}

/// A card was clicked, or picked from the keyboard. `entity` is the card
/// root or its face.
#[derive(Message, Debug, Clone, Copy)]
pub struct CardPress {
    pub entity: Entity,
}

#[derive(Message, Debug, Clone, Copy)]
pub struct CardHover {
    pub entity: Entity,
}

#[derive(Message, Debug, Clone, Copy)]
pub struct CardOut {
    pub entity: Entity,
}

/// Pickable face mesh of a card.
#[derive(Component, Debug, Clone, Copy)]
pub struct CardFace {
    pub root: Entity,
}

/// Draw priority of a card; higher draws on top of overlapping cards.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOrder(pub i32);

#[derive(Resource, Clone)]
struct CardTextMaterial(Handle<StandardMaterial>);

/// Where hand and wall sit for the current viewport.
#[derive(Debug, Clone, Copy)]
pub struct TableGeometry {
    metrics: ViewportMetrics,
    hand: HandLayout,
    wall: WallLayout,
}

impl TableGeometry {
    pub fn new(metrics: ViewportMetrics) -> Self {
        Self {
            metrics,
            hand: HandLayout::new(metrics.world_width()),
            wall: WallLayout::new(metrics.world_width()),
        }
    }

    pub fn hand(&self) -> HandLayout {
        self.hand
    }

    pub fn wall(&self) -> WallLayout {
        self.wall
    }

    pub fn hand_anchor(&self) -> Vec3 {
        let card_height = self.hand.card_dimensions().y;
        Vec3::new(
            0.0,
            -self.metrics.world_height() / 2.0 + card_height / 2.0 + HAND_BOTTOM_MARGIN,
            0.0,
        )
    }

    pub fn wall_anchor(&self) -> Vec3 {
        let card_height = CARD_MESH_SIZE.y * self.wall.card_scale() * WALL_CARD_SCALE;
        Vec3::new(
            0.0,
            self.metrics.world_height() / 2.0 - card_height / 2.0 - WALL_TOP_MARGIN,
            0.0,
        )
    }

    pub fn hand_slot(&self, index: usize, total: usize) -> Transform {
        Transform::from_translation(self.hand_anchor() + self.hand.position(index, total))
            .with_rotation(self.hand.rotation(index, total))
    }

    /// Wall position before the per-card stack offset.
    pub fn wall_slot(&self, index: usize, total: usize) -> Vec3 {
        self.wall_anchor() + self.wall.position(index, total)
    }

    /// Final pose of the `index`-th played card.
    pub fn resting_slot(&self, index: usize, total: usize) -> Transform {
        landed_transform(self.wall_slot(index, total) + stack_offset(index))
    }
}

fn smoothing(delta: Duration) -> f32 {
    1.0 - (-LAYOUT_SMOOTHING * delta.as_secs_f32()).exp()
}

fn approach(transform: &mut Transform, target: &Transform, t: f32) {
    transform.translation = transform.translation.lerp(target.translation, t);
    transform.rotation = transform.rotation.slerp(target.rotation, t);
    transform.scale = transform.scale.lerp(target.scale, t);
}

fn spawn_table_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.insert_resource(GlobalAmbientLight {
        color: Color::WHITE,
        brightness: 900.0,
        affects_lightmapped_meshes: true,
    });

    commands.spawn((
        Name::new("Table Light"),
        DirectionalLight {
            illuminance: 6000.0,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 12.0).looking_at(Vec3::ZERO, Vec3::Y),
        DespawnOnExit(Screen::Table),
    ));

    commands.spawn((
        Name::new("Table Backdrop"),
        Mesh3d(meshes.add(Rectangle::new(80.0, 50.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.07, 0.08, 0.11),
            perceptual_roughness: 0.95,
            ..default()
        })),
        Transform::from_xyz(0.0, 0.0, -1.0),
        DespawnOnExit(Screen::Table),
    ));

    let text_material = materials.add(StandardMaterial {
        base_color_texture: Some(TextAtlas::DEFAULT_IMAGE.clone()),
        alpha_mode: AlphaMode::Mask(0.5),
        unlit: true,
        ..default()
    });
    commands.insert_resource(CardTextMaterial(text_material));
}

fn spawn_table_cards(
    mut commands: Commands,
    store: Res<GameStore>,
    viewport: Res<Viewport>,
    text_material: Res<CardTextMaterial>,
    mut textures: ResMut<CardTextureCache>,
    mut images: ResMut<Assets<Image>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let geometry = TableGeometry::new(viewport.metrics());
    let card_mesh = meshes.add(Rectangle::from_size(CARD_MESH_SIZE));
    let hand_total = store.available_ids().len();
    let wall_total = store.played_ids().len();

    for card in store.catalog() {
        // Played cards start on the wall; stored animations move them on
        // their first frame.
        let (transform, order, slot) =
            if let Some(index) = store.played_ids().iter().position(|id| *id == card.id) {
                (
                    geometry.resting_slot(index, wall_total),
                    wall_render_order(index),
                    (index, wall_total),
                )
            } else {
                let index = store
                    .available_ids()
                    .iter()
                    .position(|id| *id == card.id)
                    .unwrap_or_default();
                (
                    geometry.hand_slot(index, hand_total),
                    hand_render_order(index, hand_total),
                    (index, hand_total),
                )
            };

        let material = materials.add(face_material(card, textures.face_for(card, &mut images)));
        let text_color = text_color_for(&card.color)
            .ok()
            .and_then(|hex| Srgba::hex(hex).ok())
            .unwrap_or(Srgba::WHITE);

        let root = commands
            .spawn((
                Name::new(format!("Card {}", card.id)),
                TableCard { id: card.id },
                PlayAnimator::new(card.id),
                RenderOrder(order),
                transform,
                Visibility::default(),
                DespawnOnExit(Screen::Table),
            ))
            .id();

        commands.entity(root).with_children(|parent| {
            parent
                .spawn((
                    Name::new("Card Face"),
                    CardFace { root },
                    CardInteraction::new(slot.0, slot.1),
                    Mesh3d(card_mesh.clone()),
                    MeshMaterial3d(material),
                    Transform::from_scale(Vec3::splat(geometry.hand().scale_factor())),
                    Pickable::default(),
                ))
                .observe(on_card_over)
                .observe(on_card_out)
                .observe(on_card_click)
                .with_children(|face| {
                    face.spawn((
                        Name::new("Card Name Text"),
                        Text3d::new(card.name.clone()),
                        Text3dStyling {
                            size: 16.0,
                            color: text_color,
                            stroke: NonZeroU32::new(1),
                            stroke_color: Srgba::new(0.0, 0.0, 0.0, 0.3),
                            align: TextAlign::Center,
                            anchor: TextAnchor::CENTER,
                            world_scale: Some(Vec2::splat(0.22)),
                            layer_offset: 0.001,
                            ..default()
                        },
                        Mesh3d::default(),
                        MeshMaterial3d(text_material.0.clone()),
                        Transform::from_xyz(0.0, 0.0, CARD_TEXT_LIFT),
                        Pickable::IGNORE,
                    ));
                });
        });
    }

    info!(
        "Table spawned: {} in hand, {} on the wall",
        hand_total, wall_total
    );
}

/// Textured material for a card; flat card color when no texture exists.
fn face_material(card: &Card, texture: Option<Handle<Image>>) -> StandardMaterial {
    let base_color = if texture.is_some() {
        Color::WHITE
    } else {
        Srgba::hex(&card.color)
            .map(Color::from)
            .unwrap_or(Color::srgb(0.5, 0.5, 0.5))
    };
    StandardMaterial {
        base_color,
        base_color_texture: texture,
        perceptual_roughness: 0.6,
        ..default()
    }
}

fn on_card_click(click: On<Pointer<Click>>, mut ew_card: MessageWriter<CardPress>) {
    ew_card.write(CardPress {
        entity: click.event().entity,
    });
}

fn on_card_over(hover: On<Pointer<Over>>, mut ew_card: MessageWriter<CardHover>) {
    ew_card.write(CardHover {
        entity: hover.event().entity,
    });
}

fn on_card_out(out: On<Pointer<Out>>, mut ew_card: MessageWriter<CardOut>) {
    ew_card.write(CardOut {
        entity: out.event().entity,
    });
}

pub(super) fn handle_card_press(
    mut presses: MessageReader<CardPress>,
    time: Res<Time<Real>>,
    viewport: Res<Viewport>,
    mut store: ResMut<GameStore>,
    faces: Query<&CardFace>,
    mut cards: Query<(&TableCard, &mut PlayAnimator, &mut RenderOrder, &Transform)>,
    mut played: MessageWriter<CardPlayed>,
) {
    let now = time.elapsed();
    let geometry = TableGeometry::new(viewport.metrics());

    for press in presses.read() {
        let root = faces
            .get(press.entity)
            .map(|face| face.root)
            .unwrap_or(press.entity);
        let Ok((card, mut animator, mut order, transform)) = cards.get_mut(root) else {
            debug!("Press on {:?} does not belong to a card", press.entity);
            continue;
        };
        if store.is_played(card.id) {
            continue;
        }

        let played_count = store.played_ids().len();
        let slot = geometry.wall_slot(played_count, played_count + 1);
        if !animator.start_animation(transform, slot, played_count, &mut store, now) {
            continue;
        }
        if store.play_card(card.id) {
            order.0 = stack_render_order(played_count);
            played.write(CardPlayed { card_id: card.id });
        }
    }
}

pub(super) fn sync_hand_layout(
    time: Res<Time<Real>>,
    viewport: Res<Viewport>,
    store: Res<GameStore>,
    mut cards: Query<(&TableCard, &PlayAnimator, &mut RenderOrder, &mut Transform)>,
) {
    let geometry = TableGeometry::new(viewport.metrics());
    let t = smoothing(time.delta());
    let available = store.available_ids();

    for (card, animator, mut order, mut transform) in &mut cards {
        if animator.phase() != AnimationPhase::Idle {
            continue;
        }
        let Some(index) = available.iter().position(|id| *id == card.id) else {
            continue;
        };
        let target = geometry.hand_slot(index, available.len());
        approach(&mut transform, &target, t);
        order.set_if_neq(RenderOrder(hand_render_order(index, available.len())));
    }
}

pub(super) fn sync_wall_layout(
    time: Res<Time<Real>>,
    viewport: Res<Viewport>,
    store: Res<GameStore>,
    mut cards: Query<(&TableCard, &PlayAnimator, &mut RenderOrder, &mut Transform)>,
) {
    let geometry = TableGeometry::new(viewport.metrics());
    let t = smoothing(time.delta());
    let played = store.played_ids();

    for (card, animator, mut order, mut transform) in &mut cards {
        // Flying cards belong to their animator until they land.
        if animator.phase() != AnimationPhase::Completed {
            continue;
        }
        let Some(index) = played.iter().position(|id| *id == card.id) else {
            continue;
        };
        let target = geometry.resting_slot(index, played.len());
        approach(&mut transform, &target, t);
        order.set_if_neq(RenderOrder(wall_render_order(index)));
    }
}

/// Face scale and hover slot follow where the card lives.
pub(super) fn sync_card_faces(
    time: Res<Time<Real>>,
    viewport: Res<Viewport>,
    store: Res<GameStore>,
    roots: Query<(&TableCard, &PlayAnimator)>,
    mut faces: Query<(&CardFace, &mut CardInteraction, &mut Transform)>,
) {
    let geometry = TableGeometry::new(viewport.metrics());
    let t = smoothing(time.delta());
    let available = store.available_ids();

    for (face, mut interaction, mut transform) in &mut faces {
        let Ok((card, animator)) = roots.get(face.root) else {
            continue;
        };

        let scale = if animator.phase() == AnimationPhase::Idle {
            if let Some(index) = available.iter().position(|id| *id == card.id) {
                interaction.set_slot(index, available.len());
            }
            geometry.hand().scale_factor()
        } else {
            if interaction.is_hovered() {
                interaction.hover_out(time.elapsed());
            }
            geometry.wall().card_scale()
        };
        transform.scale = transform.scale.lerp(Vec3::splat(scale), t);
    }
}

/// Nudges each face toward the camera by its root's draw priority. Runs
/// after the face pose is written for the frame; the name text is a child of
/// the face and moves with it.
pub(super) fn apply_render_order(
    roots: Query<&RenderOrder>,
    mut faces: Query<(&CardFace, &mut Transform)>,
) {
    for (face, mut transform) in &mut faces {
        if let Ok(order) = roots.get(face.root) {
            transform.translation.z += render_order_depth(order.0);
        }
    }
}

pub(super) fn highlight_hovered_faces(
    faces: Query<(&CardInteraction, &MeshMaterial3d<StandardMaterial>)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (interaction, material) in &faces {
        let glow = if interaction.is_hovered() {
            HOVER_GLOW
        } else {
            LinearRgba::BLACK
        };
        let needs_update = materials
            .get(&material.0)
            .is_some_and(|current| current.emissive != glow);
        if !needs_update {
            continue;
        }
        if let Some(material) = materials.get_mut(&material.0) {
            material.emissive = glow;
        }
    }
}
