//! Generated card-face textures and the cache that owns them.

use std::hash::Hash;

use bevy::{
    asset::RenderAssetUsages,
    color::HexColorError,
    platform::collections::HashMap,
    prelude::*,
    render::render_resource::{Extent3d, TextureDimension, TextureFormat},
};
use thiserror::Error;

use super::Card;
use crate::settings::TableSettings;

pub const FACE_WIDTH: u32 = 256;
pub const FACE_HEIGHT: u32 = 384;

const OUTER_BORDER_INSET: u32 = 10;
const OUTER_BORDER_WIDTH: u32 = 5;
const INNER_BORDER_INSET: u32 = 13;
const INNER_BORDER_WIDTH: u32 = 2;

const DARK_TEXT: &str = "#000000";
const LIGHT_TEXT: &str = "#ffffff";

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<CardTextureCache>();
}

#[derive(Debug, Error)]
pub enum CardFaceError {
    #[error("invalid card color {color:?}")]
    InvalidColor {
        color: String,
        #[source]
        source: HexColorError,
    },
}

fn parse_color(color: &str) -> Result<Srgba, CardFaceError> {
    Srgba::hex(color).map_err(|source| CardFaceError::InvalidColor {
        color: color.to_string(),
        source,
    })
}

/// Black text on light backgrounds, white text on dark ones.
pub fn text_color_for(color: &str) -> Result<&'static str, CardFaceError> {
    let background = parse_color(color)?;
    let channel = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round();
    let brightness = (channel(background.red) * 299.0
        + channel(background.green) * 587.0
        + channel(background.blue) * 114.0)
        / 1000.0;
    Ok(if brightness > 128.0 {
        DARK_TEXT
    } else {
        LIGHT_TEXT
    })
}

/// Identity of a generated face.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CardFaceKey {
    pub name: String,
    pub color: String,
    pub text_color: String,
}

impl CardFaceKey {
    pub fn for_card(card: &Card) -> Result<Self, CardFaceError> {
        Ok(Self {
            name: card.name.clone(),
            color: card.color.clone(),
            text_color: text_color_for(&card.color)?.to_string(),
        })
    }
}

/// RGBA8 pixels of a card face: flat fill, vertical sheen, two frames.
pub fn paint_card_face(base: Srgba, accent: Srgba) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((FACE_WIDTH * FACE_HEIGHT * 4) as usize);
    let white = Srgba::WHITE;
    let black = Srgba::BLACK;

    for y in 0..FACE_HEIGHT {
        let v = y as f32 / (FACE_HEIGHT - 1) as f32;
        // Light at the top, fading out by the middle, slight shade at the bottom.
        let (sheen, alpha) = if v < 0.5 {
            (white, 0.3 * (1.0 - v / 0.5))
        } else {
            (black, 0.2 * ((v - 0.5) / 0.5))
        };
        let row = blend(base, sheen, alpha);

        for x in 0..FACE_WIDTH {
            let mut color = row;
            if in_frame(x, y, OUTER_BORDER_INSET, OUTER_BORDER_WIDTH) {
                color = blend(color, white, 0.4);
            } else if in_frame(x, y, INNER_BORDER_INSET, INNER_BORDER_WIDTH) {
                color = blend(color, accent, 0.25);
            }
            pixels.extend_from_slice(&[
                to_byte(color.red),
                to_byte(color.green),
                to_byte(color.blue),
                255,
            ]);
        }
    }
    pixels
}

fn blend(under: Srgba, over: Srgba, alpha: f32) -> Srgba {
    Srgba::rgb(
        under.red + (over.red - under.red) * alpha,
        under.green + (over.green - under.green) * alpha,
        under.blue + (over.blue - under.blue) * alpha,
    )
}

fn to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn in_frame(x: u32, y: u32, inset: u32, width: u32) -> bool {
    let inside =
        |edge: u32| x >= edge && x < FACE_WIDTH - edge && y >= edge && y < FACE_HEIGHT - edge;
    inside(inset) && !inside(inset + width)
}

pub fn generate_face(key: &CardFaceKey) -> Result<Image, CardFaceError> {
    let base = parse_color(&key.color)?;
    let accent = parse_color(&key.text_color)?;
    Ok(Image::new(
        Extent3d {
            width: FACE_WIDTH,
            height: FACE_HEIGHT,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        paint_card_face(base, accent),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::RENDER_WORLD,
    ))
}

/// Small least-recently-used map.
#[derive(Debug, Clone)]
pub struct LruCache<K, V> {
    capacity: usize,
    tick: u64,
    entries: HashMap<K, (V, u64)>,
}

impl<K: Eq + Hash + Clone, V> LruCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            tick: 0,
            entries: HashMap::default(),
        }
    }

    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.tick += 1;
        let tick = self.tick;
        self.entries.get_mut(key).map(|(value, used)| {
            *used = tick;
            &*value
        })
    }

    /// Insert, evicting the least recently used entry when full.
    /// Returns the evicted value.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.tick += 1;
        let mut evicted = None;
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, (_, used))| *used)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                evicted = self.entries.remove(&oldest).map(|(value, _)| value);
            }
        }
        self.entries.insert(key, (value, self.tick));
        evicted
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Card faces keyed by content, owned by the rendering side of the table.
#[derive(Resource, Debug)]
pub struct CardTextureCache {
    faces: LruCache<CardFaceKey, Handle<Image>>,
}

impl FromWorld for CardTextureCache {
    fn from_world(world: &mut World) -> Self {
        let capacity = world
            .get_resource::<TableSettings>()
            .map(|settings| settings.texture_cache_capacity)
            .unwrap_or_else(|| TableSettings::default().texture_cache_capacity);
        Self::with_capacity(capacity)
    }
}

impl CardTextureCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            faces: LruCache::new(capacity),
        }
    }

    /// Face texture for a card. `None` if the card's color cannot be parsed;
    /// callers fall back to an untextured material.
    pub fn face_for(&mut self, card: &Card, images: &mut Assets<Image>) -> Option<Handle<Image>> {
        let key = match CardFaceKey::for_card(card) {
            Ok(key) => key,
            Err(err) => {
                warn!("No face texture for card {}: {err}", card.id);
                return None;
            }
        };

        if let Some(handle) = self.faces.get(&key) {
            return Some(handle.clone());
        }

        let image = match generate_face(&key) {
            Ok(image) => image,
            Err(err) => {
                warn!("No face texture for card {}: {err}", card.id);
                return None;
            }
        };
        let handle = images.add(image);
        if self.faces.insert(key, handle.clone()).is_some() {
            debug!("Card face cache full, evicted least recently used face");
        }
        Some(handle)
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }
}
