//! Card placement for the hand and the wall, plus draw-order hints.
//!
//! Everything here is a pure function of (index, total, viewport width in
//! world units).

use bevy::prelude::*;

const HAND_BASE_CARD_SIZE: Vec2 = Vec2::new(2.0, 3.0);
const HAND_TILT_X: f32 = -0.08;
const HAND_FAN_STEP: f32 = 0.01;
const HAND_DEPTH_STEP: f32 = 0.01;
/// Every card keeps at least this fraction of its width visible.
const HAND_MAX_OVERLAP: f32 = 0.9;

const WALL_BASE_CARD_WIDTH: f32 = 3.0;
const WALL_BASE_CARD_HEIGHT: f32 = 3.5;
const WALL_SPACING: f32 = 1.1;
const WALL_DEPTH_STEP: f32 = 0.01;

/// Base value for render orders, so every card draws above the backdrop.
pub const RENDER_ORDER_BASE: i32 = 1000;
/// Depth toward the camera per step of render order.
pub const RENDER_ORDER_DEPTH_STEP: f32 = 0.0002;

/// Horizontal, overlapping arrangement of the cards still in hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandLayout {
    viewport_width: f32,
}

impl HandLayout {
    pub fn new(viewport_width: f32) -> Self {
        Self { viewport_width }
    }

    pub fn scale_factor(&self) -> f32 {
        (self.viewport_width / 12.0).clamp(0.5, 1.4)
    }

    pub fn card_dimensions(&self) -> Vec2 {
        HAND_BASE_CARD_SIZE * self.scale_factor()
    }

    pub fn padding(&self) -> f32 {
        (self.viewport_width * 0.015).min(0.15)
    }

    /// Fraction of each card hidden under its neighbour. Grows with the
    /// number of cards so a big hand still fits.
    pub fn overlap_factor(&self, total: usize) -> f32 {
        if total >= 8 {
            return (0.4 + (total - 8) as f32 * 0.05).min(HAND_MAX_OVERLAP);
        }
        if total <= 3 {
            return 0.1;
        }

        let viewport_factor = (8.0 / self.viewport_width).max(0.4);
        let card_factor = (total as f32 / 4.0).min(1.8);
        (0.3 * viewport_factor * card_factor).min(0.7)
    }

    pub fn position(&self, index: usize, total: usize) -> Vec3 {
        if total <= 1 {
            return Vec3::ZERO;
        }

        let card_width = self.card_dimensions().x;
        let padding = if total > 6 {
            self.padding() * (6.0 / total as f32)
        } else {
            self.padding()
        };
        let mut visible_width = card_width * (1.0 - self.overlap_factor(total)) + padding;
        // Squeeze further when even the capped overlap runs past the viewport.
        let fitted = (self.viewport_width - card_width) / (total - 1) as f32;
        if fitted > 0.0 {
            visible_width = visible_width.min(fitted);
        }
        let total_width = visible_width * (total - 1) as f32 + card_width;
        let start_x = -total_width / 2.0 + card_width / 2.0;

        let x = start_x + index as f32 * visible_width;
        // Edge cards sit closer to the camera than center cards.
        let z = distance_from_center(index, total) * HAND_DEPTH_STEP;
        Vec3::new(x, 0.0, z)
    }

    pub fn rotation(&self, index: usize, total: usize) -> Quat {
        let fan = if total > 5 {
            (index as f32 - total as f32 / 2.0) * HAND_FAN_STEP
        } else {
            0.0
        };
        Quat::from_euler(EulerRot::XYZ, HAND_TILT_X, fan, 0.0)
    }
}

/// Grid arrangement of the played cards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallLayout {
    viewport_width: f32,
}

impl WallLayout {
    pub fn new(viewport_width: f32) -> Self {
        Self { viewport_width }
    }

    pub fn scale_factor(&self) -> f32 {
        (self.viewport_width / 15.0).clamp(0.7, 1.2)
    }

    pub fn columns(&self) -> usize {
        if self.viewport_width > 15.0 { 5 } else { 4 }
    }

    pub fn horizontal_spacing(&self) -> f32 {
        WALL_BASE_CARD_WIDTH * self.scale_factor() * WALL_SPACING
    }

    pub fn vertical_spacing(&self) -> f32 {
        WALL_BASE_CARD_HEIGHT * self.scale_factor() * WALL_SPACING
    }

    /// Scale for cards resting on the wall.
    pub fn card_scale(&self) -> f32 {
        self.scale_factor() * 0.9
    }

    pub fn position(&self, index: usize, total: usize) -> Vec3 {
        if total == 0 {
            return Vec3::ZERO;
        }

        let columns = self.columns();
        let row = index / columns;
        let column = index % columns;

        // The last row may be partial; center it.
        let row_width = total.saturating_sub(row * columns).min(columns);
        let row_offset = (columns - row_width) as f32 / 2.0;

        let x = (column as f32 - (columns as f32 - 1.0) / 2.0 + row_offset)
            * self.horizontal_spacing();
        let y = -(row as f32) * self.vertical_spacing();
        let z = index as f32 * WALL_DEPTH_STEP;
        Vec3::new(x, y, z)
    }
}

/// Normalized position in `[-1, 1]` of a card among its siblings.
pub fn normalized_position(index: usize, total: usize) -> f32 {
    if total <= 1 {
        return 0.0;
    }
    index as f32 / (total - 1) as f32 * 2.0 - 1.0
}

fn distance_from_center(index: usize, total: usize) -> f32 {
    let center = (total as f32 - 1.0) / 2.0;
    (index as f32 - center).abs()
}

/// Edge cards draw above center cards.
pub fn hand_render_order(index: usize, total: usize) -> i32 {
    if total <= 1 {
        return RENDER_ORDER_BASE;
    }
    let center = (total as f32 - 1.0) / 2.0;
    let normalized = distance_from_center(index, total) / center;
    RENDER_ORDER_BASE + (normalized * 100.0).floor() as i32
}

/// Later cards draw above earlier ones.
pub fn wall_render_order(index: usize) -> i32 {
    stack_render_order(index)
}

pub fn stack_render_order(index: usize) -> i32 {
    RENDER_ORDER_BASE + index as i32
}

/// Local depth offset that makes a card face draw with the given priority.
pub fn render_order_depth(order: i32) -> f32 {
    (order - RENDER_ORDER_BASE).max(0) as f32 * RENDER_ORDER_DEPTH_STEP
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn single_card_is_centered() {
        let hand = HandLayout::new(20.0);
        assert_eq!(hand.position(0, 1), Vec3::ZERO);
        assert_eq!(hand.position(0, 0), Vec3::ZERO);
    }

    #[test]
    fn hand_is_symmetric_around_origin() {
        let hand = HandLayout::new(20.0);
        for total in 2..=30 {
            let first = hand.position(0, total);
            let last = hand.position(total - 1, total);
            assert!((first.x + last.x).abs() < EPS, "total {total}");
            assert!((first.z - last.z).abs() < EPS);
            for index in 1..total {
                assert!(hand.position(index, total).x > hand.position(index - 1, total).x);
            }
        }
    }

    #[test]
    fn edge_cards_sit_above_center_cards() {
        let hand = HandLayout::new(20.0);
        let center = hand.position(3, 7);
        let edge = hand.position(0, 7);
        assert!(edge.z > center.z);
        assert_eq!(center.z, 0.0);
    }

    #[test]
    fn overlap_grows_with_card_count() {
        let hand = HandLayout::new(10.0);
        assert_eq!(hand.overlap_factor(2), 0.1);
        assert_eq!(hand.overlap_factor(3), 0.1);
        assert!((hand.overlap_factor(8) - 0.4).abs() < EPS);
        assert!((hand.overlap_factor(10) - 0.5).abs() < EPS);
        assert_eq!(hand.overlap_factor(30), HAND_MAX_OVERLAP);
        let mut previous = hand.overlap_factor(4);
        for total in 5..=7 {
            let overlap = hand.overlap_factor(total);
            assert!(overlap >= previous);
            assert!(overlap <= 0.7);
            previous = overlap;
        }
    }

    #[test]
    fn large_hands_stay_inside_the_viewport() {
        for width in [3.0, 10.0, 20.0] {
            let hand = HandLayout::new(width);
            let half_card = hand.card_dimensions().x / 2.0;
            for total in [20, 30, 40] {
                let first = hand.position(0, total);
                let last = hand.position(total - 1, total);
                assert!(first.x - half_card >= -width / 2.0 - EPS, "width {width}, total {total}");
                assert!(last.x + half_card <= width / 2.0 + EPS, "width {width}, total {total}");
                assert!(last.x > first.x);
            }
        }
    }

    #[test]
    fn narrow_viewports_clamp_card_size() {
        let small = HandLayout::new(1.0).card_dimensions();
        assert!(small.abs_diff_eq(Vec2::new(1.0, 1.5), EPS));
        let large = HandLayout::new(100.0).card_dimensions();
        assert!(large.abs_diff_eq(Vec2::new(2.8, 4.2), EPS));
        assert!((HandLayout::new(100.0).padding() - 0.15).abs() < EPS);
    }

    #[test]
    fn fan_only_for_large_hands() {
        let hand = HandLayout::new(20.0);
        let (_, yaw, _) = hand.rotation(0, 5).to_euler(EulerRot::XYZ);
        assert!(yaw.abs() < EPS);
        let (tilt, yaw, _) = hand.rotation(0, 8).to_euler(EulerRot::XYZ);
        assert!((yaw + 0.04).abs() < 1e-4);
        assert!((tilt - HAND_TILT_X).abs() < 1e-4);
    }

    #[test]
    fn wall_columns_follow_viewport() {
        assert_eq!(WallLayout::new(10.0).columns(), 4);
        assert_eq!(WallLayout::new(16.0).columns(), 5);
    }

    #[test]
    fn wall_centers_partial_last_row() {
        let wall = WallLayout::new(10.0);
        // 4 columns, 6 cards: second row holds two cards centered.
        let left = wall.position(4, 6);
        let right = wall.position(5, 6);
        assert!((left.x + right.x).abs() < EPS);
        assert!((left.y + wall.vertical_spacing()).abs() < EPS);

        // Full first row spans symmetric columns.
        let first = wall.position(0, 6);
        let fourth = wall.position(3, 6);
        assert!((first.x + fourth.x).abs() < EPS);
        assert_eq!(first.y, 0.0);
    }

    #[test]
    fn wall_depth_increases_per_card() {
        let wall = WallLayout::new(20.0);
        for index in 1..10 {
            assert!(wall.position(index, 10).z > wall.position(index - 1, 10).z);
        }
        assert_eq!(wall.position(0, 0), Vec3::ZERO);
    }

    #[test]
    fn hand_render_order_peaks_at_edges() {
        assert_eq!(hand_render_order(0, 1), RENDER_ORDER_BASE);
        assert_eq!(hand_render_order(0, 5), 1100);
        assert_eq!(hand_render_order(4, 5), 1100);
        assert_eq!(hand_render_order(2, 5), 1000);
        assert_eq!(hand_render_order(1, 5), hand_render_order(3, 5));
        assert!(hand_render_order(1, 5) > hand_render_order(2, 5));
    }

    #[test]
    fn wall_render_order_follows_play_order() {
        assert!(wall_render_order(3) > wall_render_order(2));
        assert_eq!(stack_render_order(0), RENDER_ORDER_BASE);
    }

    #[test]
    fn render_order_depth_is_small_and_ordered() {
        assert_eq!(render_order_depth(RENDER_ORDER_BASE), 0.0);
        assert_eq!(render_order_depth(0), 0.0);
        assert!(render_order_depth(1001) > render_order_depth(1000));
        // Never pushes a wall card past the next one in the stack.
        assert!(render_order_depth(stack_render_order(9)) < WALL_DEPTH_STEP);
    }

    #[test]
    fn normalized_position_spans_unit_range() {
        assert_eq!(normalized_position(0, 1), 0.0);
        assert_eq!(normalized_position(0, 5), -1.0);
        assert_eq!(normalized_position(4, 5), 1.0);
        assert_eq!(normalized_position(2, 5), 0.0);
    }
}
