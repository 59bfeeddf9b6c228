//! Collision primitives for circles and thick line segments
//!
//! The player hitbox is always a circle; hazards are either circles
//! (projectiles, spikes) or segments with a half-width (pistons).
//! Everything here is pure and never divides by zero.

use glam::Vec2;

/// Check whether two circles overlap
///
/// Strict inequality: circles that exactly touch do not count as a hit.
#[inline]
pub fn circle_overlap(center_a: Vec2, radius_a: f32, center_b: Vec2, radius_b: f32) -> bool {
    center_a.distance(center_b) < radius_a + radius_b
}

/// Closest point on the segment `[seg_start, seg_end]` to `point`
///
/// A degenerate segment (start == end) collapses to its single point.
pub fn closest_point_on_segment(point: Vec2, seg_start: Vec2, seg_end: Vec2) -> Vec2 {
    let seg = seg_end - seg_start;
    let seg_len = seg.length();
    if seg_len == 0.0 {
        return seg_start;
    }

    let seg_dir = seg / seg_len;
    let proj = (point - seg_start).dot(seg_dir).clamp(0.0, seg_len);
    seg_start + seg_dir * proj
}

/// Distance from `point` to the segment `[seg_start, seg_end]`
///
/// Points beyond either end measure to the nearest endpoint.
#[inline]
pub fn segment_distance(point: Vec2, seg_start: Vec2, seg_end: Vec2) -> f32 {
    point.distance(closest_point_on_segment(point, seg_start, seg_end))
}

/// Check whether a circle touches a segment thickened by `half_width`
///
/// Inclusive: touching the edge of the band counts as a hit.
#[inline]
pub fn segment_circle_overlap(
    point: Vec2,
    radius: f32,
    seg_start: Vec2,
    seg_end: Vec2,
    half_width: f32,
) -> bool {
    segment_distance(point, seg_start, seg_end) <= radius + half_width
}
