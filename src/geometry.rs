//! Plane geometry on `(x, y)` world coordinates.
//!
//! Nodes are circles around their position; connectors are segments between
//! node centers. Everything here is pure so the model and the exporters can
//! share it without depending on egui.

/// A point in world space.
pub type Point = (f32, f32);

/// Squared lengths below this are treated as zero.
const DEGENERATE_EPSILON: f32 = 0.0001;

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f32 {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    (dx * dx + dy * dy).sqrt()
}

/// Closest point to `point` on the segment `start..end`.
///
/// The projection parameter is clamped to `[0, 1]`, so points beyond either
/// end snap to that endpoint. A zero-length segment returns `start`.
pub fn closest_point_on_segment(point: Point, start: Point, end: Point) -> Point {
    let line = (end.0 - start.0, end.1 - start.1);
    let line_len_sq = line.0 * line.0 + line.1 * line.1;

    if line_len_sq < DEGENERATE_EPSILON {
        return start;
    }

    let to_point = (point.0 - start.0, point.1 - start.1);
    let t = ((to_point.0 * line.0 + to_point.1 * line.1) / line_len_sq).clamp(0.0, 1.0);
    (start.0 + line.0 * t, start.1 + line.1 * t)
}

/// Distance from `point` to the segment `start..end` (not the infinite line).
pub fn point_to_segment_distance(point: Point, start: Point, end: Point) -> f32 {
    distance(point, closest_point_on_segment(point, start, end))
}

/// Whether `point` lies inside or on the circle.
pub fn point_in_circle(point: Point, center: Point, radius: f32) -> bool {
    distance(point, center) <= radius
}

/// Point on the circle's edge facing `toward`.
///
/// Returns the center itself when `toward` coincides with it.
pub fn circle_edge_point(center: Point, radius: f32, toward: Point) -> Point {
    let len = distance(center, toward);
    if len * len < DEGENERATE_EPSILON {
        return center;
    }
    (
        center.0 + (toward.0 - center.0) / len * radius,
        center.1 + (toward.1 - center.1) / len * radius,
    )
}

/// Trims the segment between two circle centers so it runs edge to edge.
pub fn trim_to_circles(
    start: Point,
    start_radius: f32,
    end: Point,
    end_radius: f32,
) -> (Point, Point) {
    (
        circle_edge_point(start, start_radius, end),
        circle_edge_point(end, end_radius, start),
    )
}

/// Midpoint of a segment.
pub fn midpoint(a: Point, b: Point) -> Point {
    ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
}
