//! Overlap-aware field placement.
//!
//! Fields on the same page should not overlap. [`check_overlap`] is the
//! axis-aligned test, [`find_free_position`] the bounded spiral search for
//! a nearby free slot, and [`resolve_position`] applies an
//! [`OverlapPolicy`] on top of both.

use crate::config::OverlapPolicy;
use crate::field::FormField;
use crate::geometry::{Point, Rect};

/// First spiral radius.
pub const SPIRAL_RADIUS_START: f32 = 20.0;
/// Radius increment between rings.
pub const SPIRAL_RADIUS_STEP: f32 = 20.0;
/// Upper radius bound (exclusive); the last ring sits at 180.
pub const SPIRAL_RADIUS_MAX: f32 = 200.0;
/// Angle increment in degrees; each ring probes 0..=315.
pub const SPIRAL_ANGLE_STEP_DEG: u32 = 45;

/// Check whether `candidate` intersects any field on `page`.
///
/// The field whose id equals `exclude_id` (the one being moved or
/// resized) is ignored. Rectangles that only share an edge do not overlap.
///
/// # Examples
///
/// ```
/// use form_oxide::field::{FieldType, FormField};
/// use form_oxide::geometry::Rect;
/// use form_oxide::placement::check_overlap;
///
/// let existing = vec![FormField::new("a", FieldType::Text, 1)];
/// assert!(check_overlap(&Rect::new(10.0, 10.0, 150.0, 30.0), 1, &existing, None));
/// assert!(!check_overlap(&Rect::new(150.0, 0.0, 150.0, 30.0), 1, &existing, None));
/// assert!(!check_overlap(&Rect::new(10.0, 10.0, 150.0, 30.0), 2, &existing, None));
/// ```
pub fn check_overlap(
    candidate: &Rect,
    page: u32,
    fields: &[FormField],
    exclude_id: Option<&str>,
) -> bool {
    find_overlapping(candidate, page, fields, exclude_id).is_some()
}

/// First field on `page` that `candidate` intersects, if any.
pub fn find_overlapping<'a>(
    candidate: &Rect,
    page: u32,
    fields: &'a [FormField],
    exclude_id: Option<&str>,
) -> Option<&'a FormField> {
    fields.iter().find(|f| {
        f.page_number == page
            && exclude_id != Some(f.id.as_str())
            && candidate.intersects(&f.rect())
    })
}

/// The probe sequence of the spiral search, in order.
///
/// Nine rings from radius 20 up to (not including) 200 in steps of 20,
/// eight angles per ring starting at 0° and turning 45° each step:
/// 72 offsets.
pub fn spiral_offsets() -> impl Iterator<Item = (f32, f32)> {
    let rings = ((SPIRAL_RADIUS_MAX - SPIRAL_RADIUS_START) / SPIRAL_RADIUS_STEP) as u32;
    (0..rings).flat_map(|ring| {
        let radius = SPIRAL_RADIUS_START + ring as f32 * SPIRAL_RADIUS_STEP;
        (0..360 / SPIRAL_ANGLE_STEP_DEG).map(move |step| {
            let theta = ((step * SPIRAL_ANGLE_STEP_DEG) as f64).to_radians();
            // axis probes must be exactly 0 on the other axis, never -0.00000004
            let clean = |v: f64| if v.abs() < 1e-9 { 0.0 } else { v };
            let r = radius as f64;
            ((r * clean(theta.cos())) as f32, (r * clean(theta.sin())) as f32)
        })
    })
}

/// Spiral-search a free position near `desired`.
///
/// Returns `desired` itself when it is already free, the first free
/// spiral probe otherwise, or `None` when all probes collide. Probes with
/// a negative coordinate are skipped.
pub fn try_find_free_position(
    desired: Point,
    width: f32,
    height: f32,
    page: u32,
    fields: &[FormField],
    exclude_id: Option<&str>,
) -> Option<Point> {
    let rect = Rect::new(desired.x, desired.y, width, height);
    if !check_overlap(&rect, page, fields, exclude_id) {
        return Some(desired);
    }

    spiral_offsets()
        .map(|(dx, dy)| Point::new(desired.x + dx, desired.y + dy))
        .filter(|p| p.x >= 0.0 && p.y >= 0.0)
        .find(|p| !check_overlap(&rect.with_origin(*p), page, fields, exclude_id))
}

/// Best-effort variant of [`try_find_free_position`]: when the search is
/// exhausted the desired position is returned unchanged.
pub fn find_free_position(
    desired: Point,
    width: f32,
    height: f32,
    page: u32,
    fields: &[FormField],
    exclude_id: Option<&str>,
) -> Point {
    match try_find_free_position(desired, width, height, page, fields, exclude_id) {
        Some(p) => p,
        None => {
            log::debug!(
                "No free position below radius {} of ({}, {}) on page {}",
                SPIRAL_RADIUS_MAX,
                desired.x,
                desired.y,
                page
            );
            desired
        },
    }
}

/// Outcome of [`resolve_position`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// The requested position is used as-is.
    Accepted(Point),
    /// The field was moved to a nearby free position.
    Relocated(Point),
    /// The request was refused; the field keeps its previous geometry.
    Rejected,
}

impl Placement {
    /// Resulting position, if the placement was not rejected.
    pub fn point(&self) -> Option<Point> {
        match self {
            Placement::Accepted(p) | Placement::Relocated(p) => Some(*p),
            Placement::Rejected => None,
        }
    }
}

/// Resolve where a rectangle may go under `policy`.
pub fn resolve_position(
    rect: &Rect,
    page: u32,
    fields: &[FormField],
    exclude_id: Option<&str>,
    policy: OverlapPolicy,
) -> Placement {
    let Some(other) = find_overlapping(rect, page, fields, exclude_id) else {
        return Placement::Accepted(rect.origin());
    };

    match policy {
        OverlapPolicy::Reject => {
            log::debug!("Placement on page {} rejected: overlaps field '{}'", page, other.name);
            Placement::Rejected
        },
        OverlapPolicy::Allow => {
            log::warn!("Field placed on page {} overlaps field '{}'", page, other.name);
            Placement::Accepted(rect.origin())
        },
        OverlapPolicy::SnapNearest => {
            let found = find_free_position(
                rect.origin(),
                rect.width,
                rect.height,
                page,
                fields,
                exclude_id,
            );
            if found == rect.origin() {
                Placement::Accepted(found)
            } else {
                Placement::Relocated(found)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;
    use crate::geometry::euclidean_distance;

    fn field_at(id: &str, x: f32, y: f32, page: u32) -> FormField {
        let mut f = FormField::new(id, FieldType::Text, page).at(x, y);
        f.id = id.to_string();
        f
    }

    #[test]
    fn test_overlap_same_page() {
        let fields = vec![field_at("a", 0.0, 0.0, 1)];
        assert!(check_overlap(&Rect::new(100.0, 20.0, 150.0, 30.0), 1, &fields, None));
    }

    #[test]
    fn test_no_overlap_across_pages() {
        let fields = vec![field_at("a", 0.0, 0.0, 1)];
        assert!(!check_overlap(&Rect::new(0.0, 0.0, 150.0, 30.0), 2, &fields, None));
    }

    #[test]
    fn test_self_is_excluded() {
        let fields = vec![field_at("a", 0.0, 0.0, 1)];
        let rect = fields[0].rect();
        assert!(check_overlap(&rect, 1, &fields, None));
        assert!(!check_overlap(&rect, 1, &fields, Some("a")));
    }

    #[test]
    fn test_edge_sharing_does_not_overlap() {
        let fields = vec![field_at("a", 0.0, 0.0, 1)];
        assert!(!check_overlap(&Rect::new(150.0, 0.0, 150.0, 30.0), 1, &fields, None));
        assert!(!check_overlap(&Rect::new(0.0, 30.0, 150.0, 30.0), 1, &fields, None));
    }

    #[test]
    fn test_spiral_has_72_offsets_within_bounds() {
        let offsets: Vec<_> = spiral_offsets().collect();
        assert_eq!(offsets.len(), 72);
        let first = offsets[0];
        assert!((first.0 - 20.0).abs() < 1e-4 && first.1.abs() < 1e-4);
        for &(dx, dy) in &offsets {
            let r = (dx * dx + dy * dy).sqrt();
            assert!(r >= 19.99 && r <= 180.01);
        }
        let last = offsets[71];
        assert!((last.0 - 180.0 * std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-3);
        assert!((last.1 + 180.0 * std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-3);
    }

    #[test]
    fn test_free_position_returned_unchanged() {
        let fields = vec![field_at("a", 0.0, 0.0, 1)];
        let desired = Point::new(300.0, 300.0);
        assert_eq!(find_free_position(desired, 150.0, 30.0, 1, &fields, None), desired);
    }

    #[test]
    fn test_spiral_finds_nearby_slot() {
        let fields = vec![field_at("a", 0.0, 0.0, 1)];
        let origin = Point::new(0.0, 0.0);
        let found = try_find_free_position(origin, 150.0, 30.0, 1, &fields, None).unwrap();
        assert!(euclidean_distance(&origin, &found) >= 20.0 - 1e-3);
        assert!(euclidean_distance(&origin, &found) <= 200.0 + 1e-3);
        assert!(found.x >= 0.0 && found.y >= 0.0);
        assert!(!check_overlap(&Rect::new(found.x, found.y, 150.0, 30.0), 1, &fields, None));
    }

    #[test]
    fn test_exhausted_search_returns_original() {
        let mut big = field_at("wall", 0.0, 0.0, 1);
        big.width = 2000.0;
        big.height = 2000.0;
        let fields = vec![big];
        let desired = Point::new(100.0, 100.0);
        assert_eq!(try_find_free_position(desired, 150.0, 30.0, 1, &fields, None), None);
        assert_eq!(find_free_position(desired, 150.0, 30.0, 1, &fields, None), desired);
    }

    #[test]
    fn test_resolve_policies() {
        let fields = vec![field_at("a", 0.0, 0.0, 1)];
        let rect = Rect::new(10.0, 10.0, 150.0, 30.0);

        assert_eq!(
            resolve_position(&rect, 1, &fields, None, OverlapPolicy::Reject),
            Placement::Rejected
        );
        assert_eq!(
            resolve_position(&rect, 1, &fields, None, OverlapPolicy::Allow),
            Placement::Accepted(Point::new(10.0, 10.0))
        );
        match resolve_position(&rect, 1, &fields, None, OverlapPolicy::SnapNearest) {
            Placement::Relocated(p) => {
                assert!(!check_overlap(&rect.with_origin(p), 1, &fields, None));
            },
            other => panic!("expected relocation, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_free_rect_is_accepted_under_every_policy() {
        let fields = vec![field_at("a", 0.0, 0.0, 1)];
        let rect = Rect::new(0.0, 100.0, 150.0, 30.0);
        for policy in [OverlapPolicy::Reject, OverlapPolicy::SnapNearest, OverlapPolicy::Allow] {
            assert_eq!(
                resolve_position(&rect, 1, &fields, None, policy),
                Placement::Accepted(Point::new(0.0, 100.0))
            );
        }
    }
}
