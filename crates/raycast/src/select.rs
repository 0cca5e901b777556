//! Slab-method ray/AABB selection.

use glam::Vec3;
use voxcast_common::{Aabb, Entity, EntityId};

/// Closest entity hit by a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityHit {
    pub id: EntityId,
    /// Euclidean distance from the segment start to the entity's bounding box.
    pub distance: f32,
}

/// Parametric entry/exit interval of one axis slab.
///
/// A segment with no extent on this axis either lies within the slab for its
/// whole length or never touches it.
fn slab(start: f32, delta: f32, min: f32, max: f32) -> Option<(f32, f32)> {
    if delta == 0.0 {
        return (min..=max)
            .contains(&start)
            .then_some((f32::NEG_INFINITY, f32::INFINITY));
    }
    let t1 = (min - start) / delta;
    let t2 = (max - start) / delta;
    Some((t1.min(t2), t1.max(t2)))
}

/// Segment parameter at which `start..end` enters `bounds`.
///
/// Returns `Some(t)` with `0 <= t <= 1` only when the box is entered inside the
/// segment. A segment that starts inside the box does not enter it and yields
/// `None`, as does a box touched only by the segment's infinite extension.
pub fn segment_entry(start: Vec3, end: Vec3, bounds: &Aabb) -> Option<f32> {
    let d = end - start;
    let (ex, xx) = slab(start.x, d.x, bounds.min.x, bounds.max.x)?;
    let (ey, xy) = slab(start.y, d.y, bounds.min.y, bounds.max.y)?;
    let (ez, xz) = slab(start.z, d.z, bounds.min.z, bounds.max.z)?;
    let enter = ex.max(ey).max(ez);
    let exit = xx.min(xy).min(xz);
    (enter <= exit && (0.0..=1.0).contains(&enter)).then_some(enter)
}

/// Pick the entity whose bounding box is hit by `start..end` and lies closest to `start`.
///
/// Equal distances resolve to the smaller [`EntityId`], so the result does not
/// depend on candidate order.
pub fn select_entity<'a, I>(start: Vec3, end: Vec3, candidates: I) -> Option<EntityHit>
where
    I: IntoIterator<Item = &'a Entity>,
{
    let mut best: Option<EntityHit> = None;
    for entity in candidates {
        let bounds = entity.bounds();
        if segment_entry(start, end, &bounds).is_none() {
            continue;
        }
        let hit = EntityHit {
            id: entity.id,
            distance: bounds.distance_to(start),
        };
        best = match best {
            Some(current)
                if current.distance < hit.distance
                    || (current.distance == hit.distance && current.id < hit.id) =>
            {
                Some(current)
            }
            _ => Some(hit),
        };
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxcast_common::EntityKind;

    fn pig(id: u32, x: f32, y: f32, z: f32) -> Entity {
        // Pig volume is 0.9 on every axis.
        Entity::new(EntityId(id), EntityKind::Pig, Vec3::new(x, y, z))
    }

    #[test]
    fn straight_hit_reports_entry_and_distance() {
        let e = pig(1, 5.0, 0.0, 0.0);
        let start = Vec3::new(0.0, 0.45, 0.45);
        let end = Vec3::new(10.0, 0.45, 0.45);
        let t = segment_entry(start, end, &e.bounds()).unwrap();
        assert!((t - 0.5).abs() < 1e-6);
        let hit = select_entity(start, end, [&e]).unwrap();
        assert_eq!(hit.id, EntityId(1));
        assert!((hit.distance - 5.0).abs() < 1e-6);
    }

    #[test]
    fn box_beyond_segment_end_is_missed() {
        let e = pig(1, 5.0, 0.0, 0.0);
        let start = Vec3::new(0.0, 0.45, 0.45);
        let end = Vec3::new(4.0, 0.45, 0.45);
        assert_eq!(segment_entry(start, end, &e.bounds()), None);
    }

    #[test]
    fn box_behind_start_is_missed() {
        let e = pig(1, -5.0, 0.0, 0.0);
        let start = Vec3::new(0.0, 0.45, 0.45);
        let end = Vec3::new(10.0, 0.45, 0.45);
        assert_eq!(select_entity(start, end, [&e]), None);
    }

    #[test]
    fn start_inside_box_is_not_a_hit() {
        let e = pig(1, 0.0, 0.0, 0.0);
        let start = Vec3::splat(0.45);
        let end = Vec3::new(5.0, 0.45, 0.45);
        assert_eq!(segment_entry(start, end, &e.bounds()), None);
    }

    #[test]
    fn degenerate_axis_outside_slab_never_hits() {
        let e = pig(1, 5.0, 0.0, 0.0);
        // No Y extent and Y outside the box.
        let start = Vec3::new(0.0, 2.0, 0.45);
        let end = Vec3::new(10.0, 2.0, 0.45);
        assert_eq!(segment_entry(start, end, &e.bounds()), None);
    }

    #[test]
    fn degenerate_axis_on_box_face_counts_as_inside() {
        let e = pig(1, 5.0, 0.0, 0.0);
        let start = Vec3::new(0.0, 0.0, 0.45);
        let end = Vec3::new(10.0, 0.0, 0.45);
        assert!(segment_entry(start, end, &e.bounds()).is_some());
    }

    #[test]
    fn entry_exactly_at_segment_end_is_a_hit() {
        let e = pig(1, 4.0, 0.0, 0.0);
        let start = Vec3::new(0.0, 0.45, 0.45);
        let end = Vec3::new(4.0, 0.45, 0.45);
        assert_eq!(segment_entry(start, end, &e.bounds()), Some(1.0));
    }

    #[test]
    fn closest_of_several_wins() {
        let far = pig(1, 8.0, 0.0, 0.0);
        let near = pig(2, 3.0, 0.0, 0.0);
        let off_axis = pig(3, 1.0, 5.0, 0.0);
        let start = Vec3::new(0.0, 0.45, 0.45);
        let end = Vec3::new(10.0, 0.45, 0.45);
        let hit = select_entity(start, end, [&far, &near, &off_axis]).unwrap();
        assert_eq!(hit.id, EntityId(2));
    }

    #[test]
    fn equal_distance_resolves_to_smaller_id() {
        // Two boxes stacked vertically, both entered at the same X face.
        let upper = pig(9, 3.0, 0.0, 0.45);
        let lower = pig(4, 3.0, 0.0, -0.45);
        let start = Vec3::new(0.0, 0.45, 0.45);
        let end = Vec3::new(10.0, 0.45, 0.45);
        let forward = select_entity(start, end, [&upper, &lower]).unwrap();
        let reverse = select_entity(start, end, [&lower, &upper]).unwrap();
        assert_eq!(forward.id, EntityId(4));
        assert_eq!(reverse.id, EntityId(4));
    }

    #[test]
    fn no_candidates_no_hit() {
        let none: [&Entity; 0] = [];
        assert_eq!(select_entity(Vec3::ZERO, Vec3::ONE, none), None);
    }
}
