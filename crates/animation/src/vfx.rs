//! Hard-coded particle bursts for world events.

use glam::Vec3;
use voxcast_common::{BlockAddress, Color, Face, Timestamp};
use voxcast_particles::ParticleEngine;

/// Which effect a burst belongs to; selects colour and shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstKind {
    /// A furnace starting or finishing a job.
    Furnace,
    /// Crafting in an inventory or at a crafting table.
    Crafting,
    /// An enchanting table starting, stopping or finishing.
    Enchanting,
}

const CRAFT_SPREAD: [Vec3; 4] = [
    Vec3::new(0.3, 0.3, 0.2),
    Vec3::new(-0.3, 0.3, 0.2),
    Vec3::new(-0.3, -0.3, 0.2),
    Vec3::new(0.3, -0.3, 0.2),
];

const FURNACE_SPREAD: [Vec3; 5] = [
    Vec3::new(0.25, 0.25, 0.3),
    Vec3::new(-0.25, 0.25, 0.3),
    Vec3::new(-0.25, -0.25, 0.3),
    Vec3::new(0.25, -0.25, 0.3),
    Vec3::new(0.0, 0.0, 0.6),
];

const ENCHANT_SPREAD: [Vec3; 5] = [
    Vec3::new(0.5, 0.0, 0.4),
    Vec3::new(0.0, 0.5, 0.4),
    Vec3::new(-0.5, 0.0, 0.4),
    Vec3::new(0.0, -0.5, 0.4),
    Vec3::new(0.0, 0.0, 0.9),
];

impl BurstKind {
    pub fn color(self) -> Color {
        match self {
            BurstKind::Furnace => Color::EMBER,
            BurstKind::Crafting => Color::SAWDUST,
            BurstKind::Enchanting => Color::ARCANE,
        }
    }

    /// End-point offsets relative to the anchor, one per particle.
    pub fn spread(self) -> &'static [Vec3] {
        match self {
            BurstKind::Furnace => &FURNACE_SPREAD,
            BurstKind::Crafting => &CRAFT_SPREAD,
            BurstKind::Enchanting => &ENCHANT_SPREAD,
        }
    }
}

/// Emit one burst around `anchor`. Returns how many particles the pool admitted.
pub fn spawn_burst(
    particles: &mut ParticleEngine,
    kind: BurstKind,
    anchor: Vec3,
    now: Timestamp,
) -> usize {
    let color = kind.color();
    let mut admitted = 0;
    for offset in kind.spread() {
        if particles.spawn(anchor, anchor + *offset, color, now).is_some() {
            admitted += 1;
        }
    }
    admitted
}

/// Start and end of a flame licking off one face of a burning block.
pub fn flame_particle(block: BlockAddress, face: Face) -> (Vec3, Vec3) {
    let [nx, ny, nz] = face.normal();
    let normal = Vec3::new(nx as f32, ny as f32, nz as f32);
    let start = block.corner() + Vec3::splat(0.5) + normal * 0.5;
    let end = start + normal * 0.2 + Vec3::Z * 0.3;
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn pool(capacity: usize) -> ParticleEngine {
        ParticleEngine::new(capacity, Duration::from_millis(500), Timestamp::ZERO).unwrap()
    }

    #[test]
    fn burst_sizes_and_colours_differ_by_kind() {
        assert_eq!(BurstKind::Crafting.spread().len(), 4);
        assert_eq!(BurstKind::Furnace.spread().len(), 5);
        assert_eq!(BurstKind::Enchanting.spread().len(), 5);
        assert_ne!(BurstKind::Furnace.color(), BurstKind::Crafting.color());
        assert_ne!(BurstKind::Crafting.color(), BurstKind::Enchanting.color());
    }

    #[test]
    fn burst_starts_at_anchor_and_moves_outward() {
        let mut p = pool(16);
        let anchor = Vec3::new(3.5, 3.5, 5.0);
        let n = spawn_burst(&mut p, BurstKind::Crafting, anchor, Timestamp(0));
        assert_eq!(n, 4);
        for slot in 0..4 {
            let particle = p.slot(slot).unwrap();
            assert_eq!(particle.start, anchor);
            assert!(particle.end.z > anchor.z);
            assert_eq!(particle.color, Color::SAWDUST);
        }
    }

    #[test]
    fn burst_into_nearly_full_pool_is_truncated() {
        let mut p = pool(3);
        let n = spawn_burst(&mut p, BurstKind::Enchanting, Vec3::ZERO, Timestamp(0));
        assert_eq!(n, 3);
        assert_eq!(spawn_burst(&mut p, BurstKind::Furnace, Vec3::ZERO, Timestamp(0)), 0);
    }

    #[test]
    fn flames_leave_from_the_face_centre() {
        let (start, end) = flame_particle(BlockAddress::new(0, 0, 0), Face::PosX);
        assert_eq!(start, Vec3::new(1.0, 0.5, 0.5));
        assert!(end.x > start.x);
        assert!(end.z > start.z);
    }
}
