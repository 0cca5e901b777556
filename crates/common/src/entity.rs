use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::geometry::Aabb;
use crate::types::{EntityId, PassiveId};

/// Entity type; determines the collision volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Cow,
    Pig,
    Sheep,
    Zombie,
}

impl EntityKind {
    /// Collision volume extent along X, Y and Z.
    pub fn volume(self) -> Vec3 {
        match self {
            EntityKind::Player => Vec3::new(0.8, 0.8, 1.8),
            EntityKind::Zombie => Vec3::new(0.8, 0.8, 2.0),
            EntityKind::Cow => Vec3::new(0.9, 1.4, 1.4),
            EntityKind::Pig => Vec3::new(0.9, 0.9, 0.9),
            EntityKind::Sheep => Vec3::new(0.9, 1.3, 1.3),
        }
    }
}

/// Last known state of an entity, replaced wholesale on every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Minimum corner of the collision volume.
    pub position: Vec3,
    /// Facing, radians.
    #[serde(default)]
    pub yaw: f32,
}

impl Entity {
    pub fn new(id: EntityId, kind: EntityKind, position: Vec3) -> Self {
        Self {
            id,
            kind,
            position,
            yaw: 0.0,
        }
    }

    pub fn volume(&self) -> Vec3 {
        self.kind.volume()
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_corner(self.position, self.kind.volume())
    }

    pub fn centre(&self) -> Vec3 {
        self.position + self.kind.volume() * 0.5
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PassiveKind {
    /// A dropped item stack.
    ItemSlot,
    FallingBlock,
    Projectile,
}

impl PassiveKind {
    pub const ALL: [PassiveKind; 3] = [
        PassiveKind::ItemSlot,
        PassiveKind::FallingBlock,
        PassiveKind::Projectile,
    ];
}

/// A non-player world object. Produced fresh each tick by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passive {
    pub id: PassiveId,
    pub kind: PassiveKind,
    pub position: Vec3,
    /// Blocks per second; `None` for objects that never move on their own.
    #[serde(default)]
    pub velocity: Option<Vec3>,
    /// Kind-specific payload, opaque to the projection.
    #[serde(default)]
    pub extended: Vec<u8>,
}

impl Passive {
    pub fn new(id: PassiveId, kind: PassiveKind, position: Vec3, velocity: Option<Vec3>) -> Self {
        Self {
            id,
            kind,
            position,
            velocity,
            extended: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centre_uses_kind_volume() {
        let e = Entity::new(EntityId(1), EntityKind::Player, Vec3::new(1.0, 1.0, 1.0));
        assert!(e.centre().abs_diff_eq(Vec3::new(1.4, 1.4, 1.9), 1e-6));
        assert_eq!(e.bounds().min, e.position);
        assert!((e.bounds().size() - e.volume()).abs().max_element() < 1e-6);
    }

    #[test]
    fn passive_defaults_deserialize() {
        let json = r#"{"id":4,"kind":"ItemSlot","position":[0.0,1.0,2.0]}"#;
        let p: Passive = serde_json::from_str(json).unwrap();
        assert_eq!(p.id, PassiveId(4));
        assert!(p.velocity.is_none());
        assert!(p.extended.is_empty());
    }
}
