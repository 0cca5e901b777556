use anyhow::{Context, Result, bail};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use voxcast_cache::{Chunk, TickBatch, WorldDelta, WorldEvent};
use voxcast_client::{ClientProjection, PointerTarget};
use voxcast_common::{
    BlockAddress, BlockKind, ChunkAddress, Entity, EntityId, EntityKind, Face, FaceMask, Passive,
    PassiveId, PassiveKind, Timestamp,
};

/// A recorded session: the local player plus timestamped server ticks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    pub local: Entity,
    pub ticks: Vec<ScriptTick>,
    /// Last frame time, in ms.
    pub until: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptTick {
    pub at: Timestamp,
    pub batch: TickBatch,
}

impl Script {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        let script: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing script {}", path.display()))?;
        script.check_order()?;
        Ok(script)
    }

    fn check_order(&self) -> Result<()> {
        for pair in self.ticks.windows(2) {
            if pair[1].at < pair[0].at {
                bail!("tick at {} comes after tick at {}", pair[1].at, pair[0].at);
            }
        }
        Ok(())
    }

    /// Built-in session: a furnace lights, a cow wanders and dies, an item is picked up.
    pub fn demo() -> Self {
        let local = Entity::new(EntityId(1), EntityKind::Player, Vec3::new(0.8, 0.8, 1.0));
        let cow = EntityId(2);
        let item = PassiveId(10);
        let furnace = BlockAddress::new(3, 3, 0);

        let mut ground = Chunk::empty(ChunkAddress::new(0, 0, -1));
        for x in 0..16 {
            for y in 0..16 {
                ground.set(BlockAddress::new(x, y, -1), BlockKind::Grass);
            }
        }

        let cow_at = |x: f32| Entity::new(cow, EntityKind::Cow, Vec3::new(x, 6.0, 0.0));
        let ticks = vec![
            ScriptTick {
                at: Timestamp(0),
                batch: TickBatch {
                    events: vec![],
                    deltas: vec![
                        WorldDelta::AddChunk { chunk: ground },
                        WorldDelta::AddChunk {
                            chunk: Chunk::empty(ChunkAddress::new(0, 0, 0)),
                        },
                        WorldDelta::SetBlock {
                            address: furnace,
                            kind: BlockKind::Furnace,
                        },
                        WorldDelta::AddEntity { entity: cow_at(6.0) },
                        WorldDelta::AddPassive {
                            passive: Passive::new(
                                item,
                                PassiveKind::ItemSlot,
                                Vec3::new(2.0, 1.0, 0.0),
                                Some(Vec3::new(-1.0, 0.0, 0.0)),
                            ),
                        },
                    ],
                },
            },
            ScriptTick {
                at: Timestamp(50),
                batch: TickBatch {
                    events: vec![WorldEvent::BurningChanged {
                        block: furnace,
                        faces: [Face::PosX, Face::PosZ].into_iter().collect::<FaceMask>(),
                    }],
                    deltas: vec![
                        WorldDelta::SetBlock {
                            address: furnace,
                            kind: BlockKind::FurnaceLit,
                        },
                        WorldDelta::UpdateEntity { entity: cow_at(6.2) },
                    ],
                },
            },
            ScriptTick {
                at: Timestamp(100),
                batch: TickBatch {
                    events: vec![WorldEvent::EntityHurt { id: cow }],
                    deltas: vec![WorldDelta::UpdateEntity { entity: cow_at(6.4) }],
                },
            },
            ScriptTick {
                at: Timestamp(150),
                batch: TickBatch {
                    events: vec![
                        WorldEvent::EntityKilled { id: cow },
                        WorldEvent::PassivePickedUp {
                            passive: item,
                            picker: local.id,
                        },
                        WorldEvent::CraftedInInventory { crafter: local.id },
                    ],
                    deltas: vec![
                        WorldDelta::RemoveEntity { id: cow },
                        WorldDelta::RemovePassive {
                            kind: PassiveKind::ItemSlot,
                            id: item,
                        },
                    ],
                },
            },
        ];

        Self {
            local,
            ticks,
            until: Timestamp(1200),
        }
    }
}

/// Feed the script into `projection`, rendering a frame every `frame_ms`.
pub fn run(script: &Script, projection: &mut ClientProjection, frame_ms: u64) -> Result<()> {
    if frame_ms == 0 {
        bail!("frame interval must be positive");
    }
    let mut pending = script.ticks.iter().peekable();
    let mut now = Timestamp::ZERO;
    loop {
        while let Some(tick) = pending.next_if(|t| t.at <= now) {
            projection
                .apply_tick(&tick.batch, tick.at)
                .with_context(|| format!("applying tick at {}", tick.at))?;
        }

        let target = describe_target(projection);
        let frame = projection.frame(now);
        println!(
            "t={:>6} step={:>4} passives={} ghosts={}/{} particles={} flames={} pruned={} target={}",
            frame.now.to_string(),
            frame.frame_step,
            frame.tweened.len(),
            frame.ghosts.passives.len(),
            frame.ghosts.entities.len(),
            frame.particles.spans.len(),
            frame.flames_emitted,
            frame.particles_pruned,
            target,
        );

        if now >= script.until {
            break;
        }
        now = Timestamp(now.as_millis().saturating_add(frame_ms).min(script.until.as_millis()));
    }

    tracing::info!(
        ticks = projection.ticks_applied(),
        unapplied = pending.count(),
        "replay finished"
    );
    Ok(())
}

/// Look along +X from the local player's centre for a fixed reach.
fn describe_target(projection: &ClientProjection) -> String {
    let eye = projection.cache().local().centre();
    match projection.pointer_target(eye, eye + Vec3::X * 8.0) {
        PointerTarget::Nothing => "-".to_string(),
        PointerTarget::Block(hit) => format!("block({},{},{})", hit.block.x, hit.block.y, hit.block.z),
        PointerTarget::Entity(hit) => hit.id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxcast_client::ProjectionConfig;

    #[test]
    fn demo_script_replays_cleanly() {
        let script = Script::demo();
        let mut projection =
            ClientProjection::new(ProjectionConfig::default(), script.local.clone(), Timestamp::ZERO)
                .unwrap();
        run(&script, &mut projection, 16).unwrap();
        assert_eq!(projection.ticks_applied(), 4);
        assert!(projection.cache().entities().is_empty());
    }

    #[test]
    fn demo_script_survives_json() {
        let script = Script::demo();
        let text = serde_json::to_string(&script).unwrap();
        let back: Script = serde_json::from_str(&text).unwrap();
        assert_eq!(back.ticks.len(), script.ticks.len());
        assert_eq!(back.ticks[1].batch, script.ticks[1].batch);
    }

    #[test]
    fn out_of_order_ticks_are_rejected() {
        let mut script = Script::demo();
        script.ticks.swap(0, 1);
        assert!(script.check_order().is_err());
    }
}
