//! Presentation timing on top of the world cache.
//!
//! [`AnimationManager`] turns discrete server ticks into per-frame motion and
//! effects; [`GhostManager`] keeps just-removed objects visible while they
//! decay out.
//!
//! # Invariants
//! - Every time-dependent query is a pure function of the caller-supplied `now`,
//!   apart from lazily evicting expired records.
//! - Untracked ids yield neutral values (no walk phase, no flash, no ghost).

mod animation;
mod ghost;
mod vfx;

pub use animation::{
    AnimationError, AnimationManager, DAMAGE_FLASH, FRAME_STEP_INTERVAL, TweenedPositions,
};
pub use ghost::{DecaySet, GhostError, GhostManager, GhostSnapshot, GhostView};
pub use vfx::{BurstKind, flame_particle, spawn_burst};

pub fn crate_info() -> &'static str {
    concat!("voxcast-animation v", env!("CARGO_PKG_VERSION"))
}
