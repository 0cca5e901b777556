//! Amanatides & Woo style grid traversal over unit blocks.
//!
//! Each axis keeps the segment parameter `t` at which the ray crosses its next
//! cell face (`t_max`) and the parameter span of one whole cell (`t_delta`).
//! The walk repeatedly steps the axis with the smallest `t_max`.
//!
//! Exact ties are broken X before Y before Z. The number of steps per axis is
//! fixed up front from the start and end cells, so accumulated float error can
//! reorder steps near a tie but can never skip, repeat, or overshoot a cell.

use glam::Vec3;
use voxcast_common::BlockAddress;

/// Result of a voxel walk that hit something.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoxelHit {
    /// First cell for which the predicate returned true.
    pub block: BlockAddress,
    /// Cell visited immediately before `block`; `None` when the start cell itself matched.
    pub previous: Option<BlockAddress>,
}

#[derive(Debug, Clone, Copy)]
struct AxisWalk {
    step: i32,
    t_max: f32,
    t_delta: f32,
    remaining: u32,
}

impl AxisWalk {
    fn new(start: f32, delta: f32, from: i32, to: i32) -> Self {
        let remaining = (to - from).unsigned_abs();
        if remaining == 0 {
            return Self {
                step: 0,
                t_max: f32::INFINITY,
                t_delta: f32::INFINITY,
                remaining,
            };
        }
        let step = (to - from).signum();
        let t_delta = 1.0 / delta.abs();
        let to_face = if step > 0 {
            (from + 1) as f32 - start
        } else {
            start - from as f32
        };
        // A start sitting exactly on a face crosses it immediately, even when
        // `t_delta` overflowed to infinity on a vanishing component.
        let t_max = if to_face <= 0.0 { 0.0 } else { to_face * t_delta };
        Self {
            step,
            t_max,
            t_delta,
            remaining,
        }
    }

    fn advance(&mut self) -> i32 {
        self.t_max += self.t_delta;
        self.remaining -= 1;
        self.step
    }
}

/// Walk every block the segment `start..end` passes through, in order, until
/// `stop` returns true.
///
/// The start block is always offered to `stop`, even for a zero-length
/// segment. Returns `None` when the end block is passed without a match.
pub fn walk_voxels<F>(start: Vec3, end: Vec3, mut stop: F) -> Option<VoxelHit>
where
    F: FnMut(BlockAddress) -> bool,
{
    let first = BlockAddress::containing(start);
    let last = BlockAddress::containing(end);
    let d = end - start;
    let mut axes = [
        AxisWalk::new(start.x, d.x, first.x, last.x),
        AxisWalk::new(start.y, d.y, first.y, last.y),
        AxisWalk::new(start.z, d.z, first.z, last.z),
    ];

    let mut cell = first;
    let mut previous = None;
    loop {
        if stop(cell) {
            return Some(VoxelHit {
                block: cell,
                previous,
            });
        }

        let mut next: Option<usize> = None;
        for (i, axis) in axes.iter().enumerate() {
            if axis.remaining == 0 {
                continue;
            }
            match next {
                Some(best) if axes[best].t_max <= axis.t_max => {}
                _ => next = Some(i),
            }
        }
        let axis = next?;

        previous = Some(cell);
        let step = axes[axis].advance();
        match axis {
            0 => cell.x += step,
            1 => cell.y += step,
            _ => cell.z += step,
        }
    }
}
