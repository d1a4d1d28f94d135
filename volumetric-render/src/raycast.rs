// Dual-licensed under the MIT License or the Apache License, Version 2.0.

//! The ray traversal primitive, shared by the light precompute kernel and the
//! camera pass kernel.

use crate::grid::may_still_enter;
use crate::math::{WorldPoint, WorldVector};

/// Advances a position by a fixed world-space step until the ray exits the unit
/// cube's "may still enter" region.
///
/// This is intentionally a plain position iterator and nothing more — it does not
/// know about density, transmittance, or any other stop condition; it only knows
/// about grid cube boundaries and leaves surface/opacity decisions to its caller.
/// A caller that wants to stop early (e.g. on `transmittance < stop_threshold`)
/// simply `break`s out of the `for` loop; no stop predicate is threaded through here.
///
/// `dir` must already be normalized; `step` is the world-space distance advanced
/// per iteration.
#[derive(Clone, Debug)]
pub struct Raymarch {
    pos: WorldPoint,
    dir: WorldVector,
    step: f64,
    done: bool,
}

impl Raymarch {
    pub fn new(origin: WorldPoint, dir: WorldVector, step: f64) -> Self {
        Self {
            pos: origin,
            dir,
            step,
            done: false,
        }
    }

    /// The current position, without consuming or advancing it. Paired with
    /// [`Raymarch::may_still_enter`] and [`Raymarch::advance`], this lets the camera
    /// pass inspect (and bend) the direction at a position before taking the step
    /// that leaves it, rather than after.
    pub fn peek(&self) -> WorldPoint {
        self.pos
    }

    /// Whether the ray can still enter the cube from its current position and
    /// direction. Does not consume or advance anything.
    pub fn may_still_enter(&self) -> bool {
        may_still_enter(self.pos, self.dir)
    }

    /// Advances the position by `dir * step`, with no termination check of its own.
    /// Used by callers that already checked [`Raymarch::may_still_enter`] via
    /// `peek` and want to step using a direction they may have just bent.
    pub fn advance(&mut self) {
        self.pos += self.dir * self.step;
    }

    /// Replaces the marching direction, used by the camera pass after an eikonal
    /// bend step. The position already visited is unaffected.
    pub fn set_dir(&mut self, dir: WorldVector) {
        self.dir = dir;
    }

    pub fn dir(&self) -> WorldVector {
        self.dir
    }
}

impl Iterator for Raymarch {
    type Item = WorldPoint;

    fn next(&mut self) -> Option<WorldPoint> {
        if self.done {
            return None;
        }
        if !may_still_enter(self.pos, self.dir) {
            self.done = true;
            return None;
        }
        let visited = self.pos;
        self.pos += self.dir * self.step;
        Some(visited)
    }
}
