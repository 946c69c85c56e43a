//! Input fusion: the latest tilt sample per player, collapsed into one
//! global steering vector each step.

use crate::physics::TiltVector;
use std::collections::HashMap;

/// When exactly this many distinct players have reported, fusion
/// switches from per-axis mean to per-axis maximum.
const MAX_POLICY_REPORTERS: usize = 4;

/// Latest raw sample from one player's device. Overwritten wholesale on
/// every report; no smoothing across steps.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TiltSample {
    pub x_tilt: f64,
    pub y_tilt: f64,
    pub beta: f64,
    pub gamma: f64,
}

/// Fused steering plus the aggregate raw orientation the clients render
/// on the shared tilt canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FusedTilt {
    pub vector: TiltVector,
    pub avg_beta: f64,
    pub avg_gamma: f64,
}

/// Table of the latest sample per player. Samples persist until their
/// owner disconnects, so a silent player keeps contributing its last
/// reported value.
#[derive(Debug, Default)]
pub struct TiltFusion {
    samples: HashMap<u32, TiltSample>,
}

impl TiltFusion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, owner: u32, sample: TiltSample) {
        self.samples.insert(owner, sample);
    }

    pub fn remove(&mut self, owner: u32) {
        self.samples.remove(&owner);
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn reporter_count(&self) -> usize {
        self.samples.len()
    }

    /// Collapse all known samples into one aggregate, recomputed from
    /// scratch: mean per axis below four reporters, maximum per axis at
    /// exactly four.
    pub fn fuse(&self) -> FusedTilt {
        if self.samples.is_empty() {
            return FusedTilt::default();
        }

        if self.samples.len() == MAX_POLICY_REPORTERS {
            let max = |pick: fn(&TiltSample) -> f64| {
                self.samples
                    .values()
                    .map(pick)
                    .fold(f64::NEG_INFINITY, f64::max)
            };
            FusedTilt {
                vector: TiltVector {
                    x: max(|s| s.x_tilt),
                    y: max(|s| s.y_tilt),
                },
                avg_beta: max(|s| s.beta),
                avg_gamma: max(|s| s.gamma),
            }
        } else {
            let n = self.samples.len() as f64;
            let mean =
                |pick: fn(&TiltSample) -> f64| self.samples.values().map(pick).sum::<f64>() / n;
            FusedTilt {
                vector: TiltVector {
                    x: mean(|s| s.x_tilt),
                    y: mean(|s| s.y_tilt),
                },
                avg_beta: mean(|s| s.beta),
                avg_gamma: mean(|s| s.gamma),
            }
        }
    }
}
