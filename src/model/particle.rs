//! Particle data and handle.

use serde::{Deserialize, Serialize};

use super::FourVector;

/// Opaque particle handle.
///
/// Handles are bound to the [`Event`](crate::Event) arena that created them.
/// A handle from another event, or one that outlived [`Event::clear`](crate::Event::clear),
/// is rejected by every operation that takes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleRef {
    pub(crate) arena: u64,
    pub(crate) slot: u32,
}

/// Plain per-particle data.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ParticleData {
    /// PDG particle id.
    pub pid: i32,
    pub status: i32,
    /// Whether `mass` holds an explicit generated mass.
    pub is_mass_set: bool,
    pub mass: f64,
    pub momentum: FourVector,
}

impl ParticleData {
    pub fn new(momentum: FourVector, pid: i32, status: i32) -> Self {
        Self { pid, status, is_mass_set: false, mass: 0.0, momentum }
    }

    pub fn with_generated_mass(mut self, mass: f64) -> Self {
        self.set_generated_mass(mass);
        self
    }

    /// The explicit mass if set, otherwise the invariant mass of the momentum.
    pub fn generated_mass(&self) -> f64 {
        if self.is_mass_set { self.mass } else { self.momentum.m() }
    }

    pub fn set_generated_mass(&mut self, mass: f64) {
        self.mass = mass;
        self.is_mass_set = true;
    }

    pub fn unset_generated_mass(&mut self) {
        self.mass = 0.0;
        self.is_mass_set = false;
    }

    pub fn abs_pid(&self) -> i32 {
        self.pid.abs()
    }
}
