//! Unit conversion and geometric transformations of a whole event.
//!
//! Momenta are transformed for every event particle. Positions are
//! transformed for the event position and for vertices with an explicit
//! position; inherited positions follow automatically.

use super::{Event, ROOT};
use crate::config::cfg_warn;
use crate::model::{FourVector, LengthUnit, MomentumUnit, convert_length, convert_momentum};
use crate::{Error, Result};

impl Event {
    /// Convert momenta, generated masses and set positions to new units.
    pub fn set_units(&mut self, momentum_unit: MomentumUnit, length_unit: LengthUnit) {
        if momentum_unit != self.momentum_unit {
            let factor = self.momentum_unit.factor_to(momentum_unit);
            for i in 0..self.particles.len() {
                let data = &mut self.particle_slots[self.particles[i] as usize].data;
                convert_momentum(&mut data.momentum, self.momentum_unit, momentum_unit);
                data.mass *= factor;
            }
            self.momentum_unit = momentum_unit;
        }

        if length_unit != self.length_unit {
            let from = self.length_unit;
            self.for_each_position(|pos| convert_length(pos, from, length_unit));
            self.length_unit = length_unit;
        }
    }

    /// Relabel units without touching any value.
    pub(crate) fn assign_units(&mut self, momentum_unit: MomentumUnit, length_unit: LengthUnit) {
        self.momentum_unit = momentum_unit;
        self.length_unit = length_unit;
    }

    /// Move the event position and every set vertex position by `delta`.
    pub fn shift_position_by(&mut self, delta: FourVector) {
        self.v_mut(ROOT).data.position += delta;
        for i in 0..self.vertices.len() {
            let data = &mut self.vertex_slots[self.vertices[i] as usize].data;
            if data.has_set_position() {
                data.position += delta;
            }
        }
    }

    /// Shift so that the event position becomes `position`.
    pub fn shift_position_to(&mut self, position: FourVector) {
        let delta = position - self.event_pos();
        self.shift_position_by(delta);
    }

    /// Lorentz boost of all momenta by velocity `delta` (spatial part, in
    /// units of c).
    ///
    /// Fails and leaves the event untouched for `|delta| >= 1`. A boost
    /// below machine precision is a successful no-op.
    pub fn boost(&mut self, delta: FourVector) -> Result<()> {
        let b2 = delta.length2();
        if b2 > 1.0 {
            cfg_warn!(self.config, b2, "boost: boost vector is faster than light, event left as is");
            return Err(Error::InvalidTransform(format!("boost vector with |b|^2 = {b2} > 1")));
        }
        if (b2 - 1.0).abs() < f64::EPSILON {
            cfg_warn!(self.config, b2, "boost: gamma too large, event left as is");
            return Err(Error::InvalidTransform("boost vector too close to the speed of light".into()));
        }
        if b2.abs() < f64::EPSILON {
            cfg_warn!(self.config, b2, "boost: boost vector too small, event left as is");
            return Ok(());
        }

        let b = b2.sqrt();
        let gamma = 1.0 / (1.0 - b2).sqrt();
        let (bx, by, bz) = (delta.x(), delta.y(), delta.z());
        for i in 0..self.particles.len() {
            let mom = &mut self.particle_slots[self.particles[i] as usize].data.momentum;
            let e = mom.e();
            let nr = (bx * mom.px() + by * mom.py() + bz * mom.pz()) / b;
            let k = (gamma - 1.0) * nr / b - e * gamma;
            *mom = FourVector::new(
                mom.px() + bx * k,
                mom.py() + by * k,
                mom.pz() + bz * k,
                gamma * (e - b * nr),
            );
        }
        Ok(())
    }

    /// Rotate momenta and positions by the angles `delta.x()`, `delta.y()`
    /// and `delta.z()` around the x, y and z axes, applied in that order.
    pub fn rotate(&mut self, delta: FourVector) {
        let rotation = Rotation::new(delta);
        for i in 0..self.particles.len() {
            let mom = &mut self.particle_slots[self.particles[i] as usize].data.momentum;
            *mom = rotation.apply(*mom);
        }
        self.for_each_position(|pos| *pos = rotation.apply(*pos));
    }

    /// Flip the sign of component `axis` (0 = x, 1 = y, 2 = z, 3 = t) of
    /// every momentum and position.
    pub fn reflect(&mut self, axis: usize) -> Result<()> {
        if axis > 3 {
            cfg_warn!(self.config, axis, "reflect: wrong axis, event left as is");
            return Err(Error::InvalidTransform(format!("reflection axis {axis} out of range 0..=3")));
        }
        let flip = |v: &mut FourVector| v.set_component(axis, -v.component(axis));
        for i in 0..self.particles.len() {
            flip(&mut self.particle_slots[self.particles[i] as usize].data.momentum);
        }
        self.for_each_position(flip);
        Ok(())
    }

    /// Event position plus every explicitly set vertex position.
    fn for_each_position(&mut self, mut f: impl FnMut(&mut FourVector)) {
        let root = &mut self.vertex_slots[ROOT as usize].data.position;
        if !root.is_zero() {
            f(root);
        }
        for i in 0..self.vertices.len() {
            let slot = self.vertices[i] as usize;
            if slot == ROOT as usize {
                continue;
            }
            let pos = &mut self.vertex_slots[slot].data.position;
            if !pos.is_zero() {
                f(pos);
            }
        }
    }
}

/// Successive rotations around x, y and z.
struct Rotation {
    sin: [f64; 3],
    cos: [f64; 3],
}

impl Rotation {
    fn new(angles: FourVector) -> Self {
        let a = [angles.x(), angles.y(), angles.z()];
        Self { sin: a.map(f64::sin), cos: a.map(f64::cos) }
    }

    fn apply(&self, v: FourVector) -> FourVector {
        let (mut x, mut y, mut z) = (v.x(), v.y(), v.z());
        let [sa, sb, sg] = self.sin;
        let [ca, cb, cg] = self.cos;

        (y, z) = (ca * y + sa * z, -sa * y + ca * z);
        (x, z) = (cb * x - sb * z, sb * x + cb * z);
        (x, y) = (cg * x + sg * y, -sg * x + cg * y);
        FourVector::new(x, y, z, v.t())
    }
}
