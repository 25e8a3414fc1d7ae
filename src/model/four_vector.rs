//! Four-vectors for momenta and space-time positions.
//!
//! The same four doubles are read either as `(px, py, pz, e)` or as
//! `(x, y, z, t)`; the accessors only differ in name.

use std::f64::consts::PI;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Four doubles with momentum and position accessors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FourVector {
    x: f64,
    y: f64,
    z: f64,
    t: f64,
}

impl FourVector {
    /// The additive identity.
    pub const ZERO: FourVector = FourVector { x: 0.0, y: 0.0, z: 0.0, t: 0.0 };

    pub const fn new(x: f64, y: f64, z: f64, t: f64) -> Self {
        Self { x, y, z, t }
    }

    pub fn set(&mut self, x: f64, y: f64, z: f64, t: f64) {
        *self = Self::new(x, y, z, t);
    }

    /// Component by index in `x, y, z, t` order. Out of range reads as 0.
    pub fn component(&self, i: usize) -> f64 {
        match i {
            0 => self.x,
            1 => self.y,
            2 => self.z,
            3 => self.t,
            _ => 0.0,
        }
    }

    /// Set component by index in `x, y, z, t` order. Out of range is ignored.
    pub fn set_component(&mut self, i: usize, value: f64) {
        match i {
            0 => self.x = value,
            1 => self.y = value,
            2 => self.z = value,
            3 => self.t = value,
            _ => {}
        }
    }

    // ========================================================================
    // Position accessors
    // ========================================================================

    pub fn x(&self) -> f64 { self.x }
    pub fn y(&self) -> f64 { self.y }
    pub fn z(&self) -> f64 { self.z }
    pub fn t(&self) -> f64 { self.t }

    pub fn set_x(&mut self, v: f64) { self.x = v; }
    pub fn set_y(&mut self, v: f64) { self.y = v; }
    pub fn set_z(&mut self, v: f64) { self.z = v; }
    pub fn set_t(&mut self, v: f64) { self.t = v; }

    // ========================================================================
    // Momentum accessors
    // ========================================================================

    pub fn px(&self) -> f64 { self.x }
    pub fn py(&self) -> f64 { self.y }
    pub fn pz(&self) -> f64 { self.z }
    pub fn e(&self) -> f64 { self.t }

    pub fn set_px(&mut self, v: f64) { self.x = v; }
    pub fn set_py(&mut self, v: f64) { self.y = v; }
    pub fn set_pz(&mut self, v: f64) { self.z = v; }
    pub fn set_e(&mut self, v: f64) { self.t = v; }

    // ========================================================================
    // Derived quantities
    // ========================================================================

    /// Squared magnitude of the spatial 3-vector.
    pub fn length2(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    pub fn length(&self) -> f64 {
        self.length2().sqrt()
    }

    /// Squared magnitude of the transverse (x, y) part.
    pub fn perp2(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    pub fn perp(&self) -> f64 {
        self.perp2().sqrt()
    }

    /// `t² - x² - y² - z²`
    pub fn interval(&self) -> f64 {
        self.t * self.t - self.length2()
    }

    pub fn p3mod2(&self) -> f64 { self.length2() }
    pub fn p3mod(&self) -> f64 { self.length() }
    pub fn pt2(&self) -> f64 { self.perp2() }
    pub fn pt(&self) -> f64 { self.perp() }

    /// Squared invariant mass.
    pub fn m2(&self) -> f64 {
        self.interval()
    }

    /// Invariant mass; `-sqrt(-m²)` for space-like vectors.
    pub fn m(&self) -> f64 {
        let m2 = self.m2();
        if m2 > 0.0 { m2.sqrt() } else { -(-m2).sqrt() }
    }

    /// Azimuthal angle.
    pub fn phi(&self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Polar angle with respect to the z axis.
    pub fn theta(&self) -> f64 {
        self.perp().atan2(self.z)
    }

    /// Pseudorapidity.
    pub fn eta(&self) -> f64 {
        let p = self.p3mod();
        0.5 * ((p + self.z) / (p - self.z)).ln()
    }

    /// Rapidity.
    pub fn rap(&self) -> f64 {
        0.5 * ((self.t + self.z) / (self.t - self.z)).ln()
    }

    pub fn abs_eta(&self) -> f64 { self.eta().abs() }
    pub fn abs_rap(&self) -> f64 { self.rap().abs() }

    /// Exact comparison with the zero vector.
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0 && self.t == 0.0
    }

    // ========================================================================
    // Separations
    // ========================================================================

    /// Signed azimuthal separation folded into `[-π, π)`. NaN passes through.
    pub fn delta_phi(&self, other: &FourVector) -> f64 {
        let mut dphi = self.phi() - other.phi();
        if dphi.is_nan() {
            return dphi;
        }
        while dphi >= PI { dphi -= 2.0 * PI; }
        while dphi < -PI { dphi += 2.0 * PI; }
        dphi
    }

    pub fn delta_eta(&self, other: &FourVector) -> f64 {
        self.eta() - other.eta()
    }

    pub fn delta_rap(&self, other: &FourVector) -> f64 {
        self.rap() - other.rap()
    }

    /// `Δφ² + Δη²`
    pub fn delta_r2_eta(&self, other: &FourVector) -> f64 {
        let dphi = self.delta_phi(other);
        let deta = self.delta_eta(other);
        dphi * dphi + deta * deta
    }

    pub fn delta_r_eta(&self, other: &FourVector) -> f64 {
        self.delta_r2_eta(other).sqrt()
    }

    /// `Δφ² + Δy²`
    pub fn delta_r2_rap(&self, other: &FourVector) -> f64 {
        let dphi = self.delta_phi(other);
        let drap = self.delta_rap(other);
        dphi * dphi + drap * drap
    }

    pub fn delta_r_rap(&self, other: &FourVector) -> f64 {
        self.delta_r2_rap(other).sqrt()
    }
}

// ============================================================================
// Arithmetic
// ============================================================================

impl Add for FourVector {
    type Output = FourVector;
    fn add(self, rhs: FourVector) -> FourVector {
        FourVector::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z, self.t + rhs.t)
    }
}

impl Sub for FourVector {
    type Output = FourVector;
    fn sub(self, rhs: FourVector) -> FourVector {
        FourVector::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z, self.t - rhs.t)
    }
}

impl Neg for FourVector {
    type Output = FourVector;
    fn neg(self) -> FourVector {
        FourVector::new(-self.x, -self.y, -self.z, -self.t)
    }
}

impl Mul<f64> for FourVector {
    type Output = FourVector;
    fn mul(self, rhs: f64) -> FourVector {
        FourVector::new(self.x * rhs, self.y * rhs, self.z * rhs, self.t * rhs)
    }
}

impl Div<f64> for FourVector {
    type Output = FourVector;
    fn div(self, rhs: f64) -> FourVector {
        FourVector::new(self.x / rhs, self.y / rhs, self.z / rhs, self.t / rhs)
    }
}

impl AddAssign for FourVector {
    fn add_assign(&mut self, rhs: FourVector) { *self = *self + rhs; }
}

impl SubAssign for FourVector {
    fn sub_assign(&mut self, rhs: FourVector) { *self = *self - rhs; }
}

impl MulAssign<f64> for FourVector {
    fn mul_assign(&mut self, rhs: f64) { *self = *self * rhs; }
}

impl DivAssign<f64> for FourVector {
    fn div_assign(&mut self, rhs: f64) { *self = *self / rhs; }
}
