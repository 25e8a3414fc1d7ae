//! Momentum and length units.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::FourVector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MomentumUnit {
    Mev,
    #[default]
    Gev,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LengthUnit {
    #[default]
    Mm,
    Cm,
}

impl MomentumUnit {
    pub fn name(&self) -> &'static str {
        match self {
            MomentumUnit::Mev => "MEV",
            MomentumUnit::Gev => "GEV",
        }
    }

    /// Case-sensitive prefix match on `GEV` / `MEV`.
    pub fn parse(token: &str) -> Option<Self> {
        if token.starts_with("GEV") {
            Some(MomentumUnit::Gev)
        } else if token.starts_with("MEV") {
            Some(MomentumUnit::Mev)
        } else {
            None
        }
    }

    /// Multiplicative factor taking a value in `self` to `to`.
    pub fn factor_to(&self, to: MomentumUnit) -> f64 {
        match (self, to) {
            (MomentumUnit::Gev, MomentumUnit::Mev) => 1000.0,
            (MomentumUnit::Mev, MomentumUnit::Gev) => 0.001,
            _ => 1.0,
        }
    }
}

impl LengthUnit {
    pub fn name(&self) -> &'static str {
        match self {
            LengthUnit::Mm => "MM",
            LengthUnit::Cm => "CM",
        }
    }

    /// Case-sensitive prefix match on `MM` / `CM`.
    pub fn parse(token: &str) -> Option<Self> {
        if token.starts_with("CM") {
            Some(LengthUnit::Cm)
        } else if token.starts_with("MM") {
            Some(LengthUnit::Mm)
        } else {
            None
        }
    }

    pub fn factor_to(&self, to: LengthUnit) -> f64 {
        match (self, to) {
            (LengthUnit::Cm, LengthUnit::Mm) => 10.0,
            (LengthUnit::Mm, LengthUnit::Cm) => 0.1,
            _ => 1.0,
        }
    }
}

impl fmt::Display for MomentumUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Convert a momentum in place.
pub fn convert_momentum(v: &mut FourVector, from: MomentumUnit, to: MomentumUnit) {
    if from != to {
        *v *= from.factor_to(to);
    }
}

/// Convert a position in place.
pub fn convert_length(v: &mut FourVector, from: LengthUnit, to: LengthUnit) {
    if from != to {
        *v *= from.factor_to(to);
    }
}
