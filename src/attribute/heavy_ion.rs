//! Heavy-ion collision summary.
//!
//! Three string layouts are read: the legacy unversioned one, `v0` (with
//! spectator and eccentricity scalars) and `v1`. Output is always `v0`, the
//! only layout that carries every field.

use std::collections::BTreeMap;
use std::str::{FromStr, SplitWhitespace};

use serde::{Deserialize, Serialize};

use super::{Attribute, AttributeType};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HeavyIon {
    pub ncoll_hard: i32,
    pub npart_proj: i32,
    pub npart_targ: i32,
    pub ncoll: i32,
    pub spectator_neutrons: i32,
    pub spectator_protons: i32,
    pub n_nwounded_collisions: i32,
    pub nwounded_n_collisions: i32,
    pub nwounded_nwounded_collisions: i32,
    pub impact_parameter: f64,
    pub event_plane_angle: f64,
    pub eccentricity: f64,
    pub sigma_inel_nn: f64,
    pub centrality: f64,
    pub user_cent_estimate: f64,
    pub nspec_proj_n: i32,
    pub nspec_targ_n: i32,
    pub nspec_proj_p: i32,
    pub nspec_targ_p: i32,
    /// Participant plane angle by order.
    pub participant_plane_angles: BTreeMap<i32, f64>,
    /// Eccentricity by order.
    pub eccentricities: BTreeMap<i32, f64>,
}

struct Cursor<'a>(SplitWhitespace<'a>);

impl Cursor<'_> {
    fn next<T: FromStr>(&mut self) -> Option<T> {
        self.0.next()?.parse().ok()
    }

    fn ordered_map(&mut self) -> Option<BTreeMap<i32, f64>> {
        let n: usize = self.next()?;
        let mut map = BTreeMap::new();
        for _ in 0..n {
            let order: i32 = self.next()?;
            map.insert(order, self.next()?);
        }
        Some(map)
    }
}

impl HeavyIon {
    /// Any field differs from zero.
    pub fn is_valid(&self) -> bool {
        *self != HeavyIon::default()
    }

    fn parse_legacy(c: &mut Cursor<'_>) -> Option<Self> {
        Some(HeavyIon {
            ncoll_hard: c.next()?,
            npart_proj: c.next()?,
            npart_targ: c.next()?,
            ncoll: c.next()?,
            spectator_neutrons: c.next()?,
            spectator_protons: c.next()?,
            n_nwounded_collisions: c.next()?,
            nwounded_n_collisions: c.next()?,
            nwounded_nwounded_collisions: c.next()?,
            impact_parameter: c.next()?,
            event_plane_angle: c.next()?,
            eccentricity: c.next()?,
            sigma_inel_nn: c.next()?,
            centrality: c.next()?,
            ..HeavyIon::default()
        })
    }

    fn parse_versioned(c: &mut Cursor<'_>, v0: bool) -> Option<Self> {
        let mut hi = HeavyIon {
            ncoll_hard: c.next()?,
            npart_proj: c.next()?,
            npart_targ: c.next()?,
            ncoll: c.next()?,
            ..HeavyIon::default()
        };
        if v0 {
            hi.spectator_neutrons = c.next()?;
            hi.spectator_protons = c.next()?;
        }
        hi.n_nwounded_collisions = c.next()?;
        hi.nwounded_n_collisions = c.next()?;
        hi.nwounded_nwounded_collisions = c.next()?;
        hi.impact_parameter = c.next()?;
        hi.event_plane_angle = c.next()?;
        if v0 {
            hi.eccentricity = c.next()?;
        }
        hi.sigma_inel_nn = c.next()?;
        hi.centrality = c.next()?;
        if !v0 {
            hi.user_cent_estimate = c.next()?;
        }
        hi.nspec_proj_n = c.next()?;
        hi.nspec_targ_n = c.next()?;
        hi.nspec_proj_p = c.next()?;
        hi.nspec_targ_p = c.next()?;
        hi.participant_plane_angles = c.ordered_map()?;
        hi.eccentricities = c.ordered_map()?;
        Some(hi)
    }

    pub fn to_attribute_string(&self) -> String {
        let mut out = format!(
            "v0 {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} ",
            self.ncoll_hard,
            self.npart_proj,
            self.npart_targ,
            self.ncoll,
            self.spectator_neutrons,
            self.spectator_protons,
            self.n_nwounded_collisions,
            self.nwounded_n_collisions,
            self.nwounded_nwounded_collisions,
            self.impact_parameter,
            self.event_plane_angle,
            self.eccentricity,
            self.sigma_inel_nn,
            self.centrality,
            self.nspec_proj_n,
            self.nspec_targ_n,
            self.nspec_proj_p,
            self.nspec_targ_p,
        );
        for map in [&self.participant_plane_angles, &self.eccentricities] {
            out.push_str(&map.len().to_string());
            for (order, value) in map {
                out.push_str(&format!(" {order} {value}"));
            }
            out.push(' ');
        }
        out.truncate(out.trim_end().len());
        out
    }
}

impl AttributeType for HeavyIon {
    fn from_string(s: &str) -> Option<Self> {
        let mut c = Cursor(s.split_whitespace());
        if !s.trim_start().starts_with('v') {
            return Self::parse_legacy(&mut c);
        }
        let version: String = c.next()?;
        Self::parse_versioned(&mut c, version == "v0")
    }

    fn from_attribute(attribute: &Attribute) -> Option<Self> {
        match attribute {
            Attribute::HeavyIon(hi) => Some(hi.clone()),
            _ => None,
        }
    }

    fn into_attribute(self) -> Attribute {
        Attribute::HeavyIon(self)
    }
}
