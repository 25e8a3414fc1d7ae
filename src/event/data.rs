//! Flat, serializable snapshot of an event.
//!
//! Particles and vertices are stored in id order. Each link is a pair
//! `(links1[i], links2[i])`: a positive first entry with a negative second
//! one means "particle enters vertex", a negative first entry with a positive
//! second one means "vertex produces particle". Beams carry no link.

use serde::{Deserialize, Serialize};

use super::{Event, ROOT};
use crate::attribute::Attribute;
use crate::config::cfg_warn;
use crate::model::{FourVector, LengthUnit, MomentumUnit, ParticleData, VertexData};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventData {
    pub event_number: i32,
    pub momentum_unit: MomentumUnit,
    pub length_unit: LengthUnit,
    pub event_pos: FourVector,
    pub weights: Vec<f64>,
    pub particles: Vec<ParticleData>,
    pub vertices: Vec<VertexData>,
    pub links1: Vec<i32>,
    pub links2: Vec<i32>,
    pub attribute_id: Vec<i32>,
    pub attribute_name: Vec<String>,
    pub attribute_string: Vec<String>,
}

impl EventData {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Event {
    pub fn write_data(&self) -> EventData {
        let mut data = EventData {
            event_number: self.event_number,
            momentum_unit: self.momentum_unit,
            length_unit: self.length_unit,
            event_pos: self.event_pos(),
            weights: self.weights.clone(),
            particles: self.particles().map(|p| *p.data()).collect(),
            vertices: self.vertices().map(|v| *v.data()).collect(),
            ..EventData::default()
        };

        for v in self.vertices() {
            for p in v.particles_in() {
                data.links1.push(p.id());
                data.links2.push(v.id());
            }
            for p in v.particles_out() {
                data.links1.push(v.id());
                data.links2.push(p.id());
            }
        }

        for (name, owner, att) in self.attributes.snapshot() {
            data.attribute_id.push(owner);
            data.attribute_name.push(name);
            data.attribute_string.push(att.to_string());
        }
        data
    }

    /// Replace the content with `data`. Run info and config are kept;
    /// attributes come back unparsed. Links to unknown ids are skipped.
    pub fn read_data(&mut self, data: &EventData) {
        self.clear();
        self.event_number = data.event_number;
        self.momentum_unit = data.momentum_unit;
        self.length_unit = data.length_unit;
        self.weights = data.weights.clone();
        self.v_mut(ROOT).data.position = data.event_pos;
        self.reserve(data.particles.len(), data.vertices.len());

        for &pd in &data.particles {
            let p = self.create_particle(pd);
            self.add_particle(p);
        }
        for &vd in &data.vertices {
            let v = self.create_vertex(vd);
            self.add_vertex(v);
        }

        for (&a, &b) in data.links1.iter().zip(&data.links2) {
            match (a > 0, b > 0) {
                (true, false) => match (self.particle_ref(a), self.vertex_ref(b)) {
                    (Some(p), Some(v)) => self.add_particle_in(v, p),
                    _ => cfg_warn!(self.config, a, b, "read_data: skipping link to unknown id"),
                },
                (false, true) => match (self.vertex_ref(a), self.particle_ref(b)) {
                    (Some(v), Some(p)) => self.add_particle_out(v, p),
                    _ => cfg_warn!(self.config, a, b, "read_data: skipping link to unknown id"),
                },
                _ => cfg_warn!(self.config, a, b, "read_data: skipping malformed link"),
            }
        }

        for ((&owner, name), value) in
            data.attribute_id.iter().zip(&data.attribute_name).zip(&data.attribute_string)
        {
            self.attributes.add(name, owner, Attribute::unparsed(value.as_str()));
        }
    }
}
