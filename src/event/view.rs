//! Borrowed read-only views of particles and vertices.

use std::fmt;

use hashbrown::HashSet;

use super::{Event, ROOT};
use crate::attribute::AttributeType;
use crate::model::{FourVector, ParticleData, ParticleRef, VertexData, VertexRef};

// ============================================================================
// Particle
// ============================================================================

#[derive(Clone, Copy)]
pub struct Particle<'a> {
    event: &'a Event,
    slot: u32,
}

impl<'a> Particle<'a> {
    pub(crate) fn new(event: &'a Event, slot: u32) -> Self {
        Self { event, slot }
    }

    pub fn handle(&self) -> ParticleRef {
        self.event.pref(self.slot)
    }

    pub fn event(&self) -> &'a Event {
        self.event
    }

    /// `1..=N` inside the event, 0 when detached.
    pub fn id(&self) -> i32 {
        self.event.p(self.slot).id
    }

    pub fn in_event(&self) -> bool {
        self.id() != 0
    }

    pub fn data(&self) -> &'a ParticleData {
        &self.event.p(self.slot).data
    }

    pub fn pid(&self) -> i32 {
        self.data().pid
    }

    pub fn abs_pid(&self) -> i32 {
        self.data().abs_pid()
    }

    pub fn status(&self) -> i32 {
        self.data().status
    }

    pub fn momentum(&self) -> FourVector {
        self.data().momentum
    }

    pub fn generated_mass(&self) -> f64 {
        self.data().generated_mass()
    }

    pub fn is_generated_mass_set(&self) -> bool {
        self.data().is_mass_set
    }

    pub fn production_vertex(&self) -> Option<Vertex<'a>> {
        self.event.p(self.slot).production_vertex.map(|vs| Vertex::new(self.event, vs))
    }

    pub fn end_vertex(&self) -> Option<Vertex<'a>> {
        self.event.p(self.slot).end_vertex.map(|vs| Vertex::new(self.event, vs))
    }

    /// Incoming particles of the production vertex.
    pub fn parents(&self) -> Vec<Particle<'a>> {
        self.production_vertex().map(|v| v.particles_in().collect()).unwrap_or_default()
    }

    /// Outgoing particles of the end vertex.
    pub fn children(&self) -> Vec<Particle<'a>> {
        self.end_vertex().map(|v| v.particles_out().collect()).unwrap_or_default()
    }

    pub fn attribute<T: AttributeType>(&self, name: &str) -> Option<T> {
        match self.id() {
            0 => None,
            id => self.event.attribute(name, id),
        }
    }

    pub fn attribute_as_string(&self, name: &str) -> Option<String> {
        match self.id() {
            0 => None,
            id => self.event.attribute_as_string(name, id),
        }
    }

    pub fn attribute_names(&self) -> Vec<String> {
        match self.id() {
            0 => Vec::new(),
            id => self.event.attribute_names(id),
        }
    }
}

impl PartialEq for Particle<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.event, other.event) && self.slot == other.slot
    }
}

impl Eq for Particle<'_> {}

impl fmt::Debug for Particle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Particle")
            .field("id", &self.id())
            .field("pid", &self.pid())
            .field("status", &self.status())
            .field("momentum", &self.momentum())
            .finish()
    }
}

// ============================================================================
// Vertex
// ============================================================================

#[derive(Clone, Copy)]
pub struct Vertex<'a> {
    event: &'a Event,
    slot: u32,
}

impl<'a> Vertex<'a> {
    pub(crate) fn new(event: &'a Event, slot: u32) -> Self {
        Self { event, slot }
    }

    pub fn handle(&self) -> VertexRef {
        self.event.vref(self.slot)
    }

    pub fn event(&self) -> &'a Event {
        self.event
    }

    /// `-1..=-M` inside the event, 0 when detached or for the root vertex.
    pub fn id(&self) -> i32 {
        self.event.v(self.slot).id
    }

    pub fn in_event(&self) -> bool {
        self.id() != 0
    }

    pub fn is_root(&self) -> bool {
        self.slot == ROOT
    }

    pub fn data(&self) -> &'a VertexData {
        &self.event.v(self.slot).data
    }

    pub fn status(&self) -> i32 {
        self.data().status
    }

    pub fn has_set_position(&self) -> bool {
        self.data().has_set_position()
    }

    pub fn particles_in(&self) -> impl ExactSizeIterator<Item = Particle<'a>> + use<'a> {
        let event = self.event;
        event.v(self.slot).particles_in.iter().map(move |&ps| Particle::new(event, ps))
    }

    pub fn particles_out(&self) -> impl ExactSizeIterator<Item = Particle<'a>> + use<'a> {
        let event = self.event;
        event.v(self.slot).particles_out.iter().map(move |&ps| Particle::new(event, ps))
    }

    /// Effective position.
    ///
    /// An explicit position wins. Otherwise the position is inherited from
    /// the production vertex of the first incoming particle that has one,
    /// recursively, ending at the event position. Events flagged with cycles
    /// skip the walk.
    pub fn position(&self) -> FourVector {
        let event = self.event;
        let mut current = self.slot;
        let mut seen = HashSet::new();
        loop {
            let slot = event.v(current);
            if slot.data.has_set_position() || current == ROOT {
                return slot.data.position;
            }
            if slot.id == 0 {
                return FourVector::ZERO;
            }
            if event.has_cycles() || !seen.insert(current) {
                return event.event_pos();
            }
            let parent = slot
                .particles_in
                .iter()
                .find_map(|&ps| event.p(ps).production_vertex);
            match parent {
                Some(next) => current = next,
                None => return event.event_pos(),
            }
        }
    }

    pub fn attribute<T: AttributeType>(&self, name: &str) -> Option<T> {
        match self.id() {
            0 => None,
            id => self.event.attribute(name, id),
        }
    }

    pub fn attribute_as_string(&self, name: &str) -> Option<String> {
        match self.id() {
            0 => None,
            id => self.event.attribute_as_string(name, id),
        }
    }

    pub fn attribute_names(&self) -> Vec<String> {
        match self.id() {
            0 => Vec::new(),
            id => self.event.attribute_names(id),
        }
    }
}

impl PartialEq for Vertex<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.event, other.event) && self.slot == other.slot
    }
}

impl Eq for Vertex<'_> {}

impl fmt::Debug for Vertex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vertex")
            .field("id", &self.id())
            .field("status", &self.status())
            .field("particles_in", &self.particles_in().map(|p| p.id()).collect::<Vec<_>>())
            .field("particles_out", &self.particles_out().map(|p| p.id()).collect::<Vec<_>>())
            .finish()
    }
}
