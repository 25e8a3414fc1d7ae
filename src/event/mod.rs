//! # Event Record
//!
//! An [`Event`] owns every particle and vertex of one collision in an arena.
//! The user holds copyable handles ([`ParticleRef`], [`VertexRef`]) and reads
//! through borrowed views ([`Particle`], [`Vertex`]).
//!
//! ## Identity
//!
//! Particles that belong to the event have ids `1..=N` in insertion order,
//! vertices have ids `-1..=-M`. Removing an object renumbers everything after
//! it so the ranges stay dense, and attribute owners follow the renumbering.
//! Id 0 means "not part of the event" and is also the id of the root vertex,
//! the implicit production vertex of beam particles.
//!
//! ## Handles
//!
//! Objects are created detached (`create_particle`, `create_vertex`), wired
//! together (`add_particle_in`, `add_particle_out`) and then inserted
//! (`add_particle`, `add_vertex`, `add_tree`). Adding a vertex pulls its
//! particles in with it. Handles carry the tag of the arena that issued them;
//! a handle from another event, or one issued before [`Event::clear`], is
//! silently ignored.

pub mod data;
mod transform;
mod tree;
pub mod view;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;

use crate::attribute::{Attribute, AttributeContext, AttributeStore, AttributeType, CrossSection, HeavyIon};
use crate::config::{Config, cfg_warn};
use crate::model::{FourVector, LengthUnit, MomentumUnit, ParticleData, ParticleRef, VertexData, VertexRef};
use crate::run_info::RunInfo;
use crate::{Error, Result};

pub use data::EventData;
pub use view::{Particle, Vertex};

/// Slot of the root vertex in every arena.
pub(crate) const ROOT: u32 = 0;

static NEXT_ARENA: AtomicU64 = AtomicU64::new(1);

fn next_arena() -> u64 {
    NEXT_ARENA.fetch_add(1, Ordering::Relaxed)
}

// ============================================================================
// Arena slots
// ============================================================================

#[derive(Debug, Clone)]
pub(crate) struct ParticleSlot {
    pub(crate) data: ParticleData,
    pub(crate) id: i32,
    pub(crate) production_vertex: Option<u32>,
    pub(crate) end_vertex: Option<u32>,
}

#[derive(Debug, Clone)]
pub(crate) struct VertexSlot {
    pub(crate) data: VertexData,
    pub(crate) id: i32,
    pub(crate) particles_in: SmallVec<[u32; 4]>,
    pub(crate) particles_out: SmallVec<[u32; 4]>,
}

impl VertexSlot {
    fn new(data: VertexData) -> Self {
        Self { data, id: 0, particles_in: SmallVec::new(), particles_out: SmallVec::new() }
    }
}

/// Pending step of a cascading removal.
enum Removal {
    Particle(u32),
    Vertex(u32),
}

// ============================================================================
// Event
// ============================================================================

#[derive(Debug)]
pub struct Event {
    arena: u64,
    config: Config,
    event_number: i32,
    momentum_unit: MomentumUnit,
    length_unit: LengthUnit,
    weights: Vec<f64>,
    run_info: Option<Arc<RunInfo>>,
    particle_slots: Vec<ParticleSlot>,
    vertex_slots: Vec<VertexSlot>,
    /// Slots of event particles; index `i` has id `i + 1`.
    particles: Vec<u32>,
    /// Slots of event vertices; index `i` has id `-(i + 1)`.
    vertices: Vec<u32>,
    attributes: AttributeStore,
}

impl Default for Event {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Event {
    /// Deep copy through [`EventData`]. Attributes of the copy start unparsed.
    fn clone(&self) -> Self {
        let mut copy = Event::with_units(self.momentum_unit, self.length_unit).with_config(self.config);
        copy.run_info = self.run_info.clone();
        copy.read_data(&self.write_data());
        copy
    }
}

impl Event {
    /// Empty event in GEV and MM.
    pub fn new() -> Self {
        Self::with_units(MomentumUnit::Gev, LengthUnit::Mm)
    }

    pub fn with_units(momentum_unit: MomentumUnit, length_unit: LengthUnit) -> Self {
        Self {
            arena: next_arena(),
            config: Config::default(),
            event_number: 0,
            momentum_unit,
            length_unit,
            weights: Vec::new(),
            run_info: None,
            particle_slots: Vec::new(),
            vertex_slots: vec![VertexSlot::new(VertexData::default())],
            particles: Vec::new(),
            vertices: Vec::new(),
            attributes: AttributeStore::new(),
        }
    }

    /// Event sharing `run_info`, with one unit weight per weight name.
    pub fn with_run_info(run_info: Arc<RunInfo>, momentum_unit: MomentumUnit, length_unit: LengthUnit) -> Self {
        let mut evt = Self::with_units(momentum_unit, length_unit);
        evt.weights = vec![1.0; run_info.weight_names().len()];
        evt.run_info = Some(run_info);
        evt
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    // ========================================================================
    // Header data
    // ========================================================================

    pub fn event_number(&self) -> i32 {
        self.event_number
    }

    pub fn set_event_number(&mut self, number: i32) {
        self.event_number = number;
    }

    pub fn momentum_unit(&self) -> MomentumUnit {
        self.momentum_unit
    }

    pub fn length_unit(&self) -> LengthUnit {
        self.length_unit
    }

    pub fn run_info(&self) -> Option<&Arc<RunInfo>> {
        self.run_info.as_ref()
    }

    pub fn set_run_info(&mut self, run_info: Option<Arc<RunInfo>>) {
        self.run_info = run_info;
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn weights_mut(&mut self) -> &mut Vec<f64> {
        &mut self.weights
    }

    /// Weight called `name` in the run info.
    pub fn weight(&self, name: &str) -> Option<f64> {
        let index = self.run_info.as_ref()?.weight_index(name)?;
        self.weights.get(index).copied()
    }

    /// Set the weight called `name`, growing the weight vector as needed.
    pub fn set_weight(&mut self, name: &str, value: f64) -> Result<()> {
        let index = self
            .run_info
            .as_ref()
            .and_then(|run| run.weight_index(name))
            .ok_or_else(|| Error::UnknownWeight(name.to_owned()))?;
        if self.weights.len() <= index {
            self.weights.resize(index + 1, 1.0);
        }
        self.weights[index] = value;
        Ok(())
    }

    pub fn weight_names(&self) -> &[String] {
        self.run_info.as_ref().map_or(&[][..], |run| run.weight_names())
    }

    // ========================================================================
    // Slot access
    // ========================================================================

    pub(crate) fn p(&self, slot: u32) -> &ParticleSlot {
        &self.particle_slots[slot as usize]
    }

    fn p_mut(&mut self, slot: u32) -> &mut ParticleSlot {
        &mut self.particle_slots[slot as usize]
    }

    pub(crate) fn v(&self, slot: u32) -> &VertexSlot {
        &self.vertex_slots[slot as usize]
    }

    fn v_mut(&mut self, slot: u32) -> &mut VertexSlot {
        &mut self.vertex_slots[slot as usize]
    }

    fn particle_slot(&self, p: ParticleRef) -> Option<u32> {
        (p.arena == self.arena && (p.slot as usize) < self.particle_slots.len()).then_some(p.slot)
    }

    fn vertex_slot(&self, v: VertexRef) -> Option<u32> {
        (v.arena == self.arena && (v.slot as usize) < self.vertex_slots.len()).then_some(v.slot)
    }

    pub(crate) fn pref(&self, slot: u32) -> ParticleRef {
        ParticleRef { arena: self.arena, slot }
    }

    pub(crate) fn vref(&self, slot: u32) -> VertexRef {
        VertexRef { arena: self.arena, slot }
    }

    fn particle_in_event(&self, slot: u32) -> bool {
        self.p(slot).id != 0
    }

    fn vertex_in_event(&self, slot: u32) -> bool {
        self.v(slot).id != 0
    }

    // ========================================================================
    // Creation and lookup
    // ========================================================================

    /// New particle owned by this arena but not yet part of the event.
    pub fn create_particle(&mut self, data: ParticleData) -> ParticleRef {
        let slot = self.particle_slots.len() as u32;
        self.particle_slots.push(ParticleSlot { data, id: 0, production_vertex: None, end_vertex: None });
        self.pref(slot)
    }

    /// New vertex owned by this arena but not yet part of the event.
    pub fn create_vertex(&mut self, data: VertexData) -> VertexRef {
        let slot = self.vertex_slots.len() as u32;
        self.vertex_slots.push(VertexSlot::new(data));
        self.vref(slot)
    }

    pub fn particle(&self, p: ParticleRef) -> Option<Particle<'_>> {
        self.particle_slot(p).map(|slot| Particle::new(self, slot))
    }

    pub fn vertex(&self, v: VertexRef) -> Option<Vertex<'_>> {
        self.vertex_slot(v).map(|slot| Vertex::new(self, slot))
    }

    /// Particle with id `id` (1-based).
    pub fn particle_by_id(&self, id: i32) -> Option<Particle<'_>> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.particles.get(index).map(|&slot| Particle::new(self, slot))
    }

    /// Vertex with id `id` (negative).
    pub fn vertex_by_id(&self, id: i32) -> Option<Vertex<'_>> {
        let index = usize::try_from(id.checked_neg()?).ok()?.checked_sub(1)?;
        self.vertices.get(index).map(|&slot| Vertex::new(self, slot))
    }

    pub fn particle_ref(&self, id: i32) -> Option<ParticleRef> {
        self.particle_by_id(id).map(|p| p.handle())
    }

    pub fn vertex_ref(&self, id: i32) -> Option<VertexRef> {
        self.vertex_by_id(id).map(|v| v.handle())
    }

    /// Event particles in id order.
    pub fn particles(&self) -> impl ExactSizeIterator<Item = Particle<'_>> + DoubleEndedIterator {
        self.particles.iter().map(move |&slot| Particle::new(self, slot))
    }

    /// Event vertices in id order (`-1`, `-2`, ...).
    pub fn vertices(&self) -> impl ExactSizeIterator<Item = Vertex<'_>> + DoubleEndedIterator {
        self.vertices.iter().map(move |&slot| Vertex::new(self, slot))
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty() && self.vertices.is_empty()
    }

    /// The implicit production vertex of beam particles.
    pub fn root_vertex(&self) -> Vertex<'_> {
        Vertex::new(self, ROOT)
    }

    /// Particles produced by the root vertex.
    pub fn beams(&self) -> impl ExactSizeIterator<Item = Particle<'_>> {
        self.v(ROOT).particles_out.iter().map(move |&slot| Particle::new(self, slot))
    }

    pub fn particle_data_mut(&mut self, p: ParticleRef) -> Option<&mut ParticleData> {
        let slot = self.particle_slot(p)?;
        Some(&mut self.p_mut(slot).data)
    }

    pub fn vertex_data_mut(&mut self, v: VertexRef) -> Option<&mut VertexData> {
        let slot = self.vertex_slot(v)?;
        Some(&mut self.v_mut(slot).data)
    }

    /// Pre-allocate room for more particles and vertices.
    pub fn reserve(&mut self, particles: usize, vertices: usize) {
        self.particle_slots.reserve(particles);
        self.particles.reserve(particles);
        self.vertex_slots.reserve(vertices);
        self.vertices.reserve(vertices);
    }

    // ========================================================================
    // Vertex links
    // ========================================================================

    /// Make `p` an incoming particle of `v`, detaching it from its previous
    /// end vertex. If `v` is in the event, `p` is added too.
    pub fn add_particle_in(&mut self, v: VertexRef, p: ParticleRef) {
        if let (Some(vs), Some(ps)) = (self.vertex_slot(v), self.particle_slot(p)) {
            self.link_in(vs, ps);
        }
    }

    /// Make `p` an outgoing particle of `v`, detaching it from its previous
    /// production vertex. If `v` is in the event, `p` is added too.
    pub fn add_particle_out(&mut self, v: VertexRef, p: ParticleRef) {
        if let (Some(vs), Some(ps)) = (self.vertex_slot(v), self.particle_slot(p)) {
            self.link_out(vs, ps);
        }
    }

    pub fn remove_particle_in(&mut self, v: VertexRef, p: ParticleRef) {
        if let (Some(vs), Some(ps)) = (self.vertex_slot(v), self.particle_slot(p)) {
            self.unlink_in(vs, ps);
        }
    }

    pub fn remove_particle_out(&mut self, v: VertexRef, p: ParticleRef) {
        if let (Some(vs), Some(ps)) = (self.vertex_slot(v), self.particle_slot(p)) {
            self.unlink_out(vs, ps);
        }
    }

    fn link_in(&mut self, vs: u32, ps: u32) {
        if self.v(vs).particles_in.contains(&ps) {
            return;
        }
        if let Some(old) = self.p(ps).end_vertex {
            self.unlink_in(old, ps);
        }
        self.v_mut(vs).particles_in.push(ps);
        self.p_mut(ps).end_vertex = Some(vs);
        if self.vertex_in_event(vs) {
            self.attach_particle(ps);
        }
    }

    fn link_out(&mut self, vs: u32, ps: u32) {
        if self.v(vs).particles_out.contains(&ps) {
            return;
        }
        if let Some(old) = self.p(ps).production_vertex {
            self.unlink_out(old, ps);
        }
        self.v_mut(vs).particles_out.push(ps);
        self.p_mut(ps).production_vertex = Some(vs);
        if self.vertex_in_event(vs) {
            self.attach_particle(ps);
        }
    }

    fn unlink_in(&mut self, vs: u32, ps: u32) {
        let list = &mut self.v_mut(vs).particles_in;
        if let Some(pos) = list.iter().position(|&s| s == ps) {
            list.remove(pos);
            self.p_mut(ps).end_vertex = None;
        }
    }

    fn unlink_out(&mut self, vs: u32, ps: u32) {
        let list = &mut self.v_mut(vs).particles_out;
        if let Some(pos) = list.iter().position(|&s| s == ps) {
            list.remove(pos);
            self.p_mut(ps).production_vertex = None;
        }
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Add `p` to the event with the next particle id. A particle without a
    /// production vertex becomes a beam.
    pub fn add_particle(&mut self, p: ParticleRef) {
        if let Some(ps) = self.particle_slot(p) {
            self.attach_particle(ps);
        }
    }

    /// Add `v` and all of its particles. The root vertex cannot be added.
    pub fn add_vertex(&mut self, v: VertexRef) {
        if let Some(vs) = self.vertex_slot(v) {
            if vs != ROOT {
                self.attach_vertex(vs);
            }
        }
    }

    fn attach_particle(&mut self, ps: u32) {
        if self.particle_in_event(ps) {
            return;
        }
        self.particles.push(ps);
        self.p_mut(ps).id = self.particles.len() as i32;
        if self.p(ps).production_vertex.is_none() {
            self.link_out(ROOT, ps);
        }
    }

    fn attach_vertex(&mut self, vs: u32) {
        if self.vertex_in_event(vs) {
            return;
        }
        self.vertices.push(vs);
        self.v_mut(vs).id = -(self.vertices.len() as i32);

        let incoming = self.v(vs).particles_in.clone();
        for ps in incoming {
            self.p_mut(ps).end_vertex = Some(vs);
            self.attach_particle(ps);
        }
        let outgoing = self.v(vs).particles_out.clone();
        for ps in outgoing {
            self.p_mut(ps).production_vertex = Some(vs);
            self.attach_particle(ps);
        }
    }

    /// Add `p` as a beam: detach it from its production vertex, hang it on
    /// the root vertex and set status 4.
    pub fn add_beam_particle(&mut self, p: ParticleRef) {
        let Some(ps) = self.particle_slot(p) else {
            cfg_warn!(self.config, "add_beam_particle: particle belongs to another event");
            return;
        };
        if let Some(prod) = self.p(ps).production_vertex {
            if prod != ROOT {
                self.unlink_out(prod, ps);
            }
        }
        if self.particle_in_event(ps) {
            self.link_out(ROOT, ps);
        } else {
            self.attach_particle(ps);
        }
        self.p_mut(ps).data.status = 4;
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Remove `p`. A vertex left with no incoming or no outgoing particles
    /// is removed too, together with everything it produced.
    pub fn remove_particle(&mut self, p: ParticleRef) {
        if let Some(ps) = self.particle_slot(p) {
            self.run_removal(Removal::Particle(ps));
        }
    }

    /// Remove several particles, highest id first.
    pub fn remove_particles(&mut self, particles: &[ParticleRef]) {
        let mut slots: Vec<u32> = particles.iter().filter_map(|&p| self.particle_slot(p)).collect();
        slots.sort_by_key(|&s| std::cmp::Reverse(self.p(s).id));
        slots.dedup();
        for ps in slots {
            self.run_removal(Removal::Particle(ps));
        }
    }

    /// Remove `v` and, recursively, every particle it produced.
    pub fn remove_vertex(&mut self, v: VertexRef) {
        if let Some(vs) = self.vertex_slot(v) {
            self.run_removal(Removal::Vertex(vs));
        }
    }

    fn run_removal(&mut self, first: Removal) {
        let mut work = vec![first];
        while let Some(step) = work.pop() {
            match step {
                Removal::Particle(ps) => self.remove_particle_step(ps, &mut work),
                Removal::Vertex(vs) => self.remove_vertex_step(vs, &mut work),
            }
        }
    }

    fn remove_particle_step(&mut self, ps: u32, work: &mut Vec<Removal>) {
        if !self.particle_in_event(ps) {
            return;
        }
        if let Some(end) = self.p(ps).end_vertex {
            self.unlink_in(end, ps);
            if self.v(end).particles_in.is_empty() {
                work.push(Removal::Vertex(end));
            }
        }
        if let Some(prod) = self.p(ps).production_vertex {
            self.unlink_out(prod, ps);
            if self.v(prod).particles_out.is_empty() {
                work.push(Removal::Vertex(prod));
            }
        }

        let id = self.p(ps).id;
        let index = (id - 1) as usize;
        self.particles.remove(index);
        for &slot in &self.particles[index..] {
            self.particle_slots[slot as usize].id -= 1;
        }
        self.p_mut(ps).id = 0;
        self.attributes.remove_owner(id);
        self.attributes.remap_owners(|o| if o > id { o - 1 } else { o });
    }

    fn remove_vertex_step(&mut self, vs: u32, work: &mut Vec<Removal>) {
        if !self.vertex_in_event(vs) || vs == ROOT {
            return;
        }
        let incoming = self.v(vs).particles_in.clone();
        for ps in incoming {
            if self.p(ps).end_vertex == Some(vs) {
                self.p_mut(ps).end_vertex = None;
            }
        }
        let outgoing = self.v(vs).particles_out.clone();
        for ps in outgoing {
            if self.p(ps).production_vertex == Some(vs) {
                self.p_mut(ps).production_vertex = None;
            }
            work.push(Removal::Particle(ps));
        }

        let id = self.v(vs).id;
        let index = (-id - 1) as usize;
        self.vertices.remove(index);
        for &slot in &self.vertices[index..] {
            self.vertex_slots[slot as usize].id += 1;
        }
        self.v_mut(vs).id = 0;
        self.attributes.remove_owner(id);
        self.attributes.remap_owners(|o| if o < id { o + 1 } else { o });
    }

    /// Drop all particles, vertices, weights and attributes. Units and run
    /// info are kept; every previously issued handle becomes stale.
    pub fn clear(&mut self) {
        self.arena = next_arena();
        self.event_number = 0;
        self.weights.clear();
        self.attributes.clear();
        self.particles.clear();
        self.vertices.clear();
        self.particle_slots.clear();
        self.vertex_slots.clear();
        self.vertex_slots.push(VertexSlot::new(VertexData::default()));
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    pub fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    /// Attach an attribute to the event (`owner == 0`), a particle
    /// (`owner > 0`) or a vertex (`owner < 0`).
    pub fn add_attribute(&mut self, name: &str, attribute: impl Into<Attribute>, owner: i32) {
        self.attributes.add(name, owner, attribute.into());
    }

    /// Attach to a particle of this event. Returns false for detached or
    /// foreign particles.
    pub fn add_particle_attribute(&mut self, p: ParticleRef, name: &str, attribute: impl Into<Attribute>) -> bool {
        match self.particle_slot(p).map(|ps| self.p(ps).id) {
            Some(id) if id != 0 => {
                self.attributes.add(name, id, attribute.into());
                true
            }
            _ => false,
        }
    }

    /// Attach to a vertex of this event. Returns false for detached or
    /// foreign vertices.
    pub fn add_vertex_attribute(&mut self, v: VertexRef, name: &str, attribute: impl Into<Attribute>) -> bool {
        match self.vertex_slot(v).map(|vs| self.v(vs).id) {
            Some(id) if id != 0 => {
                self.attributes.add(name, id, attribute.into());
                true
            }
            _ => false,
        }
    }

    /// Typed lookup. Event-level names missing from the event fall back to
    /// the run info.
    pub fn attribute<T: AttributeType>(&self, name: &str, owner: i32) -> Option<T> {
        if !self.attributes.contains(name, owner) {
            return match (&self.run_info, owner) {
                (Some(run), 0) => run.attribute(name),
                _ => None,
            };
        }
        self.attributes.get(name, owner, &AttributeContext::for_event(self, owner))
    }

    pub fn attribute_as_string(&self, name: &str, owner: i32) -> Option<String> {
        match self.attributes.as_string(name, owner) {
            Some(s) => Some(s),
            None if owner == 0 => self.run_info.as_ref()?.attribute_as_string(name),
            None => None,
        }
    }

    pub fn remove_attribute(&mut self, name: &str, owner: i32) {
        self.attributes.remove(name, owner);
    }

    /// Attribute names of `owner`, sorted.
    pub fn attribute_names(&self, owner: i32) -> Vec<String> {
        self.attributes.names(owner)
    }

    pub fn cross_section(&self) -> Option<CrossSection> {
        self.attribute("GenCrossSection", 0)
    }

    pub fn set_cross_section(&mut self, cs: CrossSection) {
        self.add_attribute("GenCrossSection", cs, 0);
    }

    pub fn heavy_ion(&self) -> Option<HeavyIon> {
        self.attribute("GenHeavyIon", 0)
    }

    pub fn set_heavy_ion(&mut self, hi: HeavyIon) {
        self.add_attribute("GenHeavyIon", hi, 0);
    }

    /// Whether the event was flagged as containing a cycle.
    pub fn has_cycles(&self) -> bool {
        self.attribute::<i32>("cycles", 0).is_some_and(|c| c != 0)
    }

    // ========================================================================
    // Event position
    // ========================================================================

    /// Position of the root vertex.
    pub fn event_pos(&self) -> FourVector {
        self.v(ROOT).data.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(evt: &mut Event, pid: i32) -> ParticleRef {
        evt.create_particle(ParticleData::new(FourVector::new(0.0, 0.0, 1.0, 1.0), pid, 1))
    }

    #[test]
    fn test_event_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Event>();
    }

    #[test]
    fn test_add_particle_makes_beam() {
        let mut evt = Event::new();
        let p = particle(&mut evt, 2212);
        evt.add_particle(p);
        assert_eq!(evt.particle(p).unwrap().id(), 1);
        assert_eq!(evt.beams().len(), 1);
        assert_eq!(evt.particle(p).unwrap().production_vertex().unwrap().id(), 0);
    }

    #[test]
    fn test_add_vertex_pulls_particles() {
        let mut evt = Event::new();
        let a = particle(&mut evt, 1);
        let b = particle(&mut evt, 2);
        let v = evt.create_vertex(VertexData::default());
        evt.add_particle_in(v, a);
        evt.add_particle_out(v, b);
        evt.add_vertex(v);
        assert_eq!(evt.vertex(v).unwrap().id(), -1);
        assert_eq!(evt.particle(a).unwrap().id(), 1);
        assert_eq!(evt.particle(b).unwrap().id(), 2);
        // a has no production vertex and becomes a beam, b does not.
        assert_eq!(evt.beams().map(|p| p.id()).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_add_particle_in_moves_between_vertices() {
        let mut evt = Event::new();
        let p = particle(&mut evt, 1);
        let v1 = evt.create_vertex(VertexData::default());
        let v2 = evt.create_vertex(VertexData::default());
        evt.add_particle_in(v1, p);
        evt.add_particle_in(v1, p);
        assert_eq!(evt.vertex(v1).unwrap().particles_in().len(), 1);
        evt.add_particle_in(v2, p);
        assert_eq!(evt.vertex(v1).unwrap().particles_in().len(), 0);
        assert_eq!(evt.particle(p).unwrap().end_vertex().unwrap().handle(), v2);
    }

    #[test]
    fn test_foreign_handle_is_ignored() {
        let mut a = Event::new();
        let mut b = Event::new();
        let p = particle(&mut a, 1);
        b.add_particle(p);
        assert_eq!(b.particle_count(), 0);
        assert!(b.particle(p).is_none());
    }

    #[test]
    fn test_clear_invalidates_handles() {
        let mut evt = Event::new();
        let p = particle(&mut evt, 1);
        evt.add_particle(p);
        evt.clear();
        assert!(evt.particle(p).is_none());
        evt.add_particle(p);
        assert_eq!(evt.particle_count(), 0);
        assert_eq!(evt.momentum_unit(), MomentumUnit::Gev);
    }

    #[test]
    fn test_weight_by_name() {
        let mut run = RunInfo::new();
        run.set_weight_names(vec!["nominal".into(), "up".into()]).unwrap();
        let mut evt = Event::with_run_info(Arc::new(run), MomentumUnit::Gev, LengthUnit::Mm);
        assert_eq!(evt.weights(), &[1.0, 1.0]);
        evt.set_weight("up", 2.5).unwrap();
        assert_eq!(evt.weight("up"), Some(2.5));
        assert!(matches!(evt.set_weight("down", 1.0), Err(Error::UnknownWeight(_))));
    }
}
