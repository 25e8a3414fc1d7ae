//! Topological insertion of a whole particle tree.

use std::collections::VecDeque;

use hashbrown::{HashMap, HashSet};

use super::{Event, ROOT};
use crate::config::{cfg_debug, cfg_warn};
use crate::model::ParticleRef;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Open,
    Done,
}

impl Event {
    /// Insert the interaction spanned by `particles`, parents before children.
    ///
    /// Walks start at the end vertices of particles that have no production
    /// vertex, or whose production vertex has no incoming particles. A vertex
    /// is inserted only after the production vertices of all its incoming
    /// particles. Particles not reachable from such a start are ignored.
    ///
    /// If the connected graph contains a directed cycle, the event attribute
    /// `cycles` is set to 1 and the vertices and particles are inserted in
    /// input order instead. An event that already carries `cycles` skips the
    /// check and trusts the flag; a loop met during the ordered walk still
    /// sets the flag and falls back to input order.
    pub fn add_tree(&mut self, particles: &[ParticleRef]) {
        let parts: Vec<u32> = particles.iter().filter_map(|&p| self.particle_slot(p)).collect();
        let roots: Vec<u32> = parts
            .iter()
            .filter_map(|&ps| {
                let p = self.p(ps);
                let starts = match p.production_vertex {
                    None => true,
                    Some(vs) => self.v(vs).particles_in.is_empty(),
                };
                if starts { p.end_vertex } else { None }
            })
            .collect();

        // An existing flag, set or cleared, replaces the check.
        let cyclic = if self.attributes.contains("cycles", 0) {
            self.has_cycles()
        } else {
            self.has_cycle(&roots)
        };
        if cyclic || !self.insert_ordered(roots) {
            cfg_warn!(self.config, "add_tree: cycle detected, inserting without ordering");
            self.add_attribute("cycles", 1i32, 0);
            self.insert_unordered(&parts);
        }
        self.relocate_root();
    }

    /// Directed cycle anywhere in the graph connected to `roots`.
    fn has_cycle(&self, roots: &[u32]) -> bool {
        let mut component: Vec<u32> = Vec::new();
        let mut seen: HashSet<u32> = HashSet::new();
        let mut stack: Vec<u32> = roots.to_vec();
        while let Some(vs) = stack.pop() {
            if !seen.insert(vs) {
                continue;
            }
            component.push(vs);
            let v = self.v(vs);
            let up = v.particles_in.iter().filter_map(|&ps| self.p(ps).production_vertex);
            let down = v.particles_out.iter().filter_map(|&ps| self.p(ps).end_vertex);
            stack.extend(up.chain(down).filter(|n| !seen.contains(n)));
        }

        let mut marks: HashMap<u32, Mark> = HashMap::new();
        for &start in &component {
            if marks.contains_key(&start) {
                continue;
            }
            marks.insert(start, Mark::Open);
            let mut path: Vec<(u32, usize)> = vec![(start, 0)];
            while let Some(top) = path.last_mut() {
                let (vs, next) = *top;
                let outs = &self.v(vs).particles_out;
                if next < outs.len() {
                    top.1 += 1;
                    if let Some(child) = self.p(outs[next]).end_vertex {
                        match marks.get(&child) {
                            Some(Mark::Open) => return true,
                            Some(Mark::Done) => {}
                            None => {
                                marks.insert(child, Mark::Open);
                                path.push((child, 0));
                            }
                        }
                    }
                } else {
                    marks.insert(vs, Mark::Done);
                    path.pop();
                }
            }
        }
        false
    }

    /// Breadth-first insertion from `roots`. Returns false, leaving the rest
    /// uninserted, if a vertex turns out to be its own ancestor.
    fn insert_ordered(&mut self, roots: Vec<u32>) -> bool {
        let mut queue: VecDeque<u32> = VecDeque::with_capacity(roots.len());
        let mut queued: HashSet<u32> = HashSet::new();
        for vs in roots {
            if queued.insert(vs) {
                queue.push_back(vs);
            }
        }
        // Vertices put back for a missing parent. Each one is a descendant of
        // the parent it waits for, so meeting one again as a parent is a loop.
        let mut waiting: HashSet<u32> = HashSet::new();

        while let Some(&vs) = queue.front() {
            if self.vertex_in_event(vs) {
                queue.pop_front();
                queued.remove(&vs);
                waiting.remove(&vs);
                continue;
            }

            let missing_parent = self
                .v(vs)
                .particles_in
                .iter()
                .filter_map(|&ps| self.p(ps).production_vertex)
                .find(|&pv| !self.vertex_in_event(pv));
            if let Some(parent) = missing_parent {
                if waiting.contains(&parent) {
                    return false;
                }
                waiting.insert(vs);
                if !queued.insert(parent) {
                    queue.retain(|&q| q != parent);
                }
                queue.push_front(parent);
                continue;
            }

            queue.pop_front();
            queued.remove(&vs);
            waiting.remove(&vs);
            self.attach_vertex(vs);
            cfg_debug!(self.config, 30, vertex = self.v(vs).id, "add_tree: inserted vertex");

            let children: Vec<u32> = self
                .v(vs)
                .particles_out
                .iter()
                .filter_map(|&ps| self.p(ps).end_vertex)
                .collect();
            for child in children {
                if !self.vertex_in_event(child) && queued.insert(child) {
                    queue.push_back(child);
                }
            }
        }
        true
    }

    /// Production and end vertices of `parts` in order of first appearance,
    /// then any particle still missing.
    fn insert_unordered(&mut self, parts: &[u32]) {
        for &ps in parts {
            let p = self.p(ps);
            for vs in [p.production_vertex, p.end_vertex].into_iter().flatten() {
                if vs != ROOT {
                    self.attach_vertex(vs);
                }
            }
        }
        for &ps in parts {
            self.attach_particle(ps);
        }
    }

    /// Give the root vertex id 0 again if the walk inserted it.
    fn relocate_root(&mut self) {
        let root_id = self.v(ROOT).id;
        if root_id == 0 {
            return;
        }
        let index = (-root_id - 1) as usize;
        if self.vertices.get(index) != Some(&ROOT) {
            cfg_warn!(self.config, root_id, "add_tree: root vertex id does not match its position");
            return;
        }
        self.vertices.remove(index);
        for &slot in &self.vertices[index..] {
            self.vertex_slots[slot as usize].id += 1;
        }
        self.v_mut(ROOT).id = 0;
        self.attributes.remap_owners(|o| {
            if o == root_id {
                0
            } else if o < root_id {
                o + 1
            } else {
                o
            }
        });
    }
}
