//! Streaming Asciiv3 reader.
//!
//! One call to [`AsciiReader::read_event`] consumes one record: the `E`
//! line and everything up to the next `E` line or the footer. Vertices are
//! staged until the record is complete so that forward references can be
//! resolved and the final vertex ids come out as `-1..=-M`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use hashbrown::{HashMap, HashSet};

use super::fields::Fields;
use super::{HEADER_END, HEADER_START, Reader, unescape};
use crate::attribute::Attribute;
use crate::config::{Config, cfg_debug, cfg_error, cfg_warn};
use crate::event::Event;
use crate::model::{FourVector, LengthUnit, MomentumUnit, ParticleData, ParticleRef, VertexData, VertexRef};
use crate::run_info::{RunInfo, ToolInfo};
use crate::{Error, Result};

/// A vertex seen in the current record but not yet added to the event.
struct StagedVertex {
    vertex: VertexRef,
    /// Declared id, 0 for vertices created implicitly by a particle line.
    id: i32,
}

/// Parse state of one record.
#[derive(Default)]
struct Record {
    header_parsed: bool,
    declared_vertices: usize,
    declared_particles: usize,
    vertices: Vec<StagedVertex>,
    /// Declared vertex id to its staged vertex. The first declaration wins.
    by_id: HashMap<i32, VertexRef>,
    /// Particle produced by a vertex that had not been declared yet.
    pending_daughters: Vec<(ParticleRef, i32)>,
    /// Incoming particle of a vertex that had not been declared yet.
    pending_mothers: Vec<(VertexRef, i32)>,
}

impl Record {
    fn stage(&mut self, vertex: VertexRef, id: i32) {
        if id != 0 {
            self.by_id.entry(id).or_insert(vertex);
        }
        self.vertices.push(StagedVertex { vertex, id });
    }

    fn staged(&self, id: i32) -> Option<VertexRef> {
        self.by_id.get(&id).copied()
    }
}

/// Upper bound on the storage reserved from the counts in an `E` line.
/// Larger records still grow as they are read.
const MAX_RESERVE: usize = 1 << 16;

enum Flow {
    Continue,
    Stop,
}

pub struct AsciiReader<R: BufRead> {
    input: R,
    run_info: Arc<RunInfo>,
    config: Config,
    line_no: usize,
    line: String,
    failed: bool,
    finished: bool,
    /// An `E` line has been consumed; later `W`/`A` lines belong to events.
    seen_event: bool,
}

impl AsciiReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> AsciiReader<R> {
    pub fn new(input: R) -> Self {
        Self::with_config(input, Config::default())
    }

    pub fn with_config(input: R, config: Config) -> Self {
        Self {
            input,
            run_info: Arc::new(RunInfo::new()),
            config,
            line_no: 0,
            line: String::new(),
            failed: false,
            finished: false,
            seen_event: false,
        }
    }

    pub fn run_info(&self) -> &Arc<RunInfo> {
        &self.run_info
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    // ========================================================================
    // Line access
    // ========================================================================

    fn peek_byte(&mut self) -> Result<Option<u8>> {
        Ok(self.input.fill_buf()?.first().copied())
    }

    /// Read the next line into `self.line`, without its terminator.
    fn next_line(&mut self) -> Result<bool> {
        self.line.clear();
        if self.input.read_line(&mut self.line)? == 0 {
            self.finished = true;
            return Ok(false);
        }
        self.line_no += 1;
        let trimmed = self.line.trim_end_matches(['\r', '\n']).len();
        self.line.truncate(trimmed);
        Ok(true)
    }

    // ========================================================================
    // Records
    // ========================================================================

    /// Fill `evt` with the next record. `Ok(false)` at end of input or after
    /// a failure.
    pub fn read_event(&mut self, evt: &mut Event) -> Result<bool> {
        if self.failed || self.finished {
            return Ok(false);
        }
        evt.clear();
        let mut record = Record::default();

        let outcome = self
            .parse_record(evt, &mut record)
            .and_then(|found| if found { self.finish_record(evt, record).map(|()| true) } else { Ok(false) });

        match outcome {
            Ok(found) => {
                if found {
                    evt.set_run_info(Some(Arc::clone(&self.run_info)));
                }
                Ok(found)
            }
            Err(e) => {
                cfg_error!(self.config, line = self.line_no, "read_event: {e}");
                evt.clear();
                self.failed = true;
                Err(e)
            }
        }
    }

    /// Consume lines of one record. Returns whether anything was read.
    fn parse_record(&mut self, evt: &mut Event, record: &mut Record) -> Result<bool> {
        loop {
            if !self.next_line()? {
                break;
            }
            let line = std::mem::take(&mut self.line);
            let flow = self.parse_line(&line, evt, record);
            self.line = line;
            if let Flow::Stop = flow? {
                break;
            }
            if record.header_parsed && self.peek_byte()? == Some(b'E') {
                break;
            }
        }
        Ok(record.header_parsed || evt.particle_count() > 0 || !record.vertices.is_empty())
    }

    fn parse_line(&mut self, line: &str, evt: &mut Event, record: &mut Record) -> Result<Flow> {
        let Some(tag) = line.chars().next() else {
            return Ok(Flow::Continue);
        };
        if line.starts_with("HepMC::") {
            return Ok(self.parse_marker(line, record));
        }

        let mut f = Fields::new(line, self.line_no);
        match (tag, record.header_parsed) {
            ('E', _) => self.parse_event_header(&mut f, evt, record)?,
            ('V', _) => self.parse_vertex(&mut f, evt, record)?,
            ('P', _) => self.parse_particle(&mut f, evt, record)?,
            ('U', _) => self.parse_units(&mut f, evt)?,
            ('W', true) => self.parse_weights(&mut f, evt)?,
            ('W', false) => self.parse_weight_names(&mut f)?,
            ('N', _) => self.parse_quoted_weight_names(&mut f)?,
            ('A', true) => self.parse_attribute(&mut f, evt)?,
            ('A', false) => self.parse_run_attribute(&mut f)?,
            ('T', _) => self.parse_tool(&mut f),
            _ => cfg_warn!(self.config, line = self.line_no, "skipping unrecognised line: {line}"),
        }
        Ok(Flow::Continue)
    }

    fn parse_marker(&mut self, line: &str, record: &Record) -> Flow {
        if line.starts_with("HepMC::Version") || line == HEADER_START {
            return if record.header_parsed { Flow::Stop } else { Flow::Continue };
        }
        if line == HEADER_END {
            return Flow::Stop;
        }
        cfg_warn!(self.config, "unsupported format marker '{line}', closing input");
        self.finished = true;
        Flow::Stop
    }

    fn parse_event_header(&mut self, f: &mut Fields<'_>, evt: &mut Event, record: &mut Record) -> Result<()> {
        let number: i32 = f.expect("event number")?;
        record.declared_vertices = f.expect("vertex count")?;
        record.declared_particles = f.expect("particle count")?;
        if let Some(pos) = f.position()? {
            evt.shift_position_to(pos);
        }
        evt.set_event_number(number);
        evt.reserve(
            record.declared_particles.min(MAX_RESERVE),
            record.declared_vertices.min(MAX_RESERVE),
        );
        record.header_parsed = true;
        self.seen_event = true;
        cfg_debug!(
            self.config, 10,
            event = number,
            vertices = record.declared_vertices,
            particles = record.declared_particles,
            "event header"
        );
        Ok(())
    }

    fn parse_vertex(&mut self, f: &mut Fields<'_>, evt: &mut Event, record: &mut Record) -> Result<()> {
        let id: i32 = f.expect("vertex id")?;
        if id >= 0 {
            return Err(f.error(format!("vertex id {id} is not negative")));
        }
        let status: i32 = f.expect("vertex status")?;
        let incoming = f.bracket_list("incoming particle list")?;
        let position = f.position()?.unwrap_or(FourVector::ZERO);

        let v = evt.create_vertex(VertexData { status, position });
        let known = evt.particle_count() as i32;
        for pid in incoming.into_iter().filter(|&r| r > 0) {
            match evt.particle_ref(pid) {
                Some(p) if pid <= known => evt.add_particle_in(v, p),
                _ => record.pending_mothers.push((v, pid)),
            }
        }
        record.stage(v, id);
        cfg_debug!(self.config, 30, vertex = id, status, "vertex");
        Ok(())
    }

    fn parse_particle(&mut self, f: &mut Fields<'_>, evt: &mut Event, record: &mut Record) -> Result<()> {
        let expected = evt.particle_count() as i64 + 1;
        let id: i64 = f.expect("particle id")?;
        if id != expected {
            return Err(f.error(format!("particle id {id} out of sequence, expected {expected}")));
        }
        let mother: i32 = f.expect("mother reference")?;
        let pid: i32 = f.expect("PDG id")?;
        let momentum = FourVector::new(
            f.expect("px")?,
            f.expect("py")?,
            f.expect("pz")?,
            f.expect("energy")?,
        );
        let mass: f64 = f.expect("generated mass")?;
        let status: i32 = f.expect("particle status")?;

        let p = evt.create_particle(ParticleData::new(momentum, pid, status).with_generated_mass(mass));
        if mother > 0 && i64::from(mother) < expected {
            if let Some(m) = evt.particle_ref(mother) {
                let end = evt.particle(m).and_then(|mp| mp.end_vertex()).map(|v| v.handle());
                let vertex = match end {
                    Some(v) => v,
                    None => {
                        let v = evt.create_vertex(VertexData::default());
                        evt.add_particle_in(v, m);
                        record.stage(v, 0);
                        v
                    }
                };
                evt.add_particle_out(vertex, p);
            }
        } else if mother < 0 {
            match record.staged(mother) {
                Some(v) => evt.add_particle_out(v, p),
                None => record.pending_daughters.push((p, mother)),
            }
        }
        evt.add_particle(p);
        Ok(())
    }

    fn parse_units(&mut self, f: &mut Fields<'_>, evt: &mut Event) -> Result<()> {
        let momentum: &str = f.next_token().ok_or_else(|| f.error("missing momentum unit"))?;
        let length: &str = f.next_token().ok_or_else(|| f.error("missing length unit"))?;
        let momentum_unit = MomentumUnit::parse(momentum).unwrap_or_else(|| {
            cfg_warn!(self.config, unit = momentum, "unknown momentum unit, using GEV");
            MomentumUnit::Gev
        });
        let length_unit = LengthUnit::parse(length).unwrap_or_else(|| {
            cfg_warn!(self.config, unit = length, "unknown length unit, using CM");
            LengthUnit::Cm
        });
        // Values in the record are already in these units.
        evt.assign_units(momentum_unit, length_unit);
        Ok(())
    }

    fn parse_weights(&mut self, f: &mut Fields<'_>, evt: &mut Event) -> Result<()> {
        let weights = f
            .remaining()
            .into_iter()
            .map(|tok| tok.parse::<f64>().map_err(|_| f.error(format!("malformed weight '{tok}'"))))
            .collect::<Result<Vec<f64>>>()?;
        let expected = self.run_info.weight_names().len();
        if expected > 0 && weights.len() != expected {
            return Err(Error::WeightCountMismatch { expected, got: weights.len() });
        }
        *evt.weights_mut() = weights;
        Ok(())
    }

    fn parse_weight_names(&mut self, f: &mut Fields<'_>) -> Result<()> {
        let raw = f.rest().unwrap_or_default();
        let names = unescape(raw).split_whitespace().map(str::to_owned).collect();
        Arc::make_mut(&mut self.run_info).set_weight_names(names)
    }

    /// `N <count> "name" "name" ...`
    fn parse_quoted_weight_names(&mut self, f: &mut Fields<'_>) -> Result<()> {
        let count: usize = f.expect("weight name count")?;
        let raw = f.rest().unwrap_or_default();
        let names: Vec<String> = raw.split('"').skip(1).step_by(2).map(str::to_owned).collect();
        if names.len() != count {
            cfg_warn!(self.config, declared = count, found = names.len(), "weight name count mismatch");
        }
        Arc::make_mut(&mut self.run_info).set_weight_names(names)
    }

    fn parse_tool(&mut self, f: &mut Fields<'_>) {
        let raw = unescape(f.rest().unwrap_or_default());
        let mut parts = raw.splitn(3, '\n');
        let tool = ToolInfo::new(
            parts.next().unwrap_or_default(),
            parts.next().unwrap_or_default(),
            parts.next().unwrap_or_default(),
        );
        Arc::make_mut(&mut self.run_info).add_tool(tool);
    }

    fn parse_attribute(&mut self, f: &mut Fields<'_>, evt: &mut Event) -> Result<()> {
        let owner: i32 = f.expect("attribute owner")?;
        let name = f.next_token().ok_or_else(|| f.error("missing attribute name"))?;
        let value = f.rest().ok_or_else(|| f.error(format!("missing value of attribute '{name}'")))?;
        evt.add_attribute(name, Attribute::unparsed(unescape(value)), owner);
        Ok(())
    }

    fn parse_run_attribute(&mut self, f: &mut Fields<'_>) -> Result<()> {
        let name = f.next_token().ok_or_else(|| f.error("missing attribute name"))?;
        let value = f.rest().ok_or_else(|| f.error(format!("missing value of attribute '{name}'")))?;
        Arc::make_mut(&mut self.run_info).add_attribute(name, Attribute::unparsed(unescape(value)));
        Ok(())
    }

    // ========================================================================
    // Completion
    // ========================================================================

    fn finish_record(&mut self, evt: &mut Event, mut record: Record) -> Result<()> {
        let particles = evt.particle_count();
        let vertices = record.vertices.len();
        if particles != record.declared_particles {
            return Err(Error::Inconsistent(format!(
                "{particles} particles read, {} declared",
                record.declared_particles
            )));
        }
        if vertices != record.declared_vertices {
            return Err(Error::Inconsistent(format!(
                "{vertices} vertices read, {} declared",
                record.declared_vertices
            )));
        }

        for (p, vid) in std::mem::take(&mut record.pending_daughters) {
            match record.staged(vid) {
                Some(v) => evt.add_particle_out(v, p),
                None => cfg_debug!(self.config, 1, vertex = vid, "dropping link to undeclared vertex"),
            }
        }
        for (v, pid) in std::mem::take(&mut record.pending_mothers) {
            match evt.particle_ref(pid) {
                Some(p) => evt.add_particle_in(v, p),
                None => cfg_debug!(self.config, 1, particle = pid, "dropping link to undeclared particle"),
            }
        }

        // Implicit vertices take the unused ids, -1 first.
        let used: HashSet<i32> = record.vertices.iter().map(|s| s.id).filter(|&id| id != 0).collect();
        let mut free = (1..=vertices as i32).map(|i| -i).filter(|id| !used.contains(id));
        for staged in record.vertices.iter_mut().filter(|s| s.id == 0) {
            staged.id = free
                .next()
                .ok_or_else(|| Error::Inconsistent("no free id for implicit vertex".into()))?;
        }

        record.vertices.sort_by(|a, b| b.id.cmp(&a.id));
        let dense = record.vertices.iter().enumerate().all(|(i, s)| s.id == -(i as i32) - 1);
        if !dense {
            return Err(Error::Inconsistent(format!(
                "vertex ids {:?} do not form a dense range",
                record.vertices.iter().map(|s| s.id).collect::<Vec<_>>()
            )));
        }
        for staged in &record.vertices {
            evt.add_vertex(staged.vertex);
        }
        Ok(())
    }

    /// Skip `n` records without building them. Run-level lines before the
    /// first record are still applied.
    pub fn skip(&mut self, n: usize) -> Result<bool> {
        if self.failed || self.finished {
            return Ok(false);
        }
        let mut headers = 0;
        loop {
            match self.peek_byte()? {
                None => {
                    self.finished = true;
                    return Ok(false);
                }
                Some(b'E') => {
                    if headers == n {
                        return Ok(true);
                    }
                    headers += 1;
                    self.seen_event = true;
                }
                Some(_) => {}
            }
            if !self.next_line()? {
                return Ok(false);
            }
            if !self.seen_event {
                let line = std::mem::take(&mut self.line);
                let result = self.apply_run_line(&line);
                self.line = line;
                if let Err(e) = result {
                    self.failed = true;
                    return Err(e);
                }
            }
        }
    }

    fn apply_run_line(&mut self, line: &str) -> Result<()> {
        let mut f = Fields::new(line, self.line_no);
        match line.chars().next() {
            Some('W') => self.parse_weight_names(&mut f),
            Some('N') => self.parse_quoted_weight_names(&mut f),
            Some('A') => self.parse_run_attribute(&mut f),
            Some('T') => {
                self.parse_tool(&mut f);
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl<R: BufRead> Reader for AsciiReader<R> {
    fn read_event(&mut self, evt: &mut Event) -> Result<bool> {
        AsciiReader::read_event(self, evt)
    }

    fn skip(&mut self, n: usize) -> Result<bool> {
        AsciiReader::skip(self, n)
    }

    fn failed(&self) -> bool {
        self.failed
    }

    fn run_info(&self) -> &Arc<RunInfo> {
        &self.run_info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_TO_TWO: &str = "\
HepMC::Version 3.02.06
HepMC::Asciiv3-START_EVENT_LISTING
E 3 1 4
U GEV MM
P 1 0 2212 0 0 10 10 0.938 4
P 2 0 2212 0 0 -10 10 0.938 4
V -1 0 [1,2]
P 3 -1 21 1 0 0 1 0 1
P 4 -1 21 -1 0 0 1 0 1
HepMC::Asciiv3-END_EVENT_LISTING
";

    #[test]
    fn test_reads_single_record() {
        let mut reader = AsciiReader::new(TWO_TO_TWO.as_bytes());
        let mut evt = Event::new();
        assert!(reader.read_event(&mut evt).unwrap());
        assert_eq!(evt.event_number(), 3);
        assert_eq!(evt.particle_count(), 4);
        assert_eq!(evt.vertex_count(), 1);
        let v = evt.vertex_by_id(-1).unwrap();
        assert_eq!(v.particles_in().map(|p| p.id()).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(v.particles_out().map(|p| p.id()).collect::<Vec<_>>(), vec![3, 4]);
        assert!(!reader.read_event(&mut evt).unwrap());
    }

    #[test]
    fn test_implicit_vertex_gets_free_id() {
        let input = "E 0 2 3\nP 1 0 11 0 0 1 1 0 4\nV -2 0 [1]\nP 2 -2 22 0 0 1 1 0 2\nP 3 2 11 0 0 1 1 0 1\n";
        let mut reader = AsciiReader::new(input.as_bytes());
        let mut evt = Event::new();
        assert!(reader.read_event(&mut evt).unwrap());
        assert_eq!(evt.vertex_count(), 2);
        let implicit = evt.particle_by_id(3).unwrap().production_vertex().unwrap();
        assert_eq!(implicit.id(), -1);
        assert_eq!(implicit.particles_in().next().unwrap().id(), 2);
        assert_eq!(evt.vertex_by_id(-2).unwrap().particles_in().next().unwrap().id(), 1);
    }

    #[test]
    fn test_particle_id_out_of_sequence_fails() {
        let input = "E 0 0 2\nP 1 0 11 0 0 1 1 0 4\nP 3 0 11 0 0 1 1 0 4\n";
        let mut reader = AsciiReader::new(input.as_bytes());
        let mut evt = Event::new();
        let err = reader.read_event(&mut evt).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 3, .. }));
        assert!(evt.is_empty());
        assert!(reader.failed());
        assert!(!reader.read_event(&mut evt).unwrap());
    }

    #[test]
    fn test_staged_lookup_keeps_first_declaration() {
        let mut evt = Event::new();
        let mut record = Record::default();
        let first = evt.create_vertex(VertexData::default());
        let second = evt.create_vertex(VertexData::default());
        let implicit = evt.create_vertex(VertexData::default());
        record.stage(first, -1);
        record.stage(implicit, 0);
        record.stage(second, -1);
        assert_eq!(record.staged(-1), Some(first));
        assert_eq!(record.staged(0), None);
        assert_eq!(record.vertices.len(), 3);
    }

    #[test]
    fn test_long_decay_chain() {
        let n = 3000;
        let mut input = format!("E 0 {n} {}\nP 1 0 11 0 0 1 1 0 4\n", n + 1);
        for i in 1..=n {
            input.push_str(&format!("V -{i} 0 [{i}]\nP {} -{i} 11 0 0 1 1 0 4\n", i + 1));
        }
        let mut reader = AsciiReader::new(input.as_bytes());
        let mut evt = Event::new();
        assert!(reader.read_event(&mut evt).unwrap());
        assert_eq!(evt.vertex_count(), n);
        let last = evt.particle_by_id(n as i32 + 1).unwrap();
        assert_eq!(last.production_vertex().unwrap().id(), -(n as i32));
    }
}
