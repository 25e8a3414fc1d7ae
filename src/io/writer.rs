//! Asciiv3 writer.
//!
//! Particles are written in id order. A vertex line is written right before
//! the first particle it produces. A vertex with a single incoming particle
//! and nothing else to say (no status, position or attributes) is left
//! implicit: its products name the incoming particle as their mother.
//!
//! The footer is written by [`AsciiWriter::close`], [`AsciiWriter::into_inner`]
//! or on drop, whichever comes first.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use super::{FORMAT_VERSION, HEADER_END, HEADER_START, Writer, escape};
use crate::config::{Config, cfg_debug, cfg_error};
use crate::event::{Event, Particle, Vertex};
use crate::model::FourVector;
use crate::run_info::RunInfo;
use crate::{Error, Result};

#[derive(Clone, Copy, PartialEq, Eq)]
enum VertexState {
    Pending,
    Written,
    Implicit,
}

pub struct AsciiWriter<W: Write> {
    /// Taken by `into_inner`.
    out: Option<W>,
    run_info: Option<Arc<RunInfo>>,
    config: Config,
    header_written: bool,
    closed: bool,
    buf: String,
}

impl AsciiWriter<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> AsciiWriter<W> {
    pub fn new(out: W) -> Self {
        Self::with_config(out, Config::default())
    }

    pub fn with_config(out: W, config: Config) -> Self {
        Self { out: Some(out), run_info: None, config, header_written: false, closed: false, buf: String::new() }
    }

    /// Run info to write before the first event, if that event does not
    /// carry its own.
    pub fn with_run_info(mut self, run_info: Arc<RunInfo>) -> Self {
        self.run_info = Some(run_info);
        self
    }

    pub fn set_run_info(&mut self, run_info: Arc<RunInfo>) {
        self.run_info = Some(run_info);
    }

    // ========================================================================
    // Events
    // ========================================================================

    fn sink(&mut self) -> Result<&mut W> {
        match self.out.as_mut() {
            Some(out) if !self.closed => Ok(out),
            _ => Err(Error::Closed),
        }
    }

    pub fn write_event(&mut self, evt: &Event) -> Result<()> {
        if self.closed {
            return Err(Error::Closed);
        }
        if !self.header_written {
            let out = self.sink()?;
            writeln!(out, "HepMC::Version {FORMAT_VERSION}")?;
            writeln!(out, "{HEADER_START}")?;
            self.header_written = true;
            if let Some(run) = self.run_info.clone() {
                self.write_run_info(&run)?;
            }
        }
        if let Some(run) = evt.run_info() {
            let known = self.run_info.as_ref().is_some_and(|r| Arc::ptr_eq(r, run));
            if !known {
                self.run_info = Some(Arc::clone(run));
                self.write_run_info(run)?;
            }
        }

        self.buf.clear();
        self.format_event(evt);
        let buf = std::mem::take(&mut self.buf);
        let written = self.sink().and_then(|out| Ok(out.write_all(buf.as_bytes())?));
        self.buf = buf;
        written?;
        cfg_debug!(self.config, 10, event = evt.event_number(), bytes = self.buf.len(), "event written");
        Ok(())
    }

    fn write_run_info(&mut self, run: &RunInfo) -> Result<()> {
        let out = self.sink()?;
        if !run.weight_names().is_empty() {
            let names: Vec<String> = run.weight_names().iter().map(|n| escape(n)).collect();
            writeln!(out, "W {}", names.join(" "))?;
        }
        for tool in run.tools() {
            let joined = format!("{}\n{}\n{}", tool.name, tool.version, tool.description);
            writeln!(out, "T {}", escape(&joined))?;
        }
        for name in run.attribute_names() {
            if let Some(value) = run.attribute_as_string(&name) {
                writeln!(out, "A {} {}", name, escape(&value))?;
            }
        }
        Ok(())
    }

    fn format_event(&mut self, evt: &Event) {
        let prec = self.config.precision;
        let buf = &mut self.buf;

        buf.push_str(&format!("E {} {} {}", evt.event_number(), evt.vertex_count(), evt.particle_count()));
        write_position(buf, evt.event_pos(), prec);
        buf.push('\n');
        line(buf, format_args!("U {} {}", evt.momentum_unit(), evt.length_unit()));
        if !evt.weights().is_empty() {
            let ws: Vec<String> = evt.weights().iter().map(|w| format!("{w:.prec$e}")).collect();
            line(buf, format_args!("W {}", ws.join(" ")));
        }
        for (name, owner, att) in evt.attributes().snapshot() {
            line(buf, format_args!("A {} {} {}", owner, name, escape(&att.to_string())));
        }

        let mut states = vec![VertexState::Pending; evt.vertex_count()];
        for p in evt.particles() {
            let mother = match p.production_vertex() {
                Some(v) if v.id() < 0 => {
                    let index = (-v.id() - 1) as usize;
                    match implicit_parent(&v, &p) {
                        Some(parent) if states[index] != VertexState::Written => {
                            states[index] = VertexState::Implicit;
                            parent
                        }
                        _ => {
                            if states[index] == VertexState::Pending {
                                write_vertex(buf, &v, prec);
                                states[index] = VertexState::Written;
                            }
                            v.id()
                        }
                    }
                }
                _ => 0,
            };
            write_particle(buf, &p, mother, prec);
        }

        for v in evt.vertices() {
            let index = (-v.id() - 1) as usize;
            if states[index] == VertexState::Pending {
                write_vertex(buf, &v, prec);
            }
        }
    }

    /// Write the footer and flush. Idempotent.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        let header_written = self.header_written;
        let out = self.sink()?;
        if header_written {
            writeln!(out, "{HEADER_END}")?;
        }
        out.flush()?;
        self.closed = true;
        Ok(())
    }

    /// Close and hand back the sink.
    pub fn into_inner(mut self) -> Result<W> {
        self.close()?;
        self.out.take().ok_or(Error::Closed)
    }
}

impl<W: Write> Drop for AsciiWriter<W> {
    fn drop(&mut self) {
        if self.out.is_some() {
            if let Err(e) = self.close() {
                cfg_error!(self.config, "closing writer on drop: {e}");
            }
        }
    }
}

impl<W: Write> Writer for AsciiWriter<W> {
    fn write_event(&mut self, evt: &Event) -> Result<()> {
        AsciiWriter::write_event(self, evt)
    }

    fn set_run_info(&mut self, run_info: Arc<RunInfo>) {
        AsciiWriter::set_run_info(self, run_info);
    }

    fn close(&mut self) -> Result<()> {
        AsciiWriter::close(self)
    }
}

// ============================================================================
// Line formatting
// ============================================================================

fn line(buf: &mut String, args: std::fmt::Arguments<'_>) {
    use std::fmt::Write as _;
    let _ = buf.write_fmt(args);
    buf.push('\n');
}

/// Mother id to write for `p` if its production vertex can stay implicit.
fn implicit_parent(v: &Vertex<'_>, p: &Particle<'_>) -> Option<i32> {
    let mut incoming = v.particles_in();
    let parent = match (incoming.next(), incoming.next()) {
        (Some(parent), None) => parent,
        _ => return None,
    };
    let plain = v.status() == 0 && !v.has_set_position() && v.attribute_names().is_empty();
    (plain && parent.id() < p.id()).then(|| parent.id())
}

fn write_vertex(buf: &mut String, v: &Vertex<'_>, prec: usize) {
    let incoming: Vec<String> = v.particles_in().map(|p| p.id().to_string()).collect();
    buf.push_str(&format!("V {} {} [{}]", v.id(), v.status(), incoming.join(",")));
    write_position(buf, v.data().position, prec);
    buf.push('\n');
}

/// ` @ x y z t`, omitted for the zero vector.
fn write_position(buf: &mut String, pos: FourVector, prec: usize) {
    if !pos.is_zero() {
        buf.push_str(&format!(
            " @ {:.p$e} {:.p$e} {:.p$e} {:.p$e}",
            pos.x(), pos.y(), pos.z(), pos.t(),
            p = prec
        ));
    }
}

fn write_particle(buf: &mut String, p: &Particle<'_>, mother: i32, prec: usize) {
    let m = p.momentum();
    line(buf, format_args!(
        "P {} {} {} {:.p$e} {:.p$e} {:.p$e} {:.p$e} {:.p$e} {}",
        p.id(), mother, p.pid(),
        m.px(), m.py(), m.pz(), m.e(),
        p.generated_mass(),
        p.status(),
        p = prec
    ));
}
