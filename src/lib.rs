//! # hepmc-rs: Event Records for High-Energy Physics
//!
//! An in-memory event record (particles, vertices, attributes) and a
//! streaming reader and writer for the `Asciiv3` text format.
//!
//! ## Design Principles
//!
//! 1. **Arena-owned graph**: an [`Event`] owns every particle and vertex;
//!    users hold copyable handles and borrowed views
//! 2. **Dense ids**: particles are `1..=N`, vertices `-1..=-M`, renumbered on
//!    removal together with their attributes
//! 3. **Lazy attributes**: values read from file stay strings until the first
//!    typed request
//! 4. **Record-local failure**: a malformed record fails alone and leaves an
//!    empty event behind
//!
//! ## Quick Start
//!
//! ```rust
//! use hepmc_rs::{AsciiReader, AsciiWriter, Event, FourVector, ParticleData, VertexData};
//!
//! # fn example() -> hepmc_rs::Result<()> {
//! let mut evt = Event::new();
//! let beam = evt.create_particle(ParticleData::new(FourVector::new(0.0, 0.0, 7000.0, 7000.0), 2212, 4));
//! let jet = evt.create_particle(ParticleData::new(FourVector::new(10.0, 0.0, 50.0, 51.0), 21, 1));
//! let v = evt.create_vertex(VertexData::default());
//! evt.add_particle_in(v, beam);
//! evt.add_particle_out(v, jet);
//! evt.add_vertex(v);
//!
//! let mut writer = AsciiWriter::new(Vec::new());
//! writer.write_event(&evt)?;
//! let bytes = writer.into_inner()?;
//!
//! let mut reader = AsciiReader::new(bytes.as_slice());
//! let mut back = Event::new();
//! assert!(reader.read_event(&mut back)?);
//! assert_eq!(back.particle_count(), 2);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod attribute;
pub mod config;
pub mod event;
pub mod io;
pub mod model;
pub mod run_info;

// ============================================================================
// Re-exports
// ============================================================================

pub use attribute::{
    Attribute, AttributeContext, AttributeStore, AttributeType,
    CrossSection, CustomAttribute, HeavyIon,
};
pub use config::Config;
pub use event::{Event, EventData, Particle, Vertex};
pub use io::{AsciiReader, AsciiWriter, Events, Reader, Writer};
pub use model::{
    FourVector, LengthUnit, MomentumUnit,
    ParticleData, ParticleRef, VertexData, VertexRef,
};
pub use run_info::{RunInfo, RunInfoData, ToolInfo};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Inconsistent record: {0}")]
    Inconsistent(String),

    #[error("Invalid transformation: {0}")]
    InvalidTransform(String),

    #[error("Duplicate weight name: {0}")]
    DuplicateWeightName(String),

    #[error("Unknown weight name: {0}")]
    UnknownWeight(String),

    #[error("Weight count mismatch: expected {expected}, got {got}")]
    WeightCountMismatch { expected: usize, got: usize },

    #[error("Writer already closed")]
    Closed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
