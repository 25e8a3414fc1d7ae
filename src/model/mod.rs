//! # Value Types
//!
//! Plain data carried by particles and vertices, plus the handles that
//! address them inside an [`Event`](crate::Event).
//!
//! Design rule: nothing here knows about the event graph or about files.

pub mod four_vector;
pub mod particle;
pub mod units;
pub mod vertex;

pub use four_vector::FourVector;
pub use particle::{ParticleData, ParticleRef};
pub use units::{LengthUnit, MomentumUnit, convert_length, convert_momentum};
pub use vertex::{VertexData, VertexRef};
