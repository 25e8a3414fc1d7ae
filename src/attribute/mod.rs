//! # Attributes
//!
//! Named values attached to the event, to a vertex or to a particle.
//!
//! An [`Attribute`] is either still the raw string read from a file
//! ([`Attribute::Unparsed`]) or a materialized typed value. Typed access goes
//! through [`AttributeType`]: the first `attribute::<T>()` request on an
//! unparsed entry runs [`AttributeType::from_string`] followed by
//! [`AttributeType::init`], and the store keeps the typed result.
//!
//! ```rust
//! use hepmc_rs::{Attribute, Event};
//!
//! let mut evt = Event::new();
//! evt.add_attribute("alphaQCD", Attribute::unparsed("0.118"), 0);
//! assert_eq!(evt.attribute::<f64>("alphaQCD", 0), Some(0.118));
//! assert!(evt.attributes().get_attribute("alphaQCD", 0).unwrap().is_parsed());
//! ```

pub mod store;
mod cross_section;
mod heavy_ion;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::event::{Event, Particle, Vertex};
use crate::run_info::RunInfo;

pub use cross_section::CrossSection;
pub use heavy_ion::HeavyIon;
pub use store::AttributeStore;

// ============================================================================
// Attribute value
// ============================================================================

/// Type-erased attribute value.
#[derive(Debug, Clone)]
pub enum Attribute {
    /// Raw string, not yet interpreted.
    Unparsed(String),

    Int(i32),
    Long(i64),
    UInt(u32),
    ULong(u64),
    Float(f32),
    Double(f64),
    Bool(bool),
    String(String),

    IntVector(Vec<i32>),
    LongVector(Vec<i64>),
    FloatVector(Vec<f32>),
    DoubleVector(Vec<f64>),
    StringVector(Vec<String>),

    CrossSection(CrossSection),
    HeavyIon(HeavyIon),

    /// User-defined kind.
    Custom(Arc<dyn CustomAttribute>),
}

/// A user-defined attribute kind stored as [`Attribute::Custom`].
pub trait CustomAttribute: Any + fmt::Debug + Send + Sync {
    /// Canonical string form, read back by the matching `from_string`.
    fn to_attribute_string(&self) -> String;
}

impl Attribute {
    pub fn unparsed(raw: impl Into<String>) -> Self {
        Attribute::Unparsed(raw.into())
    }

    pub fn custom<T: CustomAttribute>(value: T) -> Self {
        Attribute::Custom(Arc::new(value))
    }

    pub fn is_parsed(&self) -> bool {
        !matches!(self, Attribute::Unparsed(_))
    }

    /// The raw string of an unparsed attribute.
    pub fn unparsed_string(&self) -> Option<&str> {
        match self {
            Attribute::Unparsed(s) => Some(s),
            _ => None,
        }
    }

    pub fn downcast_custom<T: CustomAttribute>(&self) -> Option<&T> {
        match self {
            Attribute::Custom(c) => {
                let any: &dyn Any = c.as_ref();
                any.downcast_ref::<T>()
            }
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Attribute::Unparsed(_) => "UNPARSED",
            Attribute::Int(_) => "INT",
            Attribute::Long(_) => "LONG",
            Attribute::UInt(_) => "UINT",
            Attribute::ULong(_) => "ULONG",
            Attribute::Float(_) => "FLOAT",
            Attribute::Double(_) => "DOUBLE",
            Attribute::Bool(_) => "BOOL",
            Attribute::String(_) => "STRING",
            Attribute::IntVector(_) => "INT_VECTOR",
            Attribute::LongVector(_) => "LONG_VECTOR",
            Attribute::FloatVector(_) => "FLOAT_VECTOR",
            Attribute::DoubleVector(_) => "DOUBLE_VECTOR",
            Attribute::StringVector(_) => "STRING_VECTOR",
            Attribute::CrossSection(_) => "CROSS_SECTION",
            Attribute::HeavyIon(_) => "HEAVY_ION",
            Attribute::Custom(_) => "CUSTOM",
        }
    }
}

/// Canonical string form, as written to file.
impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Unparsed(s) | Attribute::String(s) => f.write_str(s),
            Attribute::Int(v) => write!(f, "{v}"),
            Attribute::Long(v) => write!(f, "{v}"),
            Attribute::UInt(v) => write!(f, "{v}"),
            Attribute::ULong(v) => write!(f, "{v}"),
            Attribute::Float(v) => write!(f, "{v}"),
            Attribute::Double(v) => f.write_str(&format_double(*v)),
            Attribute::Bool(v) => f.write_str(if *v { "1" } else { "0" }),
            Attribute::IntVector(v) => write_joined(f, v.iter()),
            Attribute::LongVector(v) => write_joined(f, v.iter()),
            Attribute::FloatVector(v) => write_joined(f, v.iter()),
            Attribute::DoubleVector(v) => write_joined(f, v.iter().map(|d| format_double(*d))),
            Attribute::StringVector(v) => write_joined(f, v.iter()),
            Attribute::CrossSection(cs) => f.write_str(&cs.to_attribute_string()),
            Attribute::HeavyIon(hi) => f.write_str(&hi.to_attribute_string()),
            Attribute::Custom(c) => f.write_str(&c.to_attribute_string()),
        }
    }
}

/// Same kind and same canonical string. Custom values compare by string.
impl PartialEq for Attribute {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.to_string() == other.to_string()
    }
}

fn write_joined<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = T>,
) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 { f.write_str(" ")?; }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Shortest round-trip form; exponent notation for very large or small values.
pub(crate) fn format_double(v: f64) -> String {
    let a = v.abs();
    if a != 0.0 && a.is_finite() && !(1e-5..1e16).contains(&a) {
        format!("{v:e}")
    } else {
        format!("{v}")
    }
}

// ============================================================================
// Context handed to init()
// ============================================================================

/// What an attribute knows about its owner while it is being materialized.
///
/// `owner` follows the store convention: 0 is the event, positive ids are
/// particles, negative ids are vertices.
#[derive(Clone, Copy)]
pub struct AttributeContext<'a> {
    event: Option<&'a Event>,
    run_info: Option<&'a RunInfo>,
    owner: i32,
}

impl<'a> AttributeContext<'a> {
    pub(crate) fn for_event(event: &'a Event, owner: i32) -> Self {
        Self { event: Some(event), run_info: event.run_info().map(|r| r.as_ref()), owner }
    }

    pub(crate) fn for_run(run_info: &'a RunInfo) -> Self {
        Self { event: None, run_info: Some(run_info), owner: 0 }
    }

    /// A context with no owner at all.
    pub fn detached() -> Self {
        Self { event: None, run_info: None, owner: 0 }
    }

    pub fn event(&self) -> Option<&'a Event> {
        self.event
    }

    pub fn run_info(&self) -> Option<&'a RunInfo> {
        self.run_info
    }

    pub fn owner(&self) -> i32 {
        self.owner
    }

    pub fn particle(&self) -> Option<Particle<'a>> {
        if self.owner > 0 { self.event?.particle_by_id(self.owner) } else { None }
    }

    pub fn vertex(&self) -> Option<Vertex<'a>> {
        if self.owner < 0 { self.event?.vertex_by_id(self.owner) } else { None }
    }
}

// ============================================================================
// Typed access
// ============================================================================

/// A Rust type that can be stored in and materialized from an [`Attribute`].
pub trait AttributeType: Sized + Clone + Send + Sync + 'static {
    /// Parse the canonical string form.
    fn from_string(s: &str) -> Option<Self>;

    /// Second materialization step, with access to the owner.
    fn init(&mut self, _ctx: &AttributeContext<'_>) -> bool {
        true
    }

    /// Extract from an already materialized attribute of the matching kind.
    fn from_attribute(attribute: &Attribute) -> Option<Self>;

    fn into_attribute(self) -> Attribute;
}

fn first_token(s: &str) -> Option<&str> {
    s.split_whitespace().next()
}

fn parse_list<T: std::str::FromStr>(s: &str) -> Option<Vec<T>> {
    s.split_whitespace().map(|tok| tok.parse().ok()).collect()
}

macro_rules! scalar_attribute {
    ($ty:ty, $variant:ident) => {
        impl AttributeType for $ty {
            fn from_string(s: &str) -> Option<Self> {
                first_token(s)?.parse().ok()
            }

            fn from_attribute(attribute: &Attribute) -> Option<Self> {
                match attribute {
                    Attribute::$variant(v) => Some(*v),
                    _ => None,
                }
            }

            fn into_attribute(self) -> Attribute {
                Attribute::$variant(self)
            }
        }

        impl From<$ty> for Attribute {
            fn from(v: $ty) -> Self {
                Attribute::$variant(v)
            }
        }
    };
}

macro_rules! vector_attribute {
    ($ty:ty, $variant:ident) => {
        impl AttributeType for Vec<$ty> {
            fn from_string(s: &str) -> Option<Self> {
                parse_list(s)
            }

            fn from_attribute(attribute: &Attribute) -> Option<Self> {
                match attribute {
                    Attribute::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }

            fn into_attribute(self) -> Attribute {
                Attribute::$variant(self)
            }
        }

        impl From<Vec<$ty>> for Attribute {
            fn from(v: Vec<$ty>) -> Self {
                Attribute::$variant(v)
            }
        }
    };
}

scalar_attribute!(i32, Int);
scalar_attribute!(i64, Long);
scalar_attribute!(u32, UInt);
scalar_attribute!(u64, ULong);
scalar_attribute!(f32, Float);
scalar_attribute!(f64, Double);

vector_attribute!(i32, IntVector);
vector_attribute!(i64, LongVector);
vector_attribute!(f32, FloatVector);
vector_attribute!(f64, DoubleVector);
vector_attribute!(String, StringVector);

/// Only the literal strings `1` and `0` are accepted.
impl AttributeType for bool {
    fn from_string(s: &str) -> Option<Self> {
        match s.trim() {
            "1" => Some(true),
            "0" => Some(false),
            _ => None,
        }
    }

    fn from_attribute(attribute: &Attribute) -> Option<Self> {
        match attribute {
            Attribute::Bool(v) => Some(*v),
            _ => None,
        }
    }

    fn into_attribute(self) -> Attribute {
        Attribute::Bool(self)
    }
}

impl From<bool> for Attribute {
    fn from(v: bool) -> Self { Attribute::Bool(v) }
}

/// Any attribute read back as its canonical string.
impl AttributeType for String {
    fn from_string(s: &str) -> Option<Self> {
        Some(s.to_owned())
    }

    fn from_attribute(attribute: &Attribute) -> Option<Self> {
        match attribute {
            Attribute::String(s) | Attribute::Unparsed(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn into_attribute(self) -> Attribute {
        Attribute::String(self)
    }
}

impl From<String> for Attribute {
    fn from(v: String) -> Self { Attribute::String(v) }
}

impl From<&str> for Attribute {
    fn from(v: &str) -> Self { Attribute::String(v.to_owned()) }
}

impl From<CrossSection> for Attribute {
    fn from(v: CrossSection) -> Self { Attribute::CrossSection(v) }
}

impl From<HeavyIon> for Attribute {
    fn from(v: HeavyIon) -> Self { Attribute::HeavyIon(v) }
}
