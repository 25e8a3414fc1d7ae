//! Cross section with one entry per event weight.
//!
//! String form: `xs err n_acc n_att [xs_1 err_1 ...]`, written with eight
//! significant digits in exponent notation.

use serde::{Deserialize, Serialize};

use super::{Attribute, AttributeContext, AttributeType};
use crate::config::cfg_warn;
use crate::run_info::RunInfo;

/// Upper bound on parsed per-weight entries.
const MAX_ENTRIES: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossSection {
    /// Accepted events, -1 when unknown.
    pub accepted_events: i64,
    /// Attempted events, -1 when unknown.
    pub attempted_events: i64,
    cross_sections: Vec<f64>,
    cross_section_errors: Vec<f64>,
}

impl Default for CrossSection {
    fn default() -> Self {
        Self::new(0.0, 0.0, -1, -1)
    }
}

impl CrossSection {
    /// Single-weight cross section.
    pub fn new(xs: f64, err: f64, accepted: i64, attempted: i64) -> Self {
        Self {
            accepted_events: accepted,
            attempted_events: attempted,
            cross_sections: vec![xs],
            cross_section_errors: vec![err],
        }
    }

    /// Same value for each of `n_weights` weights (at least one).
    pub fn set_cross_section(&mut self, xs: f64, err: f64, accepted: i64, attempted: i64, n_weights: usize) {
        let n = n_weights.max(1);
        self.accepted_events = accepted;
        self.attempted_events = attempted;
        self.cross_sections = vec![xs; n];
        self.cross_section_errors = vec![err; n];
    }

    pub fn cross_sections(&self) -> &[f64] {
        &self.cross_sections
    }

    pub fn cross_section_errors(&self) -> &[f64] {
        &self.cross_section_errors
    }

    pub fn xsec(&self, index: usize) -> Option<f64> {
        self.cross_sections.get(index).copied()
    }

    pub fn xsec_err(&self, index: usize) -> Option<f64> {
        self.cross_section_errors.get(index).copied()
    }

    /// Entry for the weight called `name` in `run_info`.
    pub fn xsec_named(&self, name: &str, run_info: &RunInfo) -> Option<f64> {
        self.xsec(run_info.weight_index(name)?)
    }

    pub fn xsec_err_named(&self, name: &str, run_info: &RunInfo) -> Option<f64> {
        self.xsec_err(run_info.weight_index(name)?)
    }

    /// Returns false when `index` is out of range.
    pub fn set_xsec(&mut self, index: usize, xs: f64, err: f64) -> bool {
        match (self.cross_sections.get_mut(index), self.cross_section_errors.get_mut(index)) {
            (Some(x), Some(e)) => {
                *x = xs;
                *e = err;
                true
            }
            _ => false,
        }
    }

    /// Non-empty, consistent, and with a non-zero first value or error.
    pub fn is_valid(&self) -> bool {
        match (self.cross_sections.first(), self.cross_section_errors.first()) {
            (Some(&xs), Some(&err)) => {
                self.cross_sections.len() == self.cross_section_errors.len()
                    && (xs != 0.0 || err != 0.0)
            }
            _ => false,
        }
    }

    /// Repeat the first entry until there are `n` of them.
    fn pad_to(&mut self, n: usize) {
        let (Some(&xs), Some(&err)) = (self.cross_sections.first(), self.cross_section_errors.first())
        else {
            return;
        };
        while self.cross_sections.len() < n {
            self.cross_sections.push(xs);
        }
        while self.cross_section_errors.len() < n {
            self.cross_section_errors.push(err);
        }
    }

    pub fn to_attribute_string(&self) -> String {
        let mut out = format!(
            "{:.8e} {:.8e} {} {}",
            self.cross_sections.first().copied().unwrap_or(0.0),
            self.cross_section_errors.first().copied().unwrap_or(0.0),
            self.accepted_events,
            self.attempted_events,
        );
        for (xs, err) in self.cross_sections.iter().zip(&self.cross_section_errors).skip(1) {
            out.push_str(&format!(" {xs:.8e} {err:.8e}"));
        }
        out
    }
}

impl AttributeType for CrossSection {
    fn from_string(s: &str) -> Option<Self> {
        let mut tokens = s.split_whitespace();
        let xs: f64 = tokens.next()?.parse().ok()?;
        let err: f64 = tokens.next()?.parse().ok()?;
        let accepted = tokens.next().and_then(|t| t.parse().ok()).unwrap_or(-1);
        let attempted = tokens.next().and_then(|t| t.parse().ok()).unwrap_or(-1);
        let mut cs = CrossSection::new(xs, err, accepted, attempted);

        let rest: Vec<f64> = tokens.map_while(|t| t.parse().ok()).collect();
        // One entry past the bound is kept so `init` can tell it was hit.
        for pair in rest.chunks_exact(2).take(MAX_ENTRIES) {
            cs.cross_sections.push(pair[0]);
            cs.cross_section_errors.push(pair[1]);
        }
        Some(cs)
    }

    /// At most `MAX_ENTRIES` entries, then one per event weight.
    fn init(&mut self, ctx: &AttributeContext<'_>) -> bool {
        if self.cross_sections.len() > MAX_ENTRIES {
            if let Some(evt) = ctx.event() {
                cfg_warn!(evt.config(), limit = MAX_ENTRIES, "too many optional cross sections, truncating");
            }
            self.cross_sections.truncate(MAX_ENTRIES);
            self.cross_section_errors.truncate(MAX_ENTRIES);
        }
        if let Some(evt) = ctx.event() {
            self.pad_to(evt.weights().len());
        }
        true
    }

    fn from_attribute(attribute: &Attribute) -> Option<Self> {
        match attribute {
            Attribute::CrossSection(cs) => Some(cs.clone()),
            _ => None,
        }
    }

    fn into_attribute(self) -> Attribute {
        Attribute::CrossSection(self)
    }
}
