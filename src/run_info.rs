//! # Run Info
//!
//! Data shared by every event of a run: the generator tools, the weight
//! names and run-level attributes. Events hold it through an `Arc`, so one
//! `RunInfo` is typically shared by a whole file.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::attribute::{Attribute, AttributeContext, AttributeStore, AttributeType};
use crate::{Error, Result};

/// A program that produced or processed the run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
    pub description: String,
}

impl ToolInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>, description: impl Into<String>) -> Self {
        Self { name: name.into(), version: version.into(), description: description.into() }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunInfo {
    tools: Vec<ToolInfo>,
    weight_names: Vec<String>,
    weight_indices: HashMap<String, usize>,
    attributes: AttributeStore,
}

impl RunInfo {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Tools
    // ========================================================================

    pub fn tools(&self) -> &[ToolInfo] {
        &self.tools
    }

    pub fn add_tool(&mut self, tool: ToolInfo) {
        self.tools.push(tool);
    }

    // ========================================================================
    // Weights
    // ========================================================================

    pub fn weight_names(&self) -> &[String] {
        &self.weight_names
    }

    /// Replace the weight names. An empty name becomes its decimal index.
    ///
    /// Fails without touching the current names if two entries collide.
    pub fn set_weight_names(&mut self, names: Vec<String>) -> Result<()> {
        let names: Vec<String> = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| if name.is_empty() { i.to_string() } else { name })
            .collect();

        let mut indices = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if indices.insert(name.clone(), i).is_some() {
                return Err(Error::DuplicateWeightName(name.clone()));
            }
        }
        self.weight_names = names;
        self.weight_indices = indices;
        Ok(())
    }

    pub fn weight_index(&self, name: &str) -> Option<usize> {
        self.weight_indices.get(name).copied()
    }

    pub fn has_weight(&self, name: &str) -> bool {
        self.weight_indices.contains_key(name)
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    pub fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    pub fn add_attribute(&mut self, name: &str, attribute: impl Into<Attribute>) {
        self.attributes.add(name, 0, attribute.into());
    }

    pub fn remove_attribute(&mut self, name: &str) {
        self.attributes.remove(name, 0);
    }

    pub fn attribute<T: AttributeType>(&self, name: &str) -> Option<T> {
        self.attributes.get(name, 0, &AttributeContext::for_run(self))
    }

    pub fn attribute_as_string(&self, name: &str) -> Option<String> {
        self.attributes.as_string(name, 0)
    }

    pub fn attribute_names(&self) -> Vec<String> {
        self.attributes.names(0)
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    pub fn write_data(&self) -> RunInfoData {
        let (attribute_name, attribute_string) = self
            .attributes
            .snapshot()
            .into_iter()
            .map(|(name, _, att)| (name, att.to_string()))
            .unzip();
        RunInfoData {
            weight_names: self.weight_names.clone(),
            tools: self.tools.clone(),
            attribute_name,
            attribute_string,
        }
    }

    /// Rebuild from a snapshot. Attributes come back unparsed.
    pub fn from_data(data: &RunInfoData) -> Result<Self> {
        let mut run = RunInfo::new();
        run.set_weight_names(data.weight_names.clone())?;
        run.tools = data.tools.clone();
        for (name, value) in data.attribute_name.iter().zip(&data.attribute_string) {
            run.attributes.add(name, 0, Attribute::unparsed(value.as_str()));
        }
        Ok(run)
    }
}

/// Flat, serializable form of a [`RunInfo`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunInfoData {
    pub weight_names: Vec<String>,
    pub tools: Vec<ToolInfo>,
    pub attribute_name: Vec<String>,
    pub attribute_string: Vec<String>,
}
