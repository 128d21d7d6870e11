//! Run-level metadata shared by every event in a stream.

use serde::{Deserialize, Serialize};

use crate::attributes::{AttributeValue, Attributes};

/// Metadata describing one generator run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunInfo {
    /// Names of the weight streams carried by each event, in index order.
    #[serde(default)]
    pub weight_names: Vec<String>,
    /// Run-level attributes.
    #[serde(default)]
    pub attributes: Attributes,
}

impl RunInfo {
    /// Create run metadata with no weights and no attributes.
    pub const fn new() -> Self {
        Self {
            weight_names: Vec::new(),
            attributes: Attributes::new(),
        }
    }

    /// Set the weight stream names.
    #[must_use]
    pub fn with_weight_names(mut self, names: &[&str]) -> Self {
        self.weight_names = names.iter().map(|n| (*n).to_owned()).collect();
        self
    }

    /// Set a run attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name, value);
        self
    }

    /// Index of the named weight stream, if the run declares it.
    pub fn weight_index(&self, name: &str) -> Option<usize> {
        self.weight_names.iter().position(|n| n == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_index_resolves_by_name() {
        let run = RunInfo::new().with_weight_names(&["CV", "Syst+1", "Syst-1"]);
        assert_eq!(run.weight_index("CV"), Some(0));
        assert_eq!(run.weight_index("Syst-1"), Some(2));
        assert_eq!(run.weight_index("missing"), None);
    }

    #[test]
    fn with_attribute_sets_value() {
        let run = RunInfo::new().with_attribute("NuHepMC.Conventions", vec!["G.C.5"]);
        assert!(run.attributes.contains("NuHepMC.Conventions"));
    }
}
