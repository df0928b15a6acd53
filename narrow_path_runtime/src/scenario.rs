//! Scenario catalog and deck.
//!
//! Scenarios are authored as JSON with fractional impacts
//! (`"doom": -0.05` is minus five points) and converted to fixed-point
//! on load. The engine never sees scenario identity; the deck decides
//! what is shown next.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use narrow_path_engine::domain::Impact;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse scenario catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("scenario catalog is empty")]
    Empty,
    #[error("duplicate scenario id {0:?}")]
    DuplicateScenario(String),
    #[error("scenario {0:?} has no choices")]
    NoChoices(String),
    #[error("scenario {scenario:?} has duplicate choice id {choice:?}")]
    DuplicateChoice { scenario: String, choice: String },
    #[error("scenario {scenario:?} has no choice {choice:?}")]
    UnknownChoice { scenario: String, choice: String },
}

/// Impact as authored: fractional deltas per axis.
mod fractional_impact {
    use narrow_path_engine::arithmetic::fraction_from_units;
    use narrow_path_engine::domain::Impact;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Fractions {
        #[serde(default)]
        doom: f64,
        #[serde(default)]
        dystopia: f64,
        #[serde(default)]
        path: f64,
    }

    pub fn serialize<S>(impact: &Impact, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Fractions {
            doom: fraction_from_units(impact.doom_delta),
            dystopia: fraction_from_units(impact.dystopia_delta),
            path: fraction_from_units(impact.path_delta),
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Impact, D::Error>
    where
        D: Deserializer<'de>,
    {
        let f = Fractions::deserialize(deserializer)?;
        Ok(Impact::from_fractions(f.doom, f.dystopia, f.path))
    }
}

/// One selectable answer to a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Choice {
    pub id: String,
    pub text: String,
    #[serde(with = "fractional_impact")]
    pub impact: Impact,
    /// One-line summary of the trade-off.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub id: String,
    pub title: String,
    pub description: String,
    pub choices: Vec<Choice>,
}

impl Scenario {
    pub fn choice(&self, choice_id: &str) -> Result<&Choice, ScenarioError> {
        self.choices
            .iter()
            .find(|c| c.id == choice_id)
            .ok_or_else(|| ScenarioError::UnknownChoice {
                scenario: self.id.clone(),
                choice: choice_id.to_string(),
            })
    }
}

/// Validated, ordered list of scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioCatalog {
    scenarios: Vec<Scenario>,
}

impl ScenarioCatalog {
    pub fn new(scenarios: Vec<Scenario>) -> Result<Self, ScenarioError> {
        if scenarios.is_empty() {
            return Err(ScenarioError::Empty);
        }
        let mut seen = BTreeSet::new();
        for scenario in &scenarios {
            if !seen.insert(scenario.id.as_str()) {
                return Err(ScenarioError::DuplicateScenario(scenario.id.clone()));
            }
            if scenario.choices.is_empty() {
                return Err(ScenarioError::NoChoices(scenario.id.clone()));
            }
            let mut choice_ids = BTreeSet::new();
            for choice in &scenario.choices {
                if !choice_ids.insert(choice.id.as_str()) {
                    return Err(ScenarioError::DuplicateChoice {
                        scenario: scenario.id.clone(),
                        choice: choice.id.clone(),
                    });
                }
            }
        }
        Ok(Self { scenarios })
    }

    pub fn from_json_str(json: &str) -> Result<Self, ScenarioError> {
        let scenarios: Vec<Scenario> = serde_json::from_str(json)?;
        Self::new(scenarios)
    }

    pub fn from_path(path: &Path) -> Result<Self, ScenarioError> {
        let json = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json_str(&json)?;
        tracing::info!(path = %path.display(), scenarios = catalog.len(), "loaded scenario catalog");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }
}

/// Cursor over a catalog, in authored order.
#[derive(Debug, Clone)]
pub struct ScenarioDeck {
    catalog: ScenarioCatalog,
    position: usize,
}

impl ScenarioDeck {
    pub fn new(catalog: ScenarioCatalog) -> Self {
        Self {
            catalog,
            position: 0,
        }
    }

    /// The scenario being shown, or `None` once every one was answered.
    pub fn current(&self) -> Option<&Scenario> {
        self.catalog.scenarios.get(self.position)
    }

    /// Move to the next scenario. No-op once exhausted.
    pub fn advance(&mut self) {
        if self.position < self.catalog.len() {
            self.position += 1;
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.catalog.len()
    }

    /// Number of scenarios already answered.
    pub fn answered(&self) -> usize {
        self.position
    }

    pub fn rewind(&mut self) {
        self.position = 0;
    }

    pub fn catalog(&self) -> &ScenarioCatalog {
        &self.catalog
    }
}
