//! Card metadata used to enrich scoring.

use serde::{Deserialize, Serialize};

use super::CardKey;

/// Optional per-card enrichment supplied by the metadata collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemMetadata {
    pub name: String,

    /// Explicit land flag; authoritative when present
    #[serde(default)]
    pub is_land: Option<bool>,

    /// Type line, e.g. "Basic Land — Island"
    #[serde(default)]
    pub type_line: Option<String>,

    /// Card colors; authoritative when present
    #[serde(default)]
    pub colors: Option<Vec<String>>,

    /// Color identity; used only when `colors` is absent
    #[serde(default)]
    pub color_identity: Option<Vec<String>>,
}

impl ItemMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_land(mut self, is_land: bool) -> Self {
        self.is_land = Some(is_land);
        self
    }

    pub fn with_type_line(mut self, type_line: impl Into<String>) -> Self {
        self.type_line = Some(type_line.into());
        self
    }

    pub fn key(&self) -> CardKey {
        CardKey::new(&self.name)
    }

    /// Land flag, then type line, then non-land.
    pub fn resolved_is_land(&self) -> bool {
        if let Some(flag) = self.is_land {
            return flag;
        }
        self.type_line
            .as_deref()
            .map(|t| t.split_whitespace().any(|w| w.eq_ignore_ascii_case("land")))
            .unwrap_or(false)
    }

    /// Colors, then color identity, then colorless.
    pub fn resolved_colors(&self) -> &[String] {
        self.colors
            .as_deref()
            .or(self.color_identity.as_deref())
            .unwrap_or(&[])
    }
}
