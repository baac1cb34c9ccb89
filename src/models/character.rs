//! Character roster types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A character's faction category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    /// Good-aligned core team
    Townsfolk,
    /// Good-aligned but hindered
    Outsider,
    /// Evil-aligned supporting team
    Minion,
    /// Evil-aligned core team
    Demon,
    /// Joins and leaves mid-game
    Traveller,
    /// Storyteller-controlled
    Fabled,
    /// Script-lore characters
    Loric,
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Team::Townsfolk => "townsfolk",
            Team::Outsider => "outsider",
            Team::Minion => "minion",
            Team::Demon => "demon",
            Team::Traveller => "traveller",
            Team::Fabled => "fabled",
            Team::Loric => "loric",
        };
        write!(f, "{}", s)
    }
}

/// Portrait reference: a single image or an ordered list of variants.
///
/// Deserializes from either a plain string or an array of strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortraitRef {
    /// One portrait image
    Single(String),
    /// Ordered variant portraits; one character token is rendered per entry
    Variants(Vec<String>),
}

impl Default for PortraitRef {
    fn default() -> Self {
        PortraitRef::Single(String::new())
    }
}

impl PortraitRef {
    /// All referenced images in variant order (at least one entry for
    /// `Single`, possibly empty string).
    pub fn all(&self) -> Vec<&str> {
        match self {
            PortraitRef::Single(s) => vec![s.as_str()],
            PortraitRef::Variants(v) => v.iter().map(|s| s.as_str()).collect(),
        }
    }

    /// The primary (first) portrait reference.
    pub fn primary(&self) -> &str {
        match self {
            PortraitRef::Single(s) => s,
            PortraitRef::Variants(v) => v.first().map(|s| s.as_str()).unwrap_or(""),
        }
    }
}

/// One character record, owned by the surrounding application.
///
/// The rendering core treats this as read-only input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    /// Stable slug identifier (e.g. "librarian")
    pub id: String,
    /// Display name drawn on the token
    pub name: String,
    /// Faction category
    pub team: Team,
    /// Ability text, drawn when present and enabled
    #[serde(default)]
    pub ability: Option<String>,
    /// Portrait image reference(s)
    #[serde(default)]
    pub portrait: PortraitRef,
    /// Reminder texts, one reminder token rendered per entry
    #[serde(default)]
    pub reminders: Vec<String>,
    /// Whether the character alters game setup
    #[serde(default)]
    pub setup: bool,
    /// Whether the record came from official reference data, when known
    #[serde(default)]
    pub official: Option<bool>,
    /// Stable unique id, generated when the input omits one
    #[serde(default = "Uuid::new_v4")]
    pub uuid: Uuid,
}
