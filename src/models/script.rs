//! Script metadata consumed by the meta tokens.

use serde::{Deserialize, Serialize};

/// Metadata about the script a roster belongs to.
///
/// Only the meta tokens look at this; character and reminder tokens are
/// independent of it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptMeta {
    /// Script title, drawn on the script-name token
    pub title: String,
    /// Author credit, drawn as a curved line under the title
    #[serde(default)]
    pub author: Option<String>,
    /// Logo asset reference; when it resolves, it replaces the title text
    #[serde(default)]
    pub logo: Option<String>,
    /// Almanac URL encoded into the QR token
    #[serde(default)]
    pub almanac: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_script() {
        let s: ScriptMeta = serde_json::from_str(r#"{"title": "Midnight Garden"}"#).unwrap();
        assert_eq!(s.title, "Midnight Garden");
        assert!(s.author.is_none() && s.logo.is_none() && s.almanac.is_none());
    }
}
