//! Named visibility layer selection.

use crate::ids::LayerId;

/// Ordered, de-duplicated set of layer names a camera is restricted to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerSelection {
    names: Vec<String>,
}

/// Outcome of resolving a [`LayerSelection`] against a layer registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedLayers {
    /// Ids of the layers that exist, in selection order.
    pub ids: Vec<LayerId>,
    /// Names that the registry did not know.
    pub missing: Vec<String>,
}

impl ResolvedLayers {
    /// Returns true if every configured name resolved.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

impl LayerSelection {
    /// Parses a comma-separated list such as `"World, Skybox"`.
    ///
    /// Whitespace around names is trimmed, empty entries are skipped and
    /// repeated names keep their first position.
    pub fn parse(list: &str) -> Self {
        let mut names: Vec<String> = Vec::new();
        for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            if !names.iter().any(|existing| existing == name) {
                names.push(name.to_string());
            }
        }
        Self { names }
    }

    /// Returns the layer names in order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns true if no names were configured.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the number of configured names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if the selection contains `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Looks every name up with `lookup`, splitting hits from misses.
    pub fn resolve(&self, lookup: impl Fn(&str) -> Option<LayerId>) -> ResolvedLayers {
        let mut resolved = ResolvedLayers::default();
        for name in &self.names {
            match lookup(name) {
                Some(id) => resolved.ids.push(id),
                None => resolved.missing.push(name.clone()),
            }
        }
        resolved
    }
}

impl std::fmt::Display for LayerSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.names.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_and_skips_empty() {
        let selection = LayerSelection::parse(" World , ,Skybox,");
        assert_eq!(selection.names(), ["World", "Skybox"]);
    }

    #[test]
    fn test_parse_deduplicates_keeping_first() {
        let selection = LayerSelection::parse("Skybox,World,Skybox");
        assert_eq!(selection.names(), ["Skybox", "World"]);
        assert_eq!(selection.to_string(), "Skybox,World");
    }

    #[test]
    fn test_parse_empty_string() {
        let selection = LayerSelection::parse("");
        assert!(selection.is_empty());
    }

    #[test]
    fn test_resolve_reports_missing() {
        let selection = LayerSelection::parse("World,Water,Skybox");
        let resolved = selection.resolve(|name| match name {
            "World" => Some(LayerId(1)),
            "Skybox" => Some(LayerId(4)),
            _ => None,
        });
        assert_eq!(resolved.ids, vec![LayerId(1), LayerId(4)]);
        assert_eq!(resolved.missing, vec!["Water".to_string()]);
        assert!(!resolved.is_complete());
    }
}
