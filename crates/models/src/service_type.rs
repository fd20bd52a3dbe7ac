use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Provenance tag assigned to entries created locally (manual add or CSV
/// import); entries harvested from the topology feed carry their own tags.
pub const SOURCE_TAG: &str = "poem";

/// One entry of the service-type catalog as returned by the Web API.
/// - `name` is the unique key within a catalog snapshot
/// - `tags` are server-assigned provenance labels and never written back
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceTypeEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Write model submitted on collection replace: tags are omitted because the
/// Web API treats them as server-side provenance.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogWriteEntry {
    pub name: String,
    pub title: String,
    pub description: String,
}

impl ServiceTypeEntry {
    /// Entry created locally, tagged with the catalog source tag.
    pub fn local(name: &str, title: Option<&str>, description: &str) -> Self {
        Self {
            name: name.to_string(),
            title: title.map(str::to_string),
            description: description.to_string(),
            tags: vec![SOURCE_TAG.to_string()],
        }
    }

    /// True when a non-key field differs from `other` for the same name.
    pub fn differs_from(&self, other: &Self) -> bool {
        self.title != other.title || self.description != other.description
    }
}

impl From<&ServiceTypeEntry> for CatalogWriteEntry {
    fn from(e: &ServiceTypeEntry) -> Self {
        Self {
            name: e.name.clone(),
            title: e.title.clone().unwrap_or_default(),
            description: e.description.clone(),
        }
    }
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("name must not be empty".into()));
    }
    if name != name.trim() {
        return Err(ModelError::Validation(
            "name must not have leading or trailing whitespace".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_entry_carries_source_tag() {
        let e = ServiceTypeEntry::local("org.nagios.WebCheck", Some("Web check"), "HTTP probe");
        assert_eq!(e.tags, vec![SOURCE_TAG.to_string()]);
        assert_eq!(e.title.as_deref(), Some("Web check"));
    }

    #[test]
    fn differs_ignores_tags() {
        let a = ServiceTypeEntry {
            name: "x".into(),
            title: None,
            description: "d".into(),
            tags: vec!["topology".into()],
        };
        let mut b = a.clone();
        b.tags = vec![SOURCE_TAG.into()];
        assert!(!a.differs_from(&b));
        b.description = "changed".into();
        assert!(a.differs_from(&b));
    }

    #[test]
    fn write_entry_flattens_missing_title() {
        let e = ServiceTypeEntry { name: "x".into(), title: None, description: "d".into(), tags: vec![] };
        let w = CatalogWriteEntry::from(&e);
        assert_eq!(w.title, "");
        assert_eq!(w.name, "x");
    }

    #[test]
    fn name_validation() {
        assert!(validate_name("argo.mon").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("  padded ").is_err());
    }

    #[test]
    fn entry_deserializes_without_optional_fields() {
        let e: ServiceTypeEntry = serde_json::from_str(r#"{"name":"a"}"#).expect("parse");
        assert_eq!(e.name, "a");
        assert!(e.title.is_none());
        assert!(e.tags.is_empty());
    }
}
