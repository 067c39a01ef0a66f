use serde::{Deserialize, Serialize};

/// Typed edge between two inventory objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Relationship {
    pub related_to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_label: Option<String>,
    pub related_link: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationship_data: Vec<RelationshipData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_to_property: Vec<RelatedToProperty>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RelationshipData {
    pub relationship_key: String,
    pub relationship_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RelatedToProperty {
    pub property_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_value: Option<String>,
}

/// `relationship-list` wrapper as served by A&AI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipList {
    #[serde(default)]
    pub relationship: Vec<Relationship>,
}

impl Relationship {
    pub fn new(related_to: impl Into<String>, related_link: impl Into<String>) -> Self {
        Self {
            related_to: related_to.into(),
            relationship_label: None,
            related_link: related_link.into(),
            relationship_data: Vec::new(),
            related_to_property: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.relationship_label = Some(label.into());
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.relationship_data.push(RelationshipData {
            relationship_key: key.into(),
            relationship_value: value.into(),
        });
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.related_to_property.push(RelatedToProperty {
            property_key: key.into(),
            property_value: Some(value.into()),
        });
        self
    }

    /// Value of the `relationship-data` entry keyed `key`.
    pub fn data(&self, key: &str) -> Option<&str> {
        self.relationship_data
            .iter()
            .find(|data| data.relationship_key == key)
            .map(|data| data.relationship_value.as_str())
    }
}
