use serde::{Deserialize, Serialize};

/// Full catalog document as served by `GET /catalogs/{identifier}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub id: String,
    pub identifier: String,
    pub name: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// A menu section; sections nest through `sub_sections`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub identifier: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub sub_sections: Vec<Section>,
    #[serde(default)]
    pub items: Vec<Item>,
}

/// A purchasable item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub sku: String,
    pub name: String,
    /// Decimal string, e.g. "12.50"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub options: Vec<ItemOption>,
}

/// An option attached to an item, priced on its own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemOption {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
    #[serde(default = "default_active")]
    pub active: bool,
}

/// Lightweight listing entry from `GET /catalogs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogMetadata {
    #[serde(default)]
    pub id: String,
    pub identifier: String,
    pub name: String,
}

fn default_active() -> bool {
    true
}

impl CatalogDocument {
    /// Number of sections at every depth
    pub fn section_count(&self) -> usize {
        fn count(sections: &[Section]) -> usize {
            sections
                .iter()
                .map(|s| 1 + count(&s.sub_sections))
                .sum()
        }
        count(&self.sections)
    }

    /// Number of items at every depth
    pub fn item_count(&self) -> usize {
        fn count(sections: &[Section]) -> usize {
            sections
                .iter()
                .map(|s| s.items.len() + count(&s.sub_sections))
                .sum()
        }
        count(&self.sections)
    }

    pub fn metadata(&self) -> CatalogMetadata {
        CatalogMetadata {
            id: self.id.clone(),
            identifier: self.identifier.clone(),
            name: self.name.clone(),
        }
    }
}
