use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ports::remote_store::Document;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    #[serde(rename = "Hot Coffee")]
    HotCoffee,
    #[serde(rename = "Cold Coffee")]
    ColdCoffee,
    Tea,
    Pastries,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::HotCoffee,
        Category::ColdCoffee,
        Category::Tea,
        Category::Pastries,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::HotCoffee => "Hot Coffee",
            Category::ColdCoffee => "Cold Coffee",
            Category::Tea => "Tea",
            Category::Pastries => "Pastries",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("unknown category: {s}"))
    }
}

/// A purchasable catalog entry. Immutable for the lifetime of a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub category: Category,
    pub image: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl MenuItem {
    /// Converts a remote document into a menu item. The document id always
    /// wins over any `id` field embedded in the payload.
    pub fn from_document(doc: Document) -> anyhow::Result<Self> {
        let mut fields = match doc.fields {
            serde_json::Value::Object(map) => map,
            other => anyhow::bail!("document {} is not an object: {other}", doc.id),
        };
        fields.insert("id".into(), serde_json::Value::String(doc.id));
        let item: MenuItem = serde_json::from_value(serde_json::Value::Object(fields))?;
        if item.price_cents < 0 {
            anyhow::bail!("item {} has negative price", item.id);
        }
        Ok(item)
    }

    pub fn to_document(&self) -> anyhow::Result<Document> {
        Ok(Document {
            id: self.id.clone(),
            fields: serde_json::to_value(self)?,
        })
    }
}
