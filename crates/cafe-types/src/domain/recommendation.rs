use serde::{Deserialize, Serialize};

use crate::domain::menu::MenuItem;

/// A mood-based suggestion resolved against the live catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recommendation {
    /// Name as returned by the model, which may not match `item.name`.
    pub name: String,
    pub reason: String,
    pub tip: String,
    pub item: MenuItem,
    /// False when the model's name matched nothing and `item` is the
    /// catalog's first entry.
    pub exact_match: bool,
}
