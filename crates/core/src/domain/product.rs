use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

/// A catalog entry as stored in the product fixture.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: f64,
    pub tags: Vec<String>,
    pub sizes: Vec<String>,
    pub color: String,
}

impl Product {
    /// Lowercased text that free-text search tokens are matched against.
    pub fn search_haystack(&self) -> String {
        format!("{} {} {}", self.title, self.tags.join(" "), self.color).to_lowercase()
    }

    pub fn has_tags<'a>(&self, required: impl IntoIterator<Item = &'a String>) -> bool {
        required.into_iter().all(|tag| self.tags.iter().any(|own| own == tag))
    }
}
