use serde::{Deserialize, Serialize};

/// A reference entry in the chemical library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chemical {
    pub external_id: String,
    pub name: String,
    pub short_description: String,
    pub uses: String,
    pub precautions: String,
    pub mixing_note: String,
    pub sds_url: Option<String>,
    #[serde(default)]
    pub brands: Vec<String>,
}

impl Chemical {
    /// Case-insensitive match against the name, uses and brand names.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&query)
            || self.uses.to_lowercase().contains(&query)
            || self.brands.iter().any(|b| b.to_lowercase().contains(&query))
    }
}
