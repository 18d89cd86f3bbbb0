//! Namespace policy for local persistent stores.

/// Which local stores belong to this application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreNamespace {
    /// Stores named with this prefix are ours.
    pub prefix: String,
    /// Stores whose name contains this marker are ours.
    pub marker: String,
    /// Default store names created by libraries we use.
    pub known_names: Vec<String>,
}

impl Default for StoreNamespace {
    fn default() -> Self {
        Self {
            prefix: "nomai-".to_string(),
            marker: "NomAI".to_string(),
            known_names: vec!["NomAIDatabase".to_string(), "keyval-store".to_string()],
        }
    }
}

impl StoreNamespace {
    pub fn matches(&self, store_name: &str) -> bool {
        if store_name.is_empty() {
            return false;
        }
        (!self.prefix.is_empty() && store_name.starts_with(&self.prefix))
            || (!self.marker.is_empty() && store_name.contains(&self.marker))
            || self.known_names.iter().any(|known| known == store_name)
    }
}
