use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Read-only `region -> districts` directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressBook(IndexMap<String, Vec<String>>);

impl AddressBook {
    pub fn regions(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    pub fn has_region(&self, region: &str) -> bool {
        self.0.contains_key(region)
    }

    pub fn districts(&self, region: &str) -> &[String] {
        self.0.get(region).map(Vec::as_slice).unwrap_or_default()
    }

    /// Resolves a district picked for `region`, accepting the bare name
    /// without the ` tuman` suffix.
    pub fn resolve_district(&self, region: &str, input: &str) -> Option<String> {
        let district = normalize_district(input);
        self.districts(region)
            .iter()
            .find(|known| **known == district)
            .cloned()
    }
}

pub fn normalize_district(input: &str) -> String {
    if input.to_lowercase().contains("tuman") {
        input.to_owned()
    } else {
        format!("{input} tuman")
    }
}
