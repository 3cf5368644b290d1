use std::collections::BTreeMap;

/// Filter for the department and job item list endpoints
///
/// Zero and empty values mean "unset" and never reach the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub display_name: String,
    pub first: u32,
    pub next: u32,
}

impl ListFilter {
    pub fn by_display_name(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            ..Default::default()
        }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if !self.display_name.is_empty() {
            pairs.push(("displayName", self.display_name.clone()));
        }
        if self.first > 0 {
            pairs.push(("first", self.first.to_string()));
        }
        if self.next > 0 {
            pairs.push(("next", self.next.to_string()));
        }
        pairs
    }
}

/// Free-form filter for the location and job list endpoints
pub type QueryParams = BTreeMap<String, String>;

/// Parameters asking for entities with the given display name
pub fn display_name_params(display_name: &str) -> QueryParams {
    QueryParams::from([("displayName".to_string(), display_name.to_string())])
}

pub(crate) fn param_pairs(params: &QueryParams) -> Vec<(&str, String)> {
    params
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| (key.as_str(), value.clone()))
        .collect()
}
