use serde::{Deserialize, Serialize};
use validator::Validate;

/// Inbound request for creating a job
///
/// Required fields are `Option`s so that a missing field surfaces as a
/// validation error naming it instead of a generic decoding error.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Validate)]
pub struct CreateJobRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[validate(required(message = "department is required"))]
    pub department: Option<String>,

    #[validate(required(message = "job_item is required"))]
    pub job_item: Option<String>,

    #[validate(required(message = "locations is required"))]
    pub locations: Option<Vec<String>>,
}

impl CreateJobRequest {
    /// Requested locations, empty when none were given
    pub fn locations(&self) -> &[String] {
        self.locations.as_deref().unwrap_or_default()
    }
}
