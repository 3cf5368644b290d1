use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Order in which missing request fields are reported
const REQUIRED_FIELDS: [&str; 3] = ["department", "job_item", "locations"];

/// Error body returned by every endpoint
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// First validation message, following the fixed field order
fn first_message(errors: &validator::ValidationErrors) -> String {
    let field_errors = errors.field_errors();

    REQUIRED_FIELDS
        .iter()
        .filter_map(|field| field_errors.get(*field))
        .chain(field_errors.values())
        .flat_map(|errors| errors.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Validation error".to_string())
}

fn bad_request(message: String) -> actix_web::Error {
    warn!("Rejected request: {}", message);
    actix_web::error::InternalError::from_response(
        "",
        HttpResponse::BadRequest().json(ErrorResponse::new(message)),
    )
    .into()
}

/// Creates a configured JsonConfig with standardized error handling for the entire project
pub fn json_config() -> actix_web_validator::JsonConfig {
    actix_web_validator::JsonConfig::default().error_handler(|err, _req| match err {
        actix_web_validator::Error::Validate(validation_errors) => {
            bad_request(first_message(&validation_errors))
        }
        actix_web_validator::Error::Deserialize(de_err) => {
            let err_string = de_err.to_string();

            let message = if err_string.contains("EOF while parsing") {
                "Request body is empty. Expected JSON payload".to_string()
            } else if err_string.contains("invalid type") {
                format!("Invalid field type: {}", err_string)
            } else {
                "Invalid JSON format".to_string()
            };
            bad_request(message)
        }
        actix_web_validator::Error::JsonPayloadError(payload_err) => {
            bad_request(format!("Invalid JSON payload: {}", payload_err))
        }
        _ => bad_request("Validation error".to_string()),
    })
}
