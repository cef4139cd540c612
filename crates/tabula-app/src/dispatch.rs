// Rust guideline compliant 2026-02-09

//! Operation dispatch over JSON payloads.

use crate::error::{AppError, Result};
use crate::listing::ListingService;
use crate::response::envelope;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Names of the operations accepted by [`dispatch`].
pub const OPERATIONS: &[&str] = &[
    "fetch_rows",
    "fetch_transitions",
    "fetch_children",
    "query_rows",
    "set_fields",
    "execute_transition",
];

/// Runs an operation and wraps its result in an envelope.
///
/// # Arguments
///
/// * `service` - Listing service
/// * `operation` - Operation name, see [`OPERATIONS`]
/// * `payload` - JSON payload; `null` is treated as an empty object
///
/// # Returns
///
/// The success or error envelope.
#[must_use]
pub fn dispatch(service: &ListingService, operation: &str, payload: Value) -> Value {
    debug!(operation = %operation, "dispatching");
    match operation {
        "fetch_rows" => respond(parse(payload, &[]).and_then(|request| service.fetch_rows(&request))),
        "fetch_transitions" => {
            respond(parse(payload, &["selected_uids"]).map(|request| service.fetch_transitions(&request)))
        }
        "fetch_children" => respond(
            parse(payload, &["parent_uid"]).and_then(|request| service.fetch_children(&request)),
        ),
        "query_rows" => {
            respond(parse(payload, &[]).and_then(|request| service.query_rows(&request)))
        }
        "set_fields" => {
            respond(parse(payload, &["save_queue"]).and_then(|request| service.set_fields(&request)))
        }
        "execute_transition" => respond(
            parse(payload, &["uids", "transition"])
                .and_then(|request| service.execute_transition(&request)),
        ),
        other => respond::<()>(Err(AppError::UnknownOperation(other.to_string()))),
    }
}

fn respond<T: Serialize>(result: Result<T>) -> Value {
    envelope(&result)
}

/// Checks required keys, then decodes the payload.
fn parse<T: DeserializeOwned>(payload: Value, required: &[&str]) -> Result<T> {
    let payload = match payload {
        Value::Null => Value::Object(serde_json::Map::new()),
        Value::Object(map) => Value::Object(map),
        _ => return Err(AppError::InvalidInput("Payload must be a JSON object".to_string())),
    };
    if required.iter().any(|key| payload.get(*key).is_none()) {
        return Err(AppError::missing_keys(required));
    }
    serde_json::from_value(payload)
        .map_err(|err| AppError::InvalidInput(format!("Invalid payload: {err}")))
}
