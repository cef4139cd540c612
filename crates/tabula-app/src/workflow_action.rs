// Rust guideline compliant 2026-02-09

//! Reporting the outcome of transitions executed by the collaborator.

use crate::requests::TransitionOutcome;
use tabula_core::{valid_uids, Catalog, Entity, TransitionExecutor, TransitionFailure, Value};
use tracing::{info, warn};

/// Builds the user-visible message for a failure, if it warrants one.
///
/// Business rejections are expected when side effects cascade to dependent
/// objects and produce no message.
///
/// # Arguments
///
/// * `transition` - Transition id
/// * `oid` - Short id of the failing entity
/// * `failure` - Failure reported by the executor
///
/// # Returns
///
/// The message for conflicts and unexpected failures, `None` otherwise.
#[must_use]
pub fn failure_message(transition: &str, oid: &str, failure: &TransitionFailure) -> Option<String> {
    match failure {
        TransitionFailure::Rejected(_) => None,
        TransitionFailure::Conflict => Some(format!(
            "A database conflict error occurred during transition '{transition}' on '{oid}'. \
             Please try again."
        )),
        TransitionFailure::Unexpected(msg) => Some(format!(
            "An unknown error occurred during transition '{transition}' on '{oid}': {msg}"
        )),
    }
}

/// Short id used in messages: the entity's `id` attribute, else its uid.
fn short_id(entity: &dyn Entity) -> String {
    match entity.attribute("id") {
        Some(Value::Text(id)) if !id.is_empty() => id,
        _ => entity.uid().to_string(),
    }
}

/// Runs a transition over a selection through the executor.
///
/// Processing stops at the first failure that produces a message. Uids
/// without an object are skipped.
///
/// # Arguments
///
/// * `catalog` - Catalog resolving uids to entities
/// * `executor` - Collaborator executing the transition
/// * `uids` - Selected uids
/// * `transition` - Transition id
///
/// # Returns
///
/// The transitioned uids and the failure message, if any.
///
/// # Errors
///
/// Returns an error if the catalog lookup fails.
pub fn execute(
    catalog: &dyn Catalog,
    executor: &dyn TransitionExecutor,
    uids: &[String],
    transition: &str,
) -> tabula_core::Result<TransitionOutcome> {
    let mut outcome = TransitionOutcome::default();

    for uid in valid_uids(uids) {
        let Some(entity) = catalog.object_by_uid(&uid)? else {
            warn!(uid = %uid, transition = %transition, "no object for uid, skipping");
            continue;
        };

        match executor.do_transition(entity.as_ref(), transition) {
            Ok(()) => {
                info!(uid = %uid, transition = %transition, "transition done");
                outcome.succeeded.push(uid);
            }
            Err(failure) => {
                let oid = short_id(entity.as_ref());
                match failure_message(transition, &oid, &failure) {
                    Some(message) => {
                        warn!(uid = %uid, transition = %transition, error = %failure, "transition failed");
                        outcome.failed = true;
                        outcome.message = Some(message);
                        break;
                    }
                    None => {
                        warn!(uid = %uid, transition = %transition, error = %failure, "transition rejected, ignoring");
                    }
                }
            }
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_has_no_message() {
        let failure = TransitionFailure::Rejected("guard".to_string());
        assert_eq!(failure_message("submit", "s1", &failure), None);
    }

    #[test]
    fn test_conflict_message() {
        let message = failure_message("submit", "s1", &TransitionFailure::Conflict).unwrap();
        assert_eq!(
            message,
            "A database conflict error occurred during transition 'submit' on 's1'. Please try again."
        );
    }

    #[test]
    fn test_unexpected_message() {
        let failure = TransitionFailure::Unexpected("boom".to_string());
        assert_eq!(
            failure_message("verify", "s2", &failure).unwrap(),
            "An unknown error occurred during transition 'verify' on 's2': boom"
        );
    }
}
