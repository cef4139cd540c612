// Rust guideline compliant 2026-02-06

//! Bulk transition resolution.
//!
//! Computes the transitions that can be offered for a selection of rows:
//! the intersection of every selected entity's legal transitions, filtered
//! by the view's allow-list, extended with the view's custom transitions
//! and ordered by weight.

use crate::config::EngineConfig;
use crate::identity::valid_uids;
use crate::models::{ReviewState, Transition};
use crate::ports::{Catalog, Entity, Workflow};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Returns the ordering weight of a transition.
///
/// # Arguments
///
/// * `transition` - Transition to weigh
/// * `weights` - Default weights keyed by transition id
///
/// # Returns
///
/// The explicit weight, else the table weight, else 0.
#[must_use]
pub fn transition_weight(transition: &Transition, weights: &BTreeMap<String, i64>) -> i64 {
    transition
        .weight
        .or_else(|| weights.get(&transition.id).copied())
        .unwrap_or(0)
}

/// Stable sort by ascending weight.
pub fn sort_by_weight(transitions: &mut [Transition], weights: &BTreeMap<String, i64>) {
    transitions.sort_by_key(|transition| transition_weight(transition, weights));
}

/// Transition ids with their definitions in discovery order.
#[derive(Default)]
struct Discovered {
    order: Vec<String>,
    by_id: HashMap<String, Transition>,
}

impl Discovered {
    /// Records a definition. The first sighting fixes the position, the
    /// last sighting wins the content.
    fn record(&mut self, transition: Transition) {
        if !self.by_id.contains_key(&transition.id) {
            self.order.push(transition.id.clone());
        }
        self.by_id.insert(transition.id.clone(), transition);
    }
}

/// Resolves the transitions shared by a selection.
///
/// One resolver serves one request; its entity cache is never shared.
pub struct TransitionResolver<'a> {
    catalog: &'a dyn Catalog,
    workflow: &'a dyn Workflow,
    skip_states: &'a BTreeSet<String>,
    weights: &'a BTreeMap<String, i64>,
    cache: Mutex<HashMap<String, Option<Arc<dyn Entity>>>>,
}

impl<'a> TransitionResolver<'a> {
    /// Creates a resolver.
    ///
    /// # Arguments
    ///
    /// * `catalog` - Catalog used to look up entities
    /// * `workflow` - Workflow reporting legal transitions
    /// * `config` - Engine configuration (skip states, weight table)
    pub fn new(catalog: &'a dyn Catalog, workflow: &'a dyn Workflow, config: &'a EngineConfig) -> Self {
        Self {
            catalog,
            workflow,
            skip_states: &config.skip_states,
            weights: &config.transition_weights,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolves the transitions offered for the selected uids.
    ///
    /// Failures for single entities degrade to "no contribution" and never
    /// abort the resolution.
    ///
    /// # Arguments
    ///
    /// * `selected_uids` - Selected entity identifiers, any order
    /// * `review_state` - Active view with allow-list and custom transitions
    ///
    /// # Returns
    ///
    /// Transitions ordered by ascending weight, ties in discovery order.
    pub fn resolve(&self, selected_uids: &[String], review_state: &ReviewState) -> Vec<Transition> {
        let mut uids = valid_uids(selected_uids);
        if uids.is_empty() {
            return Vec::new();
        }
        uids.sort();

        let mut discovered = Discovered::default();
        let mut common: Option<BTreeSet<String>> = None;

        for uid in &uids {
            let Some(entity) = self.entity(uid) else {
                debug!(uid = %uid, "no object for uid, skipping");
                continue;
            };

            let transitions = match self.workflow.transitions_for(entity.as_ref()) {
                Ok(transitions) => transitions,
                Err(err) => {
                    warn!(uid = %uid, error = %err, "failed to fetch transitions");
                    continue;
                }
            };

            if transitions.is_empty() {
                let state = self.workflow.review_state_of(entity.as_ref());
                if state.as_ref().is_some_and(|state| self.skip_states.contains(state)) {
                    debug!(uid = %uid, state = ?state, "object in skip state, ignoring");
                    continue;
                }
                info!(uid = %uid, state = ?state, "object without transitions, nothing in common");
                common = Some(BTreeSet::new());
                break;
            }

            let ids: BTreeSet<String> = transitions.iter().map(|t| t.id.clone()).collect();
            for transition in transitions {
                discovered.record(transition);
            }
            common = Some(match common {
                None => ids,
                Some(previous) => previous.intersection(&ids).cloned().collect(),
            });
        }

        let common = common.unwrap_or_default();
        let allow_list = &review_state.allowed_transition_ids;
        let mut allowed: Vec<String> = discovered
            .order
            .iter()
            .filter(|id| common.contains(*id))
            .filter(|id| allow_list.is_empty() || allow_list.contains(*id))
            .cloned()
            .collect();

        for custom in &review_state.custom_transitions {
            if !allowed.contains(&custom.id) {
                allowed.push(custom.id.clone());
            }
            discovered.record(custom.clone());
        }

        let mut result: Vec<Transition> = allowed
            .iter()
            .filter_map(|id| discovered.by_id.get(id).cloned())
            .collect();
        sort_by_weight(&mut result, self.weights);
        result
    }

    fn entity(&self, uid: &str) -> Option<Arc<dyn Entity>> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = cache.get(uid) {
            return cached.clone();
        }
        let entity = match self.catalog.object_by_uid(uid) {
            Ok(entity) => entity,
            Err(err) => {
                warn!(uid = %uid, error = %err, "object lookup failed");
                None
            }
        };
        cache.insert(uid.to_string(), entity.clone());
        entity
    }
}
