// Rust guideline compliant 2026-02-09

//! Loading a listing, its entities and the engine configuration.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tabula_app::{dispatch, ListingService};
use tabula_core::{
    EngineConfig, ListingDefinition, MemoryCatalog, MemoryDataManager, MemoryStore,
    MemoryWorkflow, SharedListing,
};
use tracing::info;

/// Operations that write entities back to the JSONL file on success.
const MUTATING_OPERATIONS: &[&str] = &["set_fields", "execute_transition"];

/// File locations and catalog options for one invocation.
#[derive(Debug, Clone)]
pub struct WorkspaceOptions {
    /// Listing definition (TOML).
    pub listing: PathBuf,
    /// Entity records (JSONL).
    pub entities: PathBuf,
    /// Directory holding `tabula.toml`; defaults to the listing's directory.
    pub config_dir: Option<PathBuf>,
    /// Indexes the catalog can sort on.
    pub sort_indexes: Vec<String>,
    /// Whether the catalog has a full-text index.
    pub text_index: bool,
}

/// A loaded listing ready to serve operations.
pub struct Workspace {
    entities: PathBuf,
    store: Arc<MemoryStore>,
    service: ListingService,
}

impl Workspace {
    /// Loads the configuration, listing definition and entities.
    ///
    /// # Errors
    ///
    /// Returns an error if any file is unreadable or invalid.
    pub fn open(options: &WorkspaceOptions) -> Result<Self> {
        let config_dir = options
            .config_dir
            .clone()
            .or_else(|| options.listing.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        let config = EngineConfig::load(&config_dir)
            .with_context(|| format!("Failed to load config from {}", config_dir.display()))?;
        let definition = ListingDefinition::load(&options.listing)
            .with_context(|| format!("Failed to load listing {}", options.listing.display()))?;
        let store = Arc::new(
            MemoryStore::load(&options.entities)
                .with_context(|| format!("Failed to load entities {}", options.entities.display()))?,
        );

        let catalog = MemoryCatalog::new(Arc::clone(&store))
            .with_sort_indexes(options.sort_indexes.iter().cloned())
            .with_text_index(options.text_index);
        let workflow = Arc::new(MemoryWorkflow::new(Arc::clone(&store)));
        let service = ListingService::new(
            Arc::new(catalog),
            workflow.clone(),
            Arc::new(SharedListing::new(definition)?),
            config,
        )
        .with_data_manager(Arc::new(MemoryDataManager::new(Arc::clone(&store))))
        .with_executor(workflow);

        info!(
            listing = %options.listing.display(),
            entities = store.len(),
            "workspace loaded"
        );
        Ok(Self {
            entities: options.entities.clone(),
            store,
            service,
        })
    }

    /// Returns the listing service.
    #[must_use]
    pub fn service(&self) -> &ListingService {
        &self.service
    }

    /// Runs an operation and persists entity changes.
    ///
    /// # Returns
    ///
    /// The response envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if changed entities cannot be written back.
    pub fn run(&self, operation: &str, payload: Value) -> Result<Value> {
        let response = dispatch(&self.service, operation, payload);
        if MUTATING_OPERATIONS.contains(&operation) && is_ok(&response) {
            self.store
                .save(&self.entities)
                .with_context(|| format!("Failed to save entities {}", self.entities.display()))?;
        }
        Ok(response)
    }
}

/// Returns true for a success envelope.
#[must_use]
pub fn is_ok(response: &Value) -> bool {
    response.get("status").and_then(Value::as_str) == Some("ok")
}
