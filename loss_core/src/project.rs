//! # Project Data Structures
//!
//! The `Project` struct is the root container persisted to disk: who owns the
//! analysis, how losses are computed, and the bridge being analyzed.
//! Projects serialize to `.tsl` files as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Project
//! ├── meta: ProjectMetadata (id, version, engineer, job info, timestamps)
//! ├── settings: LossConfig (loss method, strand modeling, friction, solver)
//! └── bridge: BridgeDescription (spans, sections, prestressing, timeline)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use loss_core::project::Project;
//!
//! let project = Project::new("Jane Engineer", "25-042", "State DOT");
//! let json = serde_json::to_string_pretty(&project).unwrap();
//! assert!(json.contains("25-042"));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::LossResult;
use crate::losses::{LossConfig, TimeStepLossEngine};
use crate::reference::{BridgeDescription, ReferenceBridge, SimpleSpanSolver};

/// Current schema version for project files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Extension of project files
pub const PROJECT_EXTENSION: &str = "tsl";

/// Root project container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub meta: ProjectMetadata,

    /// Loss analysis settings
    pub settings: LossConfig,

    pub bridge: BridgeDescription,
}

impl Project {
    /// Create a project around the sample bridge.
    ///
    /// # Example
    ///
    /// ```rust
    /// use loss_core::project::Project;
    ///
    /// let project = Project::new("John Doe", "25-001", "Client Corp");
    /// assert_eq!(project.meta.engineer, "John Doe");
    /// ```
    pub fn new(
        engineer: impl Into<String>,
        job_id: impl Into<String>,
        client: impl Into<String>,
    ) -> Self {
        Project::with_bridge(engineer, job_id, client, BridgeDescription::sample())
    }

    pub fn with_bridge(
        engineer: impl Into<String>,
        job_id: impl Into<String>,
        client: impl Into<String>,
        bridge: BridgeDescription,
    ) -> Self {
        let now = Utc::now();
        Project {
            meta: ProjectMetadata {
                id: Uuid::new_v4(),
                version: SCHEMA_VERSION.to_string(),
                engineer: engineer.into(),
                job_id: job_id.into(),
                client: client.into(),
                created: now,
                modified: now,
            },
            settings: LossConfig::default(),
            bridge,
        }
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn set_settings(&mut self, settings: LossConfig) {
        self.settings = settings;
        self.touch();
    }

    /// Validated provider model of the bridge
    pub fn reference_bridge(&self) -> LossResult<ReferenceBridge> {
        ReferenceBridge::new(self.bridge.clone())
    }

    /// Everything needed to run the analysis: bridge, solver and engine
    pub fn analysis(&self) -> LossResult<(ReferenceBridge, SimpleSpanSolver, TimeStepLossEngine)> {
        let engine = TimeStepLossEngine::new(self.settings)?;
        let bridge = self.reference_bridge()?;
        let solver = SimpleSpanSolver::for_bridge(&bridge);
        Ok((bridge, solver, engine))
    }
}

impl Default for Project {
    fn default() -> Self {
        Project::new("", "", "")
    }
}

/// Project metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Stable identifier of the project
    pub id: Uuid,

    /// Schema version (for migration compatibility)
    pub version: String,

    /// Name of the responsible engineer
    pub engineer: String,

    /// Job/project number
    pub job_id: String,

    /// Client or owner agency
    pub client: String,

    pub created: DateTime<Utc>,

    pub modified: DateTime<Utc>,
}
