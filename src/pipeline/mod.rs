//! Rebalancing pipeline.
//!
//! A pass runs an ordered list of [`Stage`]s over one [`ClusterEvent`].
//! Upstream stages (outside this crate) read cluster state and generate
//! candidate messages; [`MessageSelectionStage`] decides which of them are
//! dispatched; downstream stages (also outside this crate) send them.
//!
//! # Architecture
//!
//! ```text
//!   ClusterEvent ──▶ [generation] ──▶ MessageSelectionStage ──▶ [dispatch]
//!                     MESSAGES_ALL        MESSAGES_SELECTED
//! ```
//!
//! A stage failure aborts the pass. The caller decides whether to retry it.

pub mod data_cache;
pub mod event;
pub mod message_selection;
pub mod output;

use std::time::Instant;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cluster::{ClusterError, metrics};

pub use data_cache::ClusterDataCache;
pub use event::{AttributeName, ClusterEvent, EventAttribute};
pub use message_selection::{MessageSelectionStage, select, select_messages};
pub use output::{MessageGenerationOutput, MessageSelectionOutput, ResourceMessages};

/// Result type for pipeline stages.
pub type StageResult<T> = Result<T, StageError>;

/// Errors that abort a pipeline pass.
#[derive(Debug, Error)]
pub enum StageError {
    /// Attributes the stage depends on were not in the event.
    #[error("Missing attributes in event {event}: requires {}", join_names(.missing))]
    MissingAttributes {
        event: String,
        missing: Vec<AttributeName>,
    },

    /// Cluster data could not be read.
    #[error(transparent)]
    Cluster(#[from] ClusterError),
}

fn join_names(names: &[AttributeName]) -> String {
    names
        .iter()
        .map(|n| n.as_str())
        .collect::<Vec<_>>()
        .join("|")
}

/// One step of a pipeline pass.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Stage name used in logs.
    fn name(&self) -> &'static str;

    /// Read inputs from `event` and write outputs back into it.
    async fn process(&self, event: &mut ClusterEvent) -> StageResult<()>;
}

/// Ordered list of stages run for each pass.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// The rebalancing pipeline run by an active controller.
    pub fn rebalance() -> Self {
        Self::new().with_stage(MessageSelectionStage::new())
    }

    pub fn add_stage(&mut self, stage: impl Stage + 'static) {
        self.stages.push(Box::new(stage));
    }

    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.add_stage(stage);
        self
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage in order, stopping at the first failure.
    pub async fn handle(&self, event: &mut ClusterEvent) -> StageResult<()> {
        let started = Instant::now();
        for stage in &self.stages {
            let stage_started = Instant::now();
            if let Err(e) = stage.process(event).await {
                warn!(
                    stage = stage.name(),
                    event = %event.name(),
                    error = %e,
                    "Pipeline stage failed, aborting pass"
                );
                metrics::record_pipeline_pass("error", started.elapsed().as_secs_f64());
                return Err(e);
            }
            debug!(
                stage = stage.name(),
                event = %event.name(),
                elapsed_us = stage_started.elapsed().as_micros() as u64,
                "Pipeline stage completed"
            );
        }
        metrics::record_pipeline_pass("ok", started.elapsed().as_secs_f64());
        Ok(())
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}
