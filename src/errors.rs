use std::io;

use thiserror::Error;

use crate::templates::NodeCategory;
use crate::types::ProductId;

/// Error type for catalog construction, configuration, and history persistence failures.
#[derive(Debug, Error)]
pub enum TraceError {
    /// Catalog built without products.
    #[error("product catalog must contain at least one product")]
    EmptyCatalog,
    /// Catalog built with a repeated product id.
    #[error("product id '{0}' appears more than once in the catalog")]
    DuplicateProduct(ProductId),
    /// Stage pool without templates.
    #[error("template pool for stage '{0}' has no templates")]
    EmptyStage(NodeCategory),
    /// Template pool lacking a stage.
    #[error("template pool has no stage '{0}'")]
    MissingStage(NodeCategory),
    /// Template pool repeating a stage.
    #[error("template pool defines stage '{0}' more than once")]
    DuplicateStage(NodeCategory),
    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// History payload could not be encoded or decoded.
    #[error("scan history storage failure: {0}")]
    HistoryStorage(String),
    /// Filesystem failure.
    #[error(transparent)]
    Io(#[from] io::Error),
}
