//! CLI command implementations

pub mod catalog;
pub mod model;
pub mod predict;

use crate::client::ApiClient;
use predictor_lib::Session;

/// Where predictions come from
pub enum Backend {
    /// Artifacts loaded into this process
    Local { session: Session, currency: String },
    /// A running travel-server
    Remote(ApiClient),
}
