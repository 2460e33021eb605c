//! Chart views of the hospital dashboard
//!
//! Renderers turn the engine's settled state into serializable chart specs,
//! adapters turn raw chart payloads into [`hd_core::SyncEvent`]s, and the
//! [`Dashboard`] ties both to one [`hd_core::SyncEngine`].

pub mod adapters;
pub mod chart;
pub mod dashboard;
pub mod plots;
pub mod predict;
pub mod view;

// Re-exports
pub use adapters::{normalize, Interaction};
pub use chart::{ChartBody, ChartSpec, DragMode};
pub use dashboard::{Dashboard, DashboardEvent, DashboardFrame, StaffEvent};
pub use plots::{default_renderers, StaffNetwork, TeamStatus};
pub use predict::{
    predict_or_fallback, HistoricalPredictor, PredictError, Prediction, PredictionRequest, PredictionSource,
    Predictor,
};
pub use view::{ChartRenderer, RenderInput};
