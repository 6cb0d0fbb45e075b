pub mod amount;
pub mod engine;
pub mod fields;
pub mod line_items;
pub mod pipeline;
pub mod report;

pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
pub use engine::{RunOutcome, SummaryEngine};
pub use pipeline::{plan_documents, ClaimPipeline, DocumentPlan};
