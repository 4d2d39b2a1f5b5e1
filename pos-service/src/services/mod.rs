//! Services module for pos-service.

pub mod commit;
pub mod engine;
pub mod history;
pub mod metrics;
pub mod reprint;

pub use commit::{CommitProtocol, CommitReceipt};
pub use engine::PosEngine;
pub use history::HistoryService;
pub use metrics::{get_metrics, init_metrics};
pub use reprint::{ReprintOutcome, ReprintState};
