//! # services
//!
//! Decision logic for the scanner and the item board. Everything here talks
//! to the outside world through the ports in `domains`.
//!
//! ```text
//! file ─▶ triage ─▶ classifier ─┬─▶ local engine probe (3s bound)
//!                               └─▶ strategy ─▶ prompt ─▶ cloud model ─▶ verdict
//! ```

pub mod assistant;
pub mod board;
pub mod classifier;
pub mod demo;
pub mod files;
pub mod filter;
pub mod heuristics;
pub mod prompt;
pub mod strategy;
pub mod tagging;
pub mod triage;
pub mod verdict;

pub use assistant::ChatAssistant;
pub use board::{FetchFailure, ItemBoard, LoadOutcome, PendingSync, SyncOutcome};
pub use classifier::{ThreatAnalyzer, LOCAL_ENGINE_PREFIX, LOCAL_PROBE_TIMEOUT};
pub use files::{DiskFile, MemoryFile};
pub use filter::ItemFilter;
pub use tagging::{ItemTagger, TaggingError};
pub use triage::{extract_metadata, format_bytes, get_extension, hex_dump, ExtractError};
