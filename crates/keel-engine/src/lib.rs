//! # keel-engine
//!
//! The incremental backbone-extraction engine.
//!
//! Given a loaded oracle and a variable count, the engine issues a sequence
//! of oracle queries that refine a candidate set until every variable is
//! classified as backbone or non-backbone, streaming `b` lines as backbones
//! are confirmed. The refinement combines an assumption-based or
//! constrain-based elimination step with three independently enableable
//! shortcuts: model-based filtering, cheap model flipping, and root-level
//! fixed-literal queries.

pub mod candidates;
pub mod checker;
pub mod config;
pub mod driver;
pub mod emit;
pub mod probes;
pub mod stats;

pub use candidates::CandidateSet;
pub use checker::Checker;
pub use config::EngineConfig;
pub use driver::Engine;
pub use emit::Emitter;
pub use stats::{Profiler, Stats, StatsSnapshot, TimerKind};
