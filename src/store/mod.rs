//! Store layer: concurrent in-memory state with explicit handles.
//!
//! Every component receives its store handles at construction rather than
//! reaching for ambient globals. [`AreaRegistry`] owns the capacity ledger
//! and the spatial resolver index, [`EventLog`] the append-only event
//! record, and [`UserRegistry`] the registered users.

pub mod area_store;
pub mod event_log;
pub mod spatial;
pub mod user_store;

pub use area_store::AreaRegistry;
pub use event_log::EventLog;
pub use spatial::AreaIndex;
pub use user_store::UserRegistry;
