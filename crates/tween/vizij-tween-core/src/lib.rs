//! Vizij Tween Core (engine-agnostic)
//!
//! Contiguous-key blending for curve editors. A UI slider drives a
//! [`BlendModel`] through start → blend(value)* → stop. On start the selected
//! keys of each channel are split into contiguous runs; each blend tick
//! recomputes every selected key with one of the [`BlendFunction`]s and
//! commits the results once per channel through the host's [`CurveModel`].
//!
//! The host owns key storage, selection, and undo. This crate only needs the
//! narrow traits in [`host`]; [`memory`] provides an in-memory implementation.

pub mod accessor;
pub mod blend;
pub mod config;
pub mod data;
pub mod error;
pub mod fallback;
pub mod host;
pub mod ids;
pub mod memory;
pub mod model;
pub mod offset;
pub mod partition;
pub mod session;
pub mod transaction;

// Re-exports for consumers (adapters)
pub use accessor::BlendRange;
pub use blend::{BlendFunction, BlendFunctionInfo};
pub use config::{Config, ScaleMode};
pub use data::{BlendOutcome, ChannelRunSet, ContiguousRun, KeyPoint};
pub use error::TweenError;
pub use fallback::{InsertKeyAtScrubTime, SelectionFallback, WholeChannelSelection};
pub use host::{CurveEvaluator, CurveModel, HostLink, ScrubTimeSource, SelectionSource};
pub use ids::{ChannelId, CurveId, KeyHandle};
pub use memory::{Interpolation, MemoryCurveModel, StaticSelection};
pub use model::{blend_channel, BlendModel, ContiguousKeyBlendModel};
pub use offset::TimeOffsetEvaluator;
pub use partition::partition_contiguous_runs;
pub use session::BlendSession;
pub use transaction::{TransactionScope, TransactionalBlendModel};
