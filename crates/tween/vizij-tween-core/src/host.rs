//! Interfaces the blending core consumes from its host application.
//!
//! The host owns the persistent keys; the core only reads positions, writes
//! one atomic commit per channel per tick, and optionally asks for a buffered
//! snapshot of a curve. Adapters implement these traits.

use std::cell::{RefCell, RefMut};
use std::collections::BTreeSet;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use crate::data::KeyPoint;
use crate::error::TweenError;
use crate::ids::{ChannelId, CurveId, KeyHandle};

/// Read/commit access to the host curve data model.
pub trait CurveModel {
    fn find_curve(&self, channel: ChannelId) -> Option<CurveId>;

    /// Ordered key positions and their handles (parallel arrays).
    fn key_positions_and_handles(&self, curve: CurveId) -> (Vec<KeyPoint>, Vec<KeyHandle>);

    /// Write all given keys in one commit. `positions[i]` belongs to `handles[i]`.
    fn set_key_positions(&mut self, curve: CurveId, handles: &[KeyHandle], positions: &[KeyPoint]);

    /// Read-only copy of the curve's current shape, if this curve type supports one.
    fn create_buffered_snapshot(&self, curve: CurveId) -> Option<Box<dyn CurveEvaluator>>;

    /// Insert (or find) a key at `x`. Hosts that cannot insert return `None`.
    fn insert_key(&mut self, _curve: CurveId, _x: f64) -> Option<KeyHandle> {
        None
    }
}

/// Evaluates a captured curve at arbitrary times.
pub trait CurveEvaluator {
    /// `None` when the curve cannot be evaluated at `x`.
    fn evaluate(&self, x: f64) -> Option<f64>;
}

/// Which keys the user has selected, per channel. Queried once per start.
pub trait SelectionSource {
    fn selected_key_indices(&self) -> IndexMap<ChannelId, BTreeSet<usize>>;
}

/// Current scrub (playhead) time, used by insert-at-scrub workflows.
pub trait ScrubTimeSource {
    fn current_scrub_time(&self) -> f64;
}

impl<F> ScrubTimeSource for F
where
    F: Fn() -> f64,
{
    fn current_scrub_time(&self) -> f64 {
        self()
    }
}

/// Non-owning link to a host that may disappear (e.g. the editor closed mid-drag).
#[derive(Debug)]
pub struct HostLink<H> {
    host: Weak<RefCell<H>>,
}

impl<H> Clone for HostLink<H> {
    fn clone(&self) -> Self {
        Self {
            host: self.host.clone(),
        }
    }
}

impl<H> HostLink<H> {
    pub fn new(host: &Rc<RefCell<H>>) -> Self {
        Self {
            host: Rc::downgrade(host),
        }
    }

    /// A link that never resolves.
    pub fn detached() -> Self {
        Self { host: Weak::new() }
    }

    pub fn resolve(&self) -> Result<Rc<RefCell<H>>, TweenError> {
        self.host.upgrade().ok_or(TweenError::UnavailableHost)
    }

    pub fn is_alive(&self) -> bool {
        self.host.strong_count() > 0
    }
}

/// Exclusive borrow of a resolved host; fails softly on re-entrant access.
pub(crate) fn borrow_host<H>(host: &Rc<RefCell<H>>) -> Result<RefMut<'_, H>, TweenError> {
    host.try_borrow_mut().map_err(|_| TweenError::HostBusy)
}
