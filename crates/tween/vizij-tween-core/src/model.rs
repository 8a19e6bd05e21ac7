//! Blend models: the start → blend* → stop lifecycle driven by a UI slider.
//!
//! [`ContiguousKeyBlendModel`] is the base model. It snapshots the selected
//! keys on start, recomputes every selected key from that snapshot on each
//! blend tick, and commits once per channel. Everything is best effort: when
//! the host is gone or busy, calls do nothing and report "nothing blended".

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};

use crate::accessor::BlendRange;
use crate::blend::BlendFunction;
use crate::config::{Config, ScaleMode};
use crate::data::{BlendOutcome, ChannelRunSet, KeyPoint};
use crate::fallback::SelectionFallback;
use crate::host::{borrow_host, CurveModel, HostLink, SelectionSource};
use crate::ids::{ChannelId, KeyHandle};
use crate::offset::TimeOffsetEvaluator;
use crate::session::BlendSession;
use crate::transaction::{TransactionScope, TransactionalBlendModel};

/// Lifecycle shared by the base model and its decorators.
pub trait BlendModel {
    /// Idle → Active. Captures the selection (and snapshots, if needed).
    fn start_blend_operation(&mut self);

    /// Active → Idle. Safe to call when idle; calling twice is harmless.
    fn stop_blend_operation(&mut self);

    /// Apply `value` (raw, in [-1, 1]) to the captured keys. Returns whether any
    /// key was written.
    fn blend_values(&mut self, value: f64) -> bool;

    fn is_active(&self) -> bool;

    /// Start, blend once, stop. For discrete "jump to this value" interactions.
    fn blend_one_off(&mut self, value: f64) -> bool {
        self.start_blend_operation();
        let blended = self.blend_values(value);
        self.stop_blend_operation();
        blended
    }
}

impl<M: BlendModel + ?Sized> BlendModel for Box<M> {
    fn start_blend_operation(&mut self) {
        (**self).start_blend_operation()
    }

    fn stop_blend_operation(&mut self) {
        (**self).stop_blend_operation()
    }

    fn blend_values(&mut self, value: f64) -> bool {
        (**self).blend_values(value)
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }

    fn blend_one_off(&mut self, value: f64) -> bool {
        (**self).blend_one_off(value)
    }
}

/// Base model blending contiguous runs of selected keys.
pub struct ContiguousKeyBlendModel<H: CurveModel> {
    config: Config,
    host: HostLink<H>,
    selection: Box<dyn SelectionSource>,
    fallback: Option<Box<dyn SelectionFallback<H>>>,
    session: Option<BlendSession>,
    // Function captured at start; config edits wait for the next start.
    active_function: BlendFunction,
}

impl<H: CurveModel> ContiguousKeyBlendModel<H> {
    pub fn new(
        config: Config,
        host: &Rc<RefCell<H>>,
        selection: Box<dyn SelectionSource>,
    ) -> Self {
        Self::with_link(config, HostLink::new(host), selection)
    }

    pub fn with_link(
        config: Config,
        host: HostLink<H>,
        selection: Box<dyn SelectionSource>,
    ) -> Self {
        Self {
            active_function: config.function,
            config,
            host,
            selection,
            fallback: None,
            session: None,
        }
    }

    /// Strategy used when the curve selection is empty at start.
    pub fn with_fallback(mut self, fallback: Box<dyn SelectionFallback<H>>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Takes effect on the next start.
    pub fn set_blend_function(&mut self, function: BlendFunction) {
        self.config.function = function;
    }

    /// Takes effect on the next start.
    pub fn set_scale_mode(&mut self, scale_mode: ScaleMode) {
        self.config.scale_mode = scale_mode;
    }

    /// Wrap in a host transaction labeled with `config.transaction_label`.
    pub fn with_transaction<T>(self, scope: T) -> TransactionalBlendModel<Self, T>
    where
        T: TransactionScope,
    {
        let label = self.config.transaction_label.clone();
        TransactionalBlendModel::new(self, scope, label)
    }

    /// The active session, if any.
    #[inline]
    pub fn session(&self) -> Option<&BlendSession> {
        self.session.as_ref()
    }

    fn build_session(&mut self, host: &mut H) -> BlendSession {
        let mut session = BlendSession::new(self.config.scale_mode);
        let mut anything_selected = false;
        for (channel, indices) in self.selection.selected_key_indices() {
            if indices.is_empty() {
                continue;
            }
            anything_selected = true;
            let Some(curve) = host.find_curve(channel) else {
                debug!("no curve for selected channel {channel:?}");
                continue;
            };
            let (positions, handles) = host.key_positions_and_handles(curve);
            match ChannelRunSet::from_selection(curve, positions, handles, indices) {
                Ok(set) => session.insert_channel(channel, set),
                Err(err) => warn!("skipping channel {channel:?}: {err}"),
            }
        }

        // The fallback stands in for an empty selection, not a rejected one.
        if !anything_selected {
            match self.fallback.as_mut() {
                Some(fallback) => {
                    debug!("curve selection empty; using fallback selection");
                    fallback.gather(host, &mut session);
                }
                None => debug!("curve selection empty; nothing to blend"),
            }
        } else if session.is_empty() {
            debug!("every selected channel was rejected; nothing to blend");
        }

        if self.config.function.requires_snapshot() {
            let excluded = TimeOffsetEvaluator::capture(&*host, &mut session);
            if !excluded.is_empty() {
                debug!("{} channel(s) excluded from time offset", excluded.len());
            }
        }
        session
    }
}

/// New values for every selected key of one channel.
pub fn blend_channel(
    function: BlendFunction,
    value: f64,
    channel: ChannelId,
    run_set: &ChannelRunSet,
    time_offset: Option<&TimeOffsetEvaluator>,
) -> Vec<BlendOutcome> {
    blend_channel_keys(function, value, channel, run_set, time_offset)
        .into_iter()
        .map(|(idx, new_value)| BlendOutcome {
            handle: run_set.all_key_handles()[idx],
            new_value,
        })
        .collect()
}

/// `(key index, new value)` pairs in run order.
fn blend_channel_keys(
    function: BlendFunction,
    value: f64,
    channel: ChannelId,
    run_set: &ChannelRunSet,
    time_offset: Option<&TimeOffsetEvaluator>,
) -> Vec<(usize, f64)> {
    let mut out = Vec::new();
    for range in BlendRange::for_channel(run_set) {
        for i in 0..range.len() {
            let new_value = if function.supports_range_convention() {
                function.blend_in_range(value, &range, i)
            } else {
                time_offset.and_then(|offset| offset.blend_key(channel, value, &range, i))
            };
            if let Some(new_value) = new_value {
                out.push((range.key_index(i), new_value));
            }
        }
    }
    out
}

impl<H: CurveModel> BlendModel for ContiguousKeyBlendModel<H> {
    fn start_blend_operation(&mut self) {
        if let Some(mut stale) = self.session.take() {
            debug!("start while active; discarding previous session");
            stale.clear();
        }
        let host_rc = match self.host.resolve() {
            Ok(h) => h,
            Err(err) => {
                debug!("start ignored: {err}");
                return;
            }
        };
        let mut host = match borrow_host(&host_rc) {
            Ok(h) => h,
            Err(err) => {
                debug!("start ignored: {err}");
                return;
            }
        };
        let session = self.build_session(&mut host);
        debug!(
            "blend session started: {} with {} channel(s), {} key(s)",
            self.config.function,
            session.len(),
            session.key_count()
        );
        self.active_function = self.config.function;
        self.session = Some(session);
    }

    fn stop_blend_operation(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.clear();
            debug!("blend session stopped");
        }
    }

    fn blend_values(&mut self, value: f64) -> bool {
        let Some(session) = self.session.as_ref() else {
            return false;
        };
        if session.is_empty() {
            return false;
        }
        let host_rc = match self.host.resolve() {
            Ok(h) => h,
            Err(err) => {
                debug!("blend ignored: {err}");
                return false;
            }
        };
        let mut host = match borrow_host(&host_rc) {
            Ok(h) => h,
            Err(err) => {
                debug!("blend ignored: {err}");
                return false;
            }
        };

        let scaled = session.scale_blend_value(value);
        let function = self.active_function;
        let mut blended = false;
        for (channel, run_set) in session.channels() {
            let writes =
                blend_channel_keys(function, scaled, channel, run_set, session.time_offset());
            if writes.is_empty() {
                continue;
            }
            let positions = run_set.all_key_positions();
            let all_handles = run_set.all_key_handles();
            let (handles, new_positions): (Vec<KeyHandle>, Vec<KeyPoint>) = writes
                .into_iter()
                .map(|(idx, y)| (all_handles[idx], positions[idx].with_y(y)))
                .unzip();
            host.set_key_positions(run_set.curve(), &handles, &new_positions);
            blended = true;
        }
        blended
    }

    fn is_active(&self) -> bool {
        self.session.is_some()
    }
}
