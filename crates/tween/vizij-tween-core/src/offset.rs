//! Time-offset blending against buffered copies of the original curves.
//!
//! On start, every participating channel is asked for a buffered snapshot of
//! its curve. Channels whose curve type cannot produce one are dropped from the
//! session. While blending, the snapshot is sampled at the shifted time; any
//! evaluation failure falls back to the key's pre-blend value.

use hashbrown::HashMap;
use log::{debug, trace};

use crate::accessor::BlendRange;
use crate::blend::functions::offset_time;
use crate::error::TweenError;
use crate::host::{CurveEvaluator, CurveModel};
use crate::ids::ChannelId;
use crate::session::BlendSession;

#[derive(Default)]
pub struct TimeOffsetEvaluator {
    snapshots: HashMap<ChannelId, Box<dyn CurveEvaluator>>,
}

impl TimeOffsetEvaluator {
    /// Capture snapshots for all channels in `session`, removing the channels
    /// that cannot provide one. Returns the excluded channels.
    pub fn capture<H>(host: &H, session: &mut BlendSession) -> Vec<ChannelId>
    where
        H: CurveModel + ?Sized,
    {
        let mut evaluator = TimeOffsetEvaluator::default();
        let mut excluded = Vec::new();
        for (channel, run_set) in session.channels() {
            match host.create_buffered_snapshot(run_set.curve()) {
                Some(snapshot) => {
                    evaluator.snapshots.insert(channel, snapshot);
                }
                None => {
                    debug!("{}", TweenError::UnsupportedSnapshot { channel });
                    excluded.push(channel);
                }
            }
        }
        for channel in &excluded {
            session.remove_channel(*channel);
        }
        session.set_time_offset(evaluator);
        excluded
    }

    pub fn insert(&mut self, channel: ChannelId, snapshot: Box<dyn CurveEvaluator>) {
        self.snapshots.insert(channel, snapshot);
    }

    pub fn contains(&self, channel: ChannelId) -> bool {
        self.snapshots.contains_key(&channel)
    }

    /// New value for key `i` of `range` on `channel`, or `None` when no
    /// snapshot was captured for it.
    pub fn blend_key(
        &self,
        channel: ChannelId,
        value: f64,
        range: &BlendRange<'_>,
        i: usize,
    ) -> Option<f64> {
        let snapshot = self.snapshots.get(&channel)?;
        let current = range.current(i);
        let fallback = current.y;
        let evaluate = |x: f64| match snapshot.evaluate(x) {
            Some(y) => y,
            None => {
                trace!(
                    "{} on channel {:?}; keeping {}",
                    TweenError::EvaluationFailure { x },
                    channel,
                    fallback
                );
                fallback
            }
        };
        Some(offset_time(
            value,
            current,
            range.first_in_blend_range(),
            range.last_in_blend_range(),
            range.before_blend_range(),
            range.after_blend_range(),
            evaluate,
        ))
    }

    pub(crate) fn forget(&mut self, channel: ChannelId) {
        self.snapshots.remove(&channel);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}
