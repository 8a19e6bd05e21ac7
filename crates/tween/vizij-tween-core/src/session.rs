//! Per-operation blend state, owned by the model between start and stop.

use indexmap::IndexMap;

use crate::config::ScaleMode;
use crate::data::{ChannelRunSet, KeyPoint};
use crate::error::TweenError;
use crate::ids::{ChannelId, CurveId, KeyHandle};
use crate::offset::TimeOffsetEvaluator;

/// Run partitions (and, for time offset, curve snapshots) for one blend operation.
///
/// Channels iterate in insertion order so commits are deterministic.
#[derive(Default)]
pub struct BlendSession {
    channel_run_sets: IndexMap<ChannelId, ChannelRunSet>,
    scale_mode: ScaleMode,
    time_offset: Option<TimeOffsetEvaluator>,
}

impl std::fmt::Debug for BlendSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlendSession")
            .field("channels", &self.channel_run_sets.len())
            .field("scale_mode", &self.scale_mode)
            .field(
                "snapshots",
                &self.time_offset.as_ref().map(TimeOffsetEvaluator::len),
            )
            .finish()
    }
}

impl BlendSession {
    pub fn new(scale_mode: ScaleMode) -> Self {
        Self {
            channel_run_sets: IndexMap::new(),
            scale_mode,
            time_offset: None,
        }
    }

    #[inline]
    pub fn scale_mode(&self) -> ScaleMode {
        self.scale_mode
    }

    /// Expand a raw UI value according to the session's scale mode.
    #[inline]
    pub fn scale_blend_value(&self, raw: f64) -> f64 {
        self.scale_mode.scale(raw)
    }

    /// Add a channel. Empty run sets are ignored since they never blend.
    pub fn insert_channel(&mut self, channel: ChannelId, run_set: ChannelRunSet) {
        if run_set.is_empty() {
            return;
        }
        self.channel_run_sets.insert(channel, run_set);
    }

    pub fn remove_channel(&mut self, channel: ChannelId) -> Option<ChannelRunSet> {
        if let Some(offset) = self.time_offset.as_mut() {
            offset.forget(channel);
        }
        self.channel_run_sets.shift_remove(&channel)
    }

    /// Record a key the host inserted mid-session at `index`, creating the
    /// channel entry if this is its first selected key.
    pub fn append_key(
        &mut self,
        channel: ChannelId,
        curve: CurveId,
        positions: Vec<KeyPoint>,
        handles: Vec<KeyHandle>,
        index: usize,
    ) -> Result<(), TweenError> {
        match self.channel_run_sets.get_mut(&channel) {
            Some(set) => set.append(positions, handles, index),
            None => {
                let set = ChannelRunSet::from_selection(curve, positions, handles, [index])?;
                self.insert_channel(channel, set);
                Ok(())
            }
        }
    }

    pub fn channel(&self, channel: ChannelId) -> Option<&ChannelRunSet> {
        self.channel_run_sets.get(&channel)
    }

    pub fn channels(&self) -> impl Iterator<Item = (ChannelId, &ChannelRunSet)> + '_ {
        self.channel_run_sets.iter().map(|(id, set)| (*id, set))
    }

    pub fn channel_ids(&self) -> Vec<ChannelId> {
        self.channel_run_sets.keys().copied().collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.channel_run_sets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.channel_run_sets.is_empty()
    }

    /// Total selected keys across all channels.
    pub fn key_count(&self) -> usize {
        self.channel_run_sets
            .values()
            .map(|set| set.selected_indices().count())
            .sum()
    }

    pub fn set_time_offset(&mut self, evaluator: TimeOffsetEvaluator) {
        self.time_offset = Some(evaluator);
    }

    #[inline]
    pub fn time_offset(&self) -> Option<&TimeOffsetEvaluator> {
        self.time_offset.as_ref()
    }

    /// Drop snapshots and partitions.
    pub fn clear(&mut self) {
        if let Some(offset) = self.time_offset.as_mut() {
            offset.clear();
        }
        self.time_offset = None;
        self.channel_run_sets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(n: usize) -> (Vec<KeyPoint>, Vec<KeyHandle>) {
        let positions = (0..n).map(|i| KeyPoint::new(i as f64, 0.0)).collect();
        let handles = (0..n as u64).map(KeyHandle).collect();
        (positions, handles)
    }

    #[test]
    fn empty_run_sets_are_not_inserted() {
        let mut session = BlendSession::new(ScaleMode::Normalized);
        let (positions, handles) = keys(3);
        let set = ChannelRunSet::from_selection(CurveId(0), positions, handles, Vec::new())
            .expect("set");
        session.insert_channel(ChannelId(0), set);
        assert!(session.is_empty());
    }

    #[test]
    fn append_creates_then_extends_channel() {
        let mut session = BlendSession::new(ScaleMode::Overshoot);
        let (positions, handles) = keys(3);
        session
            .append_key(ChannelId(1), CurveId(4), positions, handles, 1)
            .expect("append");
        assert_eq!(session.len(), 1);
        assert_eq!(session.key_count(), 1);

        let (positions, handles) = keys(4);
        session
            .append_key(ChannelId(1), CurveId(4), positions, handles, 3)
            .expect("append");
        let set = session.channel(ChannelId(1)).expect("channel");
        assert_eq!(set.selected_indices().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(set.curve(), CurveId(4));
        assert_eq!(session.scale_blend_value(0.5), 1.0);
    }

    #[test]
    fn clear_is_repeatable() {
        let mut session = BlendSession::new(ScaleMode::Normalized);
        let (positions, handles) = keys(2);
        session
            .append_key(ChannelId(0), CurveId(0), positions, handles, 0)
            .expect("append");
        session.clear();
        session.clear();
        assert!(session.is_empty());
        assert!(session.time_offset().is_none());
    }
}
