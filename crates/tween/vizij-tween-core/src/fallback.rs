//! Selection fallbacks used when no curve keys are selected at start.

use log::{debug, warn};

use crate::blend::functions::is_nearly_equal;
use crate::data::ChannelRunSet;
use crate::host::{CurveModel, ScrubTimeSource};
use crate::ids::ChannelId;
use crate::session::BlendSession;

/// Fills an empty session from an alternate source.
pub trait SelectionFallback<H: CurveModel> {
    fn gather(&mut self, host: &mut H, session: &mut BlendSession);
}

/// Blend the key at the scrub time on each listed channel, inserting one when
/// the curve has no key there.
pub struct InsertKeyAtScrubTime<S> {
    scrub: S,
    channels: Vec<ChannelId>,
}

impl<S: ScrubTimeSource> InsertKeyAtScrubTime<S> {
    pub fn new(scrub: S, channels: Vec<ChannelId>) -> Self {
        Self { scrub, channels }
    }
}

impl<H: CurveModel, S: ScrubTimeSource> SelectionFallback<H> for InsertKeyAtScrubTime<S> {
    fn gather(&mut self, host: &mut H, session: &mut BlendSession) {
        let time = self.scrub.current_scrub_time();
        for channel in &self.channels {
            let Some(curve) = host.find_curve(*channel) else {
                debug!("no curve for channel {channel:?}");
                continue;
            };
            let (positions, handles) = host.key_positions_and_handles(curve);
            let existing = positions.iter().position(|p| is_nearly_equal(p.x, time));
            let (positions, handles, index) = match existing {
                Some(index) => (positions, handles, index),
                None => {
                    let Some(handle) = host.insert_key(curve, time) else {
                        debug!("host cannot insert a key on channel {channel:?}");
                        continue;
                    };
                    let (positions, handles) = host.key_positions_and_handles(curve);
                    let Some(index) = handles.iter().position(|h| *h == handle) else {
                        warn!("inserted key {handle:?} missing from channel {channel:?}");
                        continue;
                    };
                    (positions, handles, index)
                }
            };
            if let Err(err) = session.append_key(*channel, curve, positions, handles, index) {
                warn!("skipping channel {channel:?}: {err}");
            }
        }
    }
}

/// Blend every key of the listed channels (e.g. all tracks bound to the
/// selected objects).
pub struct WholeChannelSelection {
    channels: Vec<ChannelId>,
}

impl WholeChannelSelection {
    pub fn new(channels: Vec<ChannelId>) -> Self {
        Self { channels }
    }
}

impl<H: CurveModel> SelectionFallback<H> for WholeChannelSelection {
    fn gather(&mut self, host: &mut H, session: &mut BlendSession) {
        for channel in &self.channels {
            let Some(curve) = host.find_curve(*channel) else {
                continue;
            };
            let (positions, handles) = host.key_positions_and_handles(curve);
            let all = 0..positions.len();
            match ChannelRunSet::from_selection(curve, positions, handles, all) {
                Ok(set) => session.insert_channel(*channel, set),
                Err(err) => warn!("skipping channel {channel:?}: {err}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScaleMode;
    use crate::memory::MemoryCurveModel;

    #[test]
    fn inserts_key_at_scrub_time() {
        let mut model = MemoryCurveModel::new();
        model.add_curve(ChannelId(0), [(0.0, 0.0), (2.0, 10.0)]);
        model.add_curve(ChannelId(1), [(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)]);

        let mut fallback =
            InsertKeyAtScrubTime::new(|| 1.0, vec![ChannelId(0), ChannelId(1), ChannelId(7)]);
        let mut session = BlendSession::new(ScaleMode::Normalized);
        fallback.gather(&mut model, &mut session);

        assert_eq!(model.values(ChannelId(0)), vec![0.0, 5.0, 10.0]);
        // Channel 1 already had a key at t=1; nothing inserted.
        assert_eq!(model.values(ChannelId(1)).len(), 3);
        assert_eq!(session.channel_ids(), vec![ChannelId(0), ChannelId(1)]);
        for (_, set) in session.channels() {
            let run = &set.runs()[0];
            assert_eq!(run.indices(), &[1]);
            assert_eq!(run.previous_index(), Some(0));
            assert_eq!(run.next_index(), Some(2));
        }
    }

    #[test]
    fn whole_channel_selects_every_key() {
        let mut model = MemoryCurveModel::new();
        model.add_curve(ChannelId(2), [(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]);
        let mut fallback = WholeChannelSelection::new(vec![ChannelId(2), ChannelId(3)]);
        let mut session = BlendSession::new(ScaleMode::Normalized);
        fallback.gather(&mut model, &mut session);
        assert_eq!(session.key_count(), 3);
        let set = session.channel(ChannelId(2)).expect("channel");
        assert_eq!(set.runs().len(), 1);
        assert_eq!(set.runs()[0].previous_index(), None);
        assert_eq!(set.runs()[0].next_index(), None);
    }
}
