//! Read-only view over one run and the full key array.
//!
//! Boundary accessors never fail: a run with no key before it reports its own
//! first key as the "before" boundary, and symmetrically for "after". Blend
//! functions therefore see `before == first` at the start of a curve and become
//! inert on that side.

use crate::data::{ChannelRunSet, ContiguousRun, KeyPoint};

#[derive(Clone, Copy, Debug)]
pub struct BlendRange<'a> {
    keys: &'a [KeyPoint],
    run: &'a ContiguousRun,
}

impl<'a> BlendRange<'a> {
    /// `run` must have been validated against `keys` (see [`ChannelRunSet::new`]);
    /// outside the crate, ranges come from [`BlendRange::for_channel`].
    pub(crate) fn new(keys: &'a [KeyPoint], run: &'a ContiguousRun) -> Self {
        Self { keys, run }
    }

    /// All runs of a channel, in order.
    pub fn for_channel(set: &'a ChannelRunSet) -> impl Iterator<Item = BlendRange<'a>> + 'a {
        set.runs()
            .iter()
            .map(move |run| BlendRange::new(set.all_key_positions(), run))
    }

    #[inline]
    pub fn run(&self) -> &'a ContiguousRun {
        self.run
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.run.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.run.is_empty()
    }

    /// Index into the full key array for position `i` of the run.
    #[inline]
    pub fn key_index(&self, i: usize) -> usize {
        self.run.indices()[i]
    }

    #[inline]
    pub fn current(&self, i: usize) -> KeyPoint {
        self.keys[self.key_index(i)]
    }

    pub fn before_current(&self, i: usize) -> KeyPoint {
        if i > 0 {
            self.keys[self.key_index(i - 1)]
        } else {
            self.before_blend_range()
        }
    }

    pub fn after_current(&self, i: usize) -> KeyPoint {
        if i + 1 < self.len() {
            self.keys[self.key_index(i + 1)]
        } else {
            self.after_blend_range()
        }
    }

    #[inline]
    pub fn first_in_blend_range(&self) -> KeyPoint {
        self.keys[self.run.first_index()]
    }

    #[inline]
    pub fn last_in_blend_range(&self) -> KeyPoint {
        self.keys[self.run.last_index()]
    }

    pub fn before_blend_range(&self) -> KeyPoint {
        match self.run.previous_index() {
            Some(idx) => self.keys[idx],
            None => self.first_in_blend_range(),
        }
    }

    pub fn after_blend_range(&self) -> KeyPoint {
        match self.run.next_index() {
            Some(idx) => self.keys[idx],
            None => self.last_in_blend_range(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::partition_contiguous_runs;

    fn zigzag() -> Vec<KeyPoint> {
        [0.0, 10.0, 0.0, 10.0, 0.0]
            .iter()
            .enumerate()
            .map(|(i, y)| KeyPoint::new(i as f64, *y))
            .collect()
    }

    #[test]
    fn interior_run_accessors() {
        let keys = zigzag();
        let runs = partition_contiguous_runs(keys.len(), [1, 2, 3]).expect("partition");
        let range = BlendRange::new(&keys, &runs[0]);

        assert_eq!(range.current(0), keys[1]);
        assert_eq!(range.before_current(0), keys[0]);
        assert_eq!(range.after_current(0), keys[2]);
        assert_eq!(range.before_current(2), keys[2]);
        assert_eq!(range.after_current(2), keys[4]);
        assert_eq!(range.first_in_blend_range(), keys[1]);
        assert_eq!(range.last_in_blend_range(), keys[3]);
        assert_eq!(range.before_blend_range(), keys[0]);
        assert_eq!(range.after_blend_range(), keys[4]);
    }

    #[test]
    fn missing_neighbors_collapse_onto_run_edges() {
        let keys = zigzag();
        let runs = partition_contiguous_runs(keys.len(), [0, 1, 2, 3, 4]).expect("partition");
        let range = BlendRange::new(&keys, &runs[0]);

        assert_eq!(range.before_blend_range(), range.first_in_blend_range());
        assert_eq!(range.after_blend_range(), range.last_in_blend_range());
        assert_eq!(range.before_current(0), range.current(0));
        assert_eq!(range.after_current(4), range.current(4));
    }
}
