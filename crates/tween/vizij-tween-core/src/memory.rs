//! In-memory curve host.
//!
//! Model:
//! - Each channel maps to one curve of ordered keys `(handle, x, y, interpolation)`.
//! - A key's interpolation governs the segment leaving it: `Linear` blends to
//!   the next key, `Constant` holds its value until the next key.
//! - Before the first key and after the last key the curve holds flat.
//!
//! Used by tests and benchmarks, and usable by hosts without their own curve store.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::blend::functions::{is_nearly_equal, lerp};
use crate::data::KeyPoint;
use crate::host::{CurveEvaluator, CurveModel, SelectionSource};
use crate::ids::{ChannelId, CurveId, IdAllocator, KeyHandle};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    #[default]
    Linear,
    Constant,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MemoryKey {
    pub handle: KeyHandle,
    pub x: f64,
    pub y: f64,
    pub interpolation: Interpolation,
}

impl MemoryKey {
    #[inline]
    pub fn position(&self) -> KeyPoint {
        KeyPoint::new(self.x, self.y)
    }
}

/// Find the segment [i, i+1] containing `x` and the local blend factor in [0, 1].
/// Outside the key range returns the edge key twice.
fn find_segment(keys: &[MemoryKey], x: f64) -> (usize, usize, f64) {
    let n = keys.len();
    if n == 1 || x <= keys[0].x {
        return (0, 0, 0.0);
    }
    if x >= keys[n - 1].x {
        return (n - 1, n - 1, 0.0);
    }
    // First key strictly after x; keys are sorted so this is the right edge.
    let right = keys.partition_point(|k| k.x <= x);
    let left = right - 1;
    let span = keys[right].x - keys[left].x;
    if span <= f64::EPSILON {
        return (left, left, 0.0);
    }
    (left, right, ((x - keys[left].x) / span).clamp(0.0, 1.0))
}

/// Sample ordered keys at `x`. `None` for empty curves or non-finite `x`.
pub fn sample_keys(keys: &[MemoryKey], x: f64) -> Option<f64> {
    if keys.is_empty() || !x.is_finite() {
        return None;
    }
    let (i0, i1, t) = find_segment(keys, x);
    if i0 == i1 {
        return Some(keys[i0].y);
    }
    let left = &keys[i0];
    let right = &keys[i1];
    Some(match left.interpolation {
        Interpolation::Linear => lerp(left.y, right.y, t),
        Interpolation::Constant => left.y,
    })
}

/// One curve in the in-memory host.
#[derive(Clone, Debug, Default)]
pub struct MemoryCurve {
    keys: Vec<MemoryKey>,
    /// When false, [`CurveModel::create_buffered_snapshot`] declines this curve.
    pub supports_snapshot: bool,
}

impl MemoryCurve {
    #[inline]
    pub fn keys(&self) -> &[MemoryKey] {
        &self.keys
    }

    pub fn values(&self) -> Vec<f64> {
        self.keys.iter().map(|k| k.y).collect()
    }

    pub fn evaluate(&self, x: f64) -> Option<f64> {
        sample_keys(&self.keys, x)
    }

    fn sort(&mut self) {
        self.keys.sort_by(|a, b| a.x.total_cmp(&b.x));
    }
}

/// Read-only copy of a curve captured for time-offset blending.
#[derive(Clone, Debug)]
pub struct BufferedCurve {
    keys: Vec<MemoryKey>,
}

impl CurveEvaluator for BufferedCurve {
    fn evaluate(&self, x: f64) -> Option<f64> {
        sample_keys(&self.keys, x)
    }
}

/// Channel-addressed collection of in-memory curves.
#[derive(Debug, Default)]
pub struct MemoryCurveModel {
    ids: IdAllocator,
    channels: IndexMap<ChannelId, CurveId>,
    curves: IndexMap<CurveId, MemoryCurve>,
    commits: usize,
}

impl MemoryCurveModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a linear curve for `channel` from `(x, y)` pairs (sorted by x on insert).
    pub fn add_curve<I, P>(&mut self, channel: ChannelId, points: I) -> CurveId
    where
        I: IntoIterator<Item = P>,
        P: Into<KeyPoint>,
    {
        self.add_curve_with(channel, points, Interpolation::Linear)
    }

    /// Add a curve with one interpolation for every key. Replaces any curve
    /// already bound to `channel`.
    pub fn add_curve_with<I, P>(
        &mut self,
        channel: ChannelId,
        points: I,
        interpolation: Interpolation,
    ) -> CurveId
    where
        I: IntoIterator<Item = P>,
        P: Into<KeyPoint>,
    {
        let curve_id = self.ids.alloc_curve();
        let mut curve = MemoryCurve {
            keys: Vec::new(),
            supports_snapshot: true,
        };
        for p in points {
            let p = p.into();
            curve.keys.push(MemoryKey {
                handle: self.ids.alloc_key(),
                x: p.x,
                y: p.y,
                interpolation,
            });
        }
        curve.sort();
        if let Some(replaced) = self.channels.insert(channel, curve_id) {
            self.curves.shift_remove(&replaced);
        }
        self.curves.insert(curve_id, curve);
        curve_id
    }

    pub fn curve(&self, channel: ChannelId) -> Option<&MemoryCurve> {
        self.channels
            .get(&channel)
            .and_then(|id| self.curves.get(id))
    }

    pub fn curve_mut(&mut self, channel: ChannelId) -> Option<&mut MemoryCurve> {
        match self.channels.get(&channel) {
            Some(id) => self.curves.get_mut(id),
            None => None,
        }
    }

    /// Key values of a channel, in key order. Empty when the channel is unknown.
    pub fn values(&self, channel: ChannelId) -> Vec<f64> {
        self.curve(channel).map(MemoryCurve::values).unwrap_or_default()
    }

    /// Number of `set_key_positions` calls received so far.
    #[inline]
    pub fn commit_count(&self) -> usize {
        self.commits
    }
}

impl CurveModel for MemoryCurveModel {
    fn find_curve(&self, channel: ChannelId) -> Option<CurveId> {
        self.channels.get(&channel).copied()
    }

    fn key_positions_and_handles(&self, curve: CurveId) -> (Vec<KeyPoint>, Vec<KeyHandle>) {
        match self.curves.get(&curve) {
            Some(c) => c.keys.iter().map(|k| (k.position(), k.handle)).unzip(),
            None => (Vec::new(), Vec::new()),
        }
    }

    fn set_key_positions(&mut self, curve: CurveId, handles: &[KeyHandle], positions: &[KeyPoint]) {
        let Some(c) = self.curves.get_mut(&curve) else {
            return;
        };
        self.commits += 1;
        for (handle, pos) in handles.iter().zip(positions.iter()) {
            if let Some(key) = c.keys.iter_mut().find(|k| k.handle == *handle) {
                key.x = pos.x;
                key.y = pos.y;
            }
        }
        c.sort();
    }

    fn create_buffered_snapshot(&self, curve: CurveId) -> Option<Box<dyn CurveEvaluator>> {
        let c = self.curves.get(&curve)?;
        if !c.supports_snapshot {
            return None;
        }
        Some(Box::new(BufferedCurve {
            keys: c.keys.clone(),
        }))
    }

    fn insert_key(&mut self, curve: CurveId, x: f64) -> Option<KeyHandle> {
        if !x.is_finite() {
            return None;
        }
        let c = self.curves.get_mut(&curve)?;
        if let Some(existing) = c.keys.iter().find(|k| is_nearly_equal(k.x, x)) {
            return Some(existing.handle);
        }
        let y = sample_keys(&c.keys, x).unwrap_or(0.0);
        let interpolation = c
            .keys
            .iter()
            .rev()
            .find(|k| k.x < x)
            .or_else(|| c.keys.first())
            .map(|k| k.interpolation)
            .unwrap_or_default();
        let handle = self.ids.alloc_key();
        c.keys.push(MemoryKey {
            handle,
            x,
            y,
            interpolation,
        });
        c.sort();
        Some(handle)
    }
}

/// Fixed selection, e.g. built by a test or by an adapter from UI state.
#[derive(Clone, Debug, Default)]
pub struct StaticSelection {
    pub selected: IndexMap<ChannelId, BTreeSet<usize>>,
}

impl StaticSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel<I>(mut self, channel: ChannelId, indices: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        self.selected
            .entry(channel)
            .or_default()
            .extend(indices);
        self
    }
}

impl SelectionSource for StaticSelection {
    fn selected_key_indices(&self) -> IndexMap<ChannelId, BTreeSet<usize>> {
        self.selected.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) {
        assert!((a - b).abs() <= 1e-9, "left={a} right={b}");
    }

    #[test]
    fn samples_linear_and_holds_at_edges() {
        let mut model = MemoryCurveModel::new();
        let ch = ChannelId(0);
        model.add_curve(ch, [(2.0, 4.0), (0.0, 0.0), (4.0, 0.0)]);
        let curve = model.curve(ch).expect("curve");
        approx(curve.evaluate(1.0).unwrap(), 2.0);
        approx(curve.evaluate(3.0).unwrap(), 2.0);
        approx(curve.evaluate(-1.0).unwrap(), 0.0);
        approx(curve.evaluate(9.0).unwrap(), 0.0);
        assert!(curve.evaluate(f64::NAN).is_none());
        assert!(MemoryCurve::default().evaluate(0.0).is_none());
    }

    #[test]
    fn constant_segments_hold_left_value() {
        let mut model = MemoryCurveModel::new();
        let ch = ChannelId(0);
        model.add_curve_with(ch, [(0.0, 1.0), (1.0, 5.0)], Interpolation::Constant);
        approx(model.curve(ch).unwrap().evaluate(0.99).unwrap(), 1.0);
        approx(model.curve(ch).unwrap().evaluate(1.0).unwrap(), 5.0);
    }

    #[test]
    fn re_adding_a_channel_replaces_its_curve() {
        let mut model = MemoryCurveModel::new();
        let ch = ChannelId(1);
        let old = model.add_curve(ch, [(0.0, 0.0), (1.0, 1.0)]);
        let new = model.add_curve(ch, [(0.0, 3.0)]);
        assert_ne!(old, new);
        assert_eq!(model.find_curve(ch), Some(new));
        assert_eq!(model.curves.len(), 1);
        assert!(model.key_positions_and_handles(old).0.is_empty());
        assert_eq!(model.values(ch), vec![3.0]);
    }

    #[test]
    fn commits_update_by_handle() {
        let mut model = MemoryCurveModel::new();
        let ch = ChannelId(3);
        let curve = model.add_curve(ch, [(0.0, 0.0), (1.0, 1.0)]);
        let (positions, handles) = model.key_positions_and_handles(curve);
        model.set_key_positions(curve, &handles[1..], &[positions[1].with_y(7.0)]);
        assert_eq!(model.values(ch), vec![0.0, 7.0]);
        assert_eq!(model.commit_count(), 1);
    }

    #[test]
    fn insert_key_samples_curve_or_reuses_existing() {
        let mut model = MemoryCurveModel::new();
        let ch = ChannelId(0);
        let curve = model.add_curve(ch, [(0.0, 0.0), (2.0, 10.0)]);
        let inserted = model.insert_key(curve, 1.0).expect("insert");
        assert_eq!(model.values(ch), vec![0.0, 5.0, 10.0]);
        let (_, handles) = model.key_positions_and_handles(curve);
        assert_eq!(handles[1], inserted);

        let existing = model.insert_key(curve, 2.0).expect("existing");
        assert_eq!(existing, handles[2]);
        assert_eq!(model.values(ch).len(), 3);
    }

    #[test]
    fn snapshot_is_independent_of_later_edits() {
        let mut model = MemoryCurveModel::new();
        let ch = ChannelId(0);
        let curve = model.add_curve(ch, [(0.0, 0.0), (2.0, 10.0)]);
        let snapshot = model.create_buffered_snapshot(curve).expect("snapshot");
        let (positions, handles) = model.key_positions_and_handles(curve);
        model.set_key_positions(curve, &handles, &[positions[0], positions[1].with_y(0.0)]);
        approx(snapshot.evaluate(1.0).unwrap(), 5.0);

        model.curve_mut(ch).unwrap().supports_snapshot = false;
        assert!(model.create_buffered_snapshot(curve).is_none());
    }
}
