//! Key, run, and per-channel data consumed by the blend functions.

use serde::{Deserialize, Serialize};

use crate::error::TweenError;
use crate::ids::{CurveId, KeyHandle};
use crate::partition::partition_contiguous_runs;

/// A single key sample: time (or frame) and value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyPoint {
    pub x: f64,
    pub y: f64,
}

impl KeyPoint {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Same time, different value.
    #[inline]
    pub fn with_y(self, y: f64) -> Self {
        Self { x: self.x, y }
    }
}

impl From<(f64, f64)> for KeyPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// A maximal run of adjacent selected key indices plus its boundary neighbors.
///
/// Invariants (checked by [`ContiguousRun::new`]):
/// - `indices` is non-empty and each entry is exactly one past the previous.
/// - `previous_index`, when present, equals `indices[0] - 1`.
/// - `next_index`, when present, equals `indices[last] + 1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContiguousRun {
    indices: Vec<usize>,
    previous_index: Option<usize>,
    next_index: Option<usize>,
}

impl ContiguousRun {
    pub fn new(
        indices: Vec<usize>,
        previous_index: Option<usize>,
        next_index: Option<usize>,
    ) -> Result<Self, TweenError> {
        let (first, last) = match (indices.first(), indices.last()) {
            (Some(f), Some(l)) => (*f, *l),
            _ => return Err(TweenError::NonContiguousRun { index: 0 }),
        };
        if let Some(pos) = indices.windows(2).position(|w| w[1] != w[0] + 1) {
            return Err(TweenError::NonContiguousRun {
                index: indices[pos + 1],
            });
        }
        if let Some(prev) = previous_index {
            if prev + 1 != first {
                return Err(TweenError::InvalidBoundary {
                    boundary: prev,
                    edge: first,
                });
            }
        }
        if let Some(next) = next_index {
            if next != last + 1 {
                return Err(TweenError::InvalidBoundary {
                    boundary: next,
                    edge: last,
                });
            }
        }
        Ok(Self {
            indices,
            previous_index,
            next_index,
        })
    }

    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    #[inline]
    pub fn previous_index(&self) -> Option<usize> {
        self.previous_index
    }

    #[inline]
    pub fn next_index(&self) -> Option<usize> {
        self.next_index
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Always false for a constructed run; present for API symmetry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[inline]
    pub fn first_index(&self) -> usize {
        self.indices[0]
    }

    #[inline]
    pub fn last_index(&self) -> usize {
        self.indices[self.indices.len() - 1]
    }

    /// Highest index this run references, boundaries included.
    fn max_referenced(&self) -> usize {
        self.next_index.unwrap_or_else(|| self.last_index())
    }
}

/// Start-of-session copy of one curve's keys plus the selected runs over them.
#[derive(Clone, Debug)]
pub struct ChannelRunSet {
    curve: CurveId,
    all_key_positions: Vec<KeyPoint>,
    all_key_handles: Vec<KeyHandle>,
    runs: Vec<ContiguousRun>,
}

impl ChannelRunSet {
    pub fn new(
        curve: CurveId,
        all_key_positions: Vec<KeyPoint>,
        all_key_handles: Vec<KeyHandle>,
        runs: Vec<ContiguousRun>,
    ) -> Result<Self, TweenError> {
        if all_key_positions.len() != all_key_handles.len() {
            return Err(TweenError::MismatchedKeyArrays {
                positions: all_key_positions.len(),
                handles: all_key_handles.len(),
            });
        }
        let len = all_key_positions.len();
        if let Some(run) = runs.iter().find(|r| r.max_referenced() >= len) {
            return Err(TweenError::IndexOutOfRange {
                index: run.max_referenced(),
                len,
            });
        }
        Ok(Self {
            curve,
            all_key_positions,
            all_key_handles,
            runs,
        })
    }

    /// Build from a host selection: partitions `selected` into contiguous runs.
    pub fn from_selection<I>(
        curve: CurveId,
        all_key_positions: Vec<KeyPoint>,
        all_key_handles: Vec<KeyHandle>,
        selected: I,
    ) -> Result<Self, TweenError>
    where
        I: IntoIterator<Item = usize>,
    {
        let runs = partition_contiguous_runs(all_key_positions.len(), selected)?;
        Self::new(curve, all_key_positions, all_key_handles, runs)
    }

    /// Adopt refreshed key arrays after the host inserted a key at `inserted_index`,
    /// and add that key to the selection.
    ///
    /// Previously selected indices at or after the insertion point shift up by one.
    pub fn append(
        &mut self,
        all_key_positions: Vec<KeyPoint>,
        all_key_handles: Vec<KeyHandle>,
        inserted_index: usize,
    ) -> Result<(), TweenError> {
        let grew = all_key_positions.len() > self.all_key_positions.len();
        let mut selected: Vec<usize> = self
            .selected_indices()
            .map(|idx| {
                if grew && idx >= inserted_index {
                    idx + 1
                } else {
                    idx
                }
            })
            .collect();
        selected.push(inserted_index);
        *self = Self::from_selection(self.curve, all_key_positions, all_key_handles, selected)?;
        Ok(())
    }

    #[inline]
    pub fn curve(&self) -> CurveId {
        self.curve
    }

    #[inline]
    pub fn all_key_positions(&self) -> &[KeyPoint] {
        &self.all_key_positions
    }

    #[inline]
    pub fn all_key_handles(&self) -> &[KeyHandle] {
        &self.all_key_handles
    }

    #[inline]
    pub fn runs(&self) -> &[ContiguousRun] {
        &self.runs
    }

    /// True when no run references any key (channel takes no part in blending).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// All selected indices in ascending order.
    pub fn selected_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.runs.iter().flat_map(|r| r.indices().iter().copied())
    }
}

/// One key write produced by a blend tick. Applied immediately, never stored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlendOutcome {
    pub handle: KeyHandle,
    pub new_value: f64,
}
