//! Partition of a channel's selected key indices into maximal contiguous runs.

use crate::data::ContiguousRun;
use crate::error::TweenError;

/// Group `selected` (any order, duplicates allowed) into maximal runs of
/// adjacent indices over a curve with `key_count` keys.
///
/// Each run records the key immediately before and after it when one exists.
/// An empty selection yields no runs. Any index `>= key_count` rejects the
/// whole selection.
pub fn partition_contiguous_runs<I>(
    key_count: usize,
    selected: I,
) -> Result<Vec<ContiguousRun>, TweenError>
where
    I: IntoIterator<Item = usize>,
{
    let mut sorted: Vec<usize> = selected.into_iter().collect();
    sorted.sort_unstable();
    sorted.dedup();

    if let Some(&max) = sorted.last() {
        if max >= key_count {
            return Err(TweenError::IndexOutOfRange {
                index: max,
                len: key_count,
            });
        }
    }

    let mut runs = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    for idx in sorted {
        if let Some(&last) = current.last() {
            if idx != last + 1 {
                runs.push(close_run(std::mem::take(&mut current), key_count)?);
            }
        }
        current.push(idx);
    }
    if !current.is_empty() {
        runs.push(close_run(current, key_count)?);
    }
    Ok(runs)
}

fn close_run(indices: Vec<usize>, key_count: usize) -> Result<ContiguousRun, TweenError> {
    let first = indices[0];
    let last = indices[indices.len() - 1];
    let previous = first.checked_sub(1);
    let next = Some(last + 1).filter(|n| *n < key_count);
    ContiguousRun::new(indices, previous, next)
}
