//! Pure blend functions over 2-5 key samples.
//!
//! Every function takes an already-scaled blend value `b` (see
//! [`ScaleMode`](crate::config::ScaleMode)) and returns the new value for the
//! current key. All math is f64 so repeated per-frame evaluation during a drag
//! does not accumulate error. Degenerate inputs return the current value.

use crate::data::KeyPoint;
use crate::error::TweenError;

/// Tolerance for "nearly zero" / "nearly equal" comparisons.
pub const SMALL_NUMBER: f64 = 1e-8;

/// S-curve steepness per unit of |b| used by [`ease`].
const EASE_SLOPE_SCALE: f64 = 5.0;

#[inline]
pub fn is_nearly_zero(v: f64) -> bool {
    v.abs() <= SMALL_NUMBER
}

#[inline]
pub fn is_nearly_equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= SMALL_NUMBER
}

/// Linear interpolation of scalars.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Position of `current` between `before` and `after` along x, in [0, 1] for
/// keys inside the range.
pub fn normalized_ratio(
    before: KeyPoint,
    current: KeyPoint,
    after: KeyPoint,
) -> Result<f64, TweenError> {
    let span = after.x - before.x;
    if is_nearly_zero(span) {
        return Err(TweenError::DegenerateGeometry { span });
    }
    Ok((current.x - before.x) / span)
}

/// Pull toward the previous key's value for `b < 0`, the next key's for `b >= 0`.
pub fn neighbor(b: f64, before: KeyPoint, current: KeyPoint, after: KeyPoint) -> f64 {
    if b < 0.0 {
        lerp(current.y, before.y, -b)
    } else {
        lerp(current.y, after.y, b)
    }
}

/// Pull toward (`b < 0`) or push away from (`b >= 0`) the straight line between
/// the boundary keys.
pub fn push_pull(b: f64, before: KeyPoint, current: KeyPoint, after: KeyPoint) -> f64 {
    let t = match normalized_ratio(before, current, after) {
        Ok(t) => t,
        Err(_) => return current.y,
    };
    let value_at_t = lerp(before.y, after.y, t);
    if b < 0.0 {
        lerp(current.y, value_at_t, -b)
    } else {
        current.y + b * (current.y - value_at_t)
    }
}

/// Logistic-like S-curve over `[x_shift, x_shift + width]`, mapping onto
/// `[y_shift, y_shift + height]`. Clamps outside the domain.
pub fn s_curve(x: f64, slope: f64, width: f64, height: f64, x_shift: f64, y_shift: f64) -> f64 {
    if x > x_shift + width {
        return height + y_shift;
    }
    if x < x_shift {
        return y_shift;
    }
    let u = x - x_shift;
    let rising = u.powf(slope);
    let falling = (width - u).powf(slope);
    height * (rising / (rising + falling)) + y_shift
}

/// Ease toward the next boundary (`b > 0`) or away from the previous one
/// (`b <= 0`), weighted by an S-curve whose steepness grows with |b|.
pub fn ease(b: f64, before: KeyPoint, current: KeyPoint, after: KeyPoint) -> f64 {
    let ratio = match normalized_ratio(before, current, after) {
        Ok(r) => r,
        Err(_) => return current.y,
    };
    let slope = EASE_SLOPE_SCALE * b.abs();
    let shift = if b > 0.0 { -1.0 } else { 0.0 };
    let s = s_curve(ratio, slope, 2.0, 2.0, shift, shift);
    if b > 0.0 {
        // s is 0 at b -> 0+, so the key stays put.
        current.y + (after.y - current.y) * s
    } else {
        // s is 1 at b == 0; written so the identity case is exact.
        current.y - (current.y - before.y) * (1.0 - s)
    }
}

/// Translate the current key by the offset that would make the run's edge
/// match its boundary neighbor.
pub fn relative(
    b: f64,
    before: KeyPoint,
    first_in_run: KeyPoint,
    current: KeyPoint,
    last_in_run: KeyPoint,
    after: KeyPoint,
) -> f64 {
    if b < 0.0 {
        current.y - b * (before.y - first_in_run.y)
    } else {
        current.y + b * (after.y - last_in_run.y)
    }
}

/// Smooth toward the 1-2-1 weighted average of the neighborhood (`b < 0`) or
/// exaggerate the deviation from it (`b >= 0`).
pub fn smooth_rough(
    b: f64,
    before_current: KeyPoint,
    current: KeyPoint,
    after_current: KeyPoint,
) -> f64 {
    let smoothed = 0.25 * before_current.y + 0.5 * current.y + 0.25 * after_current.y;
    if b < 0.0 {
        lerp(current.y, smoothed, -b)
    } else {
        current.y + b * (current.y - smoothed)
    }
}

/// Interpolate between the boundary values; -1 is `before`, +1 is `after`.
/// The current key's value plays no part.
pub fn controls_to_tween(b: f64, before: KeyPoint, after: KeyPoint) -> f64 {
    let t = (b + 1.0) * 0.5;
    if t == 0.0 {
        before.y
    } else if t == 1.0 {
        after.y
    } else {
        lerp(before.y, after.y, t)
    }
}

/// Slide the run in time by `b` run-lengths, sampling the pre-blend curve via
/// `evaluate`. Past the run edges the value tweens toward the boundary key.
pub fn offset_time<F>(
    b: f64,
    current: KeyPoint,
    first_in_run: KeyPoint,
    last_in_run: KeyPoint,
    before: KeyPoint,
    after: KeyPoint,
    evaluate: F,
) -> f64
where
    F: Fn(f64) -> f64,
{
    if is_nearly_zero(b) {
        return current.y;
    }
    let period = last_in_run.x - first_in_run.x;
    let shifted_x = current.x - period * b;

    if shifted_x > last_in_run.x {
        let t = edge_blend_value(shifted_x - last_in_run.x, after.x - last_in_run.x);
        controls_to_tween(t, last_in_run, after)
    } else if shifted_x < first_in_run.x {
        let t = edge_blend_value(first_in_run.x - shifted_x, first_in_run.x - before.x);
        // Mirrored: zero excess sits on the run edge (+1), full excess on `before` (-1).
        controls_to_tween(-t, before, first_in_run)
    } else {
        evaluate(shifted_x)
    }
}

/// Map how far past an edge we are into [-1, 1]; a zero-width gap saturates.
fn edge_blend_value(exceed: f64, edge_gap: f64) -> f64 {
    let ratio = if is_nearly_zero(edge_gap) {
        1.0
    } else {
        (exceed / edge_gap).clamp(0.0, 1.0)
    };
    2.0 * ratio - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) {
        assert!((a - b).abs() <= 1e-9, "left={a} right={b}");
    }

    const BEFORE: KeyPoint = KeyPoint::new(0.0, 2.0);
    const CURRENT: KeyPoint = KeyPoint::new(1.0, 6.0);
    const AFTER: KeyPoint = KeyPoint::new(4.0, -4.0);

    #[test]
    fn neighbor_moves_toward_each_side() {
        approx(neighbor(0.0, BEFORE, CURRENT, AFTER), 6.0);
        approx(neighbor(-1.0, BEFORE, CURRENT, AFTER), 2.0);
        approx(neighbor(-0.5, BEFORE, CURRENT, AFTER), 4.0);
        approx(neighbor(0.5, BEFORE, CURRENT, AFTER), 1.0);
        approx(neighbor(1.0, BEFORE, CURRENT, AFTER), -4.0);
    }

    #[test]
    fn push_pull_uses_boundary_line() {
        // Line value at x=1 is 2 + (-6) * 0.25 = 0.5.
        approx(push_pull(-1.0, BEFORE, CURRENT, AFTER), 0.5);
        approx(push_pull(-0.5, BEFORE, CURRENT, AFTER), 3.25);
        approx(push_pull(1.0, BEFORE, CURRENT, AFTER), 11.5);
        approx(push_pull(0.0, BEFORE, CURRENT, AFTER), 6.0);
    }

    #[test]
    fn degenerate_span_returns_current() {
        let before = KeyPoint::new(3.0, 1.0);
        let after = KeyPoint::new(3.0, 9.0);
        let current = KeyPoint::new(3.0, 4.0);
        for b in [-2.0, -1.0, -0.3, 0.0, 0.7, 1.0, 2.0] {
            assert_eq!(push_pull(b, before, current, after), 4.0);
            assert_eq!(ease(b, before, current, after), 4.0);
        }
        assert!(matches!(
            normalized_ratio(before, current, after),
            Err(TweenError::DegenerateGeometry { .. })
        ));
    }

    #[test]
    fn s_curve_endpoints_and_clamping() {
        approx(s_curve(0.0, 3.0, 2.0, 2.0, 0.0, 0.0), 0.0);
        approx(s_curve(1.0, 3.0, 2.0, 2.0, 0.0, 0.0), 1.0);
        approx(s_curve(2.0, 3.0, 2.0, 2.0, 0.0, 0.0), 2.0);
        approx(s_curve(-5.0, 3.0, 2.0, 2.0, 0.0, 0.0), 0.0);
        approx(s_curve(5.0, 3.0, 2.0, 2.0, 0.0, 0.0), 2.0);
        approx(s_curve(0.0, 3.0, 2.0, 2.0, -1.0, -1.0), 0.0);
        approx(s_curve(1.0, 3.0, 2.0, 2.0, -1.0, -1.0), 1.0);
    }

    #[test]
    fn ease_is_identity_at_zero_and_bounded() {
        assert_eq!(ease(0.0, BEFORE, CURRENT, AFTER), CURRENT.y);
        // Positive: between current and after. Negative: between before and current.
        let pos = ease(1.0, BEFORE, CURRENT, AFTER);
        assert!(pos <= CURRENT.y && pos >= AFTER.y, "pos={pos}");
        let neg = ease(-1.0, BEFORE, CURRENT, AFTER);
        assert!(neg <= CURRENT.y && neg >= BEFORE.y, "neg={neg}");
        // Stronger blends move further.
        assert!(ease(1.0, BEFORE, CURRENT, AFTER) < ease(0.2, BEFORE, CURRENT, AFTER));
    }

    #[test]
    fn relative_translates_by_edge_offset() {
        let first = KeyPoint::new(1.0, 5.0);
        let last = KeyPoint::new(3.0, 7.0);
        // before.y - first.y = -3, after.y - last.y = -11
        approx(relative(-1.0, BEFORE, first, CURRENT, last, AFTER), 3.0);
        approx(relative(0.5, BEFORE, first, CURRENT, last, AFTER), 0.5);
        approx(relative(0.0, BEFORE, first, CURRENT, last, AFTER), 6.0);
    }

    #[test]
    fn smooth_rough_both_directions() {
        // smoothed = 0.5 + 3.0 - 1.0 = 2.5
        approx(smooth_rough(-1.0, BEFORE, CURRENT, AFTER), 2.5);
        approx(smooth_rough(1.0, BEFORE, CURRENT, AFTER), 9.5);
        approx(smooth_rough(0.0, BEFORE, CURRENT, AFTER), 6.0);
    }

    #[test]
    fn controls_to_tween_endpoints_exact() {
        let before = KeyPoint::new(0.0, 0.1);
        let after = KeyPoint::new(1.0, 0.7);
        assert_eq!(controls_to_tween(-1.0, before, after), 0.1);
        assert_eq!(controls_to_tween(1.0, before, after), 0.7);
        approx(controls_to_tween(0.0, before, after), 0.4);
    }

    #[test]
    fn offset_time_zero_is_exact_noop() {
        let first = KeyPoint::new(1.0, 5.0);
        let last = KeyPoint::new(3.0, 7.0);
        let v = offset_time(0.0, CURRENT, first, last, BEFORE, AFTER, |_| f64::NAN);
        assert_eq!(v, CURRENT.y);
    }

    #[test]
    fn offset_time_samples_inside_and_tweens_outside() {
        let before = KeyPoint::new(0.0, 0.0);
        let first = KeyPoint::new(1.0, 10.0);
        let current = KeyPoint::new(2.0, 0.0);
        let last = KeyPoint::new(3.0, 10.0);
        let after = KeyPoint::new(4.0, 0.0);
        let sample = |x: f64| x * 100.0;

        // period 2, b 0.25 -> shifted 1.5 (inside)
        approx(offset_time(0.25, current, first, last, before, after, sample), 150.0);
        // b 1.0 -> shifted 0.0, one full gap before the run: lands on `before`.
        approx(offset_time(1.0, current, first, last, before, after, sample), 0.0);
        // b 0.75 -> shifted 0.5, half a gap before: midway between before and first.
        approx(offset_time(0.75, current, first, last, before, after, sample), 5.0);
        // b -1.0 -> shifted 4.0, one gap past: lands on `after`.
        approx(offset_time(-1.0, current, first, last, before, after, sample), 0.0);
        // b -0.75 -> shifted 3.5: midway between last and after.
        approx(offset_time(-0.75, current, first, last, before, after, sample), 5.0);
    }

    #[test]
    fn offset_time_collapsed_edge_holds_edge_value() {
        let first = KeyPoint::new(0.0, 3.0);
        let current = KeyPoint::new(1.0, 4.0);
        let last = KeyPoint::new(2.0, 5.0);
        // No neighbors: boundaries collapse onto the run edges.
        let v = offset_time(0.75, current, first, last, first, last, |_| f64::NAN);
        approx(v, 3.0);
        let v = offset_time(-0.75, current, first, last, first, last, |_| f64::NAN);
        approx(v, 5.0);
    }
}
