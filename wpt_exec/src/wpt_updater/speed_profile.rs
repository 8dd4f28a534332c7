//! Speed profile for stopping at a stop line
//!
//! When a stop line lies inside the window the vehicle should come to rest
//! `stop_safety_offset_wpts` waypoints before it. The target speed at each waypoint is
//! proportional to the path length remaining to that stop point:
//!
//! ```text
//! v_i = min(max_decel * distance(i, stop), v_base_i)
//! ```
//!
//! Speeds below `stop_speed_threshold_ms` are snapped to zero, as are the speeds at and beyond
//! the stop point.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::Params;
use crate::path::{cumulative_distance, Waypoint};
use util::maths::circular_offset;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Rewrite the speeds in `window` to stop before `stop_line_idx`.
///
/// `window` must start at the base waypoint `ahead_idx` of a path of length `path_len`, as
/// produced by [`super::window::extract`]. If there is no stop line, or the stop line is beyond
/// the end of the window, the window is left untouched and `None` is returned. Otherwise the
/// index within the window at which the vehicle stops is returned.
///
/// A stop line behind the vehicle stops it immediately, unless the window wraps past the end of
/// the path and the stop line is in the wrapped part.
pub fn profile(
    window: &mut [Waypoint],
    ahead_idx: usize,
    stop_line_idx: Option<usize>,
    path_len: usize,
    params: &Params,
) -> Option<usize> {
    let stop_offset = stop_offset(window.len(), ahead_idx, stop_line_idx?, path_len)?;

    let stop_local = stop_offset.saturating_sub(params.stop_safety_offset_wpts);
    decelerate(window, stop_local, params);

    Some(stop_local)
}

/// Offset of the stop line from the start of the window, or `None` if it's beyond the window.
fn stop_offset(
    window_len: usize,
    ahead_idx: usize,
    stop_line_idx: usize,
    path_len: usize,
) -> Option<usize> {
    let window_end = ahead_idx + window_len;

    if stop_line_idx >= ahead_idx {
        if stop_line_idx >= window_end {
            None
        } else {
            Some(stop_line_idx - ahead_idx)
        }
    } else if window_end > path_len && stop_line_idx < window_end - path_len {
        Some(circular_offset(ahead_idx, stop_line_idx, path_len))
    } else {
        // Already past the line
        Some(0)
    }
}

/// Ramp the speeds in `window` down to zero at `stop_local`.
pub fn decelerate(window: &mut [Waypoint], stop_local: usize, params: &Params) {
    for i in 0..window.len() {
        let target = if i >= stop_local {
            0.0
        } else {
            let v = params.max_decel * cumulative_distance(window, i, stop_local);
            if v < params.stop_speed_threshold_ms {
                0.0
            } else {
                v
            }
        };

        window[i].speed_ms = target.min(window[i].speed_ms);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::path::test::straight_wpts;

    fn speeds(window: &[Waypoint]) -> Vec<f64> {
        window.iter().map(|w| w.speed_ms).collect()
    }

    fn test_params() -> Params {
        Params {
            lookahead_wpts: 10,
            max_decel: 1.0,
            stop_safety_offset_wpts: 0,
            stop_speed_threshold_ms: 1.0,
        }
    }

    #[test]
    fn test_stop_scenario() {
        let mut window = straight_wpts(10, 1.0, 5.0);

        let stop_local = profile(&mut window, 0, Some(6), 10, &test_params());

        assert_eq!(stop_local, Some(6));
        assert_eq!(
            speeds(&window),
            vec![5.0, 5.0, 4.0, 3.0, 2.0, 1.0, 0.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_safety_offset() {
        let mut window = straight_wpts(10, 1.0, 5.0);
        let params = Params {
            stop_safety_offset_wpts: 3,
            ..test_params()
        };

        assert_eq!(profile(&mut window, 0, Some(6), 10, &params), Some(3));
        assert_eq!(
            speeds(&window),
            vec![3.0, 2.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
        );

        // Offset larger than the distance to the line stops immediately
        let mut window = straight_wpts(10, 1.0, 5.0);
        assert_eq!(profile(&mut window, 0, Some(2), 10, &params), Some(0));
        assert!(speeds(&window).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_cruise_pass_through() {
        let base = straight_wpts(10, 1.0, 5.0);

        // No stop line
        let mut window = base.clone();
        assert_eq!(profile(&mut window, 0, None, 10, &test_params()), None);
        assert_eq!(window, base);

        // Stop line beyond the window
        let mut window = base[..5].to_vec();
        assert_eq!(profile(&mut window, 0, Some(7), 10, &test_params()), None);
        assert_eq!(window, base[..5].to_vec());
    }

    #[test]
    fn test_stop_line_behind() {
        // Vehicle one waypoint past the line
        let mut window = straight_wpts(10, 1.0, 5.0);
        assert_eq!(profile(&mut window, 50, Some(49), 100, &test_params()), Some(0));
        assert!(speeds(&window).iter().all(|&v| v == 0.0));

        // Well past the line
        let mut window = straight_wpts(5, 1.0, 5.0);
        assert_eq!(profile(&mut window, 5, Some(2), 20, &test_params()), Some(0));
        assert!(speeds(&window).iter().all(|&v| v == 0.0));

        // Window wraps past the end of the path but the line is before the vehicle
        let mut window = straight_wpts(10, 1.0, 5.0);
        assert_eq!(profile(&mut window, 18, Some(12), 20, &test_params()), Some(0));
        assert!(speeds(&window).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_stop_line_across_wrap() {
        // Window starting at base index 18 of a 20 waypoint path, stop line at base index 3
        let mut window = straight_wpts(10, 1.0, 5.0);

        assert_eq!(profile(&mut window, 18, Some(3), 20, &test_params()), Some(5));
        assert_eq!(speeds(&window)[4], 1.0);
        assert_eq!(speeds(&window)[5], 0.0);
    }

    #[test]
    fn test_speed_ceiling_and_monotonicity() {
        // Varying base speeds and uneven spacing
        let mut window = straight_wpts(30, 1.0, 0.0);
        for (i, w) in window.iter_mut().enumerate() {
            w.pose.position_m[0] = (i * i) as f64 * 0.1;
            w.speed_ms = 8.0 + (i as f64 * 0.7).sin() * 3.0;
        }
        let base = window.clone();
        let params = Params {
            max_decel: 0.75,
            stop_safety_offset_wpts: 3,
            ..test_params()
        };

        let stop_local = profile(&mut window, 0, Some(25), 100, &params).unwrap();
        assert_eq!(stop_local, 22);

        for (w, b) in window.iter().zip(base.iter()) {
            assert!(w.speed_ms <= b.speed_ms);
        }

        // The ramp itself never increases toward the stop point
        let mut ramp = base.clone();
        for w in ramp.iter_mut() {
            w.speed_ms = std::f64::INFINITY;
        }
        decelerate(&mut ramp, stop_local, &params);
        for pair in speeds(&ramp).windows(2) {
            assert!(pair[1] <= pair[0]);
        }

        assert!(speeds(&window)[stop_local..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_threshold() {
        let mut window = straight_wpts(10, 0.5, 5.0);
        let params = Params {
            stop_speed_threshold_ms: 1.2,
            ..test_params()
        };

        decelerate(&mut window, 4, &params);

        // Remaining distances are 2.0, 1.5, 1.0, 0.5
        assert_eq!(speeds(&window)[..5], [2.0, 1.5, 0.0, 0.0, 0.0]);
    }
}
