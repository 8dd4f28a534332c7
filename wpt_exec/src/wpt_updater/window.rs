//! Extraction of the forward window of waypoints

use crate::path::{Path, Waypoint};

/// Copy up to `horizon` waypoints of `path` starting at `ahead_idx`.
///
/// The path is circular so the window wraps past its end, but never contains a waypoint twice:
/// the window length is `min(horizon, path.len())`. The returned waypoints are copies and can be
/// modified freely.
pub fn extract(path: &Path, ahead_idx: usize, horizon: usize) -> Vec<Waypoint> {
    let len = horizon.min(path.len());

    path.wpts()
        .iter()
        .cycle()
        .skip(ahead_idx % path.len())
        .take(len)
        .copied()
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::path::test::straight_wpts;

    #[test]
    fn test_window_length() {
        let path = Path::new(0, "world", straight_wpts(10, 1.0, 5.0)).unwrap();

        for ahead_idx in 0..10 {
            for horizon in 0..25 {
                assert_eq!(extract(&path, ahead_idx, horizon).len(), horizon.min(10));
            }
        }
    }

    #[test]
    fn test_window_wraps() {
        let path = Path::new(0, "world", straight_wpts(10, 1.0, 5.0)).unwrap();
        let window = extract(&path, 7, 5);

        let xs: Vec<f64> = window.iter().map(|w| w.pose.position_m[0]).collect();
        assert_eq!(xs, vec![7.0, 8.0, 9.0, 0.0, 1.0]);
    }

    #[test]
    fn test_window_is_a_copy() {
        let path = Path::new(0, "world", straight_wpts(4, 1.0, 5.0)).unwrap();
        let mut window = extract(&path, 0, 4);

        for w in window.iter_mut() {
            w.speed_ms = 0.0;
        }

        assert!(path.wpts().iter().all(|w| w.speed_ms == 5.0));
    }
}
