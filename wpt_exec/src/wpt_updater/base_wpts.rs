//! Base waypoints held together with their spatial index

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{SpatialIndex, WptUpdaterError};
use crate::path::Path;
use comms_if::wpt::Lane;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The base waypoints and the spatial index built from them.
///
/// The two are only ever created together, so a holder of a `BaseWaypoints` (usually behind an
/// `Arc`) always sees a path and an index of the same generation.
#[derive(Debug, Clone)]
pub struct BaseWaypoints {
    path: Path,
    index: SpatialIndex,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl BaseWaypoints {
    /// Validate a received lane and build its spatial index.
    pub fn from_lane(generation: u64, lane: &Lane) -> Result<Self, WptUpdaterError> {
        let path = Path::from_lane(generation, lane).map_err(WptUpdaterError::InvalidPath)?;
        Self::from_path(path)
    }

    /// Build the spatial index for an existing path.
    pub fn from_path(path: Path) -> Result<Self, WptUpdaterError> {
        let index = SpatialIndex::build(&path)?;
        Ok(Self { path, index })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn generation(&self) -> u64 {
        self.path.generation()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::path::{test::straight_wpts, PathError};
    use comms_if::wpt::WaypointMsg;

    #[test]
    fn test_from_lane() {
        let lane = Lane::new(
            "world",
            straight_wpts(5, 1.0, 5.0).iter().map(WaypointMsg::from).collect(),
        );
        let base = BaseWaypoints::from_lane(4, &lane).unwrap();

        assert_eq!(base.generation(), 4);
        assert_eq!(base.index().generation(), Some(4));
        assert_eq!(base.path().len(), 5);
    }

    #[test]
    fn test_degenerate_lane() {
        let lane = Lane::new(
            "world",
            straight_wpts(1, 1.0, 5.0).iter().map(WaypointMsg::from).collect(),
        );

        assert!(matches!(
            BaseWaypoints::from_lane(0, &lane),
            Err(WptUpdaterError::InvalidPath(PathError::TooFewWaypoints(1)))
        ));
    }
}
