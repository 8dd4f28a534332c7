//! Spatial index over the base waypoint positions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;

// Internal
use super::{NotReady, WptUpdaterError};
use crate::path::Path;
use util::kdtree::KdTree;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Nearest neighbour index over the 2D positions of a [`Path`].
///
/// The index remembers the generation of the path it was built from, and refuses to answer
/// queries about any other path.
#[derive(Debug, Clone, Default)]
pub struct SpatialIndex {
    /// Generation and tree, `None` until the index has been built
    built: Option<(u64, KdTree)>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SpatialIndex {
    /// Build the index from the positions of the given path.
    pub fn build(path: &Path) -> Result<Self, WptUpdaterError> {
        let tree = KdTree::build(&path.positions2()).map_err(WptUpdaterError::IndexError)?;

        Ok(Self {
            built: Some((path.generation(), tree)),
        })
    }

    /// The generation of the path this index was built from, if it has been built.
    pub fn generation(&self) -> Option<u64> {
        self.built.as_ref().map(|(g, _)| *g)
    }

    /// Find the index of the waypoint in `path` nearest to `point`.
    pub fn query_nearest(&self, path: &Path, point: &Vector2<f64>) -> Result<usize, WptUpdaterError> {
        let tree = match self.built {
            Some((g, ref t)) if g == path.generation() => t,
            Some((g, _)) => {
                return Err(WptUpdaterError::NotReady(NotReady::StaleIndex {
                    index_generation: g,
                    path_generation: path.generation(),
                }))
            }
            None => return Err(WptUpdaterError::NotReady(NotReady::IndexNotBuilt)),
        };

        tree.query_nearest(point)
            .map(|n| n.index)
            .map_err(WptUpdaterError::IndexError)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::path::test::circle_wpts;

    #[test]
    fn test_not_ready() {
        let path = Path::new(3, "world", circle_wpts(20, 10.0, 5.0)).unwrap();
        let query = Vector2::new(10.0, 0.0);

        // Unbuilt
        assert!(matches!(
            SpatialIndex::default().query_nearest(&path, &query),
            Err(WptUpdaterError::NotReady(NotReady::IndexNotBuilt))
        ));

        // Built from a different generation of the path
        let old_path = Path::new(2, "world", circle_wpts(20, 10.0, 5.0)).unwrap();
        let index = SpatialIndex::build(&old_path).unwrap();
        assert_eq!(index.generation(), Some(2));
        assert!(matches!(
            index.query_nearest(&path, &query),
            Err(WptUpdaterError::NotReady(NotReady::StaleIndex {
                index_generation: 2,
                path_generation: 3
            }))
        ));
    }

    #[test]
    fn test_query_nearest() {
        let path = Path::new(0, "world", circle_wpts(36, 10.0, 5.0)).unwrap();
        let index = SpatialIndex::build(&path).unwrap();

        // Just outside each waypoint
        for (i, p) in path.positions2().iter().enumerate() {
            assert_eq!(index.query_nearest(&path, &(p * 1.05)).unwrap(), i);
        }

        assert!(matches!(
            index.query_nearest(&path, &Vector2::new(std::f64::NAN, 0.0)),
            Err(WptUpdaterError::IndexError(_))
        ));
    }
}
