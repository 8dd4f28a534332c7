//! # 2D KD-Tree Implementation
//!
//! This is an implementation of a 2 dimensional k-d tree, as described in [the wikipedia
//! article](https://en.wikipedia.org/wiki/K-d_tree), supporting nearest neighbour queries.
//!
//! The tree is built once from a set of points by recursively splitting the set about the median
//! along alternating axes, which gives a balanced tree in O(n log n). Each point keeps the index
//! it had in the source slice, so queries return that index rather than the point itself.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use nalgebra::Vector2;

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Number of dimensions of the tree
pub const NUM_DIMS: usize = 2;

// -----------------------------------------------------------------------------------------------
// STRUCTS
// -----------------------------------------------------------------------------------------------

/// An implementation of a 2D KD-Tree
#[derive(Clone, Debug, Default)]
pub struct KdTree {
    /// The root node of the tree, `None` if the tree is empty.
    root: Option<Box<Node>>,

    /// Number of points in the tree
    len: usize,
}

/// The result of a nearest neighbour query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Nearest {
    /// Index of the point in the slice the tree was built from
    pub index: usize,

    /// Euclidian distance between the query point and the nearest point
    pub dist: f64,
}

/// A single node of the tree
#[derive(Clone, Debug)]
struct Node {
    /// The point stored in this node
    point: Vector2<f64>,

    /// Index of the point in the source slice
    index: usize,

    /// The axis this node splits on
    axis: usize,

    /// Child containing points lower than this one on `axis`
    lower: Option<Box<Node>>,

    /// Child containing points greater than or equal to this one on `axis`
    upper: Option<Box<Node>>,
}

// -----------------------------------------------------------------------------------------------
// ENUMS
// -----------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum KdTreeError {
    #[error("The point at index {0} ({1}) is not finite")]
    NonFinitePoint(usize, Vector2<f64>),

    #[error("The query point {0} is not finite")]
    NonFiniteQuery(Vector2<f64>),

    #[error("Cannot query an empty tree")]
    Empty,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl KdTree {
    /// Build a new tree from the given points.
    ///
    /// All points must be finite.
    pub fn build(points: &[Vector2<f64>]) -> Result<Self, KdTreeError> {
        // Check that all points are finite, a NaN would break the ordering used to split
        for (i, p) in points.iter().enumerate() {
            if !(p[0].is_finite() && p[1].is_finite()) {
                return Err(KdTreeError::NonFinitePoint(i, *p));
            }
        }

        // Pair each point with its index in the source slice
        let mut items: Vec<(usize, Vector2<f64>)> = points.iter().copied().enumerate().collect();

        Ok(Self {
            root: Self::build_node(&mut items, 0),
            len: points.len(),
        })
    }

    /// Number of points in the tree
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if there are no points in the tree
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Find the point nearest to `query`.
    ///
    /// If two points are at exactly the same distance the one with the lowest index is returned.
    pub fn query_nearest(&self, query: &Vector2<f64>) -> Result<Nearest, KdTreeError> {
        if !(query[0].is_finite() && query[1].is_finite()) {
            return Err(KdTreeError::NonFiniteQuery(*query));
        }

        let root = match self.root {
            Some(ref r) => r,
            None => return Err(KdTreeError::Empty),
        };

        // Best is tracked as (index, squared distance)
        let mut best = (root.index, (root.point - query).norm_squared());
        root.search(query, &mut best);

        Ok(Nearest {
            index: best.0,
            dist: best.1.sqrt(),
        })
    }

    /// Recursively build a node from the given items, splitting on `depth % NUM_DIMS`.
    fn build_node(items: &mut [(usize, Vector2<f64>)], depth: usize) -> Option<Box<Node>> {
        if items.is_empty() {
            return None;
        }

        let axis = depth % NUM_DIMS;
        let median = items.len() / 2;

        // Partition about the median on this axis. Points are known to be finite so the
        // comparison can't fail.
        items.select_nth_unstable_by(median, |a, b| {
            a.1[axis]
                .partial_cmp(&b.1[axis])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let (lower, rest) = items.split_at_mut(median);
        let (mid, upper) = rest.split_at_mut(1);

        Some(Box::new(Node {
            point: mid[0].1,
            index: mid[0].0,
            axis,
            lower: Self::build_node(lower, depth + 1),
            upper: Self::build_node(upper, depth + 1),
        }))
    }
}

impl Node {
    /// Search this node and its children for a point closer than `best`.
    fn search(&self, query: &Vector2<f64>, best: &mut (usize, f64)) {
        // Check this node's point
        let dist_sq = (self.point - query).norm_squared();
        if dist_sq < best.1 || (dist_sq == best.1 && self.index < best.0) {
            *best = (self.index, dist_sq);
        }

        // Signed distance from the splitting plane, the side the query lies on is searched first
        let diff = query[self.axis] - self.point[self.axis];
        let (near, far) = if diff < 0.0 {
            (&self.lower, &self.upper)
        } else {
            (&self.upper, &self.lower)
        };

        if let Some(ref n) = near {
            n.search(query, best);
        }

        // Only cross the plane if a closer (or equally close) point could be on the other side
        if diff * diff <= best.1 {
            if let Some(ref f) = far {
                f.search(query, best);
            }
        }
    }
}
