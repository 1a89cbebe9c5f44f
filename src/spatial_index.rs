// 3D k-d tree over user positions, supporting ball (radius) queries.
//
// Grounded on the reduction in `original_source/satellite.py`'s `KDTree`:
// split on `depth % 3`, median by sort, recurse on strict partitions.
// Nodes are keyed on `UserId` (see entities::UserId) rather than on the
// raw coordinate tuple, per the point->user mapping guidance in the
// specification's design notes — this sidesteps float-tuple hashing
// while preserving bitwise-identity semantics between build and query.

use crate::entities::UserId;
use std::collections::HashSet;

#[derive(Debug)]
struct Node {
    point: [f64; 3],
    user_id: UserId,
    axis: usize,
    left: Option<Box<Node>>,
    right: Option<Box<Node>>,
}

#[derive(Debug, Default)]
pub struct KdTree {
    root: Option<Box<Node>>,
}

impl KdTree {
    /// Build a tree over `entries` (point, owning user id). Empty input
    /// produces an empty tree.
    pub fn build(entries: Vec<(UserId, [f64; 3])>) -> Self {
        Self {
            root: Self::build_rec(entries, 0),
        }
    }

    fn build_rec(mut entries: Vec<(UserId, [f64; 3])>, depth: usize) -> Option<Box<Node>> {
        if entries.is_empty() {
            return None;
        }
        let axis = depth % 3;
        entries.sort_by(|a, b| a.1[axis].partial_cmp(&b.1[axis]).unwrap());
        let mid = entries.len() / 2;
        let right_entries = entries.split_off(mid + 1);
        let (user_id, point) = entries.pop().unwrap();
        let left_entries = entries;

        Some(Box::new(Node {
            point,
            user_id,
            axis,
            left: Self::build_rec(left_entries, depth + 1),
            right: Self::build_rec(right_entries, depth + 1),
        }))
    }

    /// Root point, for shape assertions in tests.
    pub fn root_point(&self) -> Option<[f64; 3]> {
        self.root.as_ref().map(|n| n.point)
    }

    pub fn left_point(&self) -> Option<[f64; 3]> {
        self.root.as_ref().and_then(|n| n.left.as_ref()).map(|n| n.point)
    }

    pub fn right_point(&self) -> Option<[f64; 3]> {
        self.root.as_ref().and_then(|n| n.right.as_ref()).map(|n| n.point)
    }

    /// All stored user ids within closed Euclidean distance `r` of `center`.
    pub fn ball_query(&self, center: [f64; 3], r: f64) -> HashSet<UserId> {
        let mut out = HashSet::new();
        Self::ball_query_rec(self.root.as_deref(), center, r, &mut out);
        out
    }

    fn ball_query_rec(node: Option<&Node>, center: [f64; 3], r: f64, out: &mut HashSet<UserId>) {
        let Some(node) = node else { return };

        let dist_sq = (0..3)
            .map(|i| {
                let d = node.point[i] - center[i];
                d * d
            })
            .sum::<f64>();
        if dist_sq <= r * r {
            out.insert(node.user_id);
        }

        if center[node.axis] - r <= node.point[node.axis] {
            Self::ball_query_rec(node.left.as_deref(), center, r, out);
        }
        if center[node.axis] + r >= node.point[node.axis] {
            Self::ball_query_rec(node.right.as_deref(), center, r, out);
        }
    }
}
