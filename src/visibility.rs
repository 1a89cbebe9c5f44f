// Visibility resolution: for each satellite, the fixed set of users it
// can serve.

use crate::entities::Satellite;
use crate::geometry::{self, Vec3};
use crate::spatial_index::KdTree;
use tracing::debug;

/// Populates `satellite.visible_users` for every satellite by querying
/// the k-d tree with the critical chord radius derived in `geometry`.
/// The index is trusted to return exactly the eligible set; no further
/// per-point angle check is applied (see the specification's defense-in-
/// depth note for why an implementer might add one, and why this one
/// does not).
pub fn resolve(satellites: &mut [Satellite], tree: &KdTree, user_radius: f64, user_angle_rad: f64) {
    for sat in satellites.iter_mut() {
        let d = sat.position.norm();
        let critical_radius = geometry::critical_radius(d, user_radius, user_angle_rad);
        let center = to_array(sat.position);
        sat.visible_users = tree.ball_query(center, critical_radius);
        debug!(
            satellite = sat.id,
            visible = sat.visible_users.len(),
            critical_radius,
            "resolved satellite visibility"
        );
    }
}

fn to_array(v: Vec3) -> [f64; 3] {
    [v.x, v.y, v.z]
}
