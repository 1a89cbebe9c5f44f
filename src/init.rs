// Random initializer: a greedy, capacity-respecting, uniqueness-respecting
// first assignment for the solver to repair.

use crate::entities::{Color, Connection, Satellite, User, UserId};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use tracing::info;

/// Assigns each satellite up to `beams_per_satellite` distinct users (each
/// user to at most one satellite), with an arbitrary initial color. Makes
/// no attempt at avoiding same-color angular conflicts — that is the
/// solver's job.
pub fn random_init(
    users: &mut [User],
    satellites: &mut [Satellite],
    unassigned: &mut HashSet<UserId>,
    beams_per_satellite: usize,
    rng: &mut impl Rng,
) {
    for sat in satellites.iter_mut() {
        for _ in 0..beams_per_satellite {
            // Sorted so the pick depends only on rng + input, not HashSet iteration order.
            let mut candidates: Vec<UserId> =
                sat.visible_users.intersection(unassigned).copied().collect();
            candidates.sort_unstable();
            let user = candidates.choose(rng).copied();
            let Some(user) = user else { break };

            let color = Color::random(rng);
            let conn_id = (sat.connections.len() + 1) as u8;
            let connection = Connection {
                sat_id: sat.id,
                conn_id,
                user,
                color,
            };
            sat.add_connection(connection);
            users[user as usize].connection = Some((sat.id, conn_id));
            unassigned.remove(&user);
        }
    }
    info!(
        satellites = satellites.len(),
        remaining_unassigned = unassigned.len(),
        "completed random initialization"
    );
}
