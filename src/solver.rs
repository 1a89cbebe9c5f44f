// Min-conflicts local search: repeatedly pick a conflicted connection and
// replace it with the candidate (user, color) pair that minimizes
// same-color angular conflicts at its satellite.

use crate::entities::{Color, Connection, Satellite, UserId};
use crate::geometry::Vec3;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use tracing::trace;

/// Runs `max_steps` outer iterations, each shuffling the satellite order
/// and attempting one repair step per satellite.
///
/// `unassigned` is read but not written here by design: a rescue move may
/// pick a previously-unassigned user without removing it from the set,
/// which is a known quirk of the reference heuristic (see the
/// specification's design notes on preserving search dynamics). The
/// finalizer reconciles user state afterward.
pub fn solve(
    satellites: &mut [Satellite],
    positions: &[Vec3],
    unassigned: &HashSet<UserId>,
    satellite_angle_degrees: f64,
    max_steps: usize,
    rng: &mut impl Rng,
) {
    let mut order: Vec<usize> = (0..satellites.len()).collect();
    for step in 0..max_steps {
        order.shuffle(rng);
        for &idx in &order {
            repair_step(&mut satellites[idx], positions, unassigned, satellite_angle_degrees, rng);
        }
        trace!(step, "min-conflicts sweep complete");
    }
}

fn repair_step(
    sat: &mut Satellite,
    positions: &[Vec3],
    unassigned: &HashSet<UserId>,
    satellite_angle_degrees: f64,
    rng: &mut impl Rng,
) {
    let Some((victim, _other)) =
        sat.find_random_conflicted_pair(rng, positions, satellite_angle_degrees)
    else {
        return;
    };

    let alternative = alternative_min_conflict(sat, &victim, positions, unassigned, satellite_angle_degrees, rng);

    sat.remove_connection(victim);
    sat.add_connection(alternative);
}

/// Builds every (candidate user, color) hypothetical for `victim`'s slot
/// and returns the one with the fewest conflicts against the satellite's
/// current connections, breaking ties uniformly at random. The candidate
/// set always includes the victim's own user (so the victim's own current
/// color is among the probes, a harmless no-op candidate the reference
/// heuristic also generates).
fn alternative_min_conflict(
    sat: &Satellite,
    victim: &Connection,
    positions: &[Vec3],
    unassigned: &HashSet<UserId>,
    satellite_angle_degrees: f64,
    rng: &mut impl Rng,
) -> Connection {
    let mut candidate_users: Vec<UserId> = sat
        .visible_users
        .intersection(unassigned)
        .copied()
        .collect();
    if !candidate_users.contains(&victim.user) {
        candidate_users.push(victim.user);
    }
    // Sorted so the minimizer set and its tie-break depend only on rng +
    // input, not HashSet iteration order.
    candidate_users.sort_unstable();

    let mut best_score = usize::MAX;
    let mut best: Vec<Connection> = Vec::new();

    for &user in &candidate_users {
        for &color in &Color::ALL {
            let probe = Connection {
                sat_id: sat.id,
                conn_id: victim.conn_id,
                user,
                color,
            };
            let score = sat.num_conflicts(&probe, positions, satellite_angle_degrees);
            match score.cmp(&best_score) {
                std::cmp::Ordering::Less => {
                    best_score = score;
                    best.clear();
                    best.push(probe);
                }
                std::cmp::Ordering::Equal => best.push(probe),
                std::cmp::Ordering::Greater => {}
            }
        }
    }

    *best
        .choose(rng)
        .expect("candidate_users always contains at least the victim's user")
}
