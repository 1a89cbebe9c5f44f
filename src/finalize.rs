// Finalizer: drops any connection still in conflict, reconciles user
// back-references, and assembles the de-duplicated result list.

use crate::entities::{Satellite, SatelliteId, User, UserId};
use crate::geometry::Vec3;
use std::collections::HashSet;
use tracing::info;

/// Drops every connection on a satellite that participates in at least
/// one conflicting pair, clears the affected users' back-references, and
/// returns the ordered, globally de-duplicated `(satellite, user)`
/// result list — satellites in id order, first-encountered satellite wins
/// a user assigned twice by a solver rescue move.
pub fn finalize(
    users: &mut [User],
    satellites: &mut [Satellite],
    positions: &[Vec3],
    satellite_angle_degrees: f64,
) -> Vec<(SatelliteId, UserId)> {
    for sat in satellites.iter_mut() {
        let mut to_remove = HashSet::new();
        for c1 in &sat.connections {
            for c2 in &sat.connections {
                if sat.conflicts(c1, c2, positions, satellite_angle_degrees) {
                    to_remove.insert(*c1);
                    to_remove.insert(*c2);
                }
            }
        }

        sat.connections.retain(|c| !to_remove.contains(c));

        for conn in &to_remove {
            if let Some(user) = users.get_mut(conn.user as usize) {
                if user.connection == Some((conn.sat_id, conn.conn_id)) {
                    user.connection = None;
                }
            }
        }
    }

    let mut seen_users = HashSet::new();
    let mut result = Vec::new();
    for sat in satellites.iter() {
        for conn in &sat.connections {
            if seen_users.insert(conn.user) {
                result.push((sat.id, conn.user));
            }
        }
    }

    info!(connections = result.len(), "finalized assignment");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Color, Connection};

    fn user_vec(n: usize) -> Vec<User> {
        (0..n as u32).map(|id| User::new(id, Vec3::new(0.0, 0.0, 0.0))).collect()
    }

    #[test]
    fn mutually_conflicting_connections_are_all_dropped() {
        let mut users = user_vec(3);
        let mut sat = Satellite::new(0, Vec3::new(0.0, 0.0, 0.0));
        let positions = vec![
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(2.0, 2.0, 2.0),
            Vec3::new(3.0, 3.0, 3.0),
        ];
        sat.add_connection(Connection { sat_id: 0, conn_id: 1, user: 0, color: Color::Blue });
        sat.add_connection(Connection { sat_id: 0, conn_id: 2, user: 1, color: Color::Blue });
        sat.add_connection(Connection { sat_id: 0, conn_id: 3, user: 2, color: Color::Blue });
        for (i, u) in users.iter_mut().enumerate() {
            u.connection = Some((0, (i + 1) as u8));
        }

        let mut satellites = vec![sat];
        let result = finalize(&mut users, &mut satellites, &positions, 10.0);

        assert!(result.is_empty());
        assert!(satellites[0].connections.is_empty());
        assert!(users.iter().all(|u| u.connection.is_none()));
    }

    #[test]
    fn non_conflicting_connections_are_retained() {
        let mut users = user_vec(2);
        let positions = vec![Vec3::new(1.0, 1.0, 1.0), Vec3::new(2.0, 2.0, 2.0)];
        let mut sat = Satellite::new(0, Vec3::new(0.0, 0.0, 0.0));
        sat.add_connection(Connection { sat_id: 0, conn_id: 1, user: 0, color: Color::Blue });
        sat.add_connection(Connection { sat_id: 0, conn_id: 2, user: 1, color: Color::Green });
        for (i, u) in users.iter_mut().enumerate() {
            u.connection = Some((0, (i + 1) as u8));
        }

        let mut satellites = vec![sat];
        let result = finalize(&mut users, &mut satellites, &positions, 10.0);

        assert_eq!(result.len(), 2);
        assert_eq!(satellites[0].connections.len(), 2);
    }

    #[test]
    fn a_user_claimed_by_two_satellites_keeps_only_the_first() {
        let mut users = user_vec(1);
        let positions = vec![Vec3::new(1.0, 1.0, 1.0)];
        let mut sat_a = Satellite::new(0, Vec3::new(0.0, 0.0, 0.0));
        let mut sat_b = Satellite::new(1, Vec3::new(5.0, 5.0, 5.0));
        sat_a.add_connection(Connection { sat_id: 0, conn_id: 1, user: 0, color: Color::Blue });
        sat_b.add_connection(Connection { sat_id: 1, conn_id: 1, user: 0, color: Color::Red });
        users[0].connection = Some((0, 1));

        let mut satellites = vec![sat_a, sat_b];
        let result = finalize(&mut users, &mut satellites, &positions, 10.0);

        assert_eq!(result, vec![(0, 0)]);
    }
}
