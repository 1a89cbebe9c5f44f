// Users, satellites, connections, and the four-color alphabet.
//
// A user's back-reference to its connection is a non-owning index pair
// `(SatelliteId, conn_id)`, never a borrow: the satellite exclusively
// owns its connections, the user only remembers where to find one.

use crate::geometry::{self, Vec3};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

pub type UserId = u32;
pub type SatelliteId = u32;

/// Index of a connection within its owning satellite's beam count.
pub type ConnId = u8;

/// Non-owning handle to a connection, held by the user it belongs to.
pub type ConnectionRef = (SatelliteId, ConnId);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Blue,
    Green,
    Red,
    Yellow,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Blue, Color::Green, Color::Red, Color::Yellow];

    pub fn random(rng: &mut impl Rng) -> Color {
        *Self::ALL.choose(rng).expect("Color::ALL is non-empty")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Connection {
    pub sat_id: SatelliteId,
    pub conn_id: ConnId,
    pub user: UserId,
    pub color: Color,
}

#[derive(Clone, Debug)]
pub struct User {
    pub id: UserId,
    pub position: Vec3,
    pub connection: Option<ConnectionRef>,
}

impl User {
    pub fn new(id: UserId, position: Vec3) -> Self {
        Self {
            id,
            position,
            connection: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Satellite {
    pub id: SatelliteId,
    pub position: Vec3,
    pub visible_users: HashSet<UserId>,
    pub connections: Vec<Connection>,
}

impl Satellite {
    pub fn new(id: SatelliteId, position: Vec3) -> Self {
        Self {
            id,
            position,
            visible_users: HashSet::new(),
            connections: Vec::new(),
        }
    }

    pub fn add_connection(&mut self, connection: Connection) {
        self.connections.push(connection);
    }

    /// Removes the first connection equal to `connection`, if present.
    pub fn remove_connection(&mut self, connection: Connection) {
        if let Some(pos) = self.connections.iter().position(|&c| c == connection) {
            self.connections.remove(pos);
        }
    }

    fn angle_between(&self, c1: &Connection, c2: &Connection, positions: &[Vec3]) -> Option<f64> {
        geometry::angle_deg(
            self.position,
            positions[c1.user as usize],
            positions[c2.user as usize],
        )
    }

    /// Two connections conflict iff they are distinct, share a color, and
    /// their angle at this satellite is strictly less than
    /// `satellite_angle_degrees`. A geometrically degenerate angle (a user
    /// coincident with the satellite) never conflicts.
    ///
    /// The distinctness check is by value and is meant for scanning a
    /// satellite's own stored connections, where it also doubles as the
    /// "a connection never conflicts with itself" guard for a duplicate
    /// scan order. It is deliberately not used when scoring a rescue
    /// probe against the satellite (see `num_conflicts`): a probe is a
    /// foreign hypothetical, not a stored connection, even when it
    /// happens to carry the same fields as one.
    pub fn conflicts(
        &self,
        c1: &Connection,
        c2: &Connection,
        positions: &[Vec3],
        satellite_angle_degrees: f64,
    ) -> bool {
        if c1 == c2 {
            return false;
        }
        if c1.color != c2.color {
            return false;
        }
        match self.angle_between(c1, c2, positions) {
            Some(angle) => angle < satellite_angle_degrees,
            None => false,
        }
    }

    /// Scores a rescue probe against every currently stored connection,
    /// the victim's included, without the same-value self-skip `conflicts`
    /// applies: the probe is compared as a foreign candidate even when it
    /// is field-for-field identical to the connection it would replace.
    pub fn num_conflicts(
        &self,
        probe: &Connection,
        positions: &[Vec3],
        satellite_angle_degrees: f64,
    ) -> usize {
        self.connections
            .iter()
            .filter(|c| {
                c.color == probe.color
                    && matches!(
                        self.angle_between(c, probe, positions),
                        Some(angle) if angle < satellite_angle_degrees
                    )
            })
            .count()
    }

    /// Scans a uniformly shuffled view of the current connections for the
    /// first conflicting pair. Randomizing the scan order, rather than
    /// relying on storage order, is what makes "the first conflicting
    /// pair" well-defined across runs with a fixed seed.
    pub fn find_random_conflicted_pair(
        &self,
        rng: &mut impl Rng,
        positions: &[Vec3],
        satellite_angle_degrees: f64,
    ) -> Option<(Connection, Connection)> {
        let mut shuffled = self.connections.clone();
        shuffled.shuffle(rng);
        for c1 in &shuffled {
            for c2 in &shuffled {
                if self.conflicts(c1, c2, positions, satellite_angle_degrees) {
                    return Some((*c1, *c2));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sat_with(positions: &[Vec3], conns: Vec<Connection>) -> Satellite {
        let mut sat = Satellite::new(0, Vec3::new(0.0, 0.0, 0.0));
        for c in conns {
            sat.add_connection(c);
        }
        let _ = positions;
        sat
    }

    #[test]
    fn identical_direction_same_color_conflicts() {
        let positions = vec![
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(2.0, 2.0, 2.0),
            Vec3::new(3.0, 3.0, 3.0),
        ];
        let c1 = Connection { sat_id: 0, conn_id: 1, user: 0, color: Color::Blue };
        let c2 = Connection { sat_id: 0, conn_id: 2, user: 1, color: Color::Blue };
        let c3 = Connection { sat_id: 0, conn_id: 3, user: 2, color: Color::Blue };
        let sat = sat_with(&positions, vec![c1, c2, c3]);
        assert!(sat.conflicts(&c1, &c2, &positions, 10.0));
        assert!(sat.conflicts(&c2, &c3, &positions, 10.0));
    }

    #[test]
    fn different_colors_never_conflict() {
        let positions = vec![Vec3::new(1.0, 1.0, 1.0), Vec3::new(2.0, 2.0, 2.0)];
        let c1 = Connection { sat_id: 0, conn_id: 1, user: 0, color: Color::Blue };
        let c2 = Connection { sat_id: 0, conn_id: 2, user: 1, color: Color::Green };
        let sat = sat_with(&positions, vec![c1, c2]);
        assert!(!sat.conflicts(&c1, &c2, &positions, 10.0));
    }

    #[test]
    fn a_connection_never_conflicts_with_itself() {
        let positions = vec![Vec3::new(1.0, 1.0, 1.0)];
        let c1 = Connection { sat_id: 0, conn_id: 1, user: 0, color: Color::Blue };
        let sat = sat_with(&positions, vec![c1]);
        assert!(!sat.conflicts(&c1, &c1, &positions, 10.0));
    }

    #[test]
    fn num_conflicts_counts_a_field_identical_probe_as_foreign() {
        let positions = vec![Vec3::new(1.0, 1.0, 1.0)];
        let victim = Connection { sat_id: 0, conn_id: 1, user: 0, color: Color::Blue };
        let sat = sat_with(&positions, vec![victim]);
        assert_eq!(sat.num_conflicts(&victim, &positions, 10.0), 1);
    }

    #[test]
    fn remove_connection_drops_the_first_match() {
        let mut sat = Satellite::new(0, Vec3::new(0.0, 0.0, 0.0));
        let c1 = Connection { sat_id: 0, conn_id: 1, user: 0, color: Color::Blue };
        sat.add_connection(c1);
        assert_eq!(sat.connections.len(), 1);
        sat.remove_connection(c1);
        assert!(sat.connections.is_empty());
    }
}
