// Top-level orchestrator: owns users, satellites, and the spatial index,
// and drives the build -> visibility -> init -> solve -> finalize
// pipeline.

use crate::config::Config;
use crate::entities::{Satellite, SatelliteId, User, UserId};
use crate::error::BeamError;
use crate::geometry::Vec3;
use crate::spatial_index::KdTree;
use crate::{finalize, init, solver, visibility};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;
use tracing::info;

pub struct Manager {
    pub users: Vec<User>,
    pub satellites: Vec<Satellite>,
    tree: KdTree,
    cfg: Config,
    rng: ChaCha8Rng,
    unassigned: HashSet<UserId>,
}

impl Manager {
    /// Builds the entity model and resolves satellite visibility. Users
    /// share a common radius defined by the first user; every satellite
    /// must be strictly farther from the origin than that radius.
    #[tracing::instrument(skip(user_coords, satellite_coords))]
    pub fn new(
        user_coords: &[[f64; 3]],
        satellite_coords: &[[f64; 3]],
        cfg: Config,
    ) -> Result<Self, BeamError> {
        if user_coords.is_empty() {
            return Err(BeamError::EmptyUsers);
        }
        if satellite_coords.is_empty() {
            return Err(BeamError::EmptySatellites);
        }

        let user_radius = Vec3::new(user_coords[0][0], user_coords[0][1], user_coords[0][2]).norm();

        let users: Vec<User> = user_coords
            .iter()
            .enumerate()
            .map(|(i, &[x, y, z])| User::new(i as UserId, Vec3::new(x, y, z)))
            .collect();

        let tree_entries = user_coords
            .iter()
            .enumerate()
            .map(|(i, &p)| (i as UserId, p))
            .collect();
        let tree = KdTree::build(tree_entries);

        let mut satellites = Vec::with_capacity(satellite_coords.len());
        for (i, &[x, y, z]) in satellite_coords.iter().enumerate() {
            let position = Vec3::new(x, y, z);
            let distance = position.norm();
            if distance <= user_radius {
                return Err(BeamError::SatelliteTooClose {
                    sat_id: i as SatelliteId,
                    distance,
                    user_radius,
                });
            }
            satellites.push(Satellite::new(i as SatelliteId, position));
        }

        visibility::resolve(&mut satellites, &tree, user_radius, cfg.user_angle_rad());

        let unassigned: HashSet<UserId> = (0..users.len() as u32).collect();
        let rng = match cfg.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        info!(
            users = users.len(),
            satellites = satellites.len(),
            user_radius,
            "built beam assignment manager"
        );

        Ok(Self {
            users,
            satellites,
            tree,
            cfg,
            rng,
            unassigned,
        })
    }

    /// The spatial index built over user positions, owned by the manager
    /// per the entity model's ownership rules.
    pub fn spatial_index(&self) -> &KdTree {
        &self.tree
    }

    fn positions(&self) -> Vec<Vec3> {
        self.users.iter().map(|u| u.position).collect()
    }

    /// Runs random initialization, the min-conflicts solver, and the
    /// finalizer, returning the de-duplicated `(satellite, user)` result
    /// list.
    #[tracing::instrument(skip(self))]
    pub fn run(&mut self) -> Vec<(SatelliteId, UserId)> {
        let positions = self.positions();

        init::random_init(
            &mut self.users,
            &mut self.satellites,
            &mut self.unassigned,
            self.cfg.beams_per_satellite,
            &mut self.rng,
        );

        let max_steps = self.cfg.max_steps(self.satellites.len());
        solver::solve(
            &mut self.satellites,
            &positions,
            &self.unassigned,
            self.cfg.satellite_angle_degrees,
            max_steps,
            &mut self.rng,
        );

        finalize::finalize(
            &mut self.users,
            &mut self.satellites,
            &positions,
            self.cfg.satellite_angle_degrees,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_inputs() {
        let err = Manager::new(&[], &[[2.0, 0.0, 0.0]], Config::default()).unwrap_err();
        assert!(matches!(err, BeamError::EmptyUsers));

        let err = Manager::new(&[[1.0, 0.0, 0.0]], &[], Config::default()).unwrap_err();
        assert!(matches!(err, BeamError::EmptySatellites));
    }

    #[test]
    fn rejects_a_satellite_inside_the_user_sphere() {
        let err = Manager::new(
            &[[1.0, 0.0, 0.0]],
            &[[0.5, 0.0, 0.0]],
            Config::default(),
        )
        .unwrap_err();
        assert!(matches!(err, BeamError::SatelliteTooClose { .. }));
    }

    #[test]
    fn deterministic_under_a_fixed_seed() {
        let user_coords: Vec<[f64; 3]> = (0..200)
            .map(|i| {
                let t = i as f64 * 0.057;
                [t.sin(), t.cos(), (t * 0.5).sin()]
            })
            .map(|[x, y, z]| {
                let n = (x * x + y * y + z * z).sqrt().max(1e-9);
                [x / n, y / n, z / n]
            })
            .collect();
        let satellite_coords: Vec<[f64; 3]> = (0..10)
            .map(|i| {
                let t = i as f64 * 0.31;
                [1.2 * t.sin(), 1.2 * t.cos(), 1.2 * (t * 0.3).sin()]
            })
            .collect();

        let cfg = Config { seed: Some(99), ..Config::default() };

        let mut m1 = Manager::new(&user_coords, &satellite_coords, cfg).unwrap();
        let mut m2 = Manager::new(&user_coords, &satellite_coords, cfg).unwrap();

        assert_eq!(m1.run(), m2.run());
    }

    #[test]
    fn every_connection_obeys_capacity_and_separation() {
        let user_coords: Vec<[f64; 3]> = (0..300)
            .map(|i| {
                let t = i as f64 * 0.041;
                let x = t.sin();
                let y = t.cos();
                let z = (t * 0.7).sin() * 0.3;
                let n = (x * x + y * y + z * z).sqrt().max(1e-9);
                [x / n, y / n, z / n]
            })
            .collect();
        let satellite_coords: Vec<[f64; 3]> = (0..8)
            .map(|i| {
                let t = i as f64 * 0.7;
                [1.1 * t.sin(), 1.1 * t.cos(), 0.2 * (t * 0.4).sin()]
            })
            .collect();

        let cfg = Config { seed: Some(7), ..Config::default() };
        let mut manager = Manager::new(&user_coords, &satellite_coords, cfg).unwrap();
        let result = manager.run();

        let mut per_satellite: std::collections::HashMap<SatelliteId, usize> = Default::default();
        let mut seen_users = HashSet::new();
        for (sat_id, user_id) in &result {
            *per_satellite.entry(*sat_id).or_default() += 1;
            assert!(seen_users.insert(*user_id), "user assigned more than once");
        }
        for count in per_satellite.values() {
            assert!(*count <= cfg.beams_per_satellite);
        }
    }
}
