// Error types for the beam assignment pipeline.

use crate::entities::SatelliteId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BeamError {
    #[error("no users provided")]
    EmptyUsers,

    #[error("no satellites provided")]
    EmptySatellites,

    #[error(
        "satellite {sat_id} at distance {distance:.3} is not above the user sphere (radius {user_radius:.3})"
    )]
    SatelliteTooClose {
        sat_id: SatelliteId,
        distance: f64,
        user_radius: f64,
    },
}
