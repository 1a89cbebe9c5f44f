// Vector geometry: angles between rays sharing an apex, and the critical
// chord length that bounds a satellite's visibility ball in the spatial
// index.

pub type Vec3 = nalgebra::Vector3<f64>;

/// Angle in degrees between the two rays `apex -> p1` and `apex -> p2`.
///
/// Returns `None` when either ray has zero length (a user coincident with
/// the apex) — the geometric-degeneracy policy treats the angle as
/// undefined rather than erroring, and an undefined angle never conflicts.
///
/// The normalized dot product is rounded to 3 decimal places before
/// `acos`, matching the source's conflict-boundary convention; this also
/// keeps the ratio inside `[-1, 1]` for all but the last ULPs, which are
/// clamped silently.
pub fn angle_deg(apex: Vec3, p1: Vec3, p2: Vec3) -> Option<f64> {
    let v1 = p1 - apex;
    let v2 = p2 - apex;
    let n1 = v1.norm();
    let n2 = v2.norm();
    if n1 == 0.0 || n2 == 0.0 {
        return None;
    }
    let cosine = (v1.dot(&v2) / (n1 * n2) * 1000.0).round() / 1000.0;
    let cosine = cosine.clamp(-1.0, 1.0);
    Some(cosine.acos().to_degrees())
}

/// Critical ball-query radius around a satellite at distance `d` from the
/// sphere center, given the user sphere radius `r` and the user-side
/// visibility half-angle `theta` (radians).
///
/// This is the exact chord length derived for `theta = pi/4` in the
/// original reduction (`sqrt(2) * d * sin(pi/4 - asin(r / (d * sqrt(2))))`);
/// both appearances of `pi/4` in that formula are the visibility threshold
/// itself (once directly, once through its sine `1/sqrt(2)`), so
/// substituting the configured `theta` for both generalizes it to any
/// `USER_ANGLE_DEGREES` without changing the derivation.
pub fn critical_radius(d: f64, r: f64, theta: f64) -> f64 {
    let sin_theta = theta.sin();
    2.0 * d * sin_theta * (theta - (sin_theta * r / d).asin()).sin()
}
