//! Spherical interpolation of nodal orientations.

use crate::prelude::*;

/// Below this arc angle two quaternions are treated as the same orientation
pub const SLERP_TOLERANCE: f64 = 1e-8;

/// Flip `q2` onto the hemisphere of `q1` so interpolation follows the shorter arc
fn align(q1: &Quaternion, q2: &Quaternion) -> Quaternion {
    if q1.dot(q2) < 0. {
        -*q2
    } else {
        *q2
    }
}

/// Angle between two unit quaternions seen as 4-vectors, stable near zero
fn arc_angle(q1: &Quaternion, q2: &Quaternion) -> f64 {
    2. * (q1 - q2).norm().atan2((q1 + q2).norm())
}

pub fn slerp(q1: &Quaternion, q2: &Quaternion, t: f64) -> Quaternion {
    let q2 = align(q1, q2);
    let omega = arc_angle(q1, &q2);
    if omega < SLERP_TOLERANCE {
        return (q1 * (1. - t) + q2 * t).normalize();
    }
    let sin_omega = omega.sin();
    q1 * (((1. - t) * omega).sin() / sin_omega) + q2 * ((t * omega).sin() / sin_omega)
}

/// Derivative of `slerp(q1, q2, t)` where `dt` is the derivative of `t`
pub fn slerp_derivative(q1: &Quaternion, q2: &Quaternion, t: f64, dt: f64) -> Quaternion {
    let q2 = align(q1, q2);
    let omega = arc_angle(q1, &q2);
    if omega < SLERP_TOLERANCE {
        return (q2 - q1) * dt;
    }
    (q1 * -((1. - t) * omega).cos() + q2 * (t * omega).cos()) * (omega / omega.sin() * dt)
}

//------------------------------------------------------------------------------
// Element orientation field
//------------------------------------------------------------------------------

/// Orientation and its arclength derivative at a point of an element.
///
/// `n` are the nodal shape function values and `dn` their arclength
/// derivatives. Two-node elements use `slerp` directly; three-node elements
/// interpolate relative rotation vectors about the first node, which is the
/// same curve as `slerp` when only two nodes are present.
pub fn interpolate_orientation(
    qs: &[UnitQuaternion],
    n: &[f64],
    dn: &[f64],
) -> (Quaternion, Quaternion) {
    if qs.len() == 2 {
        let (q1, q2) = (qs[0].quaternion(), qs[1].quaternion());
        (slerp(q1, q2, n[1]), slerp_derivative(q1, q2, n[1], dn[1]))
    } else {
        geodesic_interpolation(qs, n, dn)
    }
}

fn geodesic_interpolation(
    qs: &[UnitQuaternion],
    n: &[f64],
    dn: &[f64],
) -> (Quaternion, Quaternion) {
    let q_ref = qs[0].quaternion();

    let phis = qs
        .iter()
        .map(|q| relative_rotation_vector(&(q_ref.conjugate() * q.quaternion())))
        .collect_vec();

    let mut phi = Vector3::zeros();
    let mut phi_prime = Vector3::zeros();
    for (p, &ni, &dni) in izip!(phis.iter(), n.iter(), dn.iter()) {
        phi += p * ni;
        phi_prime += p * dni;
    }

    let (e, de) = exp_with_derivative(&phi, &phi_prime);
    (q_ref * e, q_ref * de)
}

/// Shortest rotation vector of a relative rotation quaternion
fn relative_rotation_vector(r: &Quaternion) -> Vector3 {
    let r = if r.w < 0. { -*r } else { *r };
    let v: Vector3 = r.imag();
    let s = v.norm();
    if s <= SLERP_TOLERANCE {
        2. * v
    } else {
        v * (2. * s.atan2(r.w) / s)
    }
}

/// Quaternion exponential of a rotation vector and its derivative along `phi_prime`
fn exp_with_derivative(phi: &Vector3, phi_prime: &Vector3) -> (Quaternion, Quaternion) {
    let a = phi.norm();
    if a <= SLERP_TOLERANCE {
        let e = Quaternion::from_parts(1., phi * 0.5).normalize();
        let de = Quaternion::from_parts(-0.25 * phi.dot(phi_prime), phi_prime * 0.5);
        return (e, de);
    }
    let (s, c) = (a / 2.).sin_cos();
    let a_prime = phi.dot(phi_prime) / a;
    let e = Quaternion::from_parts(c, phi * (s / a));
    let de = Quaternion::from_parts(
        -0.5 * s * a_prime,
        phi_prime * (s / a) + phi * ((0.5 * c * a - s) / (a * a) * a_prime),
    );
    (e, de)
}
