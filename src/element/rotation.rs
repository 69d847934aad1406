//! Conversions between rotation vectors, rotation matrices and unit quaternions.
//!
//! Quaternions are stored scalar-first, `(w, i, j, k)`. A rotation vector has
//! the rotation angle as magnitude and the rotation axis as direction.

use std::f64::consts::PI;

use crate::prelude::*;

/// Below this angle a rotation vector maps to the exact identity
pub const ANGLE_TOLERANCE: f64 = 1e-8;

/// Below this recovered angle a quaternion maps back to the zero rotation vector
pub const RECOVERY_TOLERANCE: f64 = 1e-6;

//------------------------------------------------------------------------------
// Rotation vector -> quaternion / matrix
//------------------------------------------------------------------------------

pub fn quaternion_from_rotation_vector(theta: &Vector3) -> UnitQuaternion {
    let angle = theta.norm();
    if angle <= ANGLE_TOLERANCE {
        return UnitQuaternion::identity();
    }
    let v = theta * ((angle / 2.).sin() / angle);
    UnitQuaternion::new_unchecked(Quaternion::new((angle / 2.).cos(), v[0], v[1], v[2]))
}

pub fn rotation_matrix_from_quaternion(q: &Quaternion) -> Matrix3 {
    let (q0, q1, q2, q3) = (q.w, q.i, q.j, q.k);
    2. * Matrix3::new(
        q0 * q0 + q1 * q1 - 0.5,
        q1 * q2 - q3 * q0,
        q1 * q3 + q2 * q0,
        q2 * q1 + q3 * q0,
        q0 * q0 + q2 * q2 - 0.5,
        q2 * q3 - q1 * q0,
        q3 * q1 - q2 * q0,
        q3 * q2 + q1 * q0,
        q0 * q0 + q3 * q3 - 0.5,
    )
}

pub fn rotation_matrix_from_rotation_vector(theta: &Vector3) -> Matrix3 {
    if theta.norm() <= ANGLE_TOLERANCE {
        Matrix3::identity()
    } else {
        rotation_matrix_from_quaternion(quaternion_from_rotation_vector(theta).quaternion())
    }
}

//------------------------------------------------------------------------------
// Rotation matrix / quaternion -> rotation vector
//------------------------------------------------------------------------------

/// Spurrier's algorithm. The pivot is the largest of the trace and the
/// diagonal entries, so the square root is never taken of a small number.
/// The returned quaternion has a non-negative scalar part.
pub fn quaternion_from_rotation_matrix(r: &Matrix3) -> UnitQuaternion {
    let trace = r.trace();
    let candidates = [trace, r[(0, 0)], r[(1, 1)], r[(2, 2)]];

    // First index wins on ties
    let (pivot, max_value) = candidates
        .iter()
        .enumerate()
        .fold((0, candidates[0]), |(im, vm), (i, &v)| {
            if v > vm {
                (i, v)
            } else {
                (im, vm)
            }
        });

    let mut q = [0.; 4];
    match pivot {
        0 => {
            q[0] = 0.5 * (1. + max_value).sqrt();
            q[1] = 0.25 * (r[(2, 1)] - r[(1, 2)]) / q[0];
            q[2] = 0.25 * (r[(0, 2)] - r[(2, 0)]) / q[0];
            q[3] = 0.25 * (r[(1, 0)] - r[(0, 1)]) / q[0];
        }
        1 => {
            q[1] = (0.5 * max_value + 0.25 * (1. - trace)).sqrt();
            q[0] = 0.25 * (r[(2, 1)] - r[(1, 2)]) / q[1];
            q[2] = 0.25 * (r[(0, 1)] + r[(1, 0)]) / q[1];
            q[3] = 0.25 * (r[(2, 0)] + r[(0, 2)]) / q[1];
        }
        2 => {
            q[2] = (0.5 * max_value + 0.25 * (1. - trace)).sqrt();
            q[1] = 0.25 * (r[(0, 1)] + r[(1, 0)]) / q[2];
            q[0] = 0.25 * (r[(0, 2)] - r[(2, 0)]) / q[2];
            q[3] = 0.25 * (r[(1, 2)] + r[(2, 1)]) / q[2];
        }
        _ => {
            q[3] = (0.5 * max_value + 0.25 * (1. - trace)).sqrt();
            q[1] = 0.25 * (r[(2, 0)] + r[(0, 2)]) / q[3];
            q[2] = 0.25 * (r[(1, 2)] + r[(2, 1)]) / q[3];
            q[0] = 0.25 * (r[(1, 0)] - r[(0, 1)]) / q[3];
        }
    }

    let sign = if q[0] < 0. { -1. } else { 1. };
    UnitQuaternion::new_unchecked(Quaternion::new(
        sign * q[0],
        sign * q[1],
        sign * q[2],
        sign * q[3],
    ))
}

/// A negative scalar part selects the angle in (pi, 2pi), so rotation vectors
/// that have been composed past a half turn keep growing continuously.
pub fn rotation_vector_from_quaternion(q: &Quaternion) -> Vector3 {
    let v: Vector3 = q.imag();
    let sin_half = v.norm().min(1.);
    let angle = if q.w >= 0. {
        2. * sin_half.asin()
    } else {
        2. * (PI - sin_half.asin())
    };
    if angle.abs() <= RECOVERY_TOLERANCE || sin_half <= ANGLE_TOLERANCE {
        Vector3::zeros()
    } else {
        v * (angle / v.norm())
    }
}

pub fn rotation_vector_from_matrix(r: &Matrix3) -> Vector3 {
    rotation_vector_from_quaternion(quaternion_from_rotation_matrix(r).quaternion())
}

#[cfg(test)]
mod tests {

    use super::*;
    use approx::assert_relative_eq;

    fn sample_vectors() -> Vec<Vector3> {
        vec![
            Vector3::new(0.1, 0., 0.),
            Vector3::new(0., -0.4, 0.),
            Vector3::new(0., 0., 1.2),
            Vector3::new(-0.3, 0.5, -0.8),
            Vector3::new(1.5, -1.1, 0.9),
            Vector3::new(-2.9, 0.4, 0.3),
            Vector3::new(0., 0., -3.1),
            Vector3::new(1e-5, -2e-5, 3e-5),
        ]
    }

    #[test]
    fn test_identity_is_exact() {
        assert_eq!(
            rotation_matrix_from_rotation_vector(&Vector3::zeros()),
            Matrix3::identity()
        );
        assert_eq!(
            rotation_matrix_from_rotation_vector(&Vector3::new(1e-9, 0., -1e-9)),
            Matrix3::identity()
        );
        assert_eq!(
            rotation_vector_from_matrix(&Matrix3::identity()),
            Vector3::zeros()
        );
        assert_eq!(
            quaternion_from_rotation_vector(&Vector3::zeros()),
            UnitQuaternion::identity()
        );
    }

    #[test]
    fn test_matrix_is_orthogonal() {
        for theta in sample_vectors() {
            let r = rotation_matrix_from_rotation_vector(&theta);
            assert_relative_eq!(r * r.transpose(), Matrix3::identity(), epsilon = 1e-14);
            assert_relative_eq!(r.determinant(), 1., epsilon = 1e-14);
        }
    }

    #[test]
    fn test_matches_rodrigues() {
        for theta in sample_vectors() {
            let r = rotation_matrix_from_rotation_vector(&theta);
            let expected = nalgebra::Rotation3::new(theta);
            assert_relative_eq!(r, *expected.matrix(), epsilon = 1e-13);
        }
    }

    #[test]
    fn test_round_trip() {
        for theta in sample_vectors() {
            let r = rotation_matrix_from_rotation_vector(&theta);
            assert_relative_eq!(rotation_vector_from_matrix(&r), theta, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_spurrier_pivots() {
        // Half turns about each axis force the diagonal pivots
        for axis in 0..3 {
            let mut theta = Vector3::zeros();
            theta[axis] = PI;
            let r = rotation_matrix_from_rotation_vector(&theta);
            let q = quaternion_from_rotation_matrix(&r);
            assert_relative_eq!(q.w, 0., epsilon = 1e-14);
            assert_relative_eq!(q.imag()[axis].abs(), 1., epsilon = 1e-14);
            assert_relative_eq!(
                rotation_vector_from_matrix(&r).norm(),
                PI,
                epsilon = 1e-7
            );
        }
    }

    #[test]
    fn test_negative_scalar_part() {
        // 3pi/2 about z stored with a negative scalar part keeps its angle
        let angle = 1.5 * PI;
        let q = Quaternion::new((angle / 2.).cos(), 0., 0., (angle / 2.).sin());
        assert!(q.w < 0.);
        assert_relative_eq!(
            rotation_vector_from_quaternion(&q),
            Vector3::new(0., 0., angle),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            rotation_vector_from_quaternion(quaternion_from_rotation_vector(&Vector3::new(
                0., 0., angle
            ))
            .quaternion()),
            Vector3::new(0., 0., angle),
            epsilon = 1e-12
        );
    }
}
