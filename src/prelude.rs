pub use itertools::{izip, Itertools};
pub use std::ops::AddAssign;

//------------------------------------------------------------------------------
// Types
//------------------------------------------------------------------------------

/// Matrix (3 x 3)
pub type Matrix3 = nalgebra::Matrix3<f64>;

/// Matrix (6 x 6)
pub type Matrix6 = nalgebra::Matrix6<f64>;

/// Matrix (3 x 4)
pub type Matrix3x4 = nalgebra::Matrix3x4<f64>;

/// Matrix (DOFs x DOFs)
pub type MatrixD = nalgebra::DMatrix<f64>;

pub type Vector3 = nalgebra::Vector3<f64>;
pub type Vector4 = nalgebra::Vector4<f64>;
pub type Vector6 = nalgebra::Vector6<f64>;

/// Column vector (Degrees of Freedom)
pub type VectorD = nalgebra::DVector<f64>;

pub type Quaternion = nalgebra::Quaternion<f64>;
pub type UnitQuaternion = nalgebra::UnitQuaternion<f64>;

/// Degrees of freedom per node: 3 translations + 3 rotation vector components
pub const DOF: usize = 6;

//------------------------------------------------------------------------------
// Traits
//------------------------------------------------------------------------------

pub trait RotVecExt {
    fn tilde(&self) -> Matrix3;
}

impl RotVecExt for Vector3 {
    /// Skew-symmetric tensor whose axial vector is `self`
    fn tilde(&self) -> Matrix3 {
        Matrix3::new(
            0.0, -self[2], self[1], self[2], 0.0, -self[0], -self[1], self[0], 0.0,
        )
    }
}

pub trait MatAxialExt {
    fn axial(&self) -> Vector3;
}

impl MatAxialExt for Matrix3 {
    /// Axial vector of a skew-symmetric tensor (inverse of `tilde`)
    fn axial(&self) -> Vector3 {
        Vector3::new(self[(2, 1)], self[(0, 2)], self[(1, 0)])
    }
}

pub trait QuatExt {
    fn G(&self) -> Matrix3x4;
    fn wijk(&self) -> Vector4;
}

impl QuatExt for Quaternion {
    /// Maps a quaternion rate to half the material angular rate: `K = 2 G(q) q'`
    #[allow(non_snake_case)]
    fn G(&self) -> Matrix3x4 {
        let (q0, q1, q2, q3) = (self.w, self.i, self.j, self.k);
        Matrix3x4::new(-q1, q0, q3, -q2, -q2, -q3, q0, q1, -q3, q2, -q1, q0)
    }
    fn wijk(&self) -> Vector4 {
        Vector4::new(self.w, self.i, self.j, self.k)
    }
}

impl QuatExt for UnitQuaternion {
    #[allow(non_snake_case)]
    fn G(&self) -> Matrix3x4 {
        self.quaternion().G()
    }
    fn wijk(&self) -> Vector4 {
        self.quaternion().wijk()
    }
}

/// Block-diagonal 6x6 matrix with `a` in the upper-left and `b` in the lower-right
pub fn block_diagonal(a: &Matrix3, b: &Matrix3) -> Matrix6 {
    let mut m = Matrix6::zeros();
    m.fixed_view_mut::<3, 3>(0, 0).copy_from(a);
    m.fixed_view_mut::<3, 3>(3, 3).copy_from(b);
    m
}
