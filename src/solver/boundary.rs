#![allow(non_snake_case)]

use crate::error::{RodError, RodResult};
use crate::prelude::*;

/// Eliminates `dof` from the system `K x = F` with prescribed value `value`.
///
/// The column's contribution is moved to the right-hand side, the row and
/// column are zeroed and the diagonal set to one, so the solution picks up
/// `x[dof] = value`.
pub fn impose_boundary_condition(K: &mut MatrixD, F: &mut VectorD, dof: usize, value: f64) {
    if value != 0. {
        let column = K.column(dof).clone_owned();
        F.axpy(-value, &column, 1.);
    }
    F[dof] = value;
    impose_boundary_condition_stiffness(K, dof);
}

/// Stiffness-only elimination for matrix pencils with no right-hand side
pub fn impose_boundary_condition_stiffness(K: &mut MatrixD, dof: usize) {
    K.row_mut(dof).fill(0.);
    K.column_mut(dof).fill(0.);
    K[(dof, dof)] = 1.;
}

/// Solves `K x = F` by LU decomposition
pub fn solve_linear(K: &MatrixD, F: &VectorD) -> RodResult<VectorD> {
    let x = K.clone().lu().solve(F).ok_or(RodError::SingularSystem)?;
    if x.iter().all(|v| v.is_finite()) {
        Ok(x)
    } else {
        Err(RodError::SingularSystem)
    }
}
