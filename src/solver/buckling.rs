//! Linearized buckling on the material/geometric stiffness split.
//!
//! The pencil is `(K0 + μ KG) x = 0`: `μ` is the factor on the load the
//! geometric stiffness `KG` was assembled at. Eigenvalues `ν` of the reduced
//! problem `K0⁻¹ (-KG)` relate by `μ = 1 / ν`; directions in the null space of
//! `KG` give `ν = 0` (infinite `μ`) and are dropped.

#![allow(non_snake_case)]

use log::debug;

use crate::error::{RodError, RodResult};
use crate::prelude::*;

/// Relative size below which a reduced eigenvalue counts as zero
pub const NULL_EIGENVALUE_TOLERANCE: f64 = 1e-10;

/// Relative asymmetry below which the geometric stiffness is treated as symmetric
pub const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Real parts of the finite pencil eigenvalues, ascending
pub fn buckling_eigenvalues(K0: &MatrixD, KG: &MatrixD) -> RodResult<Vec<f64>> {
    let B = -KG;

    let nu = if is_symmetric(&B) {
        match K0.clone().cholesky() {
            Some(chol) => symmetric_reduced_eigenvalues(&chol.l(), &B)?,
            None => general_reduced_eigenvalues(K0, &B)?,
        }
    } else {
        general_reduced_eigenvalues(K0, &B)?
    };

    let scale = nu.iter().fold(0_f64, |m, &(re, im)| m.max(re.hypot(im)));
    let mut mu = nu
        .into_iter()
        .filter(|&(re, im)| re.hypot(im) > NULL_EIGENVALUE_TOLERANCE * scale)
        .map(|(re, im)| re / (re * re + im * im))
        .collect_vec();
    mu.sort_by(|a, b| a.total_cmp(b));
    Ok(mu)
}

/// Smallest positive load multiplier, if any
pub fn critical_load_multiplier(eigenvalues: &[f64]) -> Option<f64> {
    eigenvalues.iter().copied().find(|&mu| mu > 0.)
}

fn is_symmetric(A: &MatrixD) -> bool {
    let scale = A.amax().max(1.);
    (A - A.transpose()).amax() <= SYMMETRY_TOLERANCE * scale
}

/// `L⁻¹ B L⁻ᵀ` with `K0 = L Lᵀ`, solved as a standard symmetric problem
fn symmetric_reduced_eigenvalues(L: &MatrixD, B: &MatrixD) -> RodResult<Vec<(f64, f64)>> {
    let Y = L
        .solve_lower_triangular(B)
        .ok_or(RodError::SingularSystem)?;
    let C = L
        .solve_lower_triangular(&Y.transpose())
        .ok_or(RodError::SingularSystem)?;
    let C = (&C + C.transpose()) * 0.5;
    debug!("buckling: symmetric path, {} DOFs", C.nrows());
    Ok(C.symmetric_eigen()
        .eigenvalues
        .iter()
        .map(|&v| (v, 0.))
        .collect())
}

/// Eigenvalues of `K0⁻¹ B` from the real Schur form
fn general_reduced_eigenvalues(K0: &MatrixD, B: &MatrixD) -> RodResult<Vec<(f64, f64)>> {
    let A = K0
        .clone()
        .lu()
        .solve(B)
        .ok_or(RodError::SingularSystem)?;
    if A.iter().any(|v| !v.is_finite()) {
        return Err(RodError::SingularSystem);
    }
    debug!("buckling: general path, {} DOFs", A.nrows());
    Ok(A.complex_eigenvalues()
        .iter()
        .map(|c| (c.re, c.im))
        .collect())
}
