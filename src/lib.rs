//! Geometrically exact (Simo–Reissner) rod under incremental end loads.
//!
//! Orientations are interpolated between nodes by spherical interpolation of
//! unit quaternions, equilibrium is found with Newton–Raphson per load step,
//! and a linearized buckling analysis is available on the material/geometric
//! stiffness split.

pub mod config;
pub mod element;
pub mod error;
pub mod prelude;
pub mod solver;
