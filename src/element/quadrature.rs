use itertools::Itertools;
use nalgebra::DVector;

use crate::error::{RodError, RodResult};

/// Gauss-Legendre rule on [-1, 1], points in ascending order
#[derive(Debug, Clone)]
pub struct Quadrature {
    pub points: DVector<f64>,
    pub weights: DVector<f64>,
}

impl Quadrature {
    /// Rule with `order` points; only 1 to 3 points are supported.
    pub fn gauss(order: usize) -> RodResult<Self> {
        if !(1..=3).contains(&order) {
            return Err(RodError::InvalidConfiguration(format!(
                "{} Gauss points requested, only 1 to 3 are supported",
                order
            )));
        }
        let gl_rule = gauss_quad::GaussLegendre::init(order);
        let (points, weights): (Vec<f64>, Vec<f64>) = gl_rule
            .nodes
            .into_iter()
            .zip(gl_rule.weights)
            .sorted_by(|a, b| a.0.total_cmp(&b.0))
            .unzip();
        Ok(Quadrature {
            points: DVector::from_vec(points),
            weights: DVector::from_vec(weights),
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
