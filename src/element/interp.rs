use serde::{Deserialize, Serialize};

use crate::error::{RodError, RodResult};

//------------------------------------------------------------------------------
// Lagrange Polynomials
//------------------------------------------------------------------------------

pub fn lagrange_polynomial(x: f64, xs: &[f64]) -> Vec<f64> {
    xs.iter()
        .enumerate()
        .map(|(j, &xj)| {
            xs.iter()
                .enumerate()
                .filter(|(m, _)| *m != j)
                .map(|(_, &xm)| (x - xm) / (xj - xm))
                .product()
        })
        .collect()
}

pub fn lagrange_polynomial_derivative(x: f64, xs: &[f64]) -> Vec<f64> {
    xs.iter()
        .enumerate()
        .map(|(j, &sj)| {
            xs.iter()
                .enumerate()
                .filter(|(i, _)| *i != j)
                .map(|(i, &si)| {
                    1.0 / (sj - si)
                        * xs.iter()
                            .enumerate()
                            .filter(|(m, _)| *m != i && *m != j)
                            .map(|(_, &sm)| (x - sm) / (sj - sm))
                            .product::<f64>()
                })
                .sum()
        })
        .collect()
}

//------------------------------------------------------------------------------
// Element shape functions
//------------------------------------------------------------------------------

/// Lagrange element order along the rod
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementOrder {
    /// 2-node element
    Linear,
    /// 3-node element with a mid-side node
    Quadratic,
}

impl ElementOrder {
    pub fn from_nodes_per_element(nodes: usize) -> RodResult<Self> {
        match nodes {
            2 => Ok(ElementOrder::Linear),
            3 => Ok(ElementOrder::Quadratic),
            _ => Err(RodError::InvalidConfiguration(format!(
                "{} nodes per element requested, only 2 (linear) and 3 (quadratic) are supported",
                nodes
            ))),
        }
    }

    pub fn num_nodes(&self) -> usize {
        match self {
            ElementOrder::Linear => 2,
            ElementOrder::Quadratic => 3,
        }
    }

    /// Parametric coordinates of the element nodes in [-1, 1]
    pub fn node_xi(&self) -> &'static [f64] {
        match self {
            ElementOrder::Linear => &[-1., 1.],
            ElementOrder::Quadratic => &[-1., 0., 1.],
        }
    }
}

/// Shape function values and their parametric derivatives at one point
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeFunctions {
    pub n: Vec<f64>,
    pub dn_dxi: Vec<f64>,
}

impl ShapeFunctions {
    pub fn at(order: ElementOrder, xi: f64) -> Self {
        ShapeFunctions {
            n: lagrange_polynomial(xi, order.node_xi()),
            dn_dxi: lagrange_polynomial_derivative(xi, order.node_xi()),
        }
    }
}

#[cfg(test)]
mod test_lagrange {

    use super::*;
    use nalgebra::{dvector, DVector};

    #[test]
    fn test_lagrange_polynomial() {
        let xs = dvector![1.0, 2.0, 3.0];
        let ys = dvector![1.0, 4.0, 9.0];

        let w1 = lagrange_polynomial(1.0, &xs.as_slice());
        let w2 = lagrange_polynomial(2.0, &xs.as_slice());
        let w3 = lagrange_polynomial(3.0, &xs.as_slice());

        assert_eq!(w1, vec![1.0, 0.0, 0.0]);
        assert_eq!(w2, vec![0.0, 1.0, 0.0]);
        assert_eq!(w3, vec![0.0, 0.0, 1.0]);

        assert_eq!(DVector::from_vec(w1).dot(&ys), 1.0);
        assert_eq!(DVector::from_vec(w2).dot(&ys), 4.0);
        assert_eq!(DVector::from_vec(w3).dot(&ys), 9.0);

        let w4 = lagrange_polynomial(1.5, &xs.as_slice());
        assert_eq!(DVector::from_vec(w4).dot(&ys), 1.5 * 1.5);
    }

    #[test]
    fn test_lagrange_polynomial_derivative() {
        let xs = dvector![1.0, 2.0, 3.0];
        let ys = dvector![1.0, 4.0, 9.0];

        let w1 = lagrange_polynomial_derivative(1.0, &xs.as_slice());
        let w2 = lagrange_polynomial_derivative(2.0, &xs.as_slice());
        let w3 = lagrange_polynomial_derivative(3.0, &xs.as_slice());

        assert_eq!(w1, vec![-1.5, 2.0, -0.5]);
        assert_eq!(w2, vec![-0.5, 0.0, 0.5]);
        assert_eq!(w3, vec![0.5, -2.0, 1.5]);

        assert_eq!(DVector::from_vec(w1).dot(&ys), 2.0);
        assert_eq!(DVector::from_vec(w2).dot(&ys), 4.0);
        assert_eq!(DVector::from_vec(w3).dot(&ys), 6.0);

        let w4 = lagrange_polynomial_derivative(1.5, &xs.as_slice());
        assert_eq!(DVector::from_vec(w4).dot(&ys), 2.0 * 1.5);
    }
}
