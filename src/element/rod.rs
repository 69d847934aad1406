#![allow(non_snake_case)]

use crate::config::Elasticity;
use crate::prelude::*;

use super::{
    interp::{ElementOrder, ShapeFunctions},
    mesh::Element,
    quadrature::Quadrature,
    rotation::{quaternion_from_rotation_vector, rotation_matrix_from_quaternion},
    slerp::interpolate_orientation,
};

//------------------------------------------------------------------------------
// Integration point
//------------------------------------------------------------------------------

/// Kinematic and stress quantities at one Gauss point of a deformed element
#[derive(Debug, Clone)]
pub struct IntegrationPoint {
    /// Quadrature weight in parametric space
    pub weight: f64,
    /// Arclength per unit parametric coordinate
    pub jacobian: f64,
    /// Shape function values
    pub n: Vec<f64>,
    /// Shape function derivatives with respect to arclength
    pub n_prime: Vec<f64>,
    /// Centerline tangent `r'`
    pub r_prime: Vector3,
    pub q: Quaternion,
    pub q_prime: Quaternion,
    pub rotation: Matrix3,
    /// Material translational strain `Λᵀ r' - E3`
    pub strain: Vector3,
    /// Material curvature `2 G(q) q'`
    pub curvature: Vector3,
    /// Spatial internal force resultant
    pub force: Vector3,
    /// Spatial internal moment resultant
    pub moment: Vector3,
    /// Constitutive operator pushed to the current configuration, `Π C Πᵀ`
    pub C: Matrix6,
}

impl IntegrationPoint {
    /// Evaluates the point at parametric coordinate `xi` given the element's
    /// nodal reference arclength, displacements and rotation vectors.
    pub fn new(
        xi: f64,
        weight: f64,
        order: ElementOrder,
        s: &[f64],
        x: &[Vector3],
        qs: &[UnitQuaternion],
        elasticity: &Elasticity,
    ) -> Self {
        let sf = ShapeFunctions::at(order, xi);

        let jacobian: f64 = izip!(sf.dn_dxi.iter(), s.iter())
            .map(|(dn, s)| dn * s)
            .sum();
        let n_prime = sf.dn_dxi.iter().map(|dn| dn / jacobian).collect_vec();

        let r_prime = izip!(n_prime.iter(), x.iter())
            .fold(Vector3::zeros(), |acc, (&dn, xk)| acc + xk * dn);

        let (q, q_prime) = interpolate_orientation(qs, &sf.n, &n_prime);
        let rotation = rotation_matrix_from_quaternion(&q);

        let strain = rotation.transpose() * r_prime - Vector3::z();
        let curvature = 2. * q.G() * q_prime.wijk();

        let force = rotation * elasticity.extension * strain;
        let moment = rotation * elasticity.bending * curvature;

        let pi = block_diagonal(&rotation, &rotation);
        let C = pi * elasticity.c_star() * pi.transpose();

        IntegrationPoint {
            weight,
            jacobian,
            n: sf.n,
            n_prime,
            r_prime,
            q,
            q_prime,
            rotation,
            strain,
            curvature,
            force,
            moment,
            C,
        }
    }

    /// Integration factor `w J`
    pub fn wJ(&self) -> f64 {
        self.weight * self.jacobian
    }

    /// Spatial stress resultants `[n; m]`
    pub fn stress(&self) -> Vector6 {
        let mut s = Vector6::zeros();
        s.fixed_rows_mut::<3>(0).copy_from(&self.force);
        s.fixed_rows_mut::<3>(3).copy_from(&self.moment);
        s
    }

    /// Kinematic operator of node `i`, `[[N'_i I, 0], [-N_i r̃', N'_i I]]`
    pub fn Xi(&self, i: usize) -> Matrix6 {
        let mut m = Matrix6::zeros();
        let d = Matrix3::identity() * self.n_prime[i];
        m.fixed_view_mut::<3, 3>(0, 0).copy_from(&d);
        m.fixed_view_mut::<3, 3>(3, 3).copy_from(&d);
        m.fixed_view_mut::<3, 3>(3, 0)
            .copy_from(&(-self.n[i] * self.r_prime.tilde()));
        m
    }
}

//------------------------------------------------------------------------------
// Element
//------------------------------------------------------------------------------

/// Element evaluated at a given global state
#[derive(Debug, Clone)]
pub struct RodElement {
    pub nodes: Vec<usize>,
    pub qps: Vec<IntegrationPoint>,
}

impl RodElement {
    pub fn new(
        element: &Element,
        order: ElementOrder,
        quadrature: &Quadrature,
        u: &VectorD,
        elasticity: &Elasticity,
    ) -> Self {
        // Current nodal positions and orientations
        let x = izip!(element.nodes.iter(), element.s.iter())
            .map(|(&n, &s)| Vector3::new(0., 0., s) + u.fixed_rows::<3>(DOF * n).into_owned())
            .collect_vec();
        let qs = element
            .nodes
            .iter()
            .map(|&n| quaternion_from_rotation_vector(&u.fixed_rows::<3>(DOF * n + 3).into_owned()))
            .collect_vec();

        let qps = izip!(quadrature.points.iter(), quadrature.weights.iter())
            .map(|(&xi, &w)| IntegrationPoint::new(xi, w, order, &element.s, &x, &qs, elasticity))
            .collect_vec();

        RodElement {
            nodes: element.nodes.clone(),
            qps,
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn assembly_vector(&self) -> Vec<usize> {
        super::mesh::assembly_vector(&self.nodes)
    }

    /// Tangent stiffness, material plus geometric
    pub fn K(&self) -> MatrixD {
        self.K_M() + self.K_G()
    }

    /// Material stiffness `Ξ_i Π C Πᵀ Ξ_jᵀ`
    pub fn K_M(&self) -> MatrixD {
        let nn = self.num_nodes();
        let mut K = MatrixD::zeros(DOF * nn, DOF * nn);
        for i in 0..nn {
            for j in 0..nn {
                let mut Kij = K.fixed_view_mut::<6, 6>(i * DOF, j * DOF);
                for qp in self.qps.iter() {
                    Kij.add_assign(qp.wJ() * qp.Xi(i) * qp.C * qp.Xi(j).transpose());
                }
            }
        }
        K
    }

    /// Geometric stiffness from the current force and moment resultants
    pub fn K_G(&self) -> MatrixD {
        let nn = self.num_nodes();
        let mut K = MatrixD::zeros(DOF * nn, DOF * nn);
        for qp in self.qps.iter() {
            let n_tilde = qp.force.tilde();

            // [[0, -ñ], [0, -m̃]]
            let mut S = Matrix6::zeros();
            S.fixed_view_mut::<3, 3>(0, 3).copy_from(&(-n_tilde));
            S.fixed_view_mut::<3, 3>(3, 3)
                .copy_from(&(-qp.moment.tilde()));

            // [[0, 0], [ñ, 0]]
            let mut T = Matrix6::zeros();
            T.fixed_view_mut::<3, 3>(3, 0).copy_from(&n_tilde);

            for i in 0..nn {
                let XiS = qp.Xi(i) * S;
                for j in 0..nn {
                    let mut Kij = K.fixed_view_mut::<6, 6>(i * DOF, j * DOF);
                    Kij.add_assign(
                        qp.wJ() * (qp.n[j] * XiS + qp.n[i] * qp.n_prime[j] * T),
                    );
                }
            }
        }
        K
    }

    /// Internal force vector `Ξ_i [n; m]`
    pub fn R(&self) -> VectorD {
        let nn = self.num_nodes();
        let mut R = VectorD::zeros(DOF * nn);
        for qp in self.qps.iter() {
            let s = qp.stress();
            for i in 0..nn {
                R.fixed_rows_mut::<6>(i * DOF)
                    .add_assign(qp.wJ() * qp.Xi(i) * s);
            }
        }
        R
    }
}
