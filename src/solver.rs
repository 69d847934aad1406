#![allow(non_snake_case)]

pub mod boundary;
pub mod buckling;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::{LoadKind, RodConfig, RotationUpdate};
use crate::element::{
    interp::ElementOrder,
    mesh::Mesh,
    quadrature::Quadrature,
    rod::{IntegrationPoint, RodElement},
    rotation::{
        quaternion_from_rotation_vector, rotation_matrix_from_rotation_vector,
        rotation_vector_from_quaternion,
    },
};
use crate::error::{RodError, RodResult};
use crate::prelude::*;

use boundary::{impose_boundary_condition, impose_boundary_condition_stiffness, solve_linear};
use buckling::buckling_eigenvalues;

//------------------------------------------------------------------------------
// State
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub u: VectorD,  // displacement and rotation vector per node
    pub du: VectorD, // last applied increment
    pub residual_norm: f64,
    pub increment_norm: f64,
}

impl State {
    pub fn new(num_nodes: usize) -> Self {
        State {
            u: VectorD::zeros(DOF * num_nodes),
            du: VectorD::zeros(DOF * num_nodes),
            residual_norm: 0.,
            increment_norm: 0.,
        }
    }

    /// Back to the undeformed reference configuration
    pub fn reset(&mut self) {
        self.u.fill(0.);
        self.du.fill(0.);
        self.residual_norm = 0.;
        self.increment_norm = 0.;
    }

    pub fn num_nodes(&self) -> usize {
        self.u.len() / DOF
    }

    pub fn displacement(&self, node: usize) -> Vector3 {
        self.u.fixed_rows::<3>(DOF * node).into_owned()
    }

    pub fn rotation_vector(&self, node: usize) -> Vector3 {
        self.u.fixed_rows::<3>(DOF * node + 3).into_owned()
    }

    pub fn rotation_matrix(&self, node: usize) -> Matrix3 {
        rotation_matrix_from_rotation_vector(&self.rotation_vector(node))
    }

    /// Current centerline position of every node
    pub fn positions(&self, mesh: &Mesh) -> Vec<Vector3> {
        (0..mesh.num_nodes())
            .map(|n| mesh.reference_position(n) + self.displacement(n))
            .collect()
    }
}

//------------------------------------------------------------------------------
// Reports
//------------------------------------------------------------------------------

/// Outcome of one load step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    pub step: usize,
    pub load: f64,
    pub iterations: usize,
    pub residual_norm: f64,
    pub increment_norm: f64,
    pub converged: bool,
    /// Sorted buckling load multipliers, when buckling output is enabled
    pub eigenvalues: Option<Vec<f64>>,
}

impl StepReport {
    pub fn to_json(&self) -> RodResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Assembled global system before boundary conditions
#[derive(Debug, Clone)]
pub struct TangentSystem {
    /// Tangent stiffness `KG`
    pub stiffness: MatrixD,
    /// Out-of-balance force `FG = F_int - F_ext`
    pub residual: VectorD,
    /// Material part of the stiffness
    pub material: MatrixD,
    /// Geometric part of the stiffness, follower load term included
    pub geometric: MatrixD,
}

//------------------------------------------------------------------------------
// Solver
//------------------------------------------------------------------------------

pub struct Solver {
    config: RodConfig,
    mesh: Mesh,
    quadrature: Quadrature,
    state: State,
    load: f64,
    report: Option<StepReport>,
}

impl Solver {
    pub fn new(config: RodConfig) -> RodResult<Self> {
        config.validate()?;
        let order = ElementOrder::from_nodes_per_element(config.nodes_per_element)?;
        let quadrature = Quadrature::gauss(config.gauss_points)?;
        let mesh = Mesh::new(config.length, config.num_elements, order)?;
        let state = State::new(mesh.num_nodes());

        info!(
            "rod: {} {:?} elements, {} nodes, {} Gauss points",
            config.num_elements,
            order,
            mesh.num_nodes(),
            quadrature.len()
        );

        Ok(Solver {
            config,
            mesh,
            quadrature,
            state,
            load: 0.,
            report: None,
        })
    }

    pub fn config(&self) -> &RodConfig {
        &self.config
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Load magnitude of the last solved step
    pub fn load(&self) -> f64 {
        self.load
    }

    pub fn last_report(&self) -> Option<&StepReport> {
        self.report.as_ref()
    }

    pub fn reset(&mut self) {
        self.state.reset();
        self.load = 0.;
        self.report = None;
    }

    /// Solves load step `step` unless `halt` is set; returns the halt flag
    pub fn solve_step(&mut self, step: usize, halt: bool) -> RodResult<bool> {
        if halt {
            return Ok(true);
        }
        self.step(step)?;
        Ok(false)
    }

    /// Newton-Raphson equilibrium iterations for load step `step`, starting
    /// from the current state
    pub fn step(&mut self, step: usize) -> RodResult<StepReport> {
        let load = self.config.schedule.magnitude(step)?;
        self.load = load;

        let mut converged = false;
        let mut iterations = 0;
        let mut split: Option<(MatrixD, MatrixD)> = None;

        for i in 0..self.config.max_iterations {
            iterations = i + 1;

            let TangentSystem {
                stiffness: mut K,
                residual: mut F,
                material,
                geometric,
            } = self.assemble(load);

            // Residual form of the prescribed values so du drives u to target
            for bc in self.config.boundary_conditions.iter() {
                let dof = bc.global_dof();
                impose_boundary_condition(&mut K, &mut F, dof, self.state.u[dof] - bc.value);
            }

            if self.config.buckling {
                split = Some(self.reduce_split(material, geometric));
            }

            let residual_norm = F.norm();
            let du = -solve_linear(&K, &F)?;
            let increment_norm = du.norm();

            self.state.residual_norm = residual_norm;
            self.state.increment_norm = increment_norm;
            self.state.du = if increment_norm > self.config.max_increment_norm {
                du * (self.config.max_increment_norm / increment_norm)
            } else {
                du
            };

            debug!(
                "step {} iteration {}: |FG| = {:e}, |du| = {:e}",
                step, iterations, residual_norm, increment_norm
            );

            if increment_norm < self.config.increment_tolerance
                && residual_norm < self.config.residual_tolerance
            {
                converged = true;
                break;
            }

            self.update();
        }

        if !converged {
            warn!(
                "step {} (load {}) not converged after {} iterations: |FG| = {:e}, |du| = {:e}",
                step, load, iterations, self.state.residual_norm, self.state.increment_norm
            );
            if self.config.fail_on_divergence {
                return Err(RodError::Diverged {
                    step,
                    iterations,
                    residual_norm: self.state.residual_norm,
                    increment_norm: self.state.increment_norm,
                });
            }
        }

        let eigenvalues = match split {
            Some((K0, KGG)) => Some(buckling_eigenvalues(&K0, &KGG)?),
            None => None,
        };

        let report = StepReport {
            step,
            load,
            iterations,
            residual_norm: self.state.residual_norm,
            increment_norm: self.state.increment_norm,
            converged,
            eigenvalues,
        };

        match &report.eigenvalues {
            Some(mu) => info!(
                "load {} step {}: |FG| = {:e}, |du| = {:e}, eigenvalues {:?}",
                load, step, report.residual_norm, report.increment_norm, mu
            ),
            None => info!(
                "load {} step {}: |FG| = {:e}, |du| = {:e}",
                load, step, report.residual_norm, report.increment_norm
            ),
        }

        self.report = Some(report.clone());
        Ok(report)
    }

    /// Buckling load multipliers at the current state and load
    pub fn buckling_analysis(&self) -> RodResult<Vec<f64>> {
        let sys = self.assemble(self.load);
        let (K0, KGG) = self.reduce_split(sys.material, sys.geometric);
        buckling_eigenvalues(&K0, &KGG)
    }

    /// Global system at the current state and load, before boundary conditions
    pub fn tangent_system(&self) -> TangentSystem {
        self.assemble(self.load)
    }

    /// Integration point quantities of every element at the current state
    pub fn integration_points(&self) -> Vec<Vec<IntegrationPoint>> {
        self.mesh
            .elements
            .iter()
            .map(|e| self.evaluate_element(e).qps)
            .collect()
    }

    fn evaluate_element(&self, element: &crate::element::mesh::Element) -> RodElement {
        RodElement::new(
            element,
            self.mesh.order,
            &self.quadrature,
            &self.state.u,
            &self.config.elasticity,
        )
    }

    fn assemble(&self, load: f64) -> TangentSystem {
        let ndofs = self.mesh.num_dofs();
        let mut sys = TangentSystem {
            stiffness: MatrixD::zeros(ndofs, ndofs),
            residual: VectorD::zeros(ndofs),
            material: MatrixD::zeros(ndofs, ndofs),
            geometric: MatrixD::zeros(ndofs, ndofs),
        };

        // External point loads
        let num_nodes = self.mesh.num_nodes();
        for point_load in self.config.loads.iter() {
            let node = point_load.node(num_nodes);
            let v = point_load.direction * load;
            match point_load.kind {
                LoadKind::Force => {
                    sys.residual.fixed_rows_mut::<3>(DOF * node).add_assign(-v);
                }
                LoadKind::Moment => {
                    sys.residual
                        .fixed_rows_mut::<3>(DOF * node + 3)
                        .add_assign(-v);
                }
                LoadKind::FollowerForce => {
                    let f = self.state.rotation_matrix(node) * v;
                    sys.residual.fixed_rows_mut::<3>(DOF * node).add_assign(-f);
                    let k = f.tilde();
                    sys.stiffness
                        .fixed_view_mut::<3, 3>(DOF * node, DOF * node + 3)
                        .add_assign(&k);
                    sys.geometric
                        .fixed_view_mut::<3, 3>(DOF * node, DOF * node + 3)
                        .add_assign(&k);
                }
            }
        }

        // Element contributions
        for element in self.mesh.elements.iter() {
            let rod = self.evaluate_element(element);
            let K_M = rod.K_M();
            let K_G = rod.K_G();
            let R = rod.R();
            let av = rod.assembly_vector();
            for (i, &ii) in av.iter().enumerate() {
                sys.residual[ii] += R[i];
                for (j, &jj) in av.iter().enumerate() {
                    sys.material[(ii, jj)] += K_M[(i, j)];
                    sys.geometric[(ii, jj)] += K_G[(i, j)];
                    sys.stiffness[(ii, jj)] += K_M[(i, j)] + K_G[(i, j)];
                }
            }
        }

        sys
    }

    fn reduce_split(&self, mut K0: MatrixD, mut KGG: MatrixD) -> (MatrixD, MatrixD) {
        for bc in self.config.boundary_conditions.iter() {
            let dof = bc.global_dof();
            impose_boundary_condition_stiffness(&mut K0, dof);
            impose_boundary_condition_stiffness(&mut KGG, dof);
        }
        (K0, KGG)
    }

    fn update(&mut self) {
        match self.config.rotation_update {
            RotationUpdate::AdditiveVector => {
                self.state.u += &self.state.du;
            }
            RotationUpdate::QuaternionComposition => {
                for node in 0..self.state.num_nodes() {
                    let i = DOF * node;
                    let du = self.state.du.fixed_rows::<3>(i).into_owned();
                    self.state.u.fixed_rows_mut::<3>(i).add_assign(&du);

                    let q = quaternion_from_rotation_vector(&self.state.rotation_vector(node));
                    let dq = quaternion_from_rotation_vector(
                        &self.state.du.fixed_rows::<3>(i + 3).into_owned(),
                    );
                    let theta = rotation_vector_from_quaternion(&(dq.quaternion() * q.quaternion()));
                    self.state.u.fixed_rows_mut::<3>(i + 3).copy_from(&theta);
                }
            }
        }
    }
}
