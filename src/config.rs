//! Rod, load and solver configuration

use serde::{Deserialize, Serialize};

use crate::error::{RodError, RodResult};
use crate::prelude::*;

//------------------------------------------------------------------------------
// Material
//------------------------------------------------------------------------------

/// Sectional elastic stiffness of a homogeneous rod
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Elasticity {
    /// Shear / extension stiffness acting on the material strain
    pub extension: Matrix3,
    /// Bending / torsion stiffness acting on the material curvature
    pub bending: Matrix3,
}

impl Elasticity {
    /// Diagonal stiffness from `[GA1, GA2, EA]` and `[EI1, EI2, GJ]`
    pub fn from_diagonals(extension: [f64; 3], bending: [f64; 3]) -> Self {
        Elasticity {
            extension: Matrix3::from_diagonal(&Vector3::from(extension)),
            bending: Matrix3::from_diagonal(&Vector3::from(bending)),
        }
    }

    /// Circular cross-section of diameter `d` made of an isotropic material
    pub fn circular(youngs_modulus: f64, shear_modulus: f64, d: f64) -> Self {
        let area = std::f64::consts::PI * d * d / 4.;
        let i = std::f64::consts::PI * d.powi(4) / 64.;
        Self::from_diagonals(
            [shear_modulus * area, shear_modulus * area, youngs_modulus * area],
            [youngs_modulus * i, youngs_modulus * i, shear_modulus * 2. * i],
        )
    }

    /// 6x6 block-diagonal constitutive operator
    pub fn c_star(&self) -> Matrix6 {
        block_diagonal(&self.extension, &self.bending)
    }
}

//------------------------------------------------------------------------------
// Loads
//------------------------------------------------------------------------------

/// Node a load acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    /// Last node of the rod
    FreeEnd,
    Node(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadKind {
    /// Force fixed in the global frame
    Force,
    /// Moment fixed in the global frame
    Moment,
    /// Force fixed in the frame of the loaded node; the reference vector is
    /// rotated by the node's current orientation
    FollowerForce,
}

/// Point load whose vector is `direction` scaled by the current load magnitude
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointLoad {
    pub location: Location,
    pub kind: LoadKind,
    pub direction: Vector3,
}

impl PointLoad {
    pub fn force(location: Location, direction: Vector3) -> Self {
        PointLoad {
            location,
            kind: LoadKind::Force,
            direction,
        }
    }

    pub fn moment(location: Location, direction: Vector3) -> Self {
        PointLoad {
            location,
            kind: LoadKind::Moment,
            direction,
        }
    }

    pub fn follower_force(location: Location, direction: Vector3) -> Self {
        PointLoad {
            location,
            kind: LoadKind::FollowerForce,
            direction,
        }
    }

    pub fn node(&self, num_nodes: usize) -> usize {
        match self.location {
            Location::FreeEnd => num_nodes - 1,
            Location::Node(n) => n,
        }
    }
}

/// Ordered load magnitudes, one per load step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadSchedule {
    values: Vec<f64>,
}

impl LoadSchedule {
    /// `steps` equally spaced magnitudes from 0 to `max_load` inclusive
    pub fn linear(max_load: f64, steps: usize) -> Self {
        let values = match steps {
            0 => vec![],
            1 => vec![0.],
            _ => (0..steps)
                .map(|i| max_load * (i as f64) / ((steps - 1) as f64))
                .collect_vec(),
        };
        LoadSchedule { values }
    }

    pub fn from_values(values: Vec<f64>) -> RodResult<Self> {
        let schedule = LoadSchedule { values };
        schedule.validate()?;
        Ok(schedule)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn magnitude(&self, step: usize) -> RodResult<f64> {
        self.values
            .get(step)
            .copied()
            .ok_or(RodError::LoadStepOutOfRange {
                step,
                len: self.values.len(),
            })
    }

    pub fn validate(&self) -> RodResult<()> {
        if self.values.is_empty() {
            return Err(RodError::InvalidConfiguration(
                "load schedule is empty".to_string(),
            ));
        }
        if self.values.iter().any(|v| !v.is_finite()) {
            return Err(RodError::InvalidConfiguration(
                "load schedule contains non-finite values".to_string(),
            ));
        }
        let increasing = self.values.windows(2).all(|w| w[1] >= w[0]);
        let decreasing = self.values.windows(2).all(|w| w[1] <= w[0]);
        if !increasing && !decreasing {
            return Err(RodError::InvalidConfiguration(
                "load schedule must be monotonic".to_string(),
            ));
        }
        Ok(())
    }
}

//------------------------------------------------------------------------------
// Boundary conditions
//------------------------------------------------------------------------------

/// Prescribed value of one nodal DOF (0..3 translation, 3..6 rotation vector)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryCondition {
    pub node: usize,
    pub dof: usize,
    pub value: f64,
}

impl BoundaryCondition {
    /// All six DOFs of `node` held at zero
    pub fn clamped(node: usize) -> Vec<Self> {
        (0..DOF)
            .map(|dof| BoundaryCondition {
                node,
                dof,
                value: 0.,
            })
            .collect()
    }

    pub fn global_dof(&self) -> usize {
        DOF * self.node + self.dof
    }
}

//------------------------------------------------------------------------------
// Solver
//------------------------------------------------------------------------------

/// How Newton increments of the rotation vector are applied to the state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationUpdate {
    /// `theta += dtheta`; exact only for rotations about a fixed axis
    AdditiveVector,
    /// `q = exp(dtheta) * q`, converted back to a rotation vector
    QuaternionComposition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RodConfig {
    pub length: f64,
    pub num_elements: usize,
    /// 2 (linear) or 3 (quadratic)
    pub nodes_per_element: usize,
    /// 1 to 3
    pub gauss_points: usize,
    pub elasticity: Elasticity,
    pub boundary_conditions: Vec<BoundaryCondition>,
    pub loads: Vec<PointLoad>,
    pub schedule: LoadSchedule,
    pub max_iterations: usize,
    pub increment_tolerance: f64,
    pub residual_tolerance: f64,
    /// Increments with a larger norm are rescaled to this norm
    pub max_increment_norm: f64,
    pub rotation_update: RotationUpdate,
    /// Accumulate the material/geometric stiffness split and report the
    /// buckling eigenvalues with every load step
    pub buckling: bool,
    /// Treat an exhausted iteration budget as an error instead of a warning
    pub fail_on_divergence: bool,
}

impl Default for RodConfig {
    fn default() -> Self {
        RodConfig {
            length: 1.,
            num_elements: 20,
            nodes_per_element: 2,
            gauss_points: 1,
            elasticity: Elasticity::from_diagonals([1e4, 1e4, 1e4], [2., 2., 1.]),
            boundary_conditions: BoundaryCondition::clamped(0),
            loads: vec![],
            schedule: LoadSchedule::linear(7., 51),
            max_iterations: 100,
            increment_tolerance: 1e-6,
            residual_tolerance: 1e-4,
            max_increment_norm: 1.,
            rotation_update: RotationUpdate::AdditiveVector,
            buckling: false,
            fail_on_divergence: false,
        }
    }
}

impl RodConfig {
    pub fn from_json(s: &str) -> RodResult<Self> {
        let config: RodConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> RodResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn num_nodes(&self) -> usize {
        (self.nodes_per_element.max(2) - 1) * self.num_elements + 1
    }

    pub fn validate(&self) -> RodResult<()> {
        let invalid = |msg: String| Err(RodError::InvalidConfiguration(msg));

        if !(self.length > 0.) {
            return invalid(format!("rod length must be positive, got {}", self.length));
        }
        if self.num_elements == 0 {
            return invalid("rod needs at least one element".to_string());
        }
        if !(2..=3).contains(&self.nodes_per_element) {
            return invalid(format!(
                "{} nodes per element requested, only 2 and 3 are supported",
                self.nodes_per_element
            ));
        }
        if !(1..=3).contains(&self.gauss_points) {
            return invalid(format!(
                "{} Gauss points requested, only 1 to 3 are supported",
                self.gauss_points
            ));
        }
        if self.max_iterations == 0 {
            return invalid("max_iterations must be at least 1".to_string());
        }
        if !(self.max_increment_norm > 0.) {
            return invalid("max_increment_norm must be positive".to_string());
        }
        for (name, tol) in [
            ("increment_tolerance", self.increment_tolerance),
            ("residual_tolerance", self.residual_tolerance),
        ] {
            if !(tol.is_finite() && tol > 0.) {
                return invalid(format!("{} must be positive and finite, got {}", name, tol));
            }
        }

        let num_nodes = self.num_nodes();
        for bc in &self.boundary_conditions {
            if bc.node >= num_nodes || bc.dof >= DOF {
                return invalid(format!(
                    "boundary condition on node {} dof {} is outside the rod ({} nodes)",
                    bc.node, bc.dof, num_nodes
                ));
            }
        }
        for load in &self.loads {
            if load.node(num_nodes) >= num_nodes {
                return invalid(format!(
                    "load on node {} is outside the rod ({} nodes)",
                    load.node(num_nodes),
                    num_nodes
                ));
            }
        }
        self.schedule.validate()
    }
}
