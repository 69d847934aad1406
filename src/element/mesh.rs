use crate::element::interp::ElementOrder;
use crate::error::{RodError, RodResult};
use crate::prelude::*;

/// Element connectivity: node indices in order and their reference arclength
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub nodes: Vec<usize>,
    pub s: Vec<f64>,
}

/// Straight rod of `length` along E3 split into equal elements
#[derive(Debug, Clone)]
pub struct Mesh {
    pub length: f64,
    pub order: ElementOrder,
    /// Reference arclength of each node
    pub node_s: Vec<f64>,
    pub elements: Vec<Element>,
}

impl Mesh {
    pub fn new(length: f64, num_elements: usize, order: ElementOrder) -> RodResult<Self> {
        if !(length > 0.) || !length.is_finite() {
            return Err(RodError::InvalidConfiguration(format!(
                "rod length must be positive, got {}",
                length
            )));
        }
        if num_elements == 0 {
            return Err(RodError::InvalidConfiguration(
                "rod needs at least one element".to_string(),
            ));
        }

        let span = order.num_nodes() - 1;
        let num_nodes = span * num_elements + 1;
        let node_s = (0..num_nodes)
            .map(|i| length * (i as f64) / ((num_nodes - 1) as f64))
            .collect_vec();

        let elements = (0..num_elements)
            .map(|e| {
                let nodes = (e * span..=(e + 1) * span).collect_vec();
                let s = nodes.iter().map(|&n| node_s[n]).collect_vec();
                Element { nodes, s }
            })
            .collect_vec();

        Ok(Mesh {
            length,
            order,
            node_s,
            elements,
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.node_s.len()
    }

    pub fn num_dofs(&self) -> usize {
        DOF * self.num_nodes()
    }

    /// Undeformed position of a node
    pub fn reference_position(&self, node: usize) -> Vector3 {
        Vector3::new(0., 0., self.node_s[node])
    }
}

/// Flattens node indices into global DOF indices, `DOF * node + dof`
pub fn assembly_vector(nodes: &[usize]) -> Vec<usize> {
    nodes
        .iter()
        .flat_map(|&n| (0..DOF).map(move |j| DOF * n + j))
        .collect()
}
