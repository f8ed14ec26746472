use std::sync::Arc;

use serde::Serialize;

use crate::problem::node::NodeIdx;

pub type Distance = i64;
pub type Duration = i64;
pub type Cost = i64;
pub type Load = i64;

/// Selects which matrix the search minimizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Objective {
    Distance,
    TravelTime,
}

/// Flat row-major storage for the distance and duration matrices.
/// The entry for a pair of nodes sits at `from * num_nodes + to`.
#[derive(Debug, Clone, Serialize)]
pub struct TravelMatrices {
    distances: Arc<Vec<Distance>>,
    durations: Arc<Vec<Duration>>,
    num_nodes: usize,
    distances_symmetric: bool,
    durations_symmetric: bool,
}

fn is_flat_matrix_symmetric(matrix: &[i64], num_nodes: usize) -> bool {
    for i in 0..num_nodes {
        for j in 0..i {
            if matrix[i * num_nodes + j] != matrix[j * num_nodes + i] {
                return false;
            }
        }
    }
    true
}

impl TravelMatrices {
    /// Rows must already be validated as square and of equal size.
    pub(super) fn from_rows(distances: Vec<Vec<Distance>>, durations: Vec<Vec<Duration>>) -> Self {
        let num_nodes = distances.len();

        let distances: Vec<Distance> = distances.into_iter().flatten().collect();
        let durations: Vec<Duration> = durations.into_iter().flatten().collect();

        let distances_symmetric = is_flat_matrix_symmetric(&distances, num_nodes);
        let durations_symmetric = is_flat_matrix_symmetric(&durations, num_nodes);

        TravelMatrices {
            distances: Arc::new(distances),
            durations: Arc::new(durations),
            num_nodes,
            distances_symmetric,
            durations_symmetric,
        }
    }

    #[inline(always)]
    fn index(&self, from: NodeIdx, to: NodeIdx) -> usize {
        from.get() * self.num_nodes + to.get()
    }

    #[inline(always)]
    pub fn distance(&self, from: NodeIdx, to: NodeIdx) -> Distance {
        if from == to {
            return 0;
        }

        self.distances[self.index(from, to)]
    }

    #[inline(always)]
    pub fn duration(&self, from: NodeIdx, to: NodeIdx) -> Duration {
        if from == to {
            return 0;
        }

        self.durations[self.index(from, to)]
    }

    #[inline(always)]
    pub fn cost(&self, objective: Objective, from: NodeIdx, to: NodeIdx) -> Cost {
        match objective {
            Objective::Distance => self.distance(from, to),
            Objective::TravelTime => self.duration(from, to),
        }
    }

    pub fn is_symmetric(&self, objective: Objective) -> bool {
        match objective {
            Objective::Distance => self.distances_symmetric,
            Objective::TravelTime => self.durations_symmetric,
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrices() -> TravelMatrices {
        TravelMatrices::from_rows(
            vec![vec![0, 2, 9], vec![2, 0, 4], vec![9, 4, 0]],
            vec![vec![0, 1, 5], vec![3, 0, 2], vec![5, 2, 0]],
        )
    }

    #[test]
    fn test_flat_lookup() {
        let matrices = matrices();

        assert_eq!(matrices.distance(NodeIdx::new(0), NodeIdx::new(2)), 9);
        assert_eq!(matrices.distance(NodeIdx::new(2), NodeIdx::new(1)), 4);
        assert_eq!(matrices.duration(NodeIdx::new(1), NodeIdx::new(0)), 3);
    }

    #[test]
    fn test_diagonal_is_zero() {
        let matrices = matrices();

        for i in 0..matrices.num_nodes() {
            assert_eq!(matrices.distance(NodeIdx::new(i), NodeIdx::new(i)), 0);
            assert_eq!(matrices.duration(NodeIdx::new(i), NodeIdx::new(i)), 0);
        }
    }

    #[test]
    fn test_symmetry_flags() {
        let matrices = matrices();

        assert!(matrices.is_symmetric(Objective::Distance));
        assert!(!matrices.is_symmetric(Objective::TravelTime));
    }

    #[test]
    fn test_objective_selects_matrix() {
        let matrices = matrices();
        let (from, to) = (NodeIdx::new(0), NodeIdx::new(1));

        assert_eq!(matrices.cost(Objective::Distance, from, to), 2);
        assert_eq!(matrices.cost(Objective::TravelTime, from, to), 1);
    }
}
