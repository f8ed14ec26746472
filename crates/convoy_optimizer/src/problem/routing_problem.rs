use serde::Serialize;

use crate::problem::{
    fleet::Fleet,
    node::NodeIdx,
    travel_matrices::{Cost, Distance, Duration, Load, Objective, TravelMatrices},
    validation::ValidationError,
};

/// Immutable routing instance: travel matrices, per-node demands and the
/// fleet. Node 0-based indices follow the matrix order and index 0 is the
/// depot unless the builder says otherwise. Built once through
/// [`RoutingProblemBuilder`], which validates the shape so the accessors can
/// stay unchecked.
#[derive(Debug, Clone, Serialize)]
pub struct RoutingProblem {
    matrices: TravelMatrices,
    demands: Vec<Load>,
    labels: Vec<String>,
    depot: NodeIdx,
    fleet: Fleet,
}

impl RoutingProblem {
    pub fn num_nodes(&self) -> usize {
        self.matrices.num_nodes()
    }

    pub fn num_vehicles(&self) -> usize {
        self.fleet.size()
    }

    pub fn depot(&self) -> NodeIdx {
        self.depot
    }

    #[inline(always)]
    pub fn demand(&self, node: NodeIdx) -> Load {
        self.demands[node]
    }

    #[inline(always)]
    pub fn distance(&self, from: NodeIdx, to: NodeIdx) -> Distance {
        self.matrices.distance(from, to)
    }

    #[inline(always)]
    pub fn duration(&self, from: NodeIdx, to: NodeIdx) -> Duration {
        self.matrices.duration(from, to)
    }

    #[inline(always)]
    pub fn cost(&self, objective: Objective, from: NodeIdx, to: NodeIdx) -> Cost {
        self.matrices.cost(objective, from, to)
    }

    pub fn vehicle_capacity(&self) -> Load {
        self.fleet.capacity()
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn matrices(&self) -> &TravelMatrices {
        &self.matrices
    }

    pub fn label(&self, node: NodeIdx) -> Option<&str> {
        self.labels.get(node.get()).map(String::as_str)
    }

    pub fn total_demand(&self) -> Load {
        self.demands.iter().sum()
    }

    /// Every node of the instance, depot included, in index order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeIdx> {
        (0..self.demands.len()).map(NodeIdx::new)
    }

    /// Every demand node, in index order.
    pub fn customers(&self) -> impl Iterator<Item = NodeIdx> {
        let depot = self.depot;
        (0..self.demands.len())
            .map(NodeIdx::new)
            .filter(move |&node| node != depot)
    }
}

/// Assembles a [`RoutingProblem`], validating the matrix shapes, the demand
/// vector and the fleet before anything reaches the solver.
#[derive(Debug, Default)]
pub struct RoutingProblemBuilder {
    distances: Vec<Vec<Distance>>,
    durations: Option<Vec<Vec<Duration>>>,
    demands: Vec<Load>,
    labels: Vec<String>,
    depot: usize,
    num_vehicles: usize,
    vehicle_capacity: Load,
}

impl RoutingProblemBuilder {
    pub fn set_distances(&mut self, rows: Vec<Vec<Distance>>) {
        self.distances = rows;
    }

    /// Defaults to an all-zero matrix when never called.
    pub fn set_durations(&mut self, rows: Vec<Vec<Duration>>) {
        self.durations = Some(rows);
    }

    pub fn set_demands(&mut self, demands: Vec<Load>) {
        self.demands = demands;
    }

    pub fn set_labels(&mut self, labels: Vec<String>) {
        self.labels = labels;
    }

    pub fn set_depot(&mut self, depot: usize) {
        self.depot = depot;
    }

    pub fn set_num_vehicles(&mut self, num_vehicles: usize) {
        self.num_vehicles = num_vehicles;
    }

    pub fn set_vehicle_capacity(&mut self, capacity: Load) {
        self.vehicle_capacity = capacity;
    }

    pub fn build(self) -> Result<RoutingProblem, ValidationError> {
        let nodes = self.distances.len();

        for (row, entries) in self.distances.iter().enumerate() {
            if entries.len() != nodes {
                return Err(ValidationError::NonSquareDistances {
                    row,
                    len: entries.len(),
                    expected: nodes,
                });
            }
        }

        let durations = self
            .durations
            .unwrap_or_else(|| vec![vec![0; nodes]; nodes]);

        if durations.len() != nodes {
            return Err(ValidationError::MatrixSizeMismatch {
                durations: durations.len(),
                nodes,
            });
        }

        for (row, entries) in durations.iter().enumerate() {
            if entries.len() != nodes {
                return Err(ValidationError::NonSquareDurations {
                    row,
                    len: entries.len(),
                    expected: nodes,
                });
            }
        }

        check_entries("distance", &self.distances)?;
        check_entries("duration", &durations)?;

        if self.demands.len() != nodes {
            return Err(ValidationError::DemandLengthMismatch {
                demands: self.demands.len(),
                nodes,
            });
        }

        if let Some((node, &demand)) = self.demands.iter().enumerate().find(|&(_, &d)| d < 0) {
            return Err(ValidationError::NegativeDemand { node, demand });
        }

        if !self.labels.is_empty() && self.labels.len() != nodes {
            return Err(ValidationError::LabelLengthMismatch {
                labels: self.labels.len(),
                nodes,
            });
        }

        if self.depot >= nodes {
            return Err(ValidationError::DepotOutOfRange {
                depot: self.depot,
                nodes,
            });
        }

        let depot_demand = self.demands[self.depot];
        if depot_demand != 0 {
            return Err(ValidationError::DepotDemand {
                depot: self.depot,
                demand: depot_demand,
            });
        }

        if self.num_vehicles == 0 {
            return Err(ValidationError::NoVehicles);
        }

        if self.vehicle_capacity <= 0 {
            return Err(ValidationError::NonPositiveCapacity(self.vehicle_capacity));
        }

        Ok(RoutingProblem {
            matrices: TravelMatrices::from_rows(self.distances, durations),
            demands: self.demands,
            labels: self.labels,
            depot: NodeIdx::new(self.depot),
            fleet: Fleet::new(self.num_vehicles, self.vehicle_capacity),
        })
    }
}

fn check_entries(matrix: &'static str, rows: &[Vec<i64>]) -> Result<(), ValidationError> {
    for (from, entries) in rows.iter().enumerate() {
        for (to, &value) in entries.iter().enumerate() {
            if value < 0 {
                return Err(ValidationError::NegativeMatrixEntry {
                    matrix,
                    from,
                    to,
                    value,
                });
            }
            if from == to && value != 0 {
                return Err(ValidationError::NonZeroDiagonal {
                    matrix,
                    node: from,
                    value,
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic_builder() -> RoutingProblemBuilder {
        let mut builder = RoutingProblemBuilder::default();
        builder.set_distances(vec![vec![0, 3, 7], vec![3, 0, 2], vec![7, 2, 0]]);
        builder.set_durations(vec![vec![0, 1, 4], vec![1, 0, 1], vec![4, 1, 0]]);
        builder.set_demands(vec![0, 4, 6]);
        builder.set_num_vehicles(2);
        builder.set_vehicle_capacity(10);
        builder
    }

    #[test]
    fn test_build_and_accessors() {
        let problem = basic_builder().build().unwrap();

        assert_eq!(problem.num_nodes(), 3);
        assert_eq!(problem.num_vehicles(), 2);
        assert_eq!(problem.depot(), NodeIdx::new(0));
        assert_eq!(problem.vehicle_capacity(), 10);
        assert_eq!(problem.demand(NodeIdx::new(2)), 6);
        assert_eq!(problem.distance(NodeIdx::new(0), NodeIdx::new(2)), 7);
        assert_eq!(problem.duration(NodeIdx::new(2), NodeIdx::new(1)), 1);
        assert_eq!(problem.total_demand(), 10);
        assert_eq!(problem.customers().collect::<Vec<_>>().len(), 2);
    }

    #[test]
    fn test_missing_durations_default_to_zero() {
        let mut builder = basic_builder();
        builder.durations = None;
        let problem = builder.build().unwrap();

        assert_eq!(problem.duration(NodeIdx::new(0), NodeIdx::new(2)), 0);
        assert_eq!(problem.distance(NodeIdx::new(0), NodeIdx::new(2)), 7);
    }

    #[test]
    fn test_rejects_non_square_distances() {
        let mut builder = basic_builder();
        builder.set_distances(vec![vec![0, 3, 7], vec![3, 0], vec![7, 2, 0]]);

        assert_eq!(
            builder.build().unwrap_err(),
            ValidationError::NonSquareDistances {
                row: 1,
                len: 2,
                expected: 3
            }
        );
    }

    #[test]
    fn test_rejects_duration_size_mismatch() {
        let mut builder = basic_builder();
        builder.set_durations(vec![vec![0, 1], vec![1, 0]]);

        assert_eq!(
            builder.build().unwrap_err(),
            ValidationError::MatrixSizeMismatch {
                durations: 2,
                nodes: 3
            }
        );
    }

    #[test]
    fn test_rejects_demand_length_mismatch() {
        let mut builder = basic_builder();
        builder.set_demands(vec![0, 4]);

        assert_eq!(
            builder.build().unwrap_err(),
            ValidationError::DemandLengthMismatch {
                demands: 2,
                nodes: 3
            }
        );
    }

    #[test]
    fn test_rejects_label_length_mismatch() {
        let mut builder = basic_builder();
        builder.set_labels(vec!["depot".to_owned()]);

        assert_eq!(
            builder.build().unwrap_err(),
            ValidationError::LabelLengthMismatch { labels: 1, nodes: 3 }
        );
    }

    #[test]
    fn test_rejects_depot_out_of_range() {
        let mut builder = basic_builder();
        builder.set_depot(3);

        assert_eq!(
            builder.build().unwrap_err(),
            ValidationError::DepotOutOfRange { depot: 3, nodes: 3 }
        );
    }

    #[test]
    fn test_rejects_negative_matrix_entry() {
        let mut builder = basic_builder();
        builder.set_distances(vec![vec![0, 3, 7], vec![3, 0, -2], vec![7, 2, 0]]);

        assert_eq!(
            builder.build().unwrap_err(),
            ValidationError::NegativeMatrixEntry {
                matrix: "distance",
                from: 1,
                to: 2,
                value: -2
            }
        );
    }

    #[test]
    fn test_rejects_non_zero_diagonal() {
        let mut builder = basic_builder();
        builder.set_durations(vec![vec![0, 1, 4], vec![1, 5, 1], vec![4, 1, 0]]);

        assert_eq!(
            builder.build().unwrap_err(),
            ValidationError::NonZeroDiagonal {
                matrix: "duration",
                node: 1,
                value: 5
            }
        );
    }

    #[test]
    fn test_rejects_negative_demand() {
        let mut builder = basic_builder();
        builder.set_demands(vec![0, -4, 6]);

        assert_eq!(
            builder.build().unwrap_err(),
            ValidationError::NegativeDemand { node: 1, demand: -4 }
        );
    }

    #[test]
    fn test_rejects_demand_at_the_depot() {
        let mut builder = basic_builder();
        builder.set_demands(vec![2, 4, 6]);

        assert_eq!(
            builder.build().unwrap_err(),
            ValidationError::DepotDemand { depot: 0, demand: 2 }
        );
    }

    #[test]
    fn test_rejects_empty_fleet() {
        let mut builder = basic_builder();
        builder.set_num_vehicles(0);

        assert_eq!(builder.build().unwrap_err(), ValidationError::NoVehicles);
    }

    #[test]
    fn test_rejects_non_positive_capacity() {
        let mut builder = basic_builder();
        builder.set_vehicle_capacity(0);

        assert_eq!(
            builder.build().unwrap_err(),
            ValidationError::NonPositiveCapacity(0)
        );
    }

    #[test]
    fn test_labels_are_optional() {
        let problem = basic_builder().build().unwrap();
        assert_eq!(problem.label(NodeIdx::new(1)), None);

        let mut builder = basic_builder();
        builder.set_labels(vec!["depot".to_owned(), "a".to_owned(), "b".to_owned()]);
        let problem = builder.build().unwrap();
        assert_eq!(problem.label(NodeIdx::new(1)), Some("a"));
    }

    #[test]
    fn test_depot_only_instance_is_valid() {
        let mut builder = RoutingProblemBuilder::default();
        builder.set_distances(vec![vec![0]]);
        builder.set_demands(vec![0]);
        builder.set_num_vehicles(1);
        builder.set_vehicle_capacity(5);

        let problem = builder.build().unwrap();
        assert_eq!(problem.num_nodes(), 1);
        assert_eq!(problem.customers().count(), 0);
    }
}
