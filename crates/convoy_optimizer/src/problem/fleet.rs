use serde::Serialize;

use crate::problem::travel_matrices::Load;

/// Homogeneous fleet: every vehicle shares the same capacity.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Fleet {
    size: usize,
    capacity: Load,
}

impl Fleet {
    pub fn new(size: usize, capacity: Load) -> Self {
        Fleet { size, capacity }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn capacity(&self) -> Load {
        self.capacity
    }

    pub fn total_capacity(&self) -> Load {
        self.capacity * self.size as Load
    }
}
