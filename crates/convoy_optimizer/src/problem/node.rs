use crate::{define_index_newtype, problem::travel_matrices::Load};

define_index_newtype!(NodeIdx, Load);
