use crate::{define_index_newtype, solver::solution::route::RouteState};

define_index_newtype!(RouteIdx, RouteState);
