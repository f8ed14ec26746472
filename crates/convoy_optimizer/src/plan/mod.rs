pub mod decode;
pub mod route_plan;
