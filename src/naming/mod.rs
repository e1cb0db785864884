pub mod advisor;
pub mod backend;
