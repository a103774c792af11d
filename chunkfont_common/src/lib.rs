pub mod character_set;
pub mod hashing;
pub mod paths;

pub const FILTER_SPEC: &str = "debug,tokio=info,runtime=info";
