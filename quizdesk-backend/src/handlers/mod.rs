pub mod explanations;
pub mod passages;
pub mod questions;
pub mod utils;
