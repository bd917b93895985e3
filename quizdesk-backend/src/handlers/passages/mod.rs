pub mod create;
pub mod dto;
pub mod get;

pub use create::create_passage;
pub use get::get_passage;
