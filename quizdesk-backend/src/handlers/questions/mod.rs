pub mod create;
pub mod dto;
pub mod get;

pub use create::create_question;
pub use get::get_question;
