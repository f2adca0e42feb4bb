pub mod chat;
pub mod lenient;
pub mod tender;
