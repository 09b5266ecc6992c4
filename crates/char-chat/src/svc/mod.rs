pub mod chat;
pub mod safety;
