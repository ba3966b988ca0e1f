//! Core data types: bills, documents, chat turns.

pub mod bill;
pub mod chat;
pub mod document;

pub use bill::Bill;
pub use chat::{ChatRole, ChatTurn};
pub use document::{DocType, Document};
