// src/attachments/mod.rs

pub mod handlers;
pub mod store;

pub use store::{Attachment, AttachmentStore, Signature};
