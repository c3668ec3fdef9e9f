//! 待审批会话的内存存储

pub mod store;

pub use store::{Session, SessionStore};
