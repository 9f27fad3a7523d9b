//! Per-session state: profile, conversation memory and their storage

pub mod context;
pub mod filter;
pub mod memory;
pub mod profile;
pub mod storage;

pub use context::SessionContext;
pub use memory::{ConversationMemory, ConversationRecord};
pub use profile::UserProfile;
pub use storage::Storage;
