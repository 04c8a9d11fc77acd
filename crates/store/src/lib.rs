//! Observable state and the managers that mirror server state into it.
//!
//! Managers are plain values: construct them once in the application
//! context and hand references to whatever needs them.

pub mod employees;
pub mod session;
pub mod storage;
pub mod store;

pub use employees::{EmployeeCollection, RefreshOutcome};
pub use session::AuthSession;
pub use storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage};
pub use store::{Readable, Store, Subscription};
