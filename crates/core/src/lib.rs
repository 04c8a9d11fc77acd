//! Domain records, validated forms, and error definitions.
//!
//! Foundation crate -- no async or I/O dependencies.

pub mod error;
pub mod form;
pub mod types;

pub use error::{HrdeskError, HrdeskResult};
pub use form::{EmployeeUpdate, EmploymentStatus, Gender, MaritalStatus, NewEmployee};
pub use types::{Credentials, Employee, EmployeeState, LoginResponse, Session, User};
