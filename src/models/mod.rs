pub mod employee;
pub mod leave;
pub mod month;
pub mod salary;
pub mod sync;

pub use employee::{Employee, Gender};
pub use leave::{LeaveRequest, LeaveStatus};
pub use month::Month;
pub use salary::SalaryRecord;
pub use sync::{Collection, OutboxEntry, OutboxOp, OutboxStatus, SyncEntity, Versioned};
