pub use super::employees::Entity as Employees;
pub use super::leave_requests::Entity as LeaveRequests;
pub use super::salary_records::Entity as SalaryRecords;
pub use super::sync_outbox::Entity as SyncOutbox;
