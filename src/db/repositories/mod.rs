pub mod employee;
pub mod leave;
pub mod outbox;
pub mod salary;
