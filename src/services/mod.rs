pub mod employee_service;
pub mod employee_service_impl;
pub use employee_service::{
    EmployeeError, EmployeeService, EmployeeUpdate, LoginOutcome, NewEmployee, Role,
};
pub use employee_service_impl::DefaultEmployeeService;

pub mod leave_service;
pub mod leave_service_impl;
pub use leave_service::{LeaveError, LeaveService, NewLeave};
pub use leave_service_impl::DefaultLeaveService;

pub mod payroll_service;
pub mod payroll_service_impl;
pub use payroll_service::{PayrollError, PayrollOverrides, PayrollService};
pub use payroll_service_impl::DefaultPayrollService;
