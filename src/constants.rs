/// Password assigned on hire and on admin reset.
pub const DEFAULT_EMPLOYEE_PASSWORD: &str = "1234";

pub mod leave {

    /// Pending requests older than this are approved by the sweep.
    pub const AUTO_APPROVE_DWELL_MS: i64 = 6 * 60 * 60 * 1000;

    pub const DEFAULT_REJECTION_REASON: &str = "No reason given";
}

pub mod payroll {

    /// Salaries are disbursed on this day of the payout month.
    pub const PAY_DAY_OF_MONTH: u32 = 10;
}

pub mod auth {

    pub const MIN_PASSWORD_LENGTH: usize = 4;

    pub const SESSION_IDLE_MINUTES: i64 = 60;
}
