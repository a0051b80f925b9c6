use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Employees::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Employees::Name).string().not_null())
                    .col(ColumnDef::new(Employees::JobTitle).string().not_null())
                    .col(ColumnDef::new(Employees::Gender).string().not_null())
                    .col(ColumnDef::new(Employees::JoinDate).string().not_null())
                    .col(
                        ColumnDef::new(Employees::ProbationSalary)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Employees::FullSalary).double().not_null())
                    .col(
                        ColumnDef::new(Employees::ProbationMonths)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Employees::PasswordHash)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Employees::FirstLogin)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Employees::Synced)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Employees::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Employees::LocalUpdatedAt)
                            .string()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LeaveRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LeaveRequests::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LeaveRequests::EmployeeId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LeaveRequests::EmployeeName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LeaveRequests::StartDate)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LeaveRequests::EndDate).string().not_null())
                    .col(ColumnDef::new(LeaveRequests::Days).integer().not_null())
                    .col(ColumnDef::new(LeaveRequests::Reason).string().not_null())
                    .col(ColumnDef::new(LeaveRequests::Status).string().not_null())
                    .col(
                        ColumnDef::new(LeaveRequests::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LeaveRequests::RejectionReason).string())
                    .col(
                        ColumnDef::new(LeaveRequests::Synced)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(LeaveRequests::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LeaveRequests::LocalUpdatedAt)
                            .string()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_leave_requests_employee")
                    .table(LeaveRequests::Table)
                    .col(LeaveRequests::EmployeeId)
                    .to_owned(),
            )
            .await?;

        // No foreign key from salary_records to employees: salary history is
        // retained after the employee record is deleted.
        manager
            .create_table(
                Table::create()
                    .table(SalaryRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SalaryRecords::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SalaryRecords::EmployeeId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SalaryRecords::EmployeeName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SalaryRecords::PayoutMonth)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SalaryRecords::BasicSalary)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SalaryRecords::ManualWorkDays).double())
                    .col(
                        ColumnDef::new(SalaryRecords::StandardSalary)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SalaryRecords::LeaveDeduction)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SalaryRecords::SalesAmount)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SalaryRecords::BonusRate)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SalaryRecords::BonusAmount)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SalaryRecords::AttendanceBonus)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SalaryRecords::TotalSalary)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SalaryRecords::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SalaryRecords::Synced)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(SalaryRecords::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SalaryRecords::LocalUpdatedAt)
                            .string()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_salary_records_employee")
                    .table(SalaryRecords::Table)
                    .col(SalaryRecords::EmployeeId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SyncOutbox::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SyncOutbox::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SyncOutbox::Collection).string().not_null())
                    .col(ColumnDef::new(SyncOutbox::RecordId).string().not_null())
                    .col(ColumnDef::new(SyncOutbox::Op).string().not_null())
                    .col(ColumnDef::new(SyncOutbox::Payload).text())
                    .col(
                        ColumnDef::new(SyncOutbox::Version)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SyncOutbox::Status).string().not_null())
                    .col(
                        ColumnDef::new(SyncOutbox::Attempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(SyncOutbox::LastError).string())
                    .col(ColumnDef::new(SyncOutbox::CreatedAt).string().not_null())
                    .col(ColumnDef::new(SyncOutbox::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sync_outbox_status")
                    .table(SyncOutbox::Table)
                    .col(SyncOutbox::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sync_outbox_record")
                    .table(SyncOutbox::Table)
                    .col(SyncOutbox::Collection)
                    .col(SyncOutbox::RecordId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SyncOutbox::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SalaryRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LeaveRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Employees::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Employees {
    Table,
    Id,
    Name,
    JobTitle,
    Gender,
    JoinDate,
    ProbationSalary,
    FullSalary,
    ProbationMonths,
    PasswordHash,
    FirstLogin,
    Synced,
    Version,
    LocalUpdatedAt,
}

#[derive(DeriveIden)]
enum LeaveRequests {
    Table,
    Id,
    EmployeeId,
    EmployeeName,
    StartDate,
    EndDate,
    Days,
    Reason,
    Status,
    CreatedAt,
    RejectionReason,
    Synced,
    Version,
    LocalUpdatedAt,
}

#[derive(DeriveIden)]
enum SalaryRecords {
    Table,
    Id,
    EmployeeId,
    EmployeeName,
    PayoutMonth,
    BasicSalary,
    ManualWorkDays,
    StandardSalary,
    LeaveDeduction,
    SalesAmount,
    BonusRate,
    BonusAmount,
    AttendanceBonus,
    TotalSalary,
    UpdatedAt,
    Synced,
    Version,
    LocalUpdatedAt,
}

#[derive(DeriveIden)]
enum SyncOutbox {
    Table,
    Id,
    Collection,
    RecordId,
    Op,
    Payload,
    Version,
    Status,
    Attempts,
    LastError,
    CreatedAt,
    UpdatedAt,
}
