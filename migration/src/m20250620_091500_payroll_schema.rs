use sea_orm_migration::prelude::{extension::postgres::Type, *};

use crate::{setup_user_table_fk, util::{create_enum, default_table_statement, default_user_table_statement, foreign_key, money, partial_unique_index}};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_type(create_enum(Enums::RoleType, &["admin", "hr", "manager", "employee"])).await?;
        manager.create_type(create_enum(Enums::EmployeeStatus, &["active", "inactive", "terminated"])).await?;
        manager.create_type(create_enum(Enums::PayFrequency, &["monthly"])).await?;
        manager.create_type(create_enum(Enums::PayrollStatus, &["draft", "calculated", "approved", "paid"])).await?;
        manager.create_type(create_enum(Enums::PayslipStatus, &["draft", "finalized", "paid", "cancelled"])).await?;

        manager
            .create_table(default_table_statement()
                .table(User::Table)
                .col(ColumnDef::new(User::Username)
                    .text()
                    .unique_key()
                    .not_null())
                .col(ColumnDef::new(User::Password)
                    .binary()
                    .not_null()) // SHA-256 of `{password}:{username}`
                .col(ColumnDef::new(User::Role)
                    .custom(Enums::RoleType)
                    .not_null())
                .col(ColumnDef::new(User::EmployeeId)
                    .uuid())
                .take()
            ).await?;

        manager
            .create_table(default_user_table_statement()
                .table(Employee::Table)
                .col(ColumnDef::new(Employee::EmployeeCode).text().unique_key().not_null())
                .col(ColumnDef::new(Employee::FirstName).text().not_null())
                .col(ColumnDef::new(Employee::LastName).text().not_null())
                .col(ColumnDef::new(Employee::Email).text().unique_key().not_null())
                .col(ColumnDef::new(Employee::Department).text())
                .col(ColumnDef::new(Employee::Position).text())
                .col(ColumnDef::new(Employee::HireDate).date().not_null())
                .col(ColumnDef::new(Employee::Status)
                    .custom(Enums::EmployeeStatus)
                    .not_null()
                    .default(Expr::val("active").cast_as(Enums::EmployeeStatus)))
                .col(ColumnDef::new(Employee::PanNumber).text())
                .col(ColumnDef::new(Employee::AadhaarNumber).text())
                .col(ColumnDef::new(Employee::UanNumber).text())
                .col(ColumnDef::new(Employee::PfNumber).text())
                .col(ColumnDef::new(Employee::EsiNumber).text())
                .col(ColumnDef::new(Employee::BankName).text())
                .col(ColumnDef::new(Employee::BankAccountNumber).text())
                .col(ColumnDef::new(Employee::IfscCode).text())
                .col(ColumnDef::new(Employee::State).text())
                .col(ColumnDef::new(Employee::PinCode).text())
                .take()
            ).await?;
        setup_user_table_fk!(manager, Employee::Table);

        manager.create_foreign_key(foreign_key((User::Table, User::EmployeeId), Employee::Table, ForeignKeyAction::SetNull)).await?;

        manager
            .create_table(default_user_table_statement()
                .table(SalaryStructure::Table)
                .col(ColumnDef::new(SalaryStructure::EmployeeId).uuid().not_null())
                .col(money(SalaryStructure::BasicSalary))
                .col(money(SalaryStructure::HouseRentAllowance))
                .col(money(SalaryStructure::ConveyanceAllowance))
                .col(money(SalaryStructure::MedicalAllowance))
                .col(money(SalaryStructure::SpecialAllowance))
                .col(money(SalaryStructure::Lta))
                .col(money(SalaryStructure::ShiftAllowance))
                .col(money(SalaryStructure::InternetAllowance))
                .col(money(SalaryStructure::Arrears))
                .col(money(SalaryStructure::MedicalPremium))
                .col(money(SalaryStructure::Nps))
                .col(money(SalaryStructure::VoluntaryPf))
                .col(ColumnDef::new(SalaryStructure::SkipProvidentFund).boolean().not_null().default(false))
                .col(ColumnDef::new(SalaryStructure::SkipEsic).boolean().not_null().default(false))
                .col(ColumnDef::new(SalaryStructure::SkipProfessionalTax).boolean().not_null().default(false))
                .col(ColumnDef::new(SalaryStructure::SkipTds).boolean().not_null().default(false))
                .col(ColumnDef::new(SalaryStructure::Currency).text().not_null().default("INR"))
                .col(ColumnDef::new(SalaryStructure::PayFrequency)
                    .custom(Enums::PayFrequency)
                    .not_null()
                    .default(Expr::val("monthly").cast_as(Enums::PayFrequency)))
                .col(ColumnDef::new(SalaryStructure::EffectiveFrom).date().not_null())
                .col(ColumnDef::new(SalaryStructure::IsActive).boolean().not_null().default(true))
                .check(Expr::col(SalaryStructure::BasicSalary).gt(0))
                .take()
            ).await?;
        setup_user_table_fk!(manager, SalaryStructure::Table);

        manager.create_foreign_key(foreign_key((SalaryStructure::Table, SalaryStructure::EmployeeId), Employee::Table, ForeignKeyAction::Restrict)).await?;

        // At most one active structure per employee.
        manager
            .get_connection()
            .execute_unprepared(&partial_unique_index("idx-salary_structure-active_employee", "salary_structure", "employee_id", "is_active"))
            .await?;

        manager
            .create_table(default_user_table_statement()
                .table(PayrollData::Table)
                .col(ColumnDef::new(PayrollData::EmployeeId).uuid().not_null())
                .col(ColumnDef::new(PayrollData::SalaryStructureId).uuid().not_null())
                .col(ColumnDef::new(PayrollData::Month).small_integer().not_null())
                .col(ColumnDef::new(PayrollData::Year).small_integer().not_null())
                .col(ColumnDef::new(PayrollData::WorkingDays).integer().not_null())
                .col(ColumnDef::new(PayrollData::PresentDays).integer().not_null())
                .col(ColumnDef::new(PayrollData::AbsentDays).integer().not_null().default(0))
                .col(ColumnDef::new(PayrollData::LopDays).integer().not_null().default(0))
                .col(ColumnDef::new(PayrollData::OvertimeHours).decimal_len(6, 2).not_null().default(0))
                .col(ColumnDef::new(PayrollData::Overrides).json_binary().not_null().default(Expr::cust("'{}'::jsonb")))
                .col(ColumnDef::new(PayrollData::Earnings).json_binary().not_null().default(Expr::cust("'{}'::jsonb")))
                .col(ColumnDef::new(PayrollData::Deductions).json_binary().not_null().default(Expr::cust("'{}'::jsonb")))
                .col(ColumnDef::new(PayrollData::EmployerContributions).json_binary().not_null().default(Expr::cust("'{}'::jsonb")))
                .col(money(PayrollData::GrossSalary))
                .col(money(PayrollData::TotalDeductions))
                .col(money(PayrollData::NetPay))
                .col(ColumnDef::new(PayrollData::RateTableVersion).text().not_null())
                .col(ColumnDef::new(PayrollData::Status)
                    .custom(Enums::PayrollStatus)
                    .not_null()
                    .default(Expr::val("draft").cast_as(Enums::PayrollStatus)))
                .col(ColumnDef::new(PayrollData::Remarks).text())
                .col(ColumnDef::new(PayrollData::ApprovedBy).uuid())
                .col(ColumnDef::new(PayrollData::ApprovedAt).timestamp_with_time_zone())
                .check(Expr::col(PayrollData::Month).between(1, 12))
                .take()
            ).await?;
        setup_user_table_fk!(manager, PayrollData::Table);

        manager.create_foreign_key(foreign_key((PayrollData::Table, PayrollData::EmployeeId), Employee::Table, ForeignKeyAction::Restrict)).await?;
        manager.create_foreign_key(foreign_key((PayrollData::Table, PayrollData::SalaryStructureId), SalaryStructure::Table, ForeignKeyAction::Restrict)).await?;
        manager.create_foreign_key(foreign_key((PayrollData::Table, PayrollData::ApprovedBy), User::Table, ForeignKeyAction::SetNull)).await?;

        manager
            .create_index(Index::create()
                .name("idx-payroll_data-employee_period")
                .table(PayrollData::Table)
                .col(PayrollData::EmployeeId)
                .col(PayrollData::Month)
                .col(PayrollData::Year)
                .unique()
                .take()
            ).await?;

        manager
            .create_table(default_user_table_statement()
                .table(PayslipTemplate::Table)
                .col(ColumnDef::new(PayslipTemplate::Name).text().unique_key().not_null())
                .col(ColumnDef::new(PayslipTemplate::EarningsFields).json_binary().not_null().default(Expr::cust("'[]'::jsonb")))
                .col(ColumnDef::new(PayslipTemplate::DeductionsFields).json_binary().not_null().default(Expr::cust("'[]'::jsonb")))
                .col(ColumnDef::new(PayslipTemplate::IsDefault).boolean().not_null().default(false))
                .col(ColumnDef::new(PayslipTemplate::IsActive).boolean().not_null().default(true))
                .take()
            ).await?;
        setup_user_table_fk!(manager, PayslipTemplate::Table);

        // At most one default template.
        manager
            .get_connection()
            .execute_unprepared(&partial_unique_index("idx-payslip_template-default", "payslip_template", "is_default", "is_default"))
            .await?;

        manager
            .create_table(default_table_statement()
                .table(Payslip::Table)
                .col(ColumnDef::new(Payslip::EmployeeId).uuid().not_null())
                .col(ColumnDef::new(Payslip::PayrollDataId).uuid().not_null())
                .col(ColumnDef::new(Payslip::TemplateId).uuid())
                .col(ColumnDef::new(Payslip::Month).small_integer().not_null())
                .col(ColumnDef::new(Payslip::Year).small_integer().not_null())
                .col(ColumnDef::new(Payslip::PayPeriod).text().not_null())
                .col(ColumnDef::new(Payslip::PayPeriodStart).date().not_null())
                .col(ColumnDef::new(Payslip::PayPeriodEnd).date().not_null())
                .col(ColumnDef::new(Payslip::PayslipNumber).text().unique_key().not_null())
                .col(ColumnDef::new(Payslip::EmployeeInfo).json_binary().not_null())
                .col(ColumnDef::new(Payslip::Earnings).json_binary().not_null())
                .col(ColumnDef::new(Payslip::Deductions).json_binary().not_null())
                .col(ColumnDef::new(Payslip::Attendance).json_binary().not_null())
                .col(money(Payslip::GrossSalary))
                .col(money(Payslip::TotalDeductions))
                .col(money(Payslip::NetPay))
                .col(ColumnDef::new(Payslip::NetPayInWords).text().not_null())
                .col(ColumnDef::new(Payslip::PaymentMode).text().not_null())
                .col(ColumnDef::new(Payslip::RateTableVersion).text().not_null())
                .col(ColumnDef::new(Payslip::Status)
                    .custom(Enums::PayslipStatus)
                    .not_null()
                    .default(Expr::val("draft").cast_as(Enums::PayslipStatus)))
                .col(ColumnDef::new(Payslip::IsLocked).boolean().not_null().default(false))
                .col(ColumnDef::new(Payslip::Version).integer().not_null().default(1))
                .col(ColumnDef::new(Payslip::ManuallyEdited).boolean().not_null().default(false))
                .col(ColumnDef::new(Payslip::GeneratedBy).uuid())
                .col(ColumnDef::new(Payslip::GeneratedAt).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(Payslip::LastEditedBy).uuid())
                .col(ColumnDef::new(Payslip::LastEditedAt).timestamp_with_time_zone())
                .col(ColumnDef::new(Payslip::FinalizedBy).uuid())
                .col(ColumnDef::new(Payslip::FinalizedAt).timestamp_with_time_zone())
                .col(ColumnDef::new(Payslip::PaidBy).uuid())
                .col(ColumnDef::new(Payslip::PaidAt).timestamp_with_time_zone())
                .col(ColumnDef::new(Payslip::PaymentMethod).text())
                .col(ColumnDef::new(Payslip::PaymentReference).text())
                .take()
            ).await?;

        manager.create_foreign_key(foreign_key((Payslip::Table, Payslip::EmployeeId), Employee::Table, ForeignKeyAction::Restrict)).await?;
        manager.create_foreign_key(foreign_key((Payslip::Table, Payslip::PayrollDataId), PayrollData::Table, ForeignKeyAction::Restrict)).await?;
        manager.create_foreign_key(foreign_key((Payslip::Table, Payslip::TemplateId), PayslipTemplate::Table, ForeignKeyAction::SetNull)).await?;

        for column in [Payslip::GeneratedBy, Payslip::LastEditedBy, Payslip::FinalizedBy, Payslip::PaidBy] {
            manager.create_foreign_key(foreign_key((Payslip::Table, column), User::Table, ForeignKeyAction::SetNull)).await?;
        }

        manager
            .create_index(Index::create()
                .name("idx-payslip-employee_period")
                .table(Payslip::Table)
                .col(Payslip::EmployeeId)
                .col(Payslip::Month)
                .col(Payslip::Year)
                .unique()
                .take()
            ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Reverse dependency order; the user <-> employee cycle goes with the cascade.
        for table in [
            Payslip::Table.into_table_ref(),
            PayslipTemplate::Table.into_table_ref(),
            PayrollData::Table.into_table_ref(),
            SalaryStructure::Table.into_table_ref(),
        ] {
            manager.drop_table(TableDropStatement::new().table(table).take()).await?;
        }

        manager.drop_table(TableDropStatement::new().table(Employee::Table).cascade().take()).await?;
        manager.drop_table(TableDropStatement::new().table(User::Table).take()).await?;

        for name in [Enums::PayslipStatus, Enums::PayrollStatus, Enums::PayFrequency, Enums::EmployeeStatus, Enums::RoleType] {
            manager.drop_type(Type::drop().name(name).to_owned()).await?;
        }

        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Enums {
    RoleType,
    EmployeeStatus,
    PayFrequency,
    PayrollStatus,
    PayslipStatus,
}

#[derive(DeriveIden)]
pub(crate) enum User {
    Table,
    Username,
    Password,
    Role,
    EmployeeId,
}

#[derive(DeriveIden)]
pub(crate) enum Employee {
    Table,
    EmployeeCode,
    FirstName,
    LastName,
    Email,
    Department,
    Position,
    HireDate,
    Status,
    PanNumber,
    AadhaarNumber,
    UanNumber,
    PfNumber,
    EsiNumber,
    BankName,
    BankAccountNumber,
    IfscCode,
    State,
    PinCode,
}

#[derive(DeriveIden)]
pub(crate) enum SalaryStructure {
    Table,
    EmployeeId,
    BasicSalary,
    HouseRentAllowance,
    ConveyanceAllowance,
    MedicalAllowance,
    SpecialAllowance,
    Lta,
    ShiftAllowance,
    InternetAllowance,
    Arrears,
    MedicalPremium,
    Nps,
    VoluntaryPf,
    SkipProvidentFund,
    SkipEsic,
    SkipProfessionalTax,
    SkipTds,
    Currency,
    PayFrequency,
    EffectiveFrom,
    IsActive,
}

#[derive(DeriveIden)]
enum PayrollData {
    Table,
    EmployeeId,
    SalaryStructureId,
    Month,
    Year,
    WorkingDays,
    PresentDays,
    AbsentDays,
    LopDays,
    OvertimeHours,
    Overrides,
    Earnings,
    Deductions,
    EmployerContributions,
    GrossSalary,
    TotalDeductions,
    NetPay,
    RateTableVersion,
    Status,
    Remarks,
    ApprovedBy,
    ApprovedAt,
}

#[derive(DeriveIden)]
enum PayslipTemplate {
    Table,
    Name,
    EarningsFields,
    DeductionsFields,
    IsDefault,
    IsActive,
}

#[derive(DeriveIden)]
enum Payslip {
    Table,
    EmployeeId,
    PayrollDataId,
    TemplateId,
    Month,
    Year,
    PayPeriod,
    PayPeriodStart,
    PayPeriodEnd,
    PayslipNumber,
    EmployeeInfo,
    Earnings,
    Deductions,
    Attendance,
    GrossSalary,
    TotalDeductions,
    NetPay,
    NetPayInWords,
    PaymentMode,
    RateTableVersion,
    Status,
    IsLocked,
    Version,
    ManuallyEdited,
    GeneratedBy,
    GeneratedAt,
    LastEditedBy,
    LastEditedAt,
    FinalizedBy,
    FinalizedAt,
    PaidBy,
    PaidAt,
    PaymentMethod,
    PaymentReference,
}
