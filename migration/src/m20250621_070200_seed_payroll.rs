use sea_orm_migration::prelude::*;
use sha2::Digest as _;

use crate::m20250620_091500_payroll_schema::{Employee, SalaryStructure, User};

const EMPLOYEES: u128 = 20;
const EMPLOYEE_ID_OFFSET: u128 = 0x1_0000;
const STRUCTURE_ID_OFFSET: u128 = 0x2_0000;
const ADMIN_ID: u128 = 12345;
const HR_ID: u128 = 12346;

const DEPARTMENTS: [&str; 4] = ["Engineering", "Finance", "Operations", "Sales"];

fn seeded_id(n: u128) -> SimpleExpr {
    Expr::val(format!("{n:032x}")).cast_as("uuid")
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let time = Expr::val("2025-06-21T07:02:00.000Z").cast_as("timestamptz");

        for (id, username, role) in [(ADMIN_ID, "admin", "admin"), (HR_ID, "hr", "hr")] {
            let hashed_password = &sha2::Sha256::digest(format!("{username}:{username}"))[..];

            manager
                .exec_stmt(Query::insert()
                    .into_table(User::Table)
                    .columns(["id", "created_at", "updated_at", "username", "password", "role"])
                    .values_panic([seeded_id(id), time.clone(), time.clone(), username.into(), hashed_password.into(), Expr::val(role).cast_as("role_type")])
                    .to_owned()
            ).await?;
        }

        // Creates employees, each with a login and an active salary structure
        for i in 1..=EMPLOYEES {
            let code = format!("EMP{i:04}");
            let username = code.to_lowercase();
            let department = DEPARTMENTS[(i as usize) % DEPARTMENTS.len()];

            manager
                .exec_stmt(Query::insert()
                    .into_table(Employee::Table)
                    .columns(["id", "created_at", "updated_at", "created_by", "employee_code", "first_name", "last_name", "email", "department", "hire_date", "state"])
                    .values_panic([
                        seeded_id(EMPLOYEE_ID_OFFSET + i),
                        time.clone(),
                        time.clone(),
                        seeded_id(HR_ID),
                        code.clone().into(),
                        "Employee".into(),
                        code.clone().into(),
                        format!("{username}@example.com").into(),
                        department.into(),
                        Expr::val("2024-04-01").cast_as("date"),
                        "Maharashtra".into(),
                    ])
                    .to_owned()
            ).await?;

            let hashed_password = &sha2::Sha256::digest(format!("{username}:{username}"))[..];

            manager
                .exec_stmt(Query::insert()
                    .into_table(User::Table)
                    .columns(["id", "created_at", "updated_at", "username", "password", "role", "employee_id"])
                    .values_panic([seeded_id(i), time.clone(), time.clone(), username.into(), hashed_password.into(), Expr::val("employee").cast_as("role_type"), seeded_id(EMPLOYEE_ID_OFFSET + i)])
                    .to_owned()
            ).await?;

            // Whole hundreds between 12,000 and 60,000
            let basic = rand::random_range(120..=600_i64) * 100;

            manager
                .exec_stmt(Query::insert()
                    .into_table(SalaryStructure::Table)
                    .columns(["id", "created_at", "updated_at", "created_by", "employee_id", "basic_salary", "house_rent_allowance", "special_allowance", "effective_from"])
                    .values_panic([
                        seeded_id(STRUCTURE_ID_OFFSET + i),
                        time.clone(),
                        time.clone(),
                        seeded_id(HR_ID),
                        seeded_id(EMPLOYEE_ID_OFFSET + i),
                        basic.into(),
                        (basic * 2 / 5).into(),
                        (basic / 10).into(),
                        Expr::val("2025-04-01").cast_as("date"),
                    ])
                    .to_owned()
            ).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for i in 1..=EMPLOYEES {
            manager
                .exec_stmt(Query::delete()
                    .from_table(SalaryStructure::Table)
                    .and_where(Expr::col("id").eq(seeded_id(STRUCTURE_ID_OFFSET + i)))
                    .to_owned()
            ).await?;

            manager
                .exec_stmt(Query::delete()
                    .from_table(User::Table)
                    .and_where(Expr::col("id").eq(seeded_id(i)))
                    .to_owned()
            ).await?;

            manager
                .exec_stmt(Query::delete()
                    .from_table(Employee::Table)
                    .and_where(Expr::col("id").eq(seeded_id(EMPLOYEE_ID_OFFSET + i)))
                    .to_owned()
            ).await?;
        }

        for id in [ADMIN_ID, HR_ID] {
            manager
                .exec_stmt(Query::delete()
                    .from_table(User::Table)
                    .and_where(Expr::col("id").eq(seeded_id(id)))
                    .to_owned()
            ).await?;
        }

        Ok(())
    }
}
