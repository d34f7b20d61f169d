pub use sea_orm_migration::prelude::*;

mod util;
mod m20250620_091500_payroll_schema;
mod m20250621_070200_seed_payroll;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250620_091500_payroll_schema::Migration),
            Box::new(m20250621_070200_seed_payroll::Migration),
        ]
    }
}
