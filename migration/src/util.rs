use sea_orm_migration::prelude::{extension::postgres::{Type, TypeCreateStatement}, *};

pub(crate) fn default_table_statement() -> TableCreateStatement {
    TableCreateStatement::new()
        .if_not_exists()
        .col(ColumnDef::new(DefaultColumn::Id)
            .uuid()
            .primary_key()
            .default(Expr::cust("GEN_RANDOM_UUID()"))
            .take())
        .col(ColumnDef::new(DefaultColumn::CreatedAt)
            .timestamp_with_time_zone()
            .not_null()
            .default(Expr::current_timestamp())
            .take())
        .col(ColumnDef::new(DefaultColumn::UpdatedAt)
            .timestamp_with_time_zone()
            .not_null()
            .default(Expr::current_timestamp())
            .take())
        .take()
}

#[derive(DeriveIden)]
pub(crate) enum DefaultColumn {
    Id,
    CreatedAt,
    UpdatedAt,
}

/// Must run `setup_user_table_fk` macro on the table afterwards
///
/// # Example
///
/// ```rs
/// manager
///     .create_table(default_user_table_statement()
///         .table(PayslipTemplate::Table)
///         .col(ColumnDef::new(PayslipTemplate::Name)
///             .text()
///             .not_null())
///         .take()
///     ).await?;
/// setup_user_table_fk!(manager, PayslipTemplate::Table);
/// ```
pub(crate) fn default_user_table_statement() -> TableCreateStatement {
    default_table_statement()
        .col(ColumnDef::new(DefaultUserColumn::CreatedBy)
            .uuid())
        .col(ColumnDef::new(DefaultUserColumn::UpdatedBy)
            .uuid())
        .take()
}

/// Monetary amount, exact to the paisa.
pub(crate) fn money<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .decimal_len(12, 2)
        .not_null()
        .default(0)
        .take()
}

pub(crate) fn create_enum<T: IntoIden>(name: T, values: &[&'static str]) -> TypeCreateStatement {
    Type::create()
        .as_enum(name)
        .values(values.iter().map(|value| Alias::new(*value)))
        .to_owned()
}

pub(crate) fn foreign_key<T, C, R>(from: (T, C), to: R, on_delete: ForeignKeyAction) -> ForeignKeyCreateStatement
where
    T: IntoTableRef,
    C: IntoIden,
    R: IntoTableRef,
{
    ForeignKeyCreateStatement::new()
        .from(from.0, from.1)
        .to(to, DefaultColumn::Id)
        .on_delete(on_delete)
        .on_update(ForeignKeyAction::Cascade)
        .take()
}

/// Unique index over the rows where the boolean `predicate` column is true.
///
/// The index builder has no `WHERE` clause, so the statement is emitted as raw SQL.
pub(crate) fn partial_unique_index(name: &str, table: &str, column: &str, predicate: &str) -> String {
    format!(r#"CREATE UNIQUE INDEX "{name}" ON "{table}" ("{column}") WHERE "{predicate}""#)
}

#[macro_export]
macro_rules! setup_user_table_fk {
    ($m:expr,$t:expr) => {{
        use crate::util::*;
        use crate::m20250620_091500_payroll_schema::User;

        $m.create_foreign_key(foreign_key(($t, DefaultUserColumn::CreatedBy), User::Table, ForeignKeyAction::SetNull)).await?;
        $m.create_foreign_key(foreign_key(($t, DefaultUserColumn::UpdatedBy), User::Table, ForeignKeyAction::SetNull)).await?;
    }};
}

#[derive(DeriveIden)]
pub(crate) enum DefaultUserColumn {
    CreatedBy,
    UpdatedBy,
}
