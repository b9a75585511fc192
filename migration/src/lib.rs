pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m020251023_000001_initial_table;
mod m020251104_000001_usage_report_counters;
mod m020251118_000001_gists_client_errors;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m020251023_000001_initial_table::Migration),
            Box::new(m020251104_000001_usage_report_counters::Migration),
            Box::new(m020251118_000001_gists_client_errors::Migration),
        ]
    }
}
