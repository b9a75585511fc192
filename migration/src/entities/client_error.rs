use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "client_errors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub client_version: String,
    pub error_type: String,
    #[sea_orm(column_type = "Text")]
    pub stacktrace: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
