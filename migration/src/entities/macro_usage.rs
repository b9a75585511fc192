use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "macro_usages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub macro_name: String,
    pub clicks: i64,
    pub directs: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::macro_entry::Entity",
        from = "Column::MacroName",
        to = "super::macro_entry::Column::Name"
    )]
    Macro,
}

impl Related<super::macro_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Macro.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
