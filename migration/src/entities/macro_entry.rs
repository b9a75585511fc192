use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "macros")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub url: String,
    #[sea_orm(column_type = "Text")]
    pub orig_url: String,
    pub url_size: i64,
    #[sea_orm(column_type = "Text")]
    pub thumbnail: String,
    pub thumbnail_size: i64,
    pub is_gif: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub gif_thumbnail: Option<String>,
    pub gif_thumbnail_size: Option<i64>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub state: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::macro_usage::Entity")]
    Usage,
}

impl Related<super::macro_usage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Usage.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
