use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "recipes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// `None` for editorial recipes that no user uploaded.
    pub author_id: Option<i32>,

    pub name: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub media_url: Option<String>,

    /// "video", "gif" or "image"
    pub media_type: String,

    pub duration_sec: Option<i32>,

    /// Minutes
    pub prep_time: i32,

    /// Minutes
    pub cook_time: i32,

    pub servings: i32,

    pub category_id: i32,

    pub is_public: bool,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AuthorId",
        to = "super::users::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Author,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Category,
    #[sea_orm(has_many = "super::ingredients::Entity")]
    Ingredients,
    #[sea_orm(has_many = "super::instruction_steps::Entity")]
    InstructionSteps,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::ingredients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ingredients.def()
    }
}

impl Related<super::instruction_steps::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InstructionSteps.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
