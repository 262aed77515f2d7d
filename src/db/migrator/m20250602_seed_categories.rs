use crate::entities::categories;
use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Appetizer",
    "Main Course",
    "Dessert",
    "Side Dish",
    "Breakfast",
    "Lunch",
    "Dinner",
    "Snack",
    "Drink",
    "Italian",
    "Mexican",
    "Chinese",
    "Indian",
    "Japanese",
    "Thai",
    "French",
    "Greek",
    "Spanish",
    "Mediterranean",
    "Vegan",
    "Vegetarian",
    "Gluten-Free",
    "Keto",
    "Low-Carb",
    "Dairy-Free",
    "Chicken",
    "Beef",
    "Pork",
    "Fish",
    "Seafood",
    "Pasta",
    "Rice",
    "Salad",
    "Soup",
    "Baking",
    "Grilling",
    "Frying",
    "Roasting",
    "Slow Cooker",
    "Instant Pot",
    "Holiday",
    "Party",
    "Quick & Easy",
    "Healthy",
    "Comfort Food",
    "Viral",
    "Fast Food",
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert()
            .into_table(Categories)
            .columns([categories::Column::Name])
            .on_conflict(
                OnConflict::column(categories::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .to_owned();

        for name in DEFAULT_CATEGORIES {
            insert.values_panic([(*name).into()]);
        }

        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = Query::delete()
            .from_table(Categories)
            .and_where(Expr::col(categories::Column::Name).is_in(DEFAULT_CATEGORIES.iter().copied()))
            .to_owned();

        manager.exec_stmt(delete).await
    }
}
