//! Integration tests for recipes, search, the media feed and profiles.

use std::collections::HashSet;

use recipeshare::AppState;
use recipeshare::config::Config;
use recipeshare::crypto::EncryptionKey;
use recipeshare::db::{IngredientLine, NewUser, RecipeDraft, Store};
use recipeshare::domain::{FeedVariant, RecipeId, UserId};
use recipeshare::services::{
    FeedError, Ingredient, ProfileError, RecipeError, RecipeInput, Suggestion,
};

async fn spawn_state() -> (AppState, std::path::PathBuf) {
    let db_path =
        std::env::temp_dir().join(format!("recipeshare-recipe-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.search_history.encryption_key = Some(EncryptionKey::generate_base64());
    config.feed.page_size = 2;

    let store = Store::new(&config.general.database_path)
        .await
        .expect("Failed to open test database");
    let state = AppState::with_store(config, store).expect("Failed to create app state");

    (state, db_path)
}

async fn create_user(state: &AppState, name: &str) -> UserId {
    let user = state
        .store
        .user_repo()
        .create(NewUser {
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password_hash: "unused".to_string(),
            birthdate: None,
            phone: None,
            country: None,
        })
        .await
        .expect("Failed to create user");
    UserId::new(user.id)
}

fn input(name: &str) -> RecipeInput {
    RecipeInput {
        name: name.to_string(),
        description: format!("A reliable weeknight {name}."),
        category: "Dinner".to_string(),
        prep_time: 10,
        cook_time: 20,
        servings: 2,
        media_url: Some(format!("https://cdn.example.com/{}.mp4", name.len())),
        media_type: "video".to_string(),
        duration_sec: Some(42),
        is_public: true,
        ingredients: vec![
            Ingredient {
                name: "Flour".to_string(),
                amount: "200".to_string(),
                unit: Some("g".to_string()),
            },
            Ingredient {
                name: "Eggs".to_string(),
                amount: "2".to_string(),
                unit: None,
            },
        ],
        steps: vec!["Mix everything".to_string(), "Bake until golden".to_string()],
    }
}

async fn publish(state: &AppState, user: UserId, recipe: RecipeInput) -> RecipeId {
    state
        .recipes
        .create(Some(user), recipe)
        .await
        .expect("Failed to create recipe")
        .id
}

fn cleanup(state: AppState, path: std::path::PathBuf) {
    drop(state);
    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn test_create_and_show_recipe() {
    let (state, path) = spawn_state().await;
    let chef = create_user(&state, "chef").await;

    let id = publish(&state, chef, input("Shakshuka")).await;
    let detail = state.recipes.get(None, id).await.unwrap();

    assert_eq!(detail.name, "Shakshuka");
    assert_eq!(detail.category.as_deref(), Some("Dinner"));
    assert_eq!(detail.author.as_deref(), Some("chef"));
    assert_eq!(detail.ingredients.len(), 2);
    assert_eq!(detail.ingredients[0].unit.as_deref(), Some("g"));
    assert_eq!(detail.steps, ["Mix everything", "Bake until golden"]);
    assert_eq!(detail.likes, 0);
    assert!(!detail.is_liked);

    cleanup(state, path);
}

#[tokio::test]
async fn test_create_recipe_validation() {
    let (state, path) = spawn_state().await;
    let chef = create_user(&state, "chef").await;

    assert!(matches!(
        state.recipes.create(None, input("Anonymous pie")).await,
        Err(RecipeError::Unauthorized)
    ));

    let mut unknown_category = input("Paella");
    unknown_category.category = "Space Food".to_string();
    assert!(matches!(
        state.recipes.create(Some(chef), unknown_category).await,
        Err(RecipeError::Validation(msg)) if msg.contains("Space Food")
    ));

    let mut no_steps = input("Paella");
    no_steps.steps.clear();
    assert!(matches!(
        state.recipes.create(Some(chef), no_steps).await,
        Err(RecipeError::Validation(_))
    ));

    let mut bad_media = input("Paella");
    bad_media.media_url = Some("ftp://example.com/video".to_string());
    assert!(matches!(
        state.recipes.create(Some(chef), bad_media).await,
        Err(RecipeError::Validation(_))
    ));

    assert!(state.recipes.list(Some(chef)).await.unwrap().is_empty());

    cleanup(state, path);
}

#[tokio::test]
async fn test_private_recipes_and_ownership() {
    let (state, path) = spawn_state().await;
    let owner = create_user(&state, "owner").await;
    let other = create_user(&state, "other").await;

    let mut secret = input("Grandma's stew");
    secret.is_public = false;
    let private_id = publish(&state, owner, secret).await;
    let public_id = publish(&state, owner, input("Public stew")).await;

    assert!(matches!(
        state.recipes.get(Some(other), private_id).await,
        Err(RecipeError::NotFound)
    ));
    assert!(state.recipes.get(Some(owner), private_id).await.is_ok());

    let visible: Vec<_> = state
        .recipes
        .list(Some(other))
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(visible, [public_id]);
    assert_eq!(state.recipes.list(Some(owner)).await.unwrap().len(), 2);

    assert!(matches!(
        state.recipes.update(Some(other), public_id, input("Hijacked")).await,
        Err(RecipeError::Forbidden)
    ));
    assert!(matches!(
        state.recipes.delete(Some(other), private_id).await,
        Err(RecipeError::NotFound)
    ));

    let updated = state
        .recipes
        .update(Some(owner), public_id, input("Better stew"))
        .await
        .unwrap();
    assert_eq!(updated.name, "Better stew");

    state.recipes.delete(Some(owner), public_id).await.unwrap();
    assert!(matches!(
        state.recipes.get(None, public_id).await,
        Err(RecipeError::NotFound)
    ));

    cleanup(state, path);
}

#[tokio::test]
async fn test_search_matches_name_description_and_ingredients() {
    let (state, path) = spawn_state().await;
    let chef = create_user(&state, "chef").await;

    let mut curry = input("Green curry");
    curry.ingredients[0].name = "Lemongrass".to_string();
    let curry_id = publish(&state, chef, curry).await;

    let mut private = input("Secret curry");
    private.is_public = false;
    publish(&state, chef, private).await;

    let mut percent = input("100% rye bread");
    percent.description = "Dense and sour, no wheat at all.".to_string();
    let rye_id = publish(&state, chef, percent).await;

    let by_name = state.search.search_recipes("CURRY").await.unwrap();
    assert_eq!(by_name.iter().map(|r| r.id).collect::<Vec<_>>(), [curry_id.value()]);

    let by_ingredient = state.search.search_recipes("lemongrass").await.unwrap();
    assert_eq!(by_ingredient.len(), 1);

    let by_description = state.search.search_recipes("sour").await.unwrap();
    assert_eq!(by_description[0].id, rye_id.value());

    // LIKE wildcards are matched literally
    assert_eq!(state.search.search_recipes("100%").await.unwrap().len(), 1);
    assert!(state.search.search_recipes("1_0").await.unwrap().is_empty());

    assert!(state.search.search_recipes("   ").await.unwrap().is_empty());

    cleanup(state, path);
}

#[tokio::test]
async fn test_search_records_history_for_signed_in_users() {
    let (state, path) = spawn_state().await;
    let chef = create_user(&state, "chef").await;

    state.search.search(Some(chef), "  tiramisu ").await.unwrap();
    state.search.search(None, "tiramisu").await.unwrap();

    let history = state.history.get_unified_history(Some(chef)).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].query, "tiramisu");

    cleanup(state, path);
}

#[tokio::test]
async fn test_suggestions_put_history_before_recipes() {
    let (state, path) = spawn_state().await;
    let chef = create_user(&state, "chef").await;

    publish(&state, chef, input("Pasta Bake")).await;
    publish(&state, chef, input("Pastry")).await;
    publish(&state, chef, input("pasta salad")).await;
    publish(&state, chef, input("Risotto")).await;

    state.history.record_search(Some(chef), "pasta salad").await.unwrap();
    state.history.record_search(Some(chef), "risotto").await.unwrap();

    let suggestions = state.search.get_suggestions(Some(chef), "pas").await.unwrap();
    assert_eq!(
        suggestions,
        [
            Suggestion::history("pasta salad"),
            Suggestion::recipe("Pasta Bake"),
            Suggestion::recipe("Pastry"),
        ]
    );

    let anonymous = state.search.get_suggestions(None, "pas").await.unwrap();
    assert_eq!(anonymous.len(), 3);
    assert!(anonymous.iter().all(|s| s.kind == recipeshare::services::SuggestionKind::Recipe));

    cleanup(state, path);
}

#[tokio::test]
async fn test_feed_pages_cover_every_item_once() {
    let (state, path) = spawn_state().await;
    let chef = create_user(&state, "chef").await;

    let mut expected = HashSet::new();
    for name in ["Bao", "Pho", "Laksa", "Ramen", "Udon"] {
        expected.insert(publish(&state, chef, input(name)).await);
    }

    let mut no_media = input("Plain rice");
    no_media.media_url = None;
    publish(&state, chef, no_media).await;

    let mut private = input("Hidden noodles");
    private.is_public = false;
    publish(&state, chef, private).await;

    let mut seen = Vec::new();
    let mut cursor = None;
    loop {
        let page = state
            .feed
            .feed(None, FeedVariant::Main, cursor, None)
            .await
            .unwrap();
        assert!(page.items.len() <= 2);
        seen.extend(page.items.iter().map(|c| c.id));
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    assert_eq!(seen.len(), 5);
    assert!(seen.windows(2).all(|w| w[0] > w[1]));
    assert_eq!(seen.into_iter().collect::<HashSet<_>>(), expected);

    cleanup(state, path);
}

#[tokio::test]
async fn test_community_feed_excludes_editorial_recipes() {
    let (state, path) = spawn_state().await;
    let chef = create_user(&state, "chef").await;
    let user_recipe = publish(&state, chef, input("Home made gyoza")).await;

    let dinner = state
        .store
        .recipe_repo()
        .category_by_name("Dinner")
        .await
        .unwrap()
        .unwrap();
    state
        .store
        .recipe_repo()
        .create(
            None,
            RecipeDraft {
                name: "Editorial ramen".to_string(),
                description: "From the test kitchen.".to_string(),
                media_url: Some("https://cdn.example.com/ramen.mp4".to_string()),
                media_type: "video".to_string(),
                duration_sec: Some(30),
                prep_time: 5,
                cook_time: 5,
                servings: 1,
                category_id: dinner.id,
                is_public: true,
                ingredients: vec![IngredientLine {
                    name: "Noodles".to_string(),
                    amount: "1".to_string(),
                    unit: None,
                }],
                steps: vec!["Boil".to_string()],
            },
        )
        .await
        .unwrap();

    let main = state
        .feed
        .feed(None, FeedVariant::Main, None, Some(10))
        .await
        .unwrap();
    assert_eq!(main.items.len(), 2);

    let community = state
        .feed
        .feed(None, FeedVariant::Community, None, Some(10))
        .await
        .unwrap();
    assert_eq!(
        community.items.iter().map(|c| c.id).collect::<Vec<_>>(),
        [user_recipe]
    );

    cleanup(state, path);
}

#[tokio::test]
async fn test_like_and_save_toggle() {
    let (state, path) = spawn_state().await;
    let chef = create_user(&state, "chef").await;
    let fan = create_user(&state, "fan").await;

    let id = publish(&state, chef, input("Churros")).await;

    let liked = state.feed.toggle_like(Some(fan), id).await.unwrap();
    assert!(liked.liked);
    assert_eq!(liked.likes, 1);

    let page = state
        .feed
        .feed(Some(fan), FeedVariant::Main, None, None)
        .await
        .unwrap();
    assert!(page.items[0].is_liked);
    assert_eq!(page.items[0].likes, 1);

    let unliked = state.feed.toggle_like(Some(fan), id).await.unwrap();
    assert!(!unliked.liked);
    assert_eq!(unliked.likes, 0);

    assert!(state.feed.toggle_save(Some(fan), id).await.unwrap());
    let saved = state.profiles.saved_recipes(Some(fan)).await.unwrap();
    assert_eq!(saved.len(), 1);
    assert!(!state.feed.toggle_save(Some(fan), id).await.unwrap());
    assert!(state.profiles.saved_recipes(Some(fan)).await.unwrap().is_empty());

    assert!(matches!(
        state.feed.toggle_like(None, id).await,
        Err(FeedError::Unauthorized)
    ));
    assert!(matches!(
        state.feed.toggle_like(Some(fan), RecipeId::new(9999)).await,
        Err(FeedError::NotFound)
    ));

    let mut private = input("Secret churros");
    private.is_public = false;
    let private_id = publish(&state, chef, private).await;
    assert!(matches!(
        state.feed.toggle_save(Some(fan), private_id).await,
        Err(FeedError::NotFound)
    ));

    cleanup(state, path);
}

#[tokio::test]
async fn test_profile_counts_and_cookbook() {
    let (state, path) = spawn_state().await;
    let chef = create_user(&state, "chef").await;
    let fan = create_user(&state, "fan").await;

    let first = publish(&state, chef, input("Focaccia")).await;
    let second = publish(&state, chef, input("Ciabatta")).await;

    state.feed.toggle_like(Some(fan), first).await.unwrap();
    state.feed.toggle_like(Some(fan), second).await.unwrap();
    state.feed.toggle_like(Some(chef), first).await.unwrap();
    state.feed.toggle_save(Some(fan), second).await.unwrap();

    let profile = state.profiles.profile(Some(chef)).await.unwrap();
    assert_eq!(profile.username, "chef");
    assert_eq!(profile.recipe_count, 2);
    assert_eq!(profile.likes_received, 3);
    assert_eq!(profile.saved_count, 0);

    let fan_profile = state.profiles.profile(Some(fan)).await.unwrap();
    assert_eq!(fan_profile.saved_count, 1);
    assert_eq!(fan_profile.likes_received, 0);

    let own = state.profiles.own_recipes(Some(chef)).await.unwrap();
    assert_eq!(own.iter().map(|r| r.id).collect::<Vec<_>>(), [second, first]);

    // A saved recipe that turns private disappears from the saver's list
    let mut hidden = input("Ciabatta");
    hidden.is_public = false;
    state.recipes.update(Some(chef), second, hidden).await.unwrap();
    assert!(state.profiles.saved_recipes(Some(fan)).await.unwrap().is_empty());

    assert!(matches!(
        state.profiles.update_profile_image(Some(chef), "not a url").await,
        Err(ProfileError::Validation(_))
    ));
    state
        .profiles
        .update_profile_image(Some(chef), "https://cdn.example.com/me.png")
        .await
        .unwrap();
    let profile = state.profiles.profile(Some(chef)).await.unwrap();
    assert_eq!(
        profile.profile_image_url.as_deref(),
        Some("https://cdn.example.com/me.png")
    );

    assert!(matches!(
        state.profiles.profile(None).await,
        Err(ProfileError::Unauthorized)
    ));

    cleanup(state, path);
}
