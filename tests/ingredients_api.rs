mod common;

use serde_json::json;
use warp::http::StatusCode;

use common::{ids, names, TestApi};

#[tokio::test]
async fn login_required() {
    let api = TestApi::new();

    let response = api.send("GET", "/ingredients", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_requires_login() {
    let api = TestApi::new();

    let response = api
        .send("POST", "/ingredients", None, Some(json!({ "name": "Salt" })))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn retrieve_ingredient_list() {
    let api = TestApi::new();
    let (_, token) = api.user("test@example.com").await;

    api.create_label("/ingredients", &token, "Kale").await;
    api.create_label("/ingredients", &token, "Salt").await;

    let response = api.get("/ingredients", &token).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(names(&response.body), vec!["Salt", "Kale"]);
}

#[tokio::test]
async fn ingredients_limited_to_user() {
    let api = TestApi::new();
    let (_, token) = api.user("test@example.com").await;
    let (_, other) = api.user("other@example.com").await;

    api.create_label("/ingredients", &other, "Vinegar").await;
    let tumeric = api.create_label("/ingredients", &token, "Tumeric").await;

    let response = api.get("/ingredients", &token).await;

    assert_eq!(response.body, json!([{ "id": tumeric, "name": "Tumeric" }]));
}

#[tokio::test]
async fn create_ingredient() {
    let api = TestApi::new();
    let (_, token) = api.user("test@example.com").await;

    let response = api
        .post("/ingredients", &token, json!({ "name": "Cabbage" }))
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["name"], "Cabbage");
    assert_eq!(names(&api.get("/ingredients", &token).await.body), vec!["Cabbage"]);
}

#[tokio::test]
async fn create_ingredient_invalid() {
    let api = TestApi::new();
    let (_, token) = api.user("test@example.com").await;

    let response = api.post("/ingredients", &token, json!({ "name": "" })).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(api.get("/ingredients", &token).await.body, json!([]));
}

#[tokio::test]
async fn overlong_name_is_rejected() {
    let api = TestApi::new();
    let (_, token) = api.user("test@example.com").await;

    let response = api
        .post("/ingredients", &token, json!({ "name": "a".repeat(256) }))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn filter_ingredients_assigned_to_recipes() {
    let api = TestApi::new();
    let (_, token) = api.user("test@example.com").await;

    let apples = api.create_label("/ingredients", &token, "Apples").await;
    api.create_label("/ingredients", &token, "Turkey").await;
    api.create_recipe(
        &token,
        json!({ "title": "Apple crumble", "time_minutes": 5, "price": 10.0, "ingredients": [apples] }),
    )
    .await;

    let response = api.get("/ingredients?assigned_only=1", &token).await;

    assert_eq!(ids(&response.body), vec![apples]);
}

#[tokio::test]
async fn filtered_ingredients_are_unique() {
    let api = TestApi::new();
    let (_, token) = api.user("test@example.com").await;

    let eggs = api.create_label("/ingredients", &token, "Eggs").await;
    api.create_label("/ingredients", &token, "Cheese").await;
    for title in ["Eggs benedict", "Coriander eggs on toast"] {
        api.create_recipe(
            &token,
            json!({ "title": title, "time_minutes": 30, "price": 12.0, "ingredients": [eggs] }),
        )
        .await;
    }

    let response = api.get("/ingredients?assigned_only=1", &token).await;

    assert_eq!(ids(&response.body), vec![eggs]);
}

#[tokio::test]
async fn other_users_recipes_do_not_mark_ingredients_assigned() {
    let api = TestApi::new();
    let (_, token) = api.user("test@example.com").await;
    let (_, other) = api.user("other@example.com").await;

    let flour = api.create_label("/ingredients", &token, "Flour").await;
    let their_flour = api.create_label("/ingredients", &other, "Flour").await;
    api.create_recipe(
        &other,
        json!({ "title": "Bread", "time_minutes": 90, "price": 2.5, "ingredients": [their_flour] }),
    )
    .await;

    let response = api.get("/ingredients?assigned_only=true", &token).await;

    assert_eq!(response.body, json!([]));
    assert_eq!(ids(&api.get("/ingredients", &token).await.body), vec![flour]);
}

#[tokio::test]
async fn create_ingredient_from_form_post() {
    let api = TestApi::new();
    let (_, token) = api.user("test@example.com").await;
    let filter = recipe_api::routes::api(api.store.clone(), api.keys.clone());

    let response = warp::test::request()
        .method("POST")
        .path("/ingredients")
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("name=Kale")
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(names(&api.get("/ingredients", &token).await.body), vec!["Kale"]);
}

#[tokio::test]
async fn unsupported_body_type_is_rejected() {
    let api = TestApi::new();
    let (_, token) = api.user("test@example.com").await;
    let filter = recipe_api::routes::api(api.store.clone(), api.keys.clone());

    let response = warp::test::request()
        .method("POST")
        .path("/ingredients")
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "text/plain")
        .body("Kale")
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(api.get("/ingredients", &token).await.body, json!([]));
}
