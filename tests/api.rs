use std::time::Duration;

use pressbox::{get_random_free_port, make_router, run_app};
use reqwest::Client;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

// Boots the real router on a random free port over a fresh in-memory
// database. The pool is capped at one connection because an in-memory SQLite
// database is per-connection; the returned clone shares it for seeding.
async fn spawn_app() -> (String, SqlitePool) {
    std::env::set_var("JWT_SECRET", "integration-test-secret");
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let (_port, addr) = get_random_free_port();
    let app_pool = pool.clone();
    tokio::spawn(async move {
        run_app(make_router(), addr, app_pool).await.unwrap();
    });

    let base = format!("http://{}", addr);
    let client = Client::new();
    for _ in 0..50 {
        if let Ok(response) = client.get(format!("{}/check_health", base)).send().await {
            if response.status().is_success() {
                return (base, pool);
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("Server did not come up");
}

async fn register(client: &Client, base: &str, username: &str) -> String {
    let response = client
        .post(format!("{}/accounts/register", base))
        .json(&json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "correct horse battery",
            "password_confirm": "correct horse battery",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    body["user"]["token"].as_str().unwrap().to_string()
}

async fn create_post(
    client: &Client,
    base: &str,
    token: &str,
    payload: Value,
) -> Value {
    let response = client
        .post(format!("{}/post/new", base))
        .header("Authorization", format!("Token {}", token))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200, "create post failed");
    let body: Value = response.json().await.unwrap();
    body["post"].clone()
}

async fn get_detail(client: &Client, base: &str, slug: &str, token: Option<&str>) -> reqwest::Response {
    let mut request = client.get(format!("{}/post/{}", base, slug));
    if let Some(token) = token {
        request = request.header("Authorization", format!("Token {}", token));
    }
    request.send().await.unwrap()
}

async fn make_superuser(pool: &SqlitePool, username: &str) {
    sqlx::query("UPDATE users SET is_superuser = TRUE WHERE username = $1")
        .bind(username)
        .execute(pool)
        .await
        .unwrap();
}

#[tokio::test]
async fn health_check_works() {
    let (base, _pool) = spawn_app().await;
    let response = reqwest::get(format!("{}/check_health", base)).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "alive");
}

#[tokio::test]
async fn registration_validates_and_login_works() {
    let (base, _pool) = spawn_app().await;
    let client = Client::new();
    register(&client, &base, "culer").await;

    // Same username again comes back as a field error.
    let response = client
        .post(format!("{}/accounts/register", base))
        .json(&json!({
            "username": "culer",
            "email": "other@example.com",
            "password": "pw1234567",
            "password_confirm": "pw1234567",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);
    let body: Value = response.json().await.unwrap();
    assert!(body["errors"]["username"][0]
        .as_str()
        .unwrap()
        .contains("already taken"));

    // Mismatched passwords and missing fields are field errors too.
    let response = client
        .post(format!("{}/accounts/register", base))
        .json(&json!({
            "username": "someone",
            "password": "one",
            "password_confirm": "two",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);
    let body: Value = response.json().await.unwrap();
    assert!(body["errors"]["email"].is_array());
    assert!(body["errors"]["password_confirm"][0]
        .as_str()
        .unwrap()
        .contains("do not match"));

    let response = client
        .post(format!("{}/accounts/login", base))
        .json(&json!({"email": "culer@example.com", "password": "correct horse battery"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["user"]["username"], "culer");
    assert!(body["user"]["token"].as_str().is_some());

    let response = client
        .post(format!("{}/accounts/login", base))
        .json(&json!({"email": "culer@example.com", "password": "wrong"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);
}

#[tokio::test]
async fn slug_collisions_get_numeric_suffixes() {
    let (base, _pool) = spawn_app().await;
    let client = Client::new();
    let token = register(&client, &base, "writer").await;

    let first = create_post(
        &client,
        &base,
        &token,
        json!({"title": "Hello World", "body": "one", "action": "save_publish"}),
    )
    .await;
    let second = create_post(
        &client,
        &base,
        &token,
        json!({"title": "Hello World", "body": "two", "action": "save_publish"}),
    )
    .await;
    let third = create_post(
        &client,
        &base,
        &token,
        json!({"title": "Hello World", "body": "three", "action": "save_publish"}),
    )
    .await;

    assert_eq!(first["slug"], "hello-world");
    assert_eq!(second["slug"], "hello-world-1");
    assert_eq!(third["slug"], "hello-world-2");
}

#[tokio::test]
async fn create_post_requires_auth_and_valid_fields() {
    let (base, _pool) = spawn_app().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/post/new", base))
        .json(&json!({"title": "Anon", "body": "text"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let token = register(&client, &base, "writer").await;
    let response = client
        .post(format!("{}/post/new", base))
        .header("Authorization", format!("Token {}", token))
        .json(&json!({"excerpt": "only an excerpt"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);
    let body: Value = response.json().await.unwrap();
    assert!(body["errors"]["title"].is_array());
    assert!(body["errors"]["body"].is_array());
}

#[tokio::test]
async fn drafts_are_hidden_from_everyone_but_author_and_superuser() {
    let (base, pool) = spawn_app().await;
    let client = Client::new();
    let author = register(&client, &base, "author").await;
    let other = register(&client, &base, "other").await;
    let admin = register(&client, &base, "admin").await;
    make_superuser(&pool, "admin").await;

    let post = create_post(
        &client,
        &base,
        &author,
        json!({"title": "Secret Draft", "body": "wip", "action": "save_draft"}),
    )
    .await;
    let slug = post["slug"].as_str().unwrap();

    assert_eq!(get_detail(&client, &base, slug, None).await.status(), 404);
    assert_eq!(
        get_detail(&client, &base, slug, Some(&other)).await.status(),
        404
    );
    assert_eq!(
        get_detail(&client, &base, slug, Some(&author)).await.status(),
        200
    );
    assert_eq!(
        get_detail(&client, &base, slug, Some(&admin)).await.status(),
        200
    );

    // Archived posts are gated the same way as drafts.
    sqlx::query("UPDATE posts SET status = 'archived' WHERE slug = $1")
        .bind(slug)
        .execute(&pool)
        .await
        .unwrap();
    assert_eq!(get_detail(&client, &base, slug, None).await.status(), 404);
    assert_eq!(
        get_detail(&client, &base, slug, Some(&other)).await.status(),
        404
    );
    assert_eq!(
        get_detail(&client, &base, slug, Some(&author)).await.status(),
        200
    );
}

#[tokio::test]
async fn publishing_stamps_the_timestamp() {
    let (base, _pool) = spawn_app().await;
    let client = Client::new();
    let token = register(&client, &base, "writer").await;

    let post = create_post(
        &client,
        &base,
        &token,
        json!({"title": "Draft First", "body": "text", "action": "save_draft"}),
    )
    .await;
    assert_eq!(post["status"], "draft");
    assert!(post["published_at"].is_null());
    let slug = post["slug"].as_str().unwrap();

    let response = client
        .get(format!("{}/post/{}/publish", base, slug))
        .header("Authorization", format!("Token {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["post"]["status"], "published");
    assert!(body["post"]["published_at"].as_str().is_some());

    // Publishing is forced regardless of prior state.
    let response = client
        .get(format!("{}/post/{}/publish", base, slug))
        .header("Authorization", format!("Token {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn detail_view_increments_the_counter_once_per_request() {
    let (base, _pool) = spawn_app().await;
    let client = Client::new();
    let token = register(&client, &base, "writer").await;
    let post = create_post(
        &client,
        &base,
        &token,
        json!({"title": "Counted", "body": "text", "action": "save_publish"}),
    )
    .await;
    assert_eq!(post["views_count"], 0);
    let slug = post["slug"].as_str().unwrap();

    let body: Value = get_detail(&client, &base, slug, None)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["post"]["views_count"], 1);

    let body: Value = get_detail(&client, &base, slug, None)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["post"]["views_count"], 2);
}

#[tokio::test]
async fn like_toggle_flips_membership_and_counts() {
    let (base, _pool) = spawn_app().await;
    let client = Client::new();
    let writer = register(&client, &base, "writer").await;
    let fan = register(&client, &base, "fan").await;
    let post = create_post(
        &client,
        &base,
        &writer,
        json!({"title": "Likeable", "body": "text", "action": "save_publish"}),
    )
    .await;
    let slug = post["slug"].as_str().unwrap();
    let like_url = format!("{}/post/{}/like", base, slug);

    let response = client.post(&like_url).send().await.unwrap();
    assert_eq!(response.status(), 401);

    let body: Value = client
        .post(&like_url)
        .header("Authorization", format!("Token {}", fan))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({"liked": true, "likes_count": 1}));

    let body: Value = client
        .post(&like_url)
        .header("Authorization", format!("Token {}", writer))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({"liked": true, "likes_count": 2}));

    // Toggling again returns to the original state.
    let body: Value = client
        .post(&like_url)
        .header("Authorization", format!("Token {}", fan))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({"liked": false, "likes_count": 1}));

    let detail: Value = get_detail(&client, &base, slug, Some(&writer))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(detail["is_liked"], true);
    assert_eq!(detail["post"]["likes_count"], 1);
}

#[tokio::test]
async fn bookmark_toggle_round_trips() {
    let (base, _pool) = spawn_app().await;
    let client = Client::new();
    let writer = register(&client, &base, "writer").await;
    let post = create_post(
        &client,
        &base,
        &writer,
        json!({"title": "Keeper", "body": "text", "action": "save_publish"}),
    )
    .await;
    let url = format!("{}/post/{}/bookmark", base, post["slug"].as_str().unwrap());

    let body: Value = client
        .post(&url)
        .header("Authorization", format!("Token {}", writer))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({"bookmarked": true}));

    let body: Value = client
        .post(&url)
        .header("Authorization", format!("Token {}", writer))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({"bookmarked": false}));
}

#[tokio::test]
async fn comments_sit_behind_the_approval_gate() {
    let (base, _pool) = spawn_app().await;
    let client = Client::new();
    let writer = register(&client, &base, "writer").await;
    let reader = register(&client, &base, "reader").await;
    let post = create_post(
        &client,
        &base,
        &writer,
        json!({"title": "Discussed", "body": "text", "action": "save_publish"}),
    )
    .await;
    let slug = post["slug"].as_str().unwrap();
    let comment_url = format!("{}/post/{}/comment", base, slug);

    let response = client
        .post(&comment_url)
        .json(&json!({"body": "anon comment"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let response = client
        .post(&comment_url)
        .header("Authorization", format!("Token {}", reader))
        .json(&json!({"body": "Visca!"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["comment"]["approved"], false);
    assert_eq!(body["comment"]["author_name"], "reader");
    let comment_id = body["comment"]["id"].as_i64().unwrap();

    // Unapproved comments stay out of the public listing.
    let detail: Value = get_detail(&client, &base, slug, None)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(detail["comments"].as_array().unwrap().len(), 0);

    let response = client
        .get(format!("{}/comment/{}/approve", base, comment_id))
        .header("Authorization", format!("Token {}", writer))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["comment"]["approved"], true);

    // Approving twice is a no-op.
    let response = client
        .get(format!("{}/comment/{}/approve", base, comment_id))
        .header("Authorization", format!("Token {}", writer))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let detail: Value = get_detail(&client, &base, slug, None)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(detail["comments"].as_array().unwrap().len(), 1);

    let response = client
        .get(format!("{}/comment/{}/remove", base, comment_id))
        .header("Authorization", format!("Token {}", writer))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let detail: Value = get_detail(&client, &base, slug, None)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(detail["comments"].as_array().unwrap().len(), 0);

    let response = client
        .get(format!("{}/comment/{}/approve", base, comment_id))
        .header("Authorization", format!("Token {}", writer))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn search_matches_title_or_body_case_insensitively() {
    let (base, _pool) = spawn_app().await;
    let client = Client::new();
    let token = register(&client, &base, "writer").await;

    create_post(
        &client,
        &base,
        &token,
        json!({"title": "Messi scores again", "body": "match report", "action": "save_publish"}),
    )
    .await;
    create_post(
        &client,
        &base,
        &token,
        json!({"title": "Training notes", "body": "pure messi magic on the wing", "action": "save_publish"}),
    )
    .await;
    create_post(
        &client,
        &base,
        &token,
        json!({"title": "Messi draft", "body": "unfinished", "action": "save_draft"}),
    )
    .await;
    create_post(
        &client,
        &base,
        &token,
        json!({"title": "Transfer rumours", "body": "nothing here", "action": "save_publish"}),
    )
    .await;

    let body: Value = reqwest::get(format!("{}/search?q=Messi", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["posts_count"], 2);

    let body: Value = reqwest::get(format!("{}/search?q=MESSI", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["posts_count"], 2);

    // Empty query yields nothing, not everything.
    let body: Value = reqwest::get(format!("{}/search?q=", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["posts_count"], 0);

    let body: Value = reqwest::get(format!("{}/search", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["posts_count"], 0);
}

#[tokio::test]
async fn homepage_limits_recent_and_windows_trending() {
    let (base, pool) = spawn_app().await;
    let client = Client::new();
    let token = register(&client, &base, "writer").await;

    for i in 0..10 {
        create_post(
            &client,
            &base,
            &token,
            json!({"title": format!("Fresh {}", i), "body": "text", "action": "save_publish"}),
        )
        .await;
    }
    let stale = create_post(
        &client,
        &base,
        &token,
        json!({"title": "Stale Banger", "body": "text", "action": "save_publish"}),
    )
    .await;
    let stale_slug = stale["slug"].as_str().unwrap();

    // Push one post out of the 14-day window but give it the most views.
    sqlx::query(
        "UPDATE posts SET published_at = datetime('now', '-20 days'), views_count = 100 \
         WHERE slug = $1",
    )
    .bind(stale_slug)
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query("UPDATE posts SET views_count = 50 WHERE slug = 'fresh-3'")
        .execute(&pool)
        .await
        .unwrap();

    let body: Value = reqwest::get(&base).await.unwrap().json().await.unwrap();
    let recent = body["recent_posts"].as_array().unwrap();
    assert_eq!(recent.len(), 9);

    let trending = body["trending_posts"].as_array().unwrap();
    assert_eq!(trending.len(), 5);
    assert_eq!(trending[0]["slug"], "fresh-3");
    assert!(trending.iter().all(|post| post["slug"] != stale_slug));
}

#[tokio::test]
async fn category_and_tag_pages_filter_published_posts() {
    let (base, pool) = spawn_app().await;
    let client = Client::new();
    let token = register(&client, &base, "writer").await;

    sqlx::query("INSERT INTO categories (name, slug) VALUES ('Match Reports', 'match-reports')")
        .execute(&pool)
        .await
        .unwrap();

    create_post(
        &client,
        &base,
        &token,
        json!({
            "title": "Derby Report",
            "body": "text",
            "category": "match-reports",
            "tags": ["tactics"],
            "action": "save_publish",
        }),
    )
    .await;
    create_post(
        &client,
        &base,
        &token,
        json!({
            "title": "Unfinished Report",
            "body": "text",
            "category": "match-reports",
            "tags": ["tactics"],
            "action": "save_draft",
        }),
    )
    .await;
    create_post(
        &client,
        &base,
        &token,
        json!({"title": "Off Topic", "body": "text", "action": "save_publish"}),
    )
    .await;

    let body: Value = reqwest::get(format!("{}/category/match-reports", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["category"]["name"], "Match Reports");
    assert_eq!(body["posts_count"], 1);
    assert_eq!(body["posts"][0]["slug"], "derby-report");

    let body: Value = reqwest::get(format!("{}/tag/tactics", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["tag"]["slug"], "tactics");
    assert_eq!(body["posts_count"], 1);

    let response = reqwest::get(format!("{}/category/no-such", base)).await.unwrap();
    assert_eq!(response.status(), 404);

    // Unknown category on submission is a field error, nothing persisted.
    let response = client
        .post(format!("{}/post/new", base))
        .header("Authorization", format!("Token {}", token))
        .json(&json!({"title": "Bad Category", "body": "text", "category": "no-such"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);
    let body: Value = response.json().await.unwrap();
    assert!(body["errors"]["category"].is_array());
}

#[tokio::test]
async fn related_posts_share_a_tag() {
    let (base, _pool) = spawn_app().await;
    let client = Client::new();
    let token = register(&client, &base, "writer").await;

    let anchor = create_post(
        &client,
        &base,
        &token,
        json!({"title": "Anchor", "body": "text", "tags": ["pressing"], "action": "save_publish"}),
    )
    .await;
    create_post(
        &client,
        &base,
        &token,
        json!({"title": "Cousin", "body": "text", "tags": ["pressing", "midfield"], "action": "save_publish"}),
    )
    .await;
    create_post(
        &client,
        &base,
        &token,
        json!({"title": "Stranger", "body": "text", "tags": ["transfers"], "action": "save_publish"}),
    )
    .await;

    let detail: Value = get_detail(&client, &base, anchor["slug"].as_str().unwrap(), None)
        .await
        .json()
        .await
        .unwrap();
    let related = detail["related_posts"].as_array().unwrap();
    assert_eq!(related.len(), 1);
    assert_eq!(related[0]["slug"], "cousin");
}

#[tokio::test]
async fn editing_keeps_the_slug_unless_blanked() {
    let (base, _pool) = spawn_app().await;
    let client = Client::new();
    let author = register(&client, &base, "author").await;
    let other = register(&client, &base, "other").await;

    let post = create_post(
        &client,
        &base,
        &author,
        json!({"title": "Original Title", "body": "text", "action": "save_publish"}),
    )
    .await;
    assert_eq!(post["slug"], "original-title");

    let response = client
        .post(format!("{}/post/original-title/edit", base))
        .header("Authorization", format!("Token {}", other))
        .json(&json!({"title": "Hijacked"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let response = client
        .post(format!("{}/post/original-title/edit", base))
        .header("Authorization", format!("Token {}", author))
        .json(&json!({"title": "Brand New Title"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["post"]["title"], "Brand New Title");
    assert_eq!(body["post"]["slug"], "original-title");

    // An explicitly blank slug re-derives from the current title.
    let response = client
        .post(format!("{}/post/original-title/edit", base))
        .header("Authorization", format!("Token {}", author))
        .json(&json!({"slug": ""}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["post"]["slug"], "brand-new-title");
}

#[tokio::test]
async fn draft_list_is_scoped_to_the_caller() {
    let (base, _pool) = spawn_app().await;
    let client = Client::new();
    let writer = register(&client, &base, "writer").await;
    let other = register(&client, &base, "other").await;

    create_post(
        &client,
        &base,
        &writer,
        json!({"title": "First Draft", "body": "text", "action": "save_draft"}),
    )
    .await;
    create_post(
        &client,
        &base,
        &writer,
        json!({"title": "Second Draft", "body": "text", "action": "save_draft"}),
    )
    .await;
    create_post(
        &client,
        &base,
        &other,
        json!({"title": "Not Yours", "body": "text", "action": "save_draft"}),
    )
    .await;

    let response = client.get(format!("{}/drafts", base)).send().await.unwrap();
    assert_eq!(response.status(), 401);

    let body: Value = client
        .get(format!("{}/drafts", base))
        .header("Authorization", format!("Token {}", writer))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["posts_count"], 2);
    assert!(body["posts"]
        .as_array()
        .unwrap()
        .iter()
        .all(|post| post["status"] == "draft" && post["author"] == "writer"));
}

#[tokio::test]
async fn dashboards_are_role_routed() {
    let (base, pool) = spawn_app().await;
    let client = Client::new();
    let writer = register(&client, &base, "writer").await;
    let admin = register(&client, &base, "admin").await;
    make_superuser(&pool, "admin").await;

    create_post(
        &client,
        &base,
        &writer,
        json!({"title": "Pub One", "body": "text", "action": "save_publish"}),
    )
    .await;
    let viewed = create_post(
        &client,
        &base,
        &writer,
        json!({"title": "Pub Two", "body": "text", "action": "save_publish"}),
    )
    .await;
    create_post(
        &client,
        &base,
        &writer,
        json!({"title": "Drafted", "body": "text", "action": "save_draft"}),
    )
    .await;
    for _ in 0..3 {
        get_detail(&client, &base, viewed["slug"].as_str().unwrap(), None).await;
    }
    client
        .post(format!(
            "{}/post/{}/comment",
            base,
            viewed["slug"].as_str().unwrap()
        ))
        .header("Authorization", format!("Token {}", admin))
        .json(&json!({"body": "pending comment"}))
        .send()
        .await
        .unwrap();

    let response = client.get(format!("{}/dashboard", base)).send().await.unwrap();
    assert_eq!(response.status(), 401);

    let body: Value = client
        .get(format!("{}/user-dashboard", base))
        .header("Authorization", format!("Token {}", writer))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["published_posts"], 2);
    assert_eq!(body["draft_posts"], 1);
    assert_eq!(body["total_views"], 3);
    assert_eq!(body["recent_posts"].as_array().unwrap().len(), 3);

    let response = client
        .get(format!("{}/admin-dashboard", base))
        .header("Authorization", format!("Token {}", writer))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let body: Value = client
        .get(format!("{}/admin-dashboard", base))
        .header("Authorization", format!("Token {}", admin))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["total_posts"], 3);
    assert_eq!(body["total_comments"], 1);
    assert_eq!(body["pending_comments"], 1);
    assert_eq!(body["total_users"], 2);

    // /dashboard picks the payload by role.
    let body: Value = client
        .get(format!("{}/dashboard", base))
        .header("Authorization", format!("Token {}", writer))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(body.get("published_posts").is_some());

    let body: Value = client
        .get(format!("{}/dashboard", base))
        .header("Authorization", format!("Token {}", admin))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(body.get("total_posts").is_some());
}

#[tokio::test]
async fn deleting_a_post_cascades_to_its_attachments() {
    let (base, _pool) = spawn_app().await;
    let client = Client::new();
    let author = register(&client, &base, "author").await;
    let other = register(&client, &base, "other").await;

    let post = create_post(
        &client,
        &base,
        &author,
        json!({"title": "Doomed", "body": "text", "action": "save_publish"}),
    )
    .await;
    let slug = post["slug"].as_str().unwrap();

    let response = client
        .post(format!("{}/post/{}/comment", base, slug))
        .header("Authorization", format!("Token {}", other))
        .json(&json!({"body": "attached comment"}))
        .send()
        .await
        .unwrap();
    let comment_id = response.json::<Value>().await.unwrap()["comment"]["id"]
        .as_i64()
        .unwrap();
    client
        .post(format!("{}/post/{}/like", base, slug))
        .header("Authorization", format!("Token {}", other))
        .send()
        .await
        .unwrap();

    let response = client
        .post(format!("{}/post/{}/delete", base, slug))
        .header("Authorization", format!("Token {}", other))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let response = client
        .post(format!("{}/post/{}/delete", base, slug))
        .header("Authorization", format!("Token {}", author))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    assert_eq!(get_detail(&client, &base, slug, Some(&author)).await.status(), 404);
    let response = client
        .get(format!("{}/comment/{}/approve", base, comment_id))
        .header("Authorization", format!("Token {}", author))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn profile_reads_and_updates_through_the_account_endpoint() {
    let (base, _pool) = spawn_app().await;
    let client = Client::new();
    let token = register(&client, &base, "writer").await;

    let body: Value = client
        .get(format!("{}/user", base))
        .header("Authorization", format!("Token {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["user"]["username"], "writer");

    let response = client
        .put(format!("{}/user", base))
        .header("Authorization", format!("Token {}", token))
        .json(&json!({"bio": "Covers La Masia", "twitter": "https://twitter.com/writer"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = reqwest::get(format!("{}/profiles/writer", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["profile"]["bio"], "Covers La Masia");
    assert_eq!(body["profile"]["twitter"], "https://twitter.com/writer");

    let response = reqwest::get(format!("{}/profiles/nobody", base)).await.unwrap();
    assert_eq!(response.status(), 404);
}
