// tests/gamification_tests.rs

use eduquest::{config::Config, routes, state::AppState};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

async fn spawn_app() -> String {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: database_url.clone(),
        jwt_secret: "gamification_test_secret".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        admin_username: None,
        admin_password: None,
    };

    let state = AppState { pool, config };
    let app = routes::create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
        )
        .await
        .unwrap();
    });

    address
}

async fn test_pool() -> PgPool {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to connect to test DB")
}

/// Seeds a topic, a material, and three questions whose correct answer is
/// always option 0.
async fn seed_material(pool: &PgPool) -> i64 {
    let topic_name = format!("topic_{}", uuid::Uuid::new_v4());

    let (topic_id,): (i64,) = sqlx::query_as(
        "INSERT INTO topics (name, description) VALUES ($1, 'seeded') RETURNING id",
    )
    .bind(&topic_name)
    .fetch_one(pool)
    .await
    .unwrap();

    let (material_id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO materials (topic_id, title, content, page_count)
        VALUES ($1, 'Seeded material', '<p>isi</p>', 3)
        RETURNING id
        "#,
    )
    .bind(topic_id)
    .fetch_one(pool)
    .await
    .unwrap();

    for page in 1..=3 {
        sqlx::query(
            r#"
            INSERT INTO questions (material_id, page_number, content, options, answer_index)
            VALUES ($1, $2, $3, $4, 0)
            "#,
        )
        .bind(material_id)
        .bind(page)
        .bind(format!("Question {}", page))
        .bind(sqlx::types::Json(vec!["A", "B", "C", "D"]))
        .execute(pool)
        .await
        .unwrap();
    }

    material_id
}

async fn register_and_login(client: &reqwest::Client, address: &str) -> (String, String) {
    let username = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let password = "password123";

    client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Register failed");

    let login_resp = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Login failed")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse login json");

    let token = login_resp["token"].as_str().expect("Token not found").to_string();
    (username, token)
}

async fn user_id_of(pool: &PgPool, username: &str) -> i64 {
    let (id,): (i64,) = sqlx::query_as("SELECT id FROM users WHERE username = $1")
        .bind(username)
        .fetch_one(pool)
        .await
        .unwrap();
    id
}

/// Grants XP directly by inserting completed progress rows, one seeded
/// material per chunk.
async fn grant_xp(pool: &PgPool, user_id: i64, chunks: &[i64]) {
    for xp in chunks {
        let material_id = seed_material(pool).await;
        sqlx::query(
            r#"
            INSERT INTO quiz_progress
                (user_id, material_id, questions_answered, correct_answers, xp_earned, is_completed)
            VALUES ($1, $2, 3, 3, $3, TRUE)
            "#,
        )
        .bind(user_id)
        .bind(material_id)
        .bind(xp)
        .execute(pool)
        .await
        .unwrap();
    }
}

async fn submit(
    client: &reqwest::Client,
    address: &str,
    token: &str,
    material_id: i64,
    page: i32,
    answer: i32,
) -> serde_json::Value {
    client
        .post(format!("{}/api/quiz/submit", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "material_id": material_id,
            "page_number": page,
            "selected_answer": answer
        }))
        .send()
        .await
        .expect("Submit failed")
        .json()
        .await
        .expect("Submit returned non-JSON")
}

#[tokio::test]
async fn badge_catalog_applies_image_fix() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let badges: Vec<serde_json::Value> = client
        .get(format!("{}/api/badges", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(badges.len() >= 5);
    for badge in &badges {
        let gambar = badge["gambar"].as_str().unwrap();
        assert!(
            !gambar.ends_with(".jpg"),
            "legacy extension leaked: {}",
            gambar
        );
    }

    // The seeded Perunggu row is stored with .jpg and must come back .png.
    let perunggu = badges.iter().find(|b| b["nama"] == "Perunggu").unwrap();
    assert!(perunggu["gambar"].as_str().unwrap().ends_with("perunggu.png"));

    // Rows that were already .png are untouched.
    let emas = badges.iter().find(|b| b["nama"] == "Emas").unwrap();
    assert!(emas["gambar"].as_str().unwrap().ends_with("emas.png"));
}

#[tokio::test]
async fn levels_endpoint_lists_full_ladder() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let levels: Vec<serde_json::Value> = client
        .get(format!("{}/api/levels", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(levels.len(), 8);
    assert_eq!(levels[0]["name"], "Pemula");
    assert_eq!(levels[0]["xp_min"], 0);
    assert_eq!(levels[0]["xp_max"], 99);
    assert_eq!(levels[7]["name"], "Ace");
    assert!(levels[7]["xp_max"].is_null());
}

#[tokio::test]
async fn completing_a_quiz_awards_xp_and_badge() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let pool = test_pool().await;
    let material_id = seed_material(&pool).await;
    let (username, token) = register_and_login(&client, &address).await;

    // 2 correct answers, 1 wrong -> 10 XP at 5 XP per question.
    submit(&client, &address, &token, material_id, 1, 0).await;
    submit(&client, &address, &token, material_id, 2, 0).await;
    let last = submit(&client, &address, &token, material_id, 3, 2).await;
    assert_eq!(last["is_completed"], true);
    assert_eq!(last["xp_earned"], 10);

    let me: serde_json::Value = client
        .get(format!("{}/api/profile/me", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(me["total_xp"], 10);
    assert_eq!(me["level"]["level"], 1);
    assert_eq!(me["level"]["level_name"], "Pemula");
    assert_eq!(me["level"]["progress_percentage"], 10);
    assert_eq!(me["badge"]["nama"], "Perunggu");
    assert!(me["badge"]["gambar"].as_str().unwrap().ends_with(".png"));

    // The resolved badge is also persisted on the user row.
    let user_id = user_id_of(&pool, &username).await;
    let (badge_id,): (Option<i64>,) =
        sqlx::query_as("SELECT badge_id FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(badge_id.is_some());
}

#[tokio::test]
async fn retake_xp_never_decreases() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let pool = test_pool().await;
    let material_id = seed_material(&pool).await;
    let (_username, token) = register_and_login(&client, &address).await;

    // First attempt: 2/3 correct -> 10 XP.
    submit(&client, &address, &token, material_id, 1, 0).await;
    submit(&client, &address, &token, material_id, 2, 0).await;
    let first = submit(&client, &address, &token, material_id, 3, 1).await;
    assert_eq!(first["xp_earned"], 10);

    // Weaker retake: knock page 2 wrong as well -> 1/3 correct, but the
    // earned XP keeps the earlier best.
    let worse = submit(&client, &address, &token, material_id, 2, 3).await;
    assert_eq!(worse["total_correct"], 1);
    assert_eq!(worse["xp_earned"], 10);

    // Stronger retake: fix every page -> 3/3 correct raises the best.
    submit(&client, &address, &token, material_id, 2, 0).await;
    let best = submit(&client, &address, &token, material_id, 3, 0).await;
    assert_eq!(best["total_correct"], 3);
    assert_eq!(best["xp_earned"], 15);

    let progress: serde_json::Value = client
        .get(format!("{}/api/quiz/{}/progress", address, material_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(progress["progress"]["xp_earned"], 15);
    assert_eq!(progress["progress"]["is_completed"], true);
}

#[tokio::test]
async fn reanswering_keeps_counters_consistent() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let pool = test_pool().await;
    let material_id = seed_material(&pool).await;
    let (_username, token) = register_and_login(&client, &address).await;

    // Wrong then corrected on the same page: one answered, one correct.
    submit(&client, &address, &token, material_id, 1, 2).await;
    let corrected = submit(&client, &address, &token, material_id, 1, 0).await;
    assert_eq!(corrected["total_answered"], 1);
    assert_eq!(corrected["total_correct"], 1);

    // Spoil page 1 again after answering page 2 wrong: two answered, none
    // correct.
    submit(&client, &address, &token, material_id, 2, 3).await;
    let spoiled = submit(&client, &address, &token, material_id, 1, 3).await;
    assert_eq!(spoiled["total_answered"], 2);
    assert_eq!(spoiled["total_correct"], 0);

    // The stored page map agrees with the counters.
    let progress: serde_json::Value = client
        .get(format!("{}/api/quiz/{}/progress", address, material_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let scores = progress["page_scores"]["scores"].as_object().unwrap();
    assert_eq!(scores.len(), 2);
    assert_eq!(scores["1"]["result"], "incorrect");
    assert_eq!(scores["2"]["result"], "incorrect");
    assert_eq!(progress["page_scores"]["total_answered"], 2);
    assert_eq!(progress["page_scores"]["total_correct"], 0);
}

#[tokio::test]
async fn unlocked_badges_grow_with_level() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let pool = test_pool().await;
    let (username, token) = register_and_login(&client, &address).await;
    let user_id = user_id_of(&pool, &username).await;

    // 250 XP -> level 3 -> Perunggu and Perak unlocked, Emas not yet.
    grant_xp(&pool, user_id, &[100, 100, 50]).await;

    let level: serde_json::Value = client
        .get(format!("{}/api/profile/level", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(level["total_xp"], 250);
    assert_eq!(level["level"]["level"], 3);
    assert_eq!(level["level"]["level_name"], "Amatir");
    assert_eq!(level["level"]["progress_percentage"], 50);

    let badges: Vec<serde_json::Value> = client
        .get(format!("{}/api/profile/badges", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let names: Vec<&str> = badges.iter().map(|b| b["nama"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Perunggu", "Perak"]);
}

#[tokio::test]
async fn leaderboard_ranks_by_total_xp() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let pool = test_pool().await;

    let (username, _token) = register_and_login(&client, &address).await;
    let user_id = user_id_of(&pool, &username).await;
    grant_xp(&pool, user_id, &[800]).await;

    let leaderboard: Vec<serde_json::Value> = client
        .get(format!("{}/api/quiz/leaderboard", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // The database is shared between test runs, so we only assert the
    // endpoint's contract, not who sits on top.
    assert!(!leaderboard.is_empty());
    assert!(leaderboard[0]["total_xp"].as_i64().unwrap() >= 800);

    let mut prev_xp = i64::MAX;
    for entry in &leaderboard {
        let xp = entry["total_xp"].as_i64().unwrap();
        assert!(xp <= prev_xp, "leaderboard not sorted by XP");
        prev_xp = xp;

        let expected_level = (xp / 100 + 1).min(8);
        assert_eq!(entry["level"].as_i64().unwrap(), expected_level);
    }
}
