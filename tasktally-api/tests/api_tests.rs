/// Integration tests for the TaskTally HTTP API
///
/// Every test drives the router directly with `tower::ServiceExt::oneshot`
/// against its own in-memory database.

mod common;

use axum::http::{Method, StatusCode};
use common::{TestContext, USER_PASSWORD};
use serde_json::{json, Value};

async fn create_reading_task(ctx: &TestContext) -> String {
    let (status, task) = ctx
        .post(
            "/v1/tasks",
            &ctx.admin_token,
            json!({
                "title": "Reading",
                "is_global": true,
                "points_per_unit": 2.0,
                "unit_name": "pages"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", task);

    task["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx.send(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_login_and_me() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .send(
            Method::POST,
            "/v1/auth/login",
            None,
            Some(json!({ "email": "Reader@Example.com", "password": USER_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"].get("password_hash").is_none());

    let token = body["access_token"].as_str().unwrap().to_string();
    let (status, me) = ctx.get("/v1/auth/me", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], ctx.user.id.to_string());
}

#[tokio::test]
async fn test_login_failures_look_the_same() {
    let ctx = TestContext::new().await.unwrap();

    let (wrong_status, wrong_body) = ctx
        .send(
            Method::POST,
            "/v1/auth/login",
            None,
            Some(json!({ "email": "reader@example.com", "password": "nope" })),
        )
        .await;
    let (unknown_status, unknown_body) = ctx
        .send(
            Method::POST,
            "/v1/auth/login",
            None,
            Some(json!({ "email": "ghost@example.com", "password": "nope" })),
        )
        .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx.send(Method::GET, "/v1/tasks", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = ctx.get("/v1/tasks", "not-a-token").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_only_endpoints() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .post("/v1/tasks", &ctx.user_token, json!({ "title": "Sneaky" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = ctx.get("/v1/users", &ctx.user_token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .post("/v1/instances/instantiate", &ctx.user_token, json!({}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, users) = ctx.get("/v1/users", &ctx.admin_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_reading_flow_end_to_end() {
    let ctx = TestContext::new().await.unwrap();
    let task_id = create_reading_task(&ctx).await;

    let (status, instance) = ctx
        .post(
            &format!("/v1/tasks/{}/instances", task_id),
            &ctx.admin_token,
            json!({ "date": "2024-01-01", "target_value": 10 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", instance);
    assert_eq!(instance["status"], "pending");
    let instance_id = instance["id"].as_str().unwrap().to_string();

    let (status, completed) = ctx
        .post(
            &format!("/v1/instances/{}/complete", instance_id),
            &ctx.user_token,
            json!({ "completed_value": 5 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", completed);
    assert_eq!(completed["completed_value"], 5.0);
    assert_eq!(completed["points_awarded"], 10.0);
    assert_eq!(completed["status"], "done");
    assert_eq!(completed["completed_by"], ctx.user.id.to_string());

    let (status, again) = ctx
        .post(
            &format!("/v1/instances/{}/complete", instance_id),
            &ctx.user_token,
            json!({ "completed_value": 7 }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{}", again);

    let (status, dashboard) = ctx.get("/v1/dashboard?date=2024-01-01", &ctx.user_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["total_points"], 10.0);
    assert_eq!(dashboard["points"][0]["user_id"], ctx.user.id.to_string());
    assert_eq!(dashboard["instances"][0]["title"], "Reading");
}

#[tokio::test]
async fn test_ensure_instance_conflict_on_second_call() {
    let ctx = TestContext::new().await.unwrap();
    let task_id = create_reading_task(&ctx).await;
    let uri = format!("/v1/tasks/{}/instances", task_id);

    let (status, first) = ctx
        .post(&uri, &ctx.user_token, json!({ "date": "2024-01-01" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["target_value"], 0.0);

    let (status, second) = ctx
        .post(&uri, &ctx.user_token, json!({ "date": "2024-01-01", "target_value": 3 }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(second["message"]
        .as_str()
        .unwrap()
        .contains(first["id"].as_str().unwrap()));

    let (_, board) = ctx.get("/v1/instances?date=2024-01-01", &ctx.admin_token).await;
    assert_eq!(board.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_ensure_instance_rejects_malformed_body() {
    let ctx = TestContext::new().await.unwrap();
    let task_id = create_reading_task(&ctx).await;
    let uri = format!("/v1/tasks/{}/instances", task_id);

    let (status, body) = ctx
        .post(&uri, &ctx.user_token, json!({ "date": "2024-13-45" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", body);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "body");

    let (status, _) = ctx
        .post(
            &uri,
            &ctx.user_token,
            json!({ "date": "2024-01-01", "target_value": "ten" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = ctx.post_raw(&uri, &ctx.user_token, "{\"date\": ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    // Nothing was written for any day
    let (_, today) = ctx.get("/v1/instances", &ctx.admin_token).await;
    assert!(today.as_array().unwrap().is_empty(), "{}", today);
    let (_, jan_first) = ctx.get("/v1/instances?date=2024-01-01", &ctx.admin_token).await;
    assert!(jan_first.as_array().unwrap().is_empty(), "{}", jan_first);

    // An absent body still means today with target 0
    let (status, created) = ctx
        .send(Method::POST, &uri, Some(ctx.user_token.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    assert_eq!(created["target_value"], 0.0);

    let (_, today) = ctx.get("/v1/instances", &ctx.admin_token).await;
    assert_eq!(today.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_instantiate_rejects_malformed_body() {
    let ctx = TestContext::new().await.unwrap();
    create_reading_task(&ctx).await;

    let (status, body) = ctx
        .post(
            "/v1/instances/instantiate",
            &ctx.admin_token,
            json!({ "date": "not-a-date" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", body);

    let (_, today) = ctx.get("/v1/instances", &ctx.admin_token).await;
    assert!(today.as_array().unwrap().is_empty(), "{}", today);

    let (status, summary) = ctx
        .send(
            Method::POST,
            "/v1/instances/instantiate",
            Some(ctx.admin_token.as_str()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", summary);
    assert_eq!(summary["created"], 1);
}

#[tokio::test]
async fn test_extractor_rejections_are_json() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .get("/v1/instances?date=2024-13-45", &ctx.user_token)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert!(body["message"].is_string());

    let (status, body) = ctx.get("/v1/tasks/not-a-uuid", &ctx.user_token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, body) = ctx.post_raw("/v1/auth/login", "", "{").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, body) = ctx
        .post("/v1/tasks", &ctx.admin_token, json!({ "is_global": true }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "body");
}

#[tokio::test]
async fn test_instantiate_day_and_visibility() {
    let ctx = TestContext::new().await.unwrap();
    create_reading_task(&ctx).await;

    let (status, _) = ctx
        .post("/v1/tasks", &ctx.admin_token, json!({ "title": "Admin chores" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, summary) = ctx
        .post(
            "/v1/instances/instantiate",
            &ctx.admin_token,
            json!({ "date": "2024-01-01" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", summary);
    assert_eq!(summary["created"], 2);
    assert_eq!(summary["already_existing"], 0);

    let (_, user_board) = ctx.get("/v1/instances?date=2024-01-01", &ctx.user_token).await;
    let titles: Vec<&str> = user_board
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Reading"]);

    let (_, admin_board) = ctx.get("/v1/instances?date=2024-01-01", &ctx.admin_token).await;
    assert_eq!(admin_board.as_array().unwrap().len(), 2);

    let (_, user_tasks) = ctx.get("/v1/tasks", &ctx.user_token).await;
    assert_eq!(user_tasks.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_validation_errors_have_details() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .post(
            "/v1/tasks",
            &ctx.admin_token,
            json!({ "title": "Bad rate", "points_per_unit": 0 }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "points_per_unit");

    let (status, body) = ctx
        .post(
            "/v1/users",
            &ctx.admin_token,
            json!({ "name": "X", "email": "not-an-email", "password": "pw" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "email");
}

#[tokio::test]
async fn test_group_assignment_changes_visibility_immediately() {
    let ctx = TestContext::new().await.unwrap();

    let (status, group) = ctx
        .post("/v1/groups", &ctx.admin_token, json!({ "name": "Readers" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let group_id = group["id"].as_str().unwrap().to_string();

    let (status, task) = ctx
        .post(
            "/v1/tasks",
            &ctx.admin_token,
            json!({ "title": "Book club", "assigned_group_id": group_id }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let task_uri = format!("/v1/tasks/{}", task["id"].as_str().unwrap());

    let (status, _) = ctx.get(&task_uri, &ctx.user_token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, updated) = ctx
        .send(
            Method::PATCH,
            &format!("/v1/users/{}", ctx.user.id),
            Some(ctx.admin_token.as_str()),
            Some(json!({ "role": "user", "group_id": group_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", updated);
    assert_eq!(updated["group_id"], Value::String(group_id));

    // Same token; the middleware reloads the user
    let (status, _) = ctx.get(&task_uri, &ctx.user_token).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_last_admin_cannot_be_demoted() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .send(
            Method::PATCH,
            &format!("/v1/users/{}", ctx.admin.id),
            Some(ctx.admin_token.as_str()),
            Some(json!({ "role": "user" })),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT, "{}", body);
}

#[tokio::test]
async fn test_delete_task_with_instances_conflicts() {
    let ctx = TestContext::new().await.unwrap();
    let task_id = create_reading_task(&ctx).await;

    ctx.post(
        &format!("/v1/tasks/{}/instances", task_id),
        &ctx.admin_token,
        json!({ "date": "2024-01-01" }),
    )
    .await;

    let (status, _) = ctx
        .send(
            Method::DELETE,
            &format!("/v1/tasks/{}", task_id),
            Some(ctx.admin_token.as_str()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = ctx
        .send(
            Method::DELETE,
            &format!("/v1/tasks/{}", uuid::Uuid::new_v4()),
            Some(ctx.admin_token.as_str()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
