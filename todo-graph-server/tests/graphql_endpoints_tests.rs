use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use todo_graph_server::graphql::build_schema;
use todo_graph_server::web::create_app;
use tower::ServiceExt;

mod common;

/// Posts a GraphQL document to the router and returns the decoded response body.
async fn post_graphql(app: &Router, query: &str, variables: Value) -> Value {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "query": query, "variables": variables }).to_string(),
        ))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn ids_of(tasks: &Value) -> Vec<String> {
    tasks
        .as_array()
        .unwrap()
        .iter()
        .map(|task| task["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn can_complete_task_lifecycle() {
    let state = common::setup().await.expect("Failed to setup test context");
    let app = create_app(build_schema(state.db));

    let created = post_graphql(
        &app,
        "mutation($title: String!) { createTask(title: $title) { id title createdAt completedAt done } }",
        json!({ "title": "Buy milk" }),
    )
    .await;
    let task = &created["data"]["createTask"];
    let id = task["id"].as_str().expect("id is a string").to_string();
    assert_eq!(task["title"], "Buy milk");
    assert_eq!(task["done"], false);
    assert!(task["completedAt"].is_null());
    let created_at = task["createdAt"].as_i64().expect("createdAt is epoch millis");

    let marked = post_graphql(
        &app,
        "mutation($id: ID!) { markDone(id: $id) { id done completedAt } }",
        json!({ "id": id }),
    )
    .await;
    let task = &marked["data"]["markDone"];
    assert_eq!(task["done"], true);
    let completed_at = task["completedAt"].as_i64().expect("completedAt is epoch millis");
    assert!(completed_at >= created_at);

    let pending = post_graphql(&app, "{ todo { id } }", json!({})).await;
    assert!(!ids_of(&pending["data"]["todo"]).contains(&id));

    let completed = post_graphql(&app, "{ completed { id } }", json!({})).await;
    assert!(ids_of(&completed["data"]["completed"]).contains(&id));

    let between = post_graphql(
        &app,
        "query($start: DateTime!, $end: DateTime!) { completedBetween(start: $start, end: $end) { id } }",
        json!({ "start": completed_at, "end": completed_at + 1 }),
    )
    .await;
    assert_eq!(ids_of(&between["data"]["completedBetween"]), vec![id]);
}

#[tokio::test]
async fn can_report_not_found_after_delete() {
    let state = common::setup().await.expect("Failed to setup test context");
    let app = create_app(build_schema(state.db));
    let created = post_graphql(
        &app,
        r#"mutation { createTask(title: "Temporary") { id } }"#,
        json!({}),
    )
    .await;
    let id = created["data"]["createTask"]["id"].as_str().unwrap().to_string();

    let deleted = post_graphql(
        &app,
        "mutation($id: ID!) { deleteTask(id: $id) { id title done } }",
        json!({ "id": id }),
    )
    .await;
    assert_eq!(
        deleted["data"]["deleteTask"],
        json!({ "id": id, "title": "Temporary", "done": false })
    );

    for mutation in [
        "mutation($id: ID!) { markDone(id: $id) { id } }",
        "mutation($id: ID!) { deleteTask(id: $id) { id } }",
    ] {
        let response = post_graphql(&app, mutation, json!({ "id": id })).await;
        assert!(response["data"].is_null());
        assert_eq!(
            response["errors"][0]["message"],
            format!("Task with ID {} not found", id)
        );
    }
}

#[tokio::test]
async fn can_reject_malformed_date_time_input() {
    let state = common::setup().await.expect("Failed to setup test context");
    let app = create_app(build_schema(state.db));

    let literal = post_graphql(
        &app,
        r#"{ completedBetween(start: "today", end: 0) { id } }"#,
        json!({}),
    )
    .await;
    let variable = post_graphql(
        &app,
        "query($start: DateTime!) { completedBetween(start: $start, end: 0) { id } }",
        json!({ "start": 12.5 }),
    )
    .await;

    for response in [literal, variable] {
        assert!(response["data"].is_null());
        assert_eq!(response["errors"].as_array().unwrap().len(), 1);
    }
}
