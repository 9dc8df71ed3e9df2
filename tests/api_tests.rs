// Integration tests for the REST API, driven through the axum router

#[cfg(test)]
mod api_tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header::AUTHORIZATION, header::CONTENT_TYPE, Method, Request, StatusCode},
        Router,
    };
    use ideation_agent_lib::config::AppConfig;
    use ideation_agent_lib::server::{build_router, AppState};
    use ideation_agent_lib::shutdown::ShutdownState;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_state(config: AppConfig) -> AppState {
        AppState::new(config, ShutdownState::new()).unwrap()
    }

    fn test_app() -> (Router, AppState) {
        let mut config = AppConfig::default();
        config.pipeline.step_delay_ms = 0;
        let state = test_state(config);
        (build_router(state.clone()), state)
    }

    async fn send_raw(app: &Router, req: Request<Body>) -> (StatusCode, String) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let (status, text) = send_raw(app, req).await;
        let value = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        (status, value)
    }

    fn valid_idea() -> Value {
        json!({
            "title": "Local farm subscription box",
            "description": "Weekly boxes of seasonal vegetables from nearby farms, delivered to urban households with recipes.",
            "targetMarket": "Dual-income households in Tokyo",
            "revenueModel": "Monthly subscription",
            "estimatedRevenue": 120000000,
            "initialInvestment": 30000000
        })
    }

    async fn create_session(app: &Router, user_id: &str) -> Value {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/sessions",
            Some(json!({ "user_id": user_id })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    async fn wait_for_status(app: &Router, id: &str, expected: &str) -> Value {
        let uri = format!("/api/sessions/{}", id);
        for _ in 0..200 {
            let (_, body) = send(app, Method::GET, &uri, None).await;
            if body["status"] == expected {
                return body;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("session {} never reached {}", id, expected);
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let (app, _) = test_app();
        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String("OK".to_string()));
    }

    #[tokio::test]
    async fn test_validate_idea_without_analysis() {
        let (app, _) = test_app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/ideas/validate",
            Some(json!({ "idea": valid_idea() })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body["timestamp"].is_string());
        assert!(body["data"]["validation"]["score"].is_u64());
        assert!(body["data"]["analysis"].is_null());
    }

    #[tokio::test]
    async fn test_validate_idea_with_analysis() {
        let (app, _) = test_app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/ideas/validate",
            Some(json!({ "idea": valid_idea(), "analyzeStrengthsAndWeaknesses": true })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let analysis = &body["data"]["analysis"];
        assert!(analysis["strengths"].is_array());
        assert!(analysis["weaknesses"].is_array());
        assert!(analysis["summary"].is_string());
    }

    #[tokio::test]
    async fn test_validate_idea_reports_every_field() {
        let (app, _) = test_app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/ideas/validate",
            Some(json!({ "idea": { "title": "", "description": "short" } })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Validation failed");
        let fields: Vec<&str> = body["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["field"].as_str().unwrap())
            .collect();
        assert!(fields.contains(&"idea.title"));
        assert!(fields.contains(&"idea.description"));
        assert!(fields.contains(&"idea.targetMarket"));
        assert!(fields.contains(&"idea.revenueModel"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_validation_error() {
        let (app, _) = test_app();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/ideas/validate")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, text) = send_raw(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let body: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(body["details"][0]["field"], "body");
    }

    #[tokio::test]
    async fn test_session_crud() {
        let (app, _) = test_app();
        let created = create_session(&app, "user-1").await;
        assert_eq!(created["status"], "initializing");
        assert_eq!(created["progress"], 0.0);
        let id = created["id"].as_str().unwrap().to_string();
        create_session(&app, "user-2").await;

        let (status, listed) = send(&app, Method::GET, "/api/sessions?user_id=user-1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let (_, all) = send(&app, Method::GET, "/api/sessions", None).await;
        assert_eq!(all.as_array().unwrap().len(), 2);

        let uri = format!("/api/sessions/{}", id);
        let (status, updated) = send(
            &app,
            Method::PATCH,
            &uri,
            Some(json!({ "status": "researching", "progress": 25 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["status"], "researching");
        assert_eq!(updated["current_phase"], "Market research");
        assert_eq!(updated["progress"], 25.0);

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not found");
    }

    #[tokio::test]
    async fn test_create_session_requires_user() {
        let (app, _) = test_app();
        let (status, body) = send(&app, Method::POST, "/api/sessions", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"][0]["field"], "user_id");
    }

    #[tokio::test]
    async fn test_invalid_update_fields_are_rejected() {
        let (app, _) = test_app();
        let id = create_session(&app, "u1").await["id"].as_str().unwrap().to_string();
        let (status, body) = send(
            &app,
            Method::PATCH,
            &format!("/api/sessions/{}", id),
            Some(json!({ "status": "paused", "progress": 140 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_illegal_transition_is_conflict() {
        let (app, _) = test_app();
        let id = create_session(&app, "u1").await["id"].as_str().unwrap().to_string();
        let uri = format!("/api/sessions/{}", id);

        send(&app, Method::PATCH, &uri, Some(json!({ "status": "generating" }))).await;
        let (status, body) =
            send(&app, Method::PATCH, &uri, Some(json!({ "status": "researching" }))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Conflict");

        let (status, failed) = send(
            &app,
            Method::PATCH,
            &uri,
            Some(json!({ "status": "error", "error_message": "agent crashed" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(failed["error_message"], "agent crashed");

        let (status, _) = send(&app, Method::PATCH, &uri, Some(json!({ "progress": 10 }))).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let (app, _) = test_app();
        for uri in [
            "/api/sessions/missing",
            "/api/sessions/missing/logs",
            "/api/sessions/missing/report",
        ] {
            let (status, _) = send(&app, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        }
        let (status, _) = send(&app, Method::POST, "/api/sessions/missing/start", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_agent_logs_round_trip() {
        let (app, _) = test_app();
        let id = create_session(&app, "u1").await["id"].as_str().unwrap().to_string();
        let uri = format!("/api/sessions/{}/logs", id);

        let (status, log) = send(
            &app,
            Method::POST,
            &uri,
            Some(json!({
                "agent": "researcher",
                "message": "Collected 10 search results",
                "timestamp": "2025-01-18T12:00:00Z",
                "data": { "count": 10 }
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(log["session_id"], id);

        let (status, body) = send(
            &app,
            Method::POST,
            &uri,
            Some(json!({ "agent": "janitor", "message": "", "timestamp": "yesterday" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"].as_array().unwrap().len(), 3);

        let (_, logs) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(logs.as_array().unwrap().len(), 1);
        assert_eq!(logs[0]["data"]["count"], 10);
    }

    #[tokio::test]
    async fn test_start_runs_pipeline_to_report() {
        let (app, _) = test_app();
        let id = create_session(&app, "u1").await["id"].as_str().unwrap().to_string();

        let (status, _) = send(&app, Method::GET, &format!("/api/sessions/{}/report", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, started) =
            send(&app, Method::POST, &format!("/api/sessions/{}/start", id), None).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(started["status"], "researching");

        let done = wait_for_status(&app, &id, "completed").await;
        assert_eq!(done["progress"], 100.0);
        assert!(done["completed_at"].is_string());

        let (status, report) =
            send(&app, Method::GET, &format!("/api/sessions/{}/report", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["sessionId"], id);
        assert_eq!(report["metrics"]["dataQuality"]["consistency"], true);
        assert!(report["synergyScore"]["grade"].is_string());

        let req = Request::builder()
            .uri(format!("/api/sessions/{}/report/html", id))
            .body(Body::empty())
            .unwrap();
        let (status, html) = send_raw(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains('¥'));

        let (_, logs) = send(&app, Method::GET, &format!("/api/sessions/{}/logs", id), None).await;
        assert_eq!(logs.as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_start_twice_is_conflict() {
        let (app, _) = test_app();
        let id = create_session(&app, "u1").await["id"].as_str().unwrap().to_string();
        let uri = format!("/api/sessions/{}/start", id);

        let (first, _) = send(&app, Method::POST, &uri, None).await;
        let (second, body) = send(&app, Method::POST, &uri, None).await;
        assert_eq!(first, StatusCode::ACCEPTED);
        assert_eq!(second, StatusCode::CONFLICT);
        assert!(body["details"].is_string());
    }

    #[tokio::test]
    async fn test_metrics_record_requests_and_reset() {
        let (app, _) = test_app();
        create_session(&app, "u1").await;
        create_session(&app, "u1").await;

        let (status, snapshot) = send(&app, Method::GET, "/api/metrics", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(snapshot["operations"]["POST /api/sessions"]["count"], 2);

        let (status, _) = send(&app, Method::DELETE, "/api/metrics", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, snapshot) = send(&app, Method::GET, "/api/metrics", None).await;
        assert!(snapshot["operations"].get("POST /api/sessions").is_none());
    }

    #[tokio::test]
    async fn test_bearer_token_enforced_when_configured() {
        let mut config = AppConfig::default();
        config.server.auth_token = Some("s3cret".to_string());
        let app = build_router(test_state(config));

        let (status, body) = send(&app, Method::GET, "/api/sessions", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");

        let req = Request::builder()
            .uri("/api/sessions")
            .header(AUTHORIZATION, "Bearer s3cret")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send_raw(&app, req).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
