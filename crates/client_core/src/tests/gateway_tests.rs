use super::*;
use std::collections::HashMap;

use axum::{
    extract::{Path, Query},
    http::{header, HeaderMap},
    routing::{delete, get},
    Json, Router,
};
use chrono::{TimeZone, Utc};
use shared::{
    domain::{ExperienceLevel, InterviewStatus},
    error::ErrorCode,
};
use tokio::net::TcpListener;

fn sample_record(id: &str) -> InterviewRecord {
    InterviewRecord {
        id: InterviewId::from(id),
        company: "Acme".to_string(),
        role: "SWE".to_string(),
        level: ExperienceLevel::Mid,
        tags: vec!["onsite".to_string()],
        author_name: Some("Priya".to_string()),
        author_avatar: None,
        author: None,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        likes: Some(3),
        comments: Some(1),
        experience: None,
    }
}

fn sample_owned_record(id: &str) -> OwnedInterviewRecord {
    OwnedInterviewRecord {
        id: InterviewId::from(id),
        company: "Acme".to_string(),
        role: "SWE".to_string(),
        level: ExperienceLevel::Senior,
        status: InterviewStatus::Published,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        views: Some(12),
        likes: Some(3),
        comments: Some(1),
    }
}

async fn serve(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

#[tokio::test]
async fn list_interviews_carries_filter_as_query_string() {
    async fn handler(
        Query(params): Query<HashMap<String, String>>,
    ) -> Json<Vec<InterviewRecord>> {
        if params.get("company").map(String::as_str) == Some("Acme")
            && params.get("level").map(String::as_str) == Some("Mid")
            && params.get("role").is_none()
        {
            Json(vec![sample_record("1")])
        } else {
            Json(Vec::new())
        }
    }

    let url = serve(Router::new().route("/interviews", get(handler))).await;
    let gateway = HttpInterviewGateway::new(&url).expect("gateway");

    let filter = InterviewFilter {
        company: Some("Acme".to_string()),
        level: Some(ExperienceLevel::Mid),
        ..InterviewFilter::default()
    };
    let records = gateway.list_interviews(&filter).await.expect("records");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, InterviewId::from("1"));
}

#[tokio::test]
async fn owned_listing_requires_the_bearer_header() {
    async fn handler(
        headers: HeaderMap,
    ) -> Result<Json<Vec<OwnedInterviewRecord>>, (axum::http::StatusCode, Json<ApiError>)> {
        match bearer(&headers) {
            Some("token-1") => Ok(Json(vec![sample_owned_record("1")])),
            _ => Err((
                axum::http::StatusCode::UNAUTHORIZED,
                Json(ApiError::new(ErrorCode::Unauthorized, "token rejected")),
            )),
        }
    }

    let url = serve(Router::new().route("/interviews/user-interviews", get(handler))).await;
    let gateway = HttpInterviewGateway::new(&url).expect("gateway");

    let records = gateway
        .list_owned_interviews("token-1")
        .await
        .expect("records");
    assert_eq!(records[0].views, Some(12));

    let err = gateway
        .list_owned_interviews("wrong")
        .await
        .expect_err("must reject");
    match err {
        ApiFailure::Rejected { status, message } => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(message, "token rejected");
        }
        other => panic!("unexpected failure: {other:?}"),
    }
}

#[tokio::test]
async fn delete_encodes_the_identity_path_segment() {
    async fn handler(Path(id): Path<String>, headers: HeaderMap) -> axum::http::StatusCode {
        if bearer(&headers) == Some("token-1") && id == "a b/c" {
            axum::http::StatusCode::NO_CONTENT
        } else {
            axum::http::StatusCode::NOT_FOUND
        }
    }

    let url = serve(Router::new().route("/interviews/:id", delete(handler))).await;
    let gateway = HttpInterviewGateway::new(&url).expect("gateway");

    gateway
        .delete_interview("token-1", &InterviewId::from("a b/c"))
        .await
        .expect("delete");
}

#[tokio::test]
async fn non_2xx_without_error_body_falls_back_to_the_status_line() {
    async fn handler() -> (axum::http::StatusCode, &'static str) {
        (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "not json")
    }

    let url = serve(Router::new().route("/interviews", get(handler))).await;
    let gateway = HttpInterviewGateway::new(&url).expect("gateway");

    let err = gateway
        .list_interviews(&InterviewFilter::default())
        .await
        .expect_err("must fail");
    match err {
        ApiFailure::Rejected { status, message } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(message, "Internal Server Error");
        }
        other => panic!("unexpected failure: {other:?}"),
    }
}

#[test]
fn rejects_unusable_base_urls() {
    assert!(matches!(
        HttpInterviewGateway::new("not a url"),
        Err(ApiFailure::BadBaseUrl(_))
    ));
    assert!(matches!(
        HttpInterviewGateway::new("mailto:nobody@example.com"),
        Err(ApiFailure::BadBaseUrl(_))
    ));
}
