//! Request builders and init data signing

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use jobs_bot::telegram::webapp_auth::data_check_hash;
use tower::ServiceExt;

use super::fixtures::TEST_BOT_TOKEN;

/// Init data for `user_id`, signed with the test bot token and dated now
pub fn signed_init_data(user_id: i64) -> String {
    signed_init_data_at(Some(user_id), Utc::now().timestamp())
}

/// Init data signed the way Telegram does it
pub fn signed_init_data_at(user_id: Option<i64>, auth_date: i64) -> String {
    let mut pairs = vec![
        ("auth_date".to_string(), auth_date.to_string()),
        ("query_id".to_string(), "AAHdF6IQAAAAAN0XohDhrOrc".to_string()),
    ];
    if let Some(id) = user_id {
        pairs.push((
            "user".to_string(),
            format!(r#"{{"id":{},"first_name":"Test","username":"tester"}}"#, id),
        ));
    }

    let hash = data_check_hash(&pairs, TEST_BOT_TOKEN).expect("Failed to sign init data");
    pairs.push(("hash".to_string(), hash));

    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

pub fn post_invoice(init_data: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/createInvoiceLink")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(init_data) = init_data {
        builder = builder.header("X-Telegram-Data", init_data);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Drives the router without a socket and decodes the JSON body
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
