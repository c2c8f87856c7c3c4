//! Tests for the class offer endpoints: public reads, teacher-only writes,
//! and author ownership on edit/delete.

mod common;

use axum::{Router, http::StatusCode};
use common::*;
use serde_json::{Value, json};

fn offer_body(title: &str, price: f64) -> Value {
    json!({
        "title": title,
        "description": format!("{} for beginners", title),
        "price": price,
    })
}

/// Create an offer as `session` and return its JSON.
async fn create_offer(app: &Router, session: &Session, title: &str) -> Value {
    let response = send(
        app,
        "POST",
        "/class-offer",
        Some(offer_body(title, 20.0)),
        Some(&session.cookie()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn test_create_requires_authentication() {
    let (app, _db) = create_test_app().await;

    let response = send(
        &app,
        "POST",
        "/class-offer",
        Some(offer_body("Algebra", 20.0)),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert!(json["message"].as_str().is_some());
}

#[tokio::test]
async fn test_create_rejects_student() {
    let (app, _db) = create_test_app().await;
    let student = register_student(&app, "sam").await;

    let response = send(
        &app,
        "POST",
        "/class-offer",
        Some(offer_body("Algebra", 20.0)),
        Some(&student.cookie()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app, "GET", "/class-offer", None, None).await;
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_create_and_get() {
    let (app, _db) = create_test_app().await;
    let teacher = register_teacher(&app, "tina").await;

    let created = create_offer(&app, &teacher, "Algebra").await;
    assert_eq!(created["title"], "Algebra");
    assert_eq!(created["description"], "Algebra for beginners");
    assert_eq!(created["price"], 20.0);
    assert_eq!(created["authorId"], teacher.id);

    let id = created["id"].as_i64().unwrap();
    let uri = format!("/class-offer/{}", id);

    let first = body_json(send(&app, "GET", &uri, None, None).await).await;
    let second = body_json(send(&app, "GET", &uri, None, None).await).await;
    assert_eq!(first, created);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_create_invalid_body() {
    let (app, _db) = create_test_app().await;
    let teacher = register_teacher(&app, "tina").await;

    for body in [
        json!({ "description": "d", "price": 10.0 }),
        json!({ "title": "t", "description": "  ", "price": 10.0 }),
        json!({ "title": "t", "description": "d" }),
        json!({ "title": "t", "description": "d", "price": -1.0 }),
        json!({ "title": "t", "description": "d", "price": "ten" }),
    ] {
        let response = send(
            &app,
            "POST",
            "/class-offer",
            Some(body),
            Some(&teacher.cookie()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = send_raw(
        &app,
        "POST",
        "/class-offer",
        "{\"title\":",
        Some(&teacher.cookie()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_missing_and_malformed_id() {
    let (app, _db) = create_test_app().await;

    let response = send(&app, "GET", "/class-offer/999", None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["message"], "No class offer exists with id 999");

    let response = send(&app, "GET", "/class-offer/abc", None, None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_pagination() {
    let (app, _db) = create_test_app().await;
    let teacher = register_teacher(&app, "tina").await;

    for i in 0..12 {
        create_offer(&app, &teacher, &format!("Class {}", i)).await;
    }

    let default_page = body_json(send(&app, "GET", "/class-offer", None, None).await).await;
    assert_eq!(default_page.as_array().unwrap().len(), 10);
    assert_eq!(default_page[0]["title"], "Class 0");

    let second = body_json(send(&app, "GET", "/class-offer?page=2", None, None).await).await;
    assert_eq!(second.as_array().unwrap().len(), 2);
    assert_eq!(second[0]["title"], "Class 10");

    let limited = body_json(
        send(&app, "GET", "/class-offer?page=2&limit=5", None, None).await,
    )
    .await;
    let titles: Vec<&str> = limited
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["Class 5", "Class 6", "Class 7", "Class 8", "Class 9"]);

    // Junk values fall back to the defaults
    let junk = body_json(
        send(&app, "GET", "/class-offer?page=zero&limit=-3", None, None).await,
    )
    .await;
    assert_eq!(junk.as_array().unwrap().len(), 10);

    let past_end = body_json(send(&app, "GET", "/class-offer?page=9", None, None).await).await;
    assert_eq!(past_end.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_edit_own_offer() {
    let (app, _db) = create_test_app().await;
    let teacher = register_teacher(&app, "tina").await;
    let created = create_offer(&app, &teacher, "Algebra").await;
    let uri = format!("/class-offer/{}", created["id"]);

    let response = send(
        &app,
        "PATCH",
        &uri,
        Some(json!({ "price": 35.5 })),
        Some(&teacher.cookie()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let edited = body_json(response).await;
    assert_eq!(edited["price"], 35.5);
    assert_eq!(edited["title"], "Algebra");
    assert_eq!(edited["description"], created["description"]);

    let fetched = body_json(send(&app, "GET", &uri, None, None).await).await;
    assert_eq!(fetched, edited);
}

#[tokio::test]
async fn test_edit_invalid_body() {
    let (app, _db) = create_test_app().await;
    let teacher = register_teacher(&app, "tina").await;
    let created = create_offer(&app, &teacher, "Algebra").await;
    let uri = format!("/class-offer/{}", created["id"]);

    for body in [json!({}), json!({ "title": "" }), json!({ "price": 0.0 })] {
        let response = send(&app, "PATCH", &uri, Some(body), Some(&teacher.cookie())).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let fetched = body_json(send(&app, "GET", &uri, None, None).await).await;
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_edit_by_other_teacher_rejected() {
    let (app, _db) = create_test_app().await;
    let owner = register_teacher(&app, "tina").await;
    let other = register_teacher(&app, "otto").await;
    let created = create_offer(&app, &owner, "Algebra").await;
    let uri = format!("/class-offer/{}", created["id"]);

    let response = send(
        &app,
        "PATCH",
        &uri,
        Some(json!({ "title": "Hijacked" })),
        Some(&other.cookie()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "The resource does not belong to the user");

    let fetched = body_json(send(&app, "GET", &uri, None, None).await).await;
    assert_eq!(fetched["title"], "Algebra");
}

#[tokio::test]
async fn test_edit_by_student_rejected() {
    let (app, _db) = create_test_app().await;
    let owner = register_teacher(&app, "tina").await;
    let student = register_student(&app, "sam").await;
    let created = create_offer(&app, &owner, "Algebra").await;
    let uri = format!("/class-offer/{}", created["id"]);

    let response = send(
        &app,
        "PATCH",
        &uri,
        Some(json!({ "title": "Hijacked" })),
        Some(&student.cookie()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_edit_missing_offer() {
    let (app, _db) = create_test_app().await;
    let teacher = register_teacher(&app, "tina").await;

    let response = send(
        &app,
        "PATCH",
        "/class-offer/42",
        Some(json!({ "title": "Nothing" })),
        Some(&teacher.cookie()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &app,
        "PATCH",
        "/class-offer/forty-two",
        Some(json!({ "title": "Nothing" })),
        Some(&teacher.cookie()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_own_offer() {
    let (app, _db) = create_test_app().await;
    let teacher = register_teacher(&app, "tina").await;
    let created = create_offer(&app, &teacher, "Algebra").await;
    let uri = format!("/class-offer/{}", created["id"]);

    let response = send(&app, "DELETE", &uri, None, Some(&teacher.cookie())).await;
    assert_eq!(response.status(), StatusCode::OK);
    let deleted = body_json(response).await;
    assert_eq!(deleted, created);

    let response = send(&app, "GET", &uri, None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, "DELETE", &uri, None, Some(&teacher.cookie())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_by_other_teacher_rejected() {
    let (app, _db) = create_test_app().await;
    let owner = register_teacher(&app, "tina").await;
    let other = register_teacher(&app, "otto").await;
    let created = create_offer(&app, &owner, "Algebra").await;
    let uri = format!("/class-offer/{}", created["id"]);

    let response = send(&app, "DELETE", &uri, None, Some(&other.cookie())).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app, "DELETE", &uri, None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app, "GET", &uri, None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_after_author_deleted() {
    let (app, db) = create_test_app().await;
    let teacher = register_teacher(&app, "tina").await;

    // Soft-deleted users keep their row, so the token still maps to an author
    soft_delete_user(&db, teacher.id).await;
    let response = send(
        &app,
        "POST",
        "/class-offer",
        Some(offer_body("Algebra", 20.0)),
        Some(&teacher.cookie()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // A hard-deleted author trips the foreign key
    sqlx::query("DELETE FROM class_offers")
        .execute(db.pool())
        .await
        .unwrap();
    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(teacher.id)
        .execute(db.pool())
        .await
        .unwrap();
    let response = send(
        &app,
        "POST",
        "/class-offer",
        Some(offer_body("Algebra", 20.0)),
        Some(&teacher.cookie()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_teacher_protected_route() {
    let (app, _db) = create_test_app().await;
    let teacher = register_teacher(&app, "tina").await;
    let student = register_student(&app, "sam").await;

    let response = send(
        &app,
        "GET",
        "/class-offer/protected",
        None,
        Some(&teacher.cookie()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["message"].as_str().is_some());

    let response = send(
        &app,
        "GET",
        "/class-offer/protected",
        None,
        Some(&student.cookie()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app, "GET", "/class-offer/protected", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_with_undecodable_query_uses_defaults() {
    let (app, _db) = create_test_app().await;
    let teacher = register_teacher(&app, "tina").await;
    create_offer(&app, &teacher, "Algebra").await;

    let response = send(&app, "GET", "/class-offer?page=1&page=2", None, None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["title"], "Algebra");
}

#[tokio::test]
async fn test_edit_with_null_field_rejected() {
    let (app, _db) = create_test_app().await;
    let teacher = register_teacher(&app, "tina").await;
    let created = create_offer(&app, &teacher, "Algebra").await;
    let uri = format!("/class-offer/{}", created["id"]);

    let response = send(
        &app,
        "PATCH",
        &uri,
        Some(json!({ "title": null, "price": 42.0 })),
        Some(&teacher.cookie()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Title cannot be empty");

    let fetched = body_json(send(&app, "GET", &uri, None, None).await).await;
    assert_eq!(fetched, created);
}
