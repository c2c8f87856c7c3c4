//! Class offers API.
//!
//! Reads are public. Creating, editing and deleting require the Teacher role,
//! and editing/deleting additionally require being the offer's author.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;

use super::error::{ApiError, ResultExt};
use crate::auth::{Auth, TeacherOnly};
use crate::db::{ClassOffer, ClassOfferPatch, Database, is_foreign_key_violation};
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;

/// State for class offer endpoints.
#[derive(Clone)]
pub struct ClassOffersState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub secure_cookies: bool,
}

impl_has_auth_backend!(ClassOffersState);

pub fn router(state: ClassOffersState) -> Router {
    Router::new()
        .route("/", get(list_class_offers).post(create_class_offer))
        .route("/protected", get(protected))
        .route(
            "/{id}",
            get(get_class_offer)
                .patch(edit_class_offer)
                .delete(delete_class_offer),
        )
        .with_state(state)
}

// --- Request types ---

/// Pagination query. Kept as raw strings so junk values fall back to defaults
/// instead of rejecting the request.
#[derive(Deserialize, Default)]
struct ListQuery {
    page: Option<String>,
    limit: Option<String>,
}

#[derive(Deserialize)]
struct CreateClassOfferRequest {
    title: Option<String>,
    description: Option<String>,
    price: Option<f64>,
}

/// Outer `None` means the field was omitted, `Some(None)` means an explicit null.
#[derive(Deserialize)]
struct EditClassOfferRequest {
    #[serde(default, deserialize_with = "present")]
    title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    price: Option<Option<f64>>,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

/// Marks a field as present, even when its value is null.
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// --- Helpers ---

/// Parse a positive integer query value, falling back to `default`.
fn positive_or(value: Option<&str>, default: i64) -> i64 {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v >= 1)
        .unwrap_or(default)
}

fn parse_offer_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request("Class offer id must be a number"))
}

fn validate_price(price: f64) -> Result<(), ApiError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(ApiError::bad_request("Price must be a positive number"));
    }
    Ok(())
}

/// Returns (title, description, price) once all three are present and valid.
fn validate_create(payload: CreateClassOfferRequest) -> Result<(String, String, f64), ApiError> {
    let title = payload
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Title cannot be empty"))?;
    let description = payload
        .description
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Description cannot be empty"))?;
    let price = payload
        .price
        .ok_or_else(|| ApiError::bad_request("Price cannot be empty"))?;
    validate_price(price)?;

    Ok((title, description, price))
}

fn validate_edit(payload: EditClassOfferRequest) -> Result<ClassOfferPatch, ApiError> {
    if payload.title.is_none() && payload.description.is_none() && payload.price.is_none() {
        return Err(ApiError::bad_request(
            "The request must contain at least one field to edit",
        ));
    }
    let title = payload
        .title
        .map(|t| {
            t.filter(|t| !t.trim().is_empty())
                .ok_or_else(|| ApiError::bad_request("Title cannot be empty"))
        })
        .transpose()?;
    let description = payload
        .description
        .map(|d| {
            d.filter(|d| !d.trim().is_empty())
                .ok_or_else(|| ApiError::bad_request("Description cannot be empty"))
        })
        .transpose()?;
    let price = payload
        .price
        .map(|p| p.ok_or_else(|| ApiError::bad_request("Price cannot be empty")))
        .transpose()?;
    if let Some(price) = price {
        validate_price(price)?;
    }

    Ok(ClassOfferPatch {
        title,
        description,
        price,
    })
}

fn offer_not_found(id: i64) -> ApiError {
    ApiError::not_found(format!("No class offer exists with id {}", id))
}

/// Load an offer and check that `user_id` authored it.
async fn load_owned(db: &Database, id: i64, user_id: i64) -> Result<ClassOffer, ApiError> {
    let offer = db
        .class_offers()
        .get_by_id(id)
        .await
        .db_err("Failed to get class offer")?
        .ok_or_else(|| offer_not_found(id))?;

    if offer.author_id != user_id {
        return Err(ApiError::unauthorized(
            "The resource does not belong to the user",
        ));
    }

    Ok(offer)
}

// --- Handlers ---

async fn list_class_offers(
    State(state): State<ClassOffersState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    // An undecodable query string (e.g. a repeated key) is treated like junk values
    let query = query.map(|Query(q)| q).unwrap_or_default();
    let page = positive_or(query.page.as_deref(), DEFAULT_PAGE);
    let limit = positive_or(query.limit.as_deref(), DEFAULT_LIMIT);

    let offers = state
        .db
        .class_offers()
        .list(page, limit)
        .await
        .db_err("Failed to list class offers")?;

    Ok(Json(offers))
}

async fn get_class_offer(
    State(state): State<ClassOffersState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_offer_id(&id)?;

    let offer = state
        .db
        .class_offers()
        .get_by_id(id)
        .await
        .db_err("Failed to get class offer")?
        .ok_or_else(|| offer_not_found(id))?;

    Ok(Json(offer))
}

async fn protected(auth: Auth<TeacherOnly>) -> impl IntoResponse {
    Json(MessageResponse {
        message: format!("Teacher access granted to {}", auth.user.username),
    })
}

async fn create_class_offer(
    State(state): State<ClassOffersState>,
    auth: Auth<TeacherOnly>,
    payload: Result<Json<CreateClassOfferRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let (title, description, price) = validate_create(payload)?;

    let offer = state
        .db
        .class_offers()
        .create(auth.user.id, &title, &description, price)
        .await
        .map_err(|e| {
            // Token outlived its user
            if is_foreign_key_violation(&e) {
                ApiError::unauthorized("User no longer exists")
            } else {
                ApiError::db_error("Failed to create class offer", e)
            }
        })?;

    tracing::info!(offer_id = offer.id, author_id = offer.author_id, "Class offer created");

    Ok((StatusCode::CREATED, Json(offer)))
}

async fn edit_class_offer(
    State(state): State<ClassOffersState>,
    auth: Auth<TeacherOnly>,
    Path(id): Path<String>,
    payload: Result<Json<EditClassOfferRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_offer_id(&id)?;
    let Json(payload) = payload?;
    let patch = validate_edit(payload)?;

    load_owned(&state.db, id, auth.user.id).await?;

    let offer = state
        .db
        .class_offers()
        .update(id, auth.user.id, &patch)
        .await
        .db_err("Failed to update class offer")?
        .ok_or_else(|| offer_not_found(id))?;

    Ok(Json(offer))
}

async fn delete_class_offer(
    State(state): State<ClassOffersState>,
    auth: Auth<TeacherOnly>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_offer_id(&id)?;

    load_owned(&state.db, id, auth.user.id).await?;

    let offer = state
        .db
        .class_offers()
        .delete(id, auth.user.id)
        .await
        .db_err("Failed to delete class offer")?
        .ok_or_else(|| offer_not_found(id))?;

    tracing::info!(offer_id = offer.id, "Class offer deleted");

    Ok(Json(offer))
}
