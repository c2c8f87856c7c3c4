mod class_offers;
mod error;
mod health;
mod session;

use axum::Router;
use std::sync::Arc;

use crate::db::Database;
use crate::jwt::JwtConfig;

/// Create the API router.
pub fn create_api_router(db: Database, jwt: Arc<JwtConfig>, secure_cookies: bool) -> Router {
    let session_state = session::SessionState {
        db: db.clone(),
        jwt: jwt.clone(),
        secure_cookies,
    };

    let class_offers_state = class_offers::ClassOffersState {
        db,
        jwt,
        secure_cookies,
    };

    Router::new()
        .merge(health::router())
        .merge(session::router(session_state))
        .nest("/class-offer", class_offers::router(class_offers_state))
}
