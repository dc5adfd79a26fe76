use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::env;
use std::future::{ready, Ready};

use crate::error::ApiError;

/// Name of the session cookie carrying the signed token.
pub const TOKEN_COOKIE: &str = "token";

const TOKEN_TTL_HOURS: i64 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub exp: usize,
}

/// Validate a session token and return its claims.
fn decode_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let secret = env::var("ACCESS_TOKEN_SECRET").expect("ACCESS_TOKEN_SECRET not set");
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

/// Create a session token for an authenticated email, expiring in one hour.
pub fn issue_token(email: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let secret = env::var("ACCESS_TOKEN_SECRET").expect("ACCESS_TOKEN_SECRET not set");
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::hours(TOKEN_TTL_HOURS))
        .expect("valid timestamp")
        .timestamp() as usize;

    let claims = Claims {
        email: email.to_string(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Cookie delivered at login: HTTP-only and secure so scripts cannot read it,
/// SameSite=None so the cross-origin frontend can send it back.
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, token)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .path("/")
        .max_age(Duration::hours(TOKEN_TTL_HOURS))
        .finish()
}

/// Same attribute set with a zero max-age, which clears the cookie at sign-out.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, "")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .path("/")
        .max_age(Duration::ZERO)
        .finish()
}

/// Extractor yielding validated `Claims` from the session cookie.
///
/// Protected routes take an `Auth` argument; a missing, invalid or expired
/// token short-circuits the handler with a 401 response.
pub struct Auth(pub Claims);

impl FromRequest for Auth {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _pl: &mut Payload) -> Self::Future {
        if let Some(cookie) = req.cookie(TOKEN_COOKIE) {
            match decode_token(cookie.value()) {
                Ok(claims) => return ready(Ok(Auth(claims))),
                Err(_) => return ready(Err(ApiError::Unauthorized)),
            }
        }
        ready(Err(ApiError::Unauthorized))
    }
}
