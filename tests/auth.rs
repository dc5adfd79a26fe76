use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::{dev::Payload, test, FromRequest};
use bidboard::auth::{self, Auth, Claims, TOKEN_COOKIE};
use std::env;

// Helper that guarantees a sufficiently long secret for tests.
fn set_secret() {
    env::set_var("ACCESS_TOKEN_SECRET", "test-secret-must-be-32-bytes-long!!");
}

#[actix_web::test]
async fn token_roundtrip_through_cookie_extractor() {
    set_secret();
    let token = auth::issue_token("a@x.com").expect("token");
    // The Auth extractor is the public way to validate, so use it here.
    let req = test::TestRequest::default()
        .cookie(Cookie::new(TOKEN_COOKIE, token))
        .to_http_request();
    let mut pl = Payload::None;
    let auth = Auth::from_request(&req, &mut pl).await.expect("extract");
    assert_eq!(auth.0.email, "a@x.com");
}

#[actix_web::test]
async fn extractor_rejects_missing_cookie() {
    set_secret();
    let req = test::TestRequest::default().to_http_request();
    let mut pl = Payload::None;
    assert!(Auth::from_request(&req, &mut pl).await.is_err());
}

#[actix_web::test]
async fn extractor_rejects_garbage_token() {
    set_secret();
    let req = test::TestRequest::default()
        .cookie(Cookie::new(TOKEN_COOKIE, "notatoken"))
        .to_http_request();
    let mut pl = Payload::None;
    assert!(Auth::from_request(&req, &mut pl).await.is_err());
}

#[actix_web::test]
async fn extractor_rejects_expired_token() {
    set_secret();
    // Sign an already-expired token with the same secret the extractor uses.
    let claims = Claims {
        email: "a@x.com".into(),
        exp: (chrono::Utc::now().timestamp() - 3600) as usize,
    };
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(
            env::var("ACCESS_TOKEN_SECRET").unwrap().as_bytes(),
        ),
    )
    .unwrap();
    let req = test::TestRequest::default()
        .cookie(Cookie::new(TOKEN_COOKIE, token))
        .to_http_request();
    let mut pl = Payload::None;
    assert!(Auth::from_request(&req, &mut pl).await.is_err());
}

#[actix_web::test]
async fn session_cookie_attributes() {
    set_secret();
    let cookie = auth::session_cookie("abc".into());
    assert_eq!(cookie.name(), TOKEN_COOKIE);
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.secure(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::None));
    assert_eq!(cookie.max_age(), Some(Duration::hours(1)));

    // Sign-out reuses the attribute set with a zero max-age.
    let removal = auth::removal_cookie();
    assert_eq!(removal.name(), TOKEN_COOKIE);
    assert_eq!(removal.max_age(), Some(Duration::ZERO));
    assert_eq!(removal.same_site(), Some(SameSite::None));
}
