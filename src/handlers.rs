use actix_web::{get, post, web, HttpResponse};
use bcrypt::{hash, verify, DEFAULT_COST};
use log::{debug, info};

use crate::auth::{AuthGate, AuthedUser};
use crate::error::ApiError;
use crate::models::{
    FollowRequest, LoginRequest, LoginResponse, SignupRequest, TimelineResponse, TweetRequest,
    UnfollowRequest,
};
use crate::store::{NewUser, Store};
use crate::timeline;

#[get("/ping")]
pub async fn ping() -> &'static str {
    "pong"
}

#[post("/signup")]
pub async fn signup(
    store: web::Data<dyn Store>,
    body: web::Json<SignupRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    // The raw password never reaches the store or the logs.
    let hashed_password = hash(body.password.as_bytes(), DEFAULT_COST)?;
    let user = store.create_user(NewUser {
        name: body.name,
        email: body.email,
        profile: body.profile,
        hashed_password,
    })?;
    info!("created user {} <{}>", user.id, user.email);
    Ok(HttpResponse::Ok().json(user))
}

#[post("/login")]
pub async fn login(
    store: web::Data<dyn Store>,
    gate: web::Data<AuthGate>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    // Unknown email and wrong password are the same failure to the caller.
    let (user_id, hashed_password) = store
        .credential_by_email(&body.email)?
        .ok_or(ApiError::Unauthorized)?;
    if !verify(body.password.as_bytes(), &hashed_password)? {
        return Err(ApiError::Unauthorized);
    }
    let access_token = gate.issue(user_id)?;
    info!("user {user_id} logged in");
    Ok(HttpResponse::Ok().json(LoginResponse { access_token }))
}

#[post("/tweet")]
pub async fn tweet(
    store: web::Data<dyn Store>,
    user: AuthedUser,
    body: web::Json<TweetRequest>,
) -> Result<HttpResponse, ApiError> {
    store.post_tweet(user.0, &body.tweet)?;
    debug!("user {} tweeted {} chars", user.0, body.tweet.chars().count());
    Ok(HttpResponse::Ok().finish())
}

#[post("/follow")]
pub async fn follow(
    store: web::Data<dyn Store>,
    user: AuthedUser,
    body: web::Json<FollowRequest>,
) -> Result<HttpResponse, ApiError> {
    store.follow(user.0, body.follow)?;
    info!("user {} now follows {}", user.0, body.follow);
    Ok(HttpResponse::Ok().finish())
}

#[post("/unfollow")]
pub async fn unfollow(
    store: web::Data<dyn Store>,
    user: AuthedUser,
    body: web::Json<UnfollowRequest>,
) -> Result<HttpResponse, ApiError> {
    store.unfollow(user.0, body.unfollow)?;
    info!("user {} unfollowed {}", user.0, body.unfollow);
    Ok(HttpResponse::Ok().finish())
}

#[get("/timeline/{user_id}")]
pub async fn get_timeline(
    store: web::Data<dyn Store>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    let tweets = timeline::timeline(store.get_ref(), user_id)?;
    debug!("timeline for user {user_id}: {} tweets", tweets.len());
    Ok(HttpResponse::Ok().json(TimelineResponse {
        user_id,
        timeline: tweets,
    }))
}
