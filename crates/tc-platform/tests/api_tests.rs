//! Platform Integration Tests
//!
//! Service flows and HTTP routing over the in-memory store backend.

use std::sync::Arc;

use tc_platform::auth::{Argon2Config, AuthConfig, PasswordService, TokenService};
use tc_platform::{ErrorKind, PlatformServices, Stores};

fn tokens() -> Arc<TokenService> {
    Arc::new(TokenService::new(AuthConfig {
        secret_key: "integration-secret".to_string(),
        ..AuthConfig::default()
    }))
}

fn services(stores: &Stores) -> PlatformServices {
    let passwords = Arc::new(PasswordService::new(Argon2Config::testing()).unwrap());
    PlatformServices::new(stores, passwords, tokens())
}

fn sign_up(email: &str, password: &str) -> tc_platform::auth::auth_service::SignUpRequest {
    tc_platform::auth::auth_service::SignUpRequest {
        email: email.to_string(),
        password: password.to_string(),
        full_name: email.split('@').next().unwrap_or_default().to_string(),
    }
}

fn log_in(email: &str, password: &str) -> tc_platform::auth::auth_service::LoginRequest {
    tc_platform::auth::auth_service::LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

mod account_flow_tests {
    use super::*;

    #[tokio::test]
    async fn test_signup_login_follow_flow() {
        let stores = Stores::in_memory();
        let services = services(&stores);

        let alice = services.auth.sign_up(sign_up("alice@x.com", "pw1")).await.unwrap();
        let bob = services.auth.sign_up(sign_up("bob@x.com", "pw")).await.unwrap();

        let err = services.auth.sign_up(sign_up("alice@x.com", "pw2")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let err = services.auth.log_in(log_in("alice@x.com", "pw2")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);

        let session = services.auth.log_in(log_in("alice@x.com", "pw1")).await.unwrap();
        let caller = tokens().verify(&session.access_token).unwrap();
        assert_eq!(caller, alice.id);

        let follow = services.relationships.follow(&bob.id, &caller).await.unwrap();
        assert_eq!(follow.parent_user_id, bob.id);
        assert_eq!(follow.follower_id, alice.id);

        let err = services.relationships.follow(&bob.id, &caller).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_email_is_case_insensitive() {
        let stores = Stores::in_memory();
        let services = services(&stores);

        services.auth.sign_up(sign_up("Carol@X.com", "pw")).await.unwrap();
        let err = services.auth.sign_up(sign_up("carol@x.com", "other")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let session = services.auth.log_in(log_in("CAROL@x.com", "pw")).await.unwrap();
        assert_eq!(session.user.email, "carol@x.com");
    }

    #[tokio::test]
    async fn test_duplicate_bookmark_and_missing_unlink() {
        let stores = Stores::in_memory();
        let services = services(&stores);
        let alice = services.auth.sign_up(sign_up("alice@x.com", "pw")).await.unwrap();
        let bob = services.auth.sign_up(sign_up("bob@x.com", "pw")).await.unwrap();

        services.relationships.bookmark(&bob.id, &alice.id).await.unwrap();
        let err = services.relationships.bookmark(&bob.id, &alice.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        services.relationships.remove_bookmark(&bob.id, &alice.id).await.unwrap();
        let err = services.relationships.remove_bookmark(&bob.id, &alice.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = services.relationships.unfollow(&bob.id, &alice.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}

mod community_tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tc_platform::auth::AuthService;
    use tc_platform::community::service::{
        CommunityService, CreateCommunityRequest, FollowCommunityRequest, PromotionRetry,
    };
    use tc_platform::shared::api_common::PageParams;
    use tc_platform::user::entity::{UserPatch, UserSort};
    use tc_platform::user::repository::UserStore;
    use tc_platform::{PlatformError, Result, User};

    fn create(name: &str) -> CreateCommunityRequest {
        CreateCommunityRequest {
            name: name.to_string(),
            is_paid_community: Some(false),
            community_price: None,
            description: "weekly meetups".to_string(),
            followers_can_post: None,
        }
    }

    fn join(community_id: &str) -> FollowCommunityRequest {
        FollowCommunityRequest {
            community_id: community_id.to_string(),
            community_owner_id: None,
        }
    }

    #[tokio::test]
    async fn test_list_followers_visibility() {
        let stores = Stores::in_memory();
        let services = services(&stores);
        let owner = services.auth.sign_up(sign_up("owner@x.com", "pw")).await.unwrap();
        let member = services.auth.sign_up(sign_up("member@x.com", "pw")).await.unwrap();
        let outsider = services.auth.sign_up(sign_up("outsider@x.com", "pw")).await.unwrap();

        let community = services.communities.create_community(&owner.id, create("rust-berlin")).await.unwrap();
        assert!(!community.is_paid_community);
        assert!(services.auth.get_profile(&owner.id).await.unwrap().is_community_owner);
        assert_eq!(services.communities.get_community(&community.id).await.unwrap().name, "rust-berlin");

        let page = PageParams::default();
        let err = services
            .communities
            .list_followers(&community.id, &owner.id, &page)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        services.communities.follow_community(&member.id, join(&community.id)).await.unwrap();

        let err = services
            .communities
            .list_followers(&community.id, &outsider.id, &page)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let as_owner = services.communities.list_followers(&community.id, &owner.id, &page).await.unwrap();
        let as_member = services.communities.list_followers(&community.id, &member.id, &page).await.unwrap();
        assert_eq!(as_owner.len(), 1);
        assert_eq!(as_owner[0].follower_id, member.id);
        assert_eq!(as_owner[0].community_owner_id, owner.id);
        assert_eq!(as_member[0].id, as_owner[0].id);

        let err = services
            .communities
            .list_followers("no-such-community", &owner.id, &page)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_follower_outside_page_can_list() {
        let stores = Stores::in_memory();
        let services = services(&stores);
        let owner = services.auth.sign_up(sign_up("owner@x.com", "pw")).await.unwrap();
        let community = services.communities.create_community(&owner.id, create("late-joiners")).await.unwrap();

        let mut last = String::new();
        for i in 0..4 {
            let member = services
                .auth
                .sign_up(sign_up(&format!("member{}@x.com", i), "pw"))
                .await
                .unwrap();
            services.communities.follow_community(&member.id, join(&community.id)).await.unwrap();
            last = member.id;
            // edge ids order by millisecond
            tokio::time::sleep(Duration::from_millis(2)).await;
        }

        let first_page = services
            .communities
            .list_followers(&community.id, &last, &PageParams::new(0, 1))
            .await
            .unwrap();
        assert_eq!(first_page.len(), 1);
        assert_ne!(first_page[0].follower_id, last);
    }

    #[tokio::test]
    async fn test_duplicate_membership_and_leave() {
        let stores = Stores::in_memory();
        let services = services(&stores);
        let owner = services.auth.sign_up(sign_up("owner@x.com", "pw")).await.unwrap();
        let member = services.auth.sign_up(sign_up("member@x.com", "pw")).await.unwrap();
        let community = services.communities.create_community(&owner.id, create("gophers")).await.unwrap();

        services.communities.follow_community(&member.id, join(&community.id)).await.unwrap();
        let err = services
            .communities
            .follow_community(&member.id, join(&community.id))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        services.communities.leave_community(&community.id, &member.id).await.unwrap();
        let err = services.communities.leave_community(&community.id, &member.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_community_names_are_unique() {
        let stores = Stores::in_memory();
        let services = services(&stores);
        let first = services.auth.sign_up(sign_up("first@x.com", "pw")).await.unwrap();
        let second = services.auth.sign_up(sign_up("second@x.com", "pw")).await.unwrap();

        services.communities.create_community(&first.id, create("rustaceans")).await.unwrap();
        let err = services
            .communities
            .create_community(&second.id, create("rustaceans"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(!services.auth.get_profile(&second.id).await.unwrap().is_community_owner);
    }

    /// Delegates to a real store but fails every update
    struct UpdatesFail {
        inner: Arc<dyn UserStore>,
        updates: AtomicU32,
    }

    #[async_trait]
    impl UserStore for UpdatesFail {
        async fn insert(&self, user: &User) -> Result<()> {
            self.inner.insert(user).await
        }

        async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
            self.inner.find_by_id(id).await
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
            self.inner.find_by_email(email).await
        }

        async fn update_by_id(&self, _id: &str, _patch: &UserPatch) -> Result<Option<User>> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            Err(PlatformError::unavailable("store timed out"))
        }

        async fn update_by_email(&self, _email: &str, _patch: &UserPatch) -> Result<Option<User>> {
            Err(PlatformError::unavailable("store timed out"))
        }

        async fn list_page(&self, sort: UserSort, offset: u64, limit: i64) -> Result<Vec<User>> {
            self.inner.list_page(sort, offset, limit).await
        }
    }

    #[tokio::test]
    async fn test_failed_promotion_removes_community() {
        let stores = Stores::in_memory();
        let owner = User::new("owner@x.com", "h", "Owner");
        stores.users.insert(&owner).await.unwrap();

        let users = Arc::new(UpdatesFail {
            inner: stores.users.clone(),
            updates: AtomicU32::new(0),
        });
        let auth = Arc::new(AuthService::new(
            users.clone(),
            Arc::new(PasswordService::new(Argon2Config::testing()).unwrap()),
            tokens(),
        ));
        let communities = CommunityService::new(
            stores.communities.clone(),
            stores.community_followers.clone(),
            users.clone(),
            auth,
        )
        .with_promotion_retry(PromotionRetry {
            retries: 2,
            delay: Duration::from_millis(1),
        });

        let err = communities.create_community(&owner.id, create("doomed")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);
        assert_eq!(users.updates.load(Ordering::SeqCst), 3);

        let err = communities.list_communities(&PageParams::default()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let stored = stores.users.find_by_id(&owner.id).await.unwrap().unwrap();
        assert!(!stored.is_community_owner);
    }
}

mod store_outage_tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use tc_platform::shared::deadline::bounded;
    use tc_platform::user::entity::{UserPatch, UserSort};
    use tc_platform::user::repository::UserStore;
    use tc_platform::{platform_router, AppState, AuthLayer, Result, User};

    /// Every call hangs until the store deadline expires
    struct StalledUsers {
        limit: Duration,
    }

    impl StalledUsers {
        async fn stall<T>(&self, operation: &'static str) -> Result<T> {
            bounded(self.limit, operation, std::future::pending()).await
        }
    }

    #[async_trait]
    impl UserStore for StalledUsers {
        async fn insert(&self, _user: &User) -> Result<()> {
            self.stall("users.insert").await
        }

        async fn find_by_id(&self, _id: &str) -> Result<Option<User>> {
            self.stall("users.find_by_id").await
        }

        async fn find_by_email(&self, _email: &str) -> Result<Option<User>> {
            self.stall("users.find_by_email").await
        }

        async fn update_by_id(&self, _id: &str, _patch: &UserPatch) -> Result<Option<User>> {
            self.stall("users.update_by_id").await
        }

        async fn update_by_email(&self, _email: &str, _patch: &UserPatch) -> Result<Option<User>> {
            self.stall("users.update_by_email").await
        }

        async fn list_page(&self, _sort: UserSort, _offset: u64, _limit: i64) -> Result<Vec<User>> {
            self.stall("users.list_page").await
        }
    }

    fn stalled_stores() -> Stores {
        Stores {
            users: Arc::new(StalledUsers {
                limit: Duration::from_millis(20),
            }),
            ..Stores::in_memory()
        }
    }

    #[tokio::test]
    async fn test_stalled_store_is_unavailable() {
        let services = services(&stalled_stores());

        let err = services.auth.log_in(log_in("alice@x.com", "pw")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);

        let err = services.auth.sign_up(sign_up("alice@x.com", "pw")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);

        let err = services.relationships.follow("bob", "alice").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);
    }

    #[tokio::test]
    async fn test_stalled_store_maps_to_503() {
        let (router, _openapi) = platform_router(&services(&stalled_stores())).split_for_parts();
        let app = router.layer(AuthLayer::new(AppState {
            token_service: tokens(),
            signup_secret: None,
        }));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/user/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"email":"alice@x.com","password":"pw"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}

mod overview_tests {
    use super::*;
    use std::collections::HashSet;

    use tc_platform::auth::auth_service::ProfileUpdateRequest;
    use tc_platform::shared::api_common::PageParams;
    use tc_platform::{Culture, PrivacyMode};

    #[tokio::test]
    async fn test_overview_zero_fills_missing_rows() {
        let stores = Stores::in_memory();
        let services = services(&stores);
        let dana = services.auth.sign_up(sign_up("dana@x.com", "pw")).await.unwrap();

        let view = services.overviews.get_overview(&dana.id).await.unwrap();
        assert_eq!(view.user_id, dana.id);
        assert_eq!(view.email, "dana@x.com");
        assert_eq!(view.city, "");
        assert_eq!(view.years_of_experience, 0);
        assert_eq!(view.privacy_mode, PrivacyMode::Public);
        assert!(view.interested_markets.is_empty());
        assert!(!view.motivation.building_products);
        assert_eq!(view.desired_salary_amount, 0.0);
        assert!(!view.company_size_preferences.seed.ideal);

        services
            .profiles
            .upsert_culture(
                &dana.id,
                Culture {
                    interested_markets: Some(vec!["fintech".to_string()]),
                    ..Culture::default()
                },
            )
            .await
            .unwrap();

        let view = services.overviews.get_overview(&dana.id).await.unwrap();
        assert_eq!(view.interested_markets, vec!["fintech".to_string()]);
        assert_eq!(view.job_type, "");
    }

    #[tokio::test]
    async fn test_profile_and_privacy_updates_show_in_overview() {
        let stores = Stores::in_memory();
        let services = services(&stores);
        let gus = services.auth.sign_up(sign_up("gus@x.com", "pw")).await.unwrap();

        let updated = services
            .auth
            .update_profile(
                &gus.id,
                ProfileUpdateRequest {
                    city: Some("Lisbon".to_string()),
                    years_of_experience: Some(7),
                    currently_employed: Some(true),
                    ..ProfileUpdateRequest::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.city.as_deref(), Some("Lisbon"));

        services.auth.update_privacy(&gus.id, PrivacyMode::Private).await.unwrap();

        let view = services.overviews.get_overview(&gus.id).await.unwrap();
        assert_eq!(view.city, "Lisbon");
        assert_eq!(view.years_of_experience, 7);
        assert!(view.currently_employed);
        assert!(!view.student_or_new_graduate);
        assert_eq!(view.privacy_mode, PrivacyMode::Private);
        assert_eq!(services.auth.get_profile(&gus.id).await.unwrap().privacy_mode, PrivacyMode::Private);
    }

    #[tokio::test]
    async fn test_overview_pages_are_disjoint() {
        let stores = Stores::in_memory();
        let services = services(&stores);
        for i in 0..5 {
            services
                .auth
                .sign_up(sign_up(&format!("user{}@x.com", i), "pw"))
                .await
                .unwrap();
        }

        let mut seen = HashSet::new();
        for offset in [0, 2, 4] {
            let page = services
                .overviews
                .list_overviews(Some("email"), Some("desc"), &PageParams::new(offset, 2))
                .await
                .unwrap();
            for view in page {
                assert!(seen.insert(view.user_id));
            }
        }
        assert_eq!(seen.len(), 5);

        let first = services
            .overviews
            .list_overviews(Some("email"), Some("desc"), &PageParams::new(0, 1))
            .await
            .unwrap();
        assert_eq!(first[0].email, "user4@x.com");
    }
}

mod http_tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use tc_platform::{platform_router, AppState, AuthLayer};

    fn app(signup_secret: Option<&str>) -> Router {
        let stores = Stores::in_memory();
        let services = services(&stores);
        let (router, _openapi) = platform_router(&services).split_for_parts();
        router.layer(AuthLayer::new(AppState {
            token_service: tokens(),
            signup_secret: signup_secret.map(Arc::from),
        }))
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_signup_then_login_over_http() {
        let app = app(None);
        let credentials = json!({ "email": "erin@x.com", "password": "pw", "full_name": "Erin" });

        let response = app.clone().oneshot(post("/user/signup", credentials.clone())).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let user = json_body(response).await;
        assert_eq!(user["email"], "erin@x.com");
        assert!(user.get("password_hash").is_none());

        let response = app.clone().oneshot(post("/user/signup", credentials)).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = app
            .clone()
            .oneshot(post("/user/login", json!({ "email": "erin@x.com", "password": "pw" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let session = json_body(response).await;
        let token = session["access_token"].as_str().unwrap().to_string();
        assert_eq!(session["id"], user["id"]);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/user/overview")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let overview = json_body(response).await;
        assert_eq!(overview["user_id"], user["id"]);
        assert_eq!(overview["interested_markets"], json!([]));
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let response = app(None)
            .oneshot(Request::builder().uri("/community/all").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_forged_token_is_rejected() {
        let forged = TokenService::new(AuthConfig {
            secret_key: "someone-else".to_string(),
            ..AuthConfig::default()
        })
        .issue("intruder")
        .unwrap();

        let response = app(None)
            .oneshot(
                Request::builder()
                    .uri("/user/profile")
                    .header(header::AUTHORIZATION, format!("Bearer {}", forged))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_signup_secret_is_enforced() {
        let app = app(Some("letmein"));
        let body = json!({ "email": "fay@x.com", "password": "pw", "full_name": "Fay" });

        let response = app.clone().oneshot(post("/user/signup", body.clone())).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let mut request = post("/user/signup", body);
        request.headers_mut().insert("secret", "letmein".parse().unwrap());
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
