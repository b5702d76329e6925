//! End-to-end tests driving the router in-process against an in-memory
//! database and a temporary media root.

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use agrirent_api::{router, ApiConfig, AppState};
use agrirent_db::{Database, DbConfig};

const BOUNDARY: &str = "agrirent-test-boundary";

// =============================================================================
// Harness
// =============================================================================

struct TestApp {
    router: Router,
    state: Arc<AppState>,
    media: TempDir,
}

struct User {
    id: String,
    token: String,
}

async fn app() -> TestApp {
    let media = tempfile::tempdir().unwrap();
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let config = ApiConfig {
        media_root: media.path().to_string_lossy().into_owned(),
        jwt_secret: "integration-test-secret".to_string(),
        ..ApiConfig::default()
    };
    let state = Arc::new(AppState::new(db, config));

    TestApp {
        router: router(state.clone()),
        state,
        media,
    }
}

impl TestApp {
    async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::GET, uri, token).body(Body::empty()).unwrap())
            .await
    }

    async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let req = request(Method::POST, uri, token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(req).await
    }

    async fn post_multipart(
        &self,
        uri: &str,
        token: &str,
        fields: &[(&str, &str)],
        file: Option<(&str, &str, &[u8])>,
    ) -> (StatusCode, Value) {
        let req = request(Method::POST, uri, Some(token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(fields, file)))
            .unwrap();
        self.send(req).await
    }

    async fn register(&self, mobile: &str, pincode: &str) -> User {
        let (status, body) = self
            .post(
                "/register/",
                None,
                json!({
                    "mobile_number": mobile,
                    "password": "password123",
                    "confirm_password": "password123",
                    "village": "Khed",
                    "district": "Pune",
                    "pincode": pincode,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        User {
            id: body["account"]["id"].as_str().unwrap().to_string(),
            token: body["access_token"].as_str().unwrap().to_string(),
        }
    }

    async fn login(&self, mobile: &str) -> String {
        let (status, body) = self
            .post(
                "/login/",
                None,
                json!({ "mobile_number": mobile, "password": "password123" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Registers and promotes the administrator account.
    async fn admin(&self) -> User {
        let user = self.register("9999999999", "411001").await;
        self.state.db.accounts().set_admin(&user.id, true).await.unwrap();
        User {
            token: self.login("9999999999").await,
            id: user.id,
        }
    }

    async fn add_tool(&self, owner: &User, name: &str) -> String {
        let (status, body) = self
            .post_multipart(
                "/add-tool/",
                &owner.token,
                &[
                    ("name", name),
                    ("category", "plow"),
                    ("description", "Heavy duty, recently serviced"),
                    ("price_per_day", "100"),
                    ("available_from", "2024-01-01"),
                    ("available_to", "2024-12-31"),
                ],
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["is_approved"], false);
        body["id"].as_str().unwrap().to_string()
    }

    async fn approved_tool(&self, owner: &User, admin: &User, name: &str) -> String {
        let id = self.add_tool(owner, name).await;
        let (status, body) = self
            .post(&format!("/admin/tool/{id}/approve/"), Some(&admin.token), Value::Null)
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        id
    }

    async fn book(&self, borrower: &User, tool_id: &str, start: &str, end: &str) -> (StatusCode, Value) {
        self.post(
            &format!("/tool/{tool_id}/"),
            Some(&borrower.token),
            json!({ "start_date": start, "end_date": end }),
        )
        .await
    }

    async fn pending_booking(&self, borrower: &User, tool_id: &str) -> String {
        let (status, body) = self.book(borrower, tool_id, "2024-01-01", "2024-01-04").await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_string()
    }

    async fn proof(&self, user: &User, booking_id: &str, stage: &str) -> (StatusCode, Value) {
        self.post_multipart(
            &format!("/booking/{booking_id}/proof/"),
            &user.token,
            &[("stage", stage)],
            Some(("proof_image", "handover.jpg", &b"\xff\xd8\xff\xe0fake-jpeg"[..])),
        )
        .await
    }

    /// Current booking state, read through the chat thread.
    async fn booking(&self, party: &User, booking_id: &str) -> Value {
        let (status, body) = self.get(&format!("/chat/{booking_id}/"), Some(&party.token)).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["booking"].clone()
    }

    fn files_in(&self, dir: &str) -> usize {
        count_files(&self.media.path().join(dir))
    }
}

fn request(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((name, filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

// =============================================================================
// Accounts
// =============================================================================

#[tokio::test]
async fn test_register_login_logout() {
    let app = app().await;
    let farmer = app.register("9000000001", "411001").await;

    let (status, body) = app.get("/dashboard/", Some(&farmer.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account"]["username"], "9000000001");
    assert_eq!(body["profile"]["pincode"], "411001");
    assert!(body["account"].get("password_hash").is_none());

    let (status, _) = app.post("/logout/", Some(&farmer.token), Value::Null).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.get("/dashboard/", Some(&farmer.token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHENTICATED");

    let token = app.login("9000000001").await;
    let (status, _) = app.get("/dashboard/", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = app().await;
    app.register("9000000001", "411001").await;

    let (status, body) = app
        .post(
            "/login/",
            None,
            json!({ "mobile_number": "9000000001", "password": "wrong-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHENTICATED");

    let (status, _) = app
        .post(
            "/login/",
            None,
            json!({ "mobile_number": "9000000002", "password": "password123" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_registration_validation_and_uniqueness() {
    let app = app().await;
    app.register("9000000001", "411001").await;

    let base = json!({
        "mobile_number": "9000000001",
        "password": "password123",
        "confirm_password": "password123",
        "village": "Khed",
        "district": "Pune",
        "pincode": "411001",
    });

    let (status, body) = app.post("/register/", None, base.clone()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE");

    let mut short = base.clone();
    short["mobile_number"] = json!("98765");
    let (status, body) = app.post("/register/", None, short).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "mobile_number");

    let mut mismatch = base.clone();
    mismatch["mobile_number"] = json!("9000000002");
    mismatch["confirm_password"] = json!("password124");
    let (status, body) = app.post("/register/", None, mismatch).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "confirm_password");
}

#[tokio::test]
async fn test_auth_required_and_bad_tokens() {
    let app = app().await;

    let (status, _) = app.get("/notifications/", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.get("/notifications/", Some("not.a.jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHENTICATED");

    // Optional auth still rejects a token that is present but invalid
    let (status, _) = app.get("/", Some("not.a.jwt")).await;
    assert_eq!(status, StatusCode::OK);
    let id = uuid::Uuid::new_v4();
    let (status, _) = app.get(&format!("/tool/{id}/"), Some("not.a.jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_verifies_profile() {
    let app = app().await;
    let farmer = app.register("9000000001", "411001").await;
    let admin = app.admin().await;

    let (status, body) = app
        .post("/admin/profile/9000000001/verify/", Some(&farmer.token), Value::Null)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "PERMISSION_DENIED");

    let (status, body) = app
        .post("/admin/profile/9000000001/verify/", Some(&admin.token), Value::Null)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["is_verified"], true);

    let (status, body) = app.get("/profile/9000000001/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["is_verified"], true);
    assert_eq!(body["account"]["id"], farmer.id.as_str());

    let (status, _) = app.get("/profile/9000000009/", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_demoted_admin_loses_rights_with_same_token() {
    let app = app().await;
    app.register("9000000001", "411001").await;
    let admin = app.admin().await;

    app.state.db.accounts().set_admin(&admin.id, false).await.unwrap();

    let (status, body) = app
        .post("/admin/profile/9000000001/verify/", Some(&admin.token), Value::Null)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "PERMISSION_DENIED");
}

// =============================================================================
// Listings & Discovery
// =============================================================================

#[tokio::test]
async fn test_new_listing_is_hidden_until_approved() {
    let app = app().await;
    let owner = app.register("9000000001", "411001").await;
    let stranger = app.register("9000000002", "411001").await;
    let admin = app.admin().await;

    let id = app.add_tool(&owner, "Reversible Plow").await;

    let (status, _) = app.get(&format!("/tool/{id}/"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get(&format!("/tool/{id}/"), Some(&stranger.token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = app.get(&format!("/tool/{id}/"), Some(&owner.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["owner"]["username"], "9000000001");

    let (_, body) = app.get("/discovery/", None).await;
    assert!(body["listings"].as_array().unwrap().is_empty());

    // Unapproved listings cannot be booked
    let (status, _) = app.book(&stranger, &id, "2024-01-01", "2024-01-02").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post(&format!("/admin/tool/{id}/approve/"), Some(&owner.token), Value::Null)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .post(&format!("/admin/tool/{id}/approve/"), Some(&admin.token), Value::Null)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_approved"], true);

    let (status, _) = app.get(&format!("/tool/{id}/"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get("/", None).await;
    assert_eq!(body["recent_listings"].as_array().unwrap().len(), 1);
    assert_eq!(body["categories"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_add_tool_validation_and_image() {
    let app = app().await;
    let owner = app.register("9000000001", "411001").await;

    let fields = [
        ("name", "Seed Drill"),
        ("category", "other"),
        ("description", "Nine row drill"),
        ("price_per_day", "250.50"),
        ("available_from", "2024-01-01"),
        ("available_to", "2024-06-30"),
        // Ignored: approval is never taken from the form
        ("is_approved", "true"),
    ];
    let (status, body) = app
        .post_multipart(
            "/add-tool/",
            &owner.token,
            &fields,
            Some(("image", "drill.PNG", &b"\x89PNG fake"[..])),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["is_approved"], false);
    assert_eq!(body["price_per_day_paise"], 25_050);
    assert_eq!(body["owner_id"], owner.id.as_str());
    let image = body["image"].as_str().unwrap();
    assert!(image.starts_with("tool_images/") && image.ends_with(".png"));
    assert!(app.media.path().join(image).exists());

    let (status, body) = app
        .post_multipart(
            "/add-tool/",
            &owner.token,
            &[
                ("name", "Seed Drill"),
                ("category", "drone"),
                ("description", "x"),
                ("price_per_day", "100"),
                ("available_from", "2024-01-01"),
                ("available_to", "2024-06-30"),
            ],
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "category");

    let (status, body) = app
        .post_multipart(
            "/add-tool/",
            &owner.token,
            &[
                ("name", "Seed Drill"),
                ("category", "other"),
                ("description", "x"),
                ("price_per_day", "0"),
                ("available_from", "2024-01-01"),
                ("available_to", "2024-06-30"),
            ],
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "price_per_day");

    let (status, body) = app
        .post_multipart(
            "/add-tool/",
            &owner.token,
            &[
                ("name", "Seed Drill"),
                ("category", "other"),
                ("description", "x"),
                ("price_per_day", "100"),
                ("available_from", "2024-06-30"),
                ("available_to", "2024-01-01"),
            ],
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "available_to");

    // Only the first listing's image was written
    assert_eq!(app.files_in("tool_images"), 1);
}

#[tokio::test]
async fn test_discovery_filters_by_text_and_pincode() {
    let app = app().await;
    let pune = app.register("9000000001", "411001").await;
    let nashik = app.register("9000000002", "422001").await;
    let admin = app.admin().await;

    app.approved_tool(&pune, &admin, "Disc PLOW").await;
    app.approved_tool(&nashik, &admin, "Mould board plow").await;
    app.approved_tool(&nashik, &admin, "Tractor trolley").await;
    app.add_tool(&pune, "Unapproved plow").await;

    let (status, body) = app.get("/discovery/?search=plow", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["listings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.iter().all(|n| n.to_lowercase().contains("plow")));
    assert!(!names.contains(&"Unapproved plow"));

    let (_, body) = app.get("/discovery/?search=plow&location=422001", None).await;
    let listings = body["listings"].as_array().unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0]["name"], "Mould board plow");

    // Description match ("Heavy duty, recently serviced")
    let (_, body) = app.get("/discovery/?search=RECENTLY", None).await;
    assert_eq!(body["listings"].as_array().unwrap().len(), 3);

    let long = "x".repeat(101);
    let (status, body) = app.get(&format!("/discovery/?search={long}"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "search");
}

// =============================================================================
// Bookings
// =============================================================================

#[tokio::test]
async fn test_booking_total_is_frozen_at_creation() {
    let app = app().await;
    let owner = app.register("9000000001", "411001").await;
    let borrower = app.register("9000000002", "411001").await;
    let admin = app.admin().await;
    let tool = app.approved_tool(&owner, &admin, "Plow").await;

    let (status, body) = app.book(&borrower, &tool, "2024-01-01", "2024-01-04").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["total_price_paise"], 30_000);
    assert_eq!(body["delivery_fee_paise"], 0);

    let (_, body) = app.book(&borrower, &tool, "2024-01-01", "2024-01-01").await;
    assert_eq!(body["total_price_paise"], 10_000);

    let (status, body) = app.book(&borrower, &tool, "2024-01-04", "2024-01-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "end_date");

    let (status, body) = app.book(&borrower, &tool, "", "2024-01-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "start_date");

    let (status, _) = app
        .post(&format!("/tool/{tool}/"), None, json!({ "start_date": "2024-01-01", "end_date": "2024-01-02" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_only_owner_decides() {
    let app = app().await;
    let owner = app.register("9000000001", "411001").await;
    let borrower = app.register("9000000002", "411001").await;
    let admin = app.admin().await;
    let tool = app.approved_tool(&owner, &admin, "Plow").await;
    let booking = app.pending_booking(&borrower, &tool).await;

    let (status, body) = app
        .post(&format!("/booking/{booking}/approve/"), Some(&borrower.token), Value::Null)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "PERMISSION_DENIED");
    assert_eq!(app.booking(&owner, &booking).await["status"], "pending");

    let (status, body) = app
        .post(&format!("/booking/{booking}/cancel/"), Some(&owner.token), Value::Null)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "action");

    let (status, body) = app
        .post(&format!("/booking/{booking}/approve/"), Some(&owner.token), Value::Null)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "approved");

    let (status, body) = app
        .post(&format!("/booking/{booking}/reject/"), Some(&owner.token), Value::Null)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_TRANSITION");
    assert_eq!(app.booking(&owner, &booking).await["status"], "approved");
}

#[tokio::test]
async fn test_concurrent_decisions_one_wins() {
    let app = app().await;
    let owner = app.register("9000000001", "411001").await;
    let borrower = app.register("9000000002", "411001").await;
    let admin = app.admin().await;
    let tool = app.approved_tool(&owner, &admin, "Plow").await;
    let booking = app.pending_booking(&borrower, &tool).await;

    let approve_uri = format!("/booking/{booking}/approve/");
    let reject_uri = format!("/booking/{booking}/reject/");
    let ((a, _), (r, _)) = tokio::join!(
        app.post(&approve_uri, Some(&owner.token), Value::Null),
        app.post(&reject_uri, Some(&owner.token), Value::Null),
    );

    let mut statuses = [a, r];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::CONFLICT]);

    let status = app.booking(&owner, &booking).await["status"].clone();
    let expected = if a == StatusCode::OK { "approved" } else { "rejected" };
    assert_eq!(status, expected);
}

#[tokio::test]
async fn test_pickup_proof_while_pending_stores_nothing() {
    let app = app().await;
    let owner = app.register("9000000001", "411001").await;
    let borrower = app.register("9000000002", "411001").await;
    let admin = app.admin().await;
    let tool = app.approved_tool(&owner, &admin, "Plow").await;
    let booking = app.pending_booking(&borrower, &tool).await;

    let (status, body) = app.proof(&borrower, &booking, "pickup").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_TRANSITION");

    let current = app.booking(&borrower, &booking).await;
    assert_eq!(current["status"], "pending");
    assert!(current["pickup_proof"].is_null());
    assert_eq!(app.files_in("proofs"), 0);

    // Unknown stage and missing image are validation errors
    let (status, body) = app.proof(&borrower, &booking, "teleport").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "stage");

    let (status, body) = app
        .post_multipart(
            &format!("/booking/{booking}/proof/"),
            &borrower.token,
            &[("stage", "pickup")],
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "proof_image");
}

#[tokio::test]
async fn test_full_rental_flow_and_reviews() {
    let app = app().await;
    let owner = app.register("9000000001", "411001").await;
    let borrower = app.register("9000000002", "411001").await;
    let stranger = app.register("9000000003", "411001").await;
    let admin = app.admin().await;
    let tool = app.approved_tool(&owner, &admin, "Plow").await;
    let booking = app.pending_booking(&borrower, &tool).await;
    let review_uri = format!("/booking/{booking}/review/");

    app.post(&format!("/booking/{booking}/approve/"), Some(&owner.token), Value::Null)
        .await;

    // Only the borrower documents handovers
    let (status, _) = app.proof(&owner, &booking, "pickup").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Stage must match the current status
    let (status, _) = app.proof(&borrower, &booking, "return").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app.proof(&borrower, &booking, "pickup").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "picked_up");
    let pickup = body["pickup_proof"].as_str().unwrap().to_string();
    assert!(pickup.starts_with("proofs/"));

    let (status, body) = app
        .post(&review_uri, Some(&borrower.token), json!({ "rating": 5 }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "reviews wait for the return: {body}");

    let (status, body) = app.proof(&borrower, &booking, "return").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "returned");
    assert_eq!(body["pickup_proof"], pickup.as_str());
    assert!(body["return_proof"].as_str().unwrap().starts_with("proofs/"));
    assert_eq!(app.files_in("proofs"), 2);

    let (status, _) = app.proof(&borrower, &booking, "return").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(app.files_in("proofs"), 2);

    let (status, _) = app
        .post(&review_uri, Some(&stranger.token), json!({ "rating": 1 }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .post(&review_uri, Some(&borrower.token), json!({ "rating": 6 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "rating");

    let (status, body) = app
        .post(
            &review_uri,
            Some(&borrower.token),
            json!({ "rating": 4, "comment": "Worked well" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["reviewee_id"], owner.id.as_str());

    let (status, body) = app
        .post(&review_uri, Some(&owner.token), json!({ "rating": 5 }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE");

    let (_, body) = app.get("/profile/9000000001/", None).await;
    assert_eq!(body["reviews"].as_array().unwrap().len(), 1);
    assert_eq!(body["average_rating"], 4.0);
}

#[tokio::test]
async fn test_notifications_count_pending_requests() {
    let app = app().await;
    let owner = app.register("9000000001", "411001").await;
    let borrower = app.register("9000000002", "411001").await;
    let admin = app.admin().await;
    let tool = app.approved_tool(&owner, &admin, "Plow").await;

    let first = app.pending_booking(&borrower, &tool).await;
    app.pending_booking(&borrower, &tool).await;

    let (status, body) = app.get("/notifications/", Some(&owner.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pending_count"], 2);

    let (_, body) = app.get("/notifications/", Some(&borrower.token)).await;
    assert_eq!(body["pending_count"], 0);

    app.post(&format!("/booking/{first}/reject/"), Some(&owner.token), Value::Null)
        .await;

    let (_, body) = app.get("/dashboard/", Some(&owner.token)).await;
    assert_eq!(body["pending_count"], 1);
    assert_eq!(body["incoming_requests"].as_array().unwrap().len(), 2);
    assert_eq!(body["my_listings"].as_array().unwrap().len(), 1);

    let (_, body) = app.get("/dashboard/", Some(&borrower.token)).await;
    assert_eq!(body["my_bookings"].as_array().unwrap().len(), 2);
    assert_eq!(body["cross_sell"].as_array().unwrap().len(), 1);
}

// =============================================================================
// Chat & Reports
// =============================================================================

#[tokio::test]
async fn test_chat_is_party_only_and_ordered() {
    let app = app().await;
    let owner = app.register("9000000001", "411001").await;
    let borrower = app.register("9000000002", "411001").await;
    let stranger = app.register("9000000003", "411001").await;
    let admin = app.admin().await;
    let tool = app.approved_tool(&owner, &admin, "Plow").await;
    let booking = app.pending_booking(&borrower, &tool).await;
    let uri = format!("/chat/{booking}/");

    let (status, _) = app.get(&uri, Some(&stranger.token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .post(&uri, Some(&stranger.token), json!({ "content": "hello?" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    for (user, text) in [(&borrower, "Is it free?"), (&owner, "Yes"), (&borrower, "Thanks")] {
        let (status, _) = app.post(&uri, Some(&user.token), json!({ "content": text })).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app.post(&uri, Some(&owner.token), json!({ "content": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "content");

    let (_, body) = app.get(&uri, Some(&owner.token)).await;
    let messages = body["messages"].as_array().unwrap();
    let texts: Vec<&str> = messages.iter().map(|m| m["content"].as_str().unwrap()).collect();
    assert_eq!(texts, ["Is it free?", "Yes", "Thanks"]);

    let stamps: Vec<&str> = messages.iter().map(|m| m["created_at"].as_str().unwrap()).collect();
    let parsed: Vec<chrono::DateTime<chrono::Utc>> =
        stamps.iter().map(|s| s.parse().unwrap()).collect();
    assert!(parsed.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_reports_are_not_deduplicated() {
    let app = app().await;
    let owner = app.register("9000000001", "411001").await;
    let reporter = app.register("9000000002", "411001").await;
    let tool = app.add_tool(&owner, "Suspicious plow").await;
    let uri = format!("/tool/{tool}/report/");

    for _ in 0..2 {
        let (status, body) = app
            .post(
                &uri,
                Some(&reporter.token),
                json!({ "reason": "Misleading photo", "description": "Not the pictured tool" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["reporter_id"], reporter.id.as_str());
    }
    let reports = app.state.db.reports().list_for_listing(&tool).await.unwrap();
    assert_eq!(reports.len(), 2);

    let (status, body) = app.post(&uri, Some(&reporter.token), json!({ "reason": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "reason");

    let missing = uuid::Uuid::new_v4();
    let (status, _) = app
        .post(
            &format!("/tool/{missing}/report/"),
            Some(&reporter.token),
            json!({ "reason": "Spam" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Pages
// =============================================================================

#[tokio::test]
async fn test_static_pages_and_health() {
    let app = app().await;

    let (status, body) = app.get("/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = app.get("/about/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], "about");

    let (status, _) = app.get("/contact/", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get("/tool/not-a-uuid/", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "id");
}
