//! Integration tests for the Delicious Dry Fruits storefront.
//!
//! Each test builds the full router in-process over a fresh temporary data
//! file and drives it with `tower::ServiceExt::oneshot`. The payment gateway
//! is replaced by [`StubGateway`], so no network access is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ddf-integration-tests
//! ```

// Test support code: failures should panic with context.
#![allow(clippy::unwrap_used, clippy::missing_panics_doc, clippy::expect_used)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use cookie::Cookie;
use secrecy::SecretString;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use ddf_core::{Product, Role};
use ddf_storefront::config::{AuthConfig, RazorpayConfig, StorefrontConfig};
use ddf_storefront::db::products::{NewProduct, ProductRepository};
use ddf_storefront::services::auth::cookie::AUTH_COOKIE;
use ddf_storefront::services::auth::{AuthService, Registration};
use ddf_storefront::services::payment::{GatewayOrder, PaymentError, PaymentGateway, sign_payment};
use ddf_storefront::state::AppState;

/// Gateway secret used to sign test payments.
pub const KEY_SECRET: &str = "rzp_test_secret_9f2Kq7LmX4vB8nT1";

const TOKEN_SECRET: &str = "8c1f4e7a9b2d6f3e0a5c8b1d4f7e2a9c6b3d0f5e8a1c4b7d";

/// Payment gateway that hands out sequential order ids and records amounts.
#[derive(Debug, Default)]
pub struct StubGateway {
    next: AtomicU32,
    amounts: Mutex<Vec<u64>>,
}

impl StubGateway {
    /// Amounts (in paise) of every gateway order opened so far.
    pub fn amounts(&self) -> Vec<u64> {
        self.amounts.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_order(&self, amount_paise: u64, _receipt: &str) -> Result<GatewayOrder, PaymentError> {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        self.amounts.lock().unwrap().push(amount_paise);
        Ok(GatewayOrder {
            id: format!("order_test_{n}"),
            amount: amount_paise,
            currency: "INR".to_string(),
        })
    }
}

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// The `error` message of an error body.
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }

    /// The session token from the `Set-Cookie` header.
    pub fn session_token(&self) -> Option<String> {
        let raw = self.headers.get(header::SET_COOKIE)?.to_str().ok()?;
        let cookie = Cookie::parse(raw).ok()?;
        (cookie.name() == AUTH_COOKIE && !cookie.value().is_empty())
            .then(|| cookie.value().to_string())
    }
}

/// The application under test.
pub struct TestApp {
    pub state: AppState,
    pub gateway: Arc<StubGateway>,
    router: Router,
    dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let gateway = Arc::new(StubGateway::default());
        let state = AppState::with_gateway(Self::config(&dir), gateway.clone());
        let router = ddf_storefront::app(state.clone());
        Self {
            state,
            gateway,
            router,
            dir,
        }
    }

    fn config(dir: &TempDir) -> StorefrontConfig {
        StorefrontConfig {
            data_file: dir.path().join("data").join("db.json"),
            public_dir: dir.path().join("public"),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            auth: AuthConfig {
                token_secret: SecretString::from(TOKEN_SECRET.to_string()),
                token_ttl_days: 7,
                secure_cookies: false,
            },
            razorpay: RazorpayConfig {
                key_id: "rzp_test_key".to_string(),
                key_secret: SecretString::from(KEY_SECRET.to_string()),
                api_base: "http://127.0.0.1:9".to_string(),
            },
            rate_limit: false,
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Root of the temporary directory backing this app.
    pub fn root(&self) -> &std::path::Path {
        self.dir.path()
    }

    /// Send a raw request.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Send a request with an optional JSON body and bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).unwrap()).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Register a customer and return their session token.
    pub async fn customer(&self, email: &str) -> String {
        let response = self
            .post(
                "/api/auth/register",
                None,
                json!({"email": email, "password": "almond-milk", "name": "Test Customer"}),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.session_token().expect("session cookie")
    }

    /// Create an admin account directly and log in as it.
    pub async fn admin(&self) -> String {
        AuthService::new(self.state.store())
            .create_account(
                Registration {
                    email: "admin@ddf.test".to_string(),
                    password: "pistachio-9".to_string(),
                    name: "Store Admin".to_string(),
                    phone: None,
                },
                Role::Admin,
            )
            .await
            .unwrap();

        let response = self
            .post(
                "/api/auth/login",
                None,
                json!({"email": "admin@ddf.test", "password": "pistachio-9"}),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.session_token().expect("session cookie")
    }

    /// Seed a product with a single variant.
    pub async fn product(&self, slug: &str, category: &str, price: i64, stock: i64) -> Product {
        let input: NewProduct = serde_json::from_value(json!({
            "name": slug.replace('-', " "),
            "slug": slug,
            "description": format!("Premium {slug}"),
            "categoryId": category,
            "variants": [{"weight": "500g", "price": price, "stock": stock}],
        }))
        .unwrap();
        ProductRepository::new(self.state.store())
            .create(input)
            .await
            .unwrap()
    }

    /// Signature the gateway would send for this payment.
    pub fn signature(order_id: &str, payment_id: &str) -> String {
        sign_payment(&SecretString::from(KEY_SECRET.to_string()), order_id, payment_id)
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// A complete shipping address.
pub fn address() -> Value {
    json!({
        "street": "14 Linking Road",
        "city": "Mumbai",
        "state": "Maharashtra",
        "pincode": "400050",
        "phone": "9820012345"
    })
}
