//! In-memory backend doubles shared by the unit tests

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::gateway::{GatewayError, NewPostRow, PostGateway, PostRow, Session, SessionProvider};

pub const USER_ID: &str = "6f1c2a9e-1111-4b2c-9d3e-000000000001";

/// A posts-table row with the columns most tests care about
pub fn row(id: &str, created_at: &str, title: &str) -> PostRow {
    PostRow {
        id: Some(id.to_string()),
        title: Some(title.to_string()),
        content: Some(format!("Body of {}", title)),
        created_at: Some(created_at.to_string()).filter(|c| !c.is_empty()),
        ..Default::default()
    }
}

pub fn session() -> Session {
    Session {
        user_id: USER_ID.to_string(),
        email: Some("admin@example.com".to_string()),
        access_token: "token".to_string(),
    }
}

fn unavailable() -> GatewayError {
    GatewayError::Status {
        status: 503,
        message: "service unavailable".to_string(),
    }
}

/// Posts gateway that records every call
#[derive(Default)]
pub struct FakeGateway {
    rows: Mutex<Vec<PostRow>>,
    calls: Mutex<Vec<&'static str>>,
    fail_reads: AtomicBool,
    fail_upload: AtomicBool,
    fail_create: AtomicBool,
    create_returns_nothing: AtomicBool,
    failing_keys: Mutex<HashSet<String>>,
    pub created: Mutex<Vec<NewPostRow>>,
    pub uploads: Mutex<Vec<(String, String, usize, Option<String>)>>,
    /// Notified when `create_post` starts
    pub create_started: Notify,
    /// When set, the next `create_post` waits for a notification before returning
    hold_create: Mutex<Option<Arc<Notify>>>,
}

impl FakeGateway {
    pub fn with_rows(rows: Vec<PostRow>) -> Self {
        let gateway = Self::default();
        gateway.set_rows(rows);
        gateway
    }

    pub fn set_rows(&self, rows: Vec<PostRow>) {
        *self.rows.lock().unwrap() = rows;
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub fn fail_upload(&self) {
        self.fail_upload.store(true, Ordering::SeqCst);
    }

    pub fn fail_create(&self) {
        self.fail_create.store(true, Ordering::SeqCst);
    }

    pub fn create_returns_nothing(&self) {
        self.create_returns_nothing.store(true, Ordering::SeqCst);
    }

    pub fn fail_signing(&self, key: &str) {
        self.failing_keys.lock().unwrap().insert(key.to_string());
    }

    /// Make `create_post` block until the returned handle is notified
    pub fn hold_create(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.hold_create.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Number of calls made to one operation
    pub fn count(&self, op: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == op).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, op: &'static str) {
        self.calls.lock().unwrap().push(op);
    }
}

#[async_trait]
impl PostGateway for FakeGateway {
    async fn list_posts(
        &self,
        _order_by: &str,
        _descending: bool,
    ) -> Result<Vec<PostRow>, GatewayError> {
        self.record("list");
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn get_post_by_exact_match(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Option<PostRow>, GatewayError> {
        self.record("get");
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        assert_eq!(field, "id");
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id.as_deref() == Some(value))
            .cloned())
    }

    async fn create_post(
        &self,
        session: &Session,
        row: &NewPostRow,
    ) -> Result<Vec<PostRow>, GatewayError> {
        self.record("create");
        self.create_started.notify_one();

        let gate = self.hold_create.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.fail_create.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.created.lock().unwrap().push(row.clone());
        if self.create_returns_nothing.load(Ordering::SeqCst) {
            return Ok(Vec::new());
        }

        Ok(vec![PostRow {
            id: Some("9b2f6a3c-0d4e-4f5a-8b6c-7d8e9f0a1b2c".to_string()),
            title: Some(row.title.clone()),
            content: Some(row.content.clone()),
            image_url: row.image_url.clone(),
            user_id: Some(session.user_id.clone()),
            created_at: Some(row.created_at.clone()),
            ..Default::default()
        }])
    }

    async fn create_signed_url(
        &self,
        storage_key: &str,
        ttl_seconds: u64,
    ) -> Result<String, GatewayError> {
        self.record("sign");
        if self.failing_keys.lock().unwrap().contains(storage_key) {
            return Err(unavailable());
        }
        Ok(format!(
            "https://signed.example/{}?ttl={}",
            storage_key, ttl_seconds
        ))
    }

    async fn upload_object(
        &self,
        _session: &Session,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String, GatewayError> {
        self.record("upload");
        if self.fail_upload.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.uploads.lock().unwrap().push((
            bucket.to_string(),
            key.to_string(),
            bytes.len(),
            content_type.map(str::to_string),
        ));
        Ok(key.to_string())
    }
}

/// Session provider with a single accepted password
#[derive(Default)]
pub struct FakeSessions {
    current: Mutex<Option<Session>>,
    fail_current: AtomicBool,
    fail_destroy: AtomicBool,
    calls: Mutex<Vec<&'static str>>,
}

pub const PASSWORD: &str = "correct horse";

impl FakeSessions {
    pub fn signed_in() -> Self {
        let sessions = Self::default();
        *sessions.current.lock().unwrap() = Some(session());
        sessions
    }

    pub fn fail_current(&self) {
        self.fail_current.store(true, Ordering::SeqCst);
    }

    pub fn fail_destroy(&self) {
        self.fail_destroy.store(true, Ordering::SeqCst);
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == op).count()
    }

    fn record(&self, op: &'static str) {
        self.calls.lock().unwrap().push(op);
    }
}

#[async_trait]
impl SessionProvider for FakeSessions {
    async fn current_session(&self) -> Result<Option<Session>, GatewayError> {
        self.record("current");
        if self.fail_current.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self.current.lock().unwrap().clone())
    }

    async fn create_session(&self, email: &str, password: &str) -> Result<Session, GatewayError> {
        self.record("create");
        if password != PASSWORD {
            return Err(GatewayError::Status {
                status: 400,
                message: "Invalid login credentials".to_string(),
            });
        }
        let session = Session {
            email: Some(email.to_string()),
            ..session()
        };
        *self.current.lock().unwrap() = Some(session.clone());
        Ok(session)
    }

    async fn destroy_session(&self, _session: &Session) -> Result<(), GatewayError> {
        self.record("destroy");
        *self.current.lock().unwrap() = None;
        if self.fail_destroy.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }
}
