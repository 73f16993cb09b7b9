//! Stand-in backend used when no endpoint is configured

use async_trait::async_trait;

use super::{GatewayError, NewPostRow, PostGateway, PostRow, Session, SessionProvider};

/// Backend that holds no posts and accepts no sign-ins
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

#[async_trait]
impl PostGateway for Offline {
    async fn list_posts(&self, _: &str, _: bool) -> Result<Vec<PostRow>, GatewayError> {
        Ok(Vec::new())
    }

    async fn get_post_by_exact_match(
        &self,
        _: &str,
        _: &str,
    ) -> Result<Option<PostRow>, GatewayError> {
        Ok(None)
    }

    async fn create_post(&self, _: &Session, _: &NewPostRow) -> Result<Vec<PostRow>, GatewayError> {
        Err(GatewayError::NotConfigured)
    }

    async fn create_signed_url(&self, _: &str, _: u64) -> Result<String, GatewayError> {
        Err(GatewayError::NotConfigured)
    }

    async fn upload_object(
        &self,
        _: &Session,
        _: &str,
        _: &str,
        _: Vec<u8>,
        _: Option<&str>,
    ) -> Result<String, GatewayError> {
        Err(GatewayError::NotConfigured)
    }
}

#[async_trait]
impl SessionProvider for Offline {
    async fn current_session(&self) -> Result<Option<Session>, GatewayError> {
        Ok(None)
    }

    async fn create_session(&self, _: &str, _: &str) -> Result<Session, GatewayError> {
        Err(GatewayError::NotConfigured)
    }

    async fn destroy_session(&self, _: &Session) -> Result<(), GatewayError> {
        Ok(())
    }
}
