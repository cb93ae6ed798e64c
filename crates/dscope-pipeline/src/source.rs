use async_trait::async_trait;
use dscope_x::{SubjectSnapshot, XApiError, XClient};

/// Where subject metadata and posts come from.
#[async_trait]
pub trait SubjectSource: Send + Sync {
    /// # Errors
    ///
    /// Returns [`XApiError`] when the platform lookup or timeline fetch fails.
    async fn fetch_subject(&self, handle: &str) -> Result<SubjectSnapshot, XApiError>;
}

#[async_trait]
impl SubjectSource for XClient {
    async fn fetch_subject(&self, handle: &str) -> Result<SubjectSnapshot, XApiError> {
        self.fetch_profile(handle).await
    }
}
