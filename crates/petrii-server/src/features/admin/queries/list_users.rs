use std::sync::Arc;

use crate::{
    error::AppError,
    models::PublicProfile,
    store::{CredentialStore, StoreError},
};

#[derive(Debug, thiserror::Error)]
pub enum ListUsersError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ListUsersError> for AppError {
    fn from(err: ListUsersError) -> Self {
        match err {
            ListUsersError::Store(e) => e.into(),
        }
    }
}

/// Every non-admin account, newest first
#[tracing::instrument(skip(users))]
pub async fn handle(users: Arc<dyn CredentialStore>) -> Result<Vec<PublicProfile>, ListUsersError> {
    let accounts = users.list_non_admin().await?;
    Ok(accounts.iter().map(PublicProfile::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{features::shared::test_helpers::TestContext, models::UserStatus};

    #[tokio::test]
    async fn test_admins_are_not_listed() {
        let ctx = TestContext::new().await;
        ctx.admin("root@x.com").await;
        ctx.user("ann@x.com", UserStatus::Pending).await;
        ctx.user("bob@x.com", UserStatus::Approved).await;

        let listed = handle(ctx.state.users.clone()).await.unwrap();
        let emails: Vec<&str> = listed.iter().map(|p| p.email.as_str()).collect();
        assert_eq!(emails, ["bob@x.com", "ann@x.com"]);
    }
}
