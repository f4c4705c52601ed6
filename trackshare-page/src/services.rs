//! Collaborator interfaces the profile page talks to.
//!
//! The page controller never calls these itself; it emits [`Effect`]s and the
//! [`PageDriver`] runs them against whatever implementations it was given.
//! [`ApiClient`] implements all three over HTTP.
//!
//! [`Effect`]: crate::page::Effect
//! [`PageDriver`]: crate::driver::PageDriver

use async_trait::async_trait;
use trackshare_types::{ContentItem, OwnerLookup, PostId, ProfileInfo, UserId};

use crate::api::{ApiClient, ApiResult};

#[async_trait]
pub trait SessionService: Send + Sync {
    /// Load the full profile of the signed-in viewer
    async fn load_viewer_profile(&self, viewer_id: UserId) -> ApiResult<ProfileInfo>;
}

#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Map a profile name to its owner; a missing user is `Ok(OwnerLookup::NotFound)`
    async fn resolve_owner_by_name(&self, name: &str) -> ApiResult<OwnerLookup>;
}

#[async_trait]
pub trait ContentService: Send + Sync {
    async fn load_initial_content(&self, owner_id: UserId) -> ApiResult<Vec<ContentItem>>;

    /// Produce the list that includes `new_item_id`, starting from `current`
    async fn resolve_updated_content(
        &self,
        new_item_id: PostId,
        current: Vec<ContentItem>,
    ) -> ApiResult<Vec<ContentItem>>;
}

#[async_trait]
impl SessionService for ApiClient {
    async fn load_viewer_profile(&self, viewer_id: UserId) -> ApiResult<ProfileInfo> {
        self.get_user(viewer_id).await
    }
}

#[async_trait]
impl IdentityService for ApiClient {
    async fn resolve_owner_by_name(&self, name: &str) -> ApiResult<OwnerLookup> {
        self.get_user_id_by_username(name).await
    }
}

#[async_trait]
impl ContentService for ApiClient {
    async fn load_initial_content(&self, owner_id: UserId) -> ApiResult<Vec<ContentItem>> {
        self.get_user_posts(owner_id).await
    }

    async fn resolve_updated_content(
        &self,
        new_item_id: PostId,
        current: Vec<ContentItem>,
    ) -> ApiResult<Vec<ContentItem>> {
        self.get_updated_posts(new_item_id, current).await
    }
}
