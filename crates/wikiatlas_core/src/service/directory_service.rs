//! Community and profile use-cases.
//!
//! # Invariants
//! - Community drafts are normalized before they are sent.
//! - Profile updates are only sent for the caller's own profile.

use crate::gateway::{DirectoryGateway, GatewayError};
use crate::model::community::{Community, CommunityDraft, CommunityValidationError};
use crate::model::identity::Identity;
use crate::model::profile::{Profile, ProfileUpdate};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum DirectoryServiceError {
    InvalidCommunity(CommunityValidationError),
    /// Caller tried to edit another user's profile; nothing was sent.
    NotProfileOwner { caller: String, target: String },
    /// Update carries no fields; nothing was sent.
    EmptyProfileUpdate,
    Gateway(GatewayError),
}

impl Display for DirectoryServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCommunity(err) => write!(f, "{err}"),
            Self::NotProfileOwner { caller, target } => {
                write!(f, "user `{caller}` cannot edit profile `{target}`")
            }
            Self::EmptyProfileUpdate => write!(f, "profile update has no fields"),
            Self::Gateway(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DirectoryServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidCommunity(err) => Some(err),
            Self::Gateway(err) => Some(err),
            Self::NotProfileOwner { .. } | Self::EmptyProfileUpdate => None,
        }
    }
}

impl From<CommunityValidationError> for DirectoryServiceError {
    fn from(value: CommunityValidationError) -> Self {
        Self::InvalidCommunity(value)
    }
}

impl From<GatewayError> for DirectoryServiceError {
    fn from(value: GatewayError) -> Self {
        Self::Gateway(value)
    }
}

pub struct DirectoryService<G: DirectoryGateway> {
    gateway: G,
}

impl<G: DirectoryGateway> DirectoryService<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// All communities; empty when the backend fails.
    pub async fn list_communities(&self) -> Vec<Community> {
        self.gateway.list_communities().await.unwrap_or_else(|err| {
            warn!("event=list_communities module=service status=degraded error={err}");
            Vec::new()
        })
    }

    pub async fn create_community(
        &self,
        draft: &CommunityDraft,
    ) -> Result<Community, DirectoryServiceError> {
        let draft = draft.normalized()?;
        let community = self.gateway.create_community(&draft).await?;
        info!(
            "event=create_community module=service status=ok slug={}",
            community.slug
        );
        Ok(community)
    }

    /// Profile for `user_id`; an anonymous placeholder when it cannot be loaded.
    pub async fn get_profile(&self, user_id: &str) -> Profile {
        self.gateway.get_profile(user_id).await.unwrap_or_else(|err| {
            warn!("event=get_profile module=service status=degraded error={err}");
            Profile::anonymous(user_id)
        })
    }

    pub async fn update_profile(
        &self,
        identity: &Identity,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<(), DirectoryServiceError> {
        if identity.id != user_id {
            return Err(DirectoryServiceError::NotProfileOwner {
                caller: identity.id.clone(),
                target: user_id.to_string(),
            });
        }
        if update.is_empty() {
            return Err(DirectoryServiceError::EmptyProfileUpdate);
        }
        self.gateway.update_profile(user_id, update).await?;
        Ok(())
    }
}
