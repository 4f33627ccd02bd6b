//! Avatar rendition scheduling.
//!
//! Resizing happens in a separate image worker; this service only decides
//! which renditions an image needs and queues them.

use sqlx::PgPool;
use tracing::{debug, info};

use greenleaf_core::{RenditionKey, UserId};

use super::AccountError;
use crate::db::thumbnails::{EnqueueThumbnail, ThumbnailJob};
use crate::db::{ThumbnailJobRepository, UserRepository};
use crate::models::User;

/// Size set used for user avatars.
pub const USER_AVATARS: &str = "user_avatars";

/// Image attribute holding a user's avatar.
pub const AVATAR_ATTR: &str = "avatar";

/// Named rendition key sets: `(set, [(rendition name, rendition key)])`.
pub const RENDITION_KEY_SETS: &[(&str, &[(&str, &str)])] =
    &[(USER_AVATARS, &[("default", "thumbnail__445x445")])];

/// Look up and parse a rendition key set.
///
/// # Errors
///
/// Returns `AccountError::UnknownSizeSet` for an unknown set name and
/// `AccountError::InvalidRenditionKey` if a configured key does not parse.
pub fn rendition_key_set(
    size_set: &str,
) -> Result<Vec<(&'static str, RenditionKey)>, AccountError> {
    let (_, renditions) = RENDITION_KEY_SETS
        .iter()
        .find(|(name, _)| *name == size_set)
        .ok_or_else(|| AccountError::UnknownSizeSet(size_set.to_owned()))?;

    renditions
        .iter()
        .map(|(name, key)| Ok::<_, AccountError>((*name, key.parse::<RenditionKey>()?)))
        .collect()
}

fn image_of<'u>(user: &'u User, image_attr: &str) -> Result<Option<&'u str>, AccountError> {
    match image_attr {
        AVATAR_ATTR => Ok(user.avatar.as_deref()),
        other => Err(AccountError::UnknownImageAttr(other.to_owned())),
    }
}

/// Queues renditions for user images.
pub struct ThumbnailService<'a> {
    users: UserRepository<'a>,
    jobs: ThumbnailJobRepository<'a>,
}

impl<'a> ThumbnailService<'a> {
    /// Create a new thumbnail service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
            jobs: ThumbnailJobRepository::new(pool),
        }
    }

    /// Queue every rendition of `size_set` for the image stored in the
    /// user's `image_attr` field.
    ///
    /// A user with no image on that field gets no jobs.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::UnknownSizeSet` or `AccountError::UnknownImageAttr`
    /// for bad arguments, `AccountError::UserNotFound` if the user does not
    /// exist, and `AccountError::Repository` if queueing fails.
    pub async fn create_thumbnails(
        &self,
        user_id: UserId,
        size_set: &str,
        image_attr: &str,
    ) -> Result<Vec<ThumbnailJob>, AccountError> {
        let renditions = rendition_key_set(size_set)?;

        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(AccountError::UserNotFound)?;

        let Some(source_path) = image_of(&user, image_attr)? else {
            debug!(%user_id, image_attr, "no image to thumbnail");
            return Ok(Vec::new());
        };

        let mut jobs = Vec::with_capacity(renditions.len());
        for (rendition, key) in renditions {
            let rendition_key = key.to_string();
            let job = self
                .jobs
                .enqueue(EnqueueThumbnail {
                    user_id,
                    image_attr,
                    source_path,
                    size_set,
                    rendition,
                    rendition_key: &rendition_key,
                })
                .await?;
            jobs.push(job);
        }

        info!(%user_id, size_set, count = jobs.len(), "thumbnails queued");
        Ok(jobs)
    }
}
