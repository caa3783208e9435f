use connect_common::models::{CreatePostRequest, Post, PostEnvelope, PostsEnvelope};
use connect_common::{ApiClient, Empty, Result};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

use crate::notify::NotificationCenter;
use crate::sequence::{RequestSequencer, Resource};

/// Published posts, plus the one open in the detail panel.
pub struct PostStore {
    api: ApiClient,
    notifier: Arc<NotificationCenter>,
    sequencer: Arc<RequestSequencer>,
    posts: RwLock<Vec<Post>>,
    current: RwLock<Option<Post>>,
}

impl PostStore {
    pub fn new(
        api: ApiClient,
        notifier: Arc<NotificationCenter>,
        sequencer: Arc<RequestSequencer>,
    ) -> Self {
        Self {
            api,
            notifier,
            sequencer,
            posts: RwLock::new(Vec::new()),
            current: RwLock::new(None),
        }
    }

    pub fn posts(&self) -> Vec<Post> {
        self.posts.read().clone()
    }

    pub fn current(&self) -> Option<Post> {
        self.current.read().clone()
    }

    /// Closes the detail panel.
    pub fn close(&self) {
        self.sequencer.invalidate(Resource::PostDetail);
        *self.current.write() = None;
    }

    /// Re-fetches every published post. A response overtaken by a newer
    /// request is returned to the caller but not stored.
    pub async fn refresh(&self) -> Result<Vec<Post>> {
        let ticket = self.sequencer.begin(Resource::PostList);
        match self.api.get::<PostsEnvelope>("/post/", false).await {
            Ok(envelope) => {
                if self.sequencer.is_latest(ticket) {
                    debug!(count = envelope.posts.len(), "post list refreshed");
                    *self.posts.write() = envelope.posts.clone();
                } else {
                    debug!(seq = ticket.seq(), "discarding stale post list");
                }
                Ok(envelope.posts)
            }
            Err(e) => {
                self.notifier
                    .failed("list_posts", "Error while getting posts", &e);
                Err(e)
            }
        }
    }

    /// Loads one post into the detail panel.
    pub async fn open(&self, post_id: &str) -> Result<Post> {
        let ticket = self.sequencer.begin(Resource::PostDetail);
        let path = format!("/post/{}/", post_id);
        match self.api.get::<PostEnvelope>(&path, false).await {
            Ok(envelope) => {
                if self.sequencer.is_latest(ticket) {
                    *self.current.write() = Some(envelope.post.clone());
                } else {
                    debug!(post_id, seq = ticket.seq(), "discarding stale post detail");
                }
                Ok(envelope.post)
            }
            Err(e) => {
                self.notifier.failed("get_post", "Error while getting post", &e);
                Err(e)
            }
        }
    }

    /// Publishes a post, then re-fetches the list. The message is checked
    /// before anything is sent.
    pub async fn create(&self, request: &CreatePostRequest) -> Result<()> {
        let result = async {
            request.validate()?;
            self.api
                .post::<_, Empty>("/post/add/", request, true)
                .await
        }
        .await;

        if let Err(e) = result {
            self.notifier.failed(
                "create_post",
                "Error while creating post. Please try again.",
                &e,
            );
            return Err(e);
        }

        info!(
            source = %request.source_country,
            destination = %request.destination_country,
            "post created"
        );
        self.notifier.success("Successfully created post.");
        // The list refresh reports its own failure.
        let _ = self.refresh().await;
        Ok(())
    }

    /// Deletes one of the user's own posts. The server enforces authorship.
    pub async fn delete(&self, post_id: &str) -> Result<()> {
        let path = format!("/post/{}/delete/", post_id);
        if let Err(e) = self.api.delete(&path, true).await {
            self.notifier.api_error("delete_post", &e);
            return Err(e);
        }

        info!(post_id, "post deleted");
        self.notifier.success("Successfully deleted post.");
        let is_open = self
            .current
            .read()
            .as_ref()
            .is_some_and(|post| post.id == post_id);
        if is_open {
            self.close();
        }
        let _ = self.refresh().await;
        Ok(())
    }
}
