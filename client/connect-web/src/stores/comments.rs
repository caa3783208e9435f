use connect_common::models::{Comment, CommentsEnvelope, CreateCommentRequest};
use connect_common::{ApiClient, Empty, Result};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

use crate::notify::NotificationCenter;
use crate::sequence::{RequestSequencer, Resource};

#[derive(Debug, Default)]
struct Thread {
    post_id: Option<String>,
    comments: Vec<Comment>,
}

/// Comment thread of the post open in the detail panel.
pub struct CommentStore {
    api: ApiClient,
    notifier: Arc<NotificationCenter>,
    sequencer: Arc<RequestSequencer>,
    thread: RwLock<Thread>,
}

impl CommentStore {
    pub fn new(
        api: ApiClient,
        notifier: Arc<NotificationCenter>,
        sequencer: Arc<RequestSequencer>,
    ) -> Self {
        Self {
            api,
            notifier,
            sequencer,
            thread: RwLock::new(Thread::default()),
        }
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.thread.read().comments.clone()
    }

    pub fn post_id(&self) -> Option<String> {
        self.thread.read().post_id.clone()
    }

    pub fn clear(&self) {
        self.sequencer.invalidate(Resource::Comments);
        *self.thread.write() = Thread::default();
    }

    /// Fetches the thread for `post_id`, replacing whatever was loaded.
    pub async fn load(&self, post_id: &str) -> Result<Vec<Comment>> {
        let ticket = self.sequencer.begin(Resource::Comments);
        let path = format!("/post/{}/comment/", post_id);
        match self.api.get::<CommentsEnvelope>(&path, false).await {
            Ok(envelope) => {
                if self.sequencer.is_latest(ticket) {
                    *self.thread.write() = Thread {
                        post_id: Some(post_id.to_string()),
                        comments: envelope.comments.clone(),
                    };
                } else {
                    debug!(post_id, seq = ticket.seq(), "discarding stale comments");
                }
                Ok(envelope.comments)
            }
            Err(e) => {
                self.notifier
                    .failed("list_comments", "Error while getting comments", &e);
                Err(e)
            }
        }
    }

    pub async fn create(&self, post_id: &str, message: &str) -> Result<()> {
        let request = CreateCommentRequest {
            message: message.to_string(),
        };
        let result = async {
            request.validate()?;
            let path = format!("/post/{}/comment/add/", post_id);
            self.api.post::<_, Empty>(&path, &request, true).await
        }
        .await;

        if let Err(e) = result {
            self.notifier.api_error("create_comment", &e);
            return Err(e);
        }

        info!(post_id, "comment created");
        self.notifier.success("Successfully created comment.");
        // Another post may have been opened while the request was in flight.
        if self.post_id().as_deref() == Some(post_id) {
            let _ = self.load(post_id).await;
        }
        Ok(())
    }

    /// Deletes one of the user's own comments and reloads the open thread.
    pub async fn delete(&self, comment_id: &str) -> Result<()> {
        let path = format!("/comment/{}/delete/", comment_id);
        if let Err(e) = self.api.delete(&path, true).await {
            self.notifier.api_error("delete_comment", &e);
            return Err(e);
        }

        info!(comment_id, "comment deleted");
        self.notifier.success("Successfully deleted comment.");
        if let Some(post_id) = self.post_id() {
            let _ = self.load(&post_id).await;
        }
        Ok(())
    }
}
