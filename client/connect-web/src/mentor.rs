//! Mentor matching panel
//!
//! A post's author asks for candidate mentors, picks one, and can look up the
//! resulting link. Mentors toggle their own availability. Every action is one
//! request followed by a re-fetch.

use connect_common::models::{
    AvailabilityResponse, ChooseMentorRequest, MenteeEnvelope, MenteeLink, MentorCandidate,
    MentorsEnvelope,
};
use connect_common::{ApiClient, ApiError, Empty, Result};
use parking_lot::RwLock;
use reqwest::Method;
use std::sync::Arc;
use tracing::{debug, info};

use crate::notify::NotificationCenter;
use crate::sequence::{RequestSequencer, Resource};
use crate::session::SessionStore;

#[derive(Debug, Default)]
struct Candidates {
    post_id: Option<String>,
    mentors: Vec<MentorCandidate>,
}

pub struct MentorPanel {
    api: ApiClient,
    notifier: Arc<NotificationCenter>,
    sequencer: Arc<RequestSequencer>,
    session: Arc<SessionStore>,
    candidates: RwLock<Candidates>,
    mentee: RwLock<Option<MenteeLink>>,
}

impl MentorPanel {
    pub fn new(
        api: ApiClient,
        notifier: Arc<NotificationCenter>,
        sequencer: Arc<RequestSequencer>,
        session: Arc<SessionStore>,
    ) -> Self {
        Self {
            api,
            notifier,
            sequencer,
            session,
            candidates: RwLock::new(Candidates::default()),
            mentee: RwLock::new(None),
        }
    }

    /// Candidates for the loaded post, in the order the server ranked them.
    pub fn candidates(&self) -> Vec<MentorCandidate> {
        self.candidates.read().mentors.clone()
    }

    pub fn candidates_post_id(&self) -> Option<String> {
        self.candidates.read().post_id.clone()
    }

    pub fn mentee(&self) -> Option<MenteeLink> {
        self.mentee.read().clone()
    }

    pub async fn load_candidates(&self, post_id: &str) -> Result<Vec<MentorCandidate>> {
        let ticket = self.sequencer.begin(Resource::Mentors);
        let path = format!("/mentor/{}/", post_id);
        match self.api.get::<MentorsEnvelope>(&path, true).await {
            Ok(envelope) => {
                if self.sequencer.is_latest(ticket) {
                    *self.candidates.write() = Candidates {
                        post_id: Some(post_id.to_string()),
                        mentors: envelope.mentors.clone(),
                    };
                } else {
                    debug!(post_id, seq = ticket.seq(), "discarding stale mentor list");
                }
                Ok(envelope.mentors)
            }
            Err(e) => {
                self.notifier
                    .failed("list_mentors", "Error while getting mentors", &e);
                Err(e)
            }
        }
    }

    /// Chooses `mentor_id`. Choosing again replaces the previous mentor.
    pub async fn choose(&self, mentor_id: &str) -> Result<()> {
        let request = ChooseMentorRequest {
            mentor_id: mentor_id.to_string(),
        };
        if let Err(e) = self
            .api
            .post::<_, Empty>("/mentor/choose/", &request, true)
            .await
        {
            self.notifier.api_error("choose_mentor", &e);
            return Err(e);
        }

        info!(mentor_id, "mentor chosen");
        self.notifier.success("Successfully chose a mentor.");
        let _ = self.load_mentee().await;
        Ok(())
    }

    /// Flips the signed-in mentor's availability and returns the new value.
    pub async fn toggle_availability(&self) -> Result<bool> {
        let is_mentor = self
            .session
            .current_user()
            .is_some_and(|user| user.is_mentor);
        if !is_mentor {
            let err = ApiError::Unauthorized("Only mentors can change availability.".into());
            self.notifier.api_error("toggle_availability", &err);
            return Err(err);
        }

        let response = self
            .api
            .perform::<(), AvailabilityResponse>(Method::POST, "/mentor/toggle/", None, true)
            .await;
        match response {
            Ok(availability) => {
                info!(is_available = availability.is_available, "availability toggled");
                self.notifier.success(if availability.is_available {
                    "You are now available as a mentor."
                } else {
                    "You are no longer available as a mentor."
                });
                let _ = self.session.refresh_user().await;
                Ok(availability.is_available)
            }
            Err(e) => {
                self.notifier.api_error("toggle_availability", &e);
                Err(e)
            }
        }
    }

    /// Fetches the signed-in user's mentee record and the mentor linked to it.
    pub async fn load_mentee(&self) -> Result<Option<MenteeLink>> {
        let ticket = self.sequencer.begin(Resource::Mentee);
        match self.api.get::<MenteeEnvelope>("/mentee/get/", true).await {
            Ok(envelope) => {
                if self.sequencer.is_latest(ticket) {
                    *self.mentee.write() = envelope.mentee.clone();
                } else {
                    debug!(seq = ticket.seq(), "discarding stale mentee link");
                }
                Ok(envelope.mentee)
            }
            Err(e) => {
                self.notifier.api_error("get_mentee", &e);
                Err(e)
            }
        }
    }
}
