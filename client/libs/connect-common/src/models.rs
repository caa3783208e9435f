//! Request/response schemas for the remote API
//!
//! One struct per payload. Forms the user fills in derive `Validate` and are
//! checked before anything is sent.

use chrono::{DateTime, Utc};
use pin_placement::{Country, CountryCode, GeoError, GeoPoint};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;
use validator::Validate;

pub const POST_MESSAGE_MAX: u64 = 1000;
pub const COMMENT_MESSAGE_MAX: u64 = 500;

/// The API hands out ids as strings or integers depending on the table.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Mentor,
    Mentee,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_mentor: bool,
    #[serde(default)]
    pub profile_photo_url: String,
    #[serde(default)]
    pub has_posted: bool,
    /// Only meaningful for mentors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
}

impl User {
    pub fn role(&self) -> Role {
        if self.is_mentor {
            Role::Mentor
        } else {
            Role::Mentee
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserEnvelope {
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Registration form as filled in by the user.
#[derive(Debug, Clone, Validate)]
pub struct RegisterForm {
    #[validate(length(min = 1, max = 150, message = "Username is required"))]
    pub username: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Your passwords do not match"))]
    pub confirm_password: String,
    pub is_mentor: bool,
    #[validate(url(message = "Pick a profile picture"))]
    pub profile_photo_url: String,
}

impl RegisterForm {
    /// Validates and drops the confirmation field.
    pub fn into_request(self) -> Result<RegisterRequest, validator::ValidationErrors> {
        self.validate()?;
        Ok(RegisterRequest {
            username: self.username,
            email: self.email,
            password: self.password,
            is_mentor: self.is_mentor,
            profile_photo_url: self.profile_photo_url,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub is_mentor: bool,
    pub profile_photo_url: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

// ============================================================================
// Posts
// ============================================================================

/// One end of a post's route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteEnd {
    pub point: GeoPoint,
    pub country: Country,
}

/// Flat wire form of a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRecord {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub message: String,
    pub source_latitude: f64,
    pub source_longitude: f64,
    pub source_country: String,
    pub source_country_code: String,
    pub destination_latitude: f64,
    pub destination_longitude: f64,
    pub destination_country: String,
    pub destination_country_code: String,
    pub created_at: DateTime<Utc>,
    pub user: User,
    #[serde(default)]
    pub comment_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PostRecord", into = "PostRecord")]
pub struct Post {
    pub id: String,
    pub message: String,
    pub source: RouteEnd,
    pub destination: RouteEnd,
    pub created_at: DateTime<Utc>,
    pub author: User,
    pub comment_count: u32,
}

impl TryFrom<PostRecord> for Post {
    type Error = GeoError;

    fn try_from(r: PostRecord) -> Result<Self, Self::Error> {
        Ok(Post {
            source: RouteEnd {
                point: GeoPoint::new(r.source_longitude, r.source_latitude)?,
                country: Country::new(r.source_country, CountryCode::parse(&r.source_country_code)?),
            },
            destination: RouteEnd {
                point: GeoPoint::new(r.destination_longitude, r.destination_latitude)?,
                country: Country::new(
                    r.destination_country,
                    CountryCode::parse(&r.destination_country_code)?,
                ),
            },
            id: r.id,
            message: r.message,
            created_at: r.created_at,
            author: r.user,
            comment_count: r.comment_count,
        })
    }
}

impl From<Post> for PostRecord {
    fn from(p: Post) -> Self {
        PostRecord {
            id: p.id,
            message: p.message,
            source_latitude: p.source.point.latitude(),
            source_longitude: p.source.point.longitude(),
            source_country: p.source.country.name,
            source_country_code: p.source.country.code.into(),
            destination_latitude: p.destination.point.latitude(),
            destination_longitude: p.destination.point.longitude(),
            destination_country: p.destination.country.name,
            destination_country_code: p.destination.country.code.into(),
            created_at: p.created_at,
            user: p.author,
            comment_count: p.comment_count,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostsEnvelope {
    #[serde(deserialize_with = "skip_malformed_posts")]
    pub posts: Vec<Post>,
}

/// One bad record must not hide every other route on the map.
fn skip_malformed_posts<'de, D>(deserializer: D) -> Result<Vec<Post>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|value| {
            let id = value.get("id").cloned().unwrap_or_default();
            match serde_json::from_value::<Post>(value) {
                Ok(post) => Some(post),
                Err(e) => {
                    warn!(post_id = %id, error = %e, "skipping malformed post");
                    None
                }
            }
        })
        .collect())
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostEnvelope {
    pub post: Post,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(max = 1000, message = "Message must be at most 1000 characters"))]
    pub message: String,
    pub source_latitude: f64,
    pub source_longitude: f64,
    pub source_country: String,
    pub source_country_code: String,
    pub destination_latitude: f64,
    pub destination_longitude: f64,
    pub destination_country: String,
    pub destination_country_code: String,
}

impl CreatePostRequest {
    pub fn new(message: impl Into<String>, source: &RouteEnd, destination: &RouteEnd) -> Self {
        Self {
            message: message.into(),
            source_latitude: source.point.latitude(),
            source_longitude: source.point.longitude(),
            source_country: source.country.name.clone(),
            source_country_code: source.country.code.to_string(),
            destination_latitude: destination.point.latitude(),
            destination_longitude: destination.point.longitude(),
            destination_country: destination.country.name.clone(),
            destination_country_code: destination.country.code.to_string(),
        }
    }
}

// ============================================================================
// Comments
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "user")]
    pub author: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentsEnvelope {
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(max = 500, message = "Comment must be at most 500 characters"))]
    pub message: String,
}

// ============================================================================
// Mentoring
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentorCandidate {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub profile_photo_url: String,
    #[serde(default)]
    pub is_available: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MentorsEnvelope {
    pub mentors: Vec<MentorCandidate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChooseMentorRequest {
    pub mentor_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityResponse {
    pub is_available: bool,
}

/// A mentee and the mentor they chose, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenteeLink {
    pub mentee: User,
    #[serde(default)]
    pub mentor: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MenteeEnvelope {
    #[serde(default)]
    pub mentee: Option<MenteeLink>,
}
