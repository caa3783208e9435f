use chrono::{DateTime, Utc};
use connect_common::models::{Comment, MentorCandidate, Post, User, COMMENT_MESSAGE_MAX};
use std::fmt;

use super::flags::flag_url;

/// `Sun Oct 01 2023`
fn display_date(at: &DateTime<Utc>) -> String {
    at.format("%a %b %d %Y").to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentView {
    pub id: String,
    pub author: String,
    pub author_photo: String,
    pub date: String,
    pub message: String,
    pub can_delete: bool,
}

/// Second tab of the sheet: the author manages mentors, everyone else sees
/// the author's profile.
#[derive(Debug, Clone, PartialEq)]
pub enum SecondTab {
    Mentor { candidates: Vec<MentorCandidate> },
    Profile {
        username: String,
        email: String,
        photo: String,
    },
}

/// Detail panel for one post.
#[derive(Debug, Clone, PartialEq)]
pub struct PostSheet {
    pub post_id: String,
    pub author: String,
    pub author_photo: String,
    pub date: String,
    pub source_country: String,
    pub source_flag: String,
    pub destination_country: String,
    pub destination_flag: String,
    pub message: String,
    pub comments: Vec<CommentView>,
    pub comment_placeholder: String,
    pub comment_max: u64,
    pub can_comment: bool,
    pub can_delete_post: bool,
    pub second_tab: SecondTab,
}

impl PostSheet {
    pub fn new(
        post: &Post,
        comments: &[Comment],
        viewer: Option<&User>,
        candidates: &[MentorCandidate],
        flag_cdn: &str,
    ) -> Self {
        let viewer_id = viewer.map(|u| u.id.as_str());
        let is_author = viewer_id == Some(post.author.id.as_str());

        let second_tab = if is_author {
            SecondTab::Mentor {
                candidates: candidates.to_vec(),
            }
        } else {
            SecondTab::Profile {
                username: post.author.username.clone(),
                email: post.author.email.clone(),
                photo: post.author.profile_photo_url.clone(),
            }
        };

        Self {
            post_id: post.id.clone(),
            author: post.author.username.clone(),
            author_photo: post.author.profile_photo_url.clone(),
            date: display_date(&post.created_at),
            source_country: post.source.country.name.clone(),
            source_flag: flag_url(flag_cdn, &post.source.country.code),
            destination_country: post.destination.country.name.clone(),
            destination_flag: flag_url(flag_cdn, &post.destination.country.code),
            message: post.message.clone(),
            comments: comments
                .iter()
                .map(|c| CommentView {
                    id: c.id.clone(),
                    author: c.author.username.clone(),
                    author_photo: c.author.profile_photo_url.clone(),
                    date: display_date(&c.created_at),
                    message: c.message.clone(),
                    can_delete: viewer_id == Some(c.author.id.as_str()),
                })
                .collect(),
            comment_placeholder: format!("Reach {} out... ", post.author.username),
            comment_max: COMMENT_MESSAGE_MAX,
            can_comment: viewer.is_some(),
            can_delete_post: is_author,
            second_tab,
        }
    }
}

impl fmt::Display for PostSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} | {}", self.author, self.date)?;
        writeln!(
            f,
            "{} is from {} and is now in {}.",
            self.author, self.source_country, self.destination_country
        )?;
        writeln!(f, "Here is {}'s story:", self.author)?;
        writeln!(f, "  {}", self.message)?;
        if self.can_delete_post {
            writeln!(f, "  [delete post {}]", self.post_id)?;
        }

        writeln!(f, "Comments ({})", self.comments.len())?;
        for c in &self.comments {
            write!(f, "  #{} {} ({}): {}", c.id, c.author, c.date, c.message)?;
            if c.can_delete {
                write!(f, " [delete]")?;
            }
            writeln!(f)?;
        }
        if self.can_comment {
            writeln!(f, "  > {}", self.comment_placeholder.trim_end())?;
        }

        match &self.second_tab {
            SecondTab::Mentor { candidates } if candidates.is_empty() => {
                write!(f, "Mentor: no candidates loaded")
            }
            SecondTab::Mentor { candidates } => {
                write!(f, "Mentor candidates:")?;
                for m in candidates {
                    let status = if m.is_available { "available" } else { "busy" };
                    write!(f, "\n  #{} {} <{}> {}", m.id, m.username, m.email, status)?;
                }
                Ok(())
            }
            SecondTab::Profile { username, email, .. } => {
                write!(f, "Profile: {} <{}>\n  Know about {} more!", username, email, username)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn post() -> Post {
        serde_json::from_value(json!({
            "id": "4",
            "message": "Studying in Tokyo.",
            "source_latitude": 48.85,
            "source_longitude": 2.35,
            "source_country": "France",
            "source_country_code": "fr",
            "destination_latitude": 35.68,
            "destination_longitude": 139.69,
            "destination_country": "Japan",
            "destination_country_code": "jp",
            "created_at": "2023-10-01T12:00:00Z",
            "user": {"id": 1, "username": "arkan", "email": "arkan@example.com"}
        }))
        .unwrap()
    }

    fn user(id: &str) -> User {
        serde_json::from_value(json!({"id": id, "username": format!("u{}", id)})).unwrap()
    }

    fn comment(author: &str) -> Comment {
        serde_json::from_value(json!({
            "id": 11,
            "message": "Welcome!",
            "created_at": "2023-10-02T08:30:00Z",
            "user": {"id": author, "username": format!("u{}", author)}
        }))
        .unwrap()
    }

    #[test]
    fn test_author_sees_mentor_tab_and_delete() {
        let viewer = user("1");
        let sheet = PostSheet::new(&post(), &[comment("2")], Some(&viewer), &[], "https://flagcdn.com");

        assert!(sheet.can_delete_post);
        assert!(matches!(sheet.second_tab, SecondTab::Mentor { .. }));
        assert!(!sheet.comments[0].can_delete);
        assert_eq!(sheet.date, "Sun Oct 01 2023");
        assert_eq!(sheet.destination_flag, "https://flagcdn.com/48x36/jp.png");
    }

    #[test]
    fn test_visitor_sees_profile_tab() {
        let viewer = user("2");
        let sheet = PostSheet::new(&post(), &[comment("2")], Some(&viewer), &[], "https://flagcdn.com");

        assert!(!sheet.can_delete_post);
        assert!(sheet.comments[0].can_delete);
        assert_eq!(
            sheet.second_tab,
            SecondTab::Profile {
                username: "arkan".into(),
                email: "arkan@example.com".into(),
                photo: String::new(),
            }
        );
        assert!(sheet.to_string().contains("Know about arkan more!"));
    }

    #[test]
    fn test_signed_out_cannot_comment() {
        let sheet = PostSheet::new(&post(), &[], None, &[], "https://flagcdn.com");
        assert!(!sheet.can_comment);
        assert!(!sheet.can_delete_post);
        assert_eq!(sheet.comment_placeholder, "Reach arkan out... ");
    }
}
