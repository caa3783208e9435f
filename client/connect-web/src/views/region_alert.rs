use connect_common::models::User;
use pin_placement::PlacementPhase;
use std::fmt;

const EXPLORE: (&str, &str) = (
    "Explore the map!",
    "Traverse through the globe to see your penpals!",
);

/// Banner above the map telling the user what to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionAlert {
    pub title: &'static str,
    pub description: &'static str,
    /// Whether the confirm button that opens the compose sheet is shown.
    pub show_confirm: bool,
}

impl RegionAlert {
    pub fn new(user: Option<&User>, phase: PlacementPhase) -> Self {
        let (title, description) = match user {
            None => (
                "Login to experience a different way of interacting.",
                "To make posts and connect with language mentors, you must login.",
            ),
            Some(user) if user.has_posted => EXPLORE,
            Some(_) => match phase {
                PlacementPhase::AwaitingSource => (
                    "Where did you live before living abroad?",
                    "You can select a region by clicking the map.",
                ),
                PlacementPhase::AwaitingDestination => (
                    "Where are you right now?",
                    "You can select a region by clicking the map.",
                ),
                PlacementPhase::Ready => (
                    "All set!",
                    "You can click the confirm button to continue.",
                ),
                PlacementPhase::Locked => EXPLORE,
            },
        };

        Self {
            title,
            description,
            show_confirm: user.is_some_and(|u| !u.has_posted) && phase == PlacementPhase::Ready,
        }
    }
}

impl fmt::Display for RegionAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n  {}", self.title, self.description)?;
        if self.show_confirm {
            write!(f, "\n  [Confirm]")?;
        }
        Ok(())
    }
}
