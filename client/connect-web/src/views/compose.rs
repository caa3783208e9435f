use connect_common::models::POST_MESSAGE_MAX;
use pin_placement::CountryPin;
use std::fmt;

use super::flags::flag_url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryBadge {
    pub name: String,
    pub flag_url: String,
}

impl CountryBadge {
    pub fn from_pin(pin: &CountryPin, flag_cdn: &str) -> Self {
        Self {
            name: pin.country.name.clone(),
            flag_url: flag_url(flag_cdn, &pin.country.code),
        }
    }
}

/// Sheet opened by the confirm button: the two countries and the story field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeSheet {
    pub source: Option<CountryBadge>,
    pub destination: Option<CountryBadge>,
    pub message_max: u64,
}

impl ComposeSheet {
    pub fn new(source: Option<&CountryPin>, destination: Option<&CountryPin>, flag_cdn: &str) -> Self {
        Self {
            source: source.map(|pin| CountryBadge::from_pin(pin, flag_cdn)),
            destination: destination.map(|pin| CountryBadge::from_pin(pin, flag_cdn)),
            message_max: POST_MESSAGE_MAX,
        }
    }

    pub fn can_submit(&self) -> bool {
        self.source.is_some() && self.destination.is_some()
    }
}

impl fmt::Display for ComposeSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tell us your story")?;
        for (label, badge) in [("From", &self.source), ("To", &self.destination)] {
            match badge {
                Some(badge) => writeln!(f, "  {}: {} ({})", label, badge.name, badge.flag_url)?,
                None => writeln!(f, "  {}: -", label)?,
            }
        }
        write!(f, "  Message: up to {} characters", self.message_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pin_placement::{Country, CountryCode, GeoPoint, PinId, PinRole};

    fn pin(name: &str, code: &str, role: PinRole) -> CountryPin {
        CountryPin {
            id: PinId::new(),
            point: GeoPoint::new(0.0, 0.0).unwrap(),
            country: Country::new(name, CountryCode::parse(code).unwrap()),
            owner_id: "1".into(),
            role,
            placed_at: 1,
        }
    }

    #[test]
    fn test_badges_and_submit() {
        let src = pin("France", "fr", PinRole::Source);
        let sheet = ComposeSheet::new(Some(&src), None, "https://flagcdn.com");
        assert!(!sheet.can_submit());
        assert_eq!(
            sheet.source.as_ref().unwrap().flag_url,
            "https://flagcdn.com/48x36/fr.png"
        );

        let dest = pin("Japan", "jp", PinRole::Destination);
        let sheet = ComposeSheet::new(Some(&src), Some(&dest), "https://flagcdn.com");
        assert!(sheet.can_submit());
        assert!(sheet.to_string().contains("To: Japan"));
    }
}
