use std::fmt;

use crate::notify::{Toast, ToastVariant};

/// One-line rendering of a toast.
pub struct ToastLine<'a>(pub &'a Toast);

impl fmt::Display for ToastLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.0.variant {
            ToastVariant::Default => "*",
            ToastVariant::Success => "+",
            ToastVariant::Destructive => "!",
        };
        write!(f, "[{}] {}", marker, self.0.title)?;
        if let Some(description) = &self.0.description {
            write!(f, " {}", description)?;
        }
        if let Some(flag) = &self.0.flag {
            write!(f, " ({})", flag)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let toast = Toast::new("Setting source country:", ToastVariant::Default)
            .with_description("France")
            .with_flag("https://flagcdn.com/48x36/fr.png");
        assert_eq!(
            ToastLine(&toast).to_string(),
            "[*] Setting source country: France (https://flagcdn.com/48x36/fr.png)"
        );
    }
}
