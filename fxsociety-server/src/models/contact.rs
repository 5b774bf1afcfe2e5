//! Customer contact details - email addresses and WhatsApp numbers

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

/// Maximum length for stored email addresses
const MAX_EMAIL_LEN: usize = 200;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("invalid email regex")
});

/// Indonesian mobile number: local `0` prefix or `62` country code, 9-13 digits after.
static WHATSAPP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\+?62|0)[0-9]{9,13}$").expect("invalid whatsapp regex"));

/// Validated email address, trimmed and lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// # Example
    /// ```
    /// use fxsociety_server::models::Email;
    ///
    /// let email = Email::new(" Budi@Example.COM ").unwrap();
    /// assert_eq!(email.as_str(), "budi@example.com");
    /// assert!(Email::new("not-an-email").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "email" });
        }
        if s.len() > MAX_EMAIL_LEN {
            return Err(ValidationError::TooLong {
                field: "email",
                max: MAX_EMAIL_LEN,
            });
        }
        if !EMAIL_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "enter a valid email address",
            });
        }
        Ok(Self(s.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// WhatsApp number with spaces and dashes removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhatsApp(String);

impl WhatsApp {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let cleaned: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();

        if !WHATSAPP_RE.is_match(&cleaned) {
            return Err(ValidationError::InvalidFormat {
                field: "whatsapp",
                reason: "Format nomor WhatsApp tidak valid",
            });
        }
        Ok(Self(cleaned))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_lowercases_and_trims() {
        let email = Email::new("  Customer@Example.com").unwrap();
        assert_eq!(email.as_str(), "customer@example.com");
    }

    #[test]
    fn email_rejects_garbage() {
        assert!(matches!(
            Email::new(""),
            Err(ValidationError::Empty { .. })
        ));
        assert!(matches!(
            Email::new("no-at-sign.com"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            Email::new("two@@example.com"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            Email::new("user@localhost"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn whatsapp_strips_separators() {
        let number = WhatsApp::new("0812-3456 7890").unwrap();
        assert_eq!(number.as_str(), "081234567890");

        let number = WhatsApp::new("+62 812 3456 7890").unwrap();
        assert_eq!(number.as_str(), "+6281234567890");

        assert!(WhatsApp::new("6281234567890").is_ok());
    }

    #[test]
    fn whatsapp_rejects_invalid() {
        // too short
        assert!(WhatsApp::new("0812345").is_err());
        // wrong prefix
        assert!(WhatsApp::new("+1 555 123 4567").is_err());
        // letters
        assert!(WhatsApp::new("08123abc7890").is_err());
        // too long
        assert!(WhatsApp::new("0812345678901234").is_err());
    }
}
