//! Contact fields: email, phone and website.

use lazy_static::lazy_static;
use tracing::debug;

use super::patterns::{
    EMAIL, PHONE_INTERNATIONAL, PHONE_LABELED, PHONE_PLAIN, PHONE_US, WEBSITE_LABELED,
};
use super::{first_accepted, Rule};

/// Mailboxes that belong to a department rather than a person.
const GENERIC_MAILBOXES: [&str; 6] = ["billing", "support", "info", "noreply", "no-reply", "admin"];

/// Minimum digits in a phone number, a leading `+` counting as one.
const MIN_PHONE_DIGITS: usize = 10;

lazy_static! {
    pub static ref PHONE_RULES: Vec<Rule> = vec![
        Rule::first("phone_label", &PHONE_LABELED, accept_phone),
        Rule::first("phone_us", &PHONE_US, accept_phone),
        Rule::first("phone_plain", &PHONE_PLAIN, accept_phone),
        Rule::first("phone_international", &PHONE_INTERNATIONAL, accept_phone),
    ];

    pub static ref WEBSITE_RULES: Vec<Rule> = vec![
        Rule::first("website_label", &WEBSITE_LABELED, accept_website),
    ];
}

/// Extract an email address, preferring a personal mailbox over generic
/// ones such as `billing@` or `support@`.
pub fn extract_email(text: &str) -> Option<String> {
    let matches: Vec<&str> = EMAIL.find_iter(text).map(|m| m.as_str()).collect();

    let personal = matches.iter().find(|email| {
        let lower = email.to_lowercase();
        !GENERIC_MAILBOXES.iter().any(|generic| lower.contains(generic))
    });

    match personal {
        Some(email) => Some(email.to_string()),
        None => {
            if let Some(first) = matches.first() {
                debug!("only generic email addresses found, using {}", first);
            }
            matches.first().map(|email| email.to_string())
        }
    }
}

/// Extract a phone number with at least ten digits (or `+` and nine digits).
pub fn extract_phone(text: &str) -> Option<String> {
    first_accepted(text, &PHONE_RULES)
}

/// Extract a labeled website, adding `https://` when no scheme is present.
pub fn extract_website(text: &str) -> Option<String> {
    first_accepted(text, &WEBSITE_RULES)
}

fn accept_phone(candidate: &str) -> Option<String> {
    let phone = candidate.trim();
    let digits = phone.chars().filter(|c| c.is_ascii_digit() || *c == '+').count();
    (digits >= MIN_PHONE_DIGITS).then(|| phone.to_string())
}

fn accept_website(candidate: &str) -> Option<String> {
    let url = candidate.trim();
    if url.starts_with("http") {
        Some(url.to_string())
    } else {
        Some(format!("https://{}", url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_personal_email_preferred() {
        let text = "Send invoices to billing@acme.com\nContact: jane.doe@acme.com";
        assert_eq!(extract_email(text), Some("jane.doe@acme.com".to_string()));
    }

    #[test]
    fn test_generic_email_when_nothing_else() {
        let text = "support@acme.com or NoReply@acme.com";
        assert_eq!(extract_email(text), Some("support@acme.com".to_string()));
        assert_eq!(extract_email("no address here"), None);
    }

    #[test]
    fn test_labeled_phone() {
        let text = "Phone: 555-867-5309\nAddress: 123 Main Street";
        assert_eq!(extract_phone(text), Some("555-867-5309".to_string()));

        let text = "Mobile: +44 20 7946 0958";
        assert_eq!(extract_phone(text), Some("+44 20 7946 0958".to_string()));
    }

    #[test]
    fn test_unlabeled_phone() {
        assert_eq!(
            extract_phone("Call (555) 123-4567 today"),
            Some("(555) 123-4567".to_string())
        );
        assert_eq!(extract_phone("ref 555.123.4567"), Some("555.123.4567".to_string()));
    }

    #[test]
    fn test_short_numbers_rejected() {
        assert_eq!(extract_phone("Phone: 12345"), None);
        assert_eq!(extract_phone("Tel: 1 234 567 89"), None);
    }

    #[test]
    fn test_plus_counts_toward_length() {
        assert_eq!(extract_phone("Tel: +1 234 567 89"), Some("+1 234 567 89".to_string()));
    }

    #[test]
    fn test_website_scheme() {
        assert_eq!(
            extract_website("Website: www.acme.io"),
            Some("https://www.acme.io".to_string())
        );
        assert_eq!(
            extract_website("URL: http://acme.io/about"),
            Some("http://acme.io/about".to_string())
        );
        assert_eq!(extract_website("visit acme.io"), None);
    }
}
