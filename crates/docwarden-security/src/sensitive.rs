// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contact-data detection for outgoing answers.
//!
//! Any email address or phone number in a generated answer causes the whole
//! answer to be withheld. Partial masking is not attempted.

use std::sync::LazyLock;

use regex::Regex;

pub(crate) static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+").unwrap()
});

/// North American numbers: `+1 (512) 904-7731`, `512.904.7731`, `512 904 7731`.
pub(crate) static US_PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?1[\s\-.]?)?(?:\(?\d{3}\)?[\s\-.]?)\d{3}[\s\-.]\d{4}").unwrap()
});

/// International numbers with an explicit country code: `+44 2079460958`.
pub(crate) static INTL_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+\d{1,3}[\s\-.]?\d{4,14}").unwrap());

/// Kind of contact data found in a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensitiveKind {
    Email,
    Phone,
}

impl SensitiveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }
}

/// First kind of contact data present in `text`, if any.
pub fn find_sensitive(text: &str) -> Option<SensitiveKind> {
    if EMAIL.is_match(text) {
        Some(SensitiveKind::Email)
    } else if US_PHONE.is_match(text) || INTL_PHONE.is_match(text) {
        Some(SensitiveKind::Phone)
    } else {
        None
    }
}

pub fn contains_sensitive(text: &str) -> bool {
    find_sensitive(text).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_us_phone_with_country_code() {
        assert_eq!(
            find_sensitive("Call the CEO at +1 (512) 904-7731 today."),
            Some(SensitiveKind::Phone)
        );
    }

    #[test]
    fn detects_plain_us_phone_forms() {
        for text in ["512-904-7731", "512.904.7731", "(512) 904 7731"] {
            assert_eq!(find_sensitive(text), Some(SensitiveKind::Phone), "{text}");
        }
    }

    #[test]
    fn detects_international_phone() {
        assert_eq!(
            find_sensitive("London office: +44 2079460958"),
            Some(SensitiveKind::Phone)
        );
    }

    #[test]
    fn detects_email() {
        assert_eq!(
            find_sensitive("Reach m.holloway@nexabridge-internal.com for access."),
            Some(SensitiveKind::Email)
        );
    }

    #[test]
    fn financial_figures_are_not_contact_data() {
        for text in [
            "ARR was $148.5 million, YoY growth 27.3% [source:test.txt#c12 p=4]",
            "Headcount grew from 2023 to 2024 by 14%.",
            "Ticket volume: 1,204 in Q3, 1,388 in Q4.",
            "Margin improved +12.5 points.",
        ] {
            assert_eq!(find_sensitive(text), None, "{text}");
        }
    }

    proptest::proptest! {
        #[test]
        fn text_without_digits_or_at_sign_is_never_sensitive(text in "[a-zA-Z .,!?()+-]{0,200}") {
            proptest::prop_assert_eq!(find_sensitive(&text), None);
        }
    }
}
