//! # Time-Coded Synchronization Password
//!
//! Client installations authenticate update synchronization requests with a
//! 12-character password that embeds the current date. The characters at
//! even indices (0, 2, 4, 6, 8, 10) concatenate to a 6-digit `DDMMYY` code;
//! the odd-indexed characters are unconstrained filler. A password is valid
//! exactly when its embedded code equals today's date in UTC.
//!
//! ## Security posture
//!
//! This is deliberate weak obfuscation, not cryptography. Anyone who can
//! compute today's UTC date can mint a valid password, so the scheme proves
//! only "this request was made today" — it does not authenticate identity,
//! and it is replayable within the same UTC day. That is the inherited
//! contract with deployed clients; do not "strengthen" it here without a
//! coordinated client rollout.

use chrono::NaiveDate;
use thiserror::Error;

/// Required password length, in characters.
pub const PASSWORD_LEN: usize = 12;

/// Synchronization password validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordError {
    /// Password is not exactly 12 characters long.
    #[error("synchronization password must be {PASSWORD_LEN} characters, got {len}")]
    MalformedLength {
        /// Length of the rejected password, in characters.
        len: usize,
    },

    /// The embedded date code does not match today's date.
    #[error("password date code {received} does not match current date code {expected}")]
    DateMismatch {
        /// Today's date formatted `DDMMYY`.
        expected: String,
        /// The code decoded from the password.
        received: String,
    },
}

/// Format a date as the 6-digit `DDMMYY` code a valid password must embed.
///
/// Clients interleave this code with six filler characters to mint a
/// password: code digit at each even index, filler at each odd index.
pub fn date_code(date: NaiveDate) -> String {
    date.format("%d%m%y").to_string()
}

/// Extract the 6-character code from the even indices of a password.
fn decode(password: &str) -> String {
    password
        .chars()
        .step_by(2)
        .take(PASSWORD_LEN / 2)
        .collect()
}

/// Validate a synchronization password against a given date.
///
/// `today` is the caller's notion of the current date; production callers
/// pass `Utc::now().date_naive()` so generation and validation share one
/// canonical zone.
///
/// # Errors
///
/// [`PasswordError::MalformedLength`] unless the password is exactly 12
/// characters; [`PasswordError::DateMismatch`] unless the decoded code
/// equals `date_code(today)`.
pub fn validate(password: &str, today: NaiveDate) -> Result<(), PasswordError> {
    let len = password.chars().count();
    if len != PASSWORD_LEN {
        return Err(PasswordError::MalformedLength { len });
    }

    let received = decode(password);
    let expected = date_code(today);
    if received != expected {
        return Err(PasswordError::DateMismatch { expected, received });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Interleave a 6-char date code with 6 filler chars, code at even
    /// indices — the client-side generation rule.
    fn mint(code: &str, filler: &str) -> String {
        code.chars()
            .zip(filler.chars())
            .flat_map(|(c, f)| [c, f])
            .collect()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn date_code_is_ddmmyy() {
        assert_eq!(date_code(day(2025, 1, 1)), "010125");
        assert_eq!(date_code(day(2023, 11, 14)), "141123");
    }

    #[test]
    fn accepts_password_minted_for_today() {
        let today = day(2025, 1, 1);
        let password = mint(&date_code(today), "000000");
        assert_eq!(password.len(), PASSWORD_LEN);
        assert_eq!(validate(&password, today), Ok(()));
    }

    #[test]
    fn filler_characters_are_ignored() {
        let today = day(2025, 1, 1);
        // Same date code, arbitrary non-digit filler.
        let password = mint(&date_code(today), "xK!9 z");
        assert_eq!(validate(&password, today), Ok(()));
    }

    #[test]
    fn rejects_yesterdays_password() {
        let yesterday = day(2024, 12, 31);
        let today = day(2025, 1, 1);
        let password = mint(&date_code(yesterday), "000000");
        assert_eq!(
            validate(&password, today),
            Err(PasswordError::DateMismatch {
                expected: "010125".to_string(),
                received: "311224".to_string(),
            })
        );
    }

    #[test]
    fn rejects_short_and_long_passwords() {
        let today = day(2025, 1, 1);
        assert_eq!(
            validate("", today),
            Err(PasswordError::MalformedLength { len: 0 })
        );
        assert_eq!(
            validate("01012", today),
            Err(PasswordError::MalformedLength { len: 5 })
        );
        assert_eq!(
            validate("0101250000000", today),
            Err(PasswordError::MalformedLength { len: 13 })
        );
    }

    #[test]
    fn length_is_counted_in_characters_not_bytes() {
        let today = day(2025, 1, 1);
        // 12 multibyte characters: 24 bytes, but the length check passes
        // and validation proceeds to the date comparison.
        let password = "áá".repeat(6);
        assert_eq!(password.chars().count(), 12);
        assert_ne!(password.len(), 12);
        assert!(matches!(
            validate(&password, today),
            Err(PasswordError::DateMismatch { .. })
        ));
    }

    proptest! {
        #[test]
        fn any_filler_validates_for_today(filler in "[ -~]{6}") {
            let today = day(2023, 11, 14);
            let password = mint(&date_code(today), &filler);
            prop_assert_eq!(validate(&password, today), Ok(()));
        }

        #[test]
        fn any_wrong_length_is_malformed(password in "[0-9]{0,11}|[0-9]{13,20}") {
            let today = day(2023, 11, 14);
            let result = validate(&password, today);
            prop_assert!(
                matches!(result, Err(PasswordError::MalformedLength { .. })),
                "got {:?}",
                result
            );
        }
    }
}
