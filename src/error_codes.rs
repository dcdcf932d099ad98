//! Translation of DSM numeric error codes into stable messages.
//!
//! DSM reports login and permission failures as bare integers inside an
//! `{"success": false, "error": {"code": N}}` envelope. This module maps the
//! codes the auth API documents to fixed sentences. Unknown codes degrade to a
//! generic message that still carries the number.

/// Error codes documented by the `SYNO.API.Auth` API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SynologyErrorCode {
    BadRequest,
    DisabledAccount,
    DeniedPermission,
    TwoFactorRequired,
    TwoFactorFailed,
    EnforceTwoFactor,
    BlockedIp,
    ExpiredPassword,
    PasswordMustChange,
}

impl SynologyErrorCode {
    /// Looks up a known code. Returns `None` for anything outside the table.
    #[must_use]
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            400 => Some(Self::BadRequest),
            401 => Some(Self::DisabledAccount),
            402 => Some(Self::DeniedPermission),
            403 => Some(Self::TwoFactorRequired),
            404 => Some(Self::TwoFactorFailed),
            406 => Some(Self::EnforceTwoFactor),
            407 => Some(Self::BlockedIp),
            409 => Some(Self::ExpiredPassword),
            410 => Some(Self::PasswordMustChange),
            _ => None,
        }
    }

    /// Numeric code as sent by DSM.
    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            Self::BadRequest => 400,
            Self::DisabledAccount => 401,
            Self::DeniedPermission => 402,
            Self::TwoFactorRequired => 403,
            Self::TwoFactorFailed => 404,
            Self::EnforceTwoFactor => 406,
            Self::BlockedIp => 407,
            Self::ExpiredPassword => 409,
            Self::PasswordMustChange => 410,
        }
    }

    /// Fixed sentence for this code, without the numeric prefix.
    #[must_use]
    pub fn sentence(self) -> &'static str {
        match self {
            Self::BadRequest => "No such account or incorrect password.",
            Self::DisabledAccount => "Disabled account.",
            Self::DeniedPermission => "Denied permission.",
            Self::TwoFactorRequired => "2-factor authentication code required.",
            Self::TwoFactorFailed => "Failed to authenticate 2-factor authentication code.",
            Self::EnforceTwoFactor => "Enforce to authenticate with 2-factor authentication code.",
            Self::BlockedIp => "Blocked IP source.",
            Self::ExpiredPassword => "Expired password.",
            Self::PasswordMustChange => "Password must be changed.",
        }
    }
}

/// Translates a DSM error code into `"<code> - <sentence>"`.
///
/// Unknown non-zero codes yield `"<code> - Unknown error."`; code 0 (the value
/// used when the response carried no code at all) yields `"Unknown error."`.
#[must_use]
pub fn translate(code: i64) -> String {
    match SynologyErrorCode::from_code(code) {
        Some(known) => format!("{code} - {}", known.sentence()),
        None if code == 0 => "Unknown error.".to_string(),
        None => format!("{code} - Unknown error."),
    }
}

/// Returns true when `code` has a dedicated message.
#[must_use]
pub fn is_known_error_code(code: i64) -> bool {
    SynologyErrorCode::from_code(code).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SynologyErrorCode; 9] = [
        SynologyErrorCode::BadRequest,
        SynologyErrorCode::DisabledAccount,
        SynologyErrorCode::DeniedPermission,
        SynologyErrorCode::TwoFactorRequired,
        SynologyErrorCode::TwoFactorFailed,
        SynologyErrorCode::EnforceTwoFactor,
        SynologyErrorCode::BlockedIp,
        SynologyErrorCode::ExpiredPassword,
        SynologyErrorCode::PasswordMustChange,
    ];

    #[test]
    fn test_translate_known_code_has_numeric_prefix() {
        assert_eq!(translate(400), "400 - No such account or incorrect password.");
        assert_eq!(translate(401), "401 - Disabled account.");
        assert_eq!(translate(407), "407 - Blocked IP source.");
        assert_eq!(translate(410), "410 - Password must be changed.");
    }

    #[test]
    fn test_translate_unknown_code_keeps_number() {
        assert_eq!(translate(999), "999 - Unknown error.");
        assert_eq!(translate(405), "405 - Unknown error.");
        assert_eq!(translate(-1), "-1 - Unknown error.");
    }

    #[test]
    fn test_translate_zero_has_no_prefix() {
        assert_eq!(translate(0), "Unknown error.");
    }

    #[test]
    fn test_code_table_is_bijective() {
        for known in ALL {
            assert_eq!(SynologyErrorCode::from_code(known.code()), Some(known));
            assert!(is_known_error_code(known.code()));
            assert_eq!(
                translate(known.code()),
                format!("{} - {}", known.code(), known.sentence())
            );
        }
        assert!(!is_known_error_code(0));
        assert!(!is_known_error_code(408));
    }
}
