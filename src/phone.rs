use crate::error::Error;

/// Pseudo-email domain used to map phone numbers onto the backend's
/// email/password authentication.
pub const EMAIL_DOMAIN: &str = "oceanfolx.org";

/// Normalizes a human-entered phone number to a digits-only string.
///
/// Strips every non-digit character, then replaces a leading "0" with "62"
/// (locally-dialed numbers are assumed to be Indonesian). The result must be
/// 8 to 15 digits long. Normalizing an already-normalized string is a no-op.
pub fn normalize_phone_to_digits(phone: &str) -> Result<String, Error> {
    let mut digits = phone
        .chars()
        .filter(|it| it.is_ascii_digit())
        .collect::<String>();
    if let Some(rest) = digits.strip_prefix('0') {
        digits = format!("62{rest}");
    }
    if digits.len() < 8 || digits.len() > 15 {
        return Err(Error::InvalidPhoneNumber);
    }
    Ok(digits)
}

/// Derives the synthetic auth email for a phone number.
///
/// The local part is the normalized digits prefixed with "p" so that email
/// validators requiring a letter accept it.
pub fn phone_to_email(phone: &str) -> Result<String, Error> {
    let digits = normalize_phone_to_digits(phone)?;
    Ok(format!("p{digits}@{EMAIL_DOMAIN}"))
}
