// Helper functions for safe logging

/// Masks phone numbers for safe logging
/// Keeps the last two digits so support can still correlate requests
///
/// # Example
/// ```ignore
/// let masked = safe_phone_log("+15551234567");
/// // Returns: "***67"
/// ```
pub fn safe_phone_log(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() > 4 {
        let tail: String = chars[chars.len() - 2..].iter().collect();
        format!("***{}", tail)
    } else {
        "***".to_string()
    }
}

/// Masks tokens for safe logging
/// Shows only first and last 4 characters
///
/// # Example
/// ```ignore
/// let masked = safe_token_log("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9");
/// // Returns: "eyJh...CJ9"
/// ```
pub fn safe_token_log(token: &str) -> String {
    if token.is_ascii() && token.len() > 8 {
        format!("{}...{}", &token[..4], &token[token.len() - 4..])
    } else {
        "***".to_string()
    }
}
