/// Extract the token from an `Authorization` header value.
///
/// The value must be exactly `Bearer <token>`, split on single spaces, so
/// stray or doubled separators are rejected rather than trimmed.
pub fn bearer_token(header: &str) -> Option<&str> {
    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        let cases = [
            ("Bearer eyJraW", Some("eyJraW")),
            ("", None),
            ("Bearer", None),
            ("Bearer ", None),
            ("bearer eyJraW", None),
            ("Bearer Bearer eyJraW", None),
            (" Bearer zzz ", None),
            ("Basic dXNlcjpwYXNz", None),
        ];

        for (header, expected) in cases {
            assert_eq!(bearer_token(header), expected, "header {header:?}");
        }
    }
}
