use actix_web::HttpRequest;
use actix_web::cookie::{Cookie, SameSite};
use rand::Rng;
use rand::distr::Alphanumeric;

pub const CSRF_COOKIE: &str = "csrftoken";
pub const CSRF_HEADER: &str = "X-CSRFToken";
const TOKEN_LEN: usize = 32;

pub fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Returns the token the client already holds, or a fresh one.
pub fn get_or_create_token(req: &HttpRequest) -> String {
    req.cookie(CSRF_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| is_well_formed(v))
        .unwrap_or_else(generate_token)
}

pub fn token_cookie(token: &str) -> Cookie<'static> {
    Cookie::build(CSRF_COOKIE, token.to_string())
        .path("/")
        .same_site(SameSite::Lax)
        .finish()
}

pub fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_LEN && token.bytes().all(|b| b.is_ascii_alphanumeric())
}

pub fn tokens_match(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn generated_tokens_are_well_formed() {
        let token = generate_token();
        assert!(is_well_formed(&token));
        assert_ne!(token, generate_token());
    }

    #[test]
    fn reuses_existing_cookie() {
        let existing = "a".repeat(TOKEN_LEN);
        let req = TestRequest::default()
            .cookie(Cookie::new(CSRF_COOKIE, existing.clone()))
            .to_http_request();
        assert_eq!(get_or_create_token(&req), existing);
    }

    #[test]
    fn replaces_malformed_cookie() {
        let req = TestRequest::default()
            .cookie(Cookie::new(CSRF_COOKIE, "short"))
            .to_http_request();
        let token = get_or_create_token(&req);
        assert_ne!(token, "short");
        assert!(is_well_formed(&token));
    }

    #[test]
    fn compares_tokens() {
        assert!(tokens_match("abc", "abc"));
        assert!(!tokens_match("abc", "abd"));
        assert!(!tokens_match("abc", "abcd"));
    }
}
