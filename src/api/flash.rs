/// One-shot flash messages carried in a cookie across the post/redirect/get cycle

use axum::http::{header, HeaderMap};

const COOKIE_NAME: &str = "flash";

/// Outcome shown once on the next index view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    Created,
    Updated,
    Deleted,
}

impl Flash {
    fn key(self) -> &'static str {
        match self {
            Flash::Created => "created",
            Flash::Updated => "updated",
            Flash::Deleted => "deleted",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "created" => Some(Flash::Created),
            "updated" => Some(Flash::Updated),
            "deleted" => Some(Flash::Deleted),
            _ => None,
        }
    }

    /// Message displayed to the operator
    pub fn message(self) -> &'static str {
        match self {
            Flash::Created => "Project created successfully!",
            Flash::Updated => "Project updated successfully!",
            Flash::Deleted => "Project deleted successfully",
        }
    }

    /// `Set-Cookie` value storing this flash
    pub fn set_cookie(self) -> String {
        format!("{}={}; Path=/admin; HttpOnly; SameSite=Lax", COOKIE_NAME, self.key())
    }

    /// `Set-Cookie` value clearing any flash
    pub fn clear_cookie() -> String {
        format!("{}=; Path=/admin; HttpOnly; SameSite=Lax; Max-Age=0", COOKIE_NAME)
    }

    /// Flash carried by the request's cookies, if any
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|cookies| cookies.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == COOKIE_NAME)
            .and_then(|(_, value)| Flash::from_key(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_flash_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; flash=updated"));
        assert_eq!(Flash::from_headers(&headers), Some(Flash::Updated));
    }

    #[test]
    fn ignores_unknown_or_missing_flash() {
        let mut headers = HeaderMap::new();
        assert_eq!(Flash::from_headers(&headers), None);
        headers.insert(header::COOKIE, HeaderValue::from_static("flash=bogus"));
        assert_eq!(Flash::from_headers(&headers), None);
    }

    #[test]
    fn set_cookie_round_trips_through_header() {
        let cookie = Flash::Created.set_cookie();
        let pair = cookie.split(';').next().unwrap().to_string();
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(&pair).unwrap());
        assert_eq!(Flash::from_headers(&headers), Some(Flash::Created));
    }
}
