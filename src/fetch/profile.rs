use url::Url;

use crate::error::{Error, Result};

/// Where the real site lives.
pub const GITHUB_BASE: &str = "https://github.com";

/// First path segments that are GitHub pages rather than user profiles.
const RESERVED_PATHS: &[&str] = &[
    "about", "apps", "collections", "contact", "customer-stories", "enterprise", "events", "explore",
    "features", "issues", "login", "marketplace", "new", "notifications", "organizations", "orgs",
    "pricing", "pulls", "search", "settings", "signup", "sponsors", "topics", "trending", "users",
];

/// Extract a GitHub login from a username or any URL pointing into a profile.
///
/// Accepts `octocat`, `@octocat`, `github.com/octocat`,
/// `https://www.github.com/octocat/some-repo?tab=repositories` and
/// `https://github.com/users/octocat/contributions`.
pub fn parse_username(input: &str) -> Result<String> {
    let trimmed = input.trim();
    let invalid = || Error::InvalidProfileUrl(trimmed.to_string());

    if trimmed.is_empty() {
        return Err(invalid());
    }

    // Bare login
    let bare = trimmed.strip_prefix('@').unwrap_or(trimmed);
    if !bare.contains('/') && !bare.contains('.') && !bare.contains(':') {
        return if is_valid_login(bare) {
            Ok(bare.to_string())
        } else {
            Err(invalid())
        };
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    let url = Url::parse(&with_scheme).map_err(|_| invalid())?;

    match url.host_str() {
        Some("github.com") | Some("www.github.com") => {}
        _ => return Err(invalid()),
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let login = match segments.as_slice() {
        ["users", login, ..] => *login,
        [first, ..] if RESERVED_PATHS.contains(&first.to_ascii_lowercase().as_str()) => return Err(invalid()),
        [login, ..] => *login,
        [] => return Err(invalid()),
    };

    if is_valid_login(login) {
        Ok(login.to_string())
    } else {
        Err(invalid())
    }
}

/// GitHub logins: 1-39 ASCII alphanumerics or single hyphens, not at either end.
pub fn is_valid_login(login: &str) -> bool {
    !login.is_empty()
        && login.len() <= 39
        && login.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && !login.starts_with('-')
        && !login.ends_with('-')
        && !login.contains("--")
}

/// Builds the pages the fetcher needs for one user.
#[derive(Clone, Debug)]
pub struct ProfileUrls {
    base: String,
}

impl ProfileUrls {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    /// The public profile page, which lists the available years.
    pub fn profile(&self, username: &str) -> String {
        format!("{}/{}", self.base, username)
    }

    /// The calendar fragment for the trailing year.
    pub fn default_calendar(&self, username: &str) -> String {
        format!("{}/users/{}/contributions", self.base, username)
    }

    /// The calendar fragment for one calendar year.
    pub fn year_calendar(&self, username: &str, year: i32) -> String {
        format!(
            "{}/users/{}/contributions?from={year}-01-01&to={year}-12-31",
            self.base, username
        )
    }
}

impl Default for ProfileUrls {
    fn default() -> Self {
        Self::new(GITHUB_BASE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bare_usernames() {
        assert_eq!(parse_username("octocat").unwrap(), "octocat");
        assert_eq!(parse_username("  @octo-cat  ").unwrap(), "octo-cat");
        assert_eq!(parse_username("A1").unwrap(), "A1");
    }

    #[test]
    fn test_profile_urls() {
        for input in [
            "https://github.com/octocat",
            "https://github.com/octocat/",
            "http://github.com/octocat",
            "github.com/octocat",
            "www.github.com/octocat",
            "https://www.github.com/octocat?tab=repositories",
            "https://github.com/octocat#pinned",
            "https://github.com/octocat/hello-world",
            "https://github.com/octocat/hello-world/tree/main/src",
            "https://github.com/users/octocat/contributions",
            "https://github.com/users/octocat/contributions?from=2023-01-01&to=2023-12-31",
        ] {
            assert_eq!(parse_username(input).unwrap(), "octocat", "input: {input}");
        }
    }

    #[test]
    fn test_rejected_inputs() {
        for input in [
            "",
            "   ",
            "@",
            "-octocat",
            "octocat-",
            "octo--cat",
            "octo_cat",
            "https://gitlab.com/octocat",
            "https://github.com/",
            "https://github.com/settings/profile",
            "https://github.com/orgs/rust-lang",
            "https://github.com/explore",
            "https://github.com/users",
            "https://github.com/users/",
            "not a url at all",
        ] {
            assert!(parse_username(input).is_err(), "input: {input}");
        }
    }

    #[test]
    fn test_login_length_limit() {
        let longest = "a".repeat(39);
        assert!(is_valid_login(&longest));
        assert!(!is_valid_login(&"a".repeat(40)));
    }

    #[test]
    fn test_urls_for_user() {
        let urls = ProfileUrls::new("http://127.0.0.1:8080/");
        assert_eq!(urls.profile("octocat"), "http://127.0.0.1:8080/octocat");
        assert_eq!(
            urls.default_calendar("octocat"),
            "http://127.0.0.1:8080/users/octocat/contributions"
        );
        assert_eq!(
            urls.year_calendar("octocat", 2021),
            "http://127.0.0.1:8080/users/octocat/contributions?from=2021-01-01&to=2021-12-31"
        );
    }
}
