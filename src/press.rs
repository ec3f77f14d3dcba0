//! Publisher identification from article URLs.
//!
//! Maps a URL's host to a display name using a static table of known
//! Korean outlets. Subdomains resolve to their parent entry, so
//! `m.chosun.com` is reported as 조선일보.

use once_cell::sync::Lazy;
use std::collections::HashSet;
use tracing::debug;
use url::Url;

/// Known publisher domains and their display names.
///
/// Several domains may map to the same outlet.
pub const PRESS_TABLE: &[(&str, &str)] = &[
    ("chosun.com", "조선일보"),
    ("yna.co.kr", "연합뉴스"),
    ("hani.co.kr", "한겨레"),
    ("joongang.co.kr", "중앙일보"),
    ("mbn.co.kr", "MBN"),
    ("kbs.co.kr", "KBS"),
    ("sbs.co.kr", "SBS"),
    ("ytn.co.kr", "YTN"),
    ("donga.com", "동아일보"),
    ("segye.com", "세계일보"),
    ("munhwa.com", "문화일보"),
    ("newsis.com", "뉴시스"),
    ("naver.com", "네이버"),
    ("daum.net", "다음"),
    ("kukinews.com", "국민일보"),
    ("kookbang.dema.mil.kr", "국방일보"),
    ("edaily.co.kr", "이데일리"),
    ("news1.kr", "뉴스1"),
    ("mbnmoney.mbn.co.kr", "MBN"),
    ("news.kmib.co.kr", "국민일보"),
    ("jtbc.co.kr", "JTBC"),
];

static MAJOR_PRESS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| PRESS_TABLE.iter().map(|(_, name)| *name).collect());

/// Publisher identity resolved from a URL.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PressIdentity {
    /// Host without a leading `www.`.
    pub domain: Option<String>,
    /// Display name from [`PRESS_TABLE`], or the raw domain if unknown.
    pub name: Option<String>,
}

/// Resolve the publisher of `url`.
///
/// An exact table hit wins; otherwise the longest key that the domain ends
/// with (as `.{key}`) is used. Unknown domains keep their own name. URLs
/// without a host yield an empty identity.
pub fn extract_press(url: &str) -> PressIdentity {
    let Some(domain) = domain_of(url) else {
        debug!(%url, "Could not extract domain");
        return PressIdentity::default();
    };

    let name = lookup(&domain)
        .map(str::to_string)
        .unwrap_or_else(|| domain.clone());
    PressIdentity {
        domain: Some(domain),
        name: Some(name),
    }
}

/// True if `name` is one of the display names in [`PRESS_TABLE`].
pub fn is_major_press(name: &str) -> bool {
    MAJOR_PRESS.contains(name)
}

fn domain_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    let domain = host.strip_prefix("www.").unwrap_or(&host);
    if domain.is_empty() {
        None
    } else {
        Some(domain.to_string())
    }
}

fn lookup(domain: &str) -> Option<&'static str> {
    if let Some((_, name)) = PRESS_TABLE.iter().find(|(key, _)| *key == domain) {
        return Some(*name);
    }
    PRESS_TABLE
        .iter()
        .filter(|(key, _)| {
            domain
                .strip_suffix(*key)
                .is_some_and(|prefix| prefix.ends_with('.'))
        })
        .max_by_key(|(key, _)| key.len())
        .map(|(_, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let id = extract_press("https://www.chosun.com/politics/2026/10/18/abc/");
        assert_eq!(id.domain.as_deref(), Some("chosun.com"));
        assert_eq!(id.name.as_deref(), Some("조선일보"));
    }

    #[test]
    fn test_subdomain_suffix_match() {
        let id = extract_press("https://m.chosun.com/news/article.html?sname=news");
        assert_eq!(id.domain.as_deref(), Some("m.chosun.com"));
        assert_eq!(id.name.as_deref(), Some("조선일보"));
    }

    #[test]
    fn test_exact_entry_beats_parent_suffix() {
        let id = extract_press("https://news.kmib.co.kr/article/view.asp?arcid=1");
        assert_eq!(id.name.as_deref(), Some("국민일보"));

        let id = extract_press("http://mbnmoney.mbn.co.kr/news/view?news_no=1");
        assert_eq!(id.name.as_deref(), Some("MBN"));
    }

    #[test]
    fn test_suffix_requires_label_boundary() {
        // "notchosun.com" must not match "chosun.com"
        let id = extract_press("https://notchosun.com/a");
        assert_eq!(id.name.as_deref(), Some("notchosun.com"));
    }

    #[test]
    fn test_unknown_domain_falls_back_to_domain() {
        let id = extract_press("https://www.example.org/story");
        assert_eq!(id.domain.as_deref(), Some("example.org"));
        assert_eq!(id.name.as_deref(), Some("example.org"));
    }

    #[test]
    fn test_malformed_url_yields_empty_identity() {
        assert_eq!(extract_press("not a url"), PressIdentity::default());
        assert_eq!(extract_press(""), PressIdentity::default());
        assert_eq!(extract_press("mailto:desk@example.com"), PressIdentity::default());
    }

    #[test]
    fn test_is_major_press() {
        assert!(is_major_press("연합뉴스"));
        assert!(is_major_press("MBN"));
        assert!(!is_major_press("example.org"));
        assert!(!is_major_press("unknown"));
    }
}
