//! Rewrites article links to their preferred form.

/// Desktop article path on the Naver news viewer.
const DESKTOP_ARTICLE: &str = "n.news.naver.com/article";
/// Mobile-friendly equivalent of [`DESKTOP_ARTICLE`].
const MOBILE_ARTICLE: &str = "n.news.naver.com/mnews/article";

/// Rewrite a link to its canonical (mobile) form.
///
/// Links that do not point at the desktop article viewer are returned
/// unchanged. Applying this twice gives the same result as applying it once.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     canonicalize("https://n.news.naver.com/article/001/0014000000"),
///     "https://n.news.naver.com/mnews/article/001/0014000000"
/// );
/// ```
pub fn canonicalize(url: &str) -> String {
    if url.contains(DESKTOP_ARTICLE) {
        url.replace(DESKTOP_ARTICLE, MOBILE_ARTICLE)
    } else {
        url.to_string()
    }
}
