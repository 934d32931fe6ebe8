use scraper::{Html, Selector};
use url::Url;

/// Returns the `href` of the first anchor, in document order, that contains
/// `extension`.
///
/// Anchors without an `href` are skipped. Later matching anchors are ignored
/// even if they look "newer".
///
/// ```
/// use addon_updater::source::find_download_link;
///
/// let html = r#"<a href="/a.zip">a</a><a href="/b.zip">b</a>"#;
/// assert_eq!(find_download_link(html, ".zip").as_deref(), Some("/a.zip"));
/// ```
pub fn find_download_link(html: &str, extension: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let anchors = Selector::parse("a[href]").ok()?;

    document
        .select(&anchors)
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(str::trim)
        .find(|href| href.contains(extension))
        .map(str::to_string)
}

/// The page URL up to (not including) the last `/` of its path, with query and
/// fragment dropped.
///
/// `https://www.tukui.org/download.php?ui=elvui` becomes `https://www.tukui.org`.
pub fn page_directory(page_url: &str) -> String {
    if let Ok(url) = Url::parse(page_url) {
        let origin = url.origin();
        if origin.is_tuple() {
            let path = url.path();
            let dir = &path[..path.rfind('/').unwrap_or(0)];
            return format!("{}{dir}", origin.ascii_serialization());
        }
    }

    let without_query = page_url.split(['?', '#']).next().unwrap_or(page_url);
    match without_query.rsplit_once('/') {
        Some((dir, _)) => dir.to_string(),
        None => without_query.to_string(),
    }
}

/// Builds the absolute archive URL for an `href` found on `page_url`.
///
/// Absolute hrefs are returned unchanged and protocol-relative hrefs take the
/// page's scheme. Anything else is appended to [`page_directory`].
pub fn resolve_download_url(page_url: &str, href: &str) -> String {
    if Url::parse(href).is_ok() {
        return href.to_string();
    }

    if let Some(rest) = href.strip_prefix("//") {
        let scheme = Url::parse(page_url).map(|u| u.scheme().to_string()).unwrap_or_else(|_| "https".into());
        return format!("{scheme}://{rest}");
    }

    let dir = page_directory(page_url);
    if href.starts_with('/') {
        format!("{dir}{href}")
    } else {
        format!("{dir}/{href}")
    }
}
