use url::Url;

/// Produces the canonical form of a URL
///
/// # Normalization Steps
///
/// 1. Parse the URL; malformed input is returned unchanged
/// 2. Remove fragment (everything after #)
/// 3. Remove the query string
/// 4. Remove trailing slashes, except for the root path
///
/// Returning malformed input as-is keeps this function total; the scope
/// check rejects anything that still does not parse.
///
/// # Examples
///
/// ```
/// use docs_indexer::url::normalize;
///
/// assert_eq!(
///     normalize("https://docs.example.com/Product/page/?tab=1#intro"),
///     "https://docs.example.com/Product/page"
/// );
/// assert_eq!(normalize("https://docs.example.com/"), "https://docs.example.com/");
/// assert_eq!(normalize("not a url"), "not a url");
/// ```
pub fn normalize(url_str: &str) -> String {
    let mut url = match Url::parse(url_str) {
        Ok(url) => url,
        Err(_) => return url_str.to_string(),
    };

    url.set_fragment(None);
    url.set_query(None);

    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = match path.trim_end_matches('/') {
            "" => "/".to_string(),
            rest => rest.to_string(),
        };
        url.set_path(&trimmed);
    }

    url.to_string()
}
