use url::{ParseError, Url};

/// Resolves a navigation href against the site base URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use catalog_sweep::url::resolve_href;
///
/// let base = Url::parse("https://books.example/").unwrap();
/// let url = resolve_href(&base, "catalogue/category/books/travel_2/index.html").unwrap();
/// assert_eq!(url.as_str(), "https://books.example/catalogue/category/books/travel_2/index.html");
/// ```
pub fn resolve_href(base: &Url, href: &str) -> Result<Url, ParseError> {
    base.join(href.trim())
}

/// Resolves a page-relative image path against the site base URL
///
/// Listing pages live several directories below the root and reference
/// images as `../../media/...`. Every `../` is dropped and the remainder is
/// joined onto the base, so the image lands under the base path rather than
/// under the listing page's directory.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use catalog_sweep::url::resolve_image_url;
///
/// let base = Url::parse("https://site.example/").unwrap();
/// let url = resolve_image_url(&base, "../../media/cache/ab/cd/x.jpg").unwrap();
/// assert_eq!(url.as_str(), "https://site.example/media/cache/ab/cd/x.jpg");
/// ```
pub fn resolve_image_url(base: &Url, src: &str) -> Result<Url, ParseError> {
    base.join(&src.trim().replace("../", ""))
}

/// Builds the URL of a page that lives in the same directory as `current`
///
/// Everything after the last `/` of `current` is replaced by `href`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use catalog_sweep::url::sibling_url;
///
/// let current = Url::parse("https://books.example/catalogue/category/books/mystery_3/index.html").unwrap();
/// let next = sibling_url(&current, "page-2.html").unwrap();
/// assert_eq!(next.as_str(), "https://books.example/catalogue/category/books/mystery_3/page-2.html");
/// ```
pub fn sibling_url(current: &Url, href: &str) -> Result<Url, ParseError> {
    let mut stem = current.clone();
    stem.set_query(None);
    stem.set_fragment(None);

    let stem = stem.as_str();
    let directory = stem.rsplit_once('/').map(|(dir, _)| dir).unwrap_or(stem);

    Url::parse(&format!("{}/{}", directory, href.trim()))
}
