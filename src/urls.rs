use serde::Deserialize;
use tracing::debug;
use url::Url;

/// Where a search engine hides the real destination of a result link.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Redirect {
    /// `https://duckduckgo.com/l/?uddg=<encoded url>&rut=...`
    QueryParam(String),
    /// `https://r.search.yahoo.com/.../RU=<encoded url>/RK=...`
    PathSegment(String),
}

/// Recover the destination of a redirect link. If the link doesn't contain one
/// then it's returned as-is.
pub fn unwrap_redirect(href: &str, base: &Url, redirect: &Redirect) -> String {
    let destination = match redirect {
        Redirect::QueryParam(param) => destination_from_query(href, base, param),
        Redirect::PathSegment(prefix) => destination_from_path(href, prefix),
    };
    destination.unwrap_or_else(|| {
        debug!("no redirect destination in {href}");
        href.to_string()
    })
}

fn destination_from_query(href: &str, base: &Url, param: &str) -> Option<String> {
    // hrefs are often protocol-relative, so resolve them first
    let url = base.join(href).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == param)
        .map(|(_, value)| value.into_owned())
}

fn destination_from_path(href: &str, prefix: &str) -> Option<String> {
    let path = href.split(['?', '#']).next().unwrap_or_default();
    let encoded = path
        .split('/')
        .find_map(|segment| segment.strip_prefix(prefix)?.strip_prefix('='))?;
    urlencoding::decode(encoded).ok().map(|url| url.into_owned())
}

/// The only check we do that a url points to a pdf. This is case-sensitive.
pub fn is_pdf_url(url: &str) -> bool {
    url.ends_with(".pdf")
}

/// Only spaces are encoded, anything else is left for the http client to deal
/// with.
pub fn encode_spaces(url: &str) -> String {
    url.replace(' ', "%20")
}
