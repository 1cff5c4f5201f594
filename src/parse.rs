//! Helper functions for parsing search engine responses.

use eyre::eyre;
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::{
    engines::{EngineResponse, EngineSearchResult},
    urls::{unwrap_redirect, Redirect},
};

/// CSS selectors describing an engine's result markup. These come from the
/// engine's config table, so a new html engine doesn't need new parsing code.
#[derive(Deserialize, Debug, Clone)]
pub struct ParseOpts {
    pub result: String,
    pub title: String,
    pub href: String,
    #[serde(default)]
    pub redirect: Option<Redirect>,
}

pub fn parse_html_response_with_opts(
    body: &str,
    base: &Url,
    opts: &ParseOpts,
) -> eyre::Result<EngineResponse> {
    let dom = Html::parse_document(body);

    let result_item_query = selector(&opts.result)?;
    let title_query = selector(&opts.title)?;
    let href_query = selector(&opts.href)?;

    let mut search_results = Vec::new();

    for result_item in dom.select(&result_item_query) {
        let title = result_item
            .select(&title_query)
            .next()
            .map(|n| normalize_whitespace(&n.text().collect::<String>()))
            .filter(|title| !title.is_empty());

        let url = result_item
            .select(&href_query)
            .next()
            .and_then(|n| n.value().attr("href"))
            .map(|href| match &opts.redirect {
                Some(redirect) => unwrap_redirect(href, base, redirect),
                None => href.to_string(),
            });

        search_results.push(EngineSearchResult { title, url });
    }

    debug!(count = search_results.len(), "parsed html response");
    Ok(EngineResponse { search_results })
}

fn selector(s: &str) -> eyre::Result<Selector> {
    Selector::parse(s).map_err(|e| eyre!("invalid selector {s:?}: {e:?}"))
}

pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
