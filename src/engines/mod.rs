use std::{
    fmt,
    sync::{Arc, LazyLock},
};

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use tracing::{debug, error};

mod macros;
use crate::{config::Config, engine_requests, engines, urls::is_pdf_url, useragent};

pub mod search;

engines! {
    DuckDuckGo = "duckduckgo",
    Brave = "brave",
    Yahoo = "yahoo",
    BingApi = "bing-api",
}

engine_requests! {
    DuckDuckGo => search::html::request, parse_response,
    Brave => search::html::request, parse_response,
    Yahoo => search::html::request, parse_response,
    BingApi => search::bing_api::request, parse_response,
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// The most results we'll ever show for one search.
pub const MAX_RESULTS: usize = 10;

pub struct SearchQuery {
    pub query: String,
    pub engine: Engine,
    pub config: Arc<Config>,
    pub user_agent: String,
}

impl SearchQuery {
    pub fn new<R: Rng + ?Sized>(
        query: String,
        engine: Engine,
        config: Arc<Config>,
        rng: &mut R,
    ) -> Self {
        let user_agent = useragent::choose(&config.user_agents, rng).to_string();
        Self {
            query,
            engine,
            config,
            user_agent,
        }
    }

    /// The query with the engine's filetype hint appended, since engines
    /// want it in the query text rather than as a separate parameter.
    pub fn text_with_suffix(&self, suffix: &str) -> String {
        format!("{} {suffix}", self.query).trim().to_string()
    }
}

pub enum RequestResponse {
    /// The engine decided not to search, for example because it has no api key.
    None,
    Http(reqwest::RequestBuilder),
}
impl From<reqwest::RequestBuilder> for RequestResponse {
    fn from(req: reqwest::RequestBuilder) -> Self {
        Self::Http(req)
    }
}

/// A result as the engine gave it to us, before we check that it's usable.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EngineSearchResult {
    pub title: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Default)]
pub struct EngineResponse {
    pub search_results: Vec<EngineSearchResult>,
}

impl EngineResponse {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A search result that has a title and a url ending in `.pdf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub url: String,
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.url)
    }
}

pub static CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::ClientBuilder::new()
        .user_agent(useragent::DEFAULT_USER_AGENT)
        .default_headers({
            let mut headers = HeaderMap::new();
            headers.insert(
                ACCEPT,
                HeaderValue::from_static(
                    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
                ),
            );
            headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
            headers
        })
        .build()
        .unwrap_or_default()
});

/// Search for pdfs with the query's engine. Errors are logged and result in no
/// candidates, since a failed search isn't fatal.
pub async fn search(query: &SearchQuery) -> Vec<Candidate> {
    match search_with_engine(query).await {
        Ok(candidates) => candidates,
        Err(e) => {
            error!("search with {} failed: {e:#}", query.engine);
            Vec::new()
        }
    }
}

async fn search_with_engine(query: &SearchQuery) -> eyre::Result<Vec<Candidate>> {
    let engine = query.engine;

    let response = match engine.request(query)? {
        RequestResponse::Http(request) => {
            debug!("requesting {engine}");
            let res = request.send().await?.error_for_status()?;
            let body = res.text().await?;
            debug!(bytes = body.len(), "got response from {engine}");
            engine.parse_response(query, &body)?
        }
        RequestResponse::None => EngineResponse::new(),
    };

    Ok(filter_results(response.search_results))
}

/// Drop results without a title or a pdf url, and keep the first
/// [`MAX_RESULTS`] in the order the engine gave them.
pub fn filter_results(results: Vec<EngineSearchResult>) -> Vec<Candidate> {
    results
        .into_iter()
        .filter_map(|result| {
            let title = result.title.filter(|t| !t.trim().is_empty())?;
            let url = result.url.filter(|u| is_pdf_url(u))?;
            Some(Candidate { title, url })
        })
        .take(MAX_RESULTS)
        .collect()
}
