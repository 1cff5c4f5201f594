//! Engines that we scrape the normal html results page of. They only differ in
//! their config table, see `config-base.toml`.

use reqwest::header::{REFERER, USER_AGENT};
use serde::Deserialize;
use url::Url;

use crate::{
    engines::{EngineResponse, RequestResponse, SearchQuery, CLIENT},
    parse::{parse_html_response_with_opts, ParseOpts},
};

#[derive(Deserialize, Debug)]
pub struct HtmlEngineConfig {
    pub url: String,
    #[serde(default = "default_query_param")]
    pub query_param: String,
    /// Appended to the query, like `filetype:pdf`.
    #[serde(default)]
    pub query_suffix: String,
    #[serde(default)]
    pub referer: Option<String>,
    #[serde(flatten)]
    pub parse: ParseOpts,
}

fn default_query_param() -> String {
    "q".to_string()
}

pub fn request(query: &SearchQuery) -> eyre::Result<RequestResponse> {
    let config: HtmlEngineConfig = query.config.engines.get(query.engine)?;

    let text = query.text_with_suffix(&config.query_suffix);
    let url = Url::parse_with_params(&config.url, &[(config.query_param.as_str(), text.as_str())])?;

    let mut request = CLIENT.get(url).header(USER_AGENT, query.user_agent.as_str());
    if let Some(referer) = &config.referer {
        request = request.header(REFERER, referer.as_str());
    }
    Ok(request.into())
}

pub fn parse_response(query: &SearchQuery, body: &str) -> eyre::Result<EngineResponse> {
    let config: HtmlEngineConfig = query.config.engines.get(query.engine)?;
    let base = Url::parse(&config.url)?;
    parse_html_response_with_opts(body, &base, &config.parse)
}
