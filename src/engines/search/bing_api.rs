//! The Bing Web Search API. Unlike the other engines this one needs an api key,
//! and it's disabled if there isn't one.

use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;
use tracing::warn;
use url::Url;

use crate::{
    engines::{EngineResponse, EngineSearchResult, RequestResponse, SearchQuery, CLIENT},
    parse::normalize_whitespace,
};

/// What the key is set to in example configs. It's treated as not having a key.
const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY";

#[derive(Deserialize, Debug)]
struct BingApiConfig {
    url: String,
    #[serde(default)]
    query_suffix: String,
    /// Name of the environment variable holding the key.
    #[serde(default)]
    api_key_env: Option<String>,
    /// Takes priority over `api_key_env`.
    #[serde(default)]
    api_key: Option<String>,
}

impl BingApiConfig {
    fn api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(self.api_key_env.as_deref()?).ok())
            .filter(|key| !key.is_empty() && key != PLACEHOLDER_API_KEY)
    }
}

#[derive(Deserialize, Debug)]
struct BingResponse {
    #[serde(rename = "webPages")]
    web_pages: Option<WebPages>,
}

#[derive(Deserialize, Debug)]
struct WebPages {
    #[serde(default)]
    value: Vec<WebPage>,
}

#[derive(Deserialize, Debug)]
struct WebPage {
    name: Option<String>,
    url: Option<String>,
}

pub fn request(query: &SearchQuery) -> eyre::Result<RequestResponse> {
    let config: BingApiConfig = query.config.engines.get(query.engine)?;

    let Some(api_key) = config.api_key() else {
        warn!(
            "{} is disabled since it has no api key, set {} to enable it",
            query.engine,
            config.api_key_env.as_deref().unwrap_or("api_key")
        );
        return Ok(RequestResponse::None);
    };

    let text = query.text_with_suffix(&config.query_suffix);
    Ok(CLIENT
        .get(Url::parse_with_params(&config.url, &[("q", text.as_str())])?)
        .header(USER_AGENT, query.user_agent.as_str())
        .header(ACCEPT, "application/json")
        .header("Ocp-Apim-Subscription-Key", api_key)
        .into())
}

pub fn parse_response(_query: &SearchQuery, body: &str) -> eyre::Result<EngineResponse> {
    let res: BingResponse = serde_json::from_str(body)?;
    let search_results = res
        .web_pages
        .map(|pages| pages.value)
        .unwrap_or_default()
        .into_iter()
        .map(|page| EngineSearchResult {
            title: page.name.map(|name| normalize_whitespace(&name)),
            url: page.url,
        })
        .collect();

    Ok(EngineResponse { search_results })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rand::{rngs::StdRng, SeedableRng};
    use serde_json::json;
    use wiremock::{
        matchers::{header, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;
    use crate::{
        config::Config,
        engines::{search, Engine},
    };

    fn query_with(settings: &[(&str, &str)]) -> SearchQuery {
        let mut config = Config::base().unwrap();
        let table = config.engines.map.get_mut(&Engine::BingApi).unwrap();
        for (key, value) in settings {
            table.insert(key.to_string(), toml::Value::String(value.to_string()));
        }
        SearchQuery::new(
            "linear algebra".to_string(),
            Engine::BingApi,
            Arc::new(config),
            &mut StdRng::seed_from_u64(3),
        )
    }

    #[test]
    fn placeholder_key_disables() {
        let query = query_with(&[("api_key", PLACEHOLDER_API_KEY)]);
        assert!(matches!(request(&query).unwrap(), RequestResponse::None));
    }

    #[test]
    fn missing_env_var_disables() {
        let query = query_with(&[("api_key_env", "PDFSEARCH_TEST_KEY_THAT_IS_NEVER_SET")]);
        assert!(matches!(request(&query).unwrap(), RequestResponse::None));
    }

    #[test]
    fn parses_web_pages() {
        let query = query_with(&[]);
        let body = json!({
            "_type": "SearchResponse",
            "webPages": {
                "value": [
                    { "name": "Linear Algebra Done Right", "url": "https://axler.example/ladr.pdf" },
                    { "name": "No url" },
                    { "url": "https://example.com/untitled.pdf" }
                ]
            }
        })
        .to_string();
        let res = parse_response(&query, &body).unwrap();
        assert_eq!(res.search_results.len(), 3);
        assert_eq!(
            res.search_results[0],
            EngineSearchResult {
                title: Some("Linear Algebra Done Right".to_string()),
                url: Some("https://axler.example/ladr.pdf".to_string()),
            }
        );
        assert_eq!(res.search_results[1].url, None);
        assert_eq!(res.search_results[2].title, None);
    }

    #[test]
    fn no_web_pages_is_empty() {
        let res = parse_response(&query_with(&[]), r#"{"_type": "SearchResponse"}"#).unwrap();
        assert!(res.search_results.is_empty());
    }

    #[test]
    fn invalid_json_errors() {
        assert!(parse_response(&query_with(&[]), "<html>").is_err());
    }

    #[tokio::test]
    async fn disabled_engine_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let url = format!("{}/v7.0/search", server.uri());
        let query = query_with(&[
            ("url", url.as_str()),
            ("api_key_env", "PDFSEARCH_TEST_KEY_THAT_IS_NEVER_SET"),
        ]);
        assert!(search(&query).await.is_empty());
    }

    #[tokio::test]
    async fn searches_with_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v7.0/search"))
            .and(query_param("q", "linear algebra filetype:pdf"))
            .and(header("Ocp-Apim-Subscription-Key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "webPages": {
                    "value": [
                        { "name": "Linear Algebra Done Right", "url": "https://axler.example/ladr.pdf" },
                        { "name": "Course page", "url": "https://axler.example/course.html" }
                    ]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/v7.0/search", server.uri());
        let query = query_with(&[("url", url.as_str()), ("api_key", "test-key")]);
        let candidates = search(&query).await;
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "Linear Algebra Done Right");
    }
}
