//! Downloading pdfs from search results.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use futures::{future, stream, StreamExt};
use tracing::{debug, info};

use crate::{
    engines::{Candidate, CLIENT},
    urls::{encode_spaces, is_pdf_url},
};

macro_rules! regex {
    ($re:literal $(,)?) => {{
        static RE: std::sync::LazyLock<regex::Regex> =
            std::sync::LazyLock::new(|| regex::Regex::new($re).unwrap());
        &RE
    }};
}

/// How many downloads can be in flight at once when fetching several results.
const CONCURRENT_DOWNLOADS: usize = 4;

#[derive(Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    Written(PathBuf),
    Failed { url: String, reason: String },
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchOutcome::Written(path) => write!(f, "Downloaded: {}", path.display()),
            FetchOutcome::Failed { url, reason } => {
                write!(f, "Error downloading {url}: {reason}")
            }
        }
    }
}

pub struct Fetcher {
    dir: PathBuf,
}

impl Fetcher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Download one candidate into the output directory, replacing any file
    /// with the same name. Returns `None` if the url isn't a pdf.
    pub async fn fetch(&self, candidate: &Candidate) -> Option<FetchOutcome> {
        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            debug!("couldn't create {:?}: {e}", self.dir);
            return Some(FetchOutcome::Failed {
                url: candidate.url.clone(),
                reason: format!("couldn't create {}: {e}", self.dir.display()),
            });
        }

        if !is_pdf_url(&candidate.url) {
            debug!("skipping {}, it's not a pdf", candidate.url);
            return None;
        }

        let path = self.dir.join(sanitize_filename(&candidate.title));
        let outcome = match download(&encode_spaces(&candidate.url), &path).await {
            Ok(bytes) => {
                info!(bytes, "downloaded {} to {path:?}", candidate.url);
                FetchOutcome::Written(path)
            }
            Err(e) => {
                debug!("error downloading {}: {e:#}", candidate.url);
                FetchOutcome::Failed {
                    url: candidate.url.clone(),
                    reason: format!("{e:#}"),
                }
            }
        };
        Some(outcome)
    }

    /// Download every candidate. A failed download doesn't stop the others, and
    /// the outcomes are in the same order as the candidates.
    pub async fn fetch_all(&self, candidates: &[Candidate]) -> Vec<FetchOutcome> {
        stream::iter(candidates)
            .map(|candidate| self.fetch(candidate))
            .buffered(CONCURRENT_DOWNLOADS)
            .filter_map(future::ready)
            .collect()
            .await
    }
}

async fn download(url: &str, path: &Path) -> eyre::Result<usize> {
    let mut res = CLIENT.get(url).send().await?.error_for_status()?;

    let mut body_bytes = Vec::new();
    while let Some(chunk) = res.chunk().await? {
        body_bytes.extend_from_slice(&chunk);
    }

    tokio::fs::write(path, &body_bytes).await?;
    Ok(body_bytes.len())
}

/// Turn a title into a filename that's safe everywhere, like
/// `Intro: Algorithms?` -> `Intro_Algorithms_.pdf`.
pub fn sanitize_filename(title: &str) -> String {
    let name = regex!(r"[^0-9A-Za-z.\-]").replace_all(title, "_");
    let name = regex!(r"_{2,}").replace_all(&name, "_");
    format!("{}.pdf", name.trim())
}
