use std::{
    fmt,
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
    time::Instant,
};

use clap::Parser;
use eyre::{bail, eyre};
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    catalog::Catalog,
    config::{Config, DEFAULT_CONFIG_PATH},
    download::Fetcher,
    engines::{self, Candidate, Engine, SearchQuery},
};

/// Search the web for pdfs and optionally download them
#[derive(Parser, Debug)]
#[command(
    name = "pdfsearch",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH_SHORT"), ")")
)]
pub struct Cli {
    /// What to search for, or a catalog category optionally followed by the
    /// number of a title in it
    pub query: Vec<String>,

    /// Download the selected result, or the only one if there's just one
    #[arg(short, long)]
    pub download: bool,

    /// Download every result instead of choosing one
    #[arg(short, long, requires = "download")]
    pub all: bool,

    /// Choose the result with this number instead of asking
    #[arg(short, long, requires = "download", conflicts_with = "all")]
    pub pick: Option<usize>,

    /// The search engine to use (duckduckgo, brave, yahoo or bing-api)
    #[arg(short, long)]
    pub engine: Option<Engine>,

    /// Where downloaded pdfs are written
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Path to the config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// List the catalog categories and their titles
    #[arg(long)]
    pub list_categories: bool,

    /// Print how long searching and downloading took
    #[arg(long)]
    pub timing: bool,

    /// Show debug logs
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Resolved<'a> {
    Query(String),
    /// A category was given without saying which title, so the user has to
    /// choose one.
    Choose(&'a [String]),
}

/// Turn the query words into a query, looking up `<category> [number]` in the
/// catalog.
pub fn resolve_query<'a>(words: &[String], catalog: &'a Catalog) -> eyre::Result<Resolved<'a>> {
    let category_titles = match words {
        [category] | [category, _] => catalog
            .get(category)
            .map(|titles| (category.as_str(), titles)),
        _ => None,
    };

    let Some((category, titles)) = category_titles else {
        return Ok(Resolved::Query(words.join(" ").trim().to_string()));
    };
    if titles.is_empty() {
        bail!("Category {category:?} has no titles.");
    }

    match words {
        [_, selection] => {
            let index = parse_selection(selection, titles.len())?;
            Ok(Resolved::Query(titles[index].clone()))
        }
        _ => Ok(Resolved::Choose(titles)),
    }
}

/// Parse a 1-based selection into an index.
pub fn parse_selection(input: &str, len: usize) -> eyre::Result<usize> {
    let input = input.trim();
    let number = input
        .parse::<usize>()
        .map_err(|_| eyre!("Invalid selection {input:?}, expected a number."))?;
    check_selection(number, len)
}

pub fn check_selection(number: usize, len: usize) -> eyre::Result<usize> {
    if number == 0 || number > len {
        bail!("Selection {number} is out of range, expected 1 to {len}.");
    }
    Ok(number - 1)
}

/// Print the prompt and read one line with a selection.
pub fn read_selection<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    len: usize,
) -> eyre::Result<usize> {
    write!(output, "{prompt}")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("No selection given.");
    }
    parse_selection(&line, len)
}

/// Write each item on its own line as `<n>. <item>`, counting from 1.
pub fn write_numbered<W: Write, T: fmt::Display>(output: &mut W, items: &[T]) -> io::Result<()> {
    for (i, item) in items.iter().enumerate() {
        writeln!(output, "{}. {item}", i + 1)?;
    }
    Ok(())
}

/// Decide which results to download. Nothing is fetched until this succeeds,
/// so a bad selection never leaves a file behind.
pub fn download_selection<'a, R: BufRead, W: Write>(
    results: &'a [Candidate],
    all: bool,
    pick: Option<usize>,
    input: &mut R,
    output: &mut W,
) -> eyre::Result<&'a [Candidate]> {
    if all {
        return Ok(results);
    }
    let index = match pick {
        Some(number) => check_selection(number, results.len())?,
        None if results.len() == 1 => 0,
        None => read_selection(
            input,
            output,
            "Enter the number to download: ",
            results.len(),
        )?,
    };
    Ok(&results[index..=index])
}

fn print_categories(catalog: &Catalog) {
    if catalog.is_empty() {
        println!("The catalog is empty.");
        return;
    }
    for (category, titles) in catalog.iter() {
        println!("{category}:");
        for (i, title) in titles.iter().enumerate() {
            println!("  {}. {title}", i + 1);
        }
    }
}

pub async fn run(cli: Cli) -> eyre::Result<()> {
    let config = Arc::new(Config::read(&cli.config)?);

    if cli.list_categories {
        print_categories(&config.catalog);
        return Ok(());
    }

    let engine = cli.engine.unwrap_or_else(|| config.engine());
    let download_dir = cli
        .output_dir
        .clone()
        .unwrap_or_else(|| config.download_dir().to_path_buf());

    let query = match resolve_query(&cli.query, &config.catalog)? {
        Resolved::Query(query) => query,
        Resolved::Choose(titles) => {
            println!("Titles:");
            write_numbered(&mut io::stdout(), titles)?;
            let index = read_selection(
                &mut io::stdin().lock(),
                &mut io::stdout(),
                "Enter the number of the title to search for: ",
                titles.len(),
            )?;
            titles[index].clone()
        }
    };
    if query.is_empty() {
        bail!("Please provide a search query.");
    }

    let query = SearchQuery::new(query, engine, config.clone(), &mut StdRng::from_entropy());
    println!("Searching {engine} for {:?}...", query.query);
    let start = Instant::now();
    let results = engines::search(&query).await;
    if cli.timing {
        println!("Search took {} ms", start.elapsed().as_millis());
    }

    if results.is_empty() {
        println!("No PDFs found.");
        return Ok(());
    }
    println!("Found PDFs:");
    write_numbered(&mut io::stdout(), &results)?;

    if !cli.download {
        return Ok(());
    }

    let selected = download_selection(
        &results,
        cli.all,
        cli.pick,
        &mut io::stdin().lock(),
        &mut io::stdout(),
    )?;

    let fetcher = Fetcher::new(download_dir);
    println!("Downloading to {}", fetcher.dir().display());
    let start = Instant::now();
    let outcomes = fetcher.fetch_all(selected).await;
    for outcome in &outcomes {
        println!("{outcome}");
    }
    if cli.timing {
        println!("Download took {} ms", start.elapsed().as_millis());
    }

    Ok(())
}
