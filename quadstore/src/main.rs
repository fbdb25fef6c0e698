#![cfg_attr(test, allow(clippy::disallowed_methods))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
//! Command-line driver for a log-backed quad store.
//!
//! ```text
//! quadstore put S P O [G]
//! quadstore del S P O [G]
//! quadstore get [S|_] [P|_] [O|_] [G|_] [--limit N] [--offset N] [--reverse]
//!               [--range ROLE:OP:VALUE]
//! quadstore size [S|_] [P|_] [O|_] [G|_]
//! quadstore index NAME [--gt K] [--gte K] [--lt K] [--lte K] [--limit N] [--offset N]
//!                      [--reverse]
//! quadstore import        (JSON objects, one per line, on stdin)
//! ```
//!
//! The log file is `QUADSTORE_DATA_FILE`, which must be set; the remaining
//! `QUADSTORE_*` variables configure the store.

use std::process::ExitCode;

use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use quadstore::{
    BackendError, IndexQuery, LogBackend, Match, MatchTerms, Quad, QuadStore, QueryOptions,
    RangeFilter, RangeTest, StoreConfig, StoreError, TermRole, WriteOptions,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug)]
enum Command {
    Put(Quad),
    Del(Quad),
    Get(MatchTerms, QueryOptions),
    Size(MatchTerms),
    Index(String, IndexQuery),
    Import,
}

fn usage() -> String {
    "usage: quadstore <put|del|get|size|index|import> [args]".to_owned()
}

fn parse_quad(args: &[String]) -> Result<Quad, String> {
    match args {
        [s, p, o] => Ok(Quad::triple(s.as_str(), p.as_str(), o.as_str())),
        [s, p, o, g] => Ok(Quad::new(s.as_str(), p.as_str(), o.as_str(), g.as_str())),
        _ => Err("expected S P O [G]".to_owned()),
    }
}

fn parse_role(name: &str) -> Result<TermRole, String> {
    TermRole::ALL
        .into_iter()
        .find(|role| role.as_str() == name || name == "graph" && *role == TermRole::Context)
        .ok_or_else(|| format!("unknown role '{name}'"))
}

fn parse_number(flag: &str, value: Option<&String>) -> Result<usize, String> {
    value
        .ok_or_else(|| format!("{flag} needs a value"))?
        .parse()
        .map_err(|_| format!("{flag} needs a number"))
}

/// Positional terms (`_` for unbound) followed by flags.
fn parse_pattern(args: &[String]) -> Result<(MatchTerms, QueryOptions), String> {
    let mut terms = MatchTerms::new();
    let mut options = QueryOptions::default();
    let mut ranges: Vec<(TermRole, RangeFilter)> = Vec::new();
    let mut positional = TermRole::ALL.into_iter();
    let mut args = args.iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--limit" => options.limit = Some(parse_number("--limit", args.next())?),
            "--offset" => options.offset = parse_number("--offset", args.next())?,
            "--reverse" => options.reverse = true,
            "--range" => {
                let raw = args.next().ok_or("--range needs ROLE:OP:VALUE")?;
                let mut parts = raw.splitn(3, ':');
                let (Some(role), Some(op), Some(value)) = (parts.next(), parts.next(), parts.next())
                else {
                    return Err(format!("malformed range '{raw}'"));
                };
                let test: RangeTest = op.parse().map_err(|e| format!("{e}"))?;
                ranges.push((parse_role(role)?, RangeFilter::new(test, value)));
            }
            term => {
                let role = positional
                    .next()
                    .ok_or_else(|| format!("unexpected argument '{term}'"))?;
                if term != "_" {
                    terms = terms.with(role, Match::Exact(term.to_owned()));
                }
            }
        }
    }

    for (role, filter) in ranges {
        let mut filters = match terms.get(role) {
            Match::Range(filters) => filters.clone(),
            _ => Vec::new(),
        };
        filters.push(filter);
        terms = terms.with(role, Match::Range(filters));
    }
    Ok((terms, options))
}

fn parse_index_query(args: &[String]) -> Result<IndexQuery, String> {
    let mut query = IndexQuery::default();
    let mut args = args.iter();
    while let Some(flag) = args.next() {
        if flag == "--reverse" {
            query.options.reverse = true;
            continue;
        }
        let value = args
            .next()
            .cloned()
            .ok_or_else(|| format!("{flag} needs a value"))?;
        match flag.as_str() {
            "--gt" => query.gt = Some(value),
            "--gte" => query.gte = Some(value),
            "--lt" => query.lt = Some(value),
            "--lte" => query.lte = Some(value),
            "--limit" => query.options.limit = Some(parse_number("--limit", Some(&value))?),
            "--offset" => query.options.offset = parse_number("--offset", Some(&value))?,
            other => return Err(format!("unknown flag '{other}'")),
        }
    }
    Ok(query)
}

fn parse_command(args: &[String]) -> Result<Command, String> {
    let (name, rest) = args.split_first().ok_or_else(usage)?;
    match name.as_str() {
        "put" => Ok(Command::Put(parse_quad(rest)?)),
        "del" => Ok(Command::Del(parse_quad(rest)?)),
        "get" => {
            let (terms, options) = parse_pattern(rest)?;
            Ok(Command::Get(terms, options))
        }
        "size" => Ok(Command::Size(parse_pattern(rest)?.0)),
        "index" => {
            let (index, flags) = rest.split_first().ok_or("index needs a NAME")?;
            Ok(Command::Index(index.clone(), parse_index_query(flags)?))
        }
        "import" => Ok(Command::Import),
        _ => Err(usage()),
    }
}

async fn print_quads(
    mut quads: quadstore::QuadStream,
    context_key: &str,
) -> Result<(), StoreError> {
    while let Some(quad) = quads.try_next().await? {
        println!("{}", quad.to_json(context_key));
    }
    Ok(())
}

/// Quads read from stdin, one JSON object per line. Blank lines are skipped.
fn stdin_quads(context_key: String) -> impl Stream<Item = Result<Quad, StoreError>> {
    let lines = BufReader::new(tokio::io::stdin()).lines();
    stream::unfold(lines, |mut lines| async move {
        lines.next_line().await.transpose().map(|line| (line, lines))
    })
    .try_filter(|line| futures::future::ready(!line.trim().is_empty()))
    .map(move |line| -> Result<Quad, StoreError> {
        let line = line.map_err(BackendError::Io)?;
        let value: serde_json::Value = serde_json::from_str(&line)
            .map_err(|e| StoreError::InvalidArgument(format!("malformed JSON: {e}")))?;
        Quad::from_json(&value, &context_key)
            .ok_or_else(|| StoreError::InvalidArgument(format!("not a quad: {line}")))
    })
}

async fn run(store: &QuadStore<LogBackend>, command: Command) -> Result<(), StoreError> {
    let context_key = store.config().context_key.clone();
    match command {
        Command::Put(quad) => store.put(&[quad]).await,
        Command::Del(quad) => store.del(quad).await,
        Command::Get(terms, options) => {
            print_quads(store.get_stream(&terms, &options)?, &context_key).await
        }
        Command::Size(terms) => {
            println!("{}", store.get_approximate_size(&terms).await?);
            Ok(())
        }
        Command::Index(name, query) => {
            print_quads(store.get_by_index_stream(&name, &query)?, &context_key).await
        }
        Command::Import => {
            let written = store.put_stream(stdin_quads(context_key)).await?;
            tracing::info!(written, "import finished");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quadstore=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_command(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    let (config, data_file) = match StoreConfig::from_env()
        .and_then(|config| Ok((config, quadstore::config::data_file_from_env()?)))
    {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let backend = match LogBackend::open(&data_file).await {
        Ok(backend) => backend,
        Err(e) => {
            tracing::error!("Failed to open {}: {e}", data_file.display());
            return ExitCode::FAILURE;
        }
    };
    let store = match QuadStore::new(backend, config) {
        Ok(store) => store.with_write_options(WriteOptions { sync: true }),
        Err(e) => {
            tracing::error!("Failed to create store: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = run(&store, command).await;
    if let Err(e) = store.close().await {
        tracing::error!("Failed to close store: {e}");
    }
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
