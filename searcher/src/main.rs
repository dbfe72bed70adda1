use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use search_core::dedup::remove_duplicates;
use search_core::process_queries::process_queries;
use search_core::tokenizer::split_into_words;
use search_core::{DocId, DocumentStatus, EngineConfig, ExecutionPolicy, SearchEngine};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct InputDoc {
    id: DocId,
    text: String,
    #[serde(default)]
    status: DocumentStatus,
    #[serde(default)]
    ratings: Vec<i32>,
}

#[derive(Parser)]
#[command(name = "searcher")]
#[command(about = "Rank in-memory documents with TF-IDF and plus/minus queries", long_about = None)]
struct Cli {
    /// Worker threads for parallel execution (defaults to one per core)
    #[arg(long, global = true)]
    threads: Option<usize>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct CorpusArgs {
    /// Input path (JSON / JSONL file or a directory of them)
    #[arg(long)]
    input: String,
    /// Space-separated stop words
    #[arg(long, default_value = "")]
    stop_words: String,
    /// Shards in the parallel ranking accumulator
    #[arg(long, default_value_t = search_core::engine::DEFAULT_SHARD_COUNT)]
    shards: usize,
    /// Remove documents whose word sets duplicate an earlier document
    #[arg(long, default_value_t = false)]
    dedup: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the top documents for each query as JSON lines
    Search {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Queries to run; `-word` excludes documents containing `word`
        #[arg(long, required = true)]
        query: Vec<String>,
        /// Only rank documents with this status
        #[arg(long, value_parser = parse_status, default_value = "actual")]
        status: DocumentStatus,
        /// Rank each query with the parallel accumulator
        #[arg(long, default_value_t = false)]
        parallel: bool,
    },
    /// Print the query words found in one document
    Match {
        #[command(flatten)]
        corpus: CorpusArgs,
        #[arg(long)]
        query: String,
        #[arg(long)]
        id: DocId,
        #[arg(long, default_value_t = false)]
        parallel: bool,
    },
}

/// Status names are the same snake_case strings the input documents use.
fn parse_status(name: &str) -> Result<DocumentStatus, String> {
    serde_json::from_value(serde_json::Value::String(name.to_string()))
        .map_err(|_| format!("unknown status `{name}`"))
}

#[derive(Serialize)]
struct SearchOutput<'a> {
    query: &'a str,
    results: Vec<search_core::Document>,
}

#[derive(Serialize)]
struct MatchOutput<'a> {
    id: DocId,
    words: Vec<&'a str>,
    status: Option<DocumentStatus>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("configure worker pool")?;
    }

    match cli.command {
        Commands::Search { corpus, query, status, parallel } => {
            let engine = load_engine(&corpus)?;
            let results = if !parallel && status == DocumentStatus::Actual {
                process_queries(&engine, &query)?
            } else {
                let policy = policy(parallel);
                query
                    .iter()
                    .map(|q| engine.find_top_documents(q, status, policy))
                    .collect::<Result<Vec<_>, _>>()?
            };
            for (q, results) in query.iter().zip(results) {
                println!("{}", serde_json::to_string(&SearchOutput { query: q, results })?);
            }
        }
        Commands::Match { corpus, query, id, parallel } => {
            let engine = load_engine(&corpus)?;
            let matched = engine.match_document(&query, id, policy(parallel))?;
            let output = match matched {
                Some(m) => MatchOutput { id, words: m.words, status: Some(m.status) },
                None => MatchOutput { id, words: Vec::new(), status: None },
            };
            println!("{}", serde_json::to_string(&output)?);
        }
    }
    Ok(())
}

fn policy(parallel: bool) -> ExecutionPolicy {
    if parallel {
        ExecutionPolicy::Parallel
    } else {
        ExecutionPolicy::Sequential
    }
}

fn load_engine(args: &CorpusArgs) -> Result<SearchEngine> {
    let stop_words = split_into_words(&args.stop_words);
    let config = EngineConfig { shard_count: args.shards };
    let mut engine =
        SearchEngine::with_config(stop_words, config).context("invalid stop words")?;

    for file in input_files(Path::new(&args.input)) {
        let docs = if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file)?
        } else {
            read_json(&file)?
        };
        for doc in docs {
            engine
                .add_document(doc.id, &doc.text, doc.status, &doc.ratings)
                .with_context(|| format!("add document {} from {}", doc.id, file.display()))?;
        }
    }
    tracing::info!(num_docs = engine.document_count(), input = %args.input, "ingested documents");

    if args.dedup {
        let removed = remove_duplicates(&mut engine);
        tracing::info!(
            removed = removed.len(),
            num_docs = engine.document_count(),
            "duplicates removed"
        );
    }
    Ok(engine)
}

fn input_files(input_path: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        let walker = WalkDir::new(input_path).sort_by_file_name();
        for entry in walker.into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    }
    files
}

fn read_jsonl(file: &Path) -> Result<Vec<InputDoc>> {
    let f = File::open(file).with_context(|| format!("open {}", file.display()))?;
    let mut docs = Vec::new();
    for line in BufReader::new(f).lines() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let doc = serde_json::from_str(&line).with_context(|| format!("parse {}", file.display()))?;
        docs.push(doc);
    }
    Ok(docs)
}

fn read_json(file: &Path) -> Result<Vec<InputDoc>> {
    let f = File::open(file).with_context(|| format!("open {}", file.display()))?;
    let json: serde_json::Value = serde_json::from_reader(BufReader::new(f))?;
    let docs = match json {
        serde_json::Value::Array(arr) => {
            arr.into_iter().map(serde_json::from_value).collect::<Result<Vec<InputDoc>, _>>()?
        }
        serde_json::Value::Object(_) => vec![serde_json::from_value(json)?],
        _ => Vec::new(),
    };
    Ok(docs)
}
