//! Minimal manual driver for exercising an index build and a query by hand.
//!
//! Positional arguments only, no flag parsing:
//!
//! ```text
//! bsbi-smoke index <data_dir> <output_dir> [standard|vbe]
//! bsbi-smoke query <output_dir> <tfidf|bm25> <query text...>
//! ```

use std::path::Path;
use std::process::ExitCode;

use bsbi_search::{bsbi::load_id_maps, Analyzer, Bm25Params, BsbiIndexer, IndexReader, PostingsEncoding};

fn main() -> ExitCode {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();

    let result = match args.get(1).map(String::as_str) {
        Some("index") => run_index(&args[2..]),
        Some("query") => run_query(&args[2..]),
        _ => {
            eprintln!("usage: bsbi-smoke index <data_dir> <output_dir> [standard|vbe]");
            eprintln!("       bsbi-smoke query <output_dir> <tfidf|bm25> <query text...>");
            return ExitCode::FAILURE;
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_index(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = args.first().ok_or("missing <data_dir>")?;
    let output_dir = args.get(1).ok_or("missing <output_dir>")?;
    let encoding = match args.get(2).map(String::as_str) {
        Some("standard") => PostingsEncoding::Standard,
        Some("vbe") | None => PostingsEncoding::Vbe,
        Some(other) => return Err(format!("unknown encoding '{other}'").into()),
    };

    let indexer = BsbiIndexer::new(Path::new(data_dir), Path::new(output_dir), encoding);
    let doc_count = indexer.build()?;
    println!("indexed {doc_count} documents into {output_dir}");
    Ok(())
}

fn run_query(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = args.first().ok_or("missing <output_dir>")?;
    let scheme = args.get(1).ok_or("missing <tfidf|bm25>")?;
    let query = args[2..].join(" ");
    if query.is_empty() {
        return Err("missing query text".into());
    }

    let output_dir = Path::new(output_dir);
    let (term_map, doc_map) = load_id_maps(output_dir)?;
    let encoding = bsbi_search::bsbi::load_encoding(output_dir)?;
    let analyzer = Analyzer::new();
    let mut reader = IndexReader::open(output_dir, "main_index", encoding)?;

    let results = match scheme.as_str() {
        "tfidf" => bsbi_search::retrieve_tfidf(&query, &analyzer, &term_map, &doc_map, &mut reader, 10)?,
        "bm25" => bsbi_search::retrieve_bm25(
            &query,
            &analyzer,
            &term_map,
            &doc_map,
            &mut reader,
            Bm25Params::default(),
            10,
        )?,
        other => return Err(format!("unknown scheme '{other}'").into()),
    };

    for (score, doc_path) in results {
        println!("{score:.5}\t{doc_path}");
    }
    Ok(())
}
