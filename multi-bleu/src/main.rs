use std::error::Error;
use std::fs;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;
use std::process::exit;

use clap::Parser;
use fast_bleu::{Bleu, BleuConfig, Weights};
use log::info;

#[derive(Parser, Debug)]
#[command(name = "multi-bleu")]
#[command(about = "Scores every hypothesis on stdin against all references")]
struct Args {
    /// Reference file stem; reads STEM, STEM0, STEM1, ... one reference per line
    stem: String,

    /// BLEU order with uniform weights, repeat for several variants
    #[arg(short, long = "ngram", default_value = "4")]
    ngrams: Vec<usize>,

    /// Smoothing method id (0-7)
    #[arg(short, long, default_value = "1")]
    smoothing: i64,

    /// Worker threads, defaults to the number of CPUs
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Drop orders longer than the hypothesis and renormalize the weights
    #[arg(long)]
    auto_reweight: bool,

    /// Print the mean score of every variant after the per-line scores
    #[arg(long)]
    summary: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn whitespace_tokenizer(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

fn read_references(stem: &str) -> io::Result<Vec<Vec<String>>> {
    let mut references = Vec::new();
    let mut paths = vec![stem.to_string()];
    let mut ref_index = 0;
    while Path::new(&format!("{}{}", stem, ref_index)).exists() {
        paths.push(format!("{}{}", stem, ref_index));
        ref_index += 1;
    }

    for path in paths.iter().filter(|p| Path::new(p).is_file()) {
        let text = fs::read_to_string(path)?;
        let before = references.len();
        references.extend(
            text.lines()
                .map(whitespace_tokenizer)
                .filter(|tokens| !tokens.is_empty()),
        );
        info!("read {} references from {}", references.len() - before, path);
    }
    Ok(references)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args = Args::parse();

    let references = read_references(&args.stem)?;
    if references.is_empty() {
        eprintln!("no references found for stem {}", args.stem);
        exit(1);
    }

    let mut config = BleuConfig::new()
        .weights(args.ngrams.iter().map(|&n| Weights::uniform(n)))
        .smoothing(args.smoothing)
        .auto_reweight(args.auto_reweight)
        .verbose(args.verbose);
    if let Some(jobs) = args.jobs {
        config = config.n_cores(jobs);
    }
    let bleu = Bleu::new(references, config)?;

    let stdin = io::stdin();
    let hypotheses = stdin
        .lock()
        .lines()
        .map(|line| line.map(|l| whitespace_tokenizer(&l)))
        .collect::<io::Result<Vec<_>>>()?;

    let scores = bleu.get_score(&hypotheses)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for row in &scores {
        let line: Vec<String> = row.iter().map(|s| format!("{:.6}", s)).collect();
        writeln!(out, "{}", line.join("\t"))?;
    }

    if args.summary && !scores.is_empty() {
        for (j, weights) in bleu.weights().iter().enumerate() {
            let mean = scores.iter().map(|row| row[j]).sum::<f64>() / scores.len() as f64;
            writeln!(
                out,
                "BLEU[{}] = {:.2} (hyps={}, refs={})",
                weights.name(),
                100.0 * mean,
                scores.len(),
                bleu.reference_count()
            )?;
        }
    }

    out.flush()?;
    Ok(())
}
