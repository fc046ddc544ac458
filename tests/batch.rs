use std::collections::HashMap;

use fast_bleu::{Bleu, BleuConfig, BleuError, ReferenceSet, Scorer, SmoothingFunction, Weights};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const VOCAB: &[&str] = &["the", "a", "cat", "dog", "sat", "ran", "on", "mat", "down", "fast"];

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn toks(s: &str) -> Vec<String> {
    s.split_whitespace().map(String::from).collect()
}

fn random_sentence(rng: &mut StdRng, max_len: usize) -> Vec<String> {
    let len = rng.gen_range(0..=max_len);
    (0..len)
        .map(|_| VOCAB.choose(rng).copied().unwrap_or("the").to_string())
        .collect()
}

fn corpus() -> Vec<Vec<String>> {
    vec![
        toks("the cat sat on the mat"),
        toks("a cat sat on a mat"),
        toks("the dog ran down the mat fast"),
        toks("a dog sat"),
    ]
}

/// Clipped matches recomputed from scratch against every reference.
fn naive_matches(references: &[Vec<String>], candidate: &[String], n: usize) -> u32 {
    let count = |tokens: &[String]| {
        let mut counts: HashMap<Vec<String>, u32> = HashMap::new();
        for window in tokens.windows(n) {
            *counts.entry(window.to_vec()).or_default() += 1;
        }
        counts
    };
    let reference_counts: Vec<_> = references.iter().map(|r| count(r.as_slice())).collect();
    count(candidate)
        .into_iter()
        .map(|(ngram, c)| {
            let ceiling = reference_counts
                .iter()
                .map(|rc| rc.get(&ngram).copied().unwrap_or(0))
                .max()
                .unwrap_or(0);
            c.min(ceiling)
        })
        .sum()
}

#[test]
fn stored_references_score_one_without_smoothing() {
    init_logging();
    for max_n in 1..=3 {
        let config = BleuConfig::new()
            .weights(vec![Weights::uniform(max_n)])
            .smoothing(0)
            .n_cores(2)
            .verbose(true);
        let bleu = Bleu::new(corpus(), config).unwrap();
        let scores = bleu.get_score(&corpus()).unwrap();
        for (reference, row) in corpus().iter().zip(&scores) {
            assert!(
                (row[0] - 1.0).abs() < 1e-9,
                "{:?} scored {} at max_n {}",
                reference,
                row[0],
                max_n
            );
        }
    }
}

#[test]
fn empty_candidate_is_zero_for_every_variant() {
    for smoothing in 0..=7 {
        let config = BleuConfig::new()
            .weights(vec![Weights::uniform(1), Weights::uniform(2), Weights::uniform(4)])
            .smoothing(smoothing)
            .auto_reweight(smoothing % 2 == 0)
            .n_cores(1);
        let bleu = Bleu::new(corpus(), config).unwrap();
        let empty: Vec<String> = Vec::new();
        assert_eq!(bleu.get_score(&[empty]).unwrap(), vec![vec![0.0, 0.0, 0.0]]);
    }
}

#[test]
fn insertion_order_does_not_change_ceilings() {
    let mut rng = StdRng::seed_from_u64(7);
    let references: Vec<Vec<String>> = (0..12).map(|_| random_sentence(&mut rng, 9)).collect();
    let built = ReferenceSet::build(references.clone(), 4).unwrap();
    for _ in 0..10 {
        let mut shuffled = references.clone();
        shuffled.shuffle(&mut rng);
        let mut appended = ReferenceSet::new(4).unwrap();
        for reference in shuffled {
            appended.append(reference).unwrap();
        }
        for order in 1..=4 {
            assert_eq!(built.ceiling(order).unwrap(), appended.ceiling(order).unwrap());
        }
        let mut lengths = appended.lengths().to_vec();
        let mut expected = built.lengths().to_vec();
        lengths.sort_unstable();
        expected.sort_unstable();
        assert_eq!(lengths, expected);
    }
}

#[test]
fn clipped_counts_match_naive_recount() {
    let mut rng = StdRng::seed_from_u64(11);
    let references: Vec<Vec<String>> = (0..6).map(|_| random_sentence(&mut rng, 12)).collect();
    let set = ReferenceSet::build(references.clone(), 4).unwrap();
    let scorer = Scorer::new(&set, SmoothingFunction::None, 4, false).unwrap();
    for _ in 0..50 {
        let candidate = random_sentence(&mut rng, 12);
        let counts = scorer.order_counts(&candidate).unwrap();
        for (i, c) in counts.iter().enumerate() {
            let n = i + 1;
            assert_eq!(c.numerator, naive_matches(&references, &candidate, n));
            assert_eq!(c.denominator as usize, candidate.len().saturating_sub(n - 1));
        }
    }
}

#[test]
fn parallel_results_match_sequential_in_input_order() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(3);
    let candidates: Vec<Vec<String>> = (0..200).map(|_| random_sentence(&mut rng, 10)).collect();
    for smoothing in 0..=7 {
        let config = |n_cores| {
            BleuConfig::new()
                .weights(vec![
                    Weights::named("bigram", vec![0.5, 0.5]),
                    Weights::uniform(4),
                    Weights::new(vec![0.1, 0.0, 0.9]),
                ])
                .smoothing(smoothing)
                .auto_reweight(true)
                .n_cores(n_cores)
        };
        let sequential = Bleu::new(corpus(), config(1)).unwrap().get_score(&candidates).unwrap();
        let parallel = Bleu::new(corpus(), config(8)).unwrap().get_score(&candidates).unwrap();
        assert_eq!(sequential.len(), candidates.len());
        assert_eq!(sequential, parallel, "smoothing {}", smoothing);
        for (candidate, row) in candidates.iter().zip(&sequential) {
            assert_eq!(row.len(), 3);
            for &score in row {
                assert!(score.is_finite() && (0.0..=1.0).contains(&score), "{:?}: {}", candidate, score);
            }
        }
    }
}

#[test]
fn appended_references_affect_later_calls() {
    let config = BleuConfig::new().weights(vec![Weights::uniform(2)]).smoothing(0).n_cores(1);
    let mut bleu = Bleu::new(vec![toks("the cat sat")], config).unwrap();
    let candidate = toks("a dog ran");
    assert_eq!(bleu.get_score(&[candidate.clone()]).unwrap()[0][0], 0.0);
    bleu.append_reference(toks("a dog ran")).unwrap();
    let score = bleu.get_score(&[candidate]).unwrap()[0][0];
    assert!((score - 1.0).abs() < 1e-9);
}

#[test]
fn negative_weights_are_rejected() {
    let config = BleuConfig::new().weights(vec![vec![0.5, -0.1]]);
    match Bleu::new(corpus(), config) {
        Err(err @ BleuError::NegativeWeight { .. }) => assert!(!err.is_configuration()),
        Err(other) => panic!("unexpected error {}", other),
        Ok(_) => panic!("negative weight accepted"),
    }
}
