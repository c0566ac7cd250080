use std::sync::Arc;

use quarry_matching::{
    Diagnostic, MatchingConfig, MatchingQueryTerms, MatchingTerm, PostingListManager, QueryTerm,
    ResultSet, Searcher, Strategy, ops::OrIterator, parse_query,
};
use quarry_postings::{
    CompressionConfig, END_OF_LIST, Index, IndexBuilder, IndexBuilderConfig, IndexDocument,
    PostingIterator,
};

const STRATEGIES: [Strategy; 2] = [Strategy::Daat, Strategy::Taat];

fn build(texts: &[&str], blocks: bool) -> Arc<Index> {
    let mut builder = IndexBuilder::new(IndexBuilderConfig {
        blocks,
        ..Default::default()
    })
    .unwrap();
    for (i, text) in texts.iter().enumerate() {
        let tokens = text.split_whitespace().collect::<Vec<_>>();
        builder
            .add_document(&IndexDocument::new(format!("d{i}"), &tokens))
            .unwrap();
    }
    Arc::new(builder.build().unwrap())
}

fn searcher(index: &Arc<Index>, config: MatchingConfig) -> Searcher {
    Searcher::new(index.clone(), config).unwrap()
}

fn dl(strategy: Strategy) -> MatchingConfig {
    MatchingConfig::default()
        .with_model("Dl")
        .with_strategy(strategy)
        .with_result_set_size(0)
}

fn sorted_ids(result: &ResultSet) -> Vec<u32> {
    let mut ids = result.doc_ids.clone();
    ids.sort_unstable();
    ids
}

#[test]
fn test_and_intersection() {
    let texts = (0..8)
        .map(|i| {
            let mut text = String::from("z");
            if [1, 3, 5].contains(&i) {
                text.push_str(" a");
            }
            if [3, 5, 7].contains(&i) {
                text.push_str(" b");
            }
            text
        })
        .collect::<Vec<_>>();
    let texts = texts.iter().map(String::as_str).collect::<Vec<_>>();
    for blocks in [false, true] {
        let index = build(&texts, blocks);
        for strategy in STRATEGIES {
            let result = searcher(&index, dl(strategy)).search("q", "#band(a b)").unwrap();
            assert_eq!(sorted_ids(&result), vec![3, 5], "{strategy:?}");
            assert_eq!(result.scores, vec![1.0, 1.0]);
            assert_eq!(result.exact_result_size, 2);
        }
    }
}

#[test]
fn test_synonym_merge() {
    let index = build(&["z", "a a b b b", "b"], true);
    let query = parse_query("q", "#syn(a b)").unwrap();
    let manager = PostingListManager::new(&index, &query, &dl(Strategy::Daat)).unwrap();
    let statistics = &manager.term(0).statistics;
    // Alternatives are merged additively, even where they share a document.
    assert_eq!(statistics.document_frequency, 3);
    assert_eq!(statistics.collection_frequency, 6);
    assert_eq!(statistics.max_tf, 5);

    // The union itself touches two distinct documents.
    let mut union = OrIterator::new(vec![
        index.term_postings("a").unwrap(),
        index.term_postings("b").unwrap(),
    ]);
    while union.next().unwrap() != END_OF_LIST {}
    assert_eq!(union.documents_matched(), 2);

    for strategy in STRATEGIES {
        let result = searcher(&index, dl(strategy)).search("q", "#syn(a b)").unwrap();
        assert_eq!(result.doc_ids, vec![1, 2]);
        assert_eq!(result.scores, vec![5.0, 1.0]);
    }
}

#[test]
fn test_synonym_frequency_above_collection_size() {
    let index = build(&["a b x", "a b y", "a z", "b w"], true);
    for strategy in STRATEGIES {
        let searcher = searcher(&index, MatchingConfig::default().with_strategy(strategy));
        assert_eq!(sorted_ids(&searcher.search("q", "a").unwrap()), vec![0, 1, 2]);

        let result = searcher.search("q", "#syn(a b)").unwrap();
        assert_eq!(sorted_ids(&result), vec![0, 1, 2, 3], "{strategy:?}");
        assert_eq!(result.exact_result_size, 4);
        assert!(result.scores.iter().all(|score| score.is_finite()));
        assert!(result.diagnostics.contains(&Diagnostic::DocumentFrequencyCapped {
            term: "#syn(a b)".into(),
            document_frequency: 6,
            number_of_documents: 4,
        }));
    }
}

#[test]
fn test_positional_operators() {
    let index = build(
        &["quick brown fox", "brown quick fox", "quick red brown", "fox"],
        true,
    );
    for strategy in STRATEGIES {
        let searcher = searcher(&index, dl(strategy));
        let ids = |text: &str| sorted_ids(&searcher.search("q", text).unwrap());
        assert_eq!(ids("\"quick brown\""), vec![0]);
        assert_eq!(ids("#1(quick brown)"), vec![0]);
        assert_eq!(ids("#o2(quick brown)"), vec![0, 2]);
        assert_eq!(ids("\"quick brown\"~2"), vec![0, 1]);
        assert_eq!(ids("#uw3(quick brown)"), vec![0, 1, 2]);
        assert_eq!(ids("#band(quick brown)"), vec![0, 1, 2]);
        assert_eq!(ids("\"brown fox\""), vec![0]);
    }

    let query = parse_query("q", "\"quick brown\"").unwrap();
    let manager = PostingListManager::new(&index, &query, &dl(Strategy::Daat)).unwrap();
    assert_eq!(manager.term(0).statistics.document_frequency, 1);
    assert_eq!(manager.term(0).statistics.collection_frequency, 1);
}

#[test]
fn test_phrase_needs_positions() {
    let index = build(&["quick brown fox"], false);
    let err = searcher(&index, dl(Strategy::Daat))
        .search("q", "\"quick brown\"")
        .unwrap_err();
    assert!(err.is_unsupported_query(), "{err}");
}

#[test]
fn test_operator_with_missing_children() {
    let index = build(&["quick brown fox", "lazy dog"], true);
    let searcher = searcher(&index, dl(Strategy::Daat));

    let result = searcher.search("q", "#syn(fox unicorn)").unwrap();
    assert_eq!(result.doc_ids, vec![0]);
    assert!(result.diagnostics.contains(&Diagnostic::TermNotFound {
        term: "unicorn".into()
    }));

    let result = searcher.search("q", "#band(unicorn pegasus) dog").unwrap();
    assert_eq!(result.doc_ids, vec![1]);
    assert!(result.diagnostics.contains(&Diagnostic::OperatorDropped {
        term: "#band(unicorn pegasus)".into()
    }));
}

#[test]
fn test_nested_operators_fail() {
    let index = build(&["a b c"], true);
    let searcher = searcher(&index, dl(Strategy::Daat));
    assert!(
        searcher
            .search("q", "#syn(a #band(b c))")
            .unwrap_err()
            .is_unsupported_query()
    );

    let nested = QueryTerm::compound(
        quarry_matching::query::Operator::Synonym,
        vec![QueryTerm::single("a"), QueryTerm::and(["b", "c"])],
    );
    let query = MatchingQueryTerms::new("q").with_term(MatchingTerm::new(nested));
    assert!(searcher.search_terms(&query).unwrap_err().is_unsupported_query());
}

#[test]
fn test_required_and_excluded_terms() {
    let index = build(&["fox dog", "fox", "dog", "fox fox cat"], true);
    for strategy in STRATEGIES {
        let searcher = searcher(&index, dl(strategy));

        let result = searcher.search("q", "fox -dog").unwrap();
        assert_eq!(result.doc_ids, vec![3, 1]);
        assert_eq!(result.exact_result_size, 2);

        let result = searcher.search("q", "+fox cat").unwrap();
        assert_eq!(result.doc_ids, vec![3, 0, 1]);
        assert_eq!(result.scores, vec![3.0, 1.0, 1.0]);
        assert_eq!(result.occurrences, vec![0b11, 0b01, 0b01]);

        let result = searcher.search("q", "+cat fox").unwrap();
        assert_eq!(result.doc_ids, vec![3]);

        assert!(searcher.search("q", "-dog").unwrap().is_empty());

        let result = searcher.search("q", "+unicorn fox").unwrap();
        assert!(result.is_empty());
        assert!(result.diagnostics.contains(&Diagnostic::RequiredTermMissing {
            term: "unicorn".into()
        }));
    }
}

#[test]
fn test_required_term_after_sixteen_optional() {
    let terms = (0..17).map(|i| format!("t{i}")).collect::<Vec<_>>();
    let all = terms.join(" ");
    let index = build(&[all.as_str(), "t0 t1"], true);
    let optional = terms[..16].join(" ");
    let required = terms.iter().map(|t| format!("+{t}")).collect::<Vec<_>>().join(" ");
    for strategy in STRATEGIES {
        let searcher = searcher(&index, dl(strategy));
        let result = searcher.search("q", &format!("{optional} +t16")).unwrap();
        assert_eq!(result.doc_ids, vec![0], "{strategy:?}");
        assert_eq!(result.scores, vec![17.0]);
        // The required term holds the first bit; t15 is past the tracked terms.
        assert_eq!(result.occurrences, vec![u16::MAX]);

        let err = searcher.search("q", &required).unwrap_err();
        assert!(err.is_unsupported_query(), "{err}");
        let sixteen = &terms[..16].iter().map(|t| format!("+{t}")).collect::<Vec<_>>();
        let result = searcher.search("q", &sixteen.join(" ")).unwrap();
        assert_eq!(result.doc_ids, vec![0]);
    }
}

#[test]
fn test_empty_query_policy() {
    let index = build(&["fox dog", "fox", "dog", "cat"], true);
    for strategy in STRATEGIES {
        let matching_all = searcher(&index, dl(strategy).with_match_empty_query(true));
        for text in ["", "unicorn pegasus"] {
            let result = matching_all.search("q", text).unwrap();
            assert_eq!(result.len(), 4);
            assert_eq!(result.exact_result_size, 4);
            assert!(!result.is_truncated());
        }

        let result = searcher(&index, dl(strategy))
            .search("q", "unicorn pegasus")
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(result.diagnostics.len(), 2);
    }
}

#[test]
fn test_document_frequency_guard() {
    let index = build(&["fox dog", "fox", "dog", "fox fox cat"], true);
    let config = MatchingConfig {
        df_guard_ratio: 0.5,
        ..dl(Strategy::Daat)
    };
    let result = searcher(&index, config).search("q", "fox cat").unwrap();
    assert_eq!(result.doc_ids, vec![3]);
    assert!(result.diagnostics.contains(&Diagnostic::DocumentFrequencyGuard {
        term: "fox".into(),
        document_frequency: 3,
        number_of_documents: 4,
    }));
}

#[test]
fn test_field_restriction() {
    let mut builder = IndexBuilder::new(IndexBuilderConfig {
        field_names: vec!["title".into(), "body".into()],
        ..Default::default()
    })
    .unwrap();
    let documents = [
        (vec!["fox"], vec!["dog"]),
        (vec!["dog"], vec!["fox", "fox"]),
        (vec!["cat"], vec!["cat"]),
    ];
    for (i, (title, body)) in documents.iter().enumerate() {
        builder
            .add_document(&IndexDocument {
                docno: format!("d{i}"),
                fields: vec![
                    title.iter().map(|t| t.to_string()).collect(),
                    body.iter().map(|t| t.to_string()).collect(),
                ],
            })
            .unwrap();
    }
    let index = Arc::new(builder.build().unwrap());

    for strategy in STRATEGIES {
        let searcher = searcher(&index, dl(strategy));
        let result = searcher.search("q", "title:fox").unwrap();
        assert_eq!(result.doc_ids, vec![0]);
        let result = searcher.search("q", "body:fox").unwrap();
        assert_eq!(result.doc_ids, vec![1]);
        assert_eq!(result.scores, vec![2.0]);

        let result = searcher.search("q", "anchor:fox").unwrap();
        assert!(result.is_empty());
        assert!(result.diagnostics.contains(&Diagnostic::FieldNotFound {
            term: "anchor:fox".into(),
            field: "anchor".into(),
        }));
    }

    let query = parse_query("q", "body:fox").unwrap();
    let manager = PostingListManager::new(&index, &query, &dl(Strategy::Daat)).unwrap();
    assert_eq!(manager.term(0).statistics.collection_frequency, 2);
}

#[test]
fn test_truncation() {
    let index = build(&["a", "a a", "a a a", "a a a a", "b"], true);
    for strategy in STRATEGIES {
        let config = dl(strategy).with_result_set_size(2);
        let result = searcher(&index, config).search("q", "a").unwrap();
        assert_eq!(result.doc_ids, vec![3, 2]);
        assert_eq!(result.exact_result_size, 4);
        assert!(result.is_truncated());
    }
}

fn random_corpus(rng: &mut fastrand::Rng) -> Vec<String> {
    (0..400)
        .map(|_| {
            let length = rng.usize(1..40);
            (0..length)
                .map(|_| {
                    let bound = rng.usize(1..20);
                    format!("t{}", rng.usize(0..bound))
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

#[test]
fn test_taat_daat_equivalence() {
    let mut rng = fastrand::Rng::with_seed(42);
    let corpus = random_corpus(&mut rng);
    let texts = corpus.iter().map(String::as_str).collect::<Vec<_>>();
    let index = build(&texts, true);

    let queries = [
        "t0 t1 t2",
        "t3^2 t5 -t1",
        "+t0 t4 t7",
        "#syn(t2 t9) t1",
        "\"t0 t1\" t3",
        "#uw6(t1 t2) t0",
        "#band(t0 t3) t8",
        "t19 t18 missing",
        "-t0 t1",
        "t11 t12 t13 t14 t15 t16 t17",
    ];
    for model in ["BM25", "PL2", "DPH", "DirichletLM", "In_expB2", "TF_IDF", "DLH13"] {
        for result_set_size in [0, 10] {
            let config = MatchingConfig::default()
                .with_model(model)
                .with_result_set_size(result_set_size);
            let daat = searcher(&index, config.clone().with_strategy(Strategy::Daat));
            let taat = searcher(&index, config.with_strategy(Strategy::Taat));
            for text in queries {
                let d = daat.search("q", text).unwrap();
                let t = taat.search("q", text).unwrap();
                let context = format!("{model} '{text}' size {result_set_size}");
                assert_eq!(d.doc_ids, t.doc_ids, "{context}");
                assert_eq!(d.occurrences, t.occurrences, "{context}");
                assert_eq!(d.exact_result_size, t.exact_result_size, "{context}");
                for (a, b) in d.scores.iter().zip(&t.scores) {
                    assert!((a - b).abs() <= 1e-9 * a.abs().max(1.0), "{context}: {a} vs {b}");
                }
            }
        }
    }
}

#[test]
fn test_persisted_index_matches_in_memory() {
    let mut rng = fastrand::Rng::with_seed(5);
    let corpus = random_corpus(&mut rng);
    let mut builder = IndexBuilder::new(IndexBuilderConfig {
        compression: CompressionConfig::chunked(quarry_compression::CodecKind::PFor),
        ..Default::default()
    })
    .unwrap();
    for (i, text) in corpus.iter().enumerate() {
        let tokens = text.split_whitespace().collect::<Vec<_>>();
        builder
            .add_document(&IndexDocument::new(format!("d{i}"), &tokens))
            .unwrap();
    }
    let memory = Arc::new(builder.build().unwrap());
    let dir = tempfile::tempdir().unwrap();
    memory.write(dir.path()).unwrap();
    let disk = Arc::new(Index::open(dir.path()).unwrap());

    let config = MatchingConfig::default().with_model("PL2");
    for text in ["t0 t1 t2", "\"t0 t1\" +t2", "#syn(t3 t4) -t0"] {
        let expected = searcher(&memory, config.clone()).search("q", text).unwrap();
        let actual = searcher(&disk, config.clone()).search("q", text).unwrap();
        assert_eq!(expected, actual, "{text}");
    }
}
