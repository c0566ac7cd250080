use quarry_compression::CodecKind;
use quarry_postings::{
    CompressionConfig, END_OF_LIST, Index, IndexBuilder, IndexBuilderConfig, IndexDocument,
    PostingIterator, StorageMode,
};

fn documents() -> Vec<IndexDocument> {
    vec![
        IndexDocument {
            docno: "d0".into(),
            fields: vec![
                vec!["quick".into(), "fox".into()],
                vec!["the".into(), "quick".into(), "brown".into(), "fox".into()],
            ],
        },
        IndexDocument {
            docno: "d1".into(),
            fields: vec![vec![], vec![]],
        },
        IndexDocument {
            docno: "d2".into(),
            fields: vec![
                vec!["lazy".into(), "dog".into()],
                vec!["the".into(), "fox".into(), "".into(), "jumps".into()],
            ],
        },
    ]
}

fn build(compression: CompressionConfig) -> Index {
    let mut builder = IndexBuilder::new(IndexBuilderConfig {
        compression,
        blocks: true,
        field_names: vec!["title".into(), "body".into()],
        direct: true,
    })
    .unwrap();
    for (i, document) in documents().iter().enumerate() {
        assert_eq!(builder.add_document(document).unwrap(), i as u32);
    }
    builder.build().unwrap()
}

fn drain(mut it: Box<dyn PostingIterator>) -> Vec<(u32, u32, Vec<u32>, Vec<u32>)> {
    let mut out = Vec::new();
    while it.next().unwrap() != END_OF_LIST {
        out.push((
            it.id(),
            it.frequency(),
            it.positions().to_vec(),
            it.field_frequencies().to_vec(),
        ));
    }
    out
}

#[test]
fn test_statistics() {
    let index = build(CompressionConfig::default());
    let stats = index.collection_statistics();
    assert_eq!(stats.number_of_documents, 3);
    assert_eq!(stats.number_of_tokens, 11);
    assert_eq!(stats.number_of_unique_terms, 7);
    assert_eq!(stats.field_tokens, vec![4, 7]);
    assert_eq!(stats.number_of_postings, 9);

    let fox = index.lexicon().get("fox").unwrap();
    assert_eq!(fox.document_frequency(), 2);
    assert_eq!(fox.collection_frequency(), 3);
    assert_eq!(fox.statistics.max_tf, 2);
    assert_eq!(fox.statistics.field_frequencies, vec![1, 2]);

    assert_eq!(index.documents().document_length(0), 6);
    assert_eq!(index.documents().document_length(1), 0);
    assert_eq!(index.documents().field_lengths(2), &[2, 3]);
}

#[test]
fn test_inverted_postings() {
    let index = build(CompressionConfig::default());
    let fox = drain(index.term_postings("fox").unwrap());
    assert_eq!(
        fox,
        vec![(0, 2, vec![1, 5], vec![1, 1]), (2, 1, vec![3], vec![0, 1])]
    );
    let mut it = index.term_postings("quick").unwrap();
    assert_eq!(it.next().unwrap(), 0);
    assert_eq!(it.document_length(), 6);
    assert_eq!(it.field_lengths(), &[2, 4]);
    assert!(index.term_postings("cat").err().unwrap().is_not_found());
}

#[test]
fn test_direct_index() {
    let index = build(CompressionConfig::default());
    let terms = drain(index.document_terms(2).unwrap());
    let names = terms
        .iter()
        .map(|t| index.lexicon().by_id(t.0).unwrap().0)
        .collect::<Vec<_>>();
    assert_eq!(names, ["dog", "fox", "jumps", "lazy", "the"]);

    // A document without tokens has an empty list that ends immediately.
    let mut empty = index.document_terms(1).unwrap();
    assert_eq!(empty.next().unwrap(), END_OF_LIST);
    assert!(index.document_terms(3).is_err());
}

#[test]
fn test_persist_and_reopen() {
    for compression in [
        CompressionConfig::default(),
        CompressionConfig::chunked(CodecKind::PFor),
        CompressionConfig {
            inverted_tfs: CodecKind::VariableByte,
            fields: CodecKind::Gamma,
            ..CompressionConfig::chunked(CodecKind::VariableByte)
        },
    ] {
        let index = build(compression.clone());
        let dir = tempfile::tempdir().unwrap();
        index.write(dir.path()).unwrap();

        for mode in [StorageMode::Positional, StorageMode::Seeking, StorageMode::Memory] {
            let reopened = Index::open_with(dir.path(), mode).unwrap();
            assert_eq!(reopened.properties(), index.properties());
            assert_eq!(reopened.properties().compression, compression);
            for (term, entry) in index.lexicon().iter() {
                let other = reopened.lexicon().get(term).unwrap();
                assert_eq!(other, entry);
                assert_eq!(
                    drain(reopened.postings(other).unwrap()),
                    drain(index.postings(entry).unwrap()),
                    "term {term}"
                );
            }
            for doc in 0..3 {
                assert_eq!(
                    drain(reopened.document_terms(doc).unwrap()),
                    drain(index.document_terms(doc).unwrap())
                );
            }
        }
    }
}

#[test]
fn test_field_count_mismatch() {
    let mut builder = IndexBuilder::new(IndexBuilderConfig {
        field_names: vec!["title".into(), "body".into()],
        ..Default::default()
    })
    .unwrap();
    let err = builder
        .add_document(&IndexDocument::new("d0", &["one", "field"]))
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        quarry_common::error::ErrorKind::InvalidArgument { .. }
    ));
}
