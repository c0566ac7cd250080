use quarry_compression::CodecKind;
use quarry_io::memory::shared_buffer;
use quarry_postings::{
    CompressionConfig, END_OF_LIST, IteratorState, Posting, PostingIterator, PostingLayout,
    config::{PostingEncoding, Structure},
    read::{DocumentLookup, PostingIndex},
    write::PostingListWriter,
};

fn random_list(rng: &mut fastrand::Rng, len: usize, layout: PostingLayout) -> Vec<Posting> {
    let mut id = 0u32;
    (0..len)
        .map(|i| {
            id += if i == 0 { rng.u32(0..3) } else { rng.u32(1..50) };
            if rng.u8(..) == 0 {
                id += 1 << 21;
            }
            let frequency = rng.u32(1..6);
            let mut posting = Posting::new(id, frequency);
            if layout.blocks {
                let mut position = rng.u32(0..10);
                posting.positions = (0..frequency)
                    .map(|_| {
                        let p = position;
                        position += rng.u32(1..20);
                        p
                    })
                    .collect();
            }
            if layout.has_fields() {
                posting.field_frequencies =
                    (0..layout.field_count).map(|_| rng.u32(0..3)).collect();
            }
            posting
        })
        .collect()
}

fn encodings() -> Vec<PostingEncoding> {
    let mut encodings = vec![PostingEncoding::Bit];
    for codec in CodecKind::ALL {
        let config = CompressionConfig {
            chunk_size: 64,
            inverted_tfs: codec,
            fields: codec,
            ..CompressionConfig::chunked(codec)
        };
        encodings.push(config.encoding(Structure::Inverted));
    }
    encodings
}

fn layouts() -> [PostingLayout; 4] {
    [
        PostingLayout::basic(),
        PostingLayout::new(true, 0),
        PostingLayout::new(false, 3),
        PostingLayout::new(true, 2),
    ]
}

fn write_lists(
    layout: PostingLayout,
    encoding: PostingEncoding,
    lists: &[Vec<Posting>],
) -> (PostingIndex, Vec<quarry_postings::BitIndexPointer>) {
    let mut writer = PostingListWriter::new(layout, encoding);
    let pointers = lists
        .iter()
        .map(|list| writer.write_list(list).unwrap())
        .collect::<Vec<_>>();
    let index = PostingIndex::new(
        shared_buffer(writer.finish()),
        Structure::Inverted,
        layout,
        encoding,
        DocumentLookup::none(),
    );
    (index, pointers)
}

fn collect(it: &mut dyn PostingIterator) -> Vec<Posting> {
    let mut out = Vec::new();
    while it.next().unwrap() != END_OF_LIST {
        out.push(Posting {
            id: it.id(),
            frequency: it.frequency(),
            positions: it.positions().to_vec(),
            field_frequencies: it.field_frequencies().to_vec(),
        });
    }
    out
}

/// Every encoder/decoder combination yields the written postings in strictly
/// increasing id order and ends after exactly the declared entry count.
#[test]
fn test_iteration_matches_written_lists() {
    let mut rng = fastrand::Rng::with_seed(7);
    for layout in layouts() {
        for encoding in encodings() {
            let lists = [0usize, 1, 5, 63, 64, 65, 300]
                .iter()
                .map(|&len| random_list(&mut rng, len, layout))
                .collect::<Vec<_>>();
            let (index, pointers) = write_lists(layout, encoding, &lists);
            for (list, pointer) in lists.iter().zip(&pointers) {
                let mut it = index.open_iterator(pointer).unwrap();
                assert_eq!(it.state(), IteratorState::BeforeFirst);
                assert_eq!(it.entry_count() as usize, list.len());
                let decoded = collect(&mut it);
                assert!(decoded.windows(2).all(|w| w[0].id < w[1].id));
                assert_eq!(&decoded, list, "layout {layout:?}, encoding {encoding:?}");
                assert_eq!(it.state(), IteratorState::EndOfList);
                assert_eq!(it.next().unwrap(), END_OF_LIST);
            }
        }
    }
}

#[test]
fn test_next_target_skips() {
    let mut rng = fastrand::Rng::with_seed(11);
    for layout in [PostingLayout::basic(), PostingLayout::new(true, 2)] {
        for encoding in encodings() {
            let list = random_list(&mut rng, 500, layout);
            let (index, pointers) = write_lists(layout, encoding, std::slice::from_ref(&list));
            let mut it = index.open_iterator(&pointers[0]).unwrap();

            let mut expected = list.iter();
            let mut target = 0u32;
            loop {
                let id = it.next_target(target).unwrap();
                let want = expected.by_ref().find(|p| p.id >= target);
                match want {
                    Some(posting) => {
                        assert_eq!(id, posting.id);
                        assert_eq!(it.frequency(), posting.frequency);
                        assert_eq!(it.positions(), posting.positions.as_slice());
                        assert_eq!(
                            it.field_frequencies(),
                            posting.field_frequencies.as_slice()
                        );
                    }
                    None => {
                        assert_eq!(id, END_OF_LIST);
                        break;
                    }
                }
                // Re-targeting the current id does not move the iterator.
                assert_eq!(it.next_target(id).unwrap(), id);
                target = id + rng.u32(1..400);
            }
        }
    }
}

#[test]
fn test_empty_list_reports_end() {
    for encoding in encodings() {
        let (index, pointers) = write_lists(PostingLayout::basic(), encoding, &[vec![]]);
        let mut it = index.open_iterator(&pointers[0]).unwrap();
        assert_eq!(it.next().unwrap(), END_OF_LIST);
        assert!(it.is_end());
    }
}

#[test]
fn test_truncated_list_is_an_error() {
    let layout = PostingLayout::new(true, 0);
    let mut rng = fastrand::Rng::with_seed(3);
    for encoding in encodings() {
        let list = random_list(&mut rng, 100, layout);
        let mut writer = PostingListWriter::new(layout, encoding);
        let pointer = writer.write_list(&list).unwrap();
        let mut bytes = writer.finish();
        bytes.truncate(bytes.len() / 2);
        let index = PostingIndex::new(
            shared_buffer(bytes),
            Structure::Inverted,
            layout,
            encoding,
            DocumentLookup::none(),
        );
        assert!(index.open_iterator(&pointer).is_err());

        // Reading a region that is present but declares more entries than it holds.
        let mut writer = PostingListWriter::new(layout, encoding);
        let mut pointer = writer.write_list(&list).unwrap();
        pointer.number_of_entries += 1;
        let index = PostingIndex::new(
            shared_buffer(writer.finish()),
            Structure::Inverted,
            layout,
            encoding,
            DocumentLookup::none(),
        );
        let mut it = index.open_iterator(&pointer).unwrap();
        let mut result = Ok(0);
        for _ in 0..=list.len() {
            result = it.next();
            if result.is_err() {
                break;
            }
        }
        let err = result.unwrap_err();
        assert!(err.is_format_inconsistency(), "{encoding:?}: {err}");
    }
}

#[test]
fn test_close_is_idempotent() {
    let layout = PostingLayout::basic();
    let list = vec![Posting::new(1, 1), Posting::new(4, 2)];
    for encoding in encodings() {
        let (index, pointers) = write_lists(layout, encoding, std::slice::from_ref(&list));
        let mut it = index.open_iterator(&pointers[0]).unwrap();
        assert_eq!(it.next().unwrap(), 1);
        it.close();
        it.close();
        assert!(it.is_end());
        assert_eq!(it.id(), END_OF_LIST);
        assert_eq!(it.next().unwrap(), END_OF_LIST);
    }
}
