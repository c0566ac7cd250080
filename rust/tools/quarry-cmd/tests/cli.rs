use std::{path::Path, process::Command};

fn quarry(args: &[&str]) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_quarry-cmd"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "quarry-cmd {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

fn write_documents(path: &Path) {
    let docs = [
        r#"{"docno": "N-1", "fields": [["storm", "warning"], ["heavy", "storm", "coast"]]}"#,
        r#"{"docno": "N-2", "fields": [["market"], ["oil", "price", "storm"]]}"#,
        r#"{"docno": "N-3", "fields": [["oil"], ["oil", "spill", "coast"]]}"#,
        r#"{"docno": "N-4", "fields": [["sports"], ["final", "score"]]}"#,
    ];
    std::fs::write(path, docs.join("\n")).unwrap();
}

#[test]
fn test_build_inspect_search_batch() {
    let dir = tempfile::tempdir().unwrap();
    let docs = dir.path().join("docs.jsonl");
    let index = dir.path().join("index");
    write_documents(&docs);
    let index_arg = index.to_str().unwrap();

    quarry(&[
        "build",
        "--input",
        docs.to_str().unwrap(),
        "--fields",
        "title,body",
        "--codec",
        "pfor",
        index_arg,
    ]);

    let summary: serde_json::Value =
        serde_json::from_str(&quarry(&["inspect", "--term", "oil", "--doc", "N-3", index_arg]))
            .unwrap();
    assert_eq!(summary["statistics"]["number_of_documents"], 4);
    assert_eq!(summary["layout"]["field_count"], 2);
    let postings = summary["terms"][0]["postings"].as_array().unwrap();
    assert_eq!(postings.len(), 2);
    assert_eq!(postings[1]["docno"], "N-3");
    assert_eq!(postings[1]["frequency"], 2);
    assert_eq!(summary["documents"][0]["length"], 4);

    let result: serde_json::Value = serde_json::from_str(&quarry(&[
        "search",
        "--json",
        "--query-id",
        "7",
        index_arg,
        "title:storm",
    ]))
    .unwrap();
    assert_eq!(result["query_id"], "7");
    assert_eq!(result["doc_ids"], serde_json::json!([0]));

    let queries = dir.path().join("queries.txt");
    let run = dir.path().join("run.trec");
    std::fs::write(&queries, "1 storm\n2 oil -spill\n3 \"oil spill\"\n").unwrap();
    quarry(&[
        "batch",
        "--queries",
        queries.to_str().unwrap(),
        "--output",
        run.to_str().unwrap(),
        "--workers",
        "2",
        "--strategy",
        "taat",
        index_arg,
    ]);
    let mut lines = std::fs::read_to_string(&run)
        .unwrap()
        .lines()
        .map(|l| l.split(' ').map(str::to_string).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    lines.sort();
    let hits = lines
        .iter()
        .map(|c| format!("{}:{}", c[0], c[2]))
        .collect::<Vec<_>>();
    assert_eq!(hits, ["1:N-1", "1:N-2", "2:N-2", "3:N-3"]);
}
