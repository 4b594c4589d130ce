use tokendex::{Config, DocId, ErrorKind, MemoryStore, QueryDialect, SearchIndex, SqliteStore};

fn tokens(values: &[&str]) -> Vec<String> {
    values.iter().map(|t| t.to_string()).collect()
}

fn ids(values: &[u32]) -> Vec<DocId> {
    values.iter().copied().map(DocId).collect()
}

fn engine_with(docs: &[(u32, &[&str])]) -> SearchIndex<MemoryStore> {
    let engine = SearchIndex::in_memory();
    for (id, doc_tokens) in docs {
        engine.index_document(DocId(*id), tokens(doc_tokens)).unwrap();
    }
    engine
}

fn legacy_engine_with(docs: &[(u32, &[&str])]) -> SearchIndex<MemoryStore> {
    let config = Config {
        dialect: QueryDialect::Legacy,
        ..Config::default()
    };
    let engine = SearchIndex::with_store(MemoryStore::new(), &config);
    for (id, doc_tokens) in docs {
        engine.index_document(DocId(*id), tokens(doc_tokens)).unwrap();
    }
    engine
}

#[test]
fn literal_query_returns_exact_posting_set() {
    let engine = engine_with(&[(1, &["abc", "def"]), (2, &["abc"]), (3, &["def"])]);
    assert_eq!(engine.query("abc").unwrap(), ids(&[1, 2]));
    assert_eq!(engine.query("def").unwrap(), ids(&[1, 3]));
    assert_eq!(engine.query("ghi").unwrap(), ids(&[]));
}

#[test]
fn repeated_query_is_served_from_cache() {
    let engine = engine_with(&[(1, &["abc"]), (2, &["abc"])]);

    let first = engine.query("abc").unwrap();
    let lookups_after_first = engine.store().posting_lookups();

    let second = engine.query("abc").unwrap();
    assert_eq!(first, second);
    // The second call never reached the store.
    assert_eq!(engine.store().posting_lookups(), lookups_after_first);
}

#[test]
fn write_invalidates_cached_results() {
    let engine = engine_with(&[(1, &["abc"])]);
    assert_eq!(engine.query("abc").unwrap(), ids(&[1]));

    engine.index_document(DocId(2), tokens(&["abc"])).unwrap();

    let lookups_before = engine.store().posting_lookups();
    assert_eq!(engine.query("abc").unwrap(), ids(&[1, 2]));
    // Recomputed, not served stale.
    assert!(engine.store().posting_lookups() > lookups_before);
}

#[test]
fn hundred_and_first_distinct_key_resets_the_cache() {
    let engine = engine_with(&[(1, &["abc"])]);
    for i in 0..101 {
        engine.query(&format!("key{}", i)).unwrap();
    }

    let stats = engine.stats().unwrap();
    assert_eq!(stats.cache.size, 1);

    // Only the 101st key survived.
    let lookups_before = engine.store().posting_lookups();
    engine.query("key100").unwrap();
    assert_eq!(engine.store().posting_lookups(), lookups_before);
}

#[test]
fn reindex_round_trip() {
    let engine = engine_with(&[(5, &["abc", "def"])]);
    assert_eq!(engine.query("abc").unwrap(), ids(&[5]));

    engine.index_document(DocId(5), tokens(&["xyz"])).unwrap();

    assert_eq!(engine.query("abc").unwrap(), ids(&[]));
    assert_eq!(engine.query("xyz").unwrap(), ids(&[5]));
}

#[test]
fn and_or_base_cases() {
    // Postings: a → {1,2}, b → {2,3}.
    let engine = engine_with(&[(1, &["a"]), (2, &["a", "b"]), (3, &["b"])]);
    assert_eq!(engine.query("a & b").unwrap(), ids(&[2]));
    assert_eq!(engine.query("a | b").unwrap(), ids(&[1, 2, 3]));
}

#[test]
fn legacy_dialect_rejects_bad_arity_and_leaves_cache_untouched() {
    let engine = legacy_engine_with(&[(1, &["a"])]);
    engine.query("a").unwrap();
    let cached = engine.stats().unwrap().cache.size;

    for raw in ["a &", "a & b |"] {
        let err = engine.query(raw).unwrap_err();
        assert_eq!(err.kind, ErrorKind::QueryFormat, "{}", raw);
    }

    assert_eq!(engine.stats().unwrap().cache.size, cached);
}

#[test]
fn mixed_five_token_expressions_in_both_dialects() {
    // Postings: a → {1}, b → {1,2}, c → {3}.
    let docs: &[(u32, &[&str])] = &[(1, &["a", "b"]), (2, &["b"]), (3, &["c"])];

    for engine in [engine_with(docs), legacy_engine_with(docs)] {
        // (a ∧ b) ∨ c: distributed form (a∨c)∧(b∨c) = {1,3}∩{1,2,3}.
        assert_eq!(engine.query("(a & b) | c").unwrap(), ids(&[1, 3]));
        // a ∨ (b ∧ c): (a∨b)∧(a∨c) = {1,2}∩{1,3}.
        assert_eq!(engine.query("a | (b & c)").unwrap(), ids(&[1]));
    }
}

#[test]
fn legacy_bare_literal_groups() {
    let docs: &[(u32, &[&str])] = &[(1, &["a", "c"]), (2, &["b", "c"]), (3, &["a"])];
    let engine = legacy_engine_with(docs);

    // (a ∨ b) ∧ c and a ∧ (b ∨ c) keep a bare literal on one side.
    assert_eq!(engine.query("(a | b) & c").unwrap(), ids(&[1, 2]));
    assert_eq!(engine.query("a & (b | c)").unwrap(), ids(&[1]));
}

#[test]
fn general_dialect_accepts_unbounded_expressions() {
    let engine = engine_with(&[
        (1, &["rust", "db", "search"]),
        (2, &["rust", "web"]),
        (3, &["db", "web", "search"]),
    ]);

    assert_eq!(
        engine.query("rust & (db | web) & search").unwrap(),
        ids(&[1])
    );
    assert_eq!(
        engine.query("rust | db | web | search").unwrap(),
        ids(&[1, 2, 3])
    );
}

#[test]
fn sqlite_and_memory_stores_agree() {
    let docs: &[(u32, &[&str])] = &[
        (1, &["a", "b"]),
        (2, &["b"]),
        (3, &["c"]),
        (4, &["a", "c"]),
    ];

    let memory = engine_with(docs);
    let sqlite = SearchIndex::with_store(SqliteStore::open_in_memory().unwrap(), &Config::default());
    for (id, doc_tokens) in docs {
        sqlite.index_document(DocId(*id), tokens(doc_tokens)).unwrap();
    }

    for raw in [
        "a",
        "a & b",
        "a | b",
        "a & b & c",
        "a | b | c",
        "(a & b) | c",
        "a | (b & c)",
        "a & (b | c)",
    ] {
        assert_eq!(memory.query(raw).unwrap(), sqlite.query(raw).unwrap(), "{}", raw);
    }
}

#[test]
fn validation_failures_surface_and_engine_stays_servable() {
    let engine = engine_with(&[(1, &["abc"])]);

    let err = engine.index_document(DocId(2), tokens(&[])).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    let err = engine
        .index_document(DocId(2), tokens(&["not-alnum!"]))
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    // The failed requests were abandoned; later requests still work.
    assert_eq!(engine.query("abc").unwrap(), ids(&[1]));
    engine.index_document(DocId(2), tokens(&["abc"])).unwrap();
    assert_eq!(engine.query("abc").unwrap(), ids(&[1, 2]));
}
