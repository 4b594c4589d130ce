/// Walkthrough of the engine API:
/// - indexing documents and reindexing an existing id
/// - boolean queries, cache hits, and invalidation
/// - statistics

use tokendex::{DocId, SearchIndex};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("Creating in-memory engine...");
    let engine = SearchIndex::in_memory();

    println!("\nStep 1: INDEX - adding documents");
    engine.index_document(DocId(1), tokens(&["rust", "db", "search"]))?;
    engine.index_document(DocId(2), tokens(&["rust", "web"]))?;
    engine.index_document(DocId(3), tokens(&["db", "web"]))?;
    println!("  indexed 3 documents");

    println!("\nStep 2: QUERY - boolean expressions");
    for expr in ["rust", "rust & db", "db | web", "rust & (db | web)"] {
        let ids = engine.query(expr)?;
        println!("  '{}': {:?}", expr, ids.iter().map(|id| id.0).collect::<Vec<_>>());
    }

    println!("\nStep 3: CACHE - repeated query is a hit");
    engine.query("rust & db")?;
    println!("  cache hit rate: {:.2}", engine.stats()?.cache.hit_rate());

    println!("\nStep 4: REINDEX - replacing a document's token set");
    engine.index_document(DocId(2), tokens(&["python"]))?;
    println!("  'rust' now: {:?}", engine.query("rust")?);
    println!("  'python' now: {:?}", engine.query("python")?);

    println!("\nStep 5: ERRORS - invalid input is rejected per request");
    match engine.index_document(DocId(4), tokens(&["not ok"])) {
        Ok(_) => println!("  unexpected success"),
        Err(e) => println!("  index error: {}", e),
    }
    match engine.query("rust &") {
        Ok(_) => println!("  unexpected success"),
        Err(e) => println!("  query error: {}", e),
    }

    println!("\nStep 6: STATS");
    let stats = engine.stats()?;
    println!("  documents: {}", stats.total_documents);
    println!("  queries:   {}", stats.query_count);
    println!("  writes:    {}", stats.write_count);
    println!("  cache:     {}/{} entries", stats.cache.size, stats.cache.capacity);

    Ok(())
}

fn tokens(values: &[&str]) -> Vec<String> {
    values.iter().map(|t| t.to_string()).collect()
}
