use std::path::Path;

use chrono::Utc;
use roaring::RoaringBitmap;
use rusqlite::{Connection, params, params_from_iter};
use tracing::{debug, info};

use crate::core::error::{Error, Result};
use crate::core::types::DocId;
use crate::query::plan::QueryPlan;
use crate::store::DocumentStore;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS Documents (
    Id INTEGER PRIMARY KEY,
    CreatedAt TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS Tokens (
    Id INTEGER PRIMARY KEY AUTOINCREMENT,
    Content TEXT NOT NULL,
    DocumentId INTEGER NOT NULL REFERENCES Documents(Id)
);
CREATE INDEX IF NOT EXISTS idx_tokens_content ON Tokens(Content);
CREATE INDEX IF NOT EXISTS idx_tokens_document ON Tokens(DocumentId);
";

/// Relational inverted-index store over SQLite.
///
/// Plan evaluation is pushed down to the database as compound selects; the
/// posting relation is the `Tokens` table with secondary indexes on content
/// and owning document.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| Error::store_op("open", e))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| Error::store_op("set_journal_mode", e))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::store_op("open", e))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| Error::store_op("create_schema", e))?;
        info!("document store schema ready");
        Ok(SqliteStore { conn })
    }
}

impl DocumentStore for SqliteStore {
    fn exists(&self, id: DocId) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM Documents WHERE Id = ?1",
                [id.0 as i64],
                |row| row.get(0),
            )
            .map_err(|e| Error::store("lookup_document", id, e))?;
        Ok(count > 0)
    }

    fn insert_document(&mut self, id: DocId) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO Documents(Id, CreatedAt) VALUES(?1, ?2)",
                params![id.0 as i64, Utc::now().to_rfc3339()],
            )
            .map_err(|e| Error::store("insert_document", id, e))?;
        Ok(())
    }

    fn delete_tokens(&mut self, id: DocId) -> Result<()> {
        self.conn
            .execute("DELETE FROM Tokens WHERE DocumentId = ?1", [id.0 as i64])
            .map_err(|e| Error::store("delete_tokens", id, e))?;
        Ok(())
    }

    fn insert_tokens(&mut self, id: DocId, contents: &[String]) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare("INSERT INTO Tokens(Content, DocumentId) VALUES(?1, ?2)")
            .map_err(|e| Error::store("insert_tokens", id, e))?;

        for content in contents {
            stmt.execute(params![content, id.0 as i64])
                .map_err(|e| Error::store("insert_tokens", id, e))?;
        }
        Ok(())
    }

    fn postings(&self, literal: &str) -> Result<RoaringBitmap> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT DocumentId FROM Tokens WHERE Content = ?1")
            .map_err(|e| Error::store_op("postings", e))?;
        let rows = stmt
            .query_map([literal], |row| row.get::<_, i64>(0))
            .map_err(|e| Error::store_op("postings", e))?;

        let mut acc = RoaringBitmap::new();
        for row in rows {
            let id = row.map_err(|e| Error::store_op("postings", e))?;
            acc.insert(id as u32);
        }
        Ok(acc)
    }

    fn document_count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM Documents", [], |row| row.get(0))
            .map_err(|e| Error::store_op("document_count", e))?;
        Ok(count as u64)
    }

    /// Pushes the whole plan down to SQLite as one compound select.
    fn evaluate(&self, plan: &QueryPlan) -> Result<RoaringBitmap> {
        let mut literals = Vec::new();
        let sql = plan_sql(plan, &mut literals);
        debug!(%sql, operands = literals.len(), "evaluating plan");

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| Error::store_op("evaluate_plan", e))?;
        let rows = stmt
            .query_map(params_from_iter(literals), |row| row.get::<_, i64>(0))
            .map_err(|e| Error::store_op("evaluate_plan", e))?;

        let mut acc = RoaringBitmap::new();
        for row in rows {
            let id = row.map_err(|e| Error::store_op("evaluate_plan", e))?;
            acc.insert(id as u32);
        }
        Ok(acc)
    }
}

/// Renders a plan node as a SELECT over the posting relation, pushing its
/// literals into `params` in placeholder order.
fn plan_sql<'a>(plan: &'a QueryPlan, params: &mut Vec<&'a str>) -> String {
    match plan {
        QueryPlan::Literal(literal) => {
            params.push(literal);
            "SELECT DISTINCT DocumentId FROM Tokens WHERE Content = ?".to_string()
        }
        QueryPlan::Union(children) if children.iter().all(is_literal) => {
            let placeholders = vec!["?"; children.len()].join(", ");
            for child in children {
                if let QueryPlan::Literal(literal) = child {
                    params.push(literal);
                }
            }
            format!(
                "SELECT DISTINCT DocumentId FROM Tokens WHERE Content IN ({})",
                placeholders
            )
        }
        QueryPlan::Union(children) => compound_sql(children, " UNION ", params),
        QueryPlan::Intersect(children) => compound_sql(children, " INTERSECT ", params),
    }
}

fn compound_sql<'a>(
    children: &'a [QueryPlan],
    operator: &str,
    params: &mut Vec<&'a str>,
) -> String {
    let fragments: Vec<String> = children
        .iter()
        .map(|child| {
            let sql = plan_sql(child, params);
            if is_single_select(child) {
                sql
            } else {
                // Compound children need a subselect; SQLite has no
                // precedence between UNION and INTERSECT.
                format!("SELECT DocumentId FROM ({})", sql)
            }
        })
        .collect();
    fragments.join(operator)
}

fn is_literal(plan: &QueryPlan) -> bool {
    matches!(plan, QueryPlan::Literal(_))
}

fn is_single_select(plan: &QueryPlan) -> bool {
    match plan {
        QueryPlan::Literal(_) => true,
        QueryPlan::Union(children) => children.iter().all(is_literal),
        QueryPlan::Intersect(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::plan::compile_legacy;

    fn seeded_store() -> SqliteStore {
        let mut store = SqliteStore::open_in_memory().unwrap();
        for (id, tokens) in [
            (1u32, vec!["a"]),
            (2, vec!["a", "b"]),
            (3, vec!["b", "c"]),
        ] {
            let id = DocId(id);
            store.insert_document(id).unwrap();
            let contents: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
            store.insert_tokens(id, &contents).unwrap();
        }
        store
    }

    fn bitmap(values: &[u32]) -> RoaringBitmap {
        values.iter().copied().collect()
    }

    #[test]
    fn exists_after_insert() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        assert!(!store.exists(DocId(1)).unwrap());
        store.insert_document(DocId(1)).unwrap();
        assert!(store.exists(DocId(1)).unwrap());
    }

    #[test]
    fn postings_are_exact_and_case_sensitive() {
        let mut store = seeded_store();
        store.insert_document(DocId(9)).unwrap();
        store.insert_tokens(DocId(9), &["A".to_string()]).unwrap();

        assert_eq!(store.postings("a").unwrap(), bitmap(&[1, 2]));
        assert_eq!(store.postings("A").unwrap(), bitmap(&[9]));
        assert_eq!(store.postings("missing").unwrap(), RoaringBitmap::new());
    }

    #[test]
    fn delete_tokens_leaves_document_row() {
        let mut store = seeded_store();
        store.delete_tokens(DocId(2)).unwrap();

        assert!(store.exists(DocId(2)).unwrap());
        assert_eq!(store.postings("a").unwrap(), bitmap(&[1]));
        assert_eq!(store.document_count().unwrap(), 3);
    }

    #[test]
    fn pushdown_matches_plan_semantics() {
        let store = seeded_store();

        let union = compile_legacy("a | b").unwrap();
        assert_eq!(store.evaluate(&union).unwrap(), bitmap(&[1, 2, 3]));

        let intersect = compile_legacy("a & b").unwrap();
        assert_eq!(store.evaluate(&intersect).unwrap(), bitmap(&[2]));

        let three_way = compile_legacy("a & b & c").unwrap();
        assert_eq!(store.evaluate(&three_way).unwrap(), RoaringBitmap::new());
    }

    #[test]
    fn pushdown_handles_nested_compounds() {
        let store = seeded_store();

        // (a ∧ b) ∨ c as a nested tree rather than the distributed form.
        let plan = QueryPlan::Union(vec![
            QueryPlan::Intersect(vec![QueryPlan::literal("a"), QueryPlan::literal("b")]),
            QueryPlan::literal("c"),
        ]);
        assert_eq!(store.evaluate(&plan).unwrap(), bitmap(&[2, 3]));
    }

    /// Routes plans through the trait's default fold against the same
    /// connection, for comparison with the pushdown path.
    struct FoldOnly<'a>(&'a SqliteStore);

    impl<'a> DocumentStore for FoldOnly<'a> {
        fn exists(&self, id: DocId) -> Result<bool> {
            self.0.exists(id)
        }
        fn insert_document(&mut self, _id: DocId) -> Result<()> {
            unreachable!()
        }
        fn delete_tokens(&mut self, _id: DocId) -> Result<()> {
            unreachable!()
        }
        fn insert_tokens(&mut self, _id: DocId, _contents: &[String]) -> Result<()> {
            unreachable!()
        }
        fn postings(&self, literal: &str) -> Result<RoaringBitmap> {
            self.0.postings(literal)
        }
        fn document_count(&self) -> Result<u64> {
            self.0.document_count()
        }
    }

    #[test]
    fn pushdown_agrees_with_default_fold() {
        let store = seeded_store();
        for raw in ["a", "a | b", "a & b", "a | b | c", "(a & b) | c"] {
            let plan = compile_legacy(raw).unwrap();
            let pushed = store.evaluate(&plan).unwrap();
            let folded = FoldOnly(&store).evaluate(&plan).unwrap();
            assert_eq!(pushed, folded, "{}", raw);
        }
    }

    #[test]
    fn binds_literals_in_placeholder_order() {
        let plan = compile_legacy("(a & b) | c").unwrap();
        let mut params = Vec::new();
        let sql = plan_sql(&plan, &mut params);
        assert_eq!(params, vec!["a", "c", "b", "c"]);
        assert_eq!(sql.matches('?').count(), 4);
    }

    #[test]
    fn opens_file_backed_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.db");

        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.insert_document(DocId(1)).unwrap();
            store.insert_tokens(DocId(1), &["abc".to_string()]).unwrap();
        }

        // Reopen and read back.
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.postings("abc").unwrap(), bitmap(&[1]));
    }
}
