use rig::OneOrMany;
use rig::embeddings::{Embedding, EmbeddingModel};
use rig_sqlite::{Column, ColumnValue, SqliteVectorStore, SqliteVectorStoreTable};
use std::mem::transmute;
use std::os::raw::c_char;
use std::path::Path;
use std::sync::Once;
use tokio_rusqlite::{Connection, ffi};

use crate::types::PipelineError;

/// Row shape persisted for each indexed corpus section.
///
/// Numeric and JSON fields are stored as TEXT because the underlying
/// store writes every column value through its text path; the search
/// row mapper parses them back.
#[derive(Clone, Debug)]
pub struct SectionDocument {
    pub id: String,
    pub source: String,
    pub section_index: usize,
    pub content: String,
    pub metadata: serde_json::Value,
}

impl SqliteVectorStoreTable for SectionDocument {
    fn name() -> &'static str {
        "sections"
    }

    fn schema() -> Vec<Column> {
        vec![
            Column::new("id", "TEXT PRIMARY KEY"),
            Column::new("source", "TEXT").indexed(),
            Column::new("section_index", "TEXT"),
            Column::new("metadata", "TEXT"),
            Column::new("content", "TEXT"),
        ]
    }

    fn id(&self) -> String {
        self.id.clone()
    }

    fn column_values(&self) -> Vec<(&'static str, Box<dyn ColumnValue>)> {
        vec![
            ("id", Box::new(self.id.clone())),
            ("source", Box::new(self.source.clone())),
            ("section_index", Box::new(self.section_index.to_string())),
            ("metadata", Box::new(self.metadata.to_string())),
            ("content", Box::new(self.content.clone())),
        ]
    }
}

/// SQLite-backed section store with vector search via `sqlite-vec`.
///
/// One database file holds one index: a `sections` table for the rows
/// and a `sections_embeddings` vec0 virtual table for their vectors,
/// dimensioned from the embedding model handed to [`open`](Self::open).
#[derive(Clone)]
pub struct SqliteSectionStore<E>
where
    E: EmbeddingModel + 'static,
{
    inner: SqliteVectorStore<E, SectionDocument>,
    /// Separate connection handle for raw queries not covered by rig-sqlite.
    /// This is a clone of the connection used by the inner store.
    conn: Connection,
}

impl<E> SqliteSectionStore<E>
where
    E: EmbeddingModel + Clone + Send + Sync + 'static,
{
    /// Opens (or creates) the store at `path`.
    ///
    /// Registers the `sqlite-vec` extension process-wide on first use and
    /// verifies it loaded by querying `vec_version()` before any schema
    /// work happens.
    pub async fn open(path: impl AsRef<Path>, model: &E) -> Result<Self, PipelineError> {
        Self::register_sqlite_vec()?;
        let conn = Connection::open(path)
            .await
            .map_err(|err| PipelineError::Storage(err.to_string()))?;
        conn.call(|conn| {
            let result = conn.query_row("select vec_version()", [], |row| row.get::<_, String>(0));
            match result {
                Ok(_) => Ok(()),
                Err(err) => Err(tokio_rusqlite::Error::Rusqlite(err)),
            }
        })
        .await
        .map_err(|err| PipelineError::Storage(err.to_string()))?;
        // Clone connection for raw access before moving into the store
        let conn_for_queries = conn.clone();
        let store = SqliteVectorStore::new(conn, model)
            .await
            .map_err(|err| PipelineError::Storage(err.to_string()))?;
        Ok(Self {
            inner: store,
            conn: conn_for_queries,
        })
    }

    /// Persists documents with their embeddings in one batch.
    pub async fn add_sections(
        &self,
        documents: Vec<(SectionDocument, Vec<f32>)>,
    ) -> Result<(), PipelineError> {
        if documents.is_empty() {
            return Ok(());
        }
        let mut rows = Vec::with_capacity(documents.len());
        for (doc, embedding) in documents {
            let converted: Vec<f64> = embedding.into_iter().map(|value| value as f64).collect();
            let embed = Embedding {
                document: doc.content.clone(),
                vec: converted,
            };
            rows.push((doc, OneOrMany::one(embed)));
        }
        self.inner
            .add_rows(rows)
            .await
            .map_err(|err| PipelineError::Storage(err.to_string()))?;
        Ok(())
    }

    fn register_sqlite_vec() -> Result<(), PipelineError> {
        use std::sync::Mutex;

        static INIT: Once = Once::new();
        static INIT_RESULT: Mutex<Option<Result<(), String>>> = Mutex::new(None);

        INIT.call_once(|| {
            let result = unsafe {
                type SqliteExtensionInit = unsafe extern "C" fn(
                    *mut ffi::sqlite3,
                    *mut *mut c_char,
                    *const ffi::sqlite3_api_routines,
                ) -> i32;

                let init: unsafe extern "C" fn() = sqlite_vec::sqlite3_vec_init;
                let init_fn: SqliteExtensionInit =
                    transmute::<unsafe extern "C" fn(), SqliteExtensionInit>(init);
                let rc = ffi::sqlite3_auto_extension(Some(init_fn));
                if rc != 0 {
                    Err(format!(
                        "failed to register sqlite-vec extension (code {rc})"
                    ))
                } else {
                    Ok(())
                }
            };
            *INIT_RESULT.lock().expect("init result mutex poisoned") = Some(result);
        });

        INIT_RESULT
            .lock()
            .expect("init result mutex poisoned")
            .clone()
            .expect("init was called but result not set")
            .map_err(PipelineError::Storage)
    }

    /// The underlying connection, for raw queries.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

// ============================================================================
// Backend Trait Implementation
// ============================================================================

use super::{Backend, SectionRecord};
use async_trait::async_trait;

#[async_trait]
impl<E> Backend for SqliteSectionStore<E>
where
    E: EmbeddingModel + Clone + Send + Sync + 'static,
{
    async fn insert_sections(&self, sections: Vec<SectionRecord>) -> Result<(), PipelineError> {
        if sections.is_empty() {
            return Ok(());
        }

        let documents_with_embeddings: Vec<(SectionDocument, Vec<f32>)> = sections
            .into_iter()
            .filter_map(|record| {
                let embedding = record.embedding.clone()?;
                let doc = SectionDocument::from(record);
                Some((doc, embedding))
            })
            .collect();

        self.add_sections(documents_with_embeddings).await
    }

    async fn search_similar(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<(SectionRecord, f32)>, PipelineError> {
        let embedding_json = serde_json::to_string(query_embedding)
            .map_err(|err| PipelineError::Storage(err.to_string()))?;
        let conn = self.connection();

        conn.call(move |conn| {
            // The vec0 virtual table keys embeddings by the rowid shared
            // with the sections table.
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT c.id, c.source, c.section_index, c.content, c.metadata, \
                     vec_distance_cosine(e.embedding, vec_f32(?)) as distance \
                     FROM sections c \
                     JOIN sections_embeddings e ON e.rowid = c.rowid \
                     ORDER BY distance ASC \
                     LIMIT {}",
                    top_k
                ))
                .map_err(tokio_rusqlite::Error::Rusqlite)?;

            let rows = stmt
                .query_map([&embedding_json], |row| {
                    let doc = SectionDocument {
                        id: row.get(0)?,
                        source: row.get(1)?,
                        section_index: row.get::<_, String>(2)?.parse().unwrap_or(0),
                        content: row.get(3)?,
                        metadata: row
                            .get::<_, String>(4)
                            .map(|s| serde_json::from_str(&s).unwrap_or_default())
                            .unwrap_or_default(),
                    };
                    let distance: f32 = row.get(5)?;
                    // Cosine distance in [0, 2]; report 1 - distance as similarity
                    let similarity = 1.0 - distance;
                    Ok((SectionRecord::from(doc), similarity))
                })
                .map_err(tokio_rusqlite::Error::Rusqlite)?;

            let mut results = Vec::new();
            for row in rows {
                results.push(row.map_err(tokio_rusqlite::Error::Rusqlite)?);
            }
            Ok(results)
        })
        .await
        .map_err(|err| PipelineError::Storage(err.to_string()))
    }

    async fn count(&self) -> Result<usize, PipelineError> {
        let conn = self.connection();

        conn.call(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM sections", [], |row| row.get(0))
                .map_err(tokio_rusqlite::Error::Rusqlite)?;
            Ok(count as usize)
        })
        .await
        .map_err(|err| PipelineError::Storage(err.to_string()))
    }
}
