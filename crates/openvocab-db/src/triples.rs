//! PostgreSQL-backed triple store.
//!
//! Triples live in the `triple` table. Literal language and datatype are
//! stored as `''` when absent so the full statement forms the primary key,
//! which makes inserts idempotent.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{debug, trace};

use openvocab_core::{
    Error, Literal, Result, Term, Triple, TriplePattern, TripleStore, Uri,
};

const OBJECT_URI: &str = "uri";
const OBJECT_LITERAL: &str = "literal";

/// Column values for an object term.
struct ObjectColumns {
    kind: &'static str,
    value: String,
    lang: String,
    datatype: String,
}

impl ObjectColumns {
    fn from_term(term: &Term) -> Self {
        match term {
            Term::Uri { value } => Self {
                kind: OBJECT_URI,
                value: value.to_string(),
                lang: String::new(),
                datatype: String::new(),
            },
            Term::Literal(lit) => Self {
                kind: OBJECT_LITERAL,
                value: lit.value.clone(),
                lang: lit.language.clone().unwrap_or_default(),
                datatype: lit
                    .datatype
                    .as_ref()
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
            },
        }
    }
}

fn row_to_triple(row: &sqlx::postgres::PgRow) -> Result<Triple> {
    let subject: String = row.get("subject");
    let predicate: String = row.get("predicate");
    let kind: String = row.get("object_kind");
    let value: String = row.get("object_value");
    let lang: String = row.get("object_lang");
    let datatype: String = row.get("object_datatype");

    let corrupt = |e: Error| Error::Internal(format!("Corrupt triple row: {}", e));

    let object = if kind == OBJECT_URI {
        Term::uri(Uri::parse(value).map_err(corrupt)?)
    } else {
        Term::Literal(Literal {
            value,
            language: (!lang.is_empty()).then_some(lang),
            datatype: if datatype.is_empty() {
                None
            } else {
                Some(Uri::parse(datatype).map_err(corrupt)?)
            },
        })
    };

    Ok(Triple {
        subject: Uri::parse(subject).map_err(corrupt)?,
        predicate: Uri::parse(predicate).map_err(corrupt)?,
        object,
    })
}

/// Triple store over a PostgreSQL pool.
#[derive(Clone)]
pub struct PgTripleStore {
    pool: PgPool,
}

impl PgTripleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_in(tx: &mut Transaction<'_, Postgres>, triples: &[Triple]) -> Result<()> {
        for triple in triples {
            let obj = ObjectColumns::from_term(&triple.object);
            sqlx::query(
                r#"INSERT INTO triple (
                    subject, predicate, object_kind, object_value, object_lang, object_datatype
                ) VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT DO NOTHING"#,
            )
            .bind(triple.subject.as_str())
            .bind(triple.predicate.as_str())
            .bind(obj.kind)
            .bind(&obj.value)
            .bind(&obj.lang)
            .bind(&obj.datatype)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;
        }
        Ok(())
    }
}

#[async_trait]
impl TripleStore for PgTripleStore {
    async fn find_triples(
        &self,
        pattern: &TriplePattern,
        limit: Option<usize>,
    ) -> Result<Vec<Triple>> {
        let obj = pattern.object.as_ref().map(ObjectColumns::from_term);

        let rows = sqlx::query(
            r#"SELECT subject, predicate, object_kind, object_value, object_lang, object_datatype
            FROM triple
            WHERE ($1::text IS NULL OR subject = $1)
              AND ($2::text IS NULL OR predicate = $2)
              AND ($3::text IS NULL OR (
                    object_kind = $3 AND object_value = $4
                    AND object_lang = $5 AND object_datatype = $6))
            ORDER BY subject, predicate, object_value
            LIMIT $7"#,
        )
        .bind(pattern.subject.as_ref().map(Uri::as_str))
        .bind(pattern.predicate.as_ref().map(Uri::as_str))
        .bind(obj.as_ref().map(|o| o.kind))
        .bind(obj.as_ref().map(|o| o.value.as_str()))
        .bind(obj.as_ref().map(|o| o.lang.as_str()))
        .bind(obj.as_ref().map(|o| o.datatype.as_str()))
        .bind(limit.map(|l| l as i64))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        trace!(
            subsystem = "db",
            component = "triples",
            op = "find",
            result_count = rows.len(),
            "Pattern query"
        );
        rows.iter().map(row_to_triple).collect()
    }

    async fn ask(&self, pattern: &TriplePattern) -> Result<bool> {
        let obj = pattern.object.as_ref().map(ObjectColumns::from_term);

        let row = sqlx::query(
            r#"SELECT EXISTS (
                SELECT 1 FROM triple
                WHERE ($1::text IS NULL OR subject = $1)
                  AND ($2::text IS NULL OR predicate = $2)
                  AND ($3::text IS NULL OR (
                        object_kind = $3 AND object_value = $4
                        AND object_lang = $5 AND object_datatype = $6))
            ) AS found"#,
        )
        .bind(pattern.subject.as_ref().map(Uri::as_str))
        .bind(pattern.predicate.as_ref().map(Uri::as_str))
        .bind(obj.as_ref().map(|o| o.kind))
        .bind(obj.as_ref().map(|o| o.value.as_str()))
        .bind(obj.as_ref().map(|o| o.lang.as_str()))
        .bind(obj.as_ref().map(|o| o.datatype.as_str()))
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.get("found"))
    }

    async fn insert_triples(&self, triples: &[Triple]) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        Self::insert_in(&mut tx, triples).await?;
        tx.commit().await.map_err(Error::Database)?;
        debug!(
            subsystem = "db",
            component = "triples",
            op = "insert",
            triple_count = triples.len(),
            "Triples inserted"
        );
        Ok(())
    }

    async fn delete_triples(&self, triples: &[Triple]) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        for triple in triples {
            let obj = ObjectColumns::from_term(&triple.object);
            sqlx::query(
                r#"DELETE FROM triple
                WHERE subject = $1 AND predicate = $2 AND object_kind = $3
                  AND object_value = $4 AND object_lang = $5 AND object_datatype = $6"#,
            )
            .bind(triple.subject.as_str())
            .bind(triple.predicate.as_str())
            .bind(obj.kind)
            .bind(&obj.value)
            .bind(&obj.lang)
            .bind(&obj.datatype)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        }
        tx.commit().await.map_err(Error::Database)?;
        debug!(
            subsystem = "db",
            component = "triples",
            op = "delete",
            triple_count = triples.len(),
            "Triples deleted"
        );
        Ok(())
    }

    async fn delete_subject(&self, subject: &Uri) -> Result<()> {
        let result = sqlx::query("DELETE FROM triple WHERE subject = $1")
            .bind(subject.as_str())
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        debug!(
            subsystem = "db",
            component = "triples",
            op = "delete_subject",
            resource_uri = %subject,
            triple_count = result.rows_affected(),
            "Subject removed"
        );
        Ok(())
    }

    async fn replace_subject(&self, subject: &Uri, triples: &[Triple]) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        sqlx::query("DELETE FROM triple WHERE subject = $1")
            .bind(subject.as_str())
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        Self::insert_in(&mut tx, triples).await?;
        tx.commit().await.map_err(Error::Database)?;
        debug!(
            subsystem = "db",
            component = "triples",
            op = "replace_subject",
            resource_uri = %subject,
            triple_count = triples.len(),
            "Subject replaced"
        );
        Ok(())
    }
}
