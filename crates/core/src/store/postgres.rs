//! PostgreSQL store. Records live in JSONB `body` columns; lookup and
//! uniqueness columns sit next to them so the database enforces the
//! (page, language) and slug constraints.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::{merge_partial, partial_key, superseded_key, SiteStore, StoreError};
use crate::content::{ClientCase, ContentDocument};
use crate::lead::{LeadRecord, PartialLead, PartialLeadRecord};
use crate::seo::{SeoEntry, SeoFilter};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn duplicate_or(err: sqlx::Error, what: impl FnOnce() -> String) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::Duplicate(what())
    } else {
        StoreError::Database(err)
    }
}

impl PgStore {
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Apply the embedded migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl SiteStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_seo(&self, filter: &SeoFilter) -> Result<Vec<SeoEntry>, StoreError> {
        let rows: Vec<Json<SeoEntry>> = sqlx::query_scalar(
            "SELECT body FROM seo_entries \
             WHERE language = $1 AND ($2::text IS NULL OR page = $2) \
             ORDER BY page",
        )
        .bind(&filter.language)
        .bind(filter.page.as_deref())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|Json(entry)| entry).collect())
    }

    async fn get_seo(&self, id: Uuid) -> Result<SeoEntry, StoreError> {
        let row: Option<Json<SeoEntry>> =
            sqlx::query_scalar("SELECT body FROM seo_entries WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(|Json(entry)| entry)
            .ok_or_else(|| StoreError::NotFound(format!("seo entry {id}")))
    }

    async fn insert_seo(&self, entry: SeoEntry) -> Result<SeoEntry, StoreError> {
        let duplicate = || {
            format!(
                "seo entry for page '{}' and language '{}'",
                entry.page, entry.language
            )
        };

        // Pre-check gives the common case a clean error; the unique index
        // settles concurrent inserts.
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM seo_entries WHERE page = $1 AND language = $2)",
        )
        .bind(&entry.page)
        .bind(&entry.language)
        .fetch_one(&self.pool)
        .await?;
        if exists {
            return Err(StoreError::Duplicate(duplicate()));
        }

        sqlx::query("INSERT INTO seo_entries (id, page, language, body) VALUES ($1, $2, $3, $4)")
            .bind(entry.id)
            .bind(&entry.page)
            .bind(&entry.language)
            .bind(Json(&entry))
            .execute(&self.pool)
            .await
            .map_err(|e| duplicate_or(e, duplicate))?;
        Ok(entry)
    }

    async fn update_seo(&self, entry: SeoEntry) -> Result<SeoEntry, StoreError> {
        let result = sqlx::query(
            "UPDATE seo_entries SET page = $2, language = $3, body = $4, updated_at = now() \
             WHERE id = $1",
        )
        .bind(entry.id)
        .bind(&entry.page)
        .bind(&entry.language)
        .bind(Json(&entry))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            duplicate_or(e, || {
                format!(
                    "seo entry for page '{}' and language '{}'",
                    entry.page, entry.language
                )
            })
        })?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("seo entry {}", entry.id)));
        }
        Ok(entry)
    }

    async fn delete_seo(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM seo_entries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("seo entry {id}")));
        }
        Ok(())
    }

    async fn get_content(&self, doc_type: &str) -> Result<ContentDocument, StoreError> {
        let row: Option<Json<ContentDocument>> =
            sqlx::query_scalar("SELECT body FROM content_documents WHERE doc_type = $1")
                .bind(doc_type)
                .fetch_optional(&self.pool)
                .await?;
        row.map(|Json(doc)| doc)
            .ok_or_else(|| StoreError::NotFound(format!("content '{doc_type}'")))
    }

    async fn put_content(&self, doc: ContentDocument) -> Result<ContentDocument, StoreError> {
        sqlx::query(
            "INSERT INTO content_documents (doc_type, body) VALUES ($1, $2) \
             ON CONFLICT (doc_type) DO UPDATE SET body = EXCLUDED.body, updated_at = now()",
        )
        .bind(&doc.doc_type)
        .bind(Json(&doc))
        .execute(&self.pool)
        .await?;
        Ok(doc)
    }

    async fn list_cases(&self, include_unpublished: bool) -> Result<Vec<ClientCase>, StoreError> {
        let rows: Vec<Json<ClientCase>> = sqlx::query_scalar(
            "SELECT body FROM client_cases WHERE published OR $1 ORDER BY created_at DESC",
        )
        .bind(include_unpublished)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|Json(case)| case).collect())
    }

    async fn get_case(&self, slug: &str) -> Result<ClientCase, StoreError> {
        let row: Option<Json<ClientCase>> =
            sqlx::query_scalar("SELECT body FROM client_cases WHERE slug = $1")
                .bind(slug)
                .fetch_optional(&self.pool)
                .await?;
        row.map(|Json(case)| case)
            .ok_or_else(|| StoreError::NotFound(format!("client case '{slug}'")))
    }

    async fn insert_case(&self, case: ClientCase) -> Result<ClientCase, StoreError> {
        sqlx::query("INSERT INTO client_cases (slug, published, body) VALUES ($1, $2, $3)")
            .bind(&case.slug)
            .bind(case.published)
            .bind(Json(&case))
            .execute(&self.pool)
            .await
            .map_err(|e| duplicate_or(e, || format!("client case '{}'", case.slug)))?;
        Ok(case)
    }

    async fn replace_case(&self, slug: &str, case: ClientCase) -> Result<ClientCase, StoreError> {
        let result = sqlx::query(
            "UPDATE client_cases SET slug = $2, published = $3, body = $4, updated_at = now() \
             WHERE slug = $1",
        )
        .bind(slug)
        .bind(&case.slug)
        .bind(case.published)
        .bind(Json(&case))
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_or(e, || format!("client case '{}'", case.slug)))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("client case '{slug}'")));
        }
        Ok(case)
    }

    async fn delete_case(&self, slug: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM client_cases WHERE slug = $1")
            .bind(slug)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("client case '{slug}'")));
        }
        Ok(())
    }

    async fn insert_lead(&self, lead: LeadRecord) -> Result<LeadRecord, StoreError> {
        sqlx::query("INSERT INTO leads (id, email, body) VALUES ($1, $2, $3)")
            .bind(lead.id)
            .bind(&lead.fields.email)
            .bind(Json(&lead))
            .execute(&self.pool)
            .await?;
        Ok(lead)
    }

    async fn list_leads(&self) -> Result<Vec<LeadRecord>, StoreError> {
        let rows: Vec<Json<LeadRecord>> =
            sqlx::query_scalar("SELECT body FROM leads ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|Json(lead)| lead).collect())
    }

    async fn upsert_partial_lead(&self, lead: PartialLead) -> Result<PartialLeadRecord, StoreError> {
        let key = partial_key(&lead)?;
        let mut tx = self.pool.begin().await?;

        let existing: Option<Json<PartialLeadRecord>> = sqlx::query_scalar(
            "SELECT body FROM partial_leads WHERE contact_key = $1 FOR UPDATE",
        )
        .bind(&key)
        .fetch_optional(&mut *tx)
        .await?;

        let superseded: Option<Json<PartialLeadRecord>> = match superseded_key(&lead, &key) {
            Some(phone_key) => {
                sqlx::query_scalar("DELETE FROM partial_leads WHERE contact_key = $1 RETURNING body")
                    .bind(&phone_key)
                    .fetch_optional(&mut *tx)
                    .await?
            }
            None => None,
        };

        let existing = existing.or(superseded).map(|Json(r)| r);
        let record = merge_partial(existing, key, lead);
        sqlx::query(
            "INSERT INTO partial_leads (id, contact_key, body) VALUES ($1, $2, $3) \
             ON CONFLICT (contact_key) DO UPDATE SET body = EXCLUDED.body, updated_at = now()",
        )
        .bind(record.id)
        .bind(&record.key)
        .bind(Json(&record))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(record)
    }

    async fn list_partial_leads(&self) -> Result<Vec<PartialLeadRecord>, StoreError> {
        let rows: Vec<Json<PartialLeadRecord>> =
            sqlx::query_scalar("SELECT body FROM partial_leads ORDER BY updated_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|Json(record)| record).collect())
    }
}
