use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, types::Json, FromRow, PgPool};
use uuid::Uuid;

use super::{SnippetStore, StoreError};
use crate::models::{NewSnippet, Snippet, SnippetChanges, SnippetId, Tag};

const SELECT_SNIPPETS: &str = r#"
    SELECT
        s.id,
        s.heading,
        s.code,
        s.language,
        s.owner_id,
        s.created_at,
        s.updated_at,
        COALESCE(
          json_agg(json_build_object('id', t.id, 'name', t.name) ORDER BY st.position)
          FILTER (WHERE t.id IS NOT NULL),
          '[]'::json
        ) AS tags
    FROM snippets s
    LEFT JOIN snippet_tags st
      ON st.snippet_id = s.id
    LEFT JOIN tags t
      ON t.id = st.tag_id
"#;

#[derive(FromRow)]
struct SnippetRow {
    id: SnippetId,
    heading: String,
    code: String,
    language: String,
    owner_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    tags: Json<Vec<Tag>>,
}

impl From<SnippetRow> for Snippet {
    fn from(row: SnippetRow) -> Self {
        Snippet {
            id: row.id,
            heading: row.heading,
            code: row.code,
            language: row.language,
            owner_id: row.owner_id,
            tags: row.tags.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct PgSnippetStore {
    db: PgPool,
}

impl PgSnippetStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let db = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(db))
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.db).await?;
        Ok(())
    }
}

#[async_trait]
impl SnippetStore for PgSnippetStore {
    async fn find_by_id(&self, id: SnippetId) -> Result<Option<Snippet>, StoreError> {
        let sql = format!("{SELECT_SNIPPETS} WHERE s.id = $1 GROUP BY s.id");
        let row = sqlx::query_as::<_, SnippetRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.map(Snippet::from))
    }

    async fn find_all_by_owner(&self, owner_id: Uuid) -> Result<Vec<Snippet>, StoreError> {
        let sql = format!(
            "{SELECT_SNIPPETS} WHERE s.owner_id = $1 GROUP BY s.id ORDER BY s.created_at DESC, s.id DESC"
        );
        let rows = sqlx::query_as::<_, SnippetRow>(&sql)
            .bind(owner_id)
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Snippet::from).collect())
    }

    async fn insert(&self, snippet: NewSnippet) -> Result<Snippet, StoreError> {
        let mut tx = self.db.begin().await?;

        let (id,): (SnippetId,) = sqlx::query_as(
            r#"
            INSERT INTO snippets (heading, code, language, owner_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&snippet.heading)
        .bind(&snippet.code)
        .bind(&snippet.language)
        .bind(snippet.owner_id)
        .fetch_one(&mut *tx)
        .await?;

        for (position, name) in snippet.tags.iter().enumerate() {
            // DO UPDATE so RETURNING yields the id of an existing tag too.
            let (tag_id,): (i64,) = sqlx::query_as(
                r#"
                INSERT INTO tags (name)
                VALUES ($1)
                ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
                RETURNING id
                "#,
            )
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;

            let position = i32::try_from(position)
                .map_err(|_| StoreError::Backend(format!("too many tags on snippet {id}")))?;

            sqlx::query(
                r#"
                INSERT INTO snippet_tags (snippet_id, tag_id, position)
                VALUES ($1, $2, $3)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(id)
            .bind(tag_id)
            .bind(position)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::Backend(format!("snippet {id} vanished after insert")))
    }

    async fn update(&self, id: SnippetId, changes: SnippetChanges) -> Result<Option<Snippet>, StoreError> {
        let updated: Option<(SnippetId,)> = sqlx::query_as(
            r#"
            UPDATE snippets
            SET
                heading    = COALESCE($2, heading),
                code       = COALESCE($3, code),
                language   = COALESCE($4, language),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(changes.heading)
        .bind(changes.code)
        .bind(changes.language)
        .fetch_optional(&self.db)
        .await?;

        match updated {
            Some(_) => self.find_by_id(id).await,
            None => Ok(None),
        }
    }

    async fn delete(&self, id: SnippetId) -> Result<bool, StoreError> {
        let rec: Option<(SnippetId,)> = sqlx::query_as(
            r#"
            DELETE FROM snippets
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(rec.is_some())
    }
}
