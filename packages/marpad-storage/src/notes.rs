use sqlx::PgPool;
use uuid::Uuid;

use crate::{BoxFuture, Error, Result, db::Db, models::Note};

/// Persistence operations behind the notes API.
///
/// `find_by_id` reports lookup failures as a miss; `update` and `delete` are single statements
/// that tell an absent note ([`Error::NotFound`]) apart from a storage failure.
pub trait NoteStore
where
	Self: Send + Sync,
{
	fn find_by_id<'a>(&'a self, id: Uuid) -> BoxFuture<'a, Option<Note>>;

	fn create<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Result<Note>>;

	fn update<'a>(&'a self, id: Uuid, code: &'a str) -> BoxFuture<'a, Result<Note>>;

	fn delete<'a>(&'a self, id: Uuid) -> BoxFuture<'a, Result<()>>;
}

pub struct PgNoteStore {
	pool: PgPool,
}
impl PgNoteStore {
	pub fn new(db: Db) -> Self {
		Self { pool: db.pool }
	}
}
impl NoteStore for PgNoteStore {
	fn find_by_id<'a>(&'a self, id: Uuid) -> BoxFuture<'a, Option<Note>> {
		Box::pin(async move {
			match find_note(&self.pool, id).await {
				Ok(note) => note,
				Err(err) => {
					tracing::error!(note_id = %id, error = %err, "Note lookup failed.");

					None
				},
			}
		})
	}

	fn create<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Result<Note>> {
		Box::pin(insert_note(&self.pool, code))
	}

	fn update<'a>(&'a self, id: Uuid, code: &'a str) -> BoxFuture<'a, Result<Note>> {
		Box::pin(update_note(&self.pool, id, code))
	}

	fn delete<'a>(&'a self, id: Uuid) -> BoxFuture<'a, Result<()>> {
		Box::pin(delete_note(&self.pool, id))
	}
}

pub async fn find_note(pool: &PgPool, id: Uuid) -> Result<Option<Note>> {
	let note = sqlx::query_as::<_, Note>(
		"\
SELECT id, code, created_at, updated_at
FROM notes
WHERE id = $1",
	)
	.bind(id)
	.fetch_optional(pool)
	.await?;

	Ok(note)
}

pub async fn insert_note(pool: &PgPool, code: &str) -> Result<Note> {
	let now = crate::models::now_utc();
	let note = sqlx::query_as::<_, Note>(
		"\
INSERT INTO notes (id, code, created_at, updated_at)
VALUES ($1, $2, $3, $3)
RETURNING id, code, created_at, updated_at",
	)
	.bind(Uuid::new_v4())
	.bind(code)
	.bind(now)
	.fetch_one(pool)
	.await?;

	tracing::debug!(note_id = %note.id, "Note created.");

	Ok(note)
}

pub async fn update_note(pool: &PgPool, id: Uuid, code: &str) -> Result<Note> {
	let now = crate::models::now_utc();
	let note = sqlx::query_as::<_, Note>(
		"\
UPDATE notes
SET
	code = $1,
	updated_at = GREATEST($2, updated_at)
WHERE id = $3
RETURNING id, code, created_at, updated_at",
	)
	.bind(code)
	.bind(now)
	.bind(id)
	.fetch_optional(pool)
	.await?
	.ok_or_else(|| Error::NotFound(format!("note {id}")))?;

	tracing::debug!(note_id = %note.id, "Note updated.");

	Ok(note)
}

pub async fn delete_note(pool: &PgPool, id: Uuid) -> Result<()> {
	let result = sqlx::query("DELETE FROM notes WHERE id = $1").bind(id).execute(pool).await?;

	if result.rows_affected() == 0 {
		return Err(Error::NotFound(format!("note {id}")));
	}

	tracing::debug!(note_id = %id, "Note deleted.");

	Ok(())
}
