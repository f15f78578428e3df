use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A persisted diagram source. `id` and `created_at` never change after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Note {
	pub id: Uuid,
	pub code: String,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
	#[serde(with = "crate::time_serde")]
	pub updated_at: OffsetDateTime,
}

/// Current time truncated to the microsecond precision of `timestamptz`.
pub fn now_utc() -> OffsetDateTime {
	let now = OffsetDateTime::now_utc();

	now.replace_nanosecond(now.nanosecond() / 1_000 * 1_000).unwrap_or(now)
}
