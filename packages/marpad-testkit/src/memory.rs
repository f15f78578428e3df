use std::{
	collections::HashMap,
	sync::{
		Mutex,
		atomic::{AtomicBool, Ordering},
	},
};

use uuid::Uuid;

use marpad_storage::{BoxFuture, Error, NoteStore, Result, models::Note};

/// In-process [`NoteStore`] for tests. `fail_writes` makes every mutating call fail the way an
/// unreachable database would, while lookups keep working.
#[derive(Default)]
pub struct MemoryNoteStore {
	notes: Mutex<HashMap<Uuid, Note>>,
	fail_writes: AtomicBool,
}
impl MemoryNoteStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn set_fail_writes(&self, fail: bool) {
		self.fail_writes.store(fail, Ordering::SeqCst);
	}

	pub fn insert(&self, note: Note) {
		self.lock().insert(note.id, note);
	}

	pub fn get(&self, id: Uuid) -> Option<Note> {
		self.lock().get(&id).cloned()
	}

	pub fn len(&self) -> usize {
		self.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Note>> {
		self.notes.lock().unwrap_or_else(|err| err.into_inner())
	}

	fn check_writable(&self) -> Result<()> {
		if self.fail_writes.load(Ordering::SeqCst) {
			return Err(Error::Sqlx(sqlx::Error::PoolClosed));
		}

		Ok(())
	}
}
impl NoteStore for MemoryNoteStore {
	fn find_by_id<'a>(&'a self, id: Uuid) -> BoxFuture<'a, Option<Note>> {
		Box::pin(async move { self.get(id) })
	}

	fn create<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Result<Note>> {
		Box::pin(async move {
			self.check_writable()?;

			let now = marpad_storage::models::now_utc();
			let note =
				Note { id: Uuid::new_v4(), code: code.to_string(), created_at: now, updated_at: now };

			self.insert(note.clone());

			Ok(note)
		})
	}

	fn update<'a>(&'a self, id: Uuid, code: &'a str) -> BoxFuture<'a, Result<Note>> {
		Box::pin(async move {
			self.check_writable()?;

			let mut notes = self.lock();
			let note = notes.get_mut(&id).ok_or_else(|| Error::NotFound(format!("note {id}")))?;

			note.code = code.to_string();
			note.updated_at = marpad_storage::models::now_utc().max(note.updated_at);

			Ok(note.clone())
		})
	}

	fn delete<'a>(&'a self, id: Uuid) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			self.check_writable()?;

			self.lock()
				.remove(&id)
				.map(|_| ())
				.ok_or_else(|| Error::NotFound(format!("note {id}")))
		})
	}
}
