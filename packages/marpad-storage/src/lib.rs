pub mod db;
pub mod models;
pub mod notes;
pub mod schema;
pub mod time_serde;

mod error;

pub use error::Error;
pub use notes::{NoteStore, PgNoteStore};

use std::{future::Future, pin::Pin};

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
