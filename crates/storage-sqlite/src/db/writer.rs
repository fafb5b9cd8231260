//! Single-writer actor for database mutations.
//!
//! SQLite allows one writer at a time; instead of letting pooled
//! connections fight over the write lock, all mutations are sent to one
//! background task that owns a dedicated connection and applies jobs
//! serially, each inside an immediate transaction. This is what makes an
//! individual record's upsert atomic and lets overlapping refreshes
//! interleave safely (last write wins, never a torn row).

use diesel::SqliteConnection;
use std::any::Any;
use tokio::sync::{mpsc, oneshot};

use super::DbPool;
use crate::errors::StorageError;
use econatlas_core::errors::{DatabaseError, Error, Result};

/// Queue depth for pending write jobs. A full refresh enqueues one job per
/// country, well under this bound.
const WRITE_QUEUE_DEPTH: usize = 1024;

/// A write job with its result type erased so jobs of different types can
/// share one channel.
type WriteJob = Box<dyn FnOnce(&mut SqliteConnection) -> Result<Box<dyn Any + Send>> + Send>;

type WriteReply = oneshot::Sender<Result<Box<dyn Any + Send>>>;

/// Cloneable handle for submitting jobs to the writer actor.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<(WriteJob, WriteReply)>,
}

impl WriteHandle {
    /// Spawn the writer actor on the current Tokio runtime. The actor checks
    /// one connection out of the pool and holds it for its lifetime.
    pub fn spawn(pool: DbPool) -> Self {
        let (tx, mut rx) = mpsc::channel::<(WriteJob, WriteReply)>(WRITE_QUEUE_DEPTH);

        tokio::spawn(async move {
            let mut conn = match pool.get() {
                Ok(conn) => conn,
                Err(e) => {
                    // Dropping `rx` makes every pending and future exec fail
                    // with a writer-stopped error instead of hanging.
                    log::error!("database writer could not acquire a connection: {}", e);
                    return;
                }
            };

            while let Some((job, reply)) = rx.recv().await {
                let result = conn
                    .immediate_transaction::<_, StorageError, _>(|c| {
                        job(c).map_err(StorageError::from)
                    })
                    .map_err(Error::from);
                // The requester may have gone away; nothing to do then.
                let _ = reply.send(result);
            }
        });

        Self { tx }
    }

    /// Run a database job on the writer's dedicated connection, inside its
    /// own transaction, and return its result.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Any + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let erased: WriteJob =
            Box::new(move |conn| job(conn).map(|value| Box::new(value) as Box<dyn Any + Send>));

        self.tx.send((erased, reply_tx)).await.map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "database writer has stopped".to_string(),
            ))
        })?;

        let result = reply_rx.await.map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "database writer dropped the reply".to_string(),
            ))
        })?;

        result.and_then(|boxed| {
            boxed.downcast::<T>().map(|value| *value).map_err(|_| {
                Error::Database(DatabaseError::Internal(
                    "database writer returned an unexpected type".to_string(),
                ))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations};
    use diesel::prelude::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_exec_returns_job_result() {
        let dir = tempdir().unwrap();
        let pool = create_pool(dir.path().join("test.db").to_str().unwrap()).unwrap();
        run_migrations(&pool).unwrap();
        let writer = WriteHandle::spawn((*pool).clone());

        let value = writer
            .exec(|conn| {
                diesel::sql_query("INSERT INTO countries (name, population) VALUES ('Aland', 1000)")
                    .execute(conn)
                    .map_err(|e| StorageError::from(e).into())
            })
            .await
            .unwrap();
        assert_eq!(value, 1);
    }

    #[tokio::test]
    async fn test_job_error_propagates() {
        let dir = tempdir().unwrap();
        let pool = create_pool(dir.path().join("test.db").to_str().unwrap()).unwrap();
        run_migrations(&pool).unwrap();
        let writer = WriteHandle::spawn((*pool).clone());

        let result: Result<usize> = writer
            .exec(|conn| {
                diesel::sql_query("INSERT INTO no_such_table (name) VALUES ('x')")
                    .execute(conn)
                    .map_err(|e| StorageError::from(e).into())
            })
            .await;
        assert!(matches!(result, Err(Error::Database(_))));
    }
}
