//! PostgreSQL-based snippet storage.
//!
//! Holds one connection for the life of the store; no pool. The blocking
//! [`SnippetStore`](crate::storage::SnippetStore) API drives `tokio-postgres`
//! on a private current-thread runtime.

#[cfg(feature = "postgres")]
#[allow(clippy::await_holding_lock)]
mod implementation {
    use crate::config::validate_table_name;
    use crate::models::{Lookup, Snippet, SortColumn};
    use crate::storage::sqlite::acquire_lock;
    use crate::storage::{InsertOutcome, SnippetStore};
    use crate::{Error, Result};
    use std::sync::{Mutex, PoisonError};
    use tokio::runtime::{Builder, Runtime};
    use tokio::task::JoinHandle;
    use tokio_postgres::error::SqlState;
    use tokio_postgres::{Client, NoTls, Row, Transaction};

    /// PostgreSQL-based snippet storage.
    pub struct PostgresSnippetStore {
        /// The single client connection.
        client: Mutex<Client>,
        /// Task driving the connection socket.
        connection: JoinHandle<()>,
        /// Table holding the snippets.
        table: String,
        /// Runtime for blocking operations.
        runtime: Runtime,
    }

    impl PostgresSnippetStore {
        /// Connects to PostgreSQL.
        ///
        /// # Arguments
        ///
        /// * `connection_url` - PostgreSQL connection URL
        /// * `table` - Table holding the snippets
        /// * `create_table` - Create the table if it does not exist
        ///
        /// # Errors
        ///
        /// Returns an error if the table name is invalid, the connection cannot
        /// be established, or the table cannot be created.
        pub fn connect(
            connection_url: &str,
            table: impl Into<String>,
            create_table: bool,
        ) -> Result<Self> {
            let table = table.into();
            validate_table_name(&table)?;

            let runtime = Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| Error::operation("create_tokio_runtime", e))?;

            tracing::debug!("Connecting to PostgreSQL");
            let (client, connection) = runtime
                .block_on(tokio_postgres::connect(connection_url, NoTls))
                .map_err(|e| Error::operation("connect_postgres", e))?;
            let connection = runtime.spawn(async move {
                if let Err(e) = connection.await {
                    tracing::error!(error = %e, "PostgreSQL connection error");
                }
            });
            tracing::debug!("Database connection established.");

            let store = Self {
                client: Mutex::new(client),
                connection,
                table,
                runtime,
            };

            if create_table {
                store.initialize()?;
            }
            Ok(store)
        }

        /// Creates the snippets table if it does not exist.
        fn initialize(&self) -> Result<()> {
            let table = &self.table;
            let client = acquire_lock(&self.client);

            self.runtime
                .block_on(client.batch_execute(&format!(
                    "CREATE TABLE IF NOT EXISTS {table} (
                        keyword TEXT NOT NULL,
                        message TEXT NOT NULL,
                        hidden BOOLEAN NOT NULL DEFAULT FALSE,
                        PRIMARY KEY (keyword, hidden)
                    )"
                )))
                .map_err(|e| Error::operation("create_snippets_table", e))
        }

        /// Attempts the insert inside a savepoint.
        ///
        /// On a uniqueness violation the savepoint is rolled back, leaving the
        /// enclosing transaction usable for the compensating update.
        async fn try_insert(
            tx: &mut Transaction<'_>,
            table: &str,
            keyword: &str,
            message: &str,
            hidden: bool,
        ) -> Result<InsertOutcome> {
            let sp = tx
                .savepoint("snippet_insert")
                .await
                .map_err(|e| Error::operation("insert_snippet", e))?;

            let query =
                format!("INSERT INTO {table} (keyword, message, hidden) VALUES ($1, $2, $3)");
            let inserted = sp.execute(&query, &[&keyword, &message, &hidden]).await;
            match inserted {
                Ok(_) => {
                    sp.commit()
                        .await
                        .map_err(|e| Error::operation("insert_snippet", e))?;
                    Ok(InsertOutcome::Inserted)
                },
                Err(e) if e.code() == Some(&SqlState::UNIQUE_VIOLATION) => {
                    sp.rollback()
                        .await
                        .map_err(|e| Error::operation("insert_snippet", e))?;
                    Ok(InsertOutcome::Conflict)
                },
                Err(e) => Err(Error::operation("insert_snippet", e)),
            }
        }

        fn read_snippet(row: &Row) -> Result<Snippet> {
            let read = |e: tokio_postgres::Error| Error::operation("read_snippet_row", e);
            Ok(Snippet {
                keyword: row.try_get("keyword").map_err(read)?,
                message: row.try_get("message").map_err(read)?,
                hidden: row.try_get("hidden").map_err(read)?,
            })
        }

        /// Runs a visible-rows query inside a read transaction.
        fn query_snippets(
            &self,
            operation: &str,
            query: &str,
            params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
        ) -> Result<Vec<Snippet>> {
            let mut client = acquire_lock(&self.client);

            self.runtime.block_on(async {
                let tx = client
                    .transaction()
                    .await
                    .map_err(|e| Error::operation(operation, e))?;
                let rows = tx.query(query, params).await.map_err(|e| {
                    if e.code() == Some(&SqlState::INVALID_REGULAR_EXPRESSION) {
                        Error::InvalidInput(format!("invalid search pattern: {e}"))
                    } else {
                        Error::operation(operation, e)
                    }
                })?;
                tx.commit()
                    .await
                    .map_err(|e| Error::operation(operation, e))?;

                rows.iter().map(Self::read_snippet).collect()
            })
        }
    }

    impl SnippetStore for PostgresSnippetStore {
        fn store(&self, keyword: &str, message: &str, hidden: bool) -> Result<Snippet> {
            let table = self.table.as_str();
            let mut client = acquire_lock(&self.client);

            self.runtime.block_on(async {
                let mut tx = client
                    .transaction()
                    .await
                    .map_err(|e| Error::operation("store_snippet", e))?;

                match Self::try_insert(&mut tx, table, keyword, message, hidden).await? {
                    InsertOutcome::Inserted => {},
                    InsertOutcome::Conflict => {
                        tracing::debug!(keyword, hidden, "Snippet exists, updating message");
                        tx.execute(
                            &format!(
                                "UPDATE {table} SET message = $1 WHERE keyword = $2 AND hidden = $3"
                            ),
                            &[&message, &keyword, &hidden],
                        )
                        .await
                        .map_err(|e| Error::operation("update_snippet", e))?;
                    },
                }

                tx.commit()
                    .await
                    .map_err(|e| Error::operation("store_snippet", e))
            })?;

            Ok(Snippet::new(keyword, message, hidden))
        }

        fn fetch(&self, keyword: &str) -> Result<Lookup> {
            let table = self.table.as_str();
            let mut client = acquire_lock(&self.client);

            let message = self.runtime.block_on(async {
                let tx = client
                    .transaction()
                    .await
                    .map_err(|e| Error::operation("fetch_snippet", e))?;
                let row = tx
                    .query_opt(
                        &format!(
                            "SELECT message FROM {table} WHERE keyword = $1 ORDER BY hidden LIMIT 1"
                        ),
                        &[&keyword],
                    )
                    .await
                    .map_err(|e| Error::operation("fetch_snippet", e))?;
                tx.commit()
                    .await
                    .map_err(|e| Error::operation("fetch_snippet", e))?;

                row.map(|row| row.try_get::<_, String>("message"))
                    .transpose()
                    .map_err(|e| Error::operation("read_snippet_row", e))
            })?;

            Ok(Lookup {
                keyword: keyword.to_string(),
                message,
            })
        }

        fn list(&self, order: SortColumn) -> Result<Vec<Snippet>> {
            let table = &self.table;
            let column = order.as_sql();

            self.query_snippets(
                "list_snippets",
                &format!(
                    "SELECT keyword, message, hidden FROM {table}
                     WHERE NOT hidden
                     ORDER BY {column}, keyword"
                ),
                &[],
            )
        }

        fn search(&self, pattern: &str) -> Result<Vec<Snippet>> {
            let table = &self.table;

            self.query_snippets(
                "search_snippets",
                &format!(
                    "SELECT keyword, message, hidden FROM {table}
                     WHERE NOT hidden AND message ~* $1
                     ORDER BY keyword"
                ),
                &[&pattern],
            )
        }

        fn table_name(&self) -> &str {
            &self.table
        }

        fn close(self: Box<Self>) -> Result<()> {
            let Self {
                client,
                connection,
                runtime,
                ..
            } = *self;

            // Dropping the client ends the connection task.
            drop(client.into_inner().unwrap_or_else(PoisonError::into_inner));
            runtime
                .block_on(connection)
                .map_err(|e| Error::operation("close_postgres", e))?;
            tracing::debug!("Database connection closed.");
            Ok(())
        }
    }
}

#[cfg(feature = "postgres")]
pub use implementation::PostgresSnippetStore;

#[cfg(not(feature = "postgres"))]
mod stub {
    use crate::{Error, Result};

    /// Stub PostgreSQL snippet storage when the feature is not enabled.
    pub struct PostgresSnippetStore {
        _private: (),
    }

    impl PostgresSnippetStore {
        /// Connects to PostgreSQL (stub).
        ///
        /// # Errors
        ///
        /// Always returns [`Error::FeatureNotEnabled`] because the feature is not enabled.
        pub fn connect(
            _connection_url: &str,
            _table: impl Into<String>,
            _create_table: bool,
        ) -> Result<Self> {
            Err(Error::FeatureNotEnabled("postgres".to_string()))
        }
    }
}

#[cfg(not(feature = "postgres"))]
pub use stub::PostgresSnippetStore;
