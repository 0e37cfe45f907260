//! Process-wide shared database connection.
//!
//! [`ConnectionHandle`] owns at most one live connection. Readers share it
//! freely; when it is missing or reports closed, callers serialize on the
//! init lock and the first one through recreates it. Everyone after that
//! sees the fresh connection on the re-check.

use std::sync::{Arc, Mutex, RwLock};

use tracing::{info, warn};

use crate::errors::StoreError;

/// Opens connections for a [`ConnectionHandle`].
pub trait Connector: Send + Sync + 'static {
    type Connection: Send + Sync + 'static;

    /// Opens a new connection. Called while holding the init lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    fn connect(&self) -> Result<Self::Connection, StoreError>;

    /// Must not wait on statements running over `connection`; a connection
    /// that is busy counts as open.
    fn is_closed(&self, connection: &Self::Connection) -> bool;
}

#[derive(Debug)]
struct Slot<T> {
    connection: Option<Arc<T>>,
    shut_down: bool,
}

pub struct ConnectionHandle<C: Connector> {
    connector: C,
    slot: RwLock<Slot<C::Connection>>,
    init_lock: Mutex<()>,
}

impl<C: Connector> ConnectionHandle<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            slot: RwLock::new(Slot {
                connection: None,
                shut_down: false,
            }),
            init_lock: Mutex::new(()),
        }
    }

    /// Returns the shared connection, creating it if absent or closed.
    ///
    /// This blocks; call it from a blocking context.
    ///
    /// # Errors
    ///
    /// Returns an error after [`shutdown`](Self::shutdown), or when a new
    /// connection cannot be opened.
    pub fn acquire(&self) -> Result<Arc<C::Connection>, StoreError> {
        if let Some(conn) = self.current()? {
            return Ok(conn);
        }

        let _guard = self
            .init_lock
            .lock()
            .map_err(|_| StoreError::msg("Connection handle", "init lock poisoned"))?;

        // Another caller may have finished while we waited for the lock.
        if let Some(conn) = self.current()? {
            return Ok(conn);
        }

        info!("Opening database connection");
        let conn = Arc::new(self.connector.connect()?);
        let mut slot = self.write_slot()?;
        if slot.shut_down {
            return Err(StoreError::msg("Connection handle", "handle is shut down"));
        }
        let stale = slot.connection.replace(Arc::clone(&conn));
        drop(slot);
        drop(stale);
        info!("Database connection established");
        Ok(conn)
    }

    /// Hands a connection back. A connection that has gone bad is evicted so
    /// the next [`acquire`](Self::acquire) replaces it.
    pub fn release(&self, connection: Arc<C::Connection>) {
        if !self.connector.is_closed(&connection) {
            return;
        }
        warn!("Releasing closed database connection; evicting it");
        if let Ok(mut slot) = self.slot.write()
            && slot
                .connection
                .as_ref()
                .is_some_and(|current| Arc::ptr_eq(current, &connection))
        {
            slot.connection = None;
        }
    }

    /// Drops the shared connection and refuses further acquisitions.
    pub fn shutdown(&self) {
        let stale = match self.slot.write() {
            Ok(mut slot) => {
                slot.shut_down = true;
                slot.connection.take()
            }
            Err(poisoned) => {
                let mut slot = poisoned.into_inner();
                slot.shut_down = true;
                slot.connection.take()
            }
        };
        if stale.is_some() {
            info!("Closing database connection");
        }
    }

    /// Returns whether a live connection is currently held.
    pub fn is_connected(&self) -> bool {
        self.current().ok().flatten().is_some()
    }

    fn current(&self) -> Result<Option<Arc<C::Connection>>, StoreError> {
        let connection = {
            let slot = self
                .slot
                .read()
                .map_err(|_| StoreError::msg("Connection handle", "slot lock poisoned"))?;
            if slot.shut_down {
                return Err(StoreError::msg("Connection handle", "handle is shut down"));
            }
            slot.connection.clone()
        };
        // Checked after the slot lock is released.
        Ok(connection.filter(|conn| !self.connector.is_closed(conn)))
    }

    fn write_slot(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, Slot<C::Connection>>, StoreError> {
        self.slot
            .write()
            .map_err(|_| StoreError::msg("Connection handle", "slot lock poisoned"))
    }
}
