//! Scoped transaction guard for multi-statement mutations.
//!
//! # Responsibility
//! - Open one `IMMEDIATE` transaction per mutation and end it exactly once.
//! - Hand the connection back in autocommit mode on every exit path.
//!
//! # Invariants
//! - States move `Open -> Committed | RolledBack`; nothing reopens a guard.
//! - Dropping an open guard rolls back.
//! - A rollback failure is reported next to the primary failure, not instead
//!   of it.
//! - Nesting is not supported: `begin` on a connection that is already inside
//!   a transaction fails.

use super::{DbError, DbResult};
use log::{debug, error, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::time::Instant;

/// Terminal state of a guarded transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxOutcome {
    Committed,
    RolledBack,
}

impl TxOutcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Committed => "committed",
            Self::RolledBack => "rolled_back",
        }
    }
}

/// Error types that can absorb transaction-control failures.
pub trait TxFailure: Sized {
    /// Builds the error reported when `BEGIN` or `COMMIT` fails.
    fn from_tx_failure(operation: &'static str, source: DbError) -> Self;
    /// Records a failed rollback alongside `self`.
    fn with_rollback_failure(self, rollback_error: DbError) -> Self;
}

/// Open transaction bound to one operation name.
pub struct TxGuard<'conn> {
    conn: &'conn Connection,
    tx: Option<Transaction<'conn>>,
    operation: &'static str,
    started_at: Instant,
}

impl<'conn> TxGuard<'conn> {
    /// Starts an `IMMEDIATE` transaction so the write lock is held from the
    /// first read onwards.
    pub fn begin(conn: &'conn Connection, operation: &'static str) -> DbResult<Self> {
        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
        debug!("event=tx_begin module=tx status=ok operation={operation}");
        Ok(Self {
            conn,
            tx: Some(tx),
            operation,
            started_at: Instant::now(),
        })
    }

    /// Connection to run statements on while the transaction is open.
    pub fn conn(&self) -> &Connection {
        match self.tx.as_ref() {
            Some(tx) => &**tx,
            None => self.conn,
        }
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Commits. A failed commit leaves the transaction rolled back.
    pub fn commit(mut self) -> DbResult<()> {
        let result = match self.tx.take() {
            Some(tx) => tx.commit(),
            None => Ok(()),
        };
        match result {
            Ok(()) => {
                self.finish(TxOutcome::Committed);
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=tx_commit module=tx status=error operation={} error={}",
                    self.operation, err
                );
                self.finish(TxOutcome::RolledBack);
                Err(err.into())
            }
        }
    }

    /// Rolls back and returns the rollback failure, if any.
    pub fn rollback(mut self) -> DbResult<()> {
        let result = match self.tx.take() {
            Some(tx) => tx.rollback(),
            None => Ok(()),
        };
        self.finish(TxOutcome::RolledBack);
        result.map_err(DbError::from)
    }

    fn finish(&self, outcome: TxOutcome) {
        restore_autocommit(self.conn, self.operation);
        debug!(
            "event=tx_end module=tx status=ok operation={} outcome={} duration_ms={}",
            self.operation,
            outcome.as_str(),
            self.started_at.elapsed().as_millis()
        );
    }
}

impl Drop for TxGuard<'_> {
    fn drop(&mut self) {
        let Some(tx) = self.tx.take() else {
            return;
        };
        warn!(
            "event=tx_end module=tx status=abandoned operation={}",
            self.operation
        );
        if let Err(err) = tx.rollback() {
            error!(
                "event=tx_rollback module=tx status=error operation={} error={}",
                self.operation, err
            );
        }
        self.finish(TxOutcome::RolledBack);
    }
}

/// Runs `body` inside one transaction.
///
/// Commits when `body` succeeds; otherwise rolls back and returns the body's
/// error, carrying any rollback failure as secondary detail.
pub fn with_transaction<T, E, F>(
    conn: &Connection,
    operation: &'static str,
    body: F,
) -> Result<T, E>
where
    E: TxFailure,
    F: FnOnce(&Connection) -> Result<T, E>,
{
    let guard =
        TxGuard::begin(conn, operation).map_err(|err| E::from_tx_failure(operation, err))?;

    match body(guard.conn()) {
        Ok(value) => {
            guard
                .commit()
                .map_err(|err| E::from_tx_failure(operation, err))?;
            Ok(value)
        }
        Err(primary) => match guard.rollback() {
            Ok(()) => Err(primary),
            Err(rollback_error) => {
                error!(
                    "event=tx_rollback module=tx status=error operation={operation} error={rollback_error}"
                );
                Err(primary.with_rollback_failure(rollback_error))
            }
        },
    }
}

fn restore_autocommit(conn: &Connection, operation: &'static str) {
    if conn.is_autocommit() {
        return;
    }
    warn!("event=tx_restore_autocommit module=tx status=start operation={operation}");
    if let Err(err) = conn.execute_batch("ROLLBACK;") {
        error!(
            "event=tx_restore_autocommit module=tx status=error operation={operation} error={err}"
        );
    }
}
