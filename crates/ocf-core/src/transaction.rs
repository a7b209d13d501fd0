use std::sync::Arc;

use tracing::warn;

use crate::error::{Error, ErrorKind, Result};

/// A unit of work bracketing the mutations of a resource operation.
///
/// A transaction ends with either [`Transaction::commit`] or
/// [`Transaction::drop_changes`]. Both consume the transaction, so exactly
/// one of them can be called.
///
/// Serializing conflicting writes to the same backing store is up to the
/// implementation.
pub trait Transaction: Send {
    /// Makes all changes performed within the transaction durable.
    ///
    /// # Errors
    ///
    /// Fails when the changes cannot be stored.
    fn commit(self: Box<Self>) -> Result<()>;

    /// Discards all changes performed within the transaction.
    ///
    /// # Errors
    ///
    /// Fails when the transaction cannot be released.
    fn drop_changes(self: Box<Self>) -> Result<()>;
}

/// A factory opening a new [`Transaction`].
pub type TransactionOpener = Arc<dyn Fn() -> Result<Box<dyn Transaction>> + Send + Sync>;

/// A [`Transaction`] for resources without a backing store.
///
/// Committing and dropping always succeed.
#[derive(Debug, Default, Clone, Copy)]
pub struct DummyTransaction;

impl Transaction for DummyTransaction {
    fn commit(self: Box<Self>) -> Result<()> {
        Ok(())
    }

    fn drop_changes(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

/// The state of a [`ScopedTransaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// The transaction accepts changes.
    Open,
    /// The transaction has been committed.
    Committed,
    /// The transaction has been dropped.
    Dropped,
}

/// A guard owning an open [`Transaction`].
///
/// When the guard goes out of scope while the transaction is still open,
/// the transaction is dropped.
pub struct ScopedTransaction {
    transaction: Option<Box<dyn Transaction>>,
    state: TransactionState,
}

impl std::fmt::Debug for ScopedTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedTransaction")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl ScopedTransaction {
    /// Opens a transaction with the given opener.
    ///
    /// Without an opener, a [`DummyTransaction`] is used.
    ///
    /// # Errors
    ///
    /// Fails when the opener fails.
    pub fn open(opener: Option<&TransactionOpener>) -> Result<Self> {
        let transaction: Box<dyn Transaction> = match opener {
            Some(opener) => opener()?,
            None => Box::new(DummyTransaction),
        };
        Ok(Self::new(transaction))
    }

    /// Wraps an open [`Transaction`].
    #[must_use]
    pub fn new(transaction: Box<dyn Transaction>) -> Self {
        Self {
            transaction: Some(transaction),
            state: TransactionState::Open,
        }
    }

    /// Returns the [`TransactionState`].
    #[must_use]
    pub const fn state(&self) -> TransactionState {
        self.state
    }

    /// Returns the open [`Transaction`].
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::Transaction`] once the transaction has been
    /// committed or dropped.
    pub fn transaction(&mut self) -> Result<&mut (dyn Transaction + 'static)> {
        let state = self.state;
        match self.transaction.as_deref_mut() {
            Some(transaction) => Ok(transaction),
            None => Err(terminated(state)),
        }
    }

    /// Commits the transaction.
    ///
    /// # Errors
    ///
    /// Fails when the transaction is no longer open or the commit fails.
    pub fn commit(&mut self) -> Result<()> {
        let transaction = self.take()?;
        self.state = TransactionState::Committed;
        transaction.commit()
    }

    /// Drops the transaction.
    ///
    /// # Errors
    ///
    /// Fails when the transaction is no longer open or it cannot be
    /// released.
    pub fn drop_changes(&mut self) -> Result<()> {
        let transaction = self.take()?;
        self.state = TransactionState::Dropped;
        transaction.drop_changes()
    }

    fn take(&mut self) -> Result<Box<dyn Transaction>> {
        let state = self.state;
        self.transaction.take().ok_or_else(|| terminated(state))
    }
}

impl Drop for ScopedTransaction {
    fn drop(&mut self) {
        if self.state == TransactionState::Open {
            if let Err(e) = self.drop_changes() {
                warn!("Unable to release an abandoned transaction: {e}");
            }
        }
    }
}

fn terminated(state: TransactionState) -> Error {
    Error::new(
        ErrorKind::Transaction,
        format!("The transaction is no longer open: {state:?}"),
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use crate::error::{Error, ErrorKind, Result};

    use super::{ScopedTransaction, Transaction, TransactionOpener, TransactionState};

    /// Terminal calls recorded by a [`RecordingTransaction`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) enum Outcome {
        Committed,
        Dropped,
    }

    /// A transaction recording its outcome, optionally failing to commit or
    /// to drop its changes.
    pub(crate) struct RecordingTransaction {
        outcomes: Arc<Mutex<Vec<Outcome>>>,
        fail_commit: bool,
        fail_drop: bool,
    }

    impl Transaction for RecordingTransaction {
        fn commit(self: Box<Self>) -> Result<()> {
            self.outcomes.lock().push(Outcome::Committed);
            if self.fail_commit {
                Err(Error::new(ErrorKind::Transaction, "Storage unavailable"))
            } else {
                Ok(())
            }
        }

        fn drop_changes(self: Box<Self>) -> Result<()> {
            self.outcomes.lock().push(Outcome::Dropped);
            if self.fail_drop {
                Err(Error::new(ErrorKind::Transaction, "Lock already released"))
            } else {
                Ok(())
            }
        }
    }

    pub(crate) fn recording_opener(
        fail_commit: bool,
    ) -> (TransactionOpener, Arc<Mutex<Vec<Outcome>>>) {
        opener(fail_commit, false)
    }

    pub(crate) fn failing_drop_opener() -> (TransactionOpener, Arc<Mutex<Vec<Outcome>>>) {
        opener(false, true)
    }

    fn opener(
        fail_commit: bool,
        fail_drop: bool,
    ) -> (TransactionOpener, Arc<Mutex<Vec<Outcome>>>) {
        let outcomes = Arc::new(Mutex::new(Vec::new()));
        let recorded = outcomes.clone();
        let opener: TransactionOpener = Arc::new(move || {
            Ok(Box::new(RecordingTransaction {
                outcomes: outcomes.clone(),
                fail_commit,
                fail_drop,
            }) as Box<dyn Transaction>)
        });
        (opener, recorded)
    }

    #[test]
    fn test_single_terminal_call() {
        let (opener, outcomes) = recording_opener(false);

        let mut transaction = ScopedTransaction::open(Some(&opener)).unwrap();
        assert_eq!(transaction.state(), TransactionState::Open);
        assert!(transaction.transaction().is_ok());

        transaction.commit().unwrap();
        assert_eq!(transaction.state(), TransactionState::Committed);

        // Once terminated, the transaction can no longer be used.
        assert_eq!(
            transaction.drop_changes().unwrap_err().kind(),
            ErrorKind::Transaction
        );
        assert_eq!(
            transaction.transaction().err().map(|e| e.kind()),
            Some(ErrorKind::Transaction)
        );

        drop(transaction);
        assert_eq!(*outcomes.lock(), [Outcome::Committed]);
    }

    #[test]
    fn test_dropped_when_out_of_scope() {
        let (opener, outcomes) = recording_opener(false);

        {
            let _transaction = ScopedTransaction::open(Some(&opener)).unwrap();
        }

        assert_eq!(*outcomes.lock(), [Outcome::Dropped]);
    }

    #[test]
    fn test_dummy_transaction() {
        let mut transaction = ScopedTransaction::open(None).unwrap();

        transaction.drop_changes().unwrap();
        assert_eq!(transaction.state(), TransactionState::Dropped);
    }

    #[test]
    fn test_failing_opener() {
        let opener: TransactionOpener =
            Arc::new(|| Err(Error::new(ErrorKind::Transaction, "Store is locked")));

        assert_eq!(
            ScopedTransaction::open(Some(&opener)).unwrap_err().kind(),
            ErrorKind::Transaction
        );
    }
}
