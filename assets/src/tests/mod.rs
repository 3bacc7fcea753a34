use std::sync::atomic::{AtomicUsize, Ordering};

use crate::assetservice::{AssetService, Operation, OperationResult};
use crate::Error;


/// Wraps an [AssetService], counting the calls that reach it.
pub struct CountingAssetService<S> {
    inner: S,
    performed: AtomicUsize,
    batches: AtomicUsize,
}

impl<S: AssetService> CountingAssetService<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            performed: AtomicUsize::new(0),
            batches: AtomicUsize::new(0),
        }
    }

    /// Number of single operations performed, not counting those sent in a
    /// batch.
    pub fn performed(&self) -> usize {
        self.performed.load(Ordering::SeqCst)
    }

    pub fn batches(&self) -> usize {
        self.batches.load(Ordering::SeqCst)
    }
}

impl<S: AssetService> AssetService for CountingAssetService<S> {
    fn perform(&self, operation: Operation) -> Result<OperationResult, Error> {
        self.performed.fetch_add(1, Ordering::SeqCst);
        self.inner.perform(operation)
    }

    fn batch(&self, operations: Vec<Operation>) -> Result<Vec<OperationResult>, Error> {
        self.batches.fetch_add(1, Ordering::SeqCst);
        self.inner.batch(operations)
    }
}
