//! Storage identity and alias analysis.

use std::cell::RefCell;
use std::ops::{Deref, DerefMut};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use traits::{MatrixExpr, StorageOrder, VectorExpr};

/// Identity of the storage viewed by a container handle: the buffer plus the shape and layout
/// it is viewed with. Two handles alias if they share a buffer; they are the same if they also
/// view it identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AliasKey {
    pub buffer: usize,
    pub rows: usize,
    pub columns: usize,
    pub order: StorageOrder,
}
impl AliasKey {
    pub fn new(buffer: usize, rows: usize, columns: usize, order: StorageOrder) -> AliasKey {
        AliasKey { buffer, rows, columns, order }
    }
    #[inline]
    pub fn shares_buffer(&self, other: &AliasKey) -> bool {
        self.buffer == other.buffer
    }
}

/// Outcome of checking an expression against an assignment target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasVerdict {
    /// No operand touches the target's storage.
    Disjoint,
    /// The target only appears where it can be used as its own accumulator.
    InPlace,
    /// Direct evaluation could read overwritten values.
    Overlapping,
}
impl AliasVerdict {
    pub fn needs_temporary(self) -> bool {
        self == AliasVerdict::Overlapping
    }
}

pub fn analyze<E: MatrixExpr>(key: &AliasKey, expr: &E) -> AliasVerdict {
    if expr.can_alias(key) {
        AliasVerdict::Overlapping
    } else if expr.is_aliased(key) {
        AliasVerdict::InPlace
    } else {
        AliasVerdict::Disjoint
    }
}

pub fn analyze_vector<V: VectorExpr>(key: &AliasKey, expr: &V) -> AliasVerdict {
    if expr.can_alias(key) {
        AliasVerdict::Overlapping
    } else if expr.is_aliased(key) {
        AliasVerdict::InPlace
    } else {
        AliasVerdict::Disjoint
    }
}

const UNDETECTED: &'static str = "aliased assignment not detected: storage is locked for writing";

thread_local! {
    // storage locks this thread currently holds for writing
    static WRITING: RefCell<Vec<usize>> = RefCell::new(Vec::new());
}

fn address<V>(lock: &RwLock<V>) -> usize {
    lock as *const RwLock<V> as usize
}

fn held_for_writing(address: usize) -> bool {
    WRITING.with(|writing| writing.borrow().contains(&address))
}

/// Shared read access to container storage. Waits while another thread writes the storage, and
/// panics if the calling thread is writing it, which only happens if alias analysis missed an
/// overlap.
pub fn read_lock<V>(lock: &RwLock<V>) -> RwLockReadGuard<V> {
    if held_for_writing(address(lock)) {
        panic!("{}", UNDETECTED);
    }
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

/// Exclusive access to container storage, registered with the calling thread until dropped.
pub struct WriteGuard<'a, V: 'a> {
    guard: RwLockWriteGuard<'a, V>,
    address: usize,
}

impl<'a, V> Deref for WriteGuard<'a, V> {
    type Target = V;
    fn deref(&self) -> &V { &self.guard }
}
impl<'a, V> DerefMut for WriteGuard<'a, V> {
    fn deref_mut(&mut self) -> &mut V { &mut self.guard }
}
impl<'a, V> Drop for WriteGuard<'a, V> {
    fn drop(&mut self) {
        let address = self.address;
        let _ = WRITING.try_with(|writing| {
            let mut writing = writing.borrow_mut();
            if let Some(k) = writing.iter().rposition(|&a| a == address) {
                writing.swap_remove(k);
            }
        });
    }
}

/// Exclusive write access to container storage. Waits for other threads' guards; panics if the
/// calling thread already writes the storage.
pub fn write_lock<V>(lock: &RwLock<V>) -> WriteGuard<V> {
    let address = address(lock);
    if held_for_writing(address) {
        panic!("{}", UNDETECTED);
    }
    let guard = lock.write().unwrap_or_else(PoisonError::into_inner);
    WRITING.with(|writing| writing.borrow_mut().push(address));
    WriteGuard { guard, address }
}
