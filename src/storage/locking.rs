//! Locking Strategies
//!
//! Decides how a [`RecordTable`] is shared between the store and its sweep
//! task. `Locked` guards the table with a read/write lock and can be shared
//! across threads; `Unlocked` takes no lock at all and is confined to one
//! thread by the type system.

use parking_lot::RwLock;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use super::table::RecordTable;

mod sealed {
    pub trait Sealed {}
}

/// Strategy for sharing a record table
pub trait Locking: sealed::Sealed + 'static {
    /// Shared handle to the table
    type Cell<V>: Clone;

    fn new_cell<V>(table: RecordTable<V>) -> Self::Cell<V>;

    /// Run `f` with shared access to the table
    fn read<V, R>(cell: &Self::Cell<V>, f: impl FnOnce(&RecordTable<V>) -> R) -> R;

    /// Run `f` with exclusive access to the table
    fn write<V, R>(cell: &Self::Cell<V>, f: impl FnOnce(&mut RecordTable<V>) -> R) -> R;
}

/// Guarded mode: every read takes the shared lock, every mutation the
/// exclusive lock.
#[derive(Debug, Clone, Copy)]
pub enum Locked {}

impl sealed::Sealed for Locked {}

impl Locking for Locked {
    type Cell<V> = Arc<RwLock<RecordTable<V>>>;

    fn new_cell<V>(table: RecordTable<V>) -> Self::Cell<V> {
        Arc::new(RwLock::new(table))
    }

    #[inline]
    fn read<V, R>(cell: &Self::Cell<V>, f: impl FnOnce(&RecordTable<V>) -> R) -> R {
        f(&cell.read())
    }

    #[inline]
    fn write<V, R>(cell: &Self::Cell<V>, f: impl FnOnce(&mut RecordTable<V>) -> R) -> R {
        f(&mut cell.write())
    }
}

/// Single-threaded mode: no synchronization. The table handle is `!Send`,
/// so the store can only be used from the thread that created it.
#[derive(Debug, Clone, Copy)]
pub enum Unlocked {}

impl sealed::Sealed for Unlocked {}

impl Locking for Unlocked {
    type Cell<V> = Rc<RefCell<RecordTable<V>>>;

    fn new_cell<V>(table: RecordTable<V>) -> Self::Cell<V> {
        Rc::new(RefCell::new(table))
    }

    #[inline]
    fn read<V, R>(cell: &Self::Cell<V>, f: impl FnOnce(&RecordTable<V>) -> R) -> R {
        f(&cell.borrow())
    }

    #[inline]
    fn write<V, R>(cell: &Self::Cell<V>, f: impl FnOnce(&mut RecordTable<V>) -> R) -> R {
        f(&mut cell.borrow_mut())
    }
}
