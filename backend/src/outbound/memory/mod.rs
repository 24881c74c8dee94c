//! In-process repository adapters.
//!
//! Used when no database URL is configured and by the end-to-end tests. Each
//! repository keeps its aggregates behind one `RwLock`, so individual calls
//! are atomic but read-modify-write sequences in the services are not.

mod admins;
mod matches;
mod news;
mod users;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use pagination::{Page, PageRequest};

pub use admins::MemoryAdminRepository;
pub use matches::MemoryMatchRepository;
pub use news::MemoryNewsRepository;
pub use users::MemoryUserRepository;

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Cut one page out of an already filtered and ordered list.
fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let total = items.len() as u64;
    let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(request.limit()).unwrap_or(usize::MAX);
    let data = items.into_iter().skip(offset).take(limit).collect();
    Page::new(data, request, total)
}
