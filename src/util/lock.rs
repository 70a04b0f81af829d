use std::sync::{Mutex, MutexGuard};

use tracing::warn;

/// Locks `lock`, recovering the guard if a previous holder panicked.
pub(crate) fn mutex_lock<'a, T>(
    lock: &'a Mutex<T>,
    source: &'static str,
    op: &'static str,
) -> MutexGuard<'a, T> {
    lock.lock().unwrap_or_else(|poisoned| {
        warn!(
            op,
            source,
            result = "poisoned_recovered",
            "Recovered from poisoned lock; contents may reflect a partial update"
        );
        poisoned.into_inner()
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn recovers_after_holder_panics() {
        let shared = Arc::new(Mutex::new(vec![1]));
        let cloned = shared.clone();
        let _ = std::thread::spawn(move || {
            let mut guard = cloned.lock().expect("first lock");
            guard.push(2);
            panic!("poison the lock");
        })
        .join();

        assert!(shared.is_poisoned());
        assert_eq!(*mutex_lock(&shared, "test", "read"), vec![1, 2]);
    }
}
