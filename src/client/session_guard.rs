use std::sync::Mutex;

/// Session generation counter.
///
/// Bumped whenever a session starts or ends. Requests record the generation
/// they were sent under. Token write-backs and teardowns from a stale
/// generation are dropped, so concurrent failures end a session only once.
#[derive(Debug, Default)]
pub struct SessionGuard {
    generation: Mutex<u64>,
}

impl SessionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        *self.generation.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run `f` and open a new generation (login, register, explicit logout)
    pub fn advance<T>(&self, f: impl FnOnce() -> T) -> T {
        let mut generation = self.generation.lock().unwrap_or_else(|e| e.into_inner());
        let out = f();
        *generation += 1;
        out
    }

    /// Run `f` only while `expected` is still the current generation
    pub fn if_current<T>(&self, expected: u64, f: impl FnOnce() -> T) -> Option<T> {
        let generation = self.generation.lock().unwrap_or_else(|e| e.into_inner());
        if *generation == expected {
            Some(f())
        } else {
            None
        }
    }

    /// Run `f` and close generation `expected`, if nobody closed it first
    pub fn end_if_current<T>(&self, expected: u64, f: impl FnOnce() -> T) -> Option<T> {
        let mut generation = self.generation.lock().unwrap_or_else(|e| e.into_inner());
        if *generation == expected {
            let out = f();
            *generation += 1;
            Some(out)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_only_once() {
        let guard = SessionGuard::new();
        let start = guard.current();

        assert_eq!(guard.end_if_current(start, || "first"), Some("first"));
        assert_eq!(guard.end_if_current(start, || "second"), None);
        assert_eq!(guard.current(), start + 1);
    }

    #[test]
    fn test_if_current_after_advance() {
        let guard = SessionGuard::new();
        let before = guard.current();
        guard.advance(|| ());

        assert!(guard.if_current(before, || ()).is_none());
        assert!(guard.if_current(guard.current(), || ()).is_some());
    }
}
