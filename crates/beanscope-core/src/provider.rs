//! Managed-object resolution.
//!
//! [`ManagedObjectProvider`] is the seam between the gateway and wherever
//! objects actually live. The in-process [`LocalRegistry`] backs the
//! bundled samples and tests; [`ConnectionScope`] covers remote targets,
//! where every request opens a handle, resolves through it, and releases
//! it on drop — success and failure paths alike.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::descriptor::ManagedObject;
use crate::error::ProbeError;

// ── Provider seam ───────────────────────────────────────────────────

/// Source of managed objects, keyed by registered name.
pub trait ManagedObjectProvider {
    /// Resolve one object by name.
    fn resolve(&self, name: &str) -> Result<Arc<dyn ManagedObject>, ProbeError>;

    /// All registered names, in display order.
    fn names(&self) -> Vec<String>;
}

// ── Local registry ──────────────────────────────────────────────────

/// In-process provider. Insert-once at composition time, read-only after.
#[derive(Default)]
pub struct LocalRegistry {
    objects: BTreeMap<String, Arc<dyn ManagedObject>>,
}

impl LocalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, object: Arc<dyn ManagedObject>) {
        self.objects.insert(name.into(), object);
    }
}

impl ManagedObjectProvider for LocalRegistry {
    fn resolve(&self, name: &str) -> Result<Arc<dyn ManagedObject>, ProbeError> {
        self.objects
            .get(name)
            .cloned()
            .ok_or_else(|| ProbeError::ObjectNotFound {
                name: name.to_owned(),
            })
    }

    fn names(&self) -> Vec<String> {
        self.objects.keys().cloned().collect()
    }
}

// ── Connection scope ────────────────────────────────────────────────

/// Address of a remote target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerRef {
    address: String,
}

impl ServerRef {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

impl fmt::Display for ServerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

/// Factory for per-request remote connections.
///
/// The handle owns the connection; dropping it releases the underlying
/// resources, so release happens on every exit path without an explicit
/// close call.
pub trait ConnectionScope {
    type Handle: ManagedObjectProvider;

    /// Open a connection to the target server.
    fn open(&self, server: &ServerRef) -> Result<Self::Handle, ProbeError>;
}

/// Run one resolution-and-work unit inside a fresh connection.
pub fn with_connection<S, T>(
    scope: &S,
    server: &ServerRef,
    op: impl FnOnce(&S::Handle) -> Result<T, ProbeError>,
) -> Result<T, ProbeError>
where
    S: ConnectionScope,
{
    let handle = scope.open(server)?;
    tracing::debug!(server = %server, "connection opened");
    op(&handle)
    // handle dropped here, releasing the connection on both paths
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::any::Any;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::descriptor::TypeDescriptor;

    struct Plain {
        descriptor: Arc<TypeDescriptor>,
    }

    impl Plain {
        fn new() -> Self {
            Self {
                descriptor: TypeDescriptor::builder::<Plain>("test.Plain").build(),
            }
        }
    }

    impl ManagedObject for Plain {
        fn descriptor(&self) -> Arc<TypeDescriptor> {
            Arc::clone(&self.descriptor)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn registry_resolves_and_lists_sorted() {
        let mut registry = LocalRegistry::new();
        registry.insert("zeta.Worker", Arc::new(Plain::new()));
        registry.insert("alpha.Queue", Arc::new(Plain::new()));

        assert!(registry.resolve("alpha.Queue").is_ok());
        assert_eq!(registry.names(), vec!["alpha.Queue", "zeta.Worker"]);

        let err = registry.resolve("missing.Thing").map(|_| ()).unwrap_err();
        assert!(matches!(err, ProbeError::ObjectNotFound { .. }));
    }

    /// Scope whose handles count open connections, so tests can observe
    /// the release.
    struct CountingScope {
        open_count: Arc<AtomicUsize>,
    }

    struct CountingHandle {
        registry: LocalRegistry,
        open_count: Arc<AtomicUsize>,
    }

    impl Drop for CountingHandle {
        fn drop(&mut self) {
            self.open_count.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl ManagedObjectProvider for CountingHandle {
        fn resolve(&self, name: &str) -> Result<Arc<dyn ManagedObject>, ProbeError> {
            self.registry.resolve(name)
        }

        fn names(&self) -> Vec<String> {
            self.registry.names()
        }
    }

    impl ConnectionScope for CountingScope {
        type Handle = CountingHandle;

        fn open(&self, _server: &ServerRef) -> Result<Self::Handle, ProbeError> {
            self.open_count.fetch_add(1, Ordering::SeqCst);
            let mut registry = LocalRegistry::new();
            registry.insert("remote.Worker", Arc::new(Plain::new()));
            Ok(CountingHandle {
                registry,
                open_count: Arc::clone(&self.open_count),
            })
        }
    }

    #[test]
    fn connection_is_released_on_success() {
        let open_count = Arc::new(AtomicUsize::new(0));
        let scope = CountingScope {
            open_count: Arc::clone(&open_count),
        };
        let server = ServerRef::new("localhost:4848");

        let names = with_connection(&scope, &server, |handle| Ok(handle.names())).unwrap();
        assert_eq!(names, vec!["remote.Worker"]);
        assert_eq!(open_count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn connection_is_released_on_failure() {
        let open_count = Arc::new(AtomicUsize::new(0));
        let scope = CountingScope {
            open_count: Arc::clone(&open_count),
        };
        let server = ServerRef::new("localhost:4848");

        let err = with_connection(&scope, &server, |handle| {
            handle.resolve("missing.Thing").map(|_| ())
        })
        .unwrap_err();
        assert!(matches!(err, ProbeError::ObjectNotFound { .. }));
        assert_eq!(open_count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn open_failure_surfaces_as_connection_failed() {
        struct FailingScope;
        struct NeverHandle;

        impl ManagedObjectProvider for NeverHandle {
            fn resolve(&self, name: &str) -> Result<Arc<dyn ManagedObject>, ProbeError> {
                Err(ProbeError::ObjectNotFound {
                    name: name.to_owned(),
                })
            }

            fn names(&self) -> Vec<String> {
                Vec::new()
            }
        }

        impl ConnectionScope for FailingScope {
            type Handle = NeverHandle;

            fn open(&self, server: &ServerRef) -> Result<Self::Handle, ProbeError> {
                Err(ProbeError::ConnectionFailed {
                    server: server.to_string(),
                    reason: "connection refused".into(),
                })
            }
        }

        let err = with_connection(&FailingScope, &ServerRef::new("localhost:1"), |_| Ok(()))
            .unwrap_err();
        assert!(matches!(err, ProbeError::ConnectionFailed { .. }));
    }
}
