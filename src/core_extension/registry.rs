// Ordered, named collection of extensions consulted on every lifecycle event

use crate::core_extension::error::ExtensionError;
use crate::core_extension::extension::{Extension, ExtensionContext, FtpEvent, Outcome};
use crate::session::Session;
use log::{debug, error, info, warn};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

struct Entry {
    name: String,
    extension: Arc<dyn Extension>,
}

/// Extensions in registration order. Names are unique.
///
/// Reads and writes may interleave freely from any connection: `notify`
/// works on a snapshot taken under the read lock, so an add or remove that
/// races with it is either fully seen or not seen at all.
#[derive(Default)]
pub struct ExtensionRegistry {
    entries: RwLock<Vec<Entry>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Entry>> {
        self.entries.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Entry>> {
        self.entries.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Appends `extension` under `name`. An existing entry with the same
    /// name is left untouched.
    pub fn add(&self, name: &str, extension: Arc<dyn Extension>) -> Result<(), ExtensionError> {
        let mut entries = self.write();
        if entries.iter().any(|e| e.name == name) {
            warn!("Extension {} already registered, ignoring", name);
            return Err(ExtensionError::DuplicateName(name.to_string()));
        }
        entries.push(Entry {
            name: name.to_string(),
            extension,
        });
        debug!("Extension {} registered at position {}", name, entries.len());
        Ok(())
    }

    /// Runs `init` and registers the extension. If the name is taken by the
    /// time registration happens, the freshly initialized extension is
    /// destroyed again.
    pub fn install(
        &self,
        name: &str,
        extension: Arc<dyn Extension>,
        ctx: &ExtensionContext,
    ) -> Result<(), ExtensionError> {
        if self.get(name).is_some() {
            return Err(ExtensionError::DuplicateName(name.to_string()));
        }

        match panic::catch_unwind(AssertUnwindSafe(|| extension.init(ctx))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(ExtensionError::InitFailed {
                    name: name.to_string(),
                    reason: e.to_string(),
                })
            }
            Err(payload) => {
                return Err(ExtensionError::InitFailed {
                    name: name.to_string(),
                    reason: panic_message(payload.as_ref()),
                })
            }
        }

        if let Err(e) = self.add(name, Arc::clone(&extension)) {
            destroy_isolated(name, extension.as_ref());
            return Err(e);
        }
        info!("Extension {} installed", name);
        Ok(())
    }

    pub fn remove(&self, name: &str) -> Option<Arc<dyn Extension>> {
        let mut entries = self.write();
        let index = entries.iter().position(|e| e.name == name)?;
        let entry = entries.remove(index);
        debug!("Extension {} removed", name);
        Some(entry.extension)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Extension>> {
        self.read()
            .iter()
            .find(|e| e.name == name)
            .map(|e| Arc::clone(&e.extension))
    }

    pub fn names(&self) -> Vec<String> {
        self.read().iter().map(|e| e.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn snapshot(&self) -> Vec<(String, Arc<dyn Extension>)> {
        self.read()
            .iter()
            .map(|e| (e.name.clone(), Arc::clone(&e.extension)))
            .collect()
    }

    /// Consults each extension in order and returns the first outcome that is
    /// not [`Outcome::Default`]; later extensions are not called. A hook that
    /// errors or panics counts as `Default` and the walk moves on.
    pub fn notify(&self, event: FtpEvent<'_>, session: &mut Session) -> Outcome {
        for (name, extension) in self.snapshot() {
            let result =
                panic::catch_unwind(AssertUnwindSafe(|| extension.on_event(session, event)));
            let outcome = match result {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(e)) => {
                    error!(
                        "Extension {} failed on {} for session {}: {}",
                        name,
                        event.name(),
                        session.id(),
                        e
                    );
                    Outcome::Default
                }
                Err(payload) => {
                    error!(
                        "Extension {} panicked on {} for session {}: {}",
                        name,
                        event.name(),
                        session.id(),
                        panic_message(payload.as_ref())
                    );
                    Outcome::Default
                }
            };

            if outcome != Outcome::Default {
                debug!(
                    "Extension {} returned {:?} on {} for session {}",
                    name,
                    outcome,
                    event.name(),
                    session.id()
                );
                return outcome;
            }
        }
        Outcome::Default
    }

    /// Empties the registry and destroys every extension once. Failures are
    /// collected, not propagated; every extension gets its `destroy` call.
    pub fn dispose(&self) -> Vec<(String, ExtensionError)> {
        let drained = std::mem::take(&mut *self.write());
        let mut failures = Vec::new();
        for entry in drained {
            if let Some(e) = destroy_isolated(&entry.name, entry.extension.as_ref()) {
                failures.push((entry.name, e));
            }
        }
        failures
    }
}

fn destroy_isolated(name: &str, extension: &dyn Extension) -> Option<ExtensionError> {
    match panic::catch_unwind(AssertUnwindSafe(|| extension.destroy())) {
        Ok(Ok(())) => {
            debug!("Extension {} destroyed", name);
            None
        }
        Ok(Err(e)) => {
            error!("Extension {} failed to destroy: {}", name, e);
            Some(ExtensionError::DestroyFailed {
                name: name.to_string(),
                reason: e.to_string(),
            })
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!("Extension {} panicked while destroying: {}", name, message);
            Some(ExtensionError::Panicked(message))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
