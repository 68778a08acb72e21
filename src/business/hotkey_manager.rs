//! Hotkey Manager
//!
//! Owns the global hotkeys for the start/stop/reset actions.
//! Supports runtime reconfiguration via stop+replace strategy.

use crate::data::{Action, HotkeyMap};
use crate::platform::{HotkeyProvider, PlatformFactory};
use anyhow::Result;
use std::sync::{Arc, Mutex};

pub type ActionCallback = Arc<dyn Fn(Action) + Send + Sync + 'static>;

type ProviderFactory = Box<dyn Fn(&HotkeyMap) -> Result<Box<dyn HotkeyProvider>>>;

/// Hotkey manager for global hotkey handling.
///
/// Every update replaces all three bindings: the old provider is stopped
/// and a new one is created from the full mapping.
pub struct HotkeyManager {
    provider: Mutex<Option<Box<dyn HotkeyProvider>>>,
    callback: ActionCallback,
    factory: ProviderFactory,
}

impl HotkeyManager {
    /// Create a manager that delivers fired actions to `callback`.
    /// Nothing is registered until the first [`update_config`](Self::update_config).
    pub fn new(callback: ActionCallback) -> Self {
        Self::with_factory(callback, PlatformFactory::create_hotkey_provider)
    }

    pub fn with_factory<F>(callback: ActionCallback, factory: F) -> Self
    where
        F: Fn(&HotkeyMap) -> Result<Box<dyn HotkeyProvider>> + 'static,
    {
        Self {
            provider: Mutex::new(None),
            callback,
            factory: Box::new(factory),
        }
    }

    /// Unregister every hotkey and register `hotkeys` in their place.
    pub fn update_config(&self, hotkeys: &HotkeyMap) -> Result<()> {
        if let Ok(mut provider) = self.provider.lock() {
            // 1. Stop and release the old provider
            if let Some(old) = provider.take() {
                old.stop();
            }

            // 2. Create new provider
            let new_provider = (self.factory)(hotkeys)?;

            // 3. Bind callback
            let callback = self.callback.clone();
            new_provider.on_trigger(Box::new(move |action| callback(action)));

            // 4. Replace provider
            *provider = Some(new_provider);
        }

        tracing::info!("Hotkeys registered: {:?}", hotkeys);
        Ok(())
    }

    /// Stop the hotkey manager
    pub fn stop(&self) {
        if let Ok(mut provider) = self.provider.lock() {
            if let Some(old) = provider.take() {
                old.stop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Callback = Box<dyn Fn(Action) + Send + Sync + 'static>;

    #[derive(Default)]
    struct Counters {
        created: AtomicUsize,
        stopped: AtomicUsize,
        bound: Mutex<Vec<Arc<Callback>>>,
    }

    struct FakeProvider(Arc<Counters>);

    impl HotkeyProvider for FakeProvider {
        fn on_trigger(&self, callback: Callback) {
            self.0.bound.lock().unwrap().push(Arc::new(callback));
        }

        fn stop(&self) {
            self.0.stopped.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn manager(counters: &Arc<Counters>, fired: &Arc<Mutex<Vec<Action>>>) -> HotkeyManager {
        let fired = fired.clone();
        let counters = counters.clone();
        HotkeyManager::with_factory(
            Arc::new(move |action| fired.lock().unwrap().push(action)),
            move |_| {
                counters.created.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(FakeProvider(counters.clone())) as Box<dyn HotkeyProvider>)
            },
        )
    }

    #[test]
    fn update_replaces_the_previous_provider() {
        let counters = Arc::new(Counters::default());
        let fired = Arc::new(Mutex::new(Vec::new()));
        let manager = manager(&counters, &fired);

        manager.update_config(&HotkeyMap::default()).unwrap();
        manager.update_config(&HotkeyMap::default()).unwrap();

        assert_eq!(counters.created.load(Ordering::SeqCst), 2);
        assert_eq!(counters.stopped.load(Ordering::SeqCst), 1);

        manager.stop();
        assert_eq!(counters.stopped.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn fired_hotkeys_reach_the_callback() {
        let counters = Arc::new(Counters::default());
        let fired = Arc::new(Mutex::new(Vec::new()));
        let manager = manager(&counters, &fired);

        manager.update_config(&HotkeyMap::default()).unwrap();
        let bound = counters.bound.lock().unwrap().last().cloned().unwrap();
        bound(Action::Reset);

        assert_eq!(*fired.lock().unwrap(), vec![Action::Reset]);
    }

    #[test]
    fn factory_errors_are_returned() {
        let manager = HotkeyManager::with_factory(Arc::new(|_| {}), |_| {
            Err(anyhow::anyhow!("no display"))
        });
        assert!(manager.update_config(&HotkeyMap::default()).is_err());
    }
}
