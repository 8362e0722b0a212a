//! In-memory test doubles.
//!
//! [`MockNotifier`] records every push and answers with a scripted outcome.
//! [`MemoryRepository`] keeps the active record and history in memory.
//! Both can be used wherever the real notifier or store would be.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use incubator_types::{CompletedIncubation, Incubation};

use crate::error::Result;
use crate::notifier::{ControllerConfig, DeviceNotifier};
use crate::traits::IncubationRepository;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A notifier that never touches the network.
///
/// # Example
///
/// ```
/// use incubator_core::{ControllerConfig, DeviceNotifier, MockNotifier};
///
/// #[tokio::main]
/// async fn main() {
///     let notifier = MockNotifier::failing();
///     let config = ControllerConfig {
///         duration_days: 21,
///         temp_min: 37.5,
///         temp_max: 38.0,
///         humidity_min: 55.0,
///         humidity_max: 65.0,
///     };
///
///     assert!(!notifier.push_config(&config).await);
///     assert_eq!(notifier.pushes(), vec![config]);
/// }
/// ```
#[derive(Debug)]
pub struct MockNotifier {
    succeed: AtomicBool,
    pushes: Mutex<Vec<ControllerConfig>>,
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNotifier {
    /// A notifier whose pushes succeed.
    pub fn new() -> Self {
        Self {
            succeed: AtomicBool::new(true),
            pushes: Mutex::new(Vec::new()),
        }
    }

    /// A notifier whose pushes fail, as if the controller were offline.
    pub fn failing() -> Self {
        let notifier = Self::new();
        notifier.set_succeed(false);
        notifier
    }

    /// Change the outcome of subsequent pushes.
    pub fn set_succeed(&self, succeed: bool) {
        self.succeed.store(succeed, Ordering::Relaxed);
    }

    /// Every configuration pushed so far, oldest first.
    pub fn pushes(&self) -> Vec<ControllerConfig> {
        lock(&self.pushes).clone()
    }

    pub fn push_count(&self) -> usize {
        lock(&self.pushes).len()
    }
}

#[async_trait]
impl DeviceNotifier for MockNotifier {
    async fn push_config(&self, config: &ControllerConfig) -> bool {
        lock(&self.pushes).push(*config);
        self.succeed.load(Ordering::Relaxed)
    }
}

/// A repository held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    active: Mutex<Option<Incubation>>,
    history: Mutex<Vec<CompletedIncubation>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing active record and history.
    pub fn with_state(active: Option<Incubation>, history: Vec<CompletedIncubation>) -> Self {
        Self {
            active: Mutex::new(active),
            history: Mutex::new(history),
        }
    }
}

impl IncubationRepository for MemoryRepository {
    fn load_active(&self) -> Result<Option<Incubation>> {
        Ok(lock(&self.active).clone())
    }

    fn save_active(&self, record: &Incubation) -> Result<()> {
        *lock(&self.active) = Some(record.clone());
        Ok(())
    }

    fn clear_active(&self) -> Result<()> {
        *lock(&self.active) = None;
        Ok(())
    }

    fn load_history(&self) -> Result<Vec<CompletedIncubation>> {
        Ok(lock(&self.history).clone())
    }

    fn append_history(&self, record: &CompletedIncubation) -> Result<()> {
        lock(&self.history).push(record.clone());
        Ok(())
    }

    fn archive(&self, record: &CompletedIncubation) -> Result<()> {
        let mut active = lock(&self.active);
        lock(&self.history).push(record.clone());
        *active = None;
        Ok(())
    }
}
