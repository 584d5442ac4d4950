//! Ordered hook list

use std::sync::Arc;

use super::traits::Hook;

/// Hooks notified in registration order
#[derive(Clone, Default)]
pub struct HookRegistry {
    hooks: Vec<Arc<dyn Hook>>,
}

impl HookRegistry {
    pub fn new(hooks: Vec<Arc<dyn Hook>>) -> Self {
        Self { hooks }
    }

    /// Append a hook
    pub fn push(&mut self, hook: Arc<dyn Hook>) {
        self.hooks.push(hook);
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn notify_new(&self) {
        for hook in &self.hooks {
            hook.on_new();
        }
    }

    /// Notify every hook of each resolved source type, in order
    ///
    /// For each type all hooks are notified before moving to the next type.
    pub fn notify_retrieved<'a>(&self, source_types: impl IntoIterator<Item = &'a str>) {
        for source_type in source_types {
            for hook in &self.hooks {
                hook.on_retrieve(source_type);
            }
        }
    }

    pub fn notify_shutdown(&self) {
        for hook in &self.hooks {
            hook.on_shutdown();
        }
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("hooks", &format!("[{} hooks]", self.hooks.len()))
            .finish()
    }
}
