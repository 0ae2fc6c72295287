//! Plugin-based provider registry
//!
//! The registry maps a configured provider identifier to the factory that
//! builds its client, avoiding hardcoded if-else chains.
//!
//! ## Registration
//!
//! Provider crates expose a `register` function:
//!
//! ```rust,ignore
//! // In acme-hook-provider-godaddy
//! pub fn register(registry: &mut ProviderRegistry) {
//!     registry.register_provider("godaddy", Box::new(GoDaddyFactory));
//! }
//! ```

use crate::error::{Error, Result};
use crate::traits::{ChallengeProvider, ChallengeProviderFactory, ProviderContext};
use std::collections::HashMap;

/// Provider registry for plugin-based client creation
#[derive(Default)]
pub struct ProviderRegistry {
    /// Registered provider factories
    providers: HashMap<String, Box<dyn ChallengeProviderFactory>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider factory
    ///
    /// # Parameters
    ///
    /// - `name`: Provider identifier (e.g., "godaddy", "cloudflare")
    /// - `factory`: Factory object for creating clients
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use acme_hook_core::registry::ProviderRegistry;
    /// # use acme_hook_core::traits::{ChallengeProvider, ChallengeProviderFactory, ProviderContext};
    /// # struct MyFactory;
    /// # impl ChallengeProviderFactory for MyFactory {
    /// #     fn create(&self, context: ProviderContext) -> acme_hook_core::Result<Box<dyn ChallengeProvider>> { unimplemented!() }
    /// # }
    /// let mut registry = ProviderRegistry::new();
    /// registry.register_provider("myprovider", Box::new(MyFactory));
    /// ```
    pub fn register_provider(
        &mut self,
        name: impl Into<String>,
        factory: Box<dyn ChallengeProviderFactory>,
    ) {
        self.providers.insert(name.into(), factory);
    }

    /// Create a provider client
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn ChallengeProvider>)`: a client bound to the context's domain
    /// - `Err(Error::UnknownProvider)`: nothing registered under `name`
    /// - `Err(Error::Config)`: the factory rejected the credentials
    pub fn create_provider(
        &self,
        name: &str,
        context: ProviderContext,
    ) -> Result<Box<dyn ChallengeProvider>> {
        let factory = self
            .providers
            .get(name)
            .ok_or_else(|| Error::unknown_provider(name))?;

        factory.create(context)
    }

    /// List all registered provider identifiers, sorted
    pub fn list_providers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a provider identifier is registered
    pub fn has_provider(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }
}
