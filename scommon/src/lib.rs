//! Shared utilities and strongly-typed common values for workspace crates.
//!
//! ```rust
//! use scommon::{RunId, SamplingOptions, ThreadId};
//!
//! let thread = ThreadId::from("thread_abc");
//! let run = RunId::new("run_123");
//!
//! let options = SamplingOptions::default().with_temperature(0.3).with_top_p(0.9);
//! assert_eq!(thread.as_str(), "thread_abc");
//! assert_eq!(run.to_string(), "run_123");
//! assert_eq!(options.top_p, Some(0.9));
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use scommon::BoxFuture;
    //!
    //! fn str_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = str_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Remote resource identifiers.
    //!
    //! Both ids are opaque strings minted by the remote API. They are never
    //! parsed locally, only echoed back in resource paths.
    //!
    //! ```rust
    //! use scommon::{RunId, ThreadId};
    //!
    //! let thread = ThreadId::new("thread_42");
    //! let run = RunId::from("run_42".to_string());
    //!
    //! assert_eq!(thread.to_string(), "thread_42");
    //! assert_eq!(run.as_str(), "run_42");
    //! ```

    use std::fmt::{Display, Formatter};

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct ThreadId(String);

    impl ThreadId {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }

        pub fn is_blank(&self) -> bool {
            self.0.trim().is_empty()
        }
    }

    impl Display for ThreadId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for ThreadId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for ThreadId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct RunId(String);

    impl RunId {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }
    }

    impl Display for RunId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for RunId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for RunId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }
}

pub mod model {
    //! Sampling settings shared by configuration defaults and per-call overrides.
    //!
    //! ```rust
    //! use scommon::SamplingOptions;
    //!
    //! let defaults = SamplingOptions::default()
    //!     .with_model("gpt-4o-mini")
    //!     .with_temperature(0.2);
    //! let overrides = SamplingOptions::default().with_max_tokens(128);
    //! let merged = defaults.merged_with(&overrides);
    //!
    //! assert_eq!(merged.model.as_deref(), Some("gpt-4o-mini"));
    //! assert_eq!(merged.temperature, Some(0.2));
    //! assert_eq!(merged.max_tokens, Some(128));
    //! ```

    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct SamplingOptions {
        pub model: Option<String>,
        pub temperature: Option<f32>,
        pub max_tokens: Option<u32>,
        pub top_p: Option<f32>,
    }

    impl SamplingOptions {
        pub fn with_model(mut self, model: impl Into<String>) -> Self {
            self.model = Some(model.into());
            self
        }

        pub fn with_temperature(mut self, temperature: f32) -> Self {
            self.temperature = Some(temperature);
            self
        }

        pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
            self.max_tokens = Some(max_tokens);
            self
        }

        pub fn with_top_p(mut self, top_p: f32) -> Self {
            self.top_p = Some(top_p);
            self
        }

        /// Field-wise merge where values set on `overrides` win.
        pub fn merged_with(&self, overrides: &SamplingOptions) -> SamplingOptions {
            SamplingOptions {
                model: overrides.model.clone().or_else(|| self.model.clone()),
                temperature: overrides.temperature.or(self.temperature),
                max_tokens: overrides.max_tokens.or(self.max_tokens),
                top_p: overrides.top_p.or(self.top_p),
            }
        }
    }
}

pub mod registry {
    //! Generic registry map wrapper used by runtime registries.
    //!
    //! ```rust
    //! use scommon::Registry;
    //!
    //! let mut registry = Registry::new();
    //! registry.insert("alpha".to_string(), 1_u32);
    //!
    //! assert_eq!(registry.get("alpha"), Some(&1));
    //! assert!(registry.contains_key("alpha"));
    //! ```

    use std::borrow::Borrow;
    use std::collections::HashMap;
    use std::hash::Hash;

    #[derive(Debug, Clone)]
    pub struct Registry<K, V> {
        items: HashMap<K, V>,
    }

    impl<K, V> Default for Registry<K, V>
    where
        K: Eq + Hash,
    {
        fn default() -> Self {
            Self {
                items: HashMap::new(),
            }
        }
    }

    impl<K, V> Registry<K, V>
    where
        K: Eq + Hash,
    {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&mut self, key: K, value: V) -> Option<V> {
            self.items.insert(key, value)
        }

        pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.get(key)
        }

        pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.remove(key)
        }

        pub fn contains_key<Q>(&self, key: &Q) -> bool
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.contains_key(key)
        }

        pub fn keys(&self) -> impl Iterator<Item = &K> {
            self.items.keys()
        }

        pub fn values(&self) -> impl Iterator<Item = &V> {
            self.items.values()
        }

        pub fn len(&self) -> usize {
            self.items.len()
        }

        pub fn is_empty(&self) -> bool {
            self.items.is_empty()
        }
    }
}

pub use context::{RunId, ThreadId};
pub use future::BoxFuture;
pub use model::SamplingOptions;
pub use registry::Registry;

#[cfg(test)]
mod tests {
    use super::{Registry, RunId, SamplingOptions, ThreadId};

    #[test]
    fn id_newtypes_round_trip_strings() {
        let thread = ThreadId::new("thread_1");
        let run = RunId::from("run_1");

        assert_eq!(thread.as_str(), "thread_1");
        assert_eq!(run.as_str(), "run_1");
        assert_eq!(thread.to_string(), "thread_1");
        assert_eq!(run.to_string(), "run_1");
        assert!(ThreadId::from("  ").is_blank());
    }

    #[test]
    fn sampling_overrides_take_precedence_field_by_field() {
        let defaults = SamplingOptions::default()
            .with_model("gpt-4o-mini")
            .with_temperature(0.7)
            .with_top_p(1.0);
        let overrides = SamplingOptions::default()
            .with_model("gpt-4o")
            .with_max_tokens(256);

        let merged = defaults.merged_with(&overrides);
        assert_eq!(merged.model.as_deref(), Some("gpt-4o"));
        assert_eq!(merged.temperature, Some(0.7));
        assert_eq!(merged.max_tokens, Some(256));
        assert_eq!(merged.top_p, Some(1.0));
    }

    #[test]
    fn generic_registry_basic_lifecycle() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());

        registry.insert("alpha".to_string(), 1_u32);
        assert_eq!(registry.get("alpha"), Some(&1));
        assert!(registry.contains_key("alpha"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.keys().count(), 1);

        let removed = registry.remove("alpha");
        assert_eq!(removed, Some(1));
        assert!(registry.is_empty());
    }
}
