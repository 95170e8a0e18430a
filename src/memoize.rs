//! Memoize Module
//!
//! Wraps a target function so every call goes through a [`MemoCache`].

use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::{CacheKey, CallArgs, MemoCache};
use crate::config::CacheOptions;
use crate::error::{CacheError, Result};

/// Cache handle that several wrappers (or other callers) can share.
pub type SharedCache = Arc<Mutex<MemoCache>>;

/// Wraps `cache` for sharing.
pub fn shared(cache: MemoCache) -> SharedCache {
    Arc::new(Mutex::new(cache))
}

fn lock(cache: &SharedCache) -> Result<MutexGuard<'_, MemoCache>> {
    cache
        .lock()
        .map_err(|_| CacheError::Internal("cache lock poisoned".to_string()))
}

// == Memoized ==
/// A target function whose results are memoized.
///
/// The argument bundle `A` is converted with [`CallArgs::from_serialize`]: use
/// a tuple for positional arguments or a struct for named ones. The cache lock
/// is released while the target runs, so the target may use the same cache.
///
/// ```
/// use memo_cache::{CacheOptions, Memoized};
///
/// let add = Memoized::with_options("add", CacheOptions::new("math"), |(a, b): &(i64, i64)| a + b)
///     .unwrap();
/// assert_eq!(add.call(&(2, 3)).unwrap(), 5);
/// assert_eq!(add.call(&(2, 3)).unwrap(), 5);
/// ```
pub struct Memoized<A, T, F> {
    identity: String,
    cache: SharedCache,
    target: F,
    _marker: PhantomData<fn(&A) -> T>,
}

impl<A, T, F> Memoized<A, T, F>
where
    A: Serialize,
    T: Serialize + DeserializeOwned,
    F: Fn(&A) -> T,
{
    /// Memoizes `target` in a new private cache built from `options`.
    pub fn with_options(identity: impl Into<String>, options: CacheOptions, target: F) -> Result<Self> {
        let cache = MemoCache::new(options)?;
        Ok(Self::with_cache(identity, shared(cache), target))
    }

    /// Memoizes `target` in an existing cache.
    pub fn with_cache(identity: impl Into<String>, cache: SharedCache, target: F) -> Self {
        Self {
            identity: identity.into(),
            cache,
            target,
            _marker: PhantomData,
        }
    }

    /// Returns the memoized result of `target(args)`.
    pub fn call(&self, args: &A) -> Result<T> {
        let key = CacheKey::derive(&self.identity, &CallArgs::from_serialize(args))?;
        if let Some(value) = lock(&self.cache)?.lookup(&key)? {
            return Ok(value);
        }

        let value = (self.target)(args);
        lock(&self.cache)?.store_computed(key, &value)?;
        Ok(value)
    }

    /// Drops the cached result of `target(args)`.
    pub fn invalidate(&self, args: &A) -> Result<bool> {
        lock(&self.cache)?.invalidate(&self.identity, &CallArgs::from_serialize(args))
    }

    /// Flushes the underlying cache.
    pub fn flush(&self) -> Result<()> {
        lock(&self.cache)?.flush()
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }
}

// == Try Memoized ==
/// [`Memoized`] for fallible targets. Errors are returned unchanged and never cached.
pub struct TryMemoized<A, T, E, F> {
    identity: String,
    cache: SharedCache,
    target: F,
    _marker: PhantomData<fn(&A) -> std::result::Result<T, E>>,
}

impl<A, T, E, F> TryMemoized<A, T, E, F>
where
    A: Serialize,
    T: Serialize + DeserializeOwned,
    E: From<CacheError>,
    F: Fn(&A) -> std::result::Result<T, E>,
{
    pub fn with_options(identity: impl Into<String>, options: CacheOptions, target: F) -> Result<Self> {
        let cache = MemoCache::new(options)?;
        Ok(Self::with_cache(identity, shared(cache), target))
    }

    pub fn with_cache(identity: impl Into<String>, cache: SharedCache, target: F) -> Self {
        Self {
            identity: identity.into(),
            cache,
            target,
            _marker: PhantomData,
        }
    }

    pub fn call(&self, args: &A) -> std::result::Result<T, E> {
        let key = CacheKey::derive(&self.identity, &CallArgs::from_serialize(args))?;
        if let Some(value) = lock(&self.cache)?.lookup(&key)? {
            return Ok(value);
        }

        let value = (self.target)(args)?;
        lock(&self.cache)?.store_computed(key, &value)?;
        Ok(value)
    }

    /// Drops the cached result of `target(args)`.
    pub fn invalidate(&self, args: &A) -> Result<bool> {
        lock(&self.cache)?.invalidate(&self.identity, &CallArgs::from_serialize(args))
    }

    pub fn flush(&self) -> Result<()> {
        lock(&self.cache)?.flush()
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }
}
