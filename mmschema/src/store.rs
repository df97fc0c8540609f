//! Schema store and extraction driver.
//!
//! The store owns the strategy chain and a concurrent cache mapping type
//! identity to completed schemas. It is the only component that recurses:
//! strategies hand back property dependencies and the store resolves each
//! one through the cache before running its deferred check.
//!
//! Cycle policy: a type is marked in flight before its strategy runs. A
//! dependency whose type is in flight resolves as [`Resolution::InFlight`]
//! and its deferred check treats the type as satisfied; this is what makes
//! self-referential and mutually referential property graphs terminate.
//! Types must always be routed through a store; calling strategies directly
//! on a cyclic graph is unsupported.
//!
//! Cache-missing extraction trees are serialized behind an extraction lock:
//! a concurrent `schema_for` blocks until the running tree publishes (or
//! backs out) and then rechecks the cache. Two threads extracting the two
//! halves of a cyclic graph therefore never wait on each other's in-flight
//! markers; every marker a tree observes belongs to its own ancestry.
use std::sync::Arc;

use dashmap::DashMap;
use log::debug;
use mmtype::{TypeId, TypeUniverse};
use parking_lot::Mutex;

use crate::context::ExtractionContext;
use crate::error::{ExtractError, ExtractResult};
use crate::schema::Schema;
use crate::strategy::{Resolution, StrategyChain};

enum CacheEntry {
    InFlight,
    Ready(Arc<Schema>),
}

pub struct SchemaStore {
    chain: StrategyChain,
    cache: DashMap<TypeId, CacheEntry>,
    extraction: Mutex<()>,
}

impl SchemaStore {
    pub fn new(chain: StrategyChain) -> Self {
        SchemaStore {
            chain,
            cache: DashMap::new(),
            extraction: Mutex::new(()),
        }
    }

    /// Pre-seed an externally computed schema (e.g. a collection schema
    /// produced by another subsystem). Replaces any cached entry.
    pub fn insert(&self, schema: Schema) -> Arc<Schema> {
        let schema = Arc::new(schema);
        self.cache
            .insert(schema.ty, CacheEntry::Ready(Arc::clone(&schema)));
        schema
    }

    /// The completed schema for `ty`, if one is cached.
    pub fn get(&self, ty: TypeId) -> Option<Arc<Schema>> {
        match self.cache.get(&ty)?.value() {
            CacheEntry::Ready(schema) => Some(Arc::clone(schema)),
            CacheEntry::InFlight => None,
        }
    }

    /// Extract (or fetch) the schema for `ty`, recursively extracting every
    /// property type reachable from it. Fails if no strategy applies to a
    /// type whose schema is required.
    pub fn schema_for(
        &self,
        universe: &TypeUniverse,
        ty: TypeId,
    ) -> ExtractResult<Arc<Schema>> {
        if let Some(schema) = self.get(ty) {
            debug!("Schema cache hit for {}", universe.fmt(ty));
            return Ok(schema);
        }
        // One cache-missing extraction tree at a time. A concurrent root
        // blocks here and finds the published schema on the cache recheck
        // inside `resolve`, so mutual waits between threads cannot form.
        let _extracting = self.extraction.lock();
        let context = ExtractionContext::root(universe, ty);
        match self.resolve(universe, &context)? {
            Resolution::Ready(schema) => Ok(schema),
            // The root of a call tree has no ancestry, so it can never
            // observe its own in-flight marker.
            Resolution::InFlight => Err(ExtractError::NoApplicableStrategy {
                path: context.path(),
            }),
        }
    }

    fn resolve(
        &self,
        universe: &TypeUniverse,
        context: &Arc<ExtractionContext>,
    ) -> ExtractResult<Resolution> {
        let ty = context.ty();

        if let Some(entry) = self.cache.get(&ty) {
            match entry.value() {
                CacheEntry::Ready(schema) => {
                    debug!("Schema cache hit for {}", universe.fmt(ty));
                    return Ok(Resolution::Ready(Arc::clone(schema)));
                }
                CacheEntry::InFlight => {
                    // The extraction lock admits a single cache-missing
                    // call tree, so every in-flight marker belongs to this
                    // tree's ancestry: the dependency closes a cycle.
                    debug_assert!(context.ancestry_contains(ty));
                    debug!(
                        "Cyclic property graph at {}; treating the in-flight extraction as satisfied",
                        universe.fmt(ty)
                    );
                    return Ok(Resolution::InFlight);
                }
            }
        }
        self.cache.insert(ty, CacheEntry::InFlight);

        match self.extract(universe, context) {
            Ok(Some(schema)) => {
                let schema = Arc::new(schema);
                self.cache
                    .insert(ty, CacheEntry::Ready(Arc::clone(&schema)));
                debug!("Published schema for {}", universe.fmt(ty));
                Ok(Resolution::Ready(schema))
            }
            Ok(None) => {
                self.cache.remove(&ty);
                Err(ExtractError::NoApplicableStrategy {
                    path: context.path(),
                })
            }
            Err(error) => {
                // Failures are never cached; the defect message already
                // names the offender.
                self.cache.remove(&ty);
                Err(error)
            }
        }
    }

    fn extract(
        &self,
        universe: &TypeUniverse,
        context: &Arc<ExtractionContext>,
    ) -> ExtractResult<Option<Schema>> {
        let Some(extraction) = self.chain.extract(context, universe)? else {
            return Ok(None);
        };

        for dependency in extraction.dependencies {
            let resolution = self.resolve(universe, &dependency.context)?;
            if let Some(check) = dependency.check {
                check.run(universe, &resolution)?;
            }
        }

        Ok(Some(extraction.schema))
    }
}
