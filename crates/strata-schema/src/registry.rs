use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use ahash::{AHashMap, AHashSet};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, trace};

use crate::names::PropertyNames;
use crate::parse::{RawTypeSchema, SchemaDefinitionError, build_type, parse_definition};
use crate::shape::TypeSchema;
use crate::source::{SchemaSource, SourceError};

/// Default bound on reference hops taken without descending into a value.
pub const DEFAULT_REFERENCE_LIMIT: usize = 64;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no schema for type '{name}'")]
    NoSchema { name: String },

    #[error("invalid schema for type '{name}': {source}")]
    Definition {
        name: String,
        #[source]
        source: SchemaDefinitionError,
    },

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// A loaded type together with its property-name index.
#[derive(Debug)]
pub struct CompiledType {
    pub schema: TypeSchema,
    pub names: PropertyNames,
}

impl CompiledType {
    pub fn new(schema: TypeSchema) -> Self {
        let names = PropertyNames::build(&schema);
        Self { schema, names }
    }

    pub fn name(&self) -> &str {
        &self.schema.name
    }
}

/// Caches compiled types by name.
///
/// Each name gets its own cell, so concurrent first requests for a name share
/// a single load while requests for other names proceed independently. The
/// cell of a failed load is dropped, so only loaded types stay in the map.
/// Resolved sets are cached per root.
pub struct Registry {
    source: Arc<dyn SchemaSource>,
    cells: Mutex<AHashMap<String, Arc<OnceCell<Arc<CompiledType>>>>>,
    sets: Mutex<AHashMap<String, SchemaSet>>,
}

impl core::fmt::Debug for Registry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registry")
            .field("cached", &self.cached_len())
            .finish_non_exhaustive()
    }
}

impl Registry {
    pub fn new(source: impl SchemaSource + 'static) -> Self {
        Self::from_arc(Arc::new(source))
    }

    pub fn from_arc(source: Arc<dyn SchemaSource>) -> Self {
        Self {
            source,
            cells: Mutex::new(AHashMap::new()),
            sets: Mutex::new(AHashMap::new()),
        }
    }

    fn cell(&self, name: &str) -> Arc<OnceCell<Arc<CompiledType>>> {
        let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells.entry(name.to_string()).or_default().clone()
    }

    /// Returns the compiled type, loading it on first use.
    pub async fn get(&self, name: &str) -> Result<Arc<CompiledType>, RegistryError> {
        let cell = self.cell(name);
        if let Some(compiled) = cell.get() {
            trace!(type_name = name, "schema cache hit");
            return Ok(compiled.clone());
        }
        let loaded = cell.get_or_try_init(|| self.load(name)).await.cloned();
        if loaded.is_err() {
            self.forget(name, &cell);
        }
        loaded
    }

    /// Drops the cell of a failed load, unless another request already
    /// replaced or filled it.
    fn forget(&self, name: &str, cell: &Arc<OnceCell<Arc<CompiledType>>>) {
        let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        if cells
            .get(name)
            .is_some_and(|current| Arc::ptr_eq(current, cell) && !current.initialized())
        {
            cells.remove(name);
        }
    }

    async fn load(&self, name: &str) -> Result<Arc<CompiledType>, RegistryError> {
        debug!(type_name = name, "loading schema");
        let mut chain: Vec<RawTypeSchema> = Vec::new();
        let mut next = Some(name.to_string());
        while let Some(current) = next.take() {
            if chain.iter().any(|raw| raw.title == current) {
                let mut cycle: Vec<String> = chain.iter().map(|raw| raw.title.clone()).collect();
                cycle.push(current);
                return Err(RegistryError::Definition {
                    name: name.to_string(),
                    source: SchemaDefinitionError::ExtendsCycle { chain: cycle },
                });
            }
            let Some(definition) = self.source.load(&current).await? else {
                return Err(if chain.is_empty() {
                    RegistryError::NoSchema {
                        name: name.to_string(),
                    }
                } else {
                    RegistryError::Definition {
                        name: name.to_string(),
                        source: SchemaDefinitionError::UnknownParent { parent: current },
                    }
                });
            };
            let raw = parse_definition(definition).map_err(|source| RegistryError::Definition {
                name: current.clone(),
                source,
            })?;
            next = raw.extends.clone();
            chain.push(raw);
        }
        let schema = build_type(name, &chain).map_err(|source| RegistryError::Definition {
            name: name.to_string(),
            source,
        })?;
        debug!(
            type_name = name,
            properties = schema.properties.len(),
            union = schema.is_union(),
            "compiled schema"
        );
        Ok(Arc::new(CompiledType::new(schema)))
    }

    /// Loads `root` and every type reachable from it.
    ///
    /// A missing `root` is an error; a missing type further down is left out
    /// of the set and only reported if a value actually reaches it. The set
    /// is cached, so later calls for the same root skip the walk.
    pub async fn resolve(&self, root: &str) -> Result<SchemaSet, RegistryError> {
        if let Some(set) = self.cached_set(root) {
            trace!(root, "schema set cache hit");
            return Ok(set);
        }
        let set = self.walk(root).await?;
        let mut sets = self.sets.lock().unwrap_or_else(PoisonError::into_inner);
        sets.insert(root.to_string(), set.clone());
        Ok(set)
    }

    fn cached_set(&self, root: &str) -> Option<SchemaSet> {
        let sets = self.sets.lock().unwrap_or_else(PoisonError::into_inner);
        sets.get(root).cloned()
    }

    async fn walk(&self, root: &str) -> Result<SchemaSet, RegistryError> {
        let root_type = self.get(root).await?;
        let mut queue: VecDeque<String> = root_type.schema.references().into();
        let mut types = AHashMap::new();
        let mut missing = AHashSet::new();
        types.insert(root.to_string(), root_type);
        while let Some(name) = queue.pop_front() {
            if types.contains_key(&name) || missing.contains(&name) {
                continue;
            }
            match self.get(&name).await {
                Ok(compiled) => {
                    queue.extend(compiled.schema.references());
                    types.insert(name, compiled);
                }
                Err(RegistryError::NoSchema { .. }) => {
                    debug!(type_name = %name, root, "referenced type has no schema");
                    missing.insert(name);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(SchemaSet {
            root: root.to_string(),
            types: Arc::new(types),
            reference_limit: DEFAULT_REFERENCE_LIMIT,
        })
    }

    /// Whether `name` has been loaded successfully.
    pub fn is_cached(&self, name: &str) -> bool {
        let cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells.get(name).is_some_and(|cell| cell.initialized())
    }

    /// Number of types loaded successfully.
    pub fn cached_len(&self) -> usize {
        let cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells.values().filter(|cell| cell.initialized()).count()
    }
}

/// An immutable snapshot of the types reachable from one root type.
///
/// Cloning shares the types.
#[derive(Debug, Clone)]
pub struct SchemaSet {
    root: String,
    types: Arc<AHashMap<String, Arc<CompiledType>>>,
    reference_limit: usize,
}

impl SchemaSet {
    /// Builds a set directly from compiled types; the first is the root.
    pub fn from_types(types: impl IntoIterator<Item = TypeSchema>) -> Self {
        let mut root = String::new();
        let mut map = AHashMap::new();
        for schema in types {
            if root.is_empty() {
                root = schema.name.clone();
            }
            map.insert(schema.name.clone(), Arc::new(CompiledType::new(schema)));
        }
        Self {
            root,
            types: Arc::new(map),
            reference_limit: DEFAULT_REFERENCE_LIMIT,
        }
    }

    #[must_use]
    pub fn with_reference_limit(mut self, limit: usize) -> Self {
        self.reference_limit = limit;
        self
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn get(&self, name: &str) -> Option<&CompiledType> {
        self.types.get(name).map(Arc::as_ref)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Bound on reference hops taken without descending into a value.
    pub fn reference_limit(&self) -> usize {
        self.reference_limit
    }

    /// `name` if it is a record type.
    pub(crate) fn record_type(&self, name: &str) -> Option<&CompiledType> {
        self.get(name).filter(|compiled| !compiled.schema.is_union())
    }
}
