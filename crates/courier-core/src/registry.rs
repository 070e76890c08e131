// Type Registry
//
// This module maps discriminator names to constructible type descriptors.
// The decoder consults it to rebuild tagged object nodes. Registration is
// explicit and a name can only ever be bound to one Rust type.

use std::any::{type_name, TypeId};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, error, warn};

use courier_error::{SerializationError, SerializationResult};

use crate::batch::MessageBatch;
use crate::events::{
    AckComplete, FeedbackEncryptionComplete, FileNotification, IngestionComplete, IntegrityComplete,
    OrderingComplete, RefdataComplete,
};
use crate::message::Message;
use crate::serializable::{Constructible, Record, Serializable};

/// Builds a boxed instance from a decoded record
pub type Constructor = fn(Record) -> SerializationResult<Box<dyn Serializable>>;

fn construct_boxed<T: Constructible>(record: Record) -> SerializationResult<Box<dyn Serializable>> {
    let value = T::construct(record)?;
    Ok(Box::new(value))
}

/// Everything the decoder needs to know about a registered type
#[derive(Debug, Clone, Copy)]
pub struct TypeDescriptor {
    name: &'static str,
    type_id: TypeId,
    rust_type: &'static str,
    constructor: Constructor,
}

impl TypeDescriptor {
    /// Descriptor for a constructible type, registered under its `TYPE_NAME`
    pub fn of<T: Constructible>() -> Self {
        Self {
            name: T::TYPE_NAME,
            type_id: TypeId::of::<T>(),
            rust_type: type_name::<T>(),
            constructor: construct_boxed::<T>,
        }
    }

    /// Descriptor binding `T` to a custom name and constructor
    pub fn with_constructor<T: Serializable>(name: &'static str, constructor: Constructor) -> Self {
        Self {
            name,
            type_id: TypeId::of::<T>(),
            rust_type: type_name::<T>(),
            constructor,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fully qualified Rust type name, for diagnostics
    pub fn rust_type(&self) -> &'static str {
        self.rust_type
    }

    /// Invoke the registered constructor
    pub fn construct(&self, record: Record) -> SerializationResult<Box<dyn Serializable>> {
        (self.constructor)(record)
    }
}

/// Name-to-descriptor table, read-mostly
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: RwLock<HashMap<String, TypeDescriptor>>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the message model and every built-in event
    pub fn with_builtin_types() -> SerializationResult<Self> {
        let registry = Self::new();
        register_builtin_types(&registry)?;
        Ok(registry)
    }

    fn read_types(&self) -> SerializationResult<RwLockReadGuard<'_, HashMap<String, TypeDescriptor>>> {
        self.types
            .read()
            .map_err(|e| SerializationError::internal(format!("Failed to acquire read lock: {}", e)))
    }

    fn write_types(&self) -> SerializationResult<RwLockWriteGuard<'_, HashMap<String, TypeDescriptor>>> {
        self.types
            .write()
            .map_err(|e| SerializationError::internal(format!("Failed to acquire write lock: {}", e)))
    }

    /// Register `T` under its `TYPE_NAME`
    pub fn register<T: Constructible>(&self) -> SerializationResult<()> {
        self.register_descriptor(TypeDescriptor::of::<T>())
    }

    /// Register a descriptor.
    ///
    /// Registering the same Rust type under the same name again is a no-op.
    /// Binding a name that already belongs to a different type fails with
    /// `DuplicateRegistration`.
    pub fn register_descriptor(&self, descriptor: TypeDescriptor) -> SerializationResult<()> {
        let mut types = self.write_types()?;
        match types.entry(descriptor.name.to_string()) {
            Entry::Occupied(existing) if existing.get().type_id == descriptor.type_id => {
                debug!(name = descriptor.name, "type already registered");
                Ok(())
            }
            Entry::Occupied(existing) => {
                warn!(
                    name = descriptor.name,
                    existing = existing.get().rust_type,
                    rejected = descriptor.rust_type,
                    "rejected duplicate type registration"
                );
                Err(SerializationError::DuplicateRegistration {
                    name: descriptor.name.to_string(),
                    existing: existing.get().rust_type.to_string(),
                })
            }
            Entry::Vacant(slot) => {
                debug!(name = descriptor.name, rust_type = descriptor.rust_type, "registered type");
                slot.insert(descriptor);
                Ok(())
            }
        }
    }

    /// Find the descriptor registered under `name`
    pub fn lookup(&self, name: &str) -> SerializationResult<TypeDescriptor> {
        self.read_types()?
            .get(name)
            .copied()
            .ok_or_else(|| SerializationError::UnknownType(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read_types().map(|types| types.contains_key(name)).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.read_types().map(|types| types.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered names in sorted order
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .read_types()
            .map(|types| types.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}

/// Register the message model and every built-in event type
pub fn register_builtin_types(registry: &TypeRegistry) -> SerializationResult<()> {
    registry.register::<Message>()?;
    registry.register::<MessageBatch>()?;
    registry.register::<FileNotification>()?;
    registry.register::<AckComplete>()?;
    registry.register::<IntegrityComplete>()?;
    registry.register::<OrderingComplete>()?;
    registry.register::<IngestionComplete>()?;
    registry.register::<RefdataComplete>()?;
    registry.register::<FeedbackEncryptionComplete>()?;
    Ok(())
}

/// The process-wide registry, created with the built-in types on first use
pub fn global_registry() -> &'static TypeRegistry {
    static GLOBAL_REGISTRY: OnceLock<TypeRegistry> = OnceLock::new();

    GLOBAL_REGISTRY.get_or_init(|| {
        let registry = TypeRegistry::new();
        if let Err(err) = register_builtin_types(&registry) {
            error!(%err, "failed to register built-in types");
        }
        registry
    })
}

/// Register `T` in the process-wide registry
pub fn register<T: Constructible>() -> SerializationResult<()> {
    global_registry().register::<T>()
}
