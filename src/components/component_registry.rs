//! The process-wide list of known [component types](ComponentMeta).
//!
//! Registration normally happens through `#[derive(Component)]`, which registers a type the first
//! time its metadata is requested. Type-erased components can be registered directly with [register].

use crate::data_structures::{align_to, CHUNK_PAYLOAD_SIZE, MAX_COMPONENT_ALIGNMENT};
use crate::components::{ComponentId, ComponentMeta};
use std::hash::BuildHasherDefault;
use crate::entities::EntityId;
use nohash_hasher::NoHashHasher;
use std::collections::HashMap;
use lazy_static::lazy_static;
use parking_lot::RwLock;
use std::mem::size_of;
use thiserror::Error;

type Hasher = BuildHasherDefault<NoHashHasher<u32>>;

lazy_static! {
	static ref REGISTRY: RwLock<ComponentRegistry> = RwLock::new(ComponentRegistry::default());
}

#[derive(Default)]
struct ComponentRegistry {
	by_id: HashMap<ComponentId, &'static ComponentMeta, Hasher>,
	components: Vec<&'static ComponentMeta>,
}

/// Reasons a [ComponentMeta] can be rejected by [register].
#[derive(Debug, Error, Eq, PartialEq)]
pub enum RegistryError {
	#[error("component id {id:?} is already registered as `{existing}`")]
	DuplicateId { id: ComponentId, existing: &'static str },

	#[error("component `{name}` has an alignment of {alignment}, which is not a power of two")]
	InvalidAlignment { name: &'static str, alignment: usize },

	#[error("component `{name}` requires an alignment of {alignment}, but chunks only guarantee {max}", max = MAX_COMPONENT_ALIGNMENT)]
	AlignmentTooLarge { name: &'static str, alignment: usize },

	#[error("component `{name}` is {size} bytes, which does not fit in a single chunk")]
	TooLarge { name: &'static str, size: usize },
}

/// Registers a component type.
///
/// The metadata is leaked and lives for the rest of the process.
pub fn register(meta: ComponentMeta) -> Result<&'static ComponentMeta, RegistryError> {
	validate(&meta)?;

	let mut registry = REGISTRY.write();
	if let Some(existing) = registry.by_id.get(&meta.id()) {
		return Err(RegistryError::DuplicateId {
			id: meta.id(),
			existing: existing.name(),
		});
	}

	let meta: &'static ComponentMeta = Box::leak(Box::new(meta));
	registry.by_id.insert(meta.id(), meta);
	registry.components.push(meta);

	tracing::debug!(
		component = meta.name(),
		id = meta.id().value(),
		size = meta.size(),
		alignment = meta.alignment(),
		"registered component"
	);
	Ok(meta)
}

/// Allocates a new [ComponentId] for `T` and registers it.
/// **Should not be called from user code**, use #\[derive([Component](crate::components::Component))] instead.
///
/// Panics if `T` cannot be stored in a chunk.
pub fn register_component<T: 'static + Clone>(name: &'static str) -> &'static ComponentMeta {
	let meta = ComponentMeta::of::<T>(ComponentId::allocate(), name);
	register(meta).unwrap_or_else(|err| panic!("{}", err))
}

/// Retrieves the metadata of a registered component.
///
/// Panics if no component with the given id was registered.
pub fn lookup(id: ComponentId) -> &'static ComponentMeta {
	match try_lookup(id) {
		Some(meta) => meta,
		None => panic!("Component {:?} has not been registered", id),
	}
}

/// Panics unless `meta` is the exact metadata registered under its id.
pub(crate) fn assert_registered(meta: &'static ComponentMeta) {
	let registered = lookup(meta.id());
	ecs_assert!(
		std::ptr::eq(registered, meta),
		"Component {:?} does not match the metadata registered as `{}`",
		meta.id(),
		registered.name()
	);
}

/// Retrieves the metadata of a registered component, if any.
pub fn try_lookup(id: ComponentId) -> Option<&'static ComponentMeta> {
	REGISTRY.read().by_id.get(&id).copied()
}

/// Finds a registered component by its exact name.
pub fn find_by_name(name: &str) -> Option<&'static ComponentMeta> {
	REGISTRY.read().components.iter().find(|meta| meta.name() == name).copied()
}

/// All components registered so far, in registration order.
pub fn registered_components() -> Vec<&'static ComponentMeta> {
	REGISTRY.read().components.clone()
}

fn validate(meta: &ComponentMeta) -> Result<(), RegistryError> {
	let name = meta.name();
	let alignment = meta.alignment();

	if !alignment.is_power_of_two() {
		return Err(RegistryError::InvalidAlignment { name, alignment });
	}
	if alignment > MAX_COMPONENT_ALIGNMENT {
		return Err(RegistryError::AlignmentTooLarge { name, alignment });
	}

	// A single entity must fit: its id followed by one aligned component.
	let footprint = align_to(size_of::<EntityId>(), alignment).checked_add(meta.size());
	match footprint {
		Some(footprint) if footprint <= CHUNK_PAYLOAD_SIZE => Ok(()),
		_ => Err(RegistryError::TooLarge { name, size: meta.size() }),
	}
}
