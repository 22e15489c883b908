use crate::components::*;
use crate::data_structures::CHUNK_PAYLOAD_SIZE;
use std::mem::{align_of, size_of};

#[derive(Clone, Component)]
struct Mass(f64);

#[derive(Clone, Component)]
struct Tag;

#[repr(align(64))]
#[derive(Clone, Component)]
struct CacheLine([u8; 64]);

unsafe fn copy_nothing(_: *mut u8, _: *const u8) {}
unsafe fn relocate_nothing(_: *mut u8, _: *mut u8) {}
unsafe fn destroy_nothing(_: *mut u8) {}

fn raw_meta(name: &'static str, size: usize, alignment: usize) -> ComponentMeta {
	unsafe {
		ComponentMeta::from_raw_parts(
			ComponentId::allocate(),
			name,
			size,
			alignment,
			copy_nothing,
			relocate_nothing,
			destroy_nothing,
		)
	}
}

#[test]
pub fn derived_components_are_registered() {
	let meta = Mass::meta();

	assert_eq!(meta.name(), concat!(module_path!(), "::Mass"));
	assert_eq!(meta.size(), size_of::<Mass>());
	assert_eq!(meta.alignment(), align_of::<Mass>());
	assert!(std::ptr::eq(meta, lookup(Mass::component_id())), "Lookup returned a different meta");
	assert_eq!(ComponentId::of::<Mass>(), Mass::component_id());
	assert!(registered_components().iter().any(|m| std::ptr::eq(*m, meta)));
}

mod other {
	use crate::components::Component;

	#[derive(Clone, Component)]
	pub struct Mass(pub f32);
}

#[test]
pub fn names_include_the_module_path() {
	let local = Mass::meta();
	let other = other::Mass::meta();

	assert_ne!(local.id(), other.id());
	assert_ne!(local.name(), other.name(), "Types sharing an identifier must not share a name");
	assert!(other.name().ends_with("::other::Mass"));
	assert!(std::ptr::eq(find_by_name(local.name()).unwrap(), local));
	assert!(std::ptr::eq(find_by_name(other.name()).unwrap(), other));
}

#[test]
pub fn ids_are_unique_and_stable() {
	assert_ne!(Mass::component_id(), Tag::component_id());
	assert_eq!(Mass::component_id(), Mass::component_id());
	assert_eq!(CacheLine::meta().alignment(), 64);
	assert_eq!(Tag::meta().size(), 0);
}

#[test]
pub fn raw_registration() {
	let meta = register(raw_meta("registry_tests::Raw", 24, 8)).unwrap();

	assert!(std::ptr::eq(meta, lookup(meta.id())));
	assert!(std::ptr::eq(meta, find_by_name("registry_tests::Raw").unwrap()));
	assert!(find_by_name("registry_tests::Missing").is_none());
}

#[test]
pub fn duplicate_ids_are_rejected() {
	let first = register(raw_meta("registry_tests::First", 4, 4)).unwrap();
	let duplicate = unsafe {
		ComponentMeta::from_raw_parts(
			first.id(),
			"registry_tests::Second",
			4,
			4,
			copy_nothing,
			relocate_nothing,
			destroy_nothing,
		)
	};

	assert_eq!(
		register(duplicate).unwrap_err(),
		RegistryError::DuplicateId { id: first.id(), existing: "registry_tests::First" }
	);
	assert_eq!(lookup(first.id()).name(), "registry_tests::First");
}

#[test]
pub fn invalid_layouts_are_rejected() {
	assert_eq!(
		register(raw_meta("Odd", 4, 3)).unwrap_err(),
		RegistryError::InvalidAlignment { name: "Odd", alignment: 3 }
	);
	assert_eq!(
		register(raw_meta("Huge", 128, 128)).unwrap_err(),
		RegistryError::AlignmentTooLarge { name: "Huge", alignment: 128 }
	);
	assert_eq!(
		register(raw_meta("Big", CHUNK_PAYLOAD_SIZE, 8)).unwrap_err(),
		RegistryError::TooLarge { name: "Big", size: CHUNK_PAYLOAD_SIZE }
	);
	assert!(register(raw_meta("Fits", CHUNK_PAYLOAD_SIZE - 8, 8)).is_ok());
}

#[test]
pub fn unknown_ids_are_not_found() {
	assert!(try_lookup(ComponentId::allocate()).is_none());
}

#[test]
#[should_panic(expected = "has not been registered")]
pub fn lookup_of_unknown_id_panics() {
	lookup(ComponentId::allocate());
}
