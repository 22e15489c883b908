use crate::entities::{EntityId, EntityMapper};
use crate::archetypes::ArchetypeId;

#[test]
pub fn allocate_and_resolve() {
	let mut mapper = EntityMapper::new();
	let archetype = ArchetypeId { index: 3 };

	let a = mapper.allocate(archetype, 0);
	let b = mapper.allocate(archetype, 1);

	assert_ne!(a, b);
	assert_eq!(mapper.resolve(a), Some((archetype, 0)));
	assert_eq!(mapper.resolve(b), Some((archetype, 1)));
	assert_eq!(mapper.len(), 2);
	assert!(!mapper.is_valid(EntityId::NONE), "The null id must never resolve");
}

#[test]
pub fn recycled_slots_change_generation() {
	let mut mapper = EntityMapper::new();
	let a = mapper.allocate(ArchetypeId::EMPTY, 0);
	mapper.recycle(a);

	assert!(!mapper.is_valid(a));
	assert_eq!(mapper.len(), 0);

	let b = mapper.allocate(ArchetypeId::EMPTY, 0);
	assert_eq!(a.index(), b.index(), "The free slot was not reused");
	assert_ne!(a.generation(), b.generation());
	assert!(!mapper.is_valid(a), "A stale id resolved after its slot was reused");
	assert!(mapper.is_valid(b));
	assert_eq!(mapper.capacity(), 1);
}

#[test]
pub fn recycling_twice_is_a_no_op() {
	let mut mapper = EntityMapper::new();
	let a = mapper.allocate(ArchetypeId::EMPTY, 0);
	let b = mapper.allocate(ArchetypeId::EMPTY, 1);

	mapper.recycle(a);
	mapper.recycle(a);

	assert_eq!(mapper.len(), 1);
	let c = mapper.allocate(ArchetypeId::EMPTY, 1);
	let d = mapper.allocate(ArchetypeId::EMPTY, 2);
	assert_ne!(c.index(), d.index(), "A slot was put on the free list twice");
	assert!(mapper.is_valid(b));
}

#[test]
pub fn free_list_is_lifo() {
	let mut mapper = EntityMapper::new();
	let ids: Vec<_> = (0..4).map(|i| mapper.allocate(ArchetypeId::EMPTY, i)).collect();

	mapper.recycle(ids[1]);
	mapper.recycle(ids[3]);

	assert_eq!(mapper.allocate(ArchetypeId::EMPTY, 0).index(), ids[3].index());
	assert_eq!(mapper.allocate(ArchetypeId::EMPTY, 0).index(), ids[1].index());
	assert_eq!(mapper.allocate(ArchetypeId::EMPTY, 0).index(), 4);
}

#[test]
pub fn exhausted_slots_are_retired() {
	let mut mapper = EntityMapper::new();
	let a = mapper.allocate(ArchetypeId::EMPTY, 0);

	mapper.set_generation(a.index(), u32::MAX);
	let a = EntityId::new(a.index(), u32::MAX);
	assert!(mapper.is_valid(a));

	mapper.recycle(a);
	assert!(!mapper.is_valid(a));

	let b = mapper.allocate(ArchetypeId::EMPTY, 0);
	assert_ne!(a.index(), b.index(), "A retired slot was handed out again");
}

#[test]
pub fn relocation_updates() {
	let mut mapper = EntityMapper::new();
	let a = mapper.allocate(ArchetypeId::EMPTY, 5);

	mapper.set_index(a, 2);
	assert_eq!(mapper.resolve(a), Some((ArchetypeId::EMPTY, 2)));

	let other = ArchetypeId { index: 7 };
	mapper.set_location(a, other, 9);
	assert_eq!(mapper.resolve(a), Some((other, 9)));
}

#[test]
pub fn exhausting_ids_keeps_the_live_count() {
	let mut mapper = EntityMapper::with_limit(2);
	let a = mapper.allocate(ArchetypeId::EMPTY, 0);
	mapper.allocate(ArchetypeId::EMPTY, 1);

	let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| mapper.allocate(ArchetypeId::EMPTY, 2)));
	assert!(result.is_err(), "Allocating past the last slot must fail");
	assert_eq!(mapper.len(), 2, "A failed allocation changed the live count");
	assert_eq!(mapper.capacity(), 2);

	mapper.recycle(a);
	assert_eq!(mapper.len(), 1);
	let c = mapper.allocate(ArchetypeId::EMPTY, 0);
	assert_eq!(c.index(), a.index(), "A freed slot is still usable after running out");
	assert_eq!(mapper.len(), 2);
}
