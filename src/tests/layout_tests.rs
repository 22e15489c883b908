use crate::archetypes::{chunk_footprint, layout_order, signature_hash, Archetype, ArchetypeId, ArchetypeStore};
use crate::data_structures::{CHUNK_PAYLOAD_SIZE, MAX_COMPONENT_ALIGNMENT};
use crate::components::{Component, ComponentId, ComponentMeta};
use crate::entities::EntityId;
use std::mem::size_of;

#[derive(Clone, Component)]
struct Byte(u8);

#[derive(Clone, Component)]
struct Word(u32);

#[derive(Clone, Component)]
struct Wide(u64);

#[derive(Clone, Component)]
struct Marker;

#[repr(align(64))]
#[derive(Clone, Component)]
struct Aligned([u8; 40]);

fn sorted(mut metas: Vec<&'static ComponentMeta>) -> Vec<&'static ComponentMeta> {
	metas.sort_by_key(|meta| meta.id());
	metas
}

fn check_layout(archetype: &Archetype) {
	let per_chunk = archetype.per_chunk();
	assert!(per_chunk > 0);

	let mut ranges = vec![(0, size_of::<EntityId>() * per_chunk)];
	for row in archetype.layout() {
		assert_eq!(row.offset() % row.meta().alignment(), 0, "Misaligned component array");
		ranges.push((row.offset(), row.offset() + row.width() * per_chunk));
	}

	ranges.sort();
	for pair in ranges.windows(2) {
		assert!(pair[0].1 <= pair[1].0, "Component arrays overlap: {:?}", pair);
	}
	assert!(ranges.last().unwrap().1 <= CHUNK_PAYLOAD_SIZE, "Layout exceeds the chunk payload");

	let order = layout_order(&archetype.layout().iter().map(|row| row.meta()).collect::<Vec<_>>());
	assert!(
		chunk_footprint(&order, per_chunk + 1) > CHUNK_PAYLOAD_SIZE,
		"One more entity would still have fit in a chunk"
	);
}

#[test]
pub fn dense_layout() {
	let metas = sorted(vec![Byte::meta(), Word::meta(), Wide::meta()]);
	let archetype = Archetype::new(ArchetypeId::EMPTY, &metas);

	let stride = size_of::<EntityId>() + 1 + 4 + 8;
	assert_eq!(archetype.per_chunk(), CHUNK_PAYLOAD_SIZE / stride);
	check_layout(&archetype);
}

#[test]
pub fn padded_layout() {
	let metas = sorted(vec![Byte::meta(), Aligned::meta(), Marker::meta()]);
	let archetype = Archetype::new(ArchetypeId::EMPTY, &metas);

	assert_eq!(Aligned::meta().alignment(), MAX_COMPONENT_ALIGNMENT);
	check_layout(&archetype);
}

#[test]
pub fn empty_layout() {
	let archetype = Archetype::new(ArchetypeId::EMPTY, &[]);

	assert_eq!(archetype.per_chunk(), CHUNK_PAYLOAD_SIZE / size_of::<EntityId>());
	assert!(archetype.layout().is_empty());
}

#[test]
pub fn rows_are_sorted_by_id() {
	let metas = sorted(vec![Wide::meta(), Byte::meta(), Aligned::meta(), Word::meta()]);
	let archetype = Archetype::new(ArchetypeId::EMPTY, &metas);

	let ids: Vec<_> = archetype.component_ids().collect();
	let mut expected = ids.clone();
	expected.sort();
	assert_eq!(ids, expected);

	for meta in &metas {
		let row = archetype.row(meta.id()).unwrap();
		assert!(std::ptr::eq(row.meta(), *meta));
	}
	assert!(archetype.row(Marker::component_id()).is_none());
}

#[test]
pub fn layout_order_is_by_decreasing_alignment() {
	let order = layout_order(&[Byte::meta(), Wide::meta(), Aligned::meta(), Word::meta()]);
	let alignments: Vec<_> = order.iter().map(|meta| meta.alignment()).collect();
	assert_eq!(alignments, vec![64, 8, 4, 1]);
}

#[test]
pub fn matching() {
	let metas = sorted(vec![Byte::meta(), Word::meta(), Wide::meta()]);
	let archetype = Archetype::new(ArchetypeId::EMPTY, &metas);

	let mut required = vec![Byte::component_id(), Wide::component_id()];
	required.sort();
	assert!(archetype.matches(&required));
	assert!(archetype.matches(&[]));

	required.push(Marker::component_id());
	required.sort();
	assert!(!archetype.matches(&required));
}

#[test]
pub fn signature_hash_ignores_order() {
	let a = [Byte::component_id(), Word::component_id(), Wide::component_id()];
	let b = [Wide::component_id(), Byte::component_id(), Word::component_id()];
	assert_eq!(signature_hash(a.into_iter()), signature_hash(b.into_iter()));

	let subset = [Byte::component_id(), Word::component_id()];
	assert_ne!(signature_hash(a.into_iter()), signature_hash(subset.into_iter()));
	assert_ne!(signature_hash(std::iter::empty::<ComponentId>()), signature_hash(subset.into_iter()));
}

#[test]
pub fn exact_signature_comparison() {
	let metas = sorted(vec![Byte::meta(), Word::meta()]);
	let archetype = Archetype::new(ArchetypeId::EMPTY, &metas);

	assert!(archetype.has_exactly(&metas), "An archetype must match its own components");
	assert!(!archetype.has_exactly(&sorted(vec![Byte::meta(), Wide::meta()])), "Same length, different set");
	assert!(!archetype.has_exactly(&sorted(vec![Word::meta(), Wide::meta()])), "Same length, different set");
	assert!(!archetype.has_exactly(&[Byte::meta()]), "A subset is not an exact match");
	assert!(!archetype.has_exactly(&sorted(vec![Byte::meta(), Word::meta(), Wide::meta()])), "A superset is not an exact match");
	assert!(!archetype.has_exactly(&[]));
}

#[test]
pub fn store_keeps_distinct_sets_apart() {
	let mut store = ArchetypeStore::new();
	let a = store.acquire(&mut vec![Byte::meta(), Word::meta()]);
	let b = store.acquire(&mut vec![Byte::meta(), Wide::meta()]);
	let c = store.acquire(&mut vec![Word::meta(), Wide::meta()]);
	let d = store.acquire(&mut vec![Byte::meta()]);

	let ids = [a, b, c, d];
	for (i, x) in ids.iter().enumerate() {
		for y in &ids[i + 1..] {
			assert_ne!(x, y, "Different component sets share an archetype");
		}
	}

	assert_eq!(store.acquire(&mut vec![Word::meta(), Byte::meta()]), a, "Order must not matter");
	assert_eq!(store.acquire(&mut vec![Wide::meta(), Byte::meta()]), b, "Order must not matter");
	assert!(store.get(b).has_exactly(&sorted(vec![Byte::meta(), Wide::meta()])));
}
