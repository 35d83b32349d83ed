//! Integration tests for relationship terms: containment and prefabs.

use entity_tables::prelude::*;
use entity_tables::{BulkLoadError, ComponentID, EMPTY_TABLE};

#[derive(Clone, Copy, Default, Debug, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Clone, Copy, Default, Debug, PartialEq)]
struct Velocity {
    x: f32,
    y: f32,
}

struct Fixture {
    world: World,
    position: ComponentID,
    velocity: ComponentID,
}

fn fixture() -> Fixture {
    let mut world = World::new();
    let position = world.register_component::<Position>("Position");
    let velocity = world.register_component::<Velocity>("Velocity");
    Fixture {
        world,
        position,
        velocity,
    }
}

#[test]
fn naming_a_parent_realizes_it() {
    let mut f = fixture();
    let parent = Entity(100);
    let data = TableData::new(2)
        .with_column(f.position, vec![Position::default(); 2])
        .with_term(TypeTerm::ChildOf(parent));
    let first = f.world.set_with_data(&data).unwrap();

    assert!(f.world.is_alive(parent));
    assert_eq!(f.world.entity_count(), 3);
    assert!(f.world.contains(parent, first));
    assert!(f.world.contains(parent, Entity(first.id() + 1)));
    assert_eq!(f.world.parent_of(first), Some(parent));
}

#[test]
fn containment_is_directional_and_exact() {
    let mut f = fixture();
    let parent_a = Entity(100);
    let parent_b = Entity(200);
    let a_children = TableData::new(1)
        .with_column(f.position, vec![Position::default()])
        .with_term(TypeTerm::ChildOf(parent_a));
    let child_a = f.world.set_with_data(&a_children).unwrap();
    let b_children = TableData::new(1)
        .with_column(f.position, vec![Position::default()])
        .with_term(TypeTerm::ChildOf(parent_b));
    let child_b = f.world.set_with_data(&b_children).unwrap();

    assert!(f.world.contains(parent_a, child_a));
    assert!(!f.world.contains(parent_b, child_a));
    assert!(!f.world.contains(parent_a, child_b));
    assert!(!f.world.contains(child_a, parent_a));

    assert_eq!(f.world.children(parent_a), vec![child_a]);
    assert_eq!(f.world.children(parent_b), vec![child_b]);
}

#[test]
fn children_of_different_parents_live_in_different_tables() {
    let mut f = fixture();
    let shared = TableData::new(1).with_column(f.position, vec![Position::default()]);
    f.world.set_with_data(&shared).unwrap();
    let tables_before = f.world.table_count();

    let under_a = TableData::new(1)
        .with_column(f.position, vec![Position::default()])
        .with_term(TypeTerm::ChildOf(Entity(100)));
    f.world.set_with_data(&under_a).unwrap();
    let under_b = TableData::new(1)
        .with_column(f.position, vec![Position::default()])
        .with_term(TypeTerm::ChildOf(Entity(200)));
    f.world.set_with_data(&under_b).unwrap();

    assert_eq!(f.world.table_count(), tables_before + 2);
}

#[test]
fn a_realized_parent_can_later_receive_data() {
    let mut f = fixture();
    let parent = Entity(100);
    let children = TableData::new(1)
        .with_column(f.position, vec![Position::default()])
        .with_term(TypeTerm::ChildOf(parent));
    f.world.set_with_data(&children).unwrap();

    // The parent currently lives in the empty-type table.
    let empty_rows = f
        .world
        .tables()
        .find(|t| t.id() == EMPTY_TABLE)
        .map(|t| t.row_count())
        .unwrap_or_default();
    assert_eq!(empty_rows, 1);

    let give_data = TableData::new(1)
        .with_entities(vec![parent])
        .with_column(f.position, vec![Position { x: 5.0, y: 6.0 }]);
    f.world.set_with_data(&give_data).unwrap();

    assert_eq!(
        f.world.get::<Position>(parent),
        Some(&Position { x: 5.0, y: 6.0 })
    );
    let empty_rows = f
        .world
        .tables()
        .find(|t| t.id() == EMPTY_TABLE)
        .map(|t| t.row_count())
        .unwrap_or_default();
    assert_eq!(empty_rows, 0);
}

#[test]
fn the_invalid_handle_is_not_a_valid_target() {
    let mut f = fixture();
    let data = TableData::new(1)
        .with_column(f.position, vec![Position::default()])
        .with_term(TypeTerm::ChildOf(Entity(0)));
    assert!(matches!(
        f.world.set_with_data(&data),
        Err(BulkLoadError::UnresolvedTarget { target: Entity(0) })
    ));
    assert_eq!(f.world.entity_count(), 0);
}

#[test]
fn instances_read_missing_components_from_their_base() {
    let mut f = fixture();
    let base = Entity(10);
    let seed = TableData::new(1)
        .with_entities(vec![base])
        .with_column(f.position, vec![Position { x: 10.0, y: 20.0 }]);
    f.world.set_with_data(&seed).unwrap();

    let instances = TableData::new(2)
        .with_column(f.velocity, vec![
            Velocity { x: 1.0, y: 1.0 },
            Velocity { x: 2.0, y: 2.0 },
        ])
        .with_term(TypeTerm::InstanceOf(base));
    let first = f.world.set_with_data(&instances).unwrap();

    for offset in 0..2u64 {
        let instance = Entity(first.id() + offset);
        assert_eq!(f.world.base_of(instance), Some(base));
        // Own component reads locally.
        assert_eq!(
            f.world.get::<Velocity>(instance),
            Some(&Velocity {
                x: 1.0 + offset as f32,
                y: 1.0 + offset as f32,
            })
        );
        // Missing component falls back to the base's shared value.
        assert_eq!(
            f.world.get::<Position>(instance),
            Some(&Position { x: 10.0, y: 20.0 })
        );
        // The term is not on the instance's own type.
        assert!(!f.world.has_component::<Position>(instance));
    }
}

#[test]
fn updating_the_base_is_visible_through_every_instance() {
    let mut f = fixture();
    let base = Entity(10);
    let seed = TableData::new(1)
        .with_entities(vec![base])
        .with_column(f.position, vec![Position { x: 10.0, y: 20.0 }]);
    f.world.set_with_data(&seed).unwrap();

    let instances = TableData::new(2)
        .with_component(f.velocity)
        .with_term(TypeTerm::InstanceOf(base));
    let first = f.world.set_with_data(&instances).unwrap();

    *f.world.get_mut::<Position>(base).unwrap() = Position { x: 99.0, y: 98.0 };

    for offset in 0..2u64 {
        assert_eq!(
            f.world.get::<Position>(Entity(first.id() + offset)),
            Some(&Position { x: 99.0, y: 98.0 })
        );
    }
}

#[test]
fn an_instances_own_value_shadows_the_base() {
    let mut f = fixture();
    let base = Entity(10);
    let seed = TableData::new(1)
        .with_entities(vec![base])
        .with_column(f.position, vec![Position { x: 10.0, y: 20.0 }]);
    f.world.set_with_data(&seed).unwrap();

    let instance = Entity(11);
    let with_own = TableData::new(1)
        .with_entities(vec![instance])
        .with_column(f.position, vec![Position { x: 1.0, y: 2.0 }])
        .with_term(TypeTerm::InstanceOf(base));
    f.world.set_with_data(&with_own).unwrap();

    assert_eq!(
        f.world.get::<Position>(instance),
        Some(&Position { x: 1.0, y: 2.0 })
    );
}

#[test]
fn fallback_follows_chains_of_bases() {
    let mut f = fixture();
    let grandbase = Entity(1);
    let seed = TableData::new(1)
        .with_entities(vec![grandbase])
        .with_column(f.position, vec![Position { x: 7.0, y: 8.0 }]);
    f.world.set_with_data(&seed).unwrap();

    let base = Entity(2);
    let mid = TableData::new(1)
        .with_entities(vec![base])
        .with_component(f.velocity)
        .with_term(TypeTerm::InstanceOf(grandbase));
    f.world.set_with_data(&mid).unwrap();

    let instance = Entity(3);
    let leaf = TableData::new(1)
        .with_entities(vec![instance])
        .with_term(TypeTerm::InstanceOf(base));
    f.world.set_with_data(&leaf).unwrap();

    assert_eq!(
        f.world.get::<Position>(instance),
        Some(&Position { x: 7.0, y: 8.0 })
    );
}

#[test]
fn prefab_mutation_through_an_instance_is_refused() {
    let mut f = fixture();
    let base = Entity(10);
    let seed = TableData::new(1)
        .with_entities(vec![base])
        .with_column(f.position, vec![Position { x: 10.0, y: 20.0 }]);
    f.world.set_with_data(&seed).unwrap();

    let instance = Entity(11);
    let data = TableData::new(1)
        .with_entities(vec![instance])
        .with_term(TypeTerm::InstanceOf(base));
    f.world.set_with_data(&data).unwrap();

    assert!(f.world.get_mut::<Position>(instance).is_none());
    assert_eq!(
        f.world.get::<Position>(base),
        Some(&Position { x: 10.0, y: 20.0 })
    );
}
