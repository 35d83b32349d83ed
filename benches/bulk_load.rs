use std::hint::black_box;

use criterion::*;
use entity_tables::prelude::*;
use entity_tables::ComponentID;

const ROWS: usize = 100_000;

#[derive(Clone, Copy, Default)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Clone, Copy, Default)]
struct Velocity {
    x: f32,
    y: f32,
}

fn setup() -> (World, ComponentID, ComponentID) {
    let mut world = World::new();
    let position = world.register_component::<Position>("Position");
    let velocity = world.register_component::<Velocity>("Velocity");
    (world, position, velocity)
}

fn position_values(rows: usize) -> Vec<Position> {
    (0..rows)
        .map(|i| Position {
            x: i as f32,
            y: i as f32,
        })
        .collect()
}

fn bulk_load_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk_load");
    group.sample_size(20);

    group.bench_function("create_100k", |b| {
        b.iter(|| {
            let (mut world, position, velocity) = setup();
            let data = TableData::new(ROWS)
                .with_column(position, position_values(ROWS))
                .with_column(velocity, vec![Velocity::default(); ROWS]);
            world.set_with_data(&data).expect("bulk create failed");
            black_box(world);
        });
    });

    group.bench_function("overwrite_100k_in_place", |b| {
        let (mut world, position, velocity) = setup();
        let entities: Vec<Entity> = (1..=ROWS as u64).map(Entity).collect();
        let seed = TableData::new(ROWS)
            .with_entities(entities.clone())
            .with_column(position, position_values(ROWS))
            .with_column(velocity, vec![Velocity::default(); ROWS]);
        world.set_with_data(&seed).expect("seed failed");

        b.iter(|| {
            let data = TableData::new(ROWS)
                .with_entities(entities.clone())
                .with_column(position, position_values(ROWS))
                .with_component(velocity);
            world.set_with_data(&data).expect("bulk overwrite failed");
            black_box(&world);
        });
    });

    group.bench_function("migrate_100k_to_wider_type", |b| {
        b.iter(|| {
            let (mut world, position, velocity) = setup();
            let entities: Vec<Entity> = (1..=ROWS as u64).map(Entity).collect();
            let seed = TableData::new(ROWS)
                .with_entities(entities.clone())
                .with_column(position, position_values(ROWS));
            world.set_with_data(&seed).expect("seed failed");

            let widen = TableData::new(ROWS)
                .with_entities(entities)
                .with_component(position)
                .with_column(velocity, vec![Velocity::default(); ROWS]);
            world.set_with_data(&widen).expect("bulk migrate failed");
            black_box(world);
        });
    });

    group.finish();
}

criterion_group!(benches, bulk_load_benchmark);
criterion_main!(benches);
