use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use tagtree_layout::{
    Entity, Filters, Graph, LayoutConfig, MediaKind, RelationEdge, Seeds, Theme, compute_layout,
};

const TAG_POOL: [&str; 12] = [
    "isekai", "mecha", "romance", "sports", "drama", "comedy", "space", "music", "horror",
    "mystery", "fantasy", "slice",
];

fn synthetic_graph(entities: usize) -> Graph {
    let mut nodes = vec![Entity {
        id: "root".to_string(),
        title: "Root".to_string(),
        tags: vec!["isekai".to_string()],
        cluster: None,
        kind: MediaKind::Show,
        services: Vec::new(),
        metadata: Default::default(),
    }];
    let mut edges = Vec::new();
    for i in 0..entities {
        let id = format!("n{i}");
        let tags: Vec<String> = (0..3)
            .map(|k| TAG_POOL[(i * 3 + k * 5) % TAG_POOL.len()].to_string())
            .collect();
        nodes.push(Entity {
            id: id.clone(),
            title: format!("Entity {i}"),
            tags,
            cluster: Some(TAG_POOL[i % 4].to_string()),
            kind: if i % 3 == 0 {
                MediaKind::Publication
            } else {
                MediaKind::Show
            },
            services: Vec::new(),
            metadata: Default::default(),
        });
        let from = if i == 0 {
            "root".to_string()
        } else {
            format!("n{}", i / 2)
        };
        edges.push(RelationEdge { from, to: id });
    }
    Graph {
        entities: nodes,
        edges,
    }
}

fn bench_compute_layout(c: &mut Criterion) {
    let theme = Theme::modern();
    let config = LayoutConfig::default();
    let filters = Filters::default();
    let seeds = Seeds::single("root");

    let mut group = c.benchmark_group("compute_layout");
    for size in [25usize, 100, 400] {
        let graph = synthetic_graph(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &graph, |b, graph| {
            b.iter(|| {
                black_box(compute_layout(
                    black_box(graph),
                    &seeds,
                    &filters,
                    &theme,
                    &config,
                ))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_compute_layout);
criterion_main!(benches);
