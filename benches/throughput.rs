use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use catalogfeed::{
    core::state::CollectionState,
    item::{CatalogItem, Page},
    query::QueryDescriptor,
    types::SortOrder,
};

fn item(id: u64) -> CatalogItem {
    CatalogItem {
        id,
        title: format!("item {id}"),
        thumbnail: String::new(),
        description: String::new(),
        price: ((id * 7919) % 1000) as f64 / 10.0,
        category: "misc".to_string(),
    }
}

fn load_all(query: &QueryDescriptor, total: u64) -> usize {
    let size = u64::from(query.page_size());
    let mut state = CollectionState::seeded(query.clone(), (0..size).map(item).collect(), Some(total));
    while let Ok(ticket) = state.request_next() {
        let end = (ticket.offset + size).min(total);
        let page = Page {
            items: (ticket.offset..end).map(item).collect(),
            total: Some(total),
            effective_page_size: None,
        };
        let _ = state.complete(&ticket, Ok(page)).expect("apply");
    }
    state.items().len()
}

fn bench_page_append(c: &mut Criterion) {
    let query = QueryDescriptor::new();
    c.bench_function("append_20_per_page_10k", |b| {
        b.iter(|| load_all(&query, 10_000));
    });
}

fn bench_sorted_pages(c: &mut Criterion) {
    let mut group = c.benchmark_group("sorted_page_size");
    for size in [20u32, 100, 500] {
        let query = QueryDescriptor::new()
            .with_sort(SortOrder::PriceDescending)
            .with_page_size(size)
            .expect("page size");
        group.bench_with_input(BenchmarkId::from_parameter(size), &query, |b, q| {
            b.iter(|| load_all(q, 10_000));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_page_append, bench_sorted_pages);
criterion_main!(benches);
