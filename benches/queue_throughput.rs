//! Resource queue benchmarks.
//!
//! Measures add/drain throughput across priority tiers and the cost of
//! replacing and cancelling pending entries.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use landing_preload::scheduler::{LoadRequest, ResourcePriority, ResourceQueue, ResourceQueueConfig};

fn create_request(i: usize) -> LoadRequest {
    let priority = ResourcePriority::ALL[i % ResourcePriority::ALL.len()];
    LoadRequest::new(format!("img-{i}"), format!("/Images/{i}.webp"), priority)
}

fn bench_add_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_add_drain");

    for size in [16usize, 128, 1024] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("mixed_tiers", size), &size, |b, &size| {
            b.iter(|| {
                let mut queue = ResourceQueue::new(ResourceQueueConfig { max_concurrent: size });
                for i in 0..size {
                    queue.add(create_request(i));
                }
                while let Some(request) = queue.get_next() {
                    queue.mark_loaded(black_box(&request.id));
                }
            })
        });
    }

    group.finish();
}

fn bench_replace(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_replace");

    for pending in [16usize, 256] {
        let mut queue = ResourceQueue::default();
        for i in 0..pending {
            queue.add(create_request(i));
        }
        group.throughput(Throughput::Elements(1));
        group.bench_function(BenchmarkId::new("re_add", pending), |b| {
            let mut i = 0;
            b.iter(|| {
                queue.add(black_box(create_request(i % pending)));
                i += 1;
            })
        });
    }

    group.finish();
}

fn bench_cancel_all(c: &mut Criterion) {
    c.bench_function("queue_cancel_all_thumbnails", |b| {
        b.iter(|| {
            let mut queue = ResourceQueue::default();
            for i in 0..64 {
                let id = if i % 2 == 0 {
                    format!("agent-thumbnail-{i}")
                } else {
                    format!("reason-{i}-breakdown-0")
                };
                queue.add(LoadRequest::new(id, "/x.webp", ResourcePriority::Lazy));
            }
            let cancelled = queue.cancel_all(|r| r.id.starts_with("agent-thumbnail-"));
            black_box(cancelled);
        })
    });
}

criterion_group!(benches, bench_add_drain, bench_replace, bench_cancel_all);
criterion_main!(benches);
