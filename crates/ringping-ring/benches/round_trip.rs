//! Round-trip latency through an MPSC request ring and an SPSC reply ring.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use ringping_ring::{mpsc, spsc, PopError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

fn bench_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_round_trip");
    group.throughput(Throughput::Elements(1));

    group.bench_function("mpsc_to_spsc_u64", |b| {
        let (req_tx, mut req_rx) = mpsc::channel::<u64>(128).unwrap();
        let (mut resp_tx, mut resp_rx) = spsc::channel::<u64>(2).unwrap();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_clone = Arc::clone(&stop);

        let echo = thread::spawn(move || {
            let mut batch = Vec::with_capacity(64);
            while !stop_clone.load(Ordering::Relaxed) {
                req_rx.pop_burst(&mut batch, 64);
                for v in batch.drain(..) {
                    resp_tx.try_push(v).unwrap();
                }
                std::hint::spin_loop();
            }
        });

        b.iter(|| {
            req_tx.try_push(black_box(42u64)).unwrap();
            loop {
                match resp_rx.try_pop() {
                    Ok(v) => break black_box(v),
                    Err(PopError::Empty) => std::hint::spin_loop(),
                    Err(PopError::Disconnected) => panic!("echo thread exited"),
                }
            }
        });

        stop.store(true, Ordering::Relaxed);
        echo.join().unwrap();
    });

    group.finish();
}

criterion_group!(benches, bench_round_trip);
criterion_main!(benches);
