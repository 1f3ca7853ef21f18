//! Concurrent access integration tests
//!
//! These tests verify that ferrous-graph behaves correctly under concurrent
//! access: scoped instance consistency, per-graph isolation and injection from
//! many threads at once.

use ferrous_graph::{Bindings, Injectable, Members, Module, ObjectGraph, Singleton};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

// ===== Test Services =====

#[derive(Debug)]
pub struct CounterService {
    count: AtomicU32,
}

impl CounterService {
    pub fn increment(&self) -> u32 {
        self.count.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn get_count(&self) -> u32 {
        self.count.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct SlowService {
    id: u32,
}

pub struct RequestScope;

#[derive(Default)]
pub struct ConcurrentModule {
    slow_created: Arc<AtomicU32>,
}

impl Module for ConcurrentModule {
    fn provides(bindings: &mut Bindings<Self>) {
        bindings.provides::<CounterService>("counter").singleton().to(|_| CounterService {
            count: AtomicU32::new(0),
        });
        bindings
            .provides::<SlowService>("slow")
            .scoped::<RequestScope>()
            .to(|m| {
                // Widen the window in which racing resolvers can interleave
                thread::sleep(Duration::from_millis(5));
                SlowService {
                    id: m.slow_created.fetch_add(1, Ordering::SeqCst),
                }
            });
    }
}

fn root() -> ObjectGraph {
    root_counting(Arc::default())
}

fn root_counting(slow_created: Arc<AtomicU32>) -> ObjectGraph {
    ObjectGraph::builder()
        .scope::<Singleton>()
        .module(ConcurrentModule { slow_created })
        .build()
        .unwrap()
}

// ===== Tests =====

#[test]
fn test_concurrent_singleton_resolution() {
    let graph = root();
    let thread_count = 16;
    let barrier = Arc::new(Barrier::new(thread_count));

    let handles: Vec<_> = (0..thread_count)
        .map(|_| {
            let graph = graph.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                let counter = graph.get::<CounterService>().unwrap();
                counter.increment();
                counter
            })
        })
        .collect();

    let counters: Vec<Arc<CounterService>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for counter in &counters[1..] {
        assert!(Arc::ptr_eq(&counters[0], counter));
    }
    assert_eq!(counters[0].get_count(), thread_count as u32);
    assert_eq!(graph.cached_instances(), 1);
}

#[test]
fn test_racing_first_resolution_creates_once() {
    let created = Arc::new(AtomicU32::new(0));
    let graph = root_counting(created.clone())
        .child()
        .scope::<RequestScope>()
        .build()
        .unwrap();
    let barrier = Barrier::new(8);

    let resolved: Vec<Arc<SlowService>> = crossbeam_utils::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(|_| {
                    barrier.wait();
                    graph.get::<SlowService>().unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
    .unwrap();

    let stored = graph.get::<SlowService>().unwrap();
    assert!(resolved.iter().all(|s| Arc::ptr_eq(s, &stored)));
    assert_eq!(created.load(Ordering::SeqCst), 1);
    assert_eq!(graph.cached_instances(), 1);
}

#[test]
fn test_scope_graphs_isolated_across_threads() {
    let root = root();

    let ids: Vec<(u32, u32)> = crossbeam_utils::thread::scope(|s| {
        let handles: Vec<_> = (0..6)
            .map(|_| {
                let root = &root;
                s.spawn(move |_| {
                    let request = root.child().scope::<RequestScope>().build().unwrap();
                    let first = request.get::<SlowService>().unwrap();
                    let second = request.get::<SlowService>().unwrap();
                    assert!(Arc::ptr_eq(&first, &second));
                    (first.id, second.id)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
    .unwrap();

    let mut distinct: Vec<u32> = ids.iter().map(|(a, _)| *a).collect();
    distinct.sort_unstable();
    distinct.dedup();
    assert_eq!(distinct.len(), 6);
}

#[derive(Default)]
struct Worker {
    counter: Option<Arc<CounterService>>,
}

impl Injectable for Worker {
    fn members(members: &mut Members<Self>) {
        members
            .field("counter")
            .inject(|w, c: Arc<CounterService>| w.counter = Some(c));
    }
}

#[test]
fn test_concurrent_injection() {
    let graph = root();
    let declarations = graph.signature_cache().cached_fields();
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let graph = graph.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                let mut workers: Vec<Worker> = (0..25).map(|_| Worker::default()).collect();
                for worker in &mut workers {
                    graph.inject(worker).unwrap();
                    worker.counter.as_ref().unwrap().increment();
                }
                workers
            })
        })
        .collect();

    let workers: Vec<Worker> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
    let shared = graph.get::<CounterService>().unwrap();

    assert_eq!(workers.len(), 200);
    assert!(workers
        .iter()
        .all(|w| Arc::ptr_eq(w.counter.as_ref().unwrap(), &shared)));
    assert_eq!(shared.get_count(), 200);
    // One more declaration signature for Worker::counter, shared by every thread
    assert_eq!(graph.signature_cache().cached_fields(), declarations + 1);
}
