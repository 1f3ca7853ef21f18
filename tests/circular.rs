use ferrous_graph::{Bindings, Module, ObjectGraph, Provider, UnboundedRecursion};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Helper: assert that `f()` panics with an UnboundedRecursion whose path
/// mentions every expected type, in order.
fn assert_recursion_panics<F>(f: F, expected_path: &[&'static str])
where
    F: FnOnce(),
{
    let res = catch_unwind(AssertUnwindSafe(f));
    let err = res.expect_err("Expected panic due to a dependency cycle");

    let recursion = err
        .downcast_ref::<UnboundedRecursion>()
        .expect("payload should be UnboundedRecursion");
    assert_eq!(recursion.path.len(), expected_path.len(), "path: {:?}", recursion.path);
    for (actual, expected) in recursion.path.iter().zip(expected_path) {
        assert!(actual.ends_with(expected), "expected {} in {:?}", expected, recursion.path);
    }
}

struct A;
struct B;
struct C;

struct TwoCycle;

impl Module for TwoCycle {
    fn provides(bindings: &mut Bindings<Self>) {
        bindings.provides::<A>("a").to_with(|_, (_,): (Arc<B>,)| A);
        bindings.provides::<B>("b").to_with(|_, (_,): (Arc<A>,)| B);
    }
}

struct ThreeCycle;

impl Module for ThreeCycle {
    fn provides(bindings: &mut Bindings<Self>) {
        bindings.provides::<A>("a").to_with(|_, (_,): (Arc<B>,)| A);
        bindings.provides::<B>("b").to_with(|_, (_,): (Arc<C>,)| B);
        bindings.provides::<C>("c").to_with(|_, (_,): (Provider<A>,)| C);
    }
}

struct SelfCycle;

impl Module for SelfCycle {
    fn provides(bindings: &mut Bindings<Self>) {
        bindings.provides::<A>("a").to_with(|_, (_,): (Arc<A>,)| A);
    }
}

#[test]
fn test_two_node_cycle() {
    let graph = ObjectGraph::builder().module(TwoCycle).build().unwrap();
    assert_recursion_panics(
        || {
            let _ = graph.get::<A>();
        },
        &["A", "B", "A"],
    );
}

#[test]
fn test_cycle_through_provider_parameter() {
    let graph = ObjectGraph::builder().module(ThreeCycle).build().unwrap();
    assert_recursion_panics(
        || {
            let _ = graph.get::<B>();
        },
        &["B", "C", "A", "B"],
    );
}

#[test]
fn test_self_cycle() {
    let graph = ObjectGraph::builder().module(SelfCycle).build().unwrap();
    assert_recursion_panics(
        || {
            let _ = graph.get::<A>();
        },
        &["A", "A"],
    );
}

#[test]
fn test_graph_usable_after_cycle_panic() {
    struct Mixed;

    impl Module for Mixed {
        fn provides(bindings: &mut Bindings<Self>) {
            bindings.provides::<A>("a").to_with(|_, (_,): (Arc<A>,)| A);
            bindings.provides::<u8>("fine").singleton().to(|_| 5);
        }
    }

    let graph = ObjectGraph::builder()
        .scope::<ferrous_graph::Singleton>()
        .module(Mixed)
        .build()
        .unwrap();

    assert!(catch_unwind(AssertUnwindSafe(|| graph.get::<A>())).is_err());

    // The resolution stack unwound and no cache was touched
    assert_eq!(graph.cached_instances(), 0);
    assert_eq!(*graph.get::<u8>().unwrap(), 5);
    assert_eq!(graph.cached_instances(), 1);
}

#[test]
fn test_diamond_is_not_a_cycle() {
    struct Diamond;

    impl Module for Diamond {
        fn provides(bindings: &mut Bindings<Self>) {
            bindings.provides::<u8>("root").to(|_| 1);
            bindings.provides::<u16>("left").to_with(|_, (r,): (Arc<u8>,)| u16::from(*r));
            bindings.provides::<u32>("right").to_with(|_, (r,): (Arc<u8>,)| u32::from(*r));
            bindings
                .provides::<u64>("top")
                .to_with(|_, (l, r): (Arc<u16>, Arc<u32>)| u64::from(*l) + u64::from(*r));
        }
    }

    let graph = ObjectGraph::builder().module(Diamond).build().unwrap();
    assert_eq!(*graph.get::<u64>().unwrap(), 2);
}
