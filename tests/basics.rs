use ferrous_graph::{Bindings, GraphError, Injectable, Members, Module, ObjectGraph, Signature};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct IntModule {
    calls: AtomicUsize,
}

impl Module for IntModule {
    fn provides(bindings: &mut Bindings<Self>) {
        bindings.provides::<i32>("int_value").to(|m| {
            m.calls.fetch_add(1, Ordering::SeqCst);
            1
        });
    }
}

#[derive(Default)]
struct Target {
    x: Option<Arc<i32>>,
}

impl Injectable for Target {
    fn members(members: &mut Members<Self>) {
        members.field("x").inject(|t, x: Arc<i32>| t.x = Some(x));
    }
}

#[test]
fn test_inject_field_from_module() {
    let graph = ObjectGraph::builder().module(IntModule::default()).build().unwrap();

    let mut first = Target::default();
    graph.inject(&mut first).unwrap();
    assert_eq!(first.x.as_deref(), Some(&1));
}

#[test]
fn test_each_target_gets_its_own_call() {
    let graph = ObjectGraph::builder().module(IntModule::default()).build().unwrap();

    let mut first = Target::default();
    let mut second = Target::default();
    graph.inject(&mut first).unwrap();
    graph.inject(&mut second).unwrap();

    let a = first.x.unwrap();
    let b = second.x.unwrap();
    assert_eq!((*a, *b), (1, 1));
    assert!(!Arc::ptr_eq(&a, &b)); // Transient binding
}

#[test]
fn test_provider_method_with_dependencies() {
    #[derive(Debug)]
    struct Config {
        port: u16,
    }

    #[derive(Debug)]
    struct Server {
        config: Arc<Config>,
        name: String,
    }

    struct ServerModule;

    impl Module for ServerModule {
        fn provides(bindings: &mut Bindings<Self>) {
            bindings.provides::<Config>("config").to(|_| Config { port: 8080 });
            bindings
                .provides::<String>("name")
                .to(|_| "MyServer".to_string());
            bindings
                .provides::<Server>("server")
                .to_with(|_, (config, name): (Arc<Config>, Arc<String>)| Server {
                    config,
                    name: name.to_string(),
                });
        }
    }

    let graph = ObjectGraph::builder().module(ServerModule).build().unwrap();
    let server = graph.get::<Server>().unwrap();

    assert_eq!(server.config.port, 8080);
    assert_eq!(server.name, "MyServer");
}

#[test]
fn test_modules_combine() {
    struct Left;
    struct Right;

    impl Module for Left {
        fn provides(bindings: &mut Bindings<Self>) {
            bindings.provides::<u8>("left").to(|_| 1);
        }
    }

    impl Module for Right {
        fn provides(bindings: &mut Bindings<Self>) {
            bindings.provides::<u16>("right").to_with(|_, (l,): (Arc<u8>,)| u16::from(*l) + 1);
        }
    }

    let graph = ObjectGraph::builder().module(Left).module(Right).build().unwrap();
    assert_eq!(graph.len(), 2);
    assert_eq!(*graph.get::<u16>().unwrap(), 2);
}

#[test]
fn test_module_state_is_shared_by_its_methods() {
    struct Prefix {
        prefix: String,
    }

    impl Module for Prefix {
        fn provides(bindings: &mut Bindings<Self>) {
            bindings
                .provides::<String>("greeting")
                .to(|m| format!("{}, world", m.prefix));
        }
    }

    let graph = ObjectGraph::builder()
        .module(Prefix { prefix: "Hello".to_string() })
        .build()
        .unwrap();
    assert_eq!(*graph.get::<String>().unwrap(), "Hello, world");
}

#[test]
fn test_child_shadows_parent_binding() {
    struct Parent;
    struct Child;

    impl Module for Parent {
        fn provides(bindings: &mut Bindings<Self>) {
            bindings.provides::<&'static str>("name").to(|_| "parent");
            bindings.provides::<u8>("only_parent").to(|_| 3);
        }
    }

    impl Module for Child {
        fn provides(bindings: &mut Bindings<Self>) {
            bindings.provides::<&'static str>("name").to(|_| "child");
        }
    }

    let root = ObjectGraph::builder().module(Parent).build().unwrap();
    let child = root.child().module(Child).build().unwrap();

    assert_eq!(*root.get::<&'static str>().unwrap(), "parent");
    assert_eq!(*child.get::<&'static str>().unwrap(), "child");
    assert_eq!(*child.get::<u8>().unwrap(), 3); // Falls back to the parent
    assert!(child.parent().is_some());
}

#[test]
fn test_missing_binding_names_signature() {
    let graph = ObjectGraph::builder().build().unwrap();
    match graph.get::<u64>() {
        Err(GraphError::BindingNotFound { signature, .. }) => {
            assert_eq!(signature, Signature::of::<u64>());
        }
        other => panic!("expected BindingNotFound, got {:?}", other),
    }
}

#[test]
fn test_missing_field_binding_names_owner_and_member() {
    let graph = ObjectGraph::builder().build().unwrap();
    let mut target = Target::default();

    let err = graph.inject(&mut target).unwrap_err();
    match &err {
        GraphError::BindingNotFound { owner, member, signature } => {
            assert!(owner.ends_with("Target"));
            assert_eq!(*member, "x");
            assert_eq!(*signature, Signature::of::<i32>());
        }
        other => panic!("expected BindingNotFound, got {:?}", other),
    }
    assert!(err.to_string().contains("i32"));
    assert!(target.x.is_none());
}

#[test]
fn test_missing_provider_parameter_names_provider_method() {
    struct NeedsConfig;

    impl Module for NeedsConfig {
        fn provides(bindings: &mut Bindings<Self>) {
            bindings.provides::<u32>("port").to_with(|_, (base,): (Arc<u16>,)| u32::from(*base));
        }
    }

    let graph = ObjectGraph::builder().module(NeedsConfig).build().unwrap();
    match graph.get::<u32>() {
        Err(GraphError::BindingNotFound { owner, member, signature }) => {
            assert!(owner.ends_with("NeedsConfig"));
            assert_eq!(member, "port");
            assert_eq!(signature, Signature::of::<u16>());
        }
        other => panic!("expected BindingNotFound, got {:?}", other),
    }
}

#[test]
fn test_graph_clones_share_state() {
    struct Scoped;

    impl Module for Scoped {
        fn provides(bindings: &mut Bindings<Self>) {
            bindings.provides::<u8>("value").singleton().to(|_| 9);
        }
    }

    let graph = ObjectGraph::builder()
        .scope::<ferrous_graph::Singleton>()
        .module(Scoped)
        .build()
        .unwrap();
    let clone = graph.clone();

    assert!(Arc::ptr_eq(&graph.get::<u8>().unwrap(), &clone.get::<u8>().unwrap()));
    assert_eq!(clone.cached_instances(), 1);
}
