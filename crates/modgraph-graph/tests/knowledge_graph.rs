use modgraph_core::{AccessType, AnnotationUse, ClassRecord, EndpointRecord, FieldRecord, MethodRecord};
use modgraph_graph::{
    EdgeKind, GraphSummarizer, KnowledgeGraph, SharedGraph, Snapshot,
};
use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use std::thread;

#[test]
fn service_with_field_read() {
    let mut graph = KnowledgeGraph::new();
    graph.add_class(
        ClassRecord::new("Foo", "com.x", "Foo.java").with_annotation(AnnotationUse::new("Service")),
    );
    let bar = graph.add_method(
        MethodRecord::new("bar", "com.x.Foo").with_annotation(AnnotationUse::new("Autowired")),
    );
    let baz = graph.add_field(FieldRecord::new("baz", "com.x.Foo", "int"));
    assert!(graph.add_field_access(&bar, &baz, AccessType::Read));

    let stats = graph.stats();
    assert_eq!(stats.classes, 1);
    assert_eq!(stats.methods, 1);
    assert_eq!(stats.fields, 1);
    assert_eq!(stats.endpoints, 0);

    assert_eq!(
        graph.methods_accessing_field("com.x.Foo.baz", Some(AccessType::Read)),
        vec!["method:com.x.Foo.bar".to_string()]
    );

    let signature = GraphSummarizer::default().summarize(&graph);
    assert_eq!(signature.annotation_counts.len(), 2);
    assert_eq!(signature.annotation_count("Service"), 1);
    assert_eq!(signature.annotation_count("Autowired"), 1);

    let json = serde_json::to_value(&signature).unwrap();
    assert_eq!(json["annotation_counts"], serde_json::json!({"Service": 1, "Autowired": 1}));
}

#[test]
fn endpoint_handled_by_existing_method() {
    let mut graph = KnowledgeGraph::new();
    graph.add_class(ClassRecord::new("UserController", "com.x", "UserController.java"));
    let handler = graph.add_method(MethodRecord::new("getUsers", "com.x.UserController"));
    let endpoint = graph.add_endpoint(EndpointRecord::new(
        "GET",
        "/api/users",
        "com.x.UserController",
        "getUsers",
    ));

    assert!(graph.has_edge(&endpoint, &handler, EdgeKind::Handles));
    assert!(graph.entry_points().contains(&endpoint.as_str()));
    assert!(graph.forward_trace(&endpoint, 5).contains(&handler));
}

#[test]
fn write_access_is_not_a_read() {
    let mut graph = KnowledgeGraph::new();
    graph.add_class(ClassRecord::new("Foo", "com.x", "Foo.java"));
    let methods: Vec<String> = ["a", "b", "c"]
        .iter()
        .map(|m| graph.add_method(MethodRecord::new(*m, "com.x.Foo")))
        .collect();
    let field = graph.add_field(FieldRecord::new("state", "com.x.Foo", "int"));

    for method in &methods {
        graph.add_field_access(method, &field, AccessType::Write);
    }
    graph.add_field_access(&methods[1], &field, AccessType::Read);

    let writers = graph.methods_accessing_field(&field, Some(AccessType::Write));
    let readers = graph.methods_accessing_field(&field, Some(AccessType::Read));
    assert_eq!(writers, methods);
    assert_eq!(readers, vec![methods[1].clone()]);
}

#[test]
fn backfill_after_out_of_order_ingestion() {
    let mut graph = KnowledgeGraph::new();
    let endpoint = graph.add_endpoint(EndpointRecord::new("POST", "/orders", "com.x.Orders", "create"));
    let method = graph.add_method(MethodRecord::new("create", "com.x.Orders"));
    let class = graph.add_class(ClassRecord::new("Orders", "com.x", "Orders.java"));

    assert!(!graph.has_edge(&class, &method, EdgeKind::Declares));
    assert!(!graph.has_edge(&endpoint, &method, EdgeKind::Handles));
    assert_eq!(graph.forward_trace(&endpoint, 3).len(), 1);

    let report = graph.reconcile();
    assert_eq!(report.resolved, 2);
    assert_eq!(report.unresolved, 0);
    assert!(graph.has_edge(&class, &method, EdgeKind::Declares));
    assert!(graph.has_edge(&endpoint, &method, EdgeKind::Handles));

    // A second pass has nothing left to do.
    assert_eq!(graph.reconcile().resolved, 0);
}

#[test]
fn thousand_annotations_stay_bounded() {
    let mut graph = KnowledgeGraph::new();
    let mut class = ClassRecord::new("Big", "com.x", "Big.java");
    for i in 0..1000 {
        class = class.with_annotation(AnnotationUse::new(format!("Ann{}", i)));
    }
    graph.add_class(class);
    for i in 0..50 {
        graph.add_endpoint(EndpointRecord::new("GET", format!("/p/{}", i), "com.x.Big", "h"));
    }

    let signature = GraphSummarizer::default().summarize(&graph);
    assert_eq!(signature.annotation_counts.len(), 20);
    assert_eq!(signature.annotation_counts[0].name, "Ann0");
    assert_eq!(signature.endpoints.sample_paths.len(), 5);
    assert_eq!(signature.endpoints.total, 50);
    assert!(signature.representative_classes.len() <= 10);
}

#[test]
fn backtrack_paths_are_unique_and_anchored() {
    // Two endpoints reaching a shared repository method through a mesh of
    // calls, with a cycle and parallel edges mixed in.
    let mut graph = KnowledgeGraph::new();
    graph.add_class(ClassRecord::new("Svc", "com.x", "Svc.java"));
    let names = ["list", "create", "load", "check", "save"];
    let ids: Vec<String> = names
        .iter()
        .map(|n| graph.add_method(MethodRecord::new(*n, "com.x.Svc")))
        .collect();
    let (list, create, load, check, save) = (&ids[0], &ids[1], &ids[2], &ids[3], &ids[4]);

    graph.add_method_call(list, load);
    graph.add_method_call(create, check);
    graph.add_method_call(create, load);
    graph.add_method_call(check, load);
    graph.add_method_call(load, save);
    graph.add_method_call(load, save);
    graph.add_method_call(save, check);

    graph.add_endpoint(EndpointRecord::new("GET", "/items", "com.x.Svc", "list"));
    graph.add_endpoint(EndpointRecord::new("POST", "/items", "com.x.Svc", "create"));

    let entry_points: HashSet<&str> = graph.entry_points().into_iter().collect();
    let paths = graph.backtrack_to_entry_points(save, 6);

    assert!(!paths.is_empty());
    let distinct: HashSet<&Vec<String>> = paths.iter().collect();
    assert_eq!(distinct.len(), paths.len());
    for path in &paths {
        assert!(entry_points.contains(path[0].as_str()));
        assert_eq!(path.last(), Some(save));
        let nodes: HashSet<&String> = path.iter().collect();
        assert_eq!(nodes.len(), path.len());
        assert!(path.len() - 1 <= 6);
    }
    // GET /items -> list -> load -> save
    // POST /items -> create -> load -> save
    // POST /items -> create -> check -> load -> save
    assert_eq!(paths.len(), 3);
}

#[test]
fn snapshot_json_round_trip() {
    let mut graph = KnowledgeGraph::new();
    graph.add_class(ClassRecord::new("Foo", "com.x", "Foo.java"));
    graph.add_method(MethodRecord::new("bar", "com.x.Foo"));
    graph.add_endpoint(EndpointRecord::new("GET", "/foo", "com.x.Foo", "bar"));

    let text = serde_json::to_string(&graph.snapshot()).unwrap();
    let snapshot: Snapshot = serde_json::from_str(&text).unwrap();
    let restored = KnowledgeGraph::from_snapshot(snapshot);

    assert_eq!(restored.stats(), graph.stats());
    assert_eq!(restored.entry_points(), vec!["endpoint:GET:/foo"]);
}

#[test]
fn concurrent_readers_after_ingestion() {
    let mut graph = KnowledgeGraph::new();
    graph.add_class(ClassRecord::new("Foo", "com.x", "Foo.java"));
    let a = graph.add_method(MethodRecord::new("a", "com.x.Foo"));
    let b = graph.add_method(MethodRecord::new("b", "com.x.Foo"));
    graph.add_method_call(&a, &b);

    let shared: SharedGraph = Arc::new(RwLock::new(graph));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let shared = Arc::clone(&shared);
            let a = a.clone();
            thread::spawn(move || {
                let graph = shared.read().unwrap();
                graph.forward_trace(&a, 3).len()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 2);
    }

    shared.write().unwrap().set_classification("com.x.Foo", "spring-mvc");
    assert_eq!(
        shared.read().unwrap().get_class("com.x.Foo").map(|c| c.classification.clone()),
        Some("spring-mvc".to_string())
    );
}
