//! Integration Tests for the Dependency Graph
//!
//! These tests verify that nodes, handles and combinators work together
//! correctly through the public API.

use std::cell::Cell;
use std::rc::Rc;

use trellis_core::{combine, filter, fold, map, mirror, when, AnyNode, GraphError, Node};

/// Test that a combinator node equals the combination of its inputs.
#[test]
fn combined_node_matches_inputs() {
    let a = Node::new(3);
    let b = Node::new(4);
    let c = combine(&a, &b, |x, y| x * 10 + y);

    assert_eq!(c.read().unwrap(), 34);

    // No re-registration is needed after a write.
    a.write(7).unwrap();
    assert_eq!(c.read().unwrap(), 74);
}

/// Test the integer fold scenario end to end.
#[test]
fn fold_sum_follows_every_source() {
    let a = Node::new(10);
    let b = Node::new(20);
    let c = Node::new(30);
    let s = fold(&[a.clone(), b.clone(), c.clone()], 0, |acc, x| acc + x);

    assert_eq!(s.read().unwrap(), 60);

    a.write(100).unwrap();
    assert_eq!(s.read().unwrap(), 150);

    b.write(5).unwrap();
    assert_eq!(s.read().unwrap(), 135);
}

/// Test that folding nothing yields the initial value and wires nothing.
#[test]
fn empty_fold_is_initial_value() {
    let s = fold::<i32, i32, i32, _>(&[], 42, |acc, x| acc + x);

    assert_eq!(s.read().unwrap(), 42);
    assert_eq!(s.influencer_count(), 0);
    assert_eq!(s.derived_count(), 0);
}

/// Test that a non-commutative fold respects source order.
#[test]
fn fold_respects_source_order() {
    let words: Vec<Node<String>> = ["Hello", " ", "World"]
        .into_iter()
        .map(|w| Node::new(w.to_string()))
        .collect();
    let sentence = fold(&words, String::new(), |acc, w| acc + &w);

    assert_eq!(sentence.read().unwrap(), "Hello World");

    words[2].write("Trellis".to_string()).unwrap();
    assert_eq!(sentence.read().unwrap(), "Hello Trellis");
}

/// Test the string concatenation scenario with operator sugar.
#[test]
fn string_sum_scenario() {
    let p = Node::new("Hello ".to_string());
    let q = Node::new("World ".to_string());
    let r = Node::new("!".to_string());
    let z = &p + &q + &r;

    assert_eq!(z.read().unwrap(), "Hello World !");

    q.write("China ".to_string()).unwrap();
    assert_eq!(z.read().unwrap(), "Hello China !");
}

/// Test map followed by filter, re-evaluated on every source write.
#[test]
fn map_then_filter_scenario() {
    let value = Node::new(15);
    let fallback = Node::new(0);
    let filtered = filter(&map(&value, |x| x - 10), &fallback, |x| *x > 0);

    assert_eq!(filtered.read().unwrap(), 5);

    // 5 - 10 = -5 fails the predicate
    value.write(5).unwrap();
    assert_eq!(filtered.read().unwrap(), 0);

    value.write(40).unwrap();
    assert_eq!(filtered.read().unwrap(), 30);
}

/// Test that `when` follows its condition without being rebuilt.
#[test]
fn when_tracks_condition() {
    let cond = Node::new(false);
    let t = Node::new("yes".to_string());
    let f = Node::new("no".to_string());
    let picked = when(&cond, &t, &f);

    assert_eq!(picked.read().unwrap(), "no");

    cond.write(true).unwrap();
    assert_eq!(picked.read().unwrap(), "yes");

    cond.write(false).unwrap();
    assert_eq!(picked.read().unwrap(), "no");
}

/// Test a comparison feeding a conditional select.
#[test]
fn comparison_drives_when() {
    let price = Node::new(80);
    let budget = Node::new(100);
    let affordable = price.less_eq(&budget);
    let buy = Node::new(1);
    let skip = Node::new(0);
    let decision = when(&affordable, &buy, &skip);

    assert_eq!(decision.read().unwrap(), 1);

    price.write(120).unwrap();
    assert_eq!(decision.read().unwrap(), 0);
}

/// Test multi-level chains where intermediate nodes are shared.
#[test]
fn shared_intermediate_nodes() {
    let a = Node::new(10);
    let five = Node::new(5);
    let two = Node::new(2);
    let ten = Node::new(10);

    let b = &a + &five;
    let c = &b * &two;
    let d = &c + &ten;

    assert_eq!(c.read().unwrap(), 30);
    assert_eq!(d.read().unwrap(), 40);
    assert_eq!(a.derived_count(), 1);
    assert_eq!(b.derived_count(), 1);
    assert_eq!(d.derived_count(), 0);

    a.write(20).unwrap();
    assert_eq!(b.read().unwrap(), 25);
    assert_eq!(c.read().unwrap(), 50);
    assert_eq!(d.read().unwrap(), 60);
}

/// Test several derived nodes hanging off the same sources.
#[test]
fn siblings_from_same_sources() {
    let x = Node::new(10);
    let y = Node::new(5);

    let sum = &x + &y;
    let product = &x * &y;
    let custom = combine(&x, &y, |a, b| a - b);

    x.write(20).unwrap();
    assert_eq!(sum.read().unwrap(), 25);
    assert_eq!(product.read().unwrap(), 100);
    assert_eq!(custom.read().unwrap(), 15);
    assert_eq!(x.derived_count(), 3);
}

/// Test that a read transform on a source is seen by derived nodes.
#[test]
fn source_read_transform_feeds_derivation() {
    let a = Node::new(5);
    let b = Node::new(10);
    a.attach_read_transform(|v: &i32| v * 2);
    let sum = &a + &b;

    assert_eq!(sum.read().unwrap(), 20);

    a.write(20).unwrap();
    assert_eq!(sum.read().unwrap(), 50);
}

/// Test recovery of nodes stored in a heterogeneous collection.
#[test]
fn heterogeneous_collection_recovery() {
    let count = Node::new(3);
    let label = Node::new("three".to_string());
    let ratio = Node::<i32, f64>::with_raw(150);
    ratio.attach_read_transform(|v: &i32| f64::from(*v) / 100.0);

    let handles: Vec<AnyNode> = vec![count.handle(), label.handle(), ratio.handle()];

    assert_eq!(handles[0].recover::<i32>().unwrap().read().unwrap(), 3);
    assert_eq!(handles[1].recover::<String>().unwrap().read().unwrap(), "three");
    assert_eq!(handles[2].recover_as::<i32, f64>().unwrap().read().unwrap(), 1.5);

    let err = handles[1].recover::<i32>().unwrap_err();
    assert!(matches!(err, GraphError::TypeMismatch { .. }));
    assert!(handles[2].recover::<f64>().is_err());
    assert!(handles[0].try_recover::<i32, f64>().is_none());
}

/// Test that a write skips influencers of a different type.
#[test]
fn mixed_influencers_are_skipped() {
    let number = Node::new(10);
    let text = Node::new("Hello".to_string());
    let copy = mirror(&number);
    number.add_influencer(&text.handle());

    number.write(20).unwrap();

    assert_eq!(number.read().unwrap(), 20);
    assert_eq!(copy.read().unwrap(), 20);
    assert_eq!(text.read().unwrap(), "Hello");
}

/// Test heterogeneous nodes with transforms on both sides.
#[test]
fn heterogeneous_transforms() {
    let words = Node::<Vec<String>, String>::with_raw(vec![
        "Hello".to_string(),
        "World".to_string(),
        "!".to_string(),
    ]);
    words.hook(
        |v: &Vec<String>| v.join(" "),
        |s: &String| s.split_whitespace().map(str::to_string).collect(),
    );

    assert_eq!(words.read().unwrap(), "Hello World !");

    words.write("Good   Morning".to_string()).unwrap();
    assert_eq!(words.raw(), vec!["Good".to_string(), "Morning".to_string()]);
    assert_eq!(words.read().unwrap(), "Good Morning");
}

/// Test the conversion error for nodes without transforms.
#[test]
fn missing_transform_is_a_conversion_error() {
    let node = Node::<Vec<i32>, i32>::with_raw(vec![1, 2, 3]);
    assert!(node.read().unwrap_err().is_conversion());
    assert!(node.write(4).unwrap_err().is_conversion());

    // Scalar pairs convert directly.
    let scalar = Node::<i32, f64>::with_raw(42);
    assert_eq!(scalar.read().unwrap(), 42.0);
    scalar.write(3.9).unwrap();
    assert_eq!(scalar.raw(), 3);
}

/// Test that an error in a derivation reaches the reader.
#[test]
fn derivation_errors_surface_on_read() {
    let opaque = Node::<Vec<i32>, i32>::with_raw(vec![1]);
    let doubled = map(&opaque, |x| x * 2);

    assert!(doubled.read().unwrap_err().is_conversion());

    opaque.attach_read_transform(|v: &Vec<i32>| v.iter().sum());
    assert_eq!(doubled.read().unwrap(), 2);
}

/// Test that every write runs the write transform exactly once per node.
#[test]
fn write_transform_runs_once_per_write() {
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();

    let node = Node::new(0);
    node.attach_write_transform(move |v: &i32| {
        counter.set(counter.get() + 1);
        *v
    });

    node.write(1).unwrap();
    node.write(2).unwrap();
    assert_eq!(calls.get(), 2);
    assert_eq!(node.read().unwrap(), 2);
}

/// Test a deep chain of maps.
#[test]
fn deep_map_chain() {
    let value = Node::new(0);
    let mut current = value.clone();
    for _ in 0..100 {
        current = current.map(|x| x + 1);
    }

    assert_eq!(current.read().unwrap(), 100);

    value.write(1).unwrap();
    assert_eq!(current.read().unwrap(), 101);
}

/// Test a fold over many sources.
#[test]
fn wide_fold() {
    let nodes: Vec<Node<i32>> = (0..1000).map(|_| Node::new(1)).collect();
    let sum = fold(&nodes, 0, |acc, x| acc + x);

    assert_eq!(sum.read().unwrap(), 1000);

    nodes[500].write(11).unwrap();
    assert_eq!(sum.read().unwrap(), 1010);
}
