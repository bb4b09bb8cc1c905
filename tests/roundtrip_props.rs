use proptest::prelude::*;
use savegroup::{DataGroup, Literal, Node, ScalarKind, ScalarList, ScalarMap, ScalarValue, TypedValue, parse, print};
use std::collections::BTreeMap;

fn text() -> impl Strategy<Value = String> {
    // Includes every character the parser treats specially.
    "[a-z0-9 ,:\\[\\]{}\"\\\\/\n\t\u{1}\u{1f}-]{0,12}"
}

fn literal() -> impl Strategy<Value = Literal> {
    prop_oneof![
        any::<bool>().prop_map(Literal::Bool),
        (-1.0e9f64..1.0e9).prop_map(Literal::Number),
        any::<i32>().prop_map(|n| Literal::Number(f64::from(n))),
        text().prop_map(Literal::Str),
    ]
}

fn node() -> impl Strategy<Value = Node> {
    let leaf = literal().prop_map(Node::Scalar);
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Node::Array),
            prop::collection::btree_map(text(), inner, 0..6).prop_map(Node::Object),
        ]
    })
}

fn scalar(kind: ScalarKind) -> BoxedStrategy<ScalarValue> {
    match kind {
        ScalarKind::Int => any::<i32>().prop_map(ScalarValue::Int).boxed(),
        ScalarKind::Float => (-1.0e6f64..1.0e6).prop_map(ScalarValue::Float).boxed(),
        ScalarKind::Bool => any::<bool>().prop_map(ScalarValue::Bool).boxed(),
        ScalarKind::String => text().prop_map(ScalarValue::String).boxed(),
    }
}

fn kind() -> impl Strategy<Value = ScalarKind> {
    prop::sample::select(ScalarKind::ALL.to_vec())
}

fn typed() -> BoxedStrategy<TypedValue> {
    prop_oneof![
        kind().prop_flat_map(scalar).prop_map(TypedValue::Scalar),
        kind().prop_flat_map(|k| {
            prop::collection::vec(scalar(k), 0..6).prop_map(move |items| {
                TypedValue::List(ScalarList::new(k, items).expect("items share the list kind"))
            })
        }),
        (kind(), kind()).prop_flat_map(|(k, v)| {
            prop::collection::vec((scalar(k), scalar(v)), 0..6).prop_map(move |pairs| {
                TypedValue::Map(ScalarMap::new(k, v, pairs).expect("pairs share the map kinds"))
            })
        }),
    ]
    .boxed()
}

fn group() -> impl Strategy<Value = DataGroup> {
    let leaves = prop::collection::btree_map("l[a-z]{0,4}", typed(), 0..4).boxed();
    let flat = leaves.clone().prop_map(|leaves| build(leaves, BTreeMap::new()));
    flat.prop_recursive(3, 24, 3, move |inner| {
        (
            leaves.clone(),
            prop::collection::btree_map("g[a-z]{0,4}", inner, 0..3),
        )
            .prop_map(|(leaves, groups)| build(leaves, groups))
    })
}

// Leaf names start with `l` and group names with `g`, so they never clash.
fn build(leaves: BTreeMap<String, TypedValue>, groups: BTreeMap<String, DataGroup>) -> DataGroup {
    let mut group = DataGroup::new();
    for (name, value) in leaves {
        group.set(&name, value).expect("leaf names are free");
    }
    for (name, child) in groups {
        group.insert_child(&name, child).expect("group names are free");
    }
    group
}

proptest! {
    #[test]
    fn printed_tree_parses_back(node in node(), pretty in any::<bool>()) {
        let text = print(&node, pretty);
        prop_assert_eq!(parse(&text).expect("printer output parses"), node);
    }

    #[test]
    fn compact_and_pretty_agree(node in node()) {
        let compact = parse(&print(&node, false)).expect("compact parses");
        let pretty = parse(&print(&node, true)).expect("pretty parses");
        prop_assert_eq!(compact, pretty);
    }

    #[test]
    fn typed_value_survives_encoding(value in typed()) {
        let text = print(&value.encode(), false);
        let decoded = TypedValue::decode(&parse(&text).expect("encoded value parses"))
            .expect("encoded value decodes");
        prop_assert_eq!(decoded, value);
    }

    #[test]
    fn group_survives_text(group in group()) {
        let text = print(&group.to_node(), true);
        let mut loaded = DataGroup::new();
        loaded.from_node(&parse(&text).expect("group text parses")).expect("group decodes");
        prop_assert_eq!(loaded.digest(), group.digest());
        prop_assert_eq!(loaded, group);
    }
}
