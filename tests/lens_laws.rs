//! Property tests for the lens laws over generated records.

use proptest::prelude::*;
use structrec::{FieldName, Lens, Path, RecordValue, Type, TypeRegistry, Value, derive_lens_path};

const LABEL_POOL: &[&str] = &[
    "a", "b", "c", "x", "y", "z", "name", "year", "month", "day", "left", "right",
];

/// The type of a generated value, before it is interned.
#[derive(Debug, Clone)]
enum Shape {
    Int,
    Double,
    Bool,
    Char,
    Str,
    Record(Vec<(FieldName, Shape)>),
}

/// A generated value, before its records are interned.
#[derive(Debug, Clone)]
enum Tree {
    Leaf(Value),
    Node(Vec<(FieldName, Tree)>),
}

fn arb_leaf_shape() -> BoxedStrategy<Shape> {
    prop_oneof![
        Just(Shape::Int),
        Just(Shape::Double),
        Just(Shape::Bool),
        Just(Shape::Char),
        Just(Shape::Str),
    ]
    .boxed()
}

fn arb_shape(depth: u32) -> BoxedStrategy<Shape> {
    if depth == 0 {
        return arb_leaf_shape();
    }
    prop_oneof![
        3 => arb_leaf_shape(),
        1 => arb_fields(depth - 1).prop_map(Shape::Record),
    ]
    .boxed()
}

/// Labelled fields with distinct names, or a tuple of two or three elements.
fn arb_fields(depth: u32) -> BoxedStrategy<Vec<(FieldName, Shape)>> {
    let labelled = prop::collection::hash_set(prop::sample::select(LABEL_POOL), 1..=4)
        .prop_flat_map(move |labels| {
            let labels: Vec<_> = labels.into_iter().map(FieldName::label).collect();
            prop::collection::vec(arb_shape(depth), labels.len())
                .prop_map(move |shapes| labels.iter().cloned().zip(shapes).collect::<Vec<_>>())
        });
    let tuple = prop::collection::vec(arb_shape(depth), 2..=3).prop_map(|shapes| {
        (1..)
            .map(FieldName::position)
            .zip(shapes)
            .collect::<Vec<_>>()
    });
    prop_oneof![3 => labelled, 1 => tuple].boxed()
}

fn arb_tree(shape: Shape) -> BoxedStrategy<Tree> {
    match shape {
        Shape::Int => any::<i64>().prop_map(|n| Tree::Leaf(Value::Int(n))).boxed(),
        Shape::Double => (-1.0e6..1.0e6f64)
            .prop_map(|x| Tree::Leaf(Value::from(x)))
            .boxed(),
        Shape::Bool => any::<bool>().prop_map(|b| Tree::Leaf(Value::Bool(b))).boxed(),
        Shape::Char => any::<char>().prop_map(|c| Tree::Leaf(Value::Char(c))).boxed(),
        Shape::Str => "[a-z ]{0,8}"
            .prop_map(|s| Tree::Leaf(Value::from(s)))
            .boxed(),
        Shape::Record(fields) => fields
            .into_iter()
            .map(|(name, shape)| arb_tree(shape).prop_map(move |tree| (name.clone(), tree)))
            .collect::<Vec<_>>()
            .prop_map(Tree::Node)
            .boxed(),
    }
}

/// Three values of one record type and a pick among its paths.
fn arb_case() -> BoxedStrategy<(Tree, Tree, Tree, prop::sample::Index)> {
    arb_fields(2)
        .prop_flat_map(|fields| {
            let shape = Shape::Record(fields);
            (
                arb_tree(shape.clone()),
                arb_tree(shape.clone()),
                arb_tree(shape),
                any::<prop::sample::Index>(),
            )
        })
        .boxed()
}

fn build(registry: &TypeRegistry, tree: Tree) -> Value {
    match tree {
        Tree::Leaf(value) => value,
        Tree::Node(fields) => {
            let fields = fields
                .into_iter()
                .map(|(name, tree)| (name, build(registry, tree)));
            match RecordValue::from_fields(registry, fields) {
                Ok(record) => Value::Record(record),
                Err(err) => panic!("generated a duplicate field: {err}"),
            }
        }
    }
}

/// Every path into `ty`, including the empty one.
fn paths(ty: &Type) -> Vec<Path> {
    let mut out = vec![Path::default()];
    if let Some(record) = ty.as_record() {
        for field in record.fields() {
            let head = Path::new(vec![field.name.clone()]);
            out.extend(paths(&field.value).iter().map(|rest| head.join(rest)));
        }
    }
    out
}

fn lens_for(ty: &Type, path: &Path) -> Lens {
    derive_lens_path(ty, path).unwrap_or_else(|err| panic!("{err}"))
}

proptest! {
    #[test]
    fn get_after_set((s, b, _c, pick) in arb_case()) {
        let registry = TypeRegistry::new();
        let (s, b) = (build(&registry, s), build(&registry, b));
        let ty = s.type_of();
        let lens = lens_for(&ty, pick.get(&paths(&ty)));
        let a = lens.get(&b).unwrap().clone();
        let updated = lens.set(&s, a.clone()).unwrap();
        prop_assert_eq!(lens.get(&updated).unwrap(), &a);
    }

    #[test]
    fn set_what_you_get((s, _b, _c, pick) in arb_case()) {
        let registry = TypeRegistry::new();
        let s = build(&registry, s);
        let ty = s.type_of();
        let lens = lens_for(&ty, pick.get(&paths(&ty)));
        let current = lens.get(&s).unwrap().clone();
        prop_assert_eq!(lens.set(&s, current).unwrap(), s);
    }

    #[test]
    fn set_twice((s, b, c, pick) in arb_case()) {
        let registry = TypeRegistry::new();
        let (s, b, c) = (build(&registry, s), build(&registry, b), build(&registry, c));
        let ty = s.type_of();
        let lens = lens_for(&ty, pick.get(&paths(&ty)));
        let a = lens.get(&b).unwrap().clone();
        let a2 = lens.get(&c).unwrap().clone();
        let twice = lens.set(&lens.set(&s, a).unwrap(), a2.clone()).unwrap();
        prop_assert_eq!(twice, lens.set(&s, a2).unwrap());
    }

    #[test]
    fn set_leaves_other_paths_alone((s, b, _c, pick) in arb_case()) {
        let registry = TypeRegistry::new();
        let (s, b) = (build(&registry, s), build(&registry, b));
        let ty = s.type_of();
        let all = paths(&ty);
        let target = pick.get(&all);
        let lens = lens_for(&ty, target);
        let updated = lens.set(&s, lens.get(&b).unwrap().clone()).unwrap();
        for other in &all {
            let disjoint = !other.segments().starts_with(target.segments())
                && !target.segments().starts_with(other.segments());
            if disjoint {
                let other = lens_for(&ty, other);
                prop_assert_eq!(other.get(&updated).unwrap(), other.get(&s).unwrap());
            }
        }
    }

    #[test]
    fn compose_is_associative((s, b, _c, pick) in arb_case(), i in any::<prop::sample::Index>(), j in any::<prop::sample::Index>()) {
        let registry = TypeRegistry::new();
        let (s, b) = (build(&registry, s), build(&registry, b));
        let ty = s.type_of();
        let segments = pick.get(&paths(&ty)).segments().to_vec();
        let (mut i, mut j) = (i.index(segments.len() + 1), j.index(segments.len() + 1));
        if i > j {
            std::mem::swap(&mut i, &mut j);
        }

        let outer = lens_for(&ty, &Path::new(segments[..i].to_vec()));
        let middle = lens_for(outer.target(), &Path::new(segments[i..j].to_vec()));
        let inner = lens_for(middle.target(), &Path::new(segments[j..].to_vec()));
        let left = outer.compose(&middle).unwrap().compose(&inner).unwrap();
        let right = outer.compose(&middle.compose(&inner).unwrap()).unwrap();
        let direct = lens_for(&ty, &Path::new(segments));
        prop_assert_eq!(&left, &right);
        prop_assert_eq!(&left, &direct);

        let a = direct.get(&b).unwrap().clone();
        prop_assert_eq!(left.get(&s).unwrap(), right.get(&s).unwrap());
        prop_assert_eq!(left.set(&s, a.clone()).unwrap(), right.set(&s, a).unwrap());
    }

    #[test]
    fn field_order_does_not_change_the_type((s, _b, _c, _pick) in arb_case()) {
        let registry = TypeRegistry::new();
        let reversed = match s.clone() {
            Tree::Node(mut fields) => {
                fields.reverse();
                Tree::Node(fields)
            }
            leaf => leaf,
        };
        let (s, reversed) = (build(&registry, s), build(&registry, reversed));
        prop_assert_eq!(s.type_of(), reversed.type_of());
        prop_assert_eq!(s, reversed);
    }
}
