pub mod fixtures;

use fixtures::{clock, value_key};
use proptest::prelude::*;
use secman_store::{Collection, SecretOptions, Secret, SequentialIds};
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
enum Op {
    Add(u8),
    RemoveByName(u8),
    RemoveAt(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<u8>().prop_map(|n| Op::Add(n % 16)),
        any::<u8>().prop_map(|n| Op::RemoveByName(n % 16)),
        any::<usize>().prop_map(Op::RemoveAt),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn indexes_track_a_model_set(ops in proptest::collection::vec(op(), 0..40)) {
        let clock = clock();
        let ids = SequentialIds::new();
        let key = value_key();
        let mut collection = Collection::new("p", clock.clone());
        let mut model: Vec<String> = Vec::new();

        for op in ops {
            match op {
                Op::Add(n) => {
                    let name = format!("s{n}");
                    let secret = Secret::new(&name, b"v", key.value(), SecretOptions::default(), &*clock, &ids).unwrap();
                    let added = collection.add(secret).is_ok();
                    prop_assert_eq!(added, !model.contains(&name));
                    if added {
                        model.push(name);
                    }
                },
                Op::RemoveByName(n) => {
                    let name = format!("s{n}");
                    let removed = collection.remove_by_name(&name).is_ok();
                    prop_assert_eq!(removed, model.contains(&name));
                    model.retain(|m| m != &name);
                },
                Op::RemoveAt(i) => {
                    if model.is_empty() {
                        continue;
                    }
                    let position = i % model.len();
                    let id = collection.list()[position].id().to_owned();
                    prop_assert!(collection.remove_by_id(&id).is_ok());
                    model.remove(position);
                },
            }

            let names: Vec<&str> = collection.list().iter().map(Secret::name).collect();
            prop_assert_eq!(&names, &model.iter().map(String::as_str).collect::<Vec<_>>());
            for (position, secret) in collection.list().iter().enumerate() {
                prop_assert_eq!(collection.get_by_id(secret.id()), Some(secret));
                prop_assert_eq!(
                    collection.get_by_name(secret.name()).map(Secret::id),
                    Some(collection.list()[position].id())
                );
            }
            let unique: BTreeSet<&str> = collection.list().iter().map(Secret::id).collect();
            prop_assert_eq!(unique.len(), collection.len());
        }

        let decoded = Collection::decode(&collection.encode().unwrap(), clock.clone()).unwrap();
        prop_assert_eq!(decoded, collection);
    }
}
