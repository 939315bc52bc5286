//! Property tests: paths and ids stay in agreement over random trees

use docsync::model::NewModule;
use docsync::render::layout::{module_doc, relative_link};
use docsync::store::EntityStore;
use docsync::tree::ModulePath;
use docsync::types::EntityId;
use proptest::prelude::*;

/// Each entry picks a parent among the modules created so far (None = new root).
fn tree_shape() -> impl Strategy<Value = Vec<Option<prop::sample::Index>>> {
    prop::collection::vec(prop::option::weighted(0.8, any::<prop::sample::Index>()), 1..40)
}

/// Build a tree with unique names so every path is unambiguous.
fn build(store: &EntityStore, shape: &[Option<prop::sample::Index>]) -> Vec<EntityId> {
    let mut ids = Vec::with_capacity(shape.len());
    for (n, parent) in shape.iter().enumerate() {
        let data = NewModule::new(format!("m{}", n), "");
        let id = match parent {
            Some(index) if !ids.is_empty() => {
                let parent_id = ids[index.index(ids.len())];
                store.mutator().create_sub_module(&parent_id, data).unwrap()
            }
            _ => store.create_module(data).unwrap(),
        };
        ids.push(id);
    }
    ids
}

proptest! {
    #[test]
    fn resolve_inverts_path_of(shape in tree_shape()) {
        let store = EntityStore::in_memory();
        let ids = build(&store, &shape);

        for id in &ids {
            let path = store.resolver().path_of(id).unwrap().unwrap();
            prop_assert_eq!(store.resolver().resolve(&path).unwrap(), Some(*id));
        }
    }

    #[test]
    fn moves_keep_paths_consistent(
        shape in tree_shape(),
        moves in prop::collection::vec((any::<prop::sample::Index>(), any::<prop::sample::Index>()), 0..10),
    ) {
        let store = EntityStore::in_memory();
        let ids = build(&store, &shape);

        for (child, parent) in moves {
            let child = ids[child.index(ids.len())];
            let parent = ids[parent.index(ids.len())];
            // Refused moves (cycles, detached roots) must leave the tree intact.
            let _ = store.mutator().move_sub_module(&child, &parent);
        }

        for id in &ids {
            let module = store.get_module(id).unwrap().unwrap();
            if let Some(parent_id) = module.parent_module_id {
                let parent = store.get_module(&parent_id).unwrap().unwrap();
                prop_assert!(parent.has_child(id));
                let path = store.resolver().path_of(id).unwrap().unwrap();
                prop_assert_eq!(store.resolver().resolve(&path).unwrap(), Some(*id));
            }
            for child in &module.children {
                let child_rec = store.get_module(&child.id).unwrap().unwrap();
                prop_assert_eq!(child_rec.parent_module_id, Some(*id));
            }
        }
    }

    #[test]
    fn relative_links_climb_to_docs_root(
        from in prop::collection::vec("[a-z]{1,6}", 1..6),
        to in prop::collection::vec("[a-z]{1,6}", 1..6),
    ) {
        let from = module_doc(&ModulePath::from_segments(from).unwrap());
        let to = module_doc(&ModulePath::from_segments(to).unwrap());
        let link = relative_link(&from, &to);

        // Resolve the link against the source directory by hand.
        let mut parts: Vec<&str> = from.split('/').collect();
        parts.pop();
        for segment in link.split('/') {
            if segment == ".." {
                prop_assert!(parts.pop().is_some());
            } else {
                parts.push(segment);
            }
        }
        prop_assert_eq!(parts.join("/"), to);
    }
}
