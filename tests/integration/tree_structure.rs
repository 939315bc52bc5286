//! Integration tests for tree structure: path resolution and tree edits

use docsync::error::CatalogError;
use docsync::model::{ModulePatch, NewModule};
use docsync::store::EntityStore;
use docsync::types::EntityId;

/// root -> mid -> leaf, built through the tree mutator.
fn chain(store: &EntityStore) -> (EntityId, EntityId, EntityId) {
    let root = store.create_module(NewModule::new("root", "")).unwrap();
    let mid = store
        .mutator()
        .create_sub_module(&root, NewModule::new("mid", ""))
        .unwrap();
    let leaf = store
        .mutator()
        .create_sub_module(&mid, NewModule::new("leaf", ""))
        .unwrap();
    (root, mid, leaf)
}

#[test]
fn test_three_level_chain_resolves_by_path() {
    let store = EntityStore::in_memory();
    let (root, mid, leaf) = chain(&store);

    let resolved = store.resolver().get_by_path("root/mid/leaf").unwrap().unwrap();
    assert_eq!(resolved.id, leaf);

    let root_rec = store.get_module(&root).unwrap().unwrap();
    assert_eq!(root_rec.children.len(), 1);
    assert_eq!(root_rec.children[0].id, mid);
    assert_eq!(root_rec.children[0].name, "mid");

    let mid_rec = store.get_module(&mid).unwrap().unwrap();
    assert_eq!(mid_rec.parent_module_id, Some(root));
    assert_eq!(mid_rec.children[0].id, leaf);
}

#[test]
fn test_sub_modules_stay_out_of_root_index() {
    let store = EntityStore::in_memory();
    chain(&store);

    let roots = store.list_modules(&Default::default()).unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].name, "root");
}

#[test]
fn test_extra_slashes_are_ignored() {
    let store = EntityStore::in_memory();
    let (_, _, leaf) = chain(&store);

    assert_eq!(
        store.resolver().resolve_path("/root//mid/leaf/").unwrap(),
        Some(leaf)
    );
    assert_eq!(store.resolver().resolve_path("///").unwrap(), None);
    assert_eq!(store.resolver().resolve_path("root/nope").unwrap(), None);
}

#[test]
fn test_path_of_walks_to_root() {
    let store = EntityStore::in_memory();
    let (root, mid, leaf) = chain(&store);

    let path = store.resolver().path_of(&leaf).unwrap().unwrap();
    assert_eq!(path.to_string(), "root/mid/leaf");
    assert_eq!(store.resolver().ancestors(&leaf).unwrap(), vec![mid, root]);
    assert!(store.resolver().path_of(&EntityId::new()).unwrap().is_none());
}

#[test]
fn test_move_updates_both_parents_and_path() {
    let store = EntityStore::in_memory();
    let (root, mid, leaf) = chain(&store);
    let other = store.create_module(NewModule::new("other", "")).unwrap();

    store.mutator().move_sub_module(&leaf, &other).unwrap();

    let old_parent = store.get_module(&mid).unwrap().unwrap();
    assert!(!old_parent.has_child(&leaf));
    let new_parent = store.get_module(&other).unwrap().unwrap();
    assert!(new_parent.has_child(&leaf));

    let path = store.resolver().path_of(&leaf).unwrap().unwrap();
    assert_eq!(path.to_string(), "other/leaf");
    assert_eq!(store.resolver().resolve_path("root/mid/leaf").unwrap(), None);
    assert_eq!(
        store.resolver().resolve_path("other/leaf").unwrap(),
        Some(leaf)
    );
    assert!(store.get_module(&root).unwrap().unwrap().has_child(&mid));
}

#[test]
fn test_move_carries_subtree() {
    let store = EntityStore::in_memory();
    let (_, mid, leaf) = chain(&store);
    let other = store.create_module(NewModule::new("other", "")).unwrap();

    store.mutator().move_sub_module(&mid, &other).unwrap();

    assert_eq!(
        store.resolver().resolve_path("other/mid/leaf").unwrap(),
        Some(leaf)
    );
}

#[test]
fn test_move_under_own_descendant_is_refused() {
    let store = EntityStore::in_memory();
    let (root, _, leaf) = chain(&store);

    let err = store.mutator().move_sub_module(&root, &leaf).unwrap_err();
    assert!(matches!(err, CatalogError::PreconditionFailed(_)));
    assert_eq!(
        store.resolver().resolve_path("root/mid/leaf").unwrap(),
        Some(leaf)
    );
}

#[test]
fn test_remove_keeps_record_but_breaks_path() {
    let store = EntityStore::in_memory();
    let (_, mid, leaf) = chain(&store);

    store.mutator().remove_sub_module(&mid, &leaf).unwrap();

    assert_eq!(store.resolver().get_by_path("root/mid/leaf").unwrap(), None);
    let record = store.get_module(&leaf).unwrap().unwrap();
    assert!(record.parent_module_id.is_none());

    // Not re-added to the root index; visible through the detached view.
    let roots = store.list_modules(&Default::default()).unwrap();
    assert!(roots.iter().all(|r| r.id != leaf));
    let detached = store.detached_modules().unwrap();
    assert_eq!(detached.len(), 1);
    assert_eq!(detached[0].id, leaf);
}

#[test]
fn test_remove_twice_is_precondition_failed() {
    let store = EntityStore::in_memory();
    let (_, mid, leaf) = chain(&store);

    store.mutator().remove_sub_module(&mid, &leaf).unwrap();
    let err = store.mutator().remove_sub_module(&mid, &leaf).unwrap_err();
    assert!(matches!(err, CatalogError::PreconditionFailed(_)));
}

#[test]
fn test_rename_keeps_path_resolvable() {
    let store = EntityStore::in_memory();
    let (root, mid, leaf) = chain(&store);

    store
        .update_module(
            &mid,
            ModulePatch {
                name: Some("middle".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    store
        .update_module(
            &root,
            ModulePatch {
                name: Some("top".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(
        store.resolver().resolve_path("top/middle/leaf").unwrap(),
        Some(leaf)
    );
    assert_eq!(store.resolver().resolve_path("root/mid/leaf").unwrap(), None);
}

#[test]
fn test_duplicate_sibling_names_first_match_wins() {
    let store = EntityStore::in_memory();
    let root = store.create_module(NewModule::new("root", "")).unwrap();
    let first = store
        .mutator()
        .create_sub_module(&root, NewModule::new("dup", ""))
        .unwrap();
    store
        .mutator()
        .create_sub_module(&root, NewModule::new("dup", ""))
        .unwrap();

    assert_eq!(store.resolver().resolve_path("root/dup").unwrap(), Some(first));
}

#[test]
fn test_dot_names_are_rejected_everywhere() {
    let store = EntityStore::in_memory();
    let (root, mid, _) = chain(&store);

    for name in [".", ".."] {
        assert!(matches!(
            store.create_module(NewModule::new(name, "")),
            Err(CatalogError::InvalidName { .. })
        ));
        assert!(matches!(
            store.mutator().create_sub_module(&root, NewModule::new(name, "")),
            Err(CatalogError::InvalidName { .. })
        ));
        assert!(matches!(
            store.update_module(
                &mid,
                ModulePatch {
                    name: Some(name.to_string()),
                    ..Default::default()
                }
            ),
            Err(CatalogError::InvalidName { .. })
        ));
    }
    assert_eq!(
        store.resolver().path_of(&mid).unwrap().unwrap().to_string(),
        "root/mid"
    );
}
