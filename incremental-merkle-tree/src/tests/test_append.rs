use assert_matches::assert_matches;

use crate::{
    AppendMode, Error, MerkleTree,
    test_utils::{
        FailingStrategy, TestContent, TestTree, built_root, contents, h, h2, implicit_root,
    },
};

#[test]
fn test_append_on_empty_tree() {
    let mut tree = TestTree::new();
    assert_matches!(
        tree.append(TestContent::new("a")).unwrap(),
        Err(Error::EmptyTree)
    );
    assert!(tree.is_empty());
    assert_eq!(tree.append_mode(), None);
}

#[test]
fn test_append_fifth_leaf_matches_rebuild() {
    let mut tree = TestTree::build(["a", "b", "c", "d"].map(TestContent::new))
        .unwrap()
        .expect("build");
    tree.append(TestContent::new("e")).unwrap().expect("append");

    let rebuilt = TestTree::build(["a", "b", "c", "d", "e"].map(TestContent::new))
        .unwrap()
        .expect("build");
    assert_eq!(tree.merkle_root(), rebuilt.merkle_root());

    // No padding leaf is materialized.
    assert_eq!(tree.leaf_count(), 5);
    assert_eq!(rebuilt.leaf_count(), 6);
    assert_eq!(tree.height(), 3);
    assert!(tree.verify_tree().unwrap().expect("verify"));
}

#[test]
fn test_append_sixth_leaf_completes_self_pair() {
    let mut tree = TestTree::build(contents(4)).unwrap().expect("build");
    tree.append(TestContent::new("4")).unwrap().expect("append");
    tree.append(TestContent::new("5")).unwrap().expect("append");

    let left = h2(&h2(&h("0"), &h("1")), &h2(&h("2"), &h("3")));
    let ef = h2(&h("4"), &h("5"));
    assert_eq!(
        tree.merkle_root(),
        Some(h2(&left, &h2(&ef, &ef)).as_slice())
    );
}

#[test]
fn test_append_grows_leaves_by_one() {
    for start in 1..12 {
        let mut tree = TestTree::build(contents(start)).unwrap().expect("build");
        for next in start..40 {
            let before = tree.leaf_count();
            tree.append(TestContent::new(&next.to_string()))
                .unwrap()
                .expect("append");
            assert_eq!(tree.leaf_count(), before + 1);
            assert_eq!(tree.content_count(), next + 1);
            assert_eq!(
                tree.merkle_root(),
                Some(implicit_root(start, next + 1).as_slice()),
                "start: {}, contents: {}",
                start,
                next + 1
            );
        }
        assert!(tree.verify_tree().unwrap().expect("verify"));
    }
}

#[test]
fn test_append_matches_rebuild_from_even_build() {
    for start in (2..12).step_by(2) {
        let mut tree = TestTree::build(contents(start)).unwrap().expect("build");
        for next in start..40 {
            tree.append(TestContent::new(&next.to_string()))
                .unwrap()
                .expect("append");
            assert_eq!(tree.merkle_root(), Some(built_root(next + 1).as_slice()));
        }
    }
}

#[test]
fn test_append_after_built_duplicate() {
    let mut tree = TestTree::build(contents(3)).unwrap().expect("build");
    assert_eq!(tree.leaf_count(), 4);

    let ctx = tree.append(TestContent::new("3"));
    ctx.value.expect("append");
    assert_eq!(ctx.cost.content_hash_calls, 1);
    assert_eq!(ctx.cost.hash_node_calls, 3);

    assert_eq!(tree.leaf_count(), 5);
    assert_eq!(tree.content_count(), 4);
    let flags: Vec<bool> = tree.leaves().map(|leaf| leaf.duplicate).collect();
    assert_eq!(flags, vec![false, false, false, true, false]);

    let left = h2(&h2(&h("0"), &h("1")), &h2(&h("2"), &h("2")));
    let tail = h2(&h("3"), &h("3"));
    assert_eq!(
        tree.merkle_root(),
        Some(h2(&left, &h2(&tail, &tail)).as_slice())
    );
    assert!(tree.verify_tree().unwrap().expect("verify"));
}

#[test]
fn test_append_hashes_one_node_per_level() {
    let mut tree = TestTree::build(contents(1024)).unwrap().expect("build");
    let ctx = tree.append(TestContent::new("1024"));
    ctx.value.expect("append");

    assert_eq!(tree.height(), 11);
    assert_eq!(ctx.cost.content_hash_calls, 1);
    assert_eq!(ctx.cost.hash_node_calls, 11);

    for next in 1025..1100 {
        let ctx = tree.append(TestContent::new(&next.to_string()));
        ctx.value.expect("append");
        assert_eq!(ctx.cost.hash_node_calls as usize, tree.height());
    }
    assert_eq!(tree.merkle_root(), Some(built_root(1100).as_slice()));
}

#[test]
fn test_append_with_duplicate_from_empty() {
    let mut tree = TestTree::new();
    tree.append_with_duplicate(TestContent::new("a"))
        .unwrap()
        .expect("append");

    assert_eq!(tree.merkle_root(), Some(h2(&h("a"), &h("a")).as_slice()));
    assert_eq!(tree.leaf_count(), 2);
    let flags: Vec<bool> = tree.leaves().map(|leaf| leaf.duplicate).collect();
    assert_eq!(flags, vec![false, true]);
    assert_eq!(tree.append_mode(), Some(AppendMode::ExplicitDuplicate));
}

#[test]
fn test_append_with_duplicate_keeps_build_shape() {
    let mut tree = TestTree::new();
    for (i, content) in contents(70).into_iter().enumerate() {
        tree.append_with_duplicate(content).unwrap().expect("append");

        let rebuilt = TestTree::build(contents(i + 1)).unwrap().expect("build");
        assert_eq!(tree.merkle_root(), rebuilt.merkle_root(), "contents: {}", i + 1);
        assert_eq!(tree.leaf_count(), rebuilt.leaf_count());
        assert_eq!(tree.height(), rebuilt.height());
        let flags: Vec<bool> = tree.leaves().map(|leaf| leaf.duplicate).collect();
        let expected: Vec<bool> = rebuilt.leaves().map(|leaf| leaf.duplicate).collect();
        assert_eq!(flags, expected);
    }
    assert!(tree.verify_tree().unwrap().expect("verify"));
}

#[test]
fn test_append_with_duplicate_on_built_tree() {
    let mut tree = TestTree::build(contents(6)).unwrap().expect("build");
    for next in 6..20 {
        tree.append_with_duplicate(TestContent::new(&next.to_string()))
            .unwrap()
            .expect("append");
        assert_eq!(tree.merkle_root(), Some(built_root(next + 1).as_slice()));
    }
}

#[test]
fn test_append_mode_is_locked_by_first_append() {
    let mut tree = TestTree::build(contents(4)).unwrap().expect("build");
    assert_eq!(tree.append_mode(), None);

    tree.append_with_duplicate(TestContent::new("4"))
        .unwrap()
        .expect("append");
    let root = tree.merkle_root().map(<[u8]>::to_vec);

    assert_matches!(
        tree.append(TestContent::new("5")).unwrap(),
        Err(Error::AppendModeMismatch {
            locked: AppendMode::ExplicitDuplicate,
            requested: AppendMode::ImplicitDuplicate,
        })
    );
    assert_eq!(tree.merkle_root().map(<[u8]>::to_vec), root);
    assert_eq!(tree.content_count(), 5);

    // Rebuilds keep the commitment.
    tree.rebuild().unwrap().expect("rebuild");
    assert_eq!(tree.append_mode(), Some(AppendMode::ExplicitDuplicate));
}

#[test]
fn test_with_append_mode_prelocks() {
    let mut tree = TestTree::new().with_append_mode(AppendMode::ImplicitDuplicate);
    assert_matches!(
        tree.append_with_duplicate(TestContent::new("a")).unwrap(),
        Err(Error::AppendModeMismatch {
            locked: AppendMode::ImplicitDuplicate,
            requested: AppendMode::ExplicitDuplicate,
        })
    );
    assert!(tree.is_empty());
}

#[test]
fn test_failed_append_does_not_lock_or_mutate() {
    let mut tree = TestTree::build(contents(4)).unwrap().expect("build");
    let root = tree.merkle_root().map(<[u8]>::to_vec);

    assert_matches!(
        tree.append(TestContent::failing_hash("x")).unwrap(),
        Err(Error::ContentHash(_))
    );
    assert_matches!(
        tree.append_with_duplicate(TestContent::failing_hash("x"))
            .unwrap(),
        Err(Error::ContentHash(_))
    );

    assert_eq!(tree.append_mode(), None);
    assert_eq!(tree.leaf_count(), 4);
    assert_eq!(tree.merkle_root().map(<[u8]>::to_vec), root);
}

#[test]
fn test_hash_write_failure_leaves_tree_unchanged() {
    let strategy = FailingStrategy::new(usize::MAX);
    let mut tree = MerkleTree::build_with_strategy(contents(8), strategy.clone())
        .unwrap()
        .expect("build");
    let root = tree.merkle_root().map(<[u8]>::to_vec);
    let rendered = tree.to_string();

    // 8 leaves to 9 needs four node hashes; only one is allowed.
    strategy.refill(1);
    assert_matches!(
        tree.append(TestContent::new("8")).unwrap(),
        Err(Error::HashWrite(_))
    );
    strategy.refill(0);
    assert_matches!(
        tree.append_with_duplicate(TestContent::new("8")).unwrap(),
        Err(Error::HashWrite(_))
    );

    assert_eq!(tree.leaf_count(), 8);
    assert_eq!(tree.content_count(), 8);
    assert_eq!(tree.append_mode(), None);
    assert_eq!(tree.merkle_root().map(<[u8]>::to_vec), root);
    assert_eq!(tree.to_string(), rendered);

    strategy.refill(usize::MAX);
    assert!(tree.verify_tree().unwrap().expect("verify"));
    tree.append(TestContent::new("8")).unwrap().expect("append");
    assert_eq!(tree.merkle_root(), Some(built_root(9).as_slice()));
    assert!(tree.verify_tree().unwrap().expect("verify"));
}

#[test]
fn test_hash_write_failure_keeps_duplicate_slot() {
    let strategy = FailingStrategy::new(usize::MAX);
    let mut tree = MerkleTree::build_with_strategy(contents(3), strategy.clone())
        .unwrap()
        .expect("build");
    let root = tree.merkle_root().map(<[u8]>::to_vec);

    strategy.refill(1);
    assert_matches!(
        tree.append_with_duplicate(TestContent::new("3")).unwrap(),
        Err(Error::HashWrite(_))
    );

    let flags: Vec<bool> = tree.leaves().map(|leaf| leaf.duplicate).collect();
    assert_eq!(flags, vec![false, false, false, true]);
    assert_eq!(tree.merkle_root().map(<[u8]>::to_vec), root);

    strategy.refill(usize::MAX);
    assert!(tree.verify_tree().unwrap().expect("verify"));
    tree.append_with_duplicate(TestContent::new("3"))
        .unwrap()
        .expect("append");
    assert_eq!(tree.merkle_root(), Some(built_root(4).as_slice()));
}
