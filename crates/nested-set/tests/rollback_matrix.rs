mod common;

use common::layout;
use nested_set::{Forest, ForestError, MemoryStore, Node, Placement, StoreError};

fn sample() -> (Forest<MemoryStore>, Node, Node, Node) {
    let mut forest = Forest::new(MemoryStore::new());
    let r = forest.create("R").unwrap();
    let a = forest.create_at("A", Placement::LastChildOf(r.id)).unwrap();
    let c = forest.create_at("C", Placement::LastChildOf(a.id)).unwrap();
    forest.create_at("B", Placement::LastChildOf(r.id)).unwrap();
    let r = forest.get(r.id).unwrap();
    let a = forest.get(a.id).unwrap();
    (forest, r, a, c)
}

#[test]
fn failed_move_leaves_table_untouched() {
    // Moving C under R issues six shifts, a depth fix-up and a parent write.
    for writes_before_failure in 0..8 {
        let (mut forest, r, _, mut c) = sample();
        let before = layout(&forest);
        forest.store_mut().inject_failure(writes_before_failure);

        let err = forest
            .move_to(&mut c, Placement::LastChildOf(r.id))
            .unwrap_err();
        assert!(
            matches!(err, ForestError::Store(StoreError::Injected(_))),
            "after {writes_before_failure} writes: {err}"
        );
        assert_eq!(layout(&forest), before, "after {writes_before_failure} writes");
        assert!(!forest.store().in_transaction());
        forest.check_invariants().unwrap();

        // The injected failure is spent; the same move now succeeds.
        forest.move_to(&mut c, Placement::LastChildOf(r.id)).unwrap();
        assert_eq!(c.depth, 1);
        forest.check_invariants().unwrap();
    }
}

#[test]
fn failed_remove_keeps_subtree() {
    for writes_before_failure in 0..4 {
        let (mut forest, _, a, _) = sample();
        let before = layout(&forest);
        forest.store_mut().inject_failure(writes_before_failure);
        assert!(forest.remove(a.clone()).is_err());
        assert_eq!(layout(&forest), before);
    }
}

#[test]
fn failed_create_inserts_nothing() {
    let (mut forest, r, _, _) = sample();
    let before = layout(&forest);
    forest.store_mut().inject_failure(1);
    assert!(forest
        .create_at("D", Placement::FirstChildOf(r.id))
        .is_err());
    assert_eq!(layout(&forest), before);
}

#[test]
fn pop_surfaces_parent_clearing_failure() {
    let (mut forest, _, mut a, _) = sample();
    let before = layout(&forest);
    forest.store_mut().inject_failure(0);
    assert!(matches!(
        forest.pop(&mut a),
        Err(ForestError::Store(StoreError::Injected(_)))
    ));
    assert_eq!(layout(&forest), before);
}

#[cfg(feature = "sqlite")]
#[test]
fn sqlite_transaction_rolls_back_on_error() {
    use nested_set::{
        atomically, Column, Filter, IntervalStore, NewRow, NodeId, SqliteStore, Update,
    };

    let mut store = SqliteStore::open_in_memory().unwrap();
    store.insert(NewRow::detached("R", 0)).unwrap();
    let result: Result<(), ForestError> = atomically(&mut store, |store| {
        store.update(Update::Add(Column::Left, 10), &Filter::all())?;
        store.update(Update::Add(Column::Right, 10), &Filter::all())?;
        Err(ForestError::NotFound(NodeId(42)))
    });
    assert!(matches!(result, Err(ForestError::NotFound(NodeId(42)))));
    let row = store.get(NodeId(1)).unwrap().unwrap();
    assert_eq!((row.left, row.right), (0, 1));

    let committed: Result<usize, ForestError> = atomically(&mut store, |store| {
        Ok(store.update(Update::Add(Column::Depth, 1), &Filter::all())?)
    });
    assert_eq!(committed.unwrap(), 1);
    assert_eq!(store.get(NodeId(1)).unwrap().unwrap().depth, 1);
}
