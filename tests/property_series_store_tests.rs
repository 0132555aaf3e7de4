use linepick::core::{DataPoint, Series, SeriesId, SeriesStore};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Load(u32),
    Select(Vec<u32>),
    Erase(u32),
    Include(u32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u32..16).prop_map(Op::Load),
        prop::collection::vec(0u32..16, 0..8).prop_map(Op::Select),
        (0u32..16).prop_map(Op::Erase),
        (0u32..16).prop_map(Op::Include),
    ]
}

fn series(raw: u32) -> Series {
    Series::from_points(
        SeriesId::new(raw),
        vec![DataPoint::new(0.0, f64::from(raw)), DataPoint::new(1.0, 0.0)],
    )
    .expect("valid series")
}

fn apply(store: &mut SeriesStore, op: &Op) {
    match op {
        Op::Load(raw) => {
            store.insert(series(*raw));
        }
        Op::Select(raws) => {
            let ids = raws.iter().copied().map(SeriesId::new).collect::<Vec<_>>();
            store.set_selection(&ids);
        }
        Op::Erase(raw) => {
            store.erase(SeriesId::new(*raw));
        }
        Op::Include(raw) => {
            store.include(SeriesId::new(*raw));
        }
    }
}

fn partition(store: &SeriesStore) -> (Vec<SeriesId>, Vec<SeriesId>) {
    let mut shown = store.shown().iter().copied().collect::<Vec<_>>();
    let mut hidden = store.hidden().iter().copied().collect::<Vec<_>>();
    shown.sort();
    hidden.sort();
    (shown, hidden)
}

proptest! {
    #[test]
    fn every_loaded_id_is_in_exactly_one_working_set(
        ops in prop::collection::vec(op_strategy(), 0..40),
    ) {
        let mut store = SeriesStore::new();
        for op in &ops {
            apply(&mut store, op);
        }

        for id in store.ids() {
            let shown = store.shown().contains(&id);
            let hidden = store.hidden().contains(&id);
            prop_assert!(shown ^ hidden, "id {} shown={} hidden={}", id, shown, hidden);
        }
        prop_assert_eq!(store.shown().len() + store.hidden().len(), store.len());
        prop_assert!(store.shown().iter().all(|id| store.contains(*id)));
        prop_assert!(store.hidden().iter().all(|id| store.contains(*id)));
    }

    #[test]
    fn repeated_selection_is_idempotent(
        ops in prop::collection::vec(op_strategy(), 0..30),
        selection in prop::collection::vec(0u32..16, 0..8)
    ) {
        let mut store = SeriesStore::new();
        for op in &ops {
            apply(&mut store, op);
        }
        let ids = selection.into_iter().map(SeriesId::new).collect::<Vec<_>>();

        store.set_selection(&ids);
        let once = partition(&store);
        store.set_selection(&ids);
        prop_assert_eq!(partition(&store), once);
    }
}
