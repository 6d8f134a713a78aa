//! Property tests for the reconciliation rules.

use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;
use syncrow_codec::{CborMarshaler, RecordCodec, Secret};
use syncrow_core::{SyncTable, TableOptions};
use syncrow_testkit::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn stale_remote_write_is_rejected(
        id in record_id_strategy(),
        first in note_strategy(),
        second in note_strategy(),
        t1 in 1i64..10_000,
        back in 1i64..1_000,
    ) {
        let table = TestTable::memory();
        table.save_remote(id.as_str(), 0, first.clone(), t1).unwrap();
        table.save_remote(id.as_str(), 0, second, t1 - back).unwrap();
        prop_assert_eq!(table.get(id.as_str()).unwrap(), first);
    }

    #[test]
    fn local_save_is_visible(id in record_id_strategy(), category in category_strategy(), note in note_strategy()) {
        let table = TestTable::memory();
        table.save_local(id.as_str(), category, note.clone()).unwrap();
        prop_assert_eq!(table.get(id.as_str()).unwrap(), note);
        prop_assert!(table.is_local(id.as_str()).unwrap());
        prop_assert!(!table.is_remote(id.as_str()).unwrap());
    }

    #[test]
    fn push_moves_local_to_remote(
        id in record_id_strategy(),
        draft in note_strategy(),
        pushed in note_strategy(),
        delay in 0i64..100,
    ) {
        let table = TestTable::memory();
        table.save_local(id.as_str(), 0, draft).unwrap();
        let t = table.advance(delay);
        table.save_remote(id.as_str(), 0, pushed.clone(), t).unwrap();

        prop_assert!(table.list_locals().unwrap().is_empty());
        prop_assert_eq!(table.list_remotes().unwrap(), vec![pushed]);
    }

    #[test]
    fn delete_snapshots_remote(id in record_id_strategy(), note in note_strategy(), t in timestamp_strategy()) {
        let table = TestTable::memory();
        table.save_remote(id.as_str(), 1, note.clone(), t).unwrap();
        table.delete(id.as_str()).unwrap();

        prop_assert_eq!(table.list_deletions().unwrap(), vec![note]);
        prop_assert!(table.list_remotes().unwrap().is_empty());

        table.save_remote(id.as_str(), 1, Note::new("echo"), t + 1).unwrap();
        prop_assert!(table.get(id.as_str()).unwrap_err().is_not_found());
        prop_assert!(table.contains_deletion(id.as_str()).unwrap());

        prop_assert_eq!(table.remove_deletions([id.as_str()]).unwrap(), 1);
        table.save_remote(id.as_str(), 1, Note::new("again"), t + 2).unwrap();
        prop_assert_eq!(table.get(id.as_str()).unwrap(), Note::new("again"));
    }

    #[test]
    fn codec_round_trip(
        id in record_id_strategy(),
        note in note_strategy(),
        secret in prop::option::of(secret_strategy()),
    ) {
        let mut codec = RecordCodec::<Note>::new(CborMarshaler);
        if let Some(secret) = &secret {
            codec = codec.with_secret(Secret::new(secret.as_str()));
        }
        let bytes = codec.encode(&id, &note).unwrap();
        prop_assert_eq!(codec.is_encrypted(&bytes), secret.is_some());
        prop_assert_eq!(codec.decode(&id, &bytes).unwrap(), note);
    }

    #[test]
    fn random_sequences_keep_tables_consistent(ops in table_ops_strategy(40)) {
        let table = TestTable::memory();
        for op in &ops {
            op.apply(&table).unwrap();
        }

        // A second table on the same store sees the state with cold caches.
        let cold: SyncTable<Note> =
            SyncTable::open(Arc::clone(table.store()), TableOptions::default()).unwrap();

        let remotes: BTreeSet<String> =
            table.remote_entries().unwrap().into_iter().map(|e| e.id).collect();
        let locals: BTreeSet<String> =
            table.local_entries().unwrap().into_iter().map(|e| e.id).collect();
        let deletions: BTreeSet<String> =
            table.deletion_entries().unwrap().into_iter().map(|e| e.id).collect();

        prop_assert!(remotes.is_disjoint(&deletions));
        prop_assert_eq!(table.list(&[]).unwrap().len(), remotes.union(&locals).count());

        for entry in table.update_entries().unwrap() {
            prop_assert!(!entry.synced);
            prop_assert!(remotes.contains(&entry.id));
        }

        for n in 0..4 {
            let id = format!("id-{}", n);
            let warm = table.get(id.as_str());
            let fresh = cold.get(id.as_str());
            prop_assert_eq!(warm.is_ok(), table.state(id.as_str()).unwrap().is_visible());
            match (warm, fresh) {
                (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
                (Err(a), Err(b)) => prop_assert!(a.is_not_found() && b.is_not_found()),
                (a, b) => prop_assert!(false, "cache disagrees with store: {:?} vs {:?}", a, b),
            }
        }
    }
}
