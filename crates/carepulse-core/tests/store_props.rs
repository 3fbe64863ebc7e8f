//! Property tests for store invariants under arbitrary operation sequences.

use carepulse_core::reminder::{Priority, Reminder, ReminderCategory, ReminderStore};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add(u8),
    Remove(u8),
    SetActive(u8),
    Snooze(u8),
    Dismiss(u8),
    MarkMissed(u8, i64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..16).prop_map(Op::Add),
        (0u8..16).prop_map(Op::Remove),
        (0u8..16).prop_map(Op::SetActive),
        (0u8..16).prop_map(Op::Snooze),
        (0u8..16).prop_map(Op::Dismiss),
        ((0u8..16), (0i64..120)).prop_map(|(n, d)| Op::MarkMissed(n, d)),
    ]
}

fn reminder(n: u8) -> Reminder {
    let t = Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap();
    let mut r = Reminder::new(
        format!("Reminder {n}"),
        "",
        ReminderCategory::Task,
        t,
        Priority::Medium,
    );
    r.id = format!("r{n}");
    r
}

proptest! {
    #[test]
    fn store_invariants_hold(ops in proptest::collection::vec(op_strategy(), 0..200)) {
        let base = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
        let mut store = ReminderStore::new();

        for op in ops {
            match op {
                Op::Add(n) => {
                    let _ = store.add(reminder(n));
                }
                Op::Remove(n) => store.remove(&format!("r{n}")),
                Op::SetActive(n) => store.set_active(Some(reminder(n))),
                Op::Snooze(n) => {
                    let _ = store.snooze(&format!("r{n}"));
                }
                Op::Dismiss(n) => store.dismiss(&format!("r{n}")),
                Op::MarkMissed(n, d) => {
                    store.mark_missed(reminder(n), base + chrono::Duration::days(d));
                }
            }

            // Ids stay unique.
            let mut ids: Vec<_> = store.reminders().iter().map(|r| r.id.clone()).collect();
            ids.sort();
            ids.dedup();
            prop_assert_eq!(ids.len(), store.reminders().len());

            // Snooze counts never exceed their cap.
            for r in store.reminders() {
                prop_assert!(r.snooze_count <= r.max_snoozes);
            }

            // Bounded logs.
            prop_assert!(store.missed().len() <= 50);
            prop_assert!(store.alerts().len() <= 100);

            // At most one miss per reminder per day.
            let mut keys: Vec<_> = store
                .missed()
                .iter()
                .map(|e| (e.reminder.id.clone(), e.missed_at.date_naive()))
                .collect();
            keys.sort();
            let before = keys.len();
            keys.dedup();
            prop_assert_eq!(keys.len(), before);
        }
    }
}
