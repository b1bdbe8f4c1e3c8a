use crate::domain::model::{ActionType, Appointment, AppointmentSummary, Status, StoredStatus};

/// Status an appointment takes after the given action.
pub fn resolve_status(action: ActionType) -> Status {
    match action {
        ActionType::Schedule => Status::Scheduled,
        ActionType::Cancel => Status::Cancelled,
        ActionType::Create => Status::Pending,
    }
}

/// Same as [`resolve_status`] for a raw action name. Unknown names resolve to
/// `pending`.
pub fn resolve_status_name(action: &str) -> Status {
    action
        .parse::<ActionType>()
        .map(resolve_status)
        .unwrap_or(Status::Pending)
}

/// Counts appointments per status. `total_count` is the size of the backing
/// collection, which may be larger than the fetched page.
pub fn summarize(appointments: &[Appointment], total_count: u64) -> AppointmentSummary {
    summarize_statuses(appointments.iter().map(|a| &a.status), total_count)
}

pub fn summarize_statuses<'a, I>(statuses: I, total_count: u64) -> AppointmentSummary
where
    I: IntoIterator<Item = &'a StoredStatus>,
{
    let initial = AppointmentSummary {
        total_count,
        ..AppointmentSummary::default()
    };

    statuses
        .into_iter()
        .fold(initial, |mut acc, status| {
            match status.known() {
                Some(Status::Scheduled) => acc.scheduled_count += 1,
                Some(Status::Pending) => acc.pending_count += 1,
                Some(Status::Cancelled) => acc.cancelled_count += 1,
                // not counted in any bucket
                None => {}
            }
            acc
        })
}

impl AppointmentSummary {
    /// Combines summaries of disjoint slices of the same collection.
    /// Both sides report the same collection size, so the larger one is kept.
    pub fn merge(self, other: AppointmentSummary) -> AppointmentSummary {
        AppointmentSummary {
            total_count: self.total_count.max(other.total_count),
            scheduled_count: self.scheduled_count + other.scheduled_count,
            pending_count: self.pending_count + other.pending_count,
            cancelled_count: self.cancelled_count + other.cancelled_count,
        }
    }

    pub fn counted(&self) -> u64 {
        self.scheduled_count + self.pending_count + self.cancelled_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn status(raw: &str) -> StoredStatus {
        serde_json::from_value(serde_json::Value::String(raw.to_string())).unwrap()
    }

    #[test]
    fn test_resolve_status_mapping() {
        assert_eq!(resolve_status(ActionType::Create), Status::Pending);
        assert_eq!(resolve_status(ActionType::Schedule), Status::Scheduled);
        assert_eq!(resolve_status(ActionType::Cancel), Status::Cancelled);
    }

    #[test]
    fn test_resolve_status_name() {
        assert_eq!(resolve_status_name("schedule"), Status::Scheduled);
        assert_eq!(resolve_status_name("cancel"), Status::Cancelled);
        assert_eq!(resolve_status_name("create"), Status::Pending);
        assert_eq!(resolve_status_name("bogus"), Status::Pending);
        assert_eq!(resolve_status_name(""), Status::Pending);
    }

    #[test]
    fn test_summarize_counts_each_bucket() {
        let statuses = vec![
            status("pending"),
            status("scheduled"),
            status("cancelled"),
            status("pending"),
        ];

        let summary = summarize_statuses(&statuses, 10);

        assert_eq!(
            summary,
            AppointmentSummary {
                total_count: 10,
                scheduled_count: 1,
                pending_count: 2,
                cancelled_count: 1,
            }
        );
    }

    #[test]
    fn test_summarize_ignores_unrecognized_status() {
        let statuses = vec![status("pending"), status("archived"), status("Scheduled")];

        let summary = summarize_statuses(&statuses, 3);

        assert_eq!(summary.pending_count, 1);
        assert_eq!(summary.scheduled_count, 0);
        assert_eq!(summary.counted(), 1);
        assert_eq!(summary.total_count, 3);
    }

    #[test]
    fn test_summarize_ignores_non_string_status() {
        let statuses: Vec<StoredStatus> = [
            serde_json::json!("pending"),
            serde_json::Value::Null,
            serde_json::json!(3),
            serde_json::json!({"value": "scheduled"}),
            serde_json::json!("scheduled"),
        ]
        .into_iter()
        .map(StoredStatus::from)
        .collect();

        let summary = summarize_statuses(&statuses, 5);

        assert_eq!(summary.pending_count, 1);
        assert_eq!(summary.scheduled_count, 1);
        assert_eq!(summary.counted(), 2);
        assert_eq!(summary.total_count, 5);
    }

    #[test]
    fn test_summarize_empty_page_keeps_total() {
        let summary = summarize(&[], 42);
        assert_eq!(summary.total_count, 42);
        assert_eq!(summary.counted(), 0);
    }

    fn stored_status() -> impl Strategy<Value = StoredStatus> {
        prop_oneof![
            Just(StoredStatus::Known(Status::Pending)),
            Just(StoredStatus::Known(Status::Scheduled)),
            Just(StoredStatus::Known(Status::Cancelled)),
            "[a-z]{1,10}".prop_map(|raw| StoredStatus::from(serde_json::Value::String(raw))),
            Just(StoredStatus::Unrecognized(serde_json::Value::Null)),
            any::<i64>().prop_map(|n| StoredStatus::Unrecognized(serde_json::json!(n))),
        ]
    }

    proptest! {
        #[test]
        fn prop_counts_bounded_by_length(statuses in prop::collection::vec(stored_status(), 0..64)) {
            let summary = summarize_statuses(&statuses, statuses.len() as u64);
            let unknown = statuses.iter().filter(|s| s.known().is_none()).count() as u64;

            prop_assert!(summary.counted() <= statuses.len() as u64);
            prop_assert_eq!(summary.counted() == statuses.len() as u64, unknown == 0);
        }

        #[test]
        fn prop_permutation_invariant(statuses in prop::collection::vec(stored_status(), 0..64)) {
            let mut reversed = statuses.clone();
            reversed.reverse();
            let mut rotated = statuses.clone();
            if !rotated.is_empty() {
                rotated.rotate_left(statuses.len() / 2);
            }

            let expected = summarize_statuses(&statuses, 100);
            prop_assert_eq!(summarize_statuses(&reversed, 100), expected);
            prop_assert_eq!(summarize_statuses(&rotated, 100), expected);
        }

        #[test]
        fn prop_merge_of_halves_equals_whole(
            statuses in prop::collection::vec(stored_status(), 0..64),
            split in 0usize..64,
        ) {
            let split = split.min(statuses.len());
            let (left, right) = statuses.split_at(split);

            let merged = summarize_statuses(left, 64).merge(summarize_statuses(right, 64));
            prop_assert_eq!(merged, summarize_statuses(&statuses, 64));
        }
    }
}
