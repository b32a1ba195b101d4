use serde::{Deserialize, Serialize};

use lineage_core::AGE_BUCKETS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LabelCount {
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DecadeCount {
    pub decade: i32,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ParentChildCount {
    pub id: uuid::Uuid,
    pub first_name: String,
    pub last_name: String,
    pub children: i64,
}

/// People (placeholders excluded) whose parent is absent or a placeholder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UnknownParentCounts {
    pub unknown_father: i64,
    pub unknown_mother: i64,
    pub both_unknown: i64,
}

/// Output of the sample analytics queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleReport {
    pub as_of_year: i32,
    pub total_people: i64,
    pub placeholders: i64,
    pub sex_distribution: Vec<LabelCount>,
    pub living_age_distribution: Vec<LabelCount>,
    pub top_last_names: Vec<LabelCount>,
    pub unknown_parents: UnknownParentCounts,
    pub births_by_decade: Vec<DecadeCount>,
    pub top_parents: Vec<ParentChildCount>,
}

/// Lay out bucket counts in [`AGE_BUCKETS`] order, filling empty buckets with zero.
pub(crate) fn order_age_buckets(rows: Vec<LabelCount>) -> Vec<LabelCount> {
    AGE_BUCKETS
        .iter()
        .map(|bucket| LabelCount {
            label: (*bucket).to_string(),
            count: rows
                .iter()
                .filter(|row| row.label == *bucket)
                .map(|row| row.count)
                .sum(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_buckets_are_ordered_and_complete() {
        let rows = vec![
            LabelCount {
                label: "Over 70".to_string(),
                count: 3,
            },
            LabelCount {
                label: "Under 18".to_string(),
                count: 5,
            },
        ];
        let ordered = order_age_buckets(rows);
        let labels: Vec<_> = ordered.iter().map(|row| row.label.as_str()).collect();
        assert_eq!(labels, AGE_BUCKETS);
        let counts: Vec<_> = ordered.iter().map(|row| row.count).collect();
        assert_eq!(counts, vec![5, 0, 0, 0, 3]);
    }
}
