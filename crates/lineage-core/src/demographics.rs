//! Shared bucketing used by the evaluator and the storage analytics.

/// Living age buckets, in display order.
pub const AGE_BUCKETS: [&str; 5] = ["Under 18", "18-30", "31-50", "51-70", "Over 70"];

/// Bucket label for an age in whole years.
pub fn age_bucket(age: i32) -> &'static str {
    match age {
        i32::MIN..=17 => AGE_BUCKETS[0],
        18..=30 => AGE_BUCKETS[1],
        31..=50 => AGE_BUCKETS[2],
        51..=70 => AGE_BUCKETS[3],
        _ => AGE_BUCKETS[4],
    }
}

/// First year of the decade containing `year`.
pub fn decade_of(year: i32) -> i32 {
    year.div_euclid(10) * 10
}
