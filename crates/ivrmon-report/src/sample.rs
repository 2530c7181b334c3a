use chrono::{Duration, Utc};
use ivrmon_telephony::CallRecord;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::merge::MergedCallRecord;

const SAMPLE_SIZE: usize = 200;

const STATUSES: [&str; 5] = ["completed", "busy", "no-answer", "failed", "canceled"];
const DIRECTIONS: [&str; 2] = ["inbound", "outbound"];

/// Keypress sequences drawn from the real menu flow, weighted by
/// repetition the way live traffic looks. The empty sequence stands for
/// a caller who dropped before the first prompt.
const IVR_FLOWS: &[&[&str]] = &[
    // Language + state + service
    &["1", "1", "1"],
    &["1", "1", "2"],
    &["1", "1", "3"],
    &["1", "1", "4"],
    &["1", "1", "5"],
    &["1", "2", "1"],
    &["1", "2", "2"],
    &["1", "2", "4"],
    &["1", "3", "1"],
    &["1", "3", "2"],
    &["1", "4"],
    &["2", "1", "1"],
    &["2", "1", "2"],
    &["2", "2", "2"],
    &["2", "3", "4"],
    // Buy-old flows down to model year and horsepower
    &["1", "1", "2", "1"],
    &["1", "1", "2", "2"],
    &["1", "1", "2", "3"],
    &["1", "1", "2", "4"],
    &["1", "2", "2", "1", "1"],
    &["1", "2", "2", "1", "2"],
    // Sell flows
    &["1", "1", "1", "1"],
    &["1", "1", "1", "2"],
    &["1", "1", "1", "3"],
    &["1", "1", "1", "4"],
    &["2", "2", "1", "2"],
    // Finance flows
    &["1", "1", "4", "1"],
    &["1", "1", "4", "2"],
    &["2", "1", "4", "1"],
    // Consultant requests
    &["1", "1", "9"],
    &["2", "2", "9"],
    // Dropped before the first prompt
    &[],
];

/// Generates a plausible merged report for demos and for the fallback
/// path when the vendor API is unconfigured or unreachable. Shape and
/// value ranges mirror live traffic; the data itself is random.
pub fn generate_sample_report(days: i64) -> Vec<MergedCallRecord> {
    let mut rng = rand::thread_rng();
    let now = Utc::now().naive_utc();
    let days = days.max(1);

    (0..SAMPLE_SIZE)
        .map(|i| {
            let created = now
                - Duration::days(rng.gen_range(0..days))
                - Duration::hours(rng.gen_range(0..24))
                - Duration::minutes(rng.gen_range(0..60));
            let flow = IVR_FLOWS
                .choose(&mut rng)
                .copied()
                .unwrap_or_default();

            let connected = rng.gen_range(0..3) == 0;
            let call = CallRecord {
                call_sid: format!("CA{i:08}"),
                date_created: Some(created),
                from_number: Some(format!("+91{}", rng.gen_range(6_000_000_000u64..=9_999_999_999))),
                to_number: Some(format!("+91{}", rng.gen_range(6_000_000_000u64..=9_999_999_999))),
                status: STATUSES
                    .choose(&mut rng)
                    .copied()
                    .unwrap_or("completed")
                    .to_string(),
                duration: if connected { rng.gen_range(10..=600) } else { 0 },
                direction: DIRECTIONS
                    .choose(&mut rng)
                    .copied()
                    .unwrap_or("inbound")
                    .to_string(),
                price: (rng.gen_range(0.5..=5.0) * 100.0_f64).round() / 100.0,
                recording_url: rng
                    .gen_bool(0.5)
                    .then(|| format!("https://example.com/recording/{i}.mp3")),
            };

            let (ivr_path, ivr_selections) = if flow.is_empty() {
                (None, None)
            } else {
                (
                    Some(flow.join("-")),
                    Some(flow.iter().map(|s| s.to_string()).collect()),
                )
            };

            MergedCallRecord {
                call,
                ivr_path,
                ivr_selections,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_report_has_expected_shape() {
        let rows = generate_sample_report(7);
        assert_eq!(rows.len(), SAMPLE_SIZE);

        for row in &rows {
            assert!(row.call.call_sid.starts_with("CA"));
            assert!(row.call.date_created.is_some());
            assert!(STATUSES.contains(&row.call.status.as_str()));
            assert!(row.call.price >= 0.5 && row.call.price <= 5.0);
            // Path and selections are set together.
            assert_eq!(row.ivr_path.is_some(), row.ivr_selections.is_some());
            if let (Some(path), Some(selections)) = (&row.ivr_path, &row.ivr_selections) {
                assert_eq!(path.split('-').count(), selections.len());
            }
        }

        // With 200 draws over the flow table IVR traffic must appear.
        assert!(rows.iter().any(|r| r.ivr_path.is_some()));
    }

    #[test]
    fn zero_days_is_clamped() {
        let rows = generate_sample_report(0);
        assert_eq!(rows.len(), SAMPLE_SIZE);
    }
}
