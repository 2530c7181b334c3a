use chrono::Timelike;
use ivrmon_telephony::CallRecord;
use serde::Serialize;
use std::collections::HashMap;

/// Statuses counted as failed outcomes. Everything else that is not
/// `completed` (e.g. `canceled`, in-progress states) counts in neither
/// bucket, matching how the dashboard has always reported.
const FAILED_STATUSES: [&str; 3] = ["failed", "busy", "no-answer"];

/// Aggregate call KPIs for one report window.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct CallMetrics {
    pub total_calls: usize,
    pub completed_calls: usize,
    pub failed_calls: usize,
    /// Percentage of calls with status `completed`, 0.0 for an empty set.
    pub success_rate: f64,
    /// Mean duration in seconds over calls that actually connected
    /// (duration > 0); 0.0 when none did.
    pub avg_duration_secs: f64,
    pub total_duration_secs: i64,
    pub total_cost: f64,
    pub avg_cost: f64,
    /// Up to three busiest hours of day (0-23), busiest first.
    pub peak_hours: Vec<u32>,
}

/// Computes the KPI block over a merged or raw call set.
pub fn call_metrics<'a, I>(calls: I) -> CallMetrics
where
    I: IntoIterator<Item = &'a CallRecord>,
{
    let calls: Vec<&CallRecord> = calls.into_iter().collect();
    let total_calls = calls.len();
    let completed_calls = calls.iter().filter(|c| c.status == "completed").count();
    let failed_calls = calls
        .iter()
        .filter(|c| FAILED_STATUSES.contains(&c.status.as_str()))
        .count();
    let success_rate = if total_calls == 0 {
        0.0
    } else {
        completed_calls as f64 / total_calls as f64 * 100.0
    };

    let connected: Vec<i64> = calls
        .iter()
        .map(|c| c.duration)
        .filter(|&d| d > 0)
        .collect();
    let avg_duration_secs = if connected.is_empty() {
        0.0
    } else {
        connected.iter().sum::<i64>() as f64 / connected.len() as f64
    };
    let total_duration_secs = calls.iter().map(|c| c.duration).sum();

    let total_cost: f64 = calls.iter().map(|c| c.price).sum();
    let avg_cost = if total_calls == 0 {
        0.0
    } else {
        total_cost / total_calls as f64
    };

    CallMetrics {
        total_calls,
        completed_calls,
        failed_calls,
        success_rate,
        avg_duration_secs,
        total_duration_secs,
        total_cost,
        avg_cost,
        peak_hours: peak_hours(calls),
    }
}

/// The top three hours of day by call volume, busiest first; ties break
/// toward the earlier hour so the result is stable.
pub fn peak_hours<'a, I>(calls: I) -> Vec<u32>
where
    I: IntoIterator<Item = &'a CallRecord>,
{
    let mut by_hour: HashMap<u32, usize> = HashMap::new();
    for call in calls {
        if let Some(created) = call.date_created {
            *by_hour.entry(created.hour()).or_default() += 1;
        }
    }
    let mut hours: Vec<(u32, usize)> = by_hour.into_iter().collect();
    hours.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    hours.into_iter().take(3).map(|(hour, _)| hour).collect()
}

/// Format a duration in seconds the way the dashboard displays it.
///
/// # Examples
///
/// ```
/// use ivrmon_report::metrics::format_duration;
///
/// assert_eq!(format_duration(48), "48s");
/// assert_eq!(format_duration(123), "2m 3s");
/// assert_eq!(format_duration(3900), "1h 5m");
/// ```
pub fn format_duration(seconds: i64) -> String {
    if seconds < 60 {
        format!("{seconds}s")
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    }
}

/// Format an Indian number for display: `+919999900001` becomes
/// `+91 99999 00001`. Anything not starting with `+91` passes through.
pub fn format_phone_number(number: &str) -> String {
    match number.strip_prefix("+91") {
        Some(rest) if rest.len() > 5 => {
            let (head, tail) = rest.split_at(5);
            format!("+91 {head} {tail}")
        }
        _ => number.to_string(),
    }
}
