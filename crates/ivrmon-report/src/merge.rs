use ivrmon_common::types::IvrPathRow;
use ivrmon_telephony::CallRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One call record with its IVR path columns attached, the row shape the
/// front-end charts over. Calls that never touched the IVR carry null
/// path fields.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MergedCallRecord {
    #[serde(flatten)]
    pub call: CallRecord,
    #[serde(rename = "IVRPath")]
    pub ivr_path: Option<String>,
    /// The answered choices in step order, convenient for funnel charts.
    #[serde(rename = "IVRSelections")]
    pub ivr_selections: Option<Vec<String>>,
}

/// The merged record set plus the degradation signal for the front-end.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct MergedReport {
    pub rows: Vec<MergedCallRecord>,
    /// False when the store could not be read; every row then has null
    /// path fields and the front-end should say so rather than render an
    /// empty funnel.
    pub ivr_data_available: bool,
}

/// Left join of call records with path rows on the call identifier.
///
/// Every call record produces exactly one output row, in input order; a
/// call with no path row gets null path fields. `call_sid` is unique in
/// `ivr_paths`, so the join is one-to-at-most-one and can neither drop
/// nor duplicate a call.
pub fn merge_call_records(calls: Vec<CallRecord>, paths: &[IvrPathRow]) -> Vec<MergedCallRecord> {
    let by_sid: HashMap<&str, &IvrPathRow> =
        paths.iter().map(|p| (p.call_sid.as_str(), p)).collect();

    calls
        .into_iter()
        .map(|call| {
            let path = by_sid.get(call.call_sid.as_str());
            let ivr_path = path.and_then(|p| p.complete_path.clone());
            let ivr_selections = path
                .filter(|p| p.complete_path.is_some())
                .map(|p| p.selections());
            MergedCallRecord {
                call,
                ivr_path,
                ivr_selections,
            }
        })
        .collect()
}

/// Builds the full report, degrading gracefully when the store was
/// unreachable: `paths = None` yields calls-only rows and flags the IVR
/// data as unavailable instead of failing the whole report.
pub fn merge_report(calls: Vec<CallRecord>, paths: Option<&[IvrPathRow]>) -> MergedReport {
    match paths {
        Some(paths) => MergedReport {
            rows: merge_call_records(calls, paths),
            ivr_data_available: true,
        },
        None => MergedReport {
            rows: merge_call_records(calls, &[]),
            ivr_data_available: false,
        },
    }
}
