//! Human-readable labels for IVR keypress values.
//!
//! The menu wording lives in the vendor's flow configuration, not in any
//! API this system can query, so the mapping is maintained here and must
//! track the flow. Unknown values fall back to a `Step-N` form instead of
//! being dropped.

use ivrmon_common::types::IvrStep;

pub fn language_label(choice: &str) -> Option<&'static str> {
    match choice {
        "1" => Some("Hindi"),
        "2" => Some("English"),
        _ => None,
    }
}

pub fn state_label(choice: &str) -> Option<&'static str> {
    match choice {
        "1" => Some("Rajasthan"),
        "2" => Some("MP"),
        "3" => Some("Maharashtra"),
        "4" => Some("Other State"),
        _ => None,
    }
}

pub fn service_label(choice: &str) -> Option<&'static str> {
    match choice {
        "1" => Some("Sell Machine"),
        "2" => Some("Buy Old"),
        "3" => Some("Buy New"),
        "4" => Some("Finance"),
        "5" => Some("Other Info"),
        "9" => Some("Consultant"),
        _ => None,
    }
}

/// The fourth step's meaning depends on the chosen service: machine-year
/// ranges when buying or selling, finance product otherwise.
fn fourth_step_label(service: &str, choice: &str) -> Option<&'static str> {
    match service {
        // Buy Old: model years, newest first
        "2" => match choice {
            "1" => Some("2020+"),
            "2" => Some("2018-2020"),
            "3" => Some("2015-2017"),
            "4" => Some("Before 2014"),
            _ => None,
        },
        // Sell: model years, oldest first
        "1" => match choice {
            "1" => Some("Before 2014"),
            "2" => Some("2015-2017"),
            "3" => Some("2018-2020"),
            "4" => Some("2020+"),
            _ => None,
        },
        "4" => match choice {
            "1" => Some("Refinance"),
            "2" => Some("New Finance"),
            _ => None,
        },
        _ => None,
    }
}

fn horsepower_label(choice: &str) -> Option<&'static str> {
    match choice {
        "1" => Some("49 HP"),
        "2" => Some("74 HP"),
        _ => None,
    }
}

/// Label for one choice value of a known step, used by the stats API to
/// annotate distributions. Falls back to the raw value.
pub fn choice_label(step: IvrStep, choice: &str) -> String {
    let label = match step {
        IvrStep::Language => language_label(choice),
        IvrStep::State => state_label(choice),
        IvrStep::Service => service_label(choice),
        // Without the service context the year ranges are ambiguous, so
        // step four and five fall back to the raw digit here.
        IvrStep::Model | IvrStep::Horsepower => None,
    };
    label.map(|l| l.to_string()).unwrap_or_else(|| choice.to_string())
}

/// Human-readable rendering of a complete-path string, e.g.
/// `"1-1-2-1-2"` becomes `"Hindi → Rajasthan → Buy Old → 2020+ → 74 HP"`.
///
/// Empty segments (steps never answered) are skipped; unknown values
/// render as `Lang-7`-style placeholders so a misconfigured flow is
/// visible rather than silent.
pub fn path_label(path: &str) -> String {
    if path.is_empty() {
        return "No IVR".to_string();
    }
    let parts: Vec<&str> = path.split('-').collect();
    let mut labels: Vec<String> = Vec::new();

    let part = |i: usize| parts.get(i).copied().filter(|p| !p.is_empty());

    if let Some(lang) = part(0) {
        labels.push(
            language_label(lang)
                .map(|l| l.to_string())
                .unwrap_or_else(|| format!("Lang-{lang}")),
        );
    }
    if let Some(state) = part(1) {
        labels.push(
            state_label(state)
                .map(|l| l.to_string())
                .unwrap_or_else(|| format!("State-{state}")),
        );
    }
    let service = part(2);
    if let Some(service) = service {
        labels.push(
            service_label(service)
                .map(|l| l.to_string())
                .unwrap_or_else(|| format!("Service-{service}")),
        );
    }
    if let (Some(service), Some(fourth)) = (service, part(3)) {
        let fallback = if service == "4" { "Finance" } else { "Model" };
        labels.push(
            fourth_step_label(service, fourth)
                .map(|l| l.to_string())
                .unwrap_or_else(|| format!("{fallback}-{fourth}")),
        );
    }
    // HP is only asked for recent machines on the buy-old branch.
    if let (Some("2"), Some("1"), Some(hp)) = (service, part(3), part(4)) {
        labels.push(
            horsepower_label(hp)
                .map(|l| l.to_string())
                .unwrap_or_else(|| format!("HP-{hp}")),
        );
    }

    if labels.is_empty() {
        "No IVR".to_string()
    } else {
        labels.join(" → ")
    }
}
