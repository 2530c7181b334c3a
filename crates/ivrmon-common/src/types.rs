use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One step of the IVR menu that captures a keypress, ordered as callers
/// walk through the flow.
///
/// The webhook URL segment names the step. `hp` is the segment the vendor
/// flow is configured with; `horsepower` is accepted as an alias. Any
/// other segment is an unknown step: it is still recorded as a raw event
/// but never aggregated into the fixed path.
///
/// # Examples
///
/// ```
/// use ivrmon_common::types::IvrStep;
///
/// let step: IvrStep = "language".parse().unwrap();
/// assert_eq!(step, IvrStep::Language);
/// assert_eq!(step.to_string(), "language");
/// assert_eq!(IvrStep::Horsepower.as_segment(), "hp");
/// assert!("billing".parse::<IvrStep>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IvrStep {
    Language,
    State,
    Service,
    Model,
    #[serde(rename = "hp")]
    Horsepower,
}

impl IvrStep {
    /// All known steps in fixed menu order. The complete-path string is
    /// always composed in this order.
    pub const ALL: [IvrStep; 5] = [
        IvrStep::Language,
        IvrStep::State,
        IvrStep::Service,
        IvrStep::Model,
        IvrStep::Horsepower,
    ];

    /// The webhook URL segment for this step.
    pub fn as_segment(&self) -> &'static str {
        match self {
            IvrStep::Language => "language",
            IvrStep::State => "state",
            IvrStep::Service => "service",
            IvrStep::Model => "model",
            IvrStep::Horsepower => "hp",
        }
    }

    /// The `ivr_paths` column holding this step's choice.
    pub fn choice_column(&self) -> &'static str {
        match self {
            IvrStep::Language => "language_choice",
            IvrStep::State => "state_choice",
            IvrStep::Service => "service_choice",
            IvrStep::Model => "model_choice",
            IvrStep::Horsepower => "hp_choice",
        }
    }
}

impl std::fmt::Display for IvrStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_segment())
    }
}

impl std::str::FromStr for IvrStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "language" => Ok(IvrStep::Language),
            "state" => Ok(IvrStep::State),
            "service" => Ok(IvrStep::Service),
            "model" => Ok(IvrStep::Model),
            "hp" | "horsepower" => Ok(IvrStep::Horsepower),
            _ => Err(format!("unknown IVR step: {s}")),
        }
    }
}

/// A single keypress notification as received from the vendor, before it
/// is written to the store. One call produces one of these per answered
/// step; duplicates are valid (retried notifications) and are appended
/// as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepEvent {
    pub call_sid: String,
    /// Raw step name from the URL segment. Open namespace: unknown names
    /// are stored but not aggregated.
    pub step_name: String,
    /// Normalized digits (quote wrapping already stripped), if any.
    pub digit_input: Option<String>,
    pub from_number: Option<String>,
    pub to_number: Option<String>,
    /// Originating exophone (the vendor number the caller dialed).
    pub exophone: Option<String>,
    /// Carrier circle of the caller, when the vendor reports it.
    pub caller_circle: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// 原始按键事件（ivr_inputs 表记录）
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct StepEventRow {
    /// 数据库 ID（ivr_inputs 表主键）
    pub id: i64,
    /// 通话唯一标识（厂商分配）
    pub call_sid: String,
    /// 步骤名（URL 段原文）
    pub step_name: String,
    /// 按键值（已去除引号包裹）
    pub digit_input: Option<String>,
    /// 主叫号码
    pub from_number: Option<String>,
    /// 被叫号码
    pub to_number: Option<String>,
    pub exophone: Option<String>,
    pub caller_circle: Option<String>,
    /// 记录时间
    pub timestamp: DateTime<Utc>,
}

/// 聚合后的 IVR 路径（ivr_paths 表记录，每通电话一行）
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct IvrPathRow {
    /// 数据库 ID（ivr_paths 表主键）
    pub id: i64,
    /// 通话唯一标识（唯一键）
    pub call_sid: String,
    pub from_number: Option<String>,
    pub to_number: Option<String>,
    pub language_choice: Option<String>,
    pub state_choice: Option<String>,
    pub service_choice: Option<String>,
    pub model_choice: Option<String>,
    pub hp_choice: Option<String>,
    /// 完整路径（各步骤选择按固定顺序用 `-` 连接）
    pub complete_path: Option<String>,
    /// 最后更新时间
    pub timestamp: DateTime<Utc>,
}

impl IvrPathRow {
    /// Choice fields in fixed step order (see [`IvrStep::ALL`]).
    pub fn choices(&self) -> [Option<&str>; 5] {
        [
            self.language_choice.as_deref(),
            self.state_choice.as_deref(),
            self.service_choice.as_deref(),
            self.model_choice.as_deref(),
            self.hp_choice.as_deref(),
        ]
    }

    /// The non-null choices in step order, for display alongside the
    /// complete path.
    pub fn selections(&self) -> Vec<String> {
        self.choices()
            .iter()
            .flatten()
            .map(|c| c.to_string())
            .collect()
    }
}

/// Compose the complete-path string from per-step choices in fixed order.
///
/// Unset steps render as empty, so every remaining unset step contributes
/// one `-` placeholder. A path with no answered steps is `"----"`.
///
/// # Examples
///
/// ```
/// use ivrmon_common::types::compose_complete_path;
///
/// let path = compose_complete_path([Some("2"), Some("3"), None, None, None]);
/// assert_eq!(path, "2-3---");
/// assert_eq!(compose_complete_path([None; 5]), "----");
/// ```
pub fn compose_complete_path(choices: [Option<&str>; 5]) -> String {
    choices
        .iter()
        .map(|c| c.unwrap_or(""))
        .collect::<Vec<_>>()
        .join("-")
}

/// The empty complete path (no steps answered). Excluded from the
/// top-paths frequency table.
pub const EMPTY_COMPLETE_PATH: &str = "----";

/// 路径频次（complete_path 频次表条目）
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PathCount {
    pub path: String,
    pub count: u64,
}

/// 选项频次（单步选择分布条目）
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ChoiceCount {
    /// 按键原值（如 "1"）
    pub choice: String,
    /// 显示标签（如 "Hindi"；无映射时与 choice 相同）
    pub label: String,
    pub count: u64,
}

/// IVR 统计汇总
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct IvrStats {
    /// 有 IVR 交互的通话总数（按 call_sid 去重）
    pub total_calls: u64,
    /// 最常见完整路径（Top 10，不含空路径）
    pub top_paths: Vec<PathCount>,
    pub language_distribution: Vec<ChoiceCount>,
    pub state_distribution: Vec<ChoiceCount>,
    pub service_distribution: Vec<ChoiceCount>,
}
