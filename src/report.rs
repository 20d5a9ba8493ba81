use anyhow::{Context, Result};
use glam::Vec4;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CategoryKind {
    MetricBars,
    OverviewPersonas,
    NextStepsMonths,
    #[default]
    Generic,
}

impl CategoryKind {
    pub fn label(self) -> &'static str {
        match self {
            CategoryKind::MetricBars => "metric-bars",
            CategoryKind::OverviewPersonas => "overview-personas",
            CategoryKind::NextStepsMonths => "next-steps-months",
            CategoryKind::Generic => "generic",
        }
    }
}

impl From<String> for CategoryKind {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "metric-bars" | "metrics" | "bars" => CategoryKind::MetricBars,
            "overview-personas" | "overview" | "personas" => CategoryKind::OverviewPersonas,
            "next-steps-months" | "next-steps" | "months" => CategoryKind::NextStepsMonths,
            _ => CategoryKind::Generic,
        }
    }
}

impl<'de> Deserialize<'de> for CategoryKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(CategoryKind::from)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Stat {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: f32,
    #[serde(default)]
    pub max: Option<f32>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Persona {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct MonthObjectives {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub objectives: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct GenericPanel {
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CategoryContent {
    MetricBars(Vec<Stat>),
    Personas(Vec<Persona>),
    Months(Vec<MonthObjectives>),
    Generic(GenericPanel),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawCategory")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub kind: CategoryKind,
    pub content: CategoryContent,
}

impl Category {
    pub fn stats(&self) -> &[Stat] {
        match &self.content {
            CategoryContent::MetricBars(stats) => stats,
            _ => &[],
        }
    }

    pub fn personas(&self) -> &[Persona] {
        match &self.content {
            CategoryContent::Personas(personas) => personas,
            _ => &[],
        }
    }

    pub fn months(&self) -> &[MonthObjectives] {
        match &self.content {
            CategoryContent::Months(months) => months,
            _ => &[],
        }
    }
}

#[derive(Deserialize)]
struct RawCategory {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    kind: CategoryKind,
    #[serde(default)]
    payload: Value,
}

#[derive(Deserialize, Default)]
struct StatsPayload {
    #[serde(default)]
    stats: Vec<Stat>,
}

#[derive(Deserialize, Default)]
struct PersonasPayload {
    #[serde(default)]
    personas: Vec<Persona>,
}

#[derive(Deserialize, Default)]
struct MonthsPayload {
    #[serde(default)]
    months: Vec<MonthObjectives>,
}

impl From<RawCategory> for Category {
    fn from(raw: RawCategory) -> Self {
        let content = match raw.kind {
            CategoryKind::MetricBars => {
                CategoryContent::MetricBars(lenient_payload::<StatsPayload>(&raw.id, raw.payload).stats)
            }
            CategoryKind::OverviewPersonas => {
                CategoryContent::Personas(lenient_payload::<PersonasPayload>(&raw.id, raw.payload).personas)
            }
            CategoryKind::NextStepsMonths => {
                CategoryContent::Months(lenient_payload::<MonthsPayload>(&raw.id, raw.payload).months)
            }
            CategoryKind::Generic => CategoryContent::Generic(lenient_payload(&raw.id, raw.payload)),
        };
        Category { id: raw.id, name: raw.name, kind: raw.kind, content }
    }
}

/// A payload that does not match its kind renders as empty instead of failing the report.
fn lenient_payload<T: DeserializeOwned + Default>(category: &str, payload: Value) -> T {
    if payload.is_null() {
        return T::default();
    }
    match serde_json::from_value(payload) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::warn!(target: "report", category, "malformed payload ({err}); rendering empty");
            T::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ReportData {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl ReportData {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("Failed to read report {}", path.display()))?;
        Self::from_slice(&bytes).with_context(|| format!("Failed to parse report {}", path.display()))
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn category(&self, index: usize) -> Option<&Category> {
        self.categories.get(index)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Parses `#rgb`, `#rrggbb` or `#rrggbbaa` into 0..1 channels, as written.
pub fn parse_hex_color(raw: &str) -> Option<Vec4> {
    let hex = raw.trim().strip_prefix('#')?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f32 / 255.0);
    match hex.len() {
        3 => {
            let mut out = [0.0; 3];
            for (slot, ch) in out.iter_mut().zip(hex.chars()) {
                let doubled: String = [ch, ch].iter().collect();
                *slot = channel(&doubled)?;
            }
            Some(Vec4::new(out[0], out[1], out[2], 1.0))
        }
        6 | 8 => {
            let r = channel(hex.get(0..2)?)?;
            let g = channel(hex.get(2..4)?)?;
            let b = channel(hex.get(4..6)?)?;
            let a = if hex.len() == 8 { channel(hex.get(6..8)?)? } else { 1.0 };
            Some(Vec4::new(r, g, b, a))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_category_kind() {
        let json = r##"{
            "title": "Quarterly HR",
            "categories": [
                {"id": "hiring", "name": "Hiring", "kind": "metric-bars",
                 "payload": {"stats": [{"label": "Offers", "value": 12}, {"label": "Hires", "value": 9, "color": "#ff8800"}]}},
                {"id": "overview", "name": "Overview", "kind": "overview-personas",
                 "payload": {"personas": [{"name": "Recruiter", "role": "Talent"}]}},
                {"id": "next", "name": "Next Steps", "kind": "next-steps-months",
                 "payload": {"months": [{"label": "July", "objectives": ["Launch"]}, {"label": "August"}]}},
                {"id": "misc", "name": "Notes", "kind": "something-else", "payload": {"lines": ["a"]}}
            ]
        }"##;
        let report = ReportData::from_slice(json.as_bytes()).expect("report parses");
        assert_eq!(report.title, "Quarterly HR");
        assert_eq!(report.len(), 4);
        assert_eq!(report.categories[0].stats().len(), 2);
        assert_eq!(report.categories[1].personas()[0].role, "Talent");
        assert_eq!(report.categories[2].months()[1].objectives.len(), 0);
        assert_eq!(report.categories[3].kind, CategoryKind::Generic);
    }

    #[test]
    fn malformed_payload_becomes_empty() {
        let json = r#"{"categories": [
            {"id": "bad", "name": "Bad", "kind": "metric-bars", "payload": {"stats": "nope"}},
            {"id": "missing", "name": "Missing", "kind": "overview-personas"}
        ]}"#;
        let report = ReportData::from_slice(json.as_bytes()).expect("lenient parse");
        assert!(report.categories[0].stats().is_empty());
        assert!(report.categories[1].personas().is_empty());
        assert_eq!(report.categories[0].content, CategoryContent::MetricBars(Vec::new()));
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("#ffffff"), Some(Vec4::ONE));
        assert_eq!(parse_hex_color("#000"), Some(Vec4::new(0.0, 0.0, 0.0, 1.0)));
        let half = parse_hex_color("#ff000080").expect("rgba");
        assert!((half.w - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(parse_hex_color("ffffff"), None);
        assert_eq!(parse_hex_color("#12"), None);
    }
}
