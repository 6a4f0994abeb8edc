//! Best-effort recognition of the reply shapes the query asks for.
//!
//! Nothing here alters what gets printed or returned; the model's text is
//! always passed through untouched. Parsing only feeds logs and the optional
//! `reply` field of the HTTP response.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub columns: Vec<Value>,
    pub data: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotKind {
    List,
    Line,
    Scatter,
    Bar,
    Pie,
}

impl PlotKind {
    fn from_keyword(word: &str) -> Option<Self> {
        // Grouped bar charts number their series: BAR1, BAR2, ...
        let word = word.trim_end_matches(|c: char| c.is_ascii_digit());
        match word {
            "LIST" => Some(Self::List),
            "LINE" => Some(Self::Line),
            "SCATTER" => Some(Self::Scatter),
            "BAR" => Some(Self::Bar),
            "PIE" => Some(Self::Pie),
            _ => None,
        }
    }
}

/// A keyword-prefixed plot line. `body` keeps everything after the outer
/// quotes so multi-series bar replies stay intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotReply {
    pub kind: PlotKind,
    pub body: String,
}

impl PlotReply {
    fn parse(text: &str) -> Option<Self> {
        let text = text.trim_matches('"').trim();
        let (keyword, rest) = text.split_once(char::is_whitespace)?;
        let kind = PlotKind::from_keyword(keyword)?;
        let rest = rest.trim_start();
        let shaped = match kind {
            PlotKind::List => rest.starts_with('['),
            _ => rest.starts_with("data="),
        };
        shaped.then(|| Self {
            kind,
            body: text.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelReply {
    Sql(String),
    Answer(String),
    Table(Series),
    Bar(Series),
    Line(Series),
    Plot(PlotReply),
}

impl ModelReply {
    /// Returns `None` unless the text is a plot line or holds exactly one
    /// recognised object.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if let Some(plot) = PlotReply::parse(trimmed) {
            return Some(Self::Plot(plot));
        }
        let start = trimmed.find('{')?;
        let end = trimmed.rfind('}')?;
        if end < start {
            return None;
        }
        serde_json::from_str(&trimmed[start..=end]).ok()
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Sql(_) => "sql",
            Self::Answer(_) => "answer",
            Self::Table(_) => "table",
            Self::Bar(_) => "bar",
            Self::Line(_) => "line",
            Self::Plot(_) => "plot",
        }
    }
}
