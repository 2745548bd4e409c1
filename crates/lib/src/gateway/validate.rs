//! Validation boundary between untrusted model JSON and the domain model.
//!
//! Output is first deserialized into private wire structs (every required field present and
//! string-typed), then normalized: loose enums are mapped, tallies coerced, scores clamped,
//! and ids made unique.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;

use super::ParseError;
use crate::model::{
    Bill, BillAnalysis, BillStatus, DebateSegment, Flashcard, ImpactPoint, MediaItem, MediaKind,
    MindMap, MindMapBranch, Viewpoints, VoteCount,
};

const SCORE_LIMIT: f64 = 100.0;

fn shape<T: for<'de> Deserialize<'de>>(value: Value) -> Result<T, ParseError> {
    serde_json::from_value(value).map_err(|e| ParseError::Shape(e.to_string()))
}

// --- search ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BillWire {
    id: String,
    title: String,
    summary: String,
    category: String,
    status: String,
    date: String,
    #[serde(default)]
    vote_count: Option<VoteCountWire>,
}

#[derive(Debug, Default, Deserialize)]
struct VoteCountWire {
    #[serde(rename = "for", default)]
    for_votes: Value,
    #[serde(default)]
    against: Value,
}

/// Numeric coercion for tallies: numbers, numeric strings and booleans are accepted;
/// anything else, negative or non-finite becomes 0. Fractions are truncated.
pub fn coerce_count(value: &Value) -> u64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let t = s.trim();
            if t.is_empty() {
                0.0
            } else {
                t.parse::<f64>().unwrap_or(0.0)
            }
        }
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };
    if n.is_finite() && n > 0.0 {
        n.trunc() as u64
    } else {
        0
    }
}

/// Validate a search response: a JSON array of bills.
pub fn bills_from_value(value: Value) -> Result<Vec<Bill>, ParseError> {
    let wires: Vec<BillWire> = shape(value)?;
    let mut bills = Vec::with_capacity(wires.len());
    for (index, w) in wires.into_iter().enumerate() {
        let status = BillStatus::from_label(&w.status).ok_or_else(|| {
            ParseError::Shape(format!("bill {}: unknown status {:?}", index, w.status))
        })?;
        let votes = w.vote_count.unwrap_or_default();
        let id = w.id.trim();
        bills.push(Bill {
            id: if id.is_empty() { "bill".to_string() } else { id.to_string() },
            title: w.title,
            summary: w.summary,
            category: w.category,
            status,
            date: w.date,
            vote_count: VoteCount {
                for_votes: coerce_count(&votes.for_votes),
                against: coerce_count(&votes.against),
            },
        });
    }
    make_ids_unique(&mut bills);
    Ok(bills)
}

/// Suffix repeated ids with -2, -3, ... so every id is unique within the catalog.
fn make_ids_unique(bills: &mut [Bill]) {
    let mut seen: HashSet<String> = HashSet::with_capacity(bills.len());
    for bill in bills.iter_mut() {
        if seen.insert(bill.id.clone()) {
            continue;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}-{}", bill.id, n);
            if seen.insert(candidate.clone()) {
                log::debug!("gateway: duplicate bill id {} renamed to {}", bill.id, candidate);
                bill.id = candidate;
                break;
            }
            n += 1;
        }
    }
}

// --- analysis ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisWire {
    simplified_explanation: String,
    viewpoints: Viewpoints,
    impact_data: Vec<ImpactWire>,
    parliamentary_debate: Vec<DebateSegment>,
    media: Vec<MediaWire>,
    flashcards: Vec<Flashcard>,
    mind_map: MindMapWire,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImpactWire {
    name: String,
    #[serde(alias = "If Passed")]
    if_passed: f64,
    #[serde(alias = "If Not Passed")]
    if_not_passed: f64,
}

#[derive(Debug, Deserialize)]
struct MediaWire {
    #[serde(rename = "type")]
    kind: String,
    title: String,
    description: String,
    #[serde(default)]
    uri: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MindMapWire {
    central_topic: String,
    branches: Vec<BranchWire>,
}

#[derive(Debug, Deserialize)]
struct BranchWire {
    title: String,
    #[serde(default)]
    children: Option<Vec<String>>,
}

fn clamp_score(score: f64) -> f64 {
    score.clamp(-SCORE_LIMIT, SCORE_LIMIT)
}

/// Keep a news link only when it is an absolute http(s) URL.
fn news_uri(raw: Option<String>) -> Option<String> {
    let raw = raw?;
    let trimmed = raw.trim();
    match reqwest::Url::parse(trimmed) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Some(trimmed.to_string()),
        _ => {
            log::debug!("gateway: dropping invalid news uri {:?}", trimmed);
            None
        }
    }
}

/// Validate an analysis response object.
pub fn analysis_from_value(value: Value) -> Result<BillAnalysis, ParseError> {
    let w: AnalysisWire = shape(value)?;

    let media = w
        .media
        .into_iter()
        .enumerate()
        .map(|(index, m)| {
            let kind = MediaKind::from_label(&m.kind).ok_or_else(|| {
                ParseError::Shape(format!("media {}: unknown type {:?}", index, m.kind))
            })?;
            let uri = match kind {
                MediaKind::News => news_uri(m.uri),
                MediaKind::Video | MediaKind::Audio => None,
            };
            Ok(MediaItem {
                kind,
                title: m.title,
                description: m.description,
                uri,
            })
        })
        .collect::<Result<Vec<_>, ParseError>>()?;

    Ok(BillAnalysis {
        explanation: w.simplified_explanation,
        viewpoints: w.viewpoints,
        impact: w
            .impact_data
            .into_iter()
            .map(|p| ImpactPoint {
                name: p.name,
                if_passed: clamp_score(p.if_passed),
                if_not_passed: clamp_score(p.if_not_passed),
            })
            .collect(),
        debate: w.parliamentary_debate,
        media,
        flashcards: w.flashcards,
        mind_map: MindMap {
            central_topic: w.mind_map.central_topic,
            branches: w
                .mind_map
                .branches
                .into_iter()
                .map(|b| MindMapBranch {
                    title: b.title,
                    children: b.children.unwrap_or_default(),
                })
                .collect(),
        },
    })
}

// --- discussion ---

/// A generated reply before it is stamped into a thread.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReplyDraft {
    pub name: String,
    pub text: String,
}

/// Validate a discussion response: an array of {name, text}. Blank entries are skipped.
pub fn replies_from_value(value: Value) -> Result<Vec<ReplyDraft>, ParseError> {
    let drafts: Vec<ReplyDraft> = shape(value)?;
    Ok(drafts
        .into_iter()
        .filter(|d| !d.name.trim().is_empty() && !d.text.trim().is_empty())
        .map(|d| ReplyDraft {
            name: d.name.trim().to_string(),
            text: d.text.trim().to_string(),
        })
        .collect())
}
