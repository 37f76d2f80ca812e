use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::Identified;

const DEMO_CATEGORIES: [&str; 3] = ["alpha", "beta", "gamma"];

/// Record entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub priority: i64,
    pub created_at: DateTime<Utc>,
}

impl Record {
    pub fn new(req: CreateRecordRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: req.name.trim().to_string(),
            category: req.category.unwrap_or_else(|| "general".to_string()),
            priority: req.priority.unwrap_or_default(),
            created_at: Utc::now(),
        }
    }

    /// Deterministic-looking demo data for local development.
    pub fn demo(index: usize) -> Self {
        Self::new(CreateRecordRequest {
            name: format!("Record {:03}", index + 1),
            category: Some(DEMO_CATEGORIES[index % DEMO_CATEGORIES.len()].to_string()),
            priority: Some((index % 5) as i64),
        })
    }
}

impl Identified for Record {
    fn cursor(&self) -> String {
        self.id.to_string()
    }
}

/// Request DTO for creating a record
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRecordRequest {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: Option<i64>,
}

/// Slim projection served by the summaries listing
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecordSummary {
    pub id: Uuid,
    pub name: String,
}

impl From<Record> for RecordSummary {
    fn from(r: Record) -> Self {
        Self {
            id: r.id,
            name: r.name,
        }
    }
}
