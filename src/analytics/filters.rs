use serde::Deserialize;

use crate::domain::{Alert, AlertKind, Animal, AnimalStatus};

/// Animal table filter: free-text over name and tag number, plus status.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnimalFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<AnimalStatus>,
}

impl AnimalFilter {
    pub fn matches(&self, animal: &Animal) -> bool {
        let status_ok = self.status.map_or(true, |s| animal.status == s);
        let search_ok = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(q) => {
                let q = q.to_lowercase();
                animal.name.to_lowercase().contains(&q)
                    || animal.tag_number.to_lowercase().contains(&q)
            }
        };
        status_ok && search_ok
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum KindFilter {
    #[default]
    #[serde(rename = "todos")]
    All,
    #[serde(rename = "parto")]
    Birth,
    #[serde(rename = "producao")]
    Production,
    #[serde(rename = "inseminacao")]
    Insemination,
    #[serde(rename = "sanitario")]
    Sanitary,
}

impl KindFilter {
    fn kind(self) -> Option<AlertKind> {
        match self {
            KindFilter::All => None,
            KindFilter::Birth => Some(AlertKind::Birth),
            KindFilter::Production => Some(AlertKind::Production),
            KindFilter::Insemination => Some(AlertKind::Insemination),
            KindFilter::Sanitary => Some(AlertKind::Sanitary),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum StatusFilter {
    #[serde(rename = "todos")]
    All,
    #[default]
    #[serde(rename = "pendentes")]
    Pending,
    #[serde(rename = "resolvidos")]
    Resolved,
}

/// Alert list filter. Defaults to pending alerts of every kind.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct AlertFilter {
    #[serde(default, rename = "tipo")]
    pub kind: KindFilter,
    #[serde(default)]
    pub status: StatusFilter,
}

impl AlertFilter {
    pub fn matches(&self, alert: &Alert) -> bool {
        let kind_ok = self.kind.kind().map_or(true, |k| alert.kind == k);
        let status_ok = match self.status {
            StatusFilter::All => true,
            StatusFilter::Pending => !alert.resolved,
            StatusFilter::Resolved => alert.resolved,
        };
        kind_ok && status_ok
    }
}
