use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domains::posts::domain::{author_id, required_text};
use crate::domains::users::{AuthorSummary, UserId};
use crate::domains::{is_unfiltered, FlexibleNumber, ServiceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampusServiceId(pub i64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampusService {
    pub id: CampusServiceId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub is_active: bool,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampusServiceWithAuthor {
    #[serde(flatten)]
    pub service: CampusService,
    pub author: AuthorSummary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCampusService {
    pub title: String,
    pub description: String,
    pub category: String,
    pub author_id: UserId,
}

/// Body accepted by `POST /api/services`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSubmission {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub author_id: Option<FlexibleNumber>,
}

impl ServiceSubmission {
    pub fn validate(self) -> Result<NewCampusService, ServiceError> {
        let title = required_text(self.title, "Title is required")?;
        let category = required_text(self.category, "Category is required")?;
        let author_id = author_id(self.author_id.as_ref())?;
        Ok(NewCampusService {
            title,
            description: self.description.unwrap_or_default().trim().to_string(),
            category,
            author_id,
        })
    }
}

/// Exact category match; `All` or an empty selection keeps every service.
pub fn filter_by_category(
    services: Vec<CampusServiceWithAuthor>,
    category: Option<&str>,
) -> Vec<CampusServiceWithAuthor> {
    if is_unfiltered(category) {
        return services;
    }
    let wanted = category.unwrap_or_default().trim();
    services
        .into_iter()
        .filter(|entry| entry.service.category == wanted)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_is_optional() {
        let submission = ServiceSubmission {
            title: Some("Calculus tutoring".to_string()),
            description: None,
            category: Some("Tutoring".to_string()),
            author_id: Some(FlexibleNumber::Integer(2)),
        };
        let service = submission.validate().expect("valid service");
        assert_eq!(service.description, "");
        assert_eq!(service.category, "Tutoring");
    }

    #[test]
    fn category_is_required() {
        let submission = ServiceSubmission {
            title: Some("Calculus tutoring".to_string()),
            category: Some(" ".to_string()),
            author_id: Some(FlexibleNumber::Integer(2)),
            ..ServiceSubmission::default()
        };
        let err = submission.validate().expect_err("category required");
        assert_eq!(err.to_string(), "Category is required");
    }
}
