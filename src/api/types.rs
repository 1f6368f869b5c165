//! Wire types for the dashboard backend
//!
//! Shapes are owned by the backend; these types only read what the dashboard
//! needs and tolerate missing optional fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current user, with the optional embedded profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: u64,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub profile: Option<ProfileDetails>,
}

impl UserProfile {
    /// Name to greet the user with, falling back to the email
    pub fn display_name(&self) -> String {
        if let Some(name) = self.profile.as_ref().and_then(|p| p.display_name.clone()) {
            return name;
        }
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            _ => self.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDetails {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub relationship_status: Option<String>,
}

/// Pairing between the user and their partner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoupleInfo {
    pub id: u64,
    #[serde(default)]
    pub partner: Option<PartnerSummary>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerSummary {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Outstanding or accepted partner invitation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub id: u64,
    pub status: String,
    #[serde(default)]
    pub invitee_email: Option<String>,
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
}

/// One entry of the category catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    /// The user's own progress through the category
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub is_complete: bool,
}

/// Completion of one side of the pairing for a category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideStatus {
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub progress: f64,
}

/// Per-category partner status
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerStatusPayload {
    #[serde(default)]
    pub user_status: SideStatus,
    #[serde(default)]
    pub partner_status: SideStatus,
    #[serde(default)]
    pub both_complete: bool,
}

/// Compatibility figures for a category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultBody {
    /// Absent until the backend has scored the category
    pub score: Option<f64>,
    #[serde(default)]
    pub compatibility_score: Option<f64>,
    #[serde(default)]
    pub emotional_score: Option<f64>,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Per-category couple result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoupleResultPayload {
    /// Absent when the backend has nothing computed yet
    #[serde(default)]
    pub result: Option<ResultBody>,
    /// Number of attempts the couple has made
    #[serde(default)]
    pub attempt: u32,
    #[serde(default)]
    pub recommended_resources: Vec<Resource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub counselor_name: Option<String>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_profile_with_details() {
        let json = r#"{
            "id": 7,
            "email": "sam@example.com",
            "firstName": "Sam",
            "profile": {"displayName": "Sammy"}
        }"#;
        let user: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.display_name(), "Sammy");
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut user: UserProfile = serde_json::from_str(r#"{"id": 1, "email": "a@b.c"}"#).unwrap();
        assert_eq!(user.display_name(), "a@b.c");

        user.first_name = Some("Alex".to_string());
        assert_eq!(user.display_name(), "Alex");

        user.last_name = Some("Kim".to_string());
        assert_eq!(user.display_name(), "Alex Kim");
    }

    #[test]
    fn test_decode_category_defaults() {
        let cat: Category = serde_json::from_str(r#"{"id": 3, "name": "Finances"}"#).unwrap();
        assert_eq!(cat.progress, 0.0);
        assert!(!cat.is_complete);
        assert!(cat.color.is_none());
    }

    #[test]
    fn test_decode_partner_status() {
        let json = r#"{
            "userStatus": {"completed": true, "progress": 100},
            "partnerStatus": {"completed": false, "progress": 40},
            "bothComplete": false
        }"#;
        let status: PartnerStatusPayload = serde_json::from_str(json).unwrap();
        assert!(status.user_status.completed);
        assert!(!status.partner_status.completed);
        assert_eq!(status.partner_status.progress, 40.0);
    }

    #[test]
    fn test_decode_couple_result() {
        let json = r#"{
            "result": {
                "score": 82.5,
                "compatibilityScore": 80,
                "emotionalScore": 75,
                "insights": ["Talk more"],
                "updatedAt": "2026-03-01T10:00:00Z"
            },
            "attempt": 2,
            "recommendedResources": [{"title": "Budgeting together"}]
        }"#;
        let payload: CoupleResultPayload = serde_json::from_str(json).unwrap();
        let result = payload.result.unwrap();
        assert_eq!(result.score, Some(82.5));
        assert_eq!(result.compatibility_score, Some(80.0));
        assert_eq!(payload.attempt, 2);
        assert_eq!(payload.recommended_resources.len(), 1);
        assert!(result.updated_at.is_some());
    }

    #[test]
    fn test_decode_couple_result_without_score() {
        let empty: CoupleResultPayload = serde_json::from_str("{}").unwrap();
        assert!(empty.result.is_none());

        let unscored: CoupleResultPayload = serde_json::from_str(r#"{"result": {"insights": []}}"#).unwrap();
        assert_eq!(unscored.result.unwrap().score, None);
    }
}
