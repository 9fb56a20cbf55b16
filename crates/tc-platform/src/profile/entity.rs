//! Culture and Preference Entities
//!
//! Per-user questionnaires, one record each per user. Every field is
//! optional in storage; upserts merge the fields they carry and the
//! overview fills remaining gaps with zero values.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use utoipa::ToSchema;

/// Two-flag motivation group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Motivation {
    pub solving_technical_problems: bool,
    pub building_products: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CareerTrack {
    pub individual_contributor: bool,
    pub manager: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct WorkingEnvironment {
    pub clear_roles_responsibilites: bool,
    pub employees_carry_out_multiple_tasks: bool,
}

/// Importance scale used by remote-work and quiet-office answers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Importance {
    pub very_important: bool,
    pub important: bool,
    pub not_important: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SizeFit {
    pub ideal: bool,
    pub yes: bool,
    pub no: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CompanySizePreferences {
    pub seed: SizeFit,
    pub early: SizeFit,
    pub mid_size: SizeFit,
    pub large: SizeFit,
    pub very_large: SizeFit,
    pub massive: SizeFit,
}

/// Work-culture answers for one user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Culture {
    /// Always taken from the authenticated caller
    #[serde(default)]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motivation: Option<Motivation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub career_track_next_five_years: Option<CareerTrack>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_environment: Option<WorkingEnvironment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_working_policy: Option<Importance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiet_office: Option<Importance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interested_markets: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_interested_markets: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interested_technologies: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_interested_technologies: Option<Vec<String>>,
}

/// Job-search preferences for one user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Preference {
    /// Always taken from the authenticated caller
    #[serde(default)]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub where_in_job_search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsorship_requirement_to_work_in_us: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legally_to_work_in_us: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_locations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_to_work_remotely: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_salary_currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_salary_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_size_preferences: Option<CompanySizePreferences>,
}

/// A record stored at most once per user, keyed by `user_id`
pub trait ProfileRecord: Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + 'static {
    const ENTITY: &'static str;
    const COLLECTION: &'static str;

    fn user_id(&self) -> &str;

    fn set_user_id(&mut self, user_id: &str);

    /// Overwrite the fields `update` carries, keep the rest
    fn merge(&mut self, update: Self);
}

macro_rules! merge_fields {
    ($target:expr, $update:expr, $($field:ident),+ $(,)?) => {
        $(
            if $update.$field.is_some() {
                $target.$field = $update.$field;
            }
        )+
    };
}

impl ProfileRecord for Culture {
    const ENTITY: &'static str = "Culture";
    const COLLECTION: &'static str = "culture";

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn set_user_id(&mut self, user_id: &str) {
        self.user_id = user_id.to_string();
    }

    fn merge(&mut self, update: Self) {
        merge_fields!(
            self,
            update,
            description,
            motivation,
            career_track_next_five_years,
            working_environment,
            remote_working_policy,
            quiet_office,
            interested_markets,
            not_interested_markets,
            interested_technologies,
            not_interested_technologies,
        );
    }
}

impl ProfileRecord for Preference {
    const ENTITY: &'static str = "Preference";
    const COLLECTION: &'static str = "preference";

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn set_user_id(&mut self, user_id: &str) {
        self.user_id = user_id.to_string();
    }

    fn merge(&mut self, update: Self) {
        merge_fields!(
            self,
            update,
            where_in_job_search,
            sponsorship_requirement_to_work_in_us,
            legally_to_work_in_us,
            job_type,
            preferred_locations,
            open_to_work_remotely,
            desired_salary_currency,
            desired_salary_amount,
            company_size_preferences,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_nested_group_fills_missing_flags() {
        let culture: Culture = serde_json::from_value(serde_json::json!({
            "user_id": "u1",
            "quiet_office": { "important": true }
        }))
        .unwrap();

        let quiet = culture.quiet_office.unwrap();
        assert!(quiet.important);
        assert!(!quiet.very_important);
        assert!(culture.motivation.is_none());
    }

    #[test]
    fn test_merge_keeps_untouched_fields() {
        let mut stored = Culture {
            user_id: "u1".to_string(),
            description: Some("builder".to_string()),
            interested_markets: Some(vec!["fintech".to_string()]),
            ..Culture::default()
        };

        stored.merge(Culture {
            description: Some("manager".to_string()),
            ..Culture::default()
        });

        assert_eq!(stored.description.as_deref(), Some("manager"));
        assert_eq!(stored.interested_markets, Some(vec!["fintech".to_string()]));
        assert_eq!(stored.user_id, "u1");
    }

    #[test]
    fn test_unset_fields_are_not_stored() {
        let pref = Preference {
            user_id: "u1".to_string(),
            job_type: Some("full-time".to_string()),
            ..Preference::default()
        };
        let doc = bson::to_document(&pref).unwrap();
        assert_eq!(doc.len(), 2);
        assert!(doc.get("company_size_preferences").is_none());
    }
}
