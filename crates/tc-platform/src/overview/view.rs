//! Overview read model
//!
//! One flat record per user combining the user, culture and preference
//! rows. Every field is present: missing values become `""`, `0`, `false`,
//! `[]` or an all-false group.

use serde::Serialize;
use utoipa::ToSchema;

use crate::profile::entity::{
    CareerTrack, CompanySizePreferences, Culture, Importance, Motivation, Preference, WorkingEnvironment,
};
use crate::user::entity::{PrivacyMode, User};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OverviewView {
    pub user_id: String,
    pub phone_number: String,
    pub email: String,
    pub full_name: String,
    pub current_company: String,
    pub cv: String,
    pub is_community_owner: bool,
    pub city: String,
    pub current_role: String,
    pub years_of_experience: u32,
    pub student_or_new_graduate: bool,
    pub currently_employed: bool,
    pub linkedin_profile: String,
    pub term_and_conditions: bool,
    pub privacy_mode: PrivacyMode,
    pub user_name: String,
    pub profile_pic: String,

    pub description: String,
    pub motivation: Motivation,
    pub career_track_next_five_years: CareerTrack,
    pub working_environment: WorkingEnvironment,
    pub remote_working_policy: Importance,
    pub quiet_office: Importance,
    pub interested_markets: Vec<String>,
    pub not_interested_markets: Vec<String>,
    pub interested_technologies: Vec<String>,
    pub not_interested_technologies: Vec<String>,

    pub where_in_job_search: String,
    pub sponsorship_requirement_to_work_in_us: bool,
    pub legally_to_work_in_us: bool,
    pub job_type: String,
    pub preferred_locations: Vec<String>,
    pub open_to_work_remotely: bool,
    pub desired_salary_currency: String,
    pub desired_salary_amount: f64,
    pub company_size_preferences: CompanySizePreferences,
}

impl OverviewView {
    pub fn compose(user: User, culture: Option<Culture>, preference: Option<Preference>) -> Self {
        let c = culture.unwrap_or_default();
        let p = preference.unwrap_or_default();

        Self {
            user_id: user.id,
            phone_number: user.phone_number.unwrap_or_default(),
            email: user.email,
            full_name: user.full_name,
            current_company: user.current_company.unwrap_or_default(),
            cv: user.cv.unwrap_or_default(),
            is_community_owner: user.is_community_owner,
            city: user.city.unwrap_or_default(),
            current_role: user.current_role.unwrap_or_default(),
            years_of_experience: user.years_of_experience.unwrap_or_default(),
            student_or_new_graduate: user.student_or_new_graduate.unwrap_or_default(),
            currently_employed: user.currently_employed.unwrap_or_default(),
            linkedin_profile: user.linkedin_profile.unwrap_or_default(),
            term_and_conditions: user.term_and_conditions,
            privacy_mode: user.privacy_mode,
            user_name: user.user_name.unwrap_or_default(),
            profile_pic: user.profile_pic.unwrap_or_default(),

            description: c.description.unwrap_or_default(),
            motivation: c.motivation.unwrap_or_default(),
            career_track_next_five_years: c.career_track_next_five_years.unwrap_or_default(),
            working_environment: c.working_environment.unwrap_or_default(),
            remote_working_policy: c.remote_working_policy.unwrap_or_default(),
            quiet_office: c.quiet_office.unwrap_or_default(),
            interested_markets: c.interested_markets.unwrap_or_default(),
            not_interested_markets: c.not_interested_markets.unwrap_or_default(),
            interested_technologies: c.interested_technologies.unwrap_or_default(),
            not_interested_technologies: c.not_interested_technologies.unwrap_or_default(),

            where_in_job_search: p.where_in_job_search.unwrap_or_default(),
            sponsorship_requirement_to_work_in_us: p.sponsorship_requirement_to_work_in_us.unwrap_or_default(),
            legally_to_work_in_us: p.legally_to_work_in_us.unwrap_or_default(),
            job_type: p.job_type.unwrap_or_default(),
            preferred_locations: p.preferred_locations.unwrap_or_default(),
            open_to_work_remotely: p.open_to_work_remotely.unwrap_or_default(),
            desired_salary_currency: p.desired_salary_currency.unwrap_or_default(),
            desired_salary_amount: p.desired_salary_amount.unwrap_or_default(),
            company_size_preferences: p.company_size_preferences.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_filled_json_shape() {
        let view = OverviewView::compose(User::new("z@x.com", "h", "Zed"), None, None);
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["privacy_mode"], "public");
        assert_eq!(json["years_of_experience"], 0);
        assert_eq!(json["interested_markets"], serde_json::json!([]));
        assert_eq!(json["company_size_preferences"]["massive"]["ideal"], false);
        assert_eq!(json["quiet_office"]["not_important"], false);
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_culture_fields_come_from_culture() {
        let culture = Culture {
            interested_markets: Some(vec!["climate".to_string()]),
            ..Culture::default()
        };
        let view = OverviewView::compose(User::new("z@x.com", "h", "Zed"), Some(culture), None);
        assert_eq!(view.interested_markets, vec!["climate".to_string()]);
    }
}
