//! User Entity
//!
//! The identity record every other aggregate references by id.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::error::{PlatformError, Result};
use crate::TsidGenerator;

/// Profile visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyMode {
    #[default]
    Public,
    Private,
}

impl PrivacyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,

    /// Unique, stored lowercased
    pub email: String,

    pub password_hash: String,

    #[serde(default)]
    pub full_name: String,

    /// Unique when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years_of_experience: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_or_new_graduate: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currently_employed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,

    #[serde(default)]
    pub privacy_mode: PrivacyMode,

    #[serde(default)]
    pub is_community_owner: bool,

    #[serde(default)]
    pub term_and_conditions: bool,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: &str, password_hash: impl Into<String>, full_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: TsidGenerator::generate(),
            email: normalize_email(email),
            password_hash: password_hash.into(),
            full_name: full_name.into(),
            user_name: None,
            phone_number: None,
            current_company: None,
            cv: None,
            city: None,
            current_role: None,
            years_of_experience: None,
            student_or_new_graduate: None,
            currently_employed: None,
            linkedin_profile: None,
            profile_pic: None,
            privacy_mode: PrivacyMode::Public,
            is_community_owner: false,
            term_and_conditions: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a patch in place; mirrors the `$set` the Mongo store issues
    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(v) = &patch.email {
            self.email = v.clone();
        }
        if let Some(v) = &patch.password_hash {
            self.password_hash = v.clone();
        }
        if let Some(v) = &patch.full_name {
            self.full_name = v.clone();
        }
        if let Some(v) = &patch.user_name {
            self.user_name = Some(v.clone());
        }
        if let Some(v) = &patch.phone_number {
            self.phone_number = Some(v.clone());
        }
        if let Some(v) = &patch.current_company {
            self.current_company = Some(v.clone());
        }
        if let Some(v) = &patch.cv {
            self.cv = Some(v.clone());
        }
        if let Some(v) = &patch.city {
            self.city = Some(v.clone());
        }
        if let Some(v) = &patch.current_role {
            self.current_role = Some(v.clone());
        }
        if let Some(v) = patch.years_of_experience {
            self.years_of_experience = Some(v);
        }
        if let Some(v) = patch.student_or_new_graduate {
            self.student_or_new_graduate = Some(v);
        }
        if let Some(v) = patch.currently_employed {
            self.currently_employed = Some(v);
        }
        if let Some(v) = &patch.linkedin_profile {
            self.linkedin_profile = Some(v.clone());
        }
        if let Some(v) = &patch.profile_pic {
            self.profile_pic = Some(v.clone());
        }
        if let Some(v) = patch.privacy_mode {
            self.privacy_mode = v;
        }
        if let Some(v) = patch.is_community_owner {
            self.is_community_owner = v;
        }
        if let Some(v) = patch.term_and_conditions {
            self.term_and_conditions = v;
        }
        self.updated_at = Utc::now();
    }

    pub fn sort_value(&self, field: UserSortField) -> SortValue {
        match field {
            UserSortField::FullName => SortValue::Text(Some(self.full_name.clone())),
            UserSortField::UserName => SortValue::Text(self.user_name.clone()),
            UserSortField::Email => SortValue::Text(Some(self.email.clone())),
            UserSortField::CurrentRole => SortValue::Text(self.current_role.clone()),
            UserSortField::CurrentCompany => SortValue::Text(self.current_company.clone()),
            UserSortField::City => SortValue::Text(self.city.clone()),
            UserSortField::YearsOfExperience => SortValue::Number(self.years_of_experience.map(i64::from)),
            UserSortField::CreatedAt => SortValue::Time(self.created_at),
        }
    }
}

/// Emails compare case-insensitively; the unique index sees the lowercased form
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Partial update; `None` fields are left untouched
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cv: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_of_experience: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_or_new_graduate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currently_employed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy_mode: Option<PrivacyMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_community_owner: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_and_conditions: Option<bool>,
}

/// User fields the overview listing may sort on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSortField {
    FullName,
    UserName,
    Email,
    CurrentRole,
    CurrentCompany,
    City,
    YearsOfExperience,
    CreatedAt,
}

impl UserSortField {
    pub const ALLOWED: &'static [&'static str] = &[
        "full_name",
        "user_name",
        "email",
        "current_role",
        "current_company",
        "city",
        "years_of_experience",
        "created_at",
    ];

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "full_name" => Ok(Self::FullName),
            "user_name" => Ok(Self::UserName),
            "email" => Ok(Self::Email),
            "current_role" => Ok(Self::CurrentRole),
            "current_company" => Ok(Self::CurrentCompany),
            "city" => Ok(Self::City),
            "years_of_experience" => Ok(Self::YearsOfExperience),
            "created_at" => Ok(Self::CreatedAt),
            other => Err(PlatformError::validation(format!(
                "Unsupported sort field '{}', expected one of: {}",
                other,
                Self::ALLOWED.join(", ")
            ))),
        }
    }

    /// Stored field name
    pub fn field(&self) -> &'static str {
        match self {
            Self::FullName => "full_name",
            Self::UserName => "user_name",
            Self::Email => "email",
            Self::CurrentRole => "current_role",
            Self::CurrentCompany => "current_company",
            Self::City => "city",
            Self::YearsOfExperience => "years_of_experience",
            Self::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "asc" | "1" => Ok(Self::Asc),
            "desc" | "-1" => Ok(Self::Desc),
            other => Err(PlatformError::validation(format!(
                "Unsupported sort order '{}', expected asc or desc",
                other
            ))),
        }
    }

    pub fn as_i32(&self) -> i32 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserSort {
    pub field: UserSortField,
    pub direction: SortDirection,
}

/// Comparable projection of one sort field. Missing values order first
/// ascending, as in MongoDB.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortValue {
    Text(Option<String>),
    Number(Option<i64>),
    Time(DateTime<Utc>),
}

/// User as returned to clients, without credentials
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserView {
    pub id: String,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cv: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_of_experience: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_or_new_graduate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currently_employed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
    pub privacy_mode: PrivacyMode,
    pub is_community_owner: bool,
    pub term_and_conditions: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            user_name: user.user_name,
            phone_number: user.phone_number,
            current_company: user.current_company,
            cv: user.cv,
            city: user.city,
            current_role: user.current_role,
            years_of_experience: user.years_of_experience,
            student_or_new_graduate: user.student_or_new_graduate,
            currently_employed: user.currently_employed,
            linkedin_profile: user.linkedin_profile,
            profile_pic: user.profile_pic,
            privacy_mode: user.privacy_mode,
            is_community_owner: user.is_community_owner,
            term_and_conditions: user.term_and_conditions,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
