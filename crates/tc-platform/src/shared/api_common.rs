//! Common API types and utilities

use utoipa::{ToSchema, IntoParams};
use serde::{Deserialize, Serialize};

/// Largest page a listing endpoint will return
pub const MAX_PAGE_SIZE: i64 = 100;

pub(crate) mod string_or_number {
    use serde::{Deserialize, Deserializer, de};

    pub fn deserialize_u64_opt<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StringOrNum {
            Num(u64),
            Str(String),
        }

        match Option::<StringOrNum>::deserialize(deserializer)? {
            Some(StringOrNum::Num(n)) => Ok(Some(n)),
            Some(StringOrNum::Str(s)) => s.parse().map(Some).map_err(de::Error::custom),
            None => Ok(None),
        }
    }
}

/// Offset/limit paging, accepted as numbers or numeric strings
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    #[serde(default, deserialize_with = "string_or_number::deserialize_u64_opt")]
    offset: Option<u64>,
    #[serde(default, deserialize_with = "string_or_number::deserialize_u64_opt")]
    limit: Option<u64>,
}

impl PageParams {
    pub fn new(offset: u64, limit: u64) -> Self {
        Self {
            offset: Some(offset),
            limit: Some(limit),
        }
    }

    pub fn offset(&self) -> u64 {
        self.offset.unwrap_or(0)
    }

    /// Clamped to `1..=MAX_PAGE_SIZE`, default 20
    pub fn limit(&self) -> i64 {
        self.limit
            .map(|l| (l.min(MAX_PAGE_SIZE as u64) as i64).max(1))
            .unwrap_or(20)
    }
}

/// Acknowledgement body for operations with nothing else to return
#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
