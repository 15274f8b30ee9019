//! The one meaningful piece of business logic: normalize, then persist.

use chrono::Utc;

use crate::error::ApiError;
use crate::normalizer::PhoneNormalizer;
use crate::store::{PhoneRecord, PhoneStore};

#[derive(Clone)]
pub struct PhoneService {
    store: PhoneStore,
    normalizer: PhoneNormalizer,
}

impl PhoneService {
    pub fn new(store: PhoneStore) -> Self {
        Self {
            store,
            normalizer: PhoneNormalizer::new(),
        }
    }

    /// Validates `raw_number` (optionally constrained to `country_hint`) and
    /// writes its canonical form. With an id the write is an upsert keyed on
    /// that id; without one a fresh record is created. An invalid number
    /// leaves the store untouched; a canonical number held by another record
    /// is a conflict.
    pub async fn save_formatted_phone(
        &self,
        id: Option<i64>,
        raw_number: &str,
        country_hint: &str,
    ) -> Result<PhoneRecord, ApiError> {
        let phone = self
            .normalizer
            .normalize(raw_number, country_hint)
            .ok_or_else(|| ApiError::Validation("number invalid".to_string()))?;

        let record = self
            .store
            .upsert(id, &phone.formatted, &phone.country_iso3, Utc::now())
            .await?;
        Ok(record)
    }

    /// Replaces an existing record's number (and derived country) in place.
    pub async fn update_phone(
        &self,
        id: i64,
        raw_number: &str,
        country_hint: &str,
    ) -> Result<PhoneRecord, ApiError> {
        let phone = self
            .normalizer
            .normalize(raw_number, country_hint)
            .ok_or_else(|| ApiError::Validation("number invalid".to_string()))?;

        self.store
            .update(id, &phone.formatted, &phone.country_iso3, Utc::now())
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("phone {id} not found")))
    }
}
