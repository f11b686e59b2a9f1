use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// `chat id -> profile`, in first-contact order.
pub type Profiles = IndexMap<i64, Profile>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizAttempt {
    #[serde(default)]
    pub answers: Vec<String>,
    #[serde(default)]
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "user_id")]
    pub display_id: String,
    #[serde(rename = "tests", default)]
    pub attempts: IndexMap<String, QuizAttempt>,
    #[serde(rename = "tanga", default)]
    pub balance: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "class", default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
}

/// Onboarding fields in the order they are collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Name,
    Age,
    Phone,
    Grade,
    Region,
    District,
}

impl ProfileField {
    pub const ALL: [ProfileField; 6] = [
        ProfileField::Name,
        ProfileField::Age,
        ProfileField::Phone,
        ProfileField::Grade,
        ProfileField::Region,
        ProfileField::District,
    ];
}

impl Profile {
    pub fn new(display_id: String) -> Self {
        Self {
            display_id,
            attempts: IndexMap::new(),
            balance: 0,
            name: None,
            age: None,
            phone: None,
            grade: None,
            region: None,
            district: None,
        }
    }

    pub fn has(&self, field: ProfileField) -> bool {
        match field {
            ProfileField::Name => self.name.is_some(),
            ProfileField::Age => self.age.is_some(),
            ProfileField::Phone => self.phone.is_some(),
            ProfileField::Grade => self.grade.is_some(),
            ProfileField::Region => self.region.is_some(),
            ProfileField::District => self.district.is_some(),
        }
    }

    pub fn next_missing(&self) -> Option<ProfileField> {
        ProfileField::ALL.into_iter().find(|field| !self.has(*field))
    }

    pub fn is_complete(&self) -> bool {
        self.next_missing().is_none()
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("-")
    }

    /// Region changes invalidate the district, which must be chosen again.
    pub fn set_region(&mut self, region: String) {
        self.region = Some(region);
        self.district = None;
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn or_dash<T: ToString>(value: &Option<T>) -> String {
            value.as_ref().map(ToString::to_string).unwrap_or_else(|| "-".to_owned())
        }

        write!(
            f,
            "Ism: {}\nYosh: {}\nTelefon: {}\nSinf: {}\nViloyat: {}\nTuman: {}\nFoydalanuvchi ID: {}\nTanga: {}",
            self.display_name(),
            or_dash(&self.age),
            or_dash(&self.phone),
            or_dash(&self.grade),
            or_dash(&self.region),
            or_dash(&self.district),
            self.display_id,
            self.balance
        )
    }
}

/// Next display id: one past the largest numeric id, zero-padded to five digits.
pub fn next_display_id(profiles: &Profiles) -> String {
    let max_id = profiles
        .values()
        .filter_map(|profile| profile.display_id.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    format!("{:05}", max_id + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_ids_are_dense_and_padded() {
        let mut profiles = Profiles::new();
        assert_eq!(next_display_id(&profiles), "00001");

        profiles.insert(10, Profile::new("00001".to_owned()));
        profiles.insert(20, Profile::new("00007".to_owned()));
        assert_eq!(next_display_id(&profiles), "00008");
    }

    #[test]
    fn onboarding_fields_are_requested_in_order() {
        let mut profile = Profile::new("00001".to_owned());
        assert_eq!(profile.next_missing(), Some(ProfileField::Name));

        profile.name = Some("Aziz".to_owned());
        profile.age = Some(14);
        assert_eq!(profile.next_missing(), Some(ProfileField::Phone));

        profile.phone = Some("+998901234567".to_owned());
        profile.grade = Some(8);
        profile.region = Some("Toshkent".to_owned());
        profile.district = Some("Chilonzor tuman".to_owned());
        assert!(profile.is_complete());
    }

    #[test]
    fn changing_region_clears_district() {
        let mut profile = Profile::new("00001".to_owned());
        profile.region = Some("Toshkent".to_owned());
        profile.district = Some("Chilonzor tuman".to_owned());

        profile.set_region("Samarqand".to_owned());

        assert_eq!(profile.region.as_deref(), Some("Samarqand"));
        assert_eq!(profile.district, None);
        assert_eq!(profile.next_missing(), Some(ProfileField::Name));
    }

    #[test]
    fn missing_optional_fields_are_not_written() {
        let profile = Profile::new("00003".to_owned());
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json, serde_json::json!({"user_id": "00003", "tests": {}, "tanga": 0}));
    }
}
