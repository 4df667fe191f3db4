//! Signed-in user profile (`GET /api/auth/me`).

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// Profile of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, rename = "avartaImage")]
    pub avatar_image: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub shipper: Option<String>,
}

impl UserProfile {
    /// "First Last", falling back to the user name.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.user_name.clone().unwrap_or_default()
        } else {
            full.to_owned()
        }
    }

    /// Delivery staff have a shipper record attached.
    #[must_use]
    pub fn is_shipper(&self) -> bool {
        self.shipper.as_deref().is_some_and(|s| !s.is_empty())
            || self.role.as_deref() == Some("shipper")
    }
}

/// Fields accepted by `PATCH /api/users/edit/:id`. Unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ProfileUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.phone_number.is_none()
            && self.address.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_deserializes_wire_names() {
        let json = r#"{
            "_id": "u1",
            "firstName": "Minh",
            "lastName": "Tran",
            "avartaImage": "https://cdn.example/u1.png",
            "email": "minh@example.com",
            "phoneNumber": "0901234567",
            "role": "shipper",
            "address": "",
            "shipper": "s1"
        }"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.display_name(), "Minh Tran");
        assert_eq!(profile.avatar_image.as_deref(), Some("https://cdn.example/u1.png"));
        assert!(profile.is_shipper());
    }

    #[test]
    fn test_display_name_falls_back_to_user_name() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"_id":"u2","userName":"lan@example.com"}"#).unwrap();
        assert_eq!(profile.display_name(), "lan@example.com");
        assert!(!profile.is_shipper());
    }

    #[test]
    fn test_profile_update_skips_unset_fields() {
        let update = ProfileUpdate {
            phone_number: Some("0907654321".to_owned()),
            ..ProfileUpdate::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"phoneNumber": "0907654321"})
        );
        assert!(ProfileUpdate::default().is_empty());
    }
}
