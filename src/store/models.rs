use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ObjectId;

/// A registered user. Field names on the wire match the original API
/// (`_id`); the password hash is skipped during serialization and can
/// never appear in a response body.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub avatar: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// Weather bucket a clothing item is suited for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    Hot,
    Warm,
    Cold,
}

impl Weather {
    pub fn as_str(self) -> &'static str {
        match self {
            Weather::Hot => "hot",
            Weather::Warm => "warm",
            Weather::Cold => "cold",
        }
    }
}

impl FromStr for Weather {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hot" => Ok(Weather::Hot),
            "warm" => Ok(Weather::Warm),
            "cold" => Ok(Weather::Cold),
            other => Err(format!("unknown weather type: {:?}", other)),
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A clothing item. `likes` has set semantics: deduplicated user ids,
/// order not meaningful.
#[derive(Debug, Clone, Serialize)]
pub struct ClothingItem {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub weather: Weather,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub owner: ObjectId,
    pub likes: Vec<ObjectId>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_user() -> User {
        User {
            id: "5d8b8592978f8bd833ca8133".parse().unwrap(),
            name: "Al".to_string(),
            avatar: "https://example.com/a.png".to_string(),
            email: "a@a.com".to_string(),
            password_hash: "$2b$10$secret".to_string(),
        }
    }

    #[test]
    fn user_serialization_never_includes_the_password() {
        let value = serde_json::to_value(sample_user()).unwrap();
        assert_eq!(value["_id"], "5d8b8592978f8bd833ca8133");
        assert_eq!(value["name"], "Al");
        assert!(value.get("password").is_none());
        assert!(value.get("password_hash").is_none());
    }

    #[test]
    fn weather_round_trips_lowercase() {
        assert_eq!(serde_json::to_value(Weather::Hot).unwrap(), json!("hot"));
        assert_eq!("cold".parse::<Weather>().unwrap(), Weather::Cold);
        assert!("sunny".parse::<Weather>().is_err());
        assert!("Hot".parse::<Weather>().is_err());
    }

    #[test]
    fn item_serialization_uses_wire_field_names() {
        let owner: ObjectId = "5d8b8592978f8bd833ca8133".parse().unwrap();
        let item = ClothingItem {
            id: "6123456789abcdef01234567".parse().unwrap(),
            name: "Beanie".to_string(),
            weather: Weather::Cold,
            image_url: "https://example.com/beanie.png".to_string(),
            owner: owner.clone(),
            likes: vec![owner],
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(item).unwrap();
        assert_eq!(value["_id"], "6123456789abcdef01234567");
        assert_eq!(value["weather"], "cold");
        assert_eq!(value["imageUrl"], "https://example.com/beanie.png");
        assert_eq!(value["likes"], json!(["5d8b8592978f8bd833ca8133"]));
        assert!(value.get("createdAt").is_some());
        assert!(value.get("image_url").is_none());
    }
}
