//! Pet profile data model

use crate::domain::types::epoch_ms;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Generate a pet id: `pet_<epochMillis>_<4-digit-random>`
pub fn generate_pet_id() -> String {
    format!("pet_{}_{}", epoch_ms(), rand::thread_rng().gen_range(1000..=9999))
}

/// A pet profile. Walks reference pets by optional `petId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub species: String,
    pub breed: String,
    /// Birth date as epoch milliseconds
    pub birth_date: i64,
    #[serde(default = "epoch_ms")]
    pub created_at: i64,
}

impl Pet {
    pub fn new(name: &str, species: &str, breed: &str, birth_date: i64) -> Self {
        Self {
            id: generate_pet_id(),
            name: name.to_string(),
            species: species.to_string(),
            breed: breed.to_string(),
            birth_date,
            created_at: epoch_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_pet() {
        let pet = Pet::new("Reksio", "dog", "mixed", 1609459200000);

        assert!(pet.id.starts_with("pet_"));
        assert_eq!(pet.name, "Reksio");
        assert_eq!(pet.birth_date, 1609459200000);
        assert!(pet.created_at > 0);
    }

    #[test]
    fn test_pet_wire_shape() {
        let pet = Pet::new("Luna", "dog", "border collie", 1609459200000);
        let json = serde_json::to_value(&pet).unwrap();

        assert_eq!(json["name"], "Luna");
        assert_eq!(json["birthDate"], 1609459200000_i64);
        assert!(json["createdAt"].is_i64());

        let back: Pet = serde_json::from_value(json).unwrap();
        assert_eq!(back, pet);
    }
}
