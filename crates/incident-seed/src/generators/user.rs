//! User generation with roles and contact details.

use fake::{
    Fake,
    faker::name::en::{FirstName, LastName},
};
use incidents::{Asset, ModelError, NewUser, Role, User, models::MAX_CREDIBILITY_SCORE};
use rand::Rng;

use super::random_uuid;
use crate::config::DEFAULT_ANALYST_THRESHOLD;

/// Configuration for user generation.
#[derive(Debug, Clone)]
pub struct UserGenConfig {
    /// Users generated at an index below this are Analysts.
    pub analyst_threshold: usize,
    /// Probability that a user is marked verified.
    pub verified_rate: f64,
    /// Leading digits a phone number may start with.
    pub phone_prefixes: Vec<char>,
    /// Email domains to draw from.
    pub email_domains: Vec<String>,
}

impl Default for UserGenConfig {
    fn default() -> Self {
        Self {
            analyst_threshold: DEFAULT_ANALYST_THRESHOLD,
            verified_rate: 0.8,
            phone_prefixes: vec!['9', '8', '7', '6'],
            email_domains: vec![
                "gmail.com".to_string(),
                "outlook.com".to_string(),
                "yahoo.com".to_string(),
                "proton.me".to_string(),
            ],
        }
    }
}

/// Generates realistic user data for testing.
pub struct UserGenerator {
    config: UserGenConfig,
}

impl UserGenerator {
    /// Creates a new user generator with default configuration.
    pub fn new() -> Self {
        Self {
            config: UserGenConfig::default(),
        }
    }

    /// Creates a generator with custom configuration.
    pub fn with_config(config: UserGenConfig) -> Self {
        Self { config }
    }

    /// Role assigned to the user generated at `index`.
    pub fn role_for_index(&self, index: usize) -> Role {
        if index < self.config.analyst_threshold {
            Role::Analyst
        } else {
            Role::Citizen
        }
    }

    /// Generates the user at position `index` of a batch.
    pub fn generate(
        &self,
        index: usize,
        password_hash: &str,
        rng: &mut impl Rng,
    ) -> Result<User, ModelError> {
        let firstname: String = FirstName().fake_with_rng(rng);
        let lastname: String = LastName().fake_with_rng(rng);
        let email = self.generate_email(&firstname, &lastname, rng);
        let phone = self.generate_phone(rng);

        User::new(NewUser {
            firstname,
            lastname,
            email,
            phone,
            password_hash: password_hash.to_string(),
            role: self.role_for_index(index),
            is_verified: rng.gen_bool(self.config.verified_rate),
            credibility_score: rng.gen_range(0..=MAX_CREDIBILITY_SCORE),
            avatar: generate_avatar(rng),
        })
    }

    /// Generates `count` users sharing one password hash.
    pub fn generate_batch(
        &self,
        count: usize,
        password_hash: &str,
        rng: &mut impl Rng,
    ) -> Result<Vec<User>, ModelError> {
        (0..count)
            .map(|index| self.generate(index, password_hash, rng))
            .collect()
    }

    /// Generates an email from a name.
    fn generate_email(&self, firstname: &str, lastname: &str, rng: &mut impl Rng) -> String {
        let normalized: String = format!("{firstname} {lastname}")
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == ' ')
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(".");

        let suffix: u32 = rng.gen_range(1..9999);
        let domain = &self.config.email_domains[rng.gen_range(0..self.config.email_domains.len())];

        format!("{normalized}{suffix}@{domain}")
    }

    /// Ten digits: one configured prefix followed by nine random digits.
    fn generate_phone(&self, rng: &mut impl Rng) -> String {
        let prefixes = &self.config.phone_prefixes;
        let mut phone = String::with_capacity(10);
        phone.push(prefixes[rng.gen_range(0..prefixes.len())]);
        for _ in 0..9 {
            phone.push(char::from(b'0' + rng.gen_range(0..10u8)));
        }
        phone
    }
}

impl Default for UserGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn generate_avatar(rng: &mut impl Rng) -> Asset {
    Asset {
        public_id: random_uuid(rng).to_string(),
        url: format!(
            "https://avatars.githubusercontent.com/u/{}",
            rng.gen_range(1..100_000_000u32)
        ),
    }
}
