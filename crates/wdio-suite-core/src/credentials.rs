//! Test user credentials.
//!
//! A fixed set of five users. [`random_user`] takes the random source as a
//! parameter so tests can seed it.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

/// An email/password pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Credential {
    pub email: String,
    pub password: String,
}

impl Credential {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

const USERS: [(&str, &str); 5] = [
    ("rickg.deckard@bladerunner.com", "VoightKampff_2019!"),
    ("case.n@neuromancer.net", "ICEbreaker_AI.2021"),
    ("thomas.anderson@zion.org", "WakeUp_Neo1999!"),
    ("hiro.katana@snowcrash.io", "SwordRider_20XX!"),
    ("molly.millions@freelance.zone", "MirrorShades_808!"),
];

/// The fixed user list, freshly built.
pub fn all_users() -> Vec<Credential> {
    USERS
        .iter()
        .map(|(email, password)| Credential::new(*email, *password))
        .collect()
}

/// Shuffle the user list and return its first entry.
///
/// Every call builds and shuffles its own list, so draws are independent and
/// with replacement.
pub fn random_user<R: Rng + ?Sized>(rng: &mut R) -> Credential {
    let mut users = all_users();
    users.shuffle(rng);
    users.swap_remove(0)
}
