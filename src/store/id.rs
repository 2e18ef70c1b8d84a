use rand::Rng;
use rand::distr::Alphanumeric;

/// Produces fresh session identifiers.
///
/// Identifiers must be unpredictable: they are the only credential a client
/// presents to claim a session.
pub trait IdGenerator: Send + Sync {
    fn new_id(&self) -> String;
}

/// Alphanumeric identifiers from the OS-seeded CSPRNG.
#[derive(Debug, Clone)]
pub struct RandomIdGenerator {
    length: usize,
}

impl RandomIdGenerator {
    pub fn with_length(length: usize) -> Self {
        Self { length }
    }
}

impl Default for RandomIdGenerator {
    fn default() -> Self {
        // 32 alphanumeric chars ≈ 190 bits of entropy.
        Self { length: 32 }
    }
}

impl IdGenerator for RandomIdGenerator {
    fn new_id(&self) -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect()
    }
}

/// Hyphen-less UUIDv4 identifiers.
#[derive(Debug, Clone, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn new_id(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}
