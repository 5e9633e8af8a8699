//! Unique short code generation inside the create transaction.
//!
//! Codes are random draws from an alphabet excluding the ambiguous
//! characters `0 O 1 I l`, long enough that collisions are astronomically
//! unlikely; the bounded retry loop is a safety net, not the primary
//! defense. Exhausting the retries fails the enclosing transaction, which
//! rolls back without a partially-created card.

use std::sync::Arc;

use rand::Rng;
use sqlx::PgConnection;
use tracing::warn;

use kudos_core::config::generation::GenerationConfig;
use kudos_core::result::AppResult;
use kudos_core::AppError;
use kudos_database::repositories::CardRepository;

/// Alphabet for generated codes: digits and uppercase letters minus the
/// ambiguous `0 O 1 I`.
pub const CODE_ALPHABET: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Which unique code column a draw is checked against. The two
/// namespaces never share code space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeNamespace {
    /// The referral code embedded in shared links.
    Referral,
    /// The share-path code addressing the public card page.
    SharePath,
}

impl CodeNamespace {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Referral => "referral",
            Self::SharePath => "share_path",
        }
    }
}

/// Produces collision-free short codes under the caller's transaction.
#[derive(Debug, Clone)]
pub struct UniqueCodeGenerator {
    /// Card repository for existence checks.
    cards: Arc<CardRepository>,
    /// Generated code length.
    length: usize,
    /// Collision retry attempts before giving up.
    max_retries: u32,
}

impl UniqueCodeGenerator {
    /// Create a new code generator.
    pub fn new(cards: Arc<CardRepository>, config: &GenerationConfig) -> Self {
        Self {
            cards,
            length: config.code_length,
            max_retries: config.code_max_retries,
        }
    }

    /// Draw one random candidate code.
    pub fn candidate(&self) -> String {
        let mut rng = rand::rng();
        (0..self.length)
            .map(|_| {
                let idx = rng.random_range(0..CODE_ALPHABET.len());
                CODE_ALPHABET[idx] as char
            })
            .collect()
    }

    /// Generate a code that is unique within `namespace`, checked under
    /// the transaction's isolation.
    ///
    /// After `max_retries` collisions the whole create fails with a
    /// generation error and the enclosing transaction rolls back.
    pub async fn generate_unique(
        &self,
        tx: &mut PgConnection,
        namespace: CodeNamespace,
    ) -> AppResult<String> {
        for attempt in 1..=self.max_retries {
            let code = self.candidate();
            let exists = match namespace {
                CodeNamespace::Referral => self.cards.referral_code_exists(&mut *tx, &code).await?,
                CodeNamespace::SharePath => self.cards.share_code_exists(&mut *tx, &code).await?,
            };
            if !exists {
                return Ok(code);
            }
            warn!(
                namespace = namespace.as_str(),
                attempt,
                max_retries = self.max_retries,
                "Generated code collided, retrying"
            );
        }

        Err(AppError::generation(format!(
            "Could not generate a unique {} code after {} attempts",
            namespace.as_str(),
            self.max_retries
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(length: usize) -> UniqueCodeGenerator {
        // The repository is never touched by candidate().
        let pool = sqlx::postgres::PgPoolOptions::new().connect_lazy("postgres://localhost/unused");
        UniqueCodeGenerator {
            cards: Arc::new(CardRepository::new(pool.unwrap())),
            length,
            max_retries: 3,
        }
    }

    #[tokio::test]
    async fn test_candidate_has_fixed_length() {
        let generator = generator(8);
        assert_eq!(generator.candidate().len(), 8);
    }

    #[tokio::test]
    async fn test_candidate_avoids_ambiguous_characters() {
        let generator = generator(64);
        let code = generator.candidate();
        for c in code.chars() {
            assert!(
                CODE_ALPHABET.contains(&(c as u8)),
                "unexpected character: {c}"
            );
            assert!(!"0O1Il".contains(c));
        }
    }

    #[tokio::test]
    async fn test_candidates_are_distinct() {
        let generator = generator(8);
        let first = generator.candidate();
        let second = generator.candidate();
        // 32^8 possibilities: a repeat here means the RNG is broken.
        assert_ne!(first, second);
    }

    #[test]
    fn test_alphabet_size() {
        assert_eq!(CODE_ALPHABET.len(), 32);
    }
}
