// Confirmation codes: RES-<unix millis>-<6 uppercase base36 chars>

use axum::async_trait;
use chrono::Utc;
use rand::Rng;
use sqlx::PgConnection;
use tracing::warn;

use crate::error::ApiError;

/// Candidates tried before giving up
pub const MAX_ATTEMPTS: u32 = 5;

const SUFFIX_LEN: usize = 6;
const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Storage lookup used to reject codes that are already taken
#[async_trait]
pub trait CodeRegistry: Send {
    async fn is_taken(&mut self, code: &str) -> Result<bool, sqlx::Error>;
}

#[async_trait]
impl CodeRegistry for PgConnection {
    async fn is_taken(&mut self, code: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM reservations WHERE confirmation_code = $1)",
        )
        .bind(code)
        .fetch_one(self)
        .await
    }
}

pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("RES-{}-{}", Utc::now().timestamp_millis(), suffix)
}

/// Generate a code not present in `registry`, trying at most `MAX_ATTEMPTS` times
pub async fn generate_unique<R>(registry: &mut R) -> Result<String, ApiError>
where
    R: CodeRegistry + ?Sized,
{
    for attempt in 1..=MAX_ATTEMPTS {
        let code = generate();
        if !registry.is_taken(&code).await? {
            return Ok(code);
        }
        warn!(attempt, %code, "Confirmation code collision");
    }
    Err(ApiError::ConfirmationCodeExhausted {
        attempts: MAX_ATTEMPTS,
    })
}

/// True for strings shaped like a generated code
pub fn is_well_formed(code: &str) -> bool {
    let mut parts = code.splitn(3, '-');
    let (Some("RES"), Some(millis), Some(suffix)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !millis.is_empty()
        && millis.bytes().all(|b| b.is_ascii_digit())
        && suffix.len() == SUFFIX_LEN
        && suffix.bytes().all(|b| ALPHABET.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    /// Registry that claims each code on lookup
    #[derive(Clone, Default)]
    struct ClaimingRegistry(Arc<Mutex<HashSet<String>>>);

    #[async_trait]
    impl CodeRegistry for ClaimingRegistry {
        async fn is_taken(&mut self, code: &str) -> Result<bool, sqlx::Error> {
            Ok(!self.0.lock().await.insert(code.to_string()))
        }
    }

    struct FullRegistry {
        lookups: u32,
    }

    #[async_trait]
    impl CodeRegistry for FullRegistry {
        async fn is_taken(&mut self, _code: &str) -> Result<bool, sqlx::Error> {
            self.lookups += 1;
            Ok(true)
        }
    }

    #[test]
    fn test_format() {
        for _ in 0..100 {
            let code = generate();
            assert!(is_well_formed(&code), "malformed code {}", code);
        }
        assert!(!is_well_formed("RES-123-abcdef"));
        assert!(!is_well_formed("RES--ABCDEF"));
        assert!(!is_well_formed("BOOK-123-ABCDEF"));
    }

    #[tokio::test]
    async fn test_exhaustion_is_bounded() {
        let mut registry = FullRegistry { lookups: 0 };
        let err = generate_unique(&mut registry).await.unwrap_err();

        assert!(matches!(err, ApiError::ConfirmationCodeExhausted { attempts: MAX_ATTEMPTS }));
        assert_eq!(registry.lookups, MAX_ATTEMPTS);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_generation_is_unique() {
        let registry = ClaimingRegistry::default();

        let handles: Vec<_> = (0..1000)
            .map(|_| {
                let mut registry = registry.clone();
                tokio::spawn(async move { generate_unique(&mut registry).await })
            })
            .collect();

        let mut codes = HashSet::new();
        for handle in handles {
            let code = handle.await.unwrap().expect("code allocated");
            assert!(codes.insert(code));
        }
        assert_eq!(codes.len(), 1000);
        assert_eq!(registry.0.lock().await.len(), 1000);
    }
}
