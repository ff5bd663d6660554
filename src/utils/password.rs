use crate::config::{AppConfig, Argon2Config};
use crate::errors::{LmsError, Result};
use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

/// 按配置的 Argon2id 参数哈希密码
pub fn hash_password(password: &str) -> Result<String> {
    hash_password_with(password, &AppConfig::get().argon2)
}

pub fn hash_password_with(password: &str, config: &Argon2Config) -> Result<String> {
    let params = Params::new(
        config.memory_cost,
        config.time_cost,
        config.parallelism,
        None,
    )
    .map_err(|e| LmsError::validation(format!("Argon2 参数错误: {e}")))?;

    let salt = SaltString::generate(&mut OsRng);
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| LmsError::validation(format!("密码哈希失败: {e}")))
}

/// 参数从哈希串本身读取
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let config = Argon2Config {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
        };
        let hash = hash_password_with("Labcoat2024", &config).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("Labcoat2024", &hash));
        assert!(!verify_password("labcoat2024", &hash));
        assert!(!verify_password("Labcoat2024", "not-a-hash"));
    }
}
