use std::path::PathBuf;
use std::{env, fs};

use crate::config::Config;
use crate::error::ConfigurationError;

const PASSWORD_SALT: &str = "password.salt";
const MAX_PASSWORD_COST: u32 = 31;

pub type Salt = [u8; 16];

/// Inputs of password hashing shared by every record of a store.
#[derive(Debug, Clone)]
pub struct Security {
    pub salt: Salt,
    pub password_cost: u32,
}

#[inline]
fn security_dir() -> PathBuf {
    PathBuf::from(env::var("SECURITY_DIR").unwrap_or("./security".to_string()))
}

impl Security {
    pub fn load(config: &Config) -> Result<Security, ConfigurationError> {
        let dir = security_dir();
        let password_cost = config.password_cost.min(MAX_PASSWORD_COST);

        tracing::info!("Loading password salt...");
        let salt: Option<Salt> = fs::read(dir.join(PASSWORD_SALT))
            .map(|s| s.try_into().ok())
            .ok()
            .flatten();

        let salt = match salt {
            Some(salt) => {
                tracing::info!("Salt found and loaded.");
                salt
            }
            #[cfg(feature = "generate-security")]
            None => {
                tracing::info!(
                    "Salt not found in '{}'. Generating a new password salt.",
                    dir.join(PASSWORD_SALT).display()
                );
                fs::create_dir_all(&dir)?;
                let salt: Salt = rand::random();
                fs::write(dir.join(PASSWORD_SALT), salt)?;
                salt
            }
            #[cfg(not(feature = "generate-security"))]
            None => {
                tracing::error!("Salt not found in '{}'.", dir.join(PASSWORD_SALT).display());
                return Err(ConfigurationError::NotFound(dir.join(PASSWORD_SALT)));
            }
        };

        Ok(Security {
            salt,
            password_cost,
        })
    }

    /// Random salt kept only in memory. Hashes don't survive a restart.
    pub fn ephemeral(password_cost: u32) -> Security {
        Security {
            salt: rand::random(),
            password_cost: password_cost.min(MAX_PASSWORD_COST),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Security;

    #[test]
    fn ephemeral_caps_cost() {
        let security = Security::ephemeral(64);
        assert_eq!(security.password_cost, 31);
    }

    #[test]
    fn ephemeral_salts_differ() {
        assert_ne!(Security::ephemeral(4).salt, Security::ephemeral(4).salt);
    }
}
