use log::*;
use ssg_common::{helpers::parse_boolean_flag, Secret};

/// Configuration shared by the three Allegro channel accounts. One developer application serves all of them; the
/// accounts differ only by the refresh token stored per channel in the credential store.
#[derive(Debug, Clone, Default)]
pub struct AllegroConfig {
    pub base_url: String,
    pub auth_url: String,
    pub client_id: String,
    pub client_secret: Secret<String>,
}

impl AllegroConfig {
    pub fn from_env_or_default() -> Self {
        // SSG_ALLEGRO_SANDBOX switches the default hosts to the Allegro sandbox environment.
        let sandbox = parse_boolean_flag(std::env::var("SSG_ALLEGRO_SANDBOX").ok(), false);
        let (default_base, default_auth) = if sandbox {
            ("https://api.allegro.pl.allegrosandbox.pl", "https://allegro.pl.allegrosandbox.pl/auth/oauth")
        } else {
            ("https://api.allegro.pl", "https://allegro.pl/auth/oauth")
        };
        let base_url = std::env::var("SSG_ALLEGRO_BASE_URL").unwrap_or_else(|_| {
            warn!("SSG_ALLEGRO_BASE_URL not set, using {default_base}");
            default_base.to_string()
        });
        let auth_url = std::env::var("SSG_ALLEGRO_AUTH_URL").unwrap_or_else(|_| {
            warn!("SSG_ALLEGRO_AUTH_URL not set, using {default_auth}");
            default_auth.to_string()
        });
        let client_id = std::env::var("SSG_ALLEGRO_CLIENT_ID").unwrap_or_else(|_| {
            warn!("SSG_ALLEGRO_CLIENT_ID not set, using (probably useless) default");
            "00000000000000000000000000000000".to_string()
        });
        let client_secret = Secret::new(std::env::var("SSG_ALLEGRO_CLIENT_SECRET").unwrap_or_else(|_| {
            warn!("SSG_ALLEGRO_CLIENT_SECRET not set, using (probably useless) default");
            "secret".to_string()
        }));
        Self { base_url, auth_url, client_id, client_secret }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ErliConfig {
    pub base_url: String,
    pub auth_url: String,
    pub client_id: String,
    pub client_secret: Secret<String>,
}

impl ErliConfig {
    pub fn from_env_or_default() -> Self {
        let base_url = std::env::var("SSG_ERLI_BASE_URL").unwrap_or_else(|_| {
            warn!("SSG_ERLI_BASE_URL not set, using the production API default");
            "https://api.erli.pl".to_string()
        });
        let auth_url = std::env::var("SSG_ERLI_AUTH_URL").unwrap_or_else(|_| {
            warn!("SSG_ERLI_AUTH_URL not set, using the production auth default");
            "https://api.erli.pl/auth".to_string()
        });
        let client_id = std::env::var("SSG_ERLI_CLIENT_ID").unwrap_or_else(|_| {
            warn!("SSG_ERLI_CLIENT_ID not set, using (probably useless) default");
            "erli-client".to_string()
        });
        let client_secret = Secret::new(std::env::var("SSG_ERLI_CLIENT_SECRET").unwrap_or_else(|_| {
            warn!("SSG_ERLI_CLIENT_SECRET not set, using (probably useless) default");
            "secret".to_string()
        }));
        Self { base_url, auth_url, client_id, client_secret }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EmpikConfig {
    pub base_url: String,
    pub auth_url: String,
    pub client_id: String,
    pub client_secret: Secret<String>,
}

impl EmpikConfig {
    pub fn from_env_or_default() -> Self {
        let base_url = std::env::var("SSG_EMPIK_BASE_URL").unwrap_or_else(|_| {
            warn!("SSG_EMPIK_BASE_URL not set, using the production API default");
            "https://marketplace.empik.com/api".to_string()
        });
        let auth_url = std::env::var("SSG_EMPIK_AUTH_URL").unwrap_or_else(|_| {
            warn!("SSG_EMPIK_AUTH_URL not set, using the production auth default");
            "https://marketplace.empik.com/auth".to_string()
        });
        let client_id = std::env::var("SSG_EMPIK_CLIENT_ID").unwrap_or_else(|_| {
            warn!("SSG_EMPIK_CLIENT_ID not set, using (probably useless) default");
            "empik-client".to_string()
        });
        let client_secret = Secret::new(std::env::var("SSG_EMPIK_CLIENT_SECRET").unwrap_or_else(|_| {
            warn!("SSG_EMPIK_CLIENT_SECRET not set, using (probably useless) default");
            "secret".to_string()
        }));
        Self { base_url, auth_url, client_id, client_secret }
    }
}

/// The merchant's own storefront. Authenticated with a long-lived API key rather than OAuth; the key doubles as
/// the access token so that every channel shares one credential lifecycle.
#[derive(Debug, Clone, Default)]
pub struct StorefrontConfig {
    pub base_url: String,
    pub api_key: Secret<String>,
}

impl StorefrontConfig {
    pub fn from_env_or_default() -> Self {
        let base_url = std::env::var("SSG_STOREFRONT_BASE_URL").unwrap_or_else(|_| {
            warn!("SSG_STOREFRONT_BASE_URL not set, using localhost default");
            "http://localhost:8080".to_string()
        });
        let api_key = Secret::new(std::env::var("SSG_STOREFRONT_API_KEY").unwrap_or_else(|_| {
            warn!("SSG_STOREFRONT_API_KEY not set, using (probably useless) default");
            "storefront-key".to_string()
        }));
        Self { base_url, api_key }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn allegro_defaults_apply_when_env_is_missing() {
        std::env::remove_var("SSG_ALLEGRO_BASE_URL");
        std::env::remove_var("SSG_ALLEGRO_CLIENT_ID");
        std::env::remove_var("SSG_ALLEGRO_SANDBOX");
        let config = AllegroConfig::from_env_or_default();
        assert_eq!(config.base_url, "https://api.allegro.pl");
        assert_eq!(config.client_id.len(), 32);
    }

    #[test]
    fn storefront_reads_env() {
        std::env::set_var("SSG_STOREFRONT_BASE_URL", "https://shop.example.com");
        std::env::set_var("SSG_STOREFRONT_API_KEY", "k123");
        let config = StorefrontConfig::from_env_or_default();
        assert_eq!(config.base_url, "https://shop.example.com");
        assert_eq!(config.api_key.reveal(), "k123");
        std::env::remove_var("SSG_STOREFRONT_BASE_URL");
        std::env::remove_var("SSG_STOREFRONT_API_KEY");
    }
}
