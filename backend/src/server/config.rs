//! Application settings and the server configuration built from them.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use murmur::inbound::http::session_config::SessionSettings;
use murmur::outbound::memory::{DEFAULT_NEWEST_USERS, StoreSettings};
use ortho_config::OrthoConfig;
use pagination::{DEFAULT_PAGE_SIZE, PageSize, PageSizeError};
use serde::Deserialize;

const DEFAULT_BIND_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 8080));

/// Tunables loaded from `MURMUR_*` environment variables and CLI flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "MURMUR")]
pub struct AppSettings {
    /// Listen address.
    pub bind_addr: Option<SocketAddr>,
    /// Posts per feed page.
    pub page_size: Option<usize>,
    /// How many accounts the global timeline lists as newest.
    pub newest_users: Option<usize>,
}

impl AppSettings {
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr.unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Storage settings; a zero page size is rejected.
    pub fn store_settings(&self) -> Result<StoreSettings, PageSizeError> {
        Ok(StoreSettings {
            page_size: PageSize::new(self.page_size.unwrap_or(DEFAULT_PAGE_SIZE))?,
            newest_users: self.newest_users.unwrap_or(DEFAULT_NEWEST_USERS),
        })
    }
}

/// Everything [`super::create_server`] needs.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) store: StoreSettings,
    pub(crate) bind_addr: SocketAddr,
}

impl ServerConfig {
    #[must_use]
    pub fn new(session: SessionSettings, store: StoreSettings, bind_addr: SocketAddr) -> Self {
        Self {
            session,
            store,
            bind_addr,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Configuration loading against the process environment.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("murmur")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env([
            ("MURMUR_BIND_ADDR", None::<String>),
            ("MURMUR_PAGE_SIZE", None::<String>),
            ("MURMUR_NEWEST_USERS", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), DEFAULT_BIND_ADDR);
        let store = settings.store_settings().expect("default page size is valid");
        assert_eq!(store.page_size.get(), DEFAULT_PAGE_SIZE);
        assert_eq!(store.page_size, PageSize::default());
        assert_eq!(store.newest_users, DEFAULT_NEWEST_USERS);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("MURMUR_BIND_ADDR", Some("127.0.0.1:9090".to_owned())),
            ("MURMUR_PAGE_SIZE", Some("25".to_owned())),
            ("MURMUR_NEWEST_USERS", Some("3".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr(),
            "127.0.0.1:9090".parse::<SocketAddr>().expect("address")
        );
        let store = settings.store_settings().expect("valid page size");
        assert_eq!(store.page_size.get(), 25);
        assert_eq!(store.newest_users, 3);
    }

    #[rstest]
    fn zero_page_size_is_rejected() {
        let _guard = lock_env([
            ("MURMUR_BIND_ADDR", None::<String>),
            ("MURMUR_PAGE_SIZE", Some("0".to_owned())),
            ("MURMUR_NEWEST_USERS", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert!(settings.store_settings().is_err());
    }
}
