//! Endpoint routing for the two API surfaces.
//!
//! Account-level calls (statistics, purge) go to the administrative API with
//! the global key. File calls go to the zone's storage endpoint with the
//! zone's own key. Mixing them up yields a 401 from the service.

use crate::models::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Admin,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route<'a> {
    pub base_url: &'a str,
    pub access_key: &'a str,
}

impl Config {
    pub fn route(&self, endpoint: Endpoint) -> Route<'_> {
        match endpoint {
            Endpoint::Admin => Route {
                base_url: &self.api_url,
                access_key: &self.api_key,
            },
            Endpoint::Storage => Route {
                base_url: &self.storage_url,
                access_key: &self.storage_key,
            },
        }
    }
}

/// Percent-encode each segment of a remote path, keeping `/` separators.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn join(base: &str, rest: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), rest)
}

/// `{storage_url}/{zone}/{path}`. An empty path addresses the zone root.
pub fn storage_url(config: &Config, path: &str) -> String {
    let route = config.route(Endpoint::Storage);
    let zone_path = format!(
        "{}/{}",
        urlencoding::encode(&config.zone_name),
        encode_path(path.trim_start_matches('/'))
    );
    join(route.base_url, &zone_path)
}

pub fn admin_url(config: &Config, resource: &str) -> String {
    join(
        config.route(Endpoint::Admin).base_url,
        resource.trim_start_matches('/'),
    )
}

/// Public edge URL of a stored file, as the purge endpoint expects it.
pub fn purge_target(config: &Config, path: &str) -> String {
    format!(
        "http://{}.{}/{}",
        config.zone_name,
        config.cdn_suffix,
        encode_path(path.trim_start_matches('/'))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> Config {
        Config::new("api-key", "storage-key", "myzone").unwrap()
    }

    #[test]
    fn test_route_selects_key_per_endpoint() {
        let config = config();

        assert_eq!(
            config.route(Endpoint::Admin),
            Route {
                base_url: "https://bunnycdn.com/api/",
                access_key: "api-key",
            }
        );
        assert_eq!(
            config.route(Endpoint::Storage),
            Route {
                base_url: "https://storage.bunnycdn.com/",
                access_key: "storage-key",
            }
        );
    }

    #[test]
    fn test_encode_path_keeps_separators() {
        assert_eq!(
            encode_path("my folder/a&b.jpg"),
            "my%20folder/a%26b.jpg"
        );
        assert_eq!(encode_path("images/"), "images/");
        assert_eq!(encode_path(""), "");
    }

    #[test]
    fn test_storage_url_joins_zone_and_path() {
        let config = config();
        assert_eq!(
            storage_url(&config, "dir/a.jpg"),
            "https://storage.bunnycdn.com/myzone/dir/a.jpg"
        );
        assert_eq!(
            storage_url(&config, "/dir/a.jpg"),
            "https://storage.bunnycdn.com/myzone/dir/a.jpg"
        );
        assert_eq!(
            storage_url(&config, ""),
            "https://storage.bunnycdn.com/myzone/"
        );
    }

    #[test]
    fn test_base_without_trailing_slash() {
        let config = config()
            .with_storage_url("http://127.0.0.1:9000")
            .with_api_url("http://127.0.0.1:9001/api");

        assert_eq!(
            storage_url(&config, "a.jpg"),
            "http://127.0.0.1:9000/myzone/a.jpg"
        );
        assert_eq!(
            admin_url(&config, "statistics"),
            "http://127.0.0.1:9001/api/statistics"
        );
    }

    #[test]
    fn test_purge_target_uses_public_edge_host() {
        let config = config();
        assert_eq!(
            purge_target(&config, "/img.jpg"),
            "http://myzone.b-cdn.net/img.jpg"
        );
        assert_eq!(
            purge_target(&config, "img.jpg"),
            "http://myzone.b-cdn.net/img.jpg"
        );
    }
}
