use std::time::Duration;

pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";
pub const DEFAULT_STUN_ADDR_2: &str = "stun:stun1.l.google.com:19302";

/// Relay used when the viewer is launched from a loopback host.
pub const DEV_RELAY_URL: &str = "ws://localhost:8081";
pub const PROD_RELAY_URL: &str = "wss://mirror-signaling.fly.dev";

pub const LOOPBACK_HOSTS: [&str; 2] = ["localhost", "127.0.0.1"];

pub const RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Query parameter carrying the room token in the launch URL.
pub const ROOM_QUERY_PARAM: &str = "room";

pub fn default_stun_servers() -> Vec<String> {
    vec![DEFAULT_STUN_ADDR.to_owned(), DEFAULT_STUN_ADDR_2.to_owned()]
}

pub fn is_loopback_host(host: &str) -> bool {
    LOOPBACK_HOSTS.contains(&host)
}
