pub mod listener;

pub use listener::Listener;

/// The URL announced at startup for the healthcheck route. The port is
/// always written out, including the scheme default.
pub fn healthcheck_url(port: u16) -> String {
    format!("http://localhost:{}/healthcheck", port)
}
