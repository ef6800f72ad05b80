#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_addr: String,
    /// Used in log lines and typed into text boxes when interacting.
    pub name: String,
    pub outbound_queue: usize,
    pub interact: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: format!("127.0.0.1:{}", vellum::DEFAULT_PORT),
            name: "player".to_string(),
            outbound_queue: 64,
            interact: false,
        }
    }
}
