#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub max_connections: usize,
    /// Frames buffered per connection before new ones are dropped.
    pub outbound_queue: usize,
    pub demo_screen_on_join: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_connections: 32,
            outbound_queue: 256,
            demo_screen_on_join: true,
        }
    }
}
