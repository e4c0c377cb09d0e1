pub mod config {
    pub mod env_loader;
    pub mod model;
}
pub mod events_portal {
    pub mod api;
    pub mod dto;
    pub mod model;
}
pub mod feed {
    pub mod distance;
    pub mod filter;
    pub mod pipeline;
    pub mod render;
    pub mod tickets;
}
pub mod location {
    pub mod model;
    pub mod resolver;
}
pub mod sheet {
    pub mod capture;
    pub mod driver;
    pub mod gesture;
}
pub mod tracing;
