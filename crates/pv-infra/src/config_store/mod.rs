mod http;

pub use http::HttpConfigurationStore;
