pub mod traits;

// Fetcher implementations
pub mod http_fetcher;
