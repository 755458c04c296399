mod fetcher;

pub use fetcher::NewsFetcher;
