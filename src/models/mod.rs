mod article;

pub use article::{Article, HeadlinesResponse, Source};
