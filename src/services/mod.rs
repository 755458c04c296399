mod browser;

pub use browser::{LinkOpener, SystemBrowser};
