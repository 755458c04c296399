use tokio::sync::mpsc;

use crate::config::Config;
use crate::error::{FetchError, Result};
use crate::models::Article;
use crate::news::NewsFetcher;
use crate::services::LinkOpener;
use crate::tui::AppAction;

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// The country being queried and what the last fetch produced.
///
/// `articles` and `loading` only change through `begin_fetch`,
/// `finish_success` and `finish_failure`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    country_code: String,
    articles: Vec<Article>,
    loading: bool,
}

impl QueryState {
    pub fn new(country_code: impl Into<String>) -> Self {
        Self {
            country_code: country_code.into(),
            articles: Vec::new(),
            loading: false,
        }
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Accepts anything; the service decides what a valid code is.
    pub fn set_country_code(&mut self, code: impl Into<String>) {
        self.country_code = code.into();
    }

    pub fn begin_fetch(&mut self) {
        self.loading = true;
    }

    pub fn finish_success(&mut self, articles: Vec<Article>) {
        self.articles = articles;
        self.loading = false;
    }

    pub fn finish_failure(&mut self) {
        self.articles = Vec::new();
        self.loading = false;
    }
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_COUNTRY)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Info(String),
    Error(String),
}

/// A finished fetch, tagged with the sequence number it was issued under.
#[derive(Debug)]
pub struct FetchOutcome {
    pub seq: u64,
    pub result: std::result::Result<Vec<Article>, FetchError>,
}

pub struct App {
    state: QueryState,
    fetcher: NewsFetcher,
    opener: Box<dyn LinkOpener>,
    result_tx: mpsc::UnboundedSender<FetchOutcome>,
    result_rx: mpsc::UnboundedReceiver<FetchOutcome>,
    latest_seq: u64,
    spinner_frame: usize,
    pub selected_index: usize,
    pub editing_country: bool,
    pub show_help: bool,
    pub status: Option<StatusMessage>,
}

impl App {
    pub fn new(config: &Config, opener: Box<dyn LinkOpener>) -> Result<Self> {
        let fetcher = NewsFetcher::new(config)?;
        let (result_tx, result_rx) = mpsc::unbounded_channel();

        Ok(Self {
            state: QueryState::new(config.default_country.clone()),
            fetcher,
            opener,
            result_tx,
            result_rx,
            latest_seq: 0,
            spinner_frame: 0,
            selected_index: 0,
            editing_country: false,
            show_help: false,
            status: None,
        })
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn set_country_code(&mut self, code: impl Into<String>) {
        self.state.set_country_code(code);
    }

    pub fn push_country_char(&mut self, c: char) {
        let mut code = self.state.country_code().to_string();
        code.push(c);
        self.set_country_code(code);
    }

    pub fn pop_country_char(&mut self) {
        let mut code = self.state.country_code().to_string();
        code.pop();
        self.set_country_code(code);
    }

    /// Mark the state loading and hand out the sequence number for a new fetch.
    fn issue_request(&mut self) -> u64 {
        self.latest_seq += 1;
        self.state.begin_fetch();
        self.status = None;
        self.latest_seq
    }

    /// Start a fetch in the background. Earlier fetches still in flight are
    /// not cancelled; their results are dropped when they arrive.
    pub fn trigger_fetch(&mut self) {
        let seq = self.issue_request();
        let fetcher = self.fetcher.clone();
        let tx = self.result_tx.clone();
        let country_code = self.state.country_code().to_string();

        tracing::debug!("Starting fetch #{} for {:?}", seq, country_code);

        tokio::spawn(async move {
            let result = fetcher.fetch(&country_code).await;
            // Receiver only goes away on shutdown.
            let _ = tx.send(FetchOutcome { seq, result });
        });
    }

    /// Apply every fetch that has finished since the last call.
    pub fn poll_fetch_result(&mut self) {
        while let Ok(outcome) = self.result_rx.try_recv() {
            self.complete_fetch(outcome.seq, outcome.result);
        }
    }

    pub fn complete_fetch(
        &mut self,
        seq: u64,
        result: std::result::Result<Vec<Article>, FetchError>,
    ) {
        if seq != self.latest_seq {
            tracing::debug!(
                "Discarding stale fetch #{} (latest is #{})",
                seq,
                self.latest_seq
            );
            return;
        }

        self.selected_index = 0;
        match result {
            Ok(articles) => {
                let count = articles.len();
                self.state.finish_success(articles);
                self.status = Some(StatusMessage::Info(format!(
                    "{} headlines for {:?}",
                    count,
                    self.state.country_code()
                )));
            }
            Err(e) => {
                tracing::warn!("Fetch #{} failed: {}", seq, e);
                self.state.finish_failure();
                self.status = Some(StatusMessage::Error(format!(
                    "Error fetching headlines: {}",
                    e
                )));
            }
        }
    }

    pub fn tick_spinner(&mut self) {
        if self.state.loading() {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
        }
    }

    pub fn spinner(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner_frame]
    }

    pub fn selected_article(&self) -> Option<&Article> {
        self.state.articles().get(self.selected_index)
    }

    pub fn move_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.selected_index + 1 < self.state.articles().len() {
            self.selected_index += 1;
        }
    }

    pub fn move_to_top(&mut self) {
        self.selected_index = 0;
    }

    pub fn move_to_bottom(&mut self) {
        self.selected_index = self.state.articles().len().saturating_sub(1);
    }

    pub fn open_selected(&mut self) {
        let Some(url) = self.selected_article().map(|a| a.url.clone()) else {
            return;
        };

        if let Err(e) = self.opener.open(&url) {
            tracing::warn!("Failed to open {}: {}", url, e);
            self.status = Some(StatusMessage::Error(format!("Could not open link: {}", e)));
        }
    }

    /// Returns `true` when the app should quit.
    pub fn handle_action(&mut self, action: AppAction) -> bool {
        match action {
            AppAction::Quit => return true,
            AppAction::MoveUp => self.move_up(),
            AppAction::MoveDown => self.move_down(),
            AppAction::MoveToTop => self.move_to_top(),
            AppAction::MoveToBottom => self.move_to_bottom(),
            AppAction::Search => self.trigger_fetch(),
            AppAction::OpenInBrowser => self.open_selected(),
            AppAction::ShowHelp => self.show_help = true,
            AppAction::HideHelp => self.show_help = false,
            AppAction::EditCountryStart => self.editing_country = true,
            AppAction::CountryInputChar(c) => self.push_country_char(c),
            AppAction::CountryInputBackspace => self.pop_country_char(),
            AppAction::CountryInputConfirm => {
                self.editing_country = false;
                self.trigger_fetch();
            }
            AppAction::CountryInputCancel => self.editing_country = false,
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;
    use crate::models::Source;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Clone, Default)]
    struct RecordingOpener {
        opened: Arc<Mutex<Vec<String>>>,
    }

    impl LinkOpener for RecordingOpener {
        fn open(&mut self, url: &str) -> Result<()> {
            self.opened.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    fn article(title: &str, url: &str) -> Article {
        Article {
            title: title.into(),
            description: None,
            url_to_image: None,
            source: Source {
                name: "Wire".into(),
            },
            published_at: "2024-01-01T00:00:00Z".into(),
            url: url.into(),
            author: None,
        }
    }

    fn config_for(base_url: &str) -> Config {
        Config {
            api_key: Some("test-key".into()),
            base_url: base_url.into(),
            ..Config::default()
        }
    }

    fn test_app() -> (App, RecordingOpener) {
        let opener = RecordingOpener::default();
        let app = App::new(&config_for("http://127.0.0.1:9"), Box::new(opener.clone())).unwrap();
        (app, opener)
    }

    async fn wait_until_idle(app: &mut App) {
        for _ in 0..200 {
            app.poll_fetch_result();
            if !app.state().loading() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("fetch never completed");
    }

    #[test]
    fn query_state_defaults() {
        let state = QueryState::default();
        assert_eq!(state.country_code(), "us");
        assert!(state.articles().is_empty());
        assert!(!state.loading());
    }

    #[test]
    fn failure_clears_previous_articles() {
        let mut state = QueryState::default();
        state.begin_fetch();
        state.finish_success(vec![article("A", "http://a")]);
        state.begin_fetch();
        assert!(state.loading());

        state.finish_failure();

        assert!(state.articles().is_empty());
        assert!(!state.loading());
    }

    #[test]
    fn country_code_is_not_validated() {
        let (mut app, _) = test_app();
        app.set_country_code("");
        assert_eq!(app.state().country_code(), "");
        app.set_country_code("not a country");
        assert_eq!(app.state().country_code(), "not a country");
    }

    #[test]
    fn country_input_edits_code() {
        let (mut app, _) = test_app();
        app.handle_action(AppAction::EditCountryStart);
        app.handle_action(AppAction::CountryInputBackspace);
        app.handle_action(AppAction::CountryInputBackspace);
        app.handle_action(AppAction::CountryInputChar('d'));
        app.handle_action(AppAction::CountryInputChar('e'));
        assert!(app.editing_country);
        assert_eq!(app.state().country_code(), "de");

        app.handle_action(AppAction::CountryInputCancel);
        assert!(!app.editing_country);
    }

    #[test]
    fn success_replaces_articles_and_resets_selection() {
        let (mut app, _) = test_app();
        let seq = app.issue_request();
        app.complete_fetch(seq, Ok(vec![article("A", "http://a"), article("B", "http://b")]));
        app.move_down();
        assert_eq!(app.selected_index, 1);

        let seq = app.issue_request();
        app.complete_fetch(seq, Ok(vec![article("C", "http://c")]));

        assert_eq!(app.state().articles(), &[article("C", "http://c")]);
        assert_eq!(app.selected_index, 0);
        assert!(matches!(app.status, Some(StatusMessage::Info(_))));
    }

    #[test]
    fn failure_surfaces_error_status() {
        let (mut app, _) = test_app();
        let seq = app.issue_request();
        app.complete_fetch(seq, Ok(vec![article("A", "http://a")]));

        let seq = app.issue_request();
        app.complete_fetch(seq, Err(FetchError::Response("HTTP 500".into())));

        assert!(app.state().articles().is_empty());
        assert!(!app.state().loading());
        assert!(matches!(app.status, Some(StatusMessage::Error(ref m)) if m.contains("HTTP 500")));
    }

    #[test]
    fn stale_response_never_overwrites_newer() {
        let (mut app, _) = test_app();
        let first = app.issue_request();
        let second = app.issue_request();

        app.complete_fetch(second, Ok(vec![article("new", "http://new")]));
        app.complete_fetch(first, Ok(vec![article("old", "http://old")]));

        assert_eq!(app.state().articles()[0].title, "new");
        assert!(!app.state().loading());
    }

    #[test]
    fn stale_response_leaves_loading_until_latest_arrives() {
        let (mut app, _) = test_app();
        let first = app.issue_request();
        let second = app.issue_request();

        app.complete_fetch(first, Err(FetchError::Response("late".into())));
        assert!(app.state().loading());
        assert!(app.status.is_none());

        app.complete_fetch(second, Ok(vec![article("A", "http://a")]));
        assert!(!app.state().loading());
        assert_eq!(app.state().articles().len(), 1);
    }

    #[test]
    fn selection_stays_in_bounds() {
        let (mut app, _) = test_app();
        app.move_down();
        app.move_to_bottom();
        assert_eq!(app.selected_index, 0);

        let seq = app.issue_request();
        app.complete_fetch(
            seq,
            Ok(vec![article("A", "http://a"), article("B", "http://b"), article("C", "http://c")]),
        );
        app.move_to_bottom();
        assert_eq!(app.selected_index, 2);
        app.move_down();
        assert_eq!(app.selected_index, 2);
        app.move_to_top();
        app.move_up();
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn open_selected_passes_article_url() {
        let (mut app, opener) = test_app();
        app.handle_action(AppAction::OpenInBrowser);
        assert!(opener.opened.lock().unwrap().is_empty());

        let seq = app.issue_request();
        app.complete_fetch(seq, Ok(vec![article("A", "http://a"), article("B", "http://b")]));
        app.move_down();
        app.handle_action(AppAction::OpenInBrowser);

        assert_eq!(*opener.opened.lock().unwrap(), vec!["http://b".to_string()]);
    }

    #[test]
    fn quit_action_quits() {
        let (mut app, _) = test_app();
        assert!(!app.handle_action(AppAction::ShowHelp));
        assert!(app.show_help);
        assert!(app.handle_action(AppAction::Quit));
    }

    #[tokio::test]
    async fn triggered_fetch_applies_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("country", "gb"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"articles":[{"title":"A","source":{"name":"S"},"publishedAt":"2024-01-01T00:00:00Z","url":"http://a"},{"title":"B","source":{"name":"S"},"publishedAt":"2024-01-02T00:00:00Z","url":"http://b"}]}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let mut app = App::new(&config_for(&server.uri()), Box::new(RecordingOpener::default())).unwrap();
        app.set_country_code("gb");
        app.handle_action(AppAction::Search);
        assert!(app.state().loading());

        wait_until_idle(&mut app).await;

        let titles: Vec<_> = app.state().articles().iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn triggered_fetch_failure_clears_loading() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut app = App::new(&config_for(&server.uri()), Box::new(RecordingOpener::default())).unwrap();
        app.handle_action(AppAction::CountryInputConfirm);

        wait_until_idle(&mut app).await;

        assert!(app.state().articles().is_empty());
        assert!(matches!(app.status, Some(StatusMessage::Error(_))));
    }
}
