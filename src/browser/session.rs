use fantoccini::wd::Capabilities;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;

use crate::config::ScraperConfig;
use crate::error::ScrapeError;

/// Common WebDriver endpoints tried when the configured one refuses the connection
const FALLBACK_WEBDRIVER_URLS: [&str; 3] = [
    "http://localhost:9515", // ChromeDriver default
    "http://127.0.0.1:4444",
    "http://localhost:4444",
];

/// Chrome capabilities for the storefront: eager page loads, a fixed window
/// size and the automation banner switched off.
pub fn capabilities(config: &ScraperConfig) -> Capabilities {
    let mut args = vec![
        format!("--user-agent={}", config.user_agent),
        "--incognito".to_string(),
        "--disable-cache".to_string(),
        "--disable-blink-features=AutomationControlled".to_string(),
        "--window-size=1920,1080".to_string(),
    ];
    if config.headless {
        args.extend(
            [
                "--headless=new",
                "--no-sandbox",
                "--disable-dev-shm-usage",
                "--disable-gpu",
            ]
            .map(String::from),
        );
    }

    let mut caps = Capabilities::new();
    caps.insert(
        "goog:chromeOptions".to_string(),
        json!({
            "args": args,
            "excludeSwitches": ["enable-automation"],
            "useAutomationExtension": false,
        }),
    );
    caps.insert("pageLoadStrategy".to_string(), json!("eager"));
    caps
}

/// Connects to the configured WebDriver, falling back to the usual local ports
pub async fn connect(config: &ScraperConfig) -> Result<Client, ScrapeError> {
    let mut builder = ClientBuilder::native();
    builder.capabilities(capabilities(config));

    let first_error = match builder.connect(&config.webdriver_url).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", config.webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::error!(
                "Failed to connect to WebDriver at {}: {}",
                config.webdriver_url,
                e
            );
            e.to_string()
        }
    };

    for url in FALLBACK_WEBDRIVER_URLS {
        if url == config.webdriver_url {
            continue;
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = builder.connect(url).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok(client);
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    Err(ScrapeError::Session(first_error))
}

/// A remote session that has to be closed explicitly
pub trait Session: Clone + Send + 'static {
    fn close(self) -> impl Future<Output = Result<(), ScrapeError>> + Send;
}

impl Session for Client {
    fn close(self) -> impl Future<Output = Result<(), ScrapeError>> + Send {
        async move { Ok(Client::close(self).await?) }
    }
}

async fn close_logged<S: Session>(session: S) {
    if let Err(e) = session.close().await {
        ::log::warn!("Failed to close WebDriver session: {}", e);
    }
}

/// Closes the session it holds unless [`SessionGuard::release`] ran first,
/// which covers a panicking or cancelled caller.
struct SessionGuard<S: Session> {
    session: Option<S>,
}

impl<S: Session> SessionGuard<S> {
    async fn release(mut self) {
        if let Some(session) = self.session.take() {
            close_logged(session).await;
        }
    }
}

impl<S: Session> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                ::log::warn!("Session abandoned mid-page, closing it in the background");
                handle.spawn(close_logged(session));
            }
            Err(_) => ::log::error!("No runtime left to close an abandoned WebDriver session"),
        }
    }
}

/// Runs `work` against `session` and closes the session on every exit path
async fn run_guarded<S, F, Fut, T>(session: S, work: F) -> T
where
    S: Session,
    F: FnOnce(S) -> Fut,
    Fut: Future<Output = T>,
{
    let guard = SessionGuard {
        session: Some(session.clone()),
    };
    let result = work(session).await;
    guard.release().await;
    result
}

/// Runs `work` against a fresh browser session and always closes the session
/// afterwards. A failure to close is logged and never replaces the result.
pub async fn with_session<F, Fut, T>(config: &ScraperConfig, work: F) -> Result<T, ScrapeError>
where
    F: FnOnce(Client) -> Fut,
    Fut: Future<Output = T>,
{
    let client = connect(config).await?;
    Ok(run_guarded(client, work).await)
}
