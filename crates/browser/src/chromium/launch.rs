use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig, HeadlessMode};
use futures::StreamExt;
use hireflow_core::{BrowserConfig, BrowserEngine, DriverError, DriverResult};
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Keeps cross-origin iframes in the page's own renderer so their documents
/// can be reached through the page session.
const SAME_PROCESS_FRAMES: &[&str] = &[
    "--disable-site-isolation-trials",
    "--disable-features=IsolateOrigins,site-per-process",
];

const STABILITY_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--disable-extensions",
];

const CHROME_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/opt/google/chrome/chrome",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
];

const EDGE_PATHS: &[&str] = &[
    "/usr/bin/microsoft-edge",
    "/usr/bin/microsoft-edge-stable",
    "/opt/microsoft/msedge/msedge",
    "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
    r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
];

/// Well-known install location of a branded engine. Chromium is left to the
/// launcher's own discovery and yields `None`.
pub fn executable_for(engine: BrowserEngine) -> Option<PathBuf> {
    let candidates = match engine {
        BrowserEngine::Chromium => return None,
        BrowserEngine::Chrome => CHROME_PATHS,
        BrowserEngine::Edge => EDGE_PATHS,
    };
    candidates
        .iter()
        .map(Path::new)
        .find(|p| p.exists())
        .map(Path::to_path_buf)
}

pub(super) struct Launched {
    pub browser: Browser,
    pub handler: JoinHandle<()>,
    pub profile_dir: PathBuf,
}

pub(super) async fn launch(config: &BrowserConfig) -> DriverResult<Launched> {
    let profile_dir = std::env::temp_dir().join(format!("hireflow-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&profile_dir)
        .map_err(|e| DriverError::Browser(format!("Failed to create profile dir: {}", e)))?;

    let mut builder = ChromeConfig::builder()
        .headless_mode(if config.headless { HeadlessMode::True } else { HeadlessMode::False })
        .user_data_dir(&profile_dir)
        .args(SAME_PROCESS_FRAMES.iter().chain(STABILITY_ARGS).map(|a| a.to_string()));

    if let (Some(w), Some(h)) = (config.viewport_width, config.viewport_height) {
        builder = builder.window_size(w, h);
    }

    let executable = config
        .executable
        .clone()
        .or_else(|| executable_for(config.engine));
    match (&executable, config.engine) {
        (Some(path), _) => builder = builder.chrome_executable(path),
        (None, BrowserEngine::Chromium) => {}
        (None, engine) => {
            return Err(DriverError::Browser(format!(
                "No executable found for {:?}; install it or pass an explicit path",
                engine
            )));
        }
    }

    let chrome_cfg = builder
        .build()
        .map_err(|e| DriverError::Browser(format!("Config failed: {}", e)))?;

    let (browser, mut handler) = Browser::launch(chrome_cfg)
        .await
        .map_err(|e| DriverError::Browser(format!("Launch failed: {}", e)))?;

    let handler = tokio::spawn(async move {
        while handler.next().await.is_some() {}
        debug!("browser event stream closed");
    });

    info!(
        engine = ?config.engine,
        headless = config.headless,
        executable = ?executable,
        "browser launched"
    );
    Ok(Launched {
        browser,
        handler,
        profile_dir,
    })
}
