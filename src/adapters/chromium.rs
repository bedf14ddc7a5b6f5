use crate::domain::ports::{BrowserLauncher, BrowserSession, PageElement};
use crate::utils::error::{PriceBotError, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Upper bound for every individual step of stopping Chrome.
const SHUTDOWN_STEP_TIMEOUT: Duration = Duration::from_secs(10);

/// Launch settings for the headless browser. Headless mode, `--no-sandbox`
/// and `--disable-dev-shm-usage` are always applied.
#[derive(Debug, Clone, Default)]
pub struct ChromiumConfig {
    /// Chrome/Chromium binary; chromiumoxide searches the usual locations
    /// when unset.
    pub executable: Option<PathBuf>,
}

/// Starts a fresh headless Chrome process for every session.
#[derive(Debug, Clone, Default)]
pub struct ChromiumLauncher {
    config: ChromiumConfig,
}

impl ChromiumLauncher {
    pub fn new(config: ChromiumConfig) -> Self {
        Self { config }
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu");

        if let Some(path) = &self.config.executable {
            builder = builder.chrome_executable(path);
        }

        builder
            .build()
            .map_err(|e| PriceBotError::browser(format!("invalid browser config: {}", e)))
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn open_session(&self) -> Result<Box<dyn BrowserSession>> {
        tracing::debug!("Launching headless Chrome");
        let (browser, mut handler) = Browser::launch(self.browser_config()?)
            .await
            .map_err(|e| PriceBotError::browser(format!("failed to launch browser: {}", e)))?;

        // Drives the CDP websocket; the browser is unusable without it.
        // Individual errors (e.g. an event chromiumoxide cannot decode) are
        // not fatal, so only the end of the stream stops the loop.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler error: {}", e);
                }
            }
            tracing::debug!("CDP handler event loop ended");
        });

        let mut session = ChromiumSession {
            browser: Some(browser),
            page: None,
            handler_task,
        };

        match session.new_page().await {
            Ok(page) => {
                session.page = Some(page);
                Ok(Box::new(session))
            }
            Err(e) => {
                // The caller never sees this session, so shut it down here.
                if let Err(close_err) = session.close().await {
                    tracing::warn!("Browser cleanup after failed start: {}", close_err);
                }
                Err(e)
            }
        }
    }
}

struct ChromiumSession {
    browser: Option<Browser>,
    page: Option<Page>,
    handler_task: JoinHandle<()>,
}

impl ChromiumSession {
    async fn new_page(&self) -> Result<Page> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| PriceBotError::browser("browser already closed"))?;
        browser
            .new_page("about:blank")
            .await
            .map_err(|e| PriceBotError::browser(format!("failed to open page: {}", e)))
    }

    fn page(&self) -> Result<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| PriceBotError::browser("browser session is closed"))
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.page()?
            .goto(url)
            .await
            .map_err(|e| PriceBotError::browser(format!("navigation to {} failed: {}", url, e)))?;
        Ok(())
    }

    async fn find_all(&mut self, selector: &str) -> Result<Vec<Box<dyn PageElement>>> {
        let elements = self
            .page()?
            .find_elements(selector)
            .await
            .map_err(|e| PriceBotError::browser(format!("lookup of `{}` failed: {}", selector, e)))?;

        Ok(elements
            .into_iter()
            .map(|element| Box::new(ChromiumElement(element)) as Box<dyn PageElement>)
            .collect())
    }

    async fn close(&mut self) -> Result<()> {
        self.page = None;
        let outcome = match self.browser.take() {
            Some(mut browser) => shut_down(&mut browser, SHUTDOWN_STEP_TIMEOUT).await,
            None => Ok(()),
        };
        self.handler_task.abort();
        outcome
    }
}

/// Process controls needed to stop a browser.
#[async_trait]
trait BrowserProcess: Send {
    /// Polite CDP `Browser.close`; needs a live handler.
    async fn request_close(&mut self) -> Result<()>;
    async fn force_kill(&mut self) -> Result<()>;
    async fn wait_exit(&mut self) -> Result<()>;
}

#[async_trait]
impl BrowserProcess for Browser {
    async fn request_close(&mut self) -> Result<()> {
        self.close()
            .await
            .map(|_| ())
            .map_err(|e| PriceBotError::browser(format!("failed to close browser: {}", e)))
    }

    async fn force_kill(&mut self) -> Result<()> {
        match self.kill().await {
            Some(Err(e)) => Err(PriceBotError::browser(format!("failed to kill browser: {}", e))),
            _ => Ok(()),
        }
    }

    async fn wait_exit(&mut self) -> Result<()> {
        self.wait().await?;
        Ok(())
    }
}

/// Stops the browser process and always returns. A failed or stalled close
/// request falls back to killing the process, and so does a process that
/// does not exit within `step_timeout`.
async fn shut_down<P>(process: &mut P, step_timeout: Duration) -> Result<()>
where
    P: BrowserProcess + ?Sized,
{
    let requested = match tokio::time::timeout(step_timeout, process.request_close()).await {
        Ok(result) => result,
        Err(_) => Err(PriceBotError::browser("close request timed out")),
    };

    if let Err(e) = &requested {
        tracing::warn!("Killing browser after failed close: {}", e);
        kill_within(process, step_timeout).await;
    }

    match tokio::time::timeout(step_timeout, process.wait_exit()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::debug!("Waiting for browser exit failed: {}", e),
        Err(_) => {
            tracing::warn!("Browser still running after {:?}, killing it", step_timeout);
            kill_within(process, step_timeout).await;
        }
    }

    requested
}

async fn kill_within<P>(process: &mut P, step_timeout: Duration)
where
    P: BrowserProcess + ?Sized,
{
    match tokio::time::timeout(step_timeout, process.force_kill()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!("{}", e),
        Err(_) => tracing::warn!("Browser kill timed out"),
    }
}

struct ChromiumElement(Element);

#[async_trait]
impl PageElement for ChromiumElement {
    async fn text(&self) -> Result<String> {
        let text = self
            .0
            .inner_text()
            .await
            .map_err(|e| PriceBotError::browser(format!("reading element text failed: {}", e)))?;
        Ok(text.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_config_accepts_explicit_executable() {
        let launcher = ChromiumLauncher::new(ChromiumConfig {
            executable: Some(PathBuf::from("/usr/bin/chromium")),
        });
        assert!(launcher.browser_config().is_ok());
    }

    /// Chrome stand-in: exits only after an accepted close request or a kill.
    #[derive(Default)]
    struct FakeProcess {
        close_fails: bool,
        close_hangs: bool,
        ignores_close: bool,
        running: bool,
        close_requests: usize,
        kills: usize,
    }

    impl FakeProcess {
        fn running() -> Self {
            Self {
                running: true,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl BrowserProcess for FakeProcess {
        async fn request_close(&mut self) -> Result<()> {
            self.close_requests += 1;
            if self.close_hangs {
                return std::future::pending().await;
            }
            if self.close_fails {
                return Err(PriceBotError::browser("receiver is gone"));
            }
            if !self.ignores_close {
                self.running = false;
            }
            Ok(())
        }

        async fn force_kill(&mut self) -> Result<()> {
            self.kills += 1;
            self.running = false;
            Ok(())
        }

        async fn wait_exit(&mut self) -> Result<()> {
            if self.running {
                return std::future::pending().await;
            }
            Ok(())
        }
    }

    async fn shut_down_bounded(process: &mut FakeProcess) -> Result<()> {
        tokio::time::timeout(
            Duration::from_secs(5),
            shut_down(process, Duration::from_millis(50)),
        )
        .await
        .expect("shutdown must not hang")
    }

    #[tokio::test]
    async fn test_clean_close_does_not_kill() {
        let mut process = FakeProcess::running();

        shut_down_bounded(&mut process).await.unwrap();

        assert_eq!(process.close_requests, 1);
        assert_eq!(process.kills, 0);
        assert!(!process.running);
    }

    #[tokio::test]
    async fn test_failed_close_kills_instead_of_waiting_forever() {
        // A dead CDP handler makes the close request fail while Chrome runs on.
        let mut process = FakeProcess {
            close_fails: true,
            ..FakeProcess::running()
        };

        let result = shut_down_bounded(&mut process).await;

        assert!(matches!(result, Err(PriceBotError::BrowserError { .. })));
        assert_eq!(process.kills, 1);
        assert!(!process.running);
    }

    #[tokio::test]
    async fn test_stalled_close_times_out_and_kills() {
        let mut process = FakeProcess {
            close_hangs: true,
            ..FakeProcess::running()
        };

        let result = shut_down_bounded(&mut process).await;

        assert!(result.is_err());
        assert_eq!(process.kills, 1);
        assert!(!process.running);
    }

    #[tokio::test]
    async fn test_process_ignoring_close_is_killed_after_wait_timeout() {
        let mut process = FakeProcess {
            ignores_close: true,
            ..FakeProcess::running()
        };

        shut_down_bounded(&mut process).await.unwrap();

        assert_eq!(process.kills, 1);
        assert!(!process.running);
    }
}
