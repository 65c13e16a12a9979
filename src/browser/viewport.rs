use fantoccini::Client;
use serde_json::Value;
use std::time::Duration;

use crate::config::ScrollConfig;
use crate::error::ScrapeError;

/// The scrollable surface of a loaded page
#[allow(async_fn_in_trait)]
pub trait Viewport {
    /// Current `document.body.scrollHeight`
    async fn document_height(&self) -> Result<i64, ScrapeError>;

    async fn scroll_to_bottom(&self) -> Result<(), ScrapeError>;

    async fn scroll_by(&self, pixels: i64) -> Result<(), ScrapeError>;

    async fn scroll_to_top(&self) -> Result<(), ScrapeError>;
}

impl Viewport for Client {
    async fn document_height(&self) -> Result<i64, ScrapeError> {
        let value = self
            .execute("return document.body.scrollHeight;", vec![])
            .await?;
        Ok(height_from(&value))
    }

    async fn scroll_to_bottom(&self) -> Result<(), ScrapeError> {
        self.execute("window.scrollTo(0, document.body.scrollHeight);", vec![])
            .await?;
        Ok(())
    }

    async fn scroll_by(&self, pixels: i64) -> Result<(), ScrapeError> {
        self.execute(
            "window.scrollBy(0, arguments[0]);",
            vec![Value::from(pixels)],
        )
        .await?;
        Ok(())
    }

    async fn scroll_to_top(&self) -> Result<(), ScrapeError> {
        self.execute("window.scrollTo(0, 0);", vec![]).await?;
        Ok(())
    }
}

fn height_from(value: &Value) -> i64 {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|height| height as i64))
        .unwrap_or(0)
}

/// Outcome of the lazy-load scroll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollSummary {
    /// Scrolls to the bottom performed
    pub probes: usize,
    /// Height observed last
    pub final_height: i64,
    /// True when the probe cap ended the loop before the page stopped growing
    pub capped: bool,
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Default)]
struct ScrollProgress {
    probes: usize,
    idle_probes: usize,
    last_height: i64,
}

/// Scrolls to the bottom until the document height stops growing, then back to the top.
///
/// A probe that sees no growth is followed by a small nudge; any growth resets
/// the idle count. The loop ends after `max_idle_probes` idle probes in a row,
/// or after `max_total_probes` probes in total. A failing probe ends the loop
/// early; the viewport is still returned to the top before the error is reported.
pub async fn scroll_until_stable<V: Viewport>(
    viewport: &V,
    config: &ScrollConfig,
) -> Result<ScrollSummary, ScrapeError> {
    let mut progress = ScrollProgress::default();
    let probed = probe_until_stable(viewport, config, &mut progress).await;

    let capped = match &probed {
        Ok(()) => progress.idle_probes < config.max_idle_probes,
        Err(e) => {
            ::log::warn!(
                "Scrolling interrupted after {} probes: {}",
                progress.probes,
                e
            );
            false
        }
    };
    if capped {
        ::log::warn!(
            "Page still growing after {} scroll probes, continuing with what is loaded",
            progress.probes
        );
    }

    viewport.scroll_to_top().await?;
    pause(Duration::from_millis(config.settle_ms)).await;
    probed?;

    Ok(ScrollSummary {
        probes: progress.probes,
        final_height: progress.last_height,
        capped,
    })
}

async fn probe_until_stable<V: Viewport>(
    viewport: &V,
    config: &ScrollConfig,
    progress: &mut ScrollProgress,
) -> Result<(), ScrapeError> {
    let pause_interval = Duration::from_millis(config.pause_ms);
    let nudge_interval = Duration::from_millis(config.nudge_pause_ms);

    progress.last_height = viewport.document_height().await?;

    while progress.idle_probes < config.max_idle_probes
        && progress.probes < config.max_total_probes
    {
        progress.probes += 1;
        viewport.scroll_to_bottom().await?;
        pause(pause_interval).await;

        let new_height = viewport.document_height().await?;
        if new_height == progress.last_height {
            progress.idle_probes += 1;
            if progress.idle_probes < config.max_idle_probes {
                pause(nudge_interval).await;
                viewport.scroll_by(config.nudge_px).await?;
                pause(nudge_interval).await;
            }
        } else {
            progress.idle_probes = 0;
            progress.last_height = new_height;
            ::log::debug!("More content loaded, page height is now {}px", new_height);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Page whose height grows by one step per scroll until `growth_steps` run out
    struct FakePage {
        height: RefCell<i64>,
        growth_steps: RefCell<usize>,
        /// Scroll to the bottom number at which the browser stops answering
        fail_on_probe: Option<usize>,
        log: RefCell<Vec<&'static str>>,
    }

    impl FakePage {
        fn new(height: i64, growth_steps: usize) -> Self {
            Self {
                height: RefCell::new(height),
                growth_steps: RefCell::new(growth_steps),
                fail_on_probe: None,
                log: RefCell::new(Vec::new()),
            }
        }

        fn failing_on(probe: usize, growth_steps: usize) -> Self {
            Self {
                fail_on_probe: Some(probe),
                ..Self::new(1000, growth_steps)
            }
        }

        fn count(&self, action: &str) -> usize {
            self.log.borrow().iter().filter(|a| **a == action).count()
        }
    }

    impl Viewport for FakePage {
        async fn document_height(&self) -> Result<i64, ScrapeError> {
            Ok(*self.height.borrow())
        }

        async fn scroll_to_bottom(&self) -> Result<(), ScrapeError> {
            self.log.borrow_mut().push("bottom");
            if Some(self.count("bottom")) == self.fail_on_probe {
                return Err(ScrapeError::Session("session deleted".to_string()));
            }
            let mut steps = self.growth_steps.borrow_mut();
            if *steps > 0 {
                *steps -= 1;
                *self.height.borrow_mut() += 800;
            }
            Ok(())
        }

        async fn scroll_by(&self, _pixels: i64) -> Result<(), ScrapeError> {
            self.log.borrow_mut().push("nudge");
            Ok(())
        }

        async fn scroll_to_top(&self) -> Result<(), ScrapeError> {
            self.log.borrow_mut().push("top");
            Ok(())
        }
    }

    fn instant(max_idle_probes: usize, max_total_probes: usize) -> ScrollConfig {
        ScrollConfig {
            pause_ms: 0,
            nudge_pause_ms: 0,
            nudge_px: 500,
            max_idle_probes,
            max_total_probes,
            settle_ms: 0,
        }
    }

    #[tokio::test]
    async fn test_static_page_stops_after_idle_probes() {
        let page = FakePage::new(1000, 0);
        let summary = scroll_until_stable(&page, &instant(3, 50)).await.unwrap();

        assert_eq!(summary.probes, 3);
        assert_eq!(summary.final_height, 1000);
        assert!(!summary.capped);
        // no nudge after the final idle probe
        assert_eq!(page.count("nudge"), 2);
        assert_eq!(page.log.borrow().last(), Some(&"top"));
    }

    #[tokio::test]
    async fn test_growth_resets_idle_count() {
        let page = FakePage::new(1000, 4);
        let summary = scroll_until_stable(&page, &instant(2, 50)).await.unwrap();

        // four growing probes followed by two idle ones
        assert_eq!(summary.probes, 6);
        assert_eq!(summary.final_height, 1000 + 4 * 800);
        assert!(!summary.capped);
    }

    #[tokio::test]
    async fn test_endless_page_hits_probe_cap() {
        let page = FakePage::new(1000, usize::MAX);
        let summary = scroll_until_stable(&page, &instant(3, 7)).await.unwrap();

        assert_eq!(summary.probes, 7);
        assert!(summary.capped);
        assert_eq!(page.count("top"), 1);
    }

    #[tokio::test]
    async fn test_failed_probe_still_returns_to_top() {
        let page = FakePage::failing_on(3, 10);
        let result = scroll_until_stable(&page, &instant(3, 50)).await;

        assert!(matches!(result, Err(ScrapeError::Session(_))));
        assert_eq!(page.count("bottom"), 3);
        assert_eq!(page.log.borrow().last(), Some(&"top"));
    }

    #[test]
    fn test_height_from_json_number() {
        assert_eq!(height_from(&Value::from(2400)), 2400);
        assert_eq!(height_from(&Value::from(2400.7)), 2400);
        assert_eq!(height_from(&Value::Null), 0);
    }
}
