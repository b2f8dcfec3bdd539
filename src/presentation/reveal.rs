use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde_json::json;
use tracing::info;

use super::{Presentation, ProbeRequest, SlideIndices, SlideMetrics, SlidePage, SlideSnapshot};
use crate::util::ensure_parent_directory;
use crate::webdriver::{SessionConfig, WebDriverSession, probe_url};

const PROBE_TIMEOUT: Duration = Duration::from_secs(15);

const IS_READY_SCRIPT: &str = "return Boolean(window.Reveal \
    && typeof window.Reveal.isReady === 'function' && window.Reveal.isReady());";

const SLIDE_COUNT_SCRIPT: &str = "return document.querySelectorAll('.slides > section').length;";

const GO_TO_SLIDE_SCRIPT: &str = "window.Reveal.slide(arguments[0]);";

const CURRENT_INDICES_SCRIPT: &str = "const i = window.Reveal.getIndices(); \
    return { h: i.h, v: i.v || 0, f: (typeof i.f === 'number') ? i.f : null };";

const REVEAL_FRAGMENTS_SCRIPT: &str = r#"
const slide = document.querySelectorAll('.slides > section')[arguments[0]];
if (slide) {
  slide.querySelectorAll('.fragment').forEach((el) => {
    el.classList.add('visible');
    el.classList.remove('fragment');
  });
}
"#;

const CONSOLE_HOOK_SCRIPT: &str = r#"
if (!window.__slidedeckErrors) {
  window.__slidedeckErrors = [];
  const original = console.error.bind(console);
  console.error = (...args) => {
    window.__slidedeckErrors.push(args.map((arg) => String(arg)).join(' '));
    original(...args);
  };
  window.addEventListener('error', (event) => {
    window.__slidedeckErrors.push(event.message || String(event));
  });
  window.addEventListener('unhandledrejection', (event) => {
    window.__slidedeckErrors.push('Unhandled rejection: ' + String(event.reason));
  });
}
"#;

const DRAIN_CONSOLE_SCRIPT: &str = "const out = window.__slidedeckErrors || []; \
    window.__slidedeckErrors = []; return out;";

const SNAPSHOT_SCRIPT: &str = r#"
const req = arguments[0];
const slide = document.querySelectorAll('.slides > section')[req.index];
if (!slide) {
  return { present: false };
}
const rectOf = (el) => {
  const r = el.getBoundingClientRect();
  return { left: r.left, top: r.top, right: r.right, bottom: r.bottom, width: r.width, height: r.height };
};
const vw = req.viewport.width;
const vh = req.viewport.height;

const images = Array.from(slide.querySelectorAll('img')).map((img) => ({
  src: img.getAttribute('src') || '',
  complete: Boolean(img.complete),
  naturalWidth: img.naturalWidth || 0,
  naturalHeight: img.naturalHeight || 0,
}));

const outOfBounds = [];
const walk = (el) => {
  const r = rectOf(el);
  if (r.width > 0 && r.height > 0 && (r.left < 0 || r.right > vw || r.top < 0 || r.bottom > vh)) {
    outOfBounds.push({
      tag: el.tagName.toLowerCase(),
      id: el.id || '',
      className: typeof el.className === 'string' ? el.className : '',
      rect: r,
    });
  }
  for (const child of el.children) {
    walk(child);
  }
};
walk(slide);

const fontGroups = req.fontGroups.map((selector) => ({
  selector,
  sizes: Array.from(slide.querySelectorAll(selector)).map((node) => {
    const style = window.getComputedStyle(node);
    return style ? style.fontSize : '';
  }),
}));

const iconGrids = req.iconGrids.flatMap((spec) => {
  const grid = slide.querySelector(spec.container);
  if (!grid) {
    return [];
  }
  const cards = Array.from(grid.querySelectorAll(spec.card));
  return [{
    container: spec.container,
    cardsWithIcon: cards.map((card) => Boolean(
      card.querySelector(spec.icon)
        || (spec.icon.includes('icon') && card.querySelector('[class*="icon"]'))
        || card.querySelector('img')
    )),
  }];
});

const cardGrids = req.cardGrids.flatMap((spec) =>
  Array.from(slide.querySelectorAll(spec.container)).map((grid, instance) => ({
    container: spec.container,
    instance,
    heights: Array.from(grid.querySelectorAll(spec.cards)).map((card) => card.getBoundingClientRect().height),
  }))
);

const diagrams = req.diagramSelector
  ? Array.from(slide.querySelectorAll(req.diagramSelector)).map((img) => ({
      src: (img.getAttribute('src') || '').split('/').pop(),
      rect: rectOf(img),
    }))
  : [];

return {
  present: true,
  slideRect: rectOf(slide),
  images,
  outOfBounds,
  fontGroups,
  iconGrids,
  cardGrids,
  diagrams,
  documentScrollWidth: document.documentElement.scrollWidth,
};
"#;

const MEASURE_SCRIPT: &str = r#"
const slide = document.querySelectorAll('.slides > section')[arguments[0]];
if (!slide) {
  return null;
}
const reveal = window.Reveal;
const config = reveal.getConfig();
const stage = document.querySelector('.reveal');
const container = document.querySelector('.slides');
return {
  slideScrollHeight: slide.scrollHeight,
  slideClientHeight: slide.clientHeight,
  slideBoundingHeight: Math.round(slide.getBoundingClientRect().height),
  stageHeight: stage ? Math.round(stage.getBoundingClientRect().height) : null,
  overflow: slide.scrollHeight - slide.clientHeight,
  configuredWidth: config.width,
  configuredHeight: config.height,
  scale: reveal.getScale(),
  containerTransform: container ? window.getComputedStyle(container).transform : 'none',
};
"#;

pub struct RevealPage {
    session: WebDriverSession,
}

impl RevealPage {
    pub fn open(config: &SessionConfig, url: &str) -> Result<Self> {
        probe_url(url, PROBE_TIMEOUT)?;

        let session = WebDriverSession::start(config)?;
        session.navigate(url)?;
        session.fit_viewport(config.viewport)?;
        session
            .execute(CONSOLE_HOOK_SCRIPT, Vec::new())
            .context("failed to install console error hook")?;

        info!(url, viewport = %config.viewport, "presentation loaded");
        Ok(Self { session })
    }

    pub fn close(self) -> Result<()> {
        self.session.close()
    }
}

impl Presentation for RevealPage {
    fn is_ready(&mut self) -> Result<bool> {
        self.session.execute_as(IS_READY_SCRIPT, Vec::new())
    }

    fn slide_count(&mut self) -> Result<usize> {
        self.session
            .execute_as(SLIDE_COUNT_SCRIPT, Vec::new())
            .context("failed to count slides")
    }

    fn go_to_slide(&mut self, index: usize) -> Result<()> {
        self.session
            .execute(GO_TO_SLIDE_SCRIPT, vec![json!(index)])
            .with_context(|| format!("failed to activate slide index {index}"))?;
        Ok(())
    }

    fn current_indices(&mut self) -> Result<SlideIndices> {
        self.session.execute_as(CURRENT_INDICES_SCRIPT, Vec::new())
    }
}

impl SlidePage for RevealPage {
    fn reveal_fragments(&mut self, index: usize) -> Result<()> {
        self.session
            .execute(REVEAL_FRAGMENTS_SCRIPT, vec![json!(index)])
            .with_context(|| format!("failed to reveal fragments on slide index {index}"))?;
        Ok(())
    }

    fn snapshot(&mut self, request: &ProbeRequest) -> Result<SlideSnapshot> {
        let argument = serde_json::to_value(request).context("failed to encode probe request")?;
        self.session
            .execute_as(SNAPSHOT_SCRIPT, vec![argument])
            .with_context(|| format!("failed to probe slide index {}", request.index))
    }

    fn drain_console_errors(&mut self) -> Result<Vec<String>> {
        self.session.execute_as(DRAIN_CONSOLE_SCRIPT, Vec::new())
    }

    fn capture_screenshot(&mut self, path: &Path) -> Result<()> {
        let png = self.session.screenshot_png()?;
        ensure_parent_directory(path)?;
        fs::write(path, png)
            .with_context(|| format!("failed to write screenshot {}", path.display()))
    }

    fn measure(&mut self, index: usize) -> Result<SlideMetrics> {
        let value = self
            .session
            .execute(MEASURE_SCRIPT, vec![json!(index)])
            .with_context(|| format!("failed to measure slide index {index}"))?;
        if value.is_null() {
            bail!("slide {} does not exist", index + 1);
        }
        let mut metrics: SlideMetrics =
            serde_json::from_value(value).context("unexpected measurement shape")?;
        metrics.slide = index + 1;
        Ok(metrics)
    }
}
