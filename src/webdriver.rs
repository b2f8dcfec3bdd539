use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Method;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::cli::BrowserKind;
use crate::model::Viewport;

const HTTP_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub webdriver_url: String,
    pub browser: BrowserKind,
    pub headless: bool,
    pub viewport: Viewport,
    pub page_load_timeout: Duration,
    pub script_timeout: Duration,
}

pub struct WebDriverSession {
    client: Client,
    base_url: String,
    session_id: String,
    closed: bool,
}

impl WebDriverSession {
    pub fn start(config: &SessionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("failed to build webdriver http client")?;
        let base_url = config.webdriver_url.trim_end_matches('/').to_string();

        let value = send_command(
            &client,
            &base_url,
            Method::POST,
            "/session",
            Some(&session_capabilities(config)),
        )
        .with_context(|| {
            format!(
                "failed to start {} session at {base_url}; is the driver running?",
                config.browser.as_str()
            )
        })?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
            .context("webdriver new-session response has no sessionId")?;

        info!(
            browser = config.browser.as_str(),
            headless = config.headless,
            session_id = %session_id,
            "browser session started"
        );

        let session = Self {
            client,
            base_url,
            session_id,
            closed: false,
        };
        session.command(
            Method::POST,
            "timeouts",
            Some(&json!({
                "pageLoad": config.page_load_timeout.as_millis() as u64,
                "script": config.script_timeout.as_millis() as u64,
            })),
        )?;
        Ok(session)
    }

    pub fn navigate(&self, url: &str) -> Result<()> {
        self.command(Method::POST, "url", Some(&json!({ "url": url })))
            .with_context(|| format!("failed to navigate to {url}"))?;
        Ok(())
    }

    pub fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        self.command(
            Method::POST,
            "execute/sync",
            Some(&json!({ "script": script, "args": args })),
        )
    }

    pub fn execute_as<T: DeserializeOwned>(&self, script: &str, args: Vec<Value>) -> Result<T> {
        let value = self.execute(script, args)?;
        serde_json::from_value(value).context("unexpected script result shape")
    }

    pub fn fit_viewport(&self, viewport: Viewport) -> Result<()> {
        let (inner_width, inner_height): (i64, i64) =
            self.execute_as("return [window.innerWidth, window.innerHeight];", Vec::new())?;
        if inner_width == i64::from(viewport.width) && inner_height == i64::from(viewport.height)
        {
            return Ok(());
        }

        let rect = self.command(Method::GET, "window/rect", None)?;
        let outer_width = rect.get("width").and_then(Value::as_i64).unwrap_or(inner_width);
        let outer_height = rect
            .get("height")
            .and_then(Value::as_i64)
            .unwrap_or(inner_height);
        let width = outer_width + i64::from(viewport.width) - inner_width;
        let height = outer_height + i64::from(viewport.height) - inner_height;

        debug!(inner_width, inner_height, width, height, "resizing browser window");
        self.command(
            Method::POST,
            "window/rect",
            Some(&json!({ "width": width, "height": height })),
        )?;
        Ok(())
    }

    pub fn screenshot_png(&self) -> Result<Vec<u8>> {
        let value = self.command(Method::GET, "screenshot", None)?;
        let encoded = value
            .as_str()
            .context("webdriver screenshot response is not a string")?;
        BASE64
            .decode(encoded)
            .context("webdriver screenshot is not valid base64")
    }

    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.delete_session()
    }

    fn delete_session(&self) -> Result<()> {
        send_command(
            &self.client,
            &self.base_url,
            Method::DELETE,
            &format!("/session/{}", self.session_id),
            None,
        )?;
        info!(session_id = %self.session_id, "browser session closed");
        Ok(())
    }

    fn command(&self, method: Method, endpoint: &str, body: Option<&Value>) -> Result<Value> {
        let path = format!("/session/{}/{endpoint}", self.session_id);
        send_command(&self.client, &self.base_url, method, &path, body)
    }
}

impl Drop for WebDriverSession {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(err) = self.delete_session() {
            warn!(error = %err, session_id = %self.session_id, "failed to close browser session");
        }
    }
}

fn send_command(
    client: &Client,
    base_url: &str,
    method: Method,
    path: &str,
    body: Option<&Value>,
) -> Result<Value> {
    let url = format!("{base_url}{path}");
    let mut request = client.request(method.clone(), &url);
    if let Some(body) = body {
        request = request.json(body);
    }

    let response = request
        .send()
        .with_context(|| format!("webdriver request failed: {method} {path}"))?;
    let status = response.status().as_u16();
    let text = response
        .text()
        .with_context(|| format!("failed to read webdriver response: {method} {path}"))?;

    parse_webdriver_response(status, &text).with_context(|| format!("webdriver {method} {path}"))
}

pub fn parse_webdriver_response(status: u16, body: &str) -> Result<Value> {
    let payload: Value = if body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(body)
            .with_context(|| format!("webdriver returned non-json body (status {status})"))?
    };
    let value = payload.get("value").cloned().unwrap_or(Value::Null);

    if (200..300).contains(&status) {
        return Ok(value);
    }

    let code = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error");
    let message = value.get("message").and_then(Value::as_str).unwrap_or("");
    Err(anyhow!("{code} (status {status}): {}", message.trim()))
}

pub fn session_capabilities(config: &SessionConfig) -> Value {
    let Viewport { width, height } = config.viewport;
    let always_match = match config.browser {
        BrowserKind::Chromium => {
            let mut args = vec![
                format!("--window-size={width},{height}"),
                "--hide-scrollbars".to_string(),
            ];
            if config.headless {
                args.push("--headless=new".to_string());
            }
            json!({
                "browserName": "chrome",
                "goog:chromeOptions": { "args": args },
            })
        }
        BrowserKind::Firefox => {
            let mut args = vec![format!("--width={width}"), format!("--height={height}")];
            if config.headless {
                args.push("-headless".to_string());
            }
            json!({
                "browserName": "firefox",
                "moz:firefoxOptions": { "args": args },
            })
        }
    };

    json!({ "capabilities": { "alwaysMatch": always_match } })
}

pub fn probe_url(url: &str, timeout: Duration) -> Result<()> {
    let client = Client::builder()
        .timeout(timeout)
        .build()
        .context("failed to build http client")?;
    let response = client
        .get(url)
        .send()
        .with_context(|| format!("failed to load {url}; is the dev server running?"))?;
    let status = response.status();
    if status.as_u16() != 200 {
        bail!(
            "presentation at {url} answered with status {}; is the dev server running?",
            status.as_u16()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(browser: BrowserKind, headless: bool) -> SessionConfig {
        SessionConfig {
            webdriver_url: "http://localhost:9515".to_string(),
            browser,
            headless,
            viewport: Viewport::new(1280, 720),
            page_load_timeout: Duration::from_secs(15),
            script_timeout: Duration::from_secs(30),
        }
    }

    #[test]
    fn parse_webdriver_response_unwraps_value_on_success() {
        let value = parse_webdriver_response(200, r#"{"value": {"sessionId": "abc"}}"#)
            .expect("success payload should parse");
        assert_eq!(value["sessionId"], "abc");

        let null = parse_webdriver_response(200, "").expect("empty body is null");
        assert!(null.is_null());
    }

    #[test]
    fn parse_webdriver_response_surfaces_error_code_and_message() {
        let err = parse_webdriver_response(
            404,
            r#"{"value": {"error": "no such window", "message": "window closed\n", "stacktrace": ""}}"#,
        )
        .expect_err("error status should fail");
        let text = err.to_string();
        assert!(text.contains("no such window"));
        assert!(text.contains("status 404"));
        assert!(text.contains("window closed"));
    }

    #[test]
    fn chromium_capabilities_carry_headless_and_window_size() {
        let caps = session_capabilities(&config(BrowserKind::Chromium, true));
        let always = &caps["capabilities"]["alwaysMatch"];
        assert_eq!(always["browserName"], "chrome");
        let args = always["goog:chromeOptions"]["args"]
            .as_array()
            .expect("chrome args");
        assert!(args.iter().any(|arg| arg == "--headless=new"));
        assert!(args.iter().any(|arg| arg == "--window-size=1280,720"));
    }

    #[test]
    fn headed_firefox_capabilities_omit_headless_flag() {
        let caps = session_capabilities(&config(BrowserKind::Firefox, false));
        let always = &caps["capabilities"]["alwaysMatch"];
        assert_eq!(always["browserName"], "firefox");
        let args = always["moz:firefoxOptions"]["args"]
            .as_array()
            .expect("firefox args");
        assert!(!args.iter().any(|arg| arg == "-headless"));
        assert!(args.iter().any(|arg| arg == "--width=1280"));
    }
}
