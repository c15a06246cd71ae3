use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::dom::{DescribeNodeParams, SetFileInputFilesParams};
use chromiumoxide::cdp::browser_protocol::input::InsertTextParams;
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams, CreateIsolatedWorldParams,
};
use chromiumoxide::cdp::js_protocol::runtime::{
    CallArgument, CallFunctionOnParams, EvaluateParams, ExceptionDetails, ExecutionContextId,
    GetPropertiesParams, RemoteObject, RemoteObjectId, RemoteObjectSubtype,
};
use chromiumoxide::layout::Point;
use chromiumoxide::page::Page;
use hireflow_core::{
    BrowserConfig, Driver, DriverError, DriverResult, ElementHandle, Locator, ScriptArg,
};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::launch::{Launched, launch};
use crate::shared::{TimeoutConfig, js, to_driver_error};
use crate::wait::WaitStrategy;

#[derive(Debug, Clone)]
struct ActiveFrame {
    context: ExecutionContextId,
    /// Top-level viewport position of the frame's content box.
    offset_x: f64,
    offset_y: f64,
}

/// [`Driver`] over a single Chromium page, spoken to through the DevTools protocol.
///
/// Element handles are runtime object ids. Entering a frame creates an
/// isolated world inside it; later lookups and scripts run in that world until
/// [`Driver::switch_to_default`].
pub struct ChromiumDriver {
    browser: Mutex<Browser>,
    page: Page,
    frame: Mutex<Option<ActiveFrame>>,
    handler: JoinHandle<()>,
    profile_dir: PathBuf,
    timeouts: TimeoutConfig,
}

impl ChromiumDriver {
    pub async fn launch(config: &BrowserConfig, timeouts: TimeoutConfig) -> DriverResult<Self> {
        let Launched {
            browser,
            handler,
            profile_dir,
        } = launch(config).await?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| DriverError::Browser(format!("New page failed: {}", e)))?;

        Ok(Self {
            browser: Mutex::new(browser),
            page,
            frame: Mutex::new(None),
            handler,
            profile_dir,
            timeouts,
        })
    }

    /// Shuts the browser down and removes its throwaway profile.
    pub async fn close(&self) -> DriverResult<()> {
        let mut browser = self.browser.lock().await;
        if let Err(e) = browser.close().await {
            warn!(error = %e, "browser did not close cleanly");
        }
        let _ = browser.wait().await;
        self.handler.abort();
        if let Err(e) = tokio::fs::remove_dir_all(&self.profile_dir).await {
            debug!(error = %e, dir = %self.profile_dir.display(), "profile dir not removed");
        }
        info!("browser closed");
        Ok(())
    }

    async fn active_frame(&self) -> Option<ActiveFrame> {
        self.frame.lock().await.clone()
    }

    /// The `document` of the active context.
    async fn document(&self) -> DriverResult<RemoteObjectId> {
        let mut params = EvaluateParams::new("document");
        params.context_id = self.active_frame().await.map(|f| f.context);
        params.return_by_value = Some(false);

        let resp = self
            .page
            .execute(params)
            .await
            .map_err(|e| to_driver_error(e, "Document"))?;
        let returns = resp.result;
        if let Some(ex) = returns.exception_details {
            return Err(DriverError::Script(exception_message(&ex)));
        }
        returns
            .result
            .object_id
            .ok_or_else(|| DriverError::Browser("document has no object id".into()))
    }

    async fn call_on(
        &self,
        target: RemoteObjectId,
        body: &str,
        args: Vec<CallArgument>,
        by_value: bool,
        action: &str,
    ) -> DriverResult<RemoteObject> {
        let mut params = CallFunctionOnParams::new(js::element::guarded(body));
        params.object_id = Some(target);
        params.arguments = Some(args);
        params.return_by_value = Some(by_value);
        params.await_promise = Some(true);

        let resp = self
            .page
            .execute(params)
            .await
            .map_err(|e| to_driver_error(e, action))?;
        let returns = resp.result;
        if let Some(ex) = returns.exception_details {
            let message = exception_message(&ex);
            return Err(if message.contains("stale element reference") {
                DriverError::StaleElement(format!("{}: {}", action, message))
            } else {
                DriverError::Script(format!("{}: {}", action, message))
            });
        }
        Ok(returns.result)
    }

    async fn call_value(
        &self,
        element: &ElementHandle,
        body: &str,
        args: Vec<CallArgument>,
        action: &str,
    ) -> DriverResult<Value> {
        let object = self.call_on(object_id(element), body, args, true, action).await?;
        Ok(object.value.unwrap_or(Value::Null))
    }

    /// Expands a returned array into one handle per element, in index order.
    async fn array_handles(&self, array: RemoteObject) -> DriverResult<Vec<ElementHandle>> {
        let Some(array_id) = array.object_id else {
            return Ok(Vec::new());
        };
        let mut params = GetPropertiesParams::new(array_id);
        params.own_properties = Some(true);

        let resp = self
            .page
            .execute(params)
            .await
            .map_err(|e| to_driver_error(e, "FindElements"))?;

        let mut indexed: Vec<(usize, ElementHandle)> = resp
            .result
            .result
            .into_iter()
            .filter_map(|prop| {
                let index = prop.name.parse::<usize>().ok()?;
                let id = prop.value?.object_id?;
                Some((index, ElementHandle::new(id.inner().clone())))
            })
            .collect();
        indexed.sort_by_key(|(i, _)| *i);
        Ok(indexed.into_iter().map(|(_, h)| h).collect())
    }

    async fn find_from(
        &self,
        root: RemoteObjectId,
        locator: &Locator,
    ) -> DriverResult<Vec<ElementHandle>> {
        let array = self
            .call_on(
                root,
                js::element::FIND_ALL,
                vec![
                    by_value(json!(locator.strategy())),
                    by_value(json!(locator.selector())),
                ],
                false,
                "FindElements",
            )
            .await?;
        self.array_handles(array).await
    }

    async fn rect(&self, element: &ElementHandle) -> DriverResult<(f64, f64, f64, f64, f64, f64)> {
        let r = self
            .call_value(element, js::element::ELEMENT_RECT, vec![], "Rect")
            .await?;
        let n = |k: &str| r.get(k).and_then(Value::as_f64).unwrap_or(0.0);
        Ok((
            n("x"),
            n("y"),
            n("width"),
            n("height"),
            n("borderLeft"),
            n("borderTop"),
        ))
    }

    fn to_call_arguments(args: Vec<ScriptArg>) -> Vec<CallArgument> {
        args.into_iter()
            .map(|arg| match arg {
                ScriptArg::Value(v) => by_value(v),
                ScriptArg::Element(h) => CallArgument {
                    value: None,
                    unserializable_value: None,
                    object_id: Some(object_id(&h)),
                },
            })
            .collect()
    }
}

fn object_id(handle: &ElementHandle) -> RemoteObjectId {
    RemoteObjectId::new(handle.as_str())
}

fn by_value(value: Value) -> CallArgument {
    CallArgument {
        value: Some(value),
        unserializable_value: None,
        object_id: None,
    }
}

fn exception_message(ex: &ExceptionDetails) -> String {
    ex.exception
        .as_ref()
        .and_then(|o| o.description.clone())
        .unwrap_or_else(|| ex.text.clone())
}

#[async_trait]
impl Driver for ChromiumDriver {
    async fn goto(&self, url: &str) -> DriverResult<()> {
        *self.frame.lock().await = None;
        self.page
            .goto(url)
            .await
            .map_err(|e| DriverError::Navigation(format!("{}: {}", url, e)))?;
        WaitStrategy::new(self.timeouts.clone())
            .wait_for_stable(self)
            .await
    }

    async fn current_url(&self) -> DriverResult<String> {
        self.page
            .url()
            .await
            .map_err(|e| to_driver_error(e, "CurrentUrl"))
            .map(Option::unwrap_or_default)
    }

    async fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<ElementHandle>> {
        let root = self.document().await?;
        self.find_from(root, locator).await
    }

    async fn find_children(
        &self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> DriverResult<Vec<ElementHandle>> {
        self.find_from(object_id(parent), locator).await
    }

    async fn is_displayed(&self, element: &ElementHandle) -> DriverResult<bool> {
        let state = self
            .call_value(element, js::element::CHECK_ELEMENT_STATE, vec![], "IsDisplayed")
            .await?;
        Ok(state.get("visible").and_then(Value::as_bool).unwrap_or(false))
    }

    async fn is_enabled(&self, element: &ElementHandle) -> DriverResult<bool> {
        let state = self
            .call_value(element, js::element::CHECK_ELEMENT_STATE, vec![], "IsEnabled")
            .await?;
        Ok(!state.get("disabled").and_then(Value::as_bool).unwrap_or(false))
    }

    async fn text(&self, element: &ElementHandle) -> DriverResult<String> {
        let text = self
            .call_value(element, js::element::READ_TEXT, vec![], "Text")
            .await?;
        Ok(text.as_str().unwrap_or_default().to_string())
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> DriverResult<Option<String>> {
        let value = self
            .call_value(
                element,
                js::element::READ_ATTRIBUTE,
                vec![by_value(json!(name))],
                "Attribute",
            )
            .await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn value(&self, element: &ElementHandle) -> DriverResult<String> {
        let value = self
            .call_value(element, js::element::READ_VALUE, vec![], "Value")
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn click(&self, element: &ElementHandle) -> DriverResult<()> {
        self.call_value(element, js::element::SCROLL_TO_CENTER, vec![], "Click")
            .await?;
        let (x, y, width, height, _, _) = self.rect(element).await?;
        if width <= 0.0 || height <= 0.0 {
            return Err(DriverError::NotInteractable(format!(
                "{} has no layout box",
                element
            )));
        }

        let (dx, dy) = self
            .active_frame()
            .await
            .map_or((0.0, 0.0), |f| (f.offset_x, f.offset_y));
        let point = Point::new(x + width / 2.0 + dx, y + height / 2.0 + dy);
        self.page
            .click(point)
            .await
            .map_err(|e| to_driver_error(e, "Click"))?;
        Ok(())
    }

    async fn clear(&self, element: &ElementHandle) -> DriverResult<()> {
        self.call_value(element, js::element::CLEAR_VALUE, vec![], "Clear")
            .await
            .map(|_| ())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> DriverResult<()> {
        let focused = self
            .call_value(element, js::element::FOCUS, vec![], "SendKeys")
            .await?;
        if focused.as_bool() != Some(true) {
            return Err(DriverError::NotInteractable(format!(
                "{} did not take focus",
                element
            )));
        }
        self.page
            .execute(InsertTextParams::new(text))
            .await
            .map_err(|e| to_driver_error(e, "SendKeys"))?;
        Ok(())
    }

    async fn set_file(&self, element: &ElementHandle, path: &Path) -> DriverResult<()> {
        if !path.is_file() {
            return Err(DriverError::Io(format!("{} is not a file", path.display())));
        }
        let mut params = SetFileInputFilesParams::new(vec![path.to_string_lossy().into_owned()]);
        params.object_id = Some(object_id(element));
        self.page
            .execute(params)
            .await
            .map_err(|e| to_driver_error(e, "SetFile"))?;
        self.call_value(element, js::element::DISPATCH_INPUT, vec![], "SetFile")
            .await
            .map(|_| ())
    }

    async fn execute(&self, script: &str, args: Vec<ScriptArg>) -> DriverResult<Value> {
        let root = self.document().await?;
        let object = self
            .call_on(root, script, Self::to_call_arguments(args), true, "Execute")
            .await?;
        Ok(object.value.unwrap_or(Value::Null))
    }

    async fn query(
        &self,
        script: &str,
        args: Vec<ScriptArg>,
    ) -> DriverResult<Option<ElementHandle>> {
        let root = self.document().await?;
        let object = self
            .call_on(root, script, Self::to_call_arguments(args), false, "Query")
            .await?;
        if matches!(object.subtype, Some(RemoteObjectSubtype::Null)) {
            return Ok(None);
        }
        Ok(object
            .object_id
            .map(|id| ElementHandle::new(id.inner().clone())))
    }

    async fn switch_to_frame(&self, frame: &ElementHandle) -> DriverResult<()> {
        let (x, y, _, _, border_left, border_top) = self.rect(frame).await?;

        let describe = DescribeNodeParams::builder()
            .object_id(object_id(frame))
            .build();
        let node = self
            .page
            .execute(describe)
            .await
            .map_err(|e| to_driver_error(e, "SwitchToFrame"))?
            .result
            .node;
        let frame_id = node
            .frame_id
            .ok_or_else(|| DriverError::Frame(format!("{} does not own a frame", frame)))?;

        let mut world = CreateIsolatedWorldParams::new(frame_id);
        world.world_name = Some("hireflow".to_string());
        let context = self
            .page
            .execute(world)
            .await
            .map_err(|e| DriverError::Frame(format!("isolated world: {}", e)))?
            .result
            .execution_context_id;

        let mut active = self.frame.lock().await;
        let (base_x, base_y) = active.as_ref().map_or((0.0, 0.0), |f| (f.offset_x, f.offset_y));
        *active = Some(ActiveFrame {
            context,
            offset_x: base_x + x + border_left,
            offset_y: base_y + y + border_top,
        });
        debug!(frame = %frame, "entered frame");
        Ok(())
    }

    async fn switch_to_default(&self) -> DriverResult<()> {
        *self.frame.lock().await = None;
        Ok(())
    }

    async fn in_frame(&self) -> bool {
        self.frame.lock().await.is_some()
    }

    async fn screenshot(&self) -> DriverResult<Vec<u8>> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        self.page
            .screenshot(params)
            .await
            .map_err(|e| DriverError::Browser(format!("Screenshot failed: {}", e)))
    }
}
