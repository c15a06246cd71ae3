#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use hireflow_browser::shared::js;
use hireflow_browser::{ActionHandler, TimeoutConfig};
use hireflow_core::{
    ApplicantProfile, DefaultErrorHealer, Driver, DriverError, DriverResult, ElementHandle,
    Locator, RunReport, ScriptArg,
};
use hireflow_scenario::pages::position::SUBMIT_BUTTON;
use hireflow_scenario::{
    Diagnostics, HomePage, ListingPage, PositionForm, ScenarioConfig, ScenarioRunner,
};
use hireflow_storage::ArtifactStore;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

pub const BASE_URL: &str = "https://www.example.test/";

const FORM_FIELDS: [&str; 5] = [
    "first_name",
    "last_name",
    "email",
    "phone",
    "question_12434949004",
];

pub struct Job {
    pub title: &'static str,
    /// Attribute value exactly as the page renders it.
    pub department: &'static str,
    pub applyable: bool,
}

pub fn job(title: &'static str, department: &'static str) -> Job {
    Job {
        title,
        department,
        applyable: true,
    }
}

/// Five R&D openings (encoded the way the live board renders them) and one in Marketing.
pub fn five_rnd_jobs() -> Vec<Job> {
    vec![
        job("Backend Engineer", "R&amp;D"),
        job("Frontend Engineer", "R&amp;D"),
        job("QA Engineer", "R&amp;D"),
        job("Marketing Lead", "Marketing"),
        job("Data Engineer", "R&amp;D"),
        job("Mobile Engineer", "R&amp;D"),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Blank,
    Home,
    Listing,
    Job(usize),
}

pub struct State {
    pub url: String,
    pub page: Page,
    /// Bumped on every re-render; row handles of older generations are stale.
    pub generation: u32,
    pub banner: bool,
    pub selected: Option<String>,
    pub modal_open: bool,
    pub in_frame: bool,
    pub viewport_scrolls: u32,
    pub fields: HashMap<String, String>,
    pub uploaded: Option<PathBuf>,
    pub onsite_answered: bool,
    pub submit_clicked: bool,
    pub opened: Vec<usize>,
    pub calls: Vec<String>,
    /// Job index -> how many more apply clicks detach the row.
    pub stale_clicks: HashMap<usize, u32>,
    /// Job indices whose apply handler throws.
    pub broken_apply: Vec<usize>,
    /// Job indices whose form has no phone field.
    pub missing_phone: Vec<usize>,
}

impl State {
    fn new() -> Self {
        Self {
            url: "about:blank".into(),
            page: Page::Blank,
            generation: 0,
            banner: false,
            selected: None,
            modal_open: false,
            in_frame: false,
            viewport_scrolls: 0,
            fields: HashMap::new(),
            uploaded: None,
            onsite_answered: false,
            submit_clicked: false,
            opened: Vec::new(),
            calls: Vec::new(),
            stale_clicks: HashMap::new(),
            broken_apply: Vec::new(),
            missing_phone: Vec::new(),
        }
    }
}

enum Node<'a> {
    Static(&'a str),
    Option(usize),
    Row(usize),
    Apply(usize),
    Title(usize),
}

/// In-memory careers site speaking the [`Driver`] protocol.
pub struct FakeSite {
    pub jobs: Vec<Job>,
    /// (option text, option value) as rendered in the dropdown.
    pub departments: Vec<(&'static str, &'static str)>,
    pub frame_after_scrolls: u32,
    pub show_no_results: bool,
    pub footer_text_link: bool,
    pub back_link: bool,
    /// The one-shot consent script throws instead of clicking.
    pub banner_script_blocked: bool,
    pub accept_button: bool,
    /// Styled dropdown control of the on-site question.
    pub select_control: bool,
    /// A native click on the close button leaves the modal open.
    pub sticky_close_button: bool,
    pub state: Mutex<State>,
}

impl FakeSite {
    pub fn new(jobs: Vec<Job>) -> Self {
        Self {
            jobs,
            departments: vec![
                ("All departments", ""),
                ("R&amp;D", "R&amp;D"),
                ("Sales", "Sales"),
                ("Marketing", "Marketing"),
            ],
            frame_after_scrolls: 0,
            show_no_results: true,
            footer_text_link: true,
            back_link: true,
            banner_script_blocked: false,
            accept_button: true,
            select_control: true,
            sticky_close_button: false,
            state: Mutex::new(State::new()),
        }
    }

    pub fn with_frame_after(mut self, scrolls: u32) -> Self {
        self.frame_after_scrolls = scrolls;
        self
    }

    pub fn without_no_results(mut self) -> Self {
        self.show_no_results = false;
        self
    }

    pub fn without_footer_text_link(mut self) -> Self {
        self.footer_text_link = false;
        self
    }

    pub fn without_back_link(mut self) -> Self {
        self.back_link = false;
        self
    }

    pub fn with_blocked_banner_script(mut self) -> Self {
        self.banner_script_blocked = true;
        self
    }

    pub fn without_accept_button(mut self) -> Self {
        self.accept_button = false;
        self
    }

    pub fn without_select_control(mut self) -> Self {
        self.select_control = false;
        self
    }

    pub fn with_sticky_close_button(mut self) -> Self {
        self.sticky_close_button = true;
        self
    }

    pub fn stale_on_click(self, index: usize, times: u32) -> Self {
        self.state.lock().unwrap().stale_clicks.insert(index, times);
        self
    }

    pub fn break_apply(self, index: usize) -> Self {
        self.state.lock().unwrap().broken_apply.push(index);
        self
    }

    pub fn drop_phone_field(self, index: usize) -> Self {
        self.state.lock().unwrap().missing_phone.push(index);
        self
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn node<'a>(&self, state: &State, handle: &'a ElementHandle) -> DriverResult<Node<'a>> {
        let bad = || DriverError::NoSuchElement(format!("unknown handle {}", handle));
        let parts: Vec<&'a str> = handle.as_str().split(':').collect();
        match parts.as_slice() {
            ["option", k] => Ok(Node::Option(k.parse().map_err(|_| bad())?)),
            [kind, generation, index] => {
                let generation: u32 = generation.parse().map_err(|_| bad())?;
                let index: usize = index.parse().map_err(|_| bad())?;
                if generation != state.generation {
                    return Err(DriverError::StaleElement(handle.to_string()));
                }
                match *kind {
                    "row" => Ok(Node::Row(index)),
                    "apply" => Ok(Node::Apply(index)),
                    "title" => Ok(Node::Title(index)),
                    _ => Err(bad()),
                }
            }
            _ => Ok(Node::Static(handle.as_str())),
        }
    }

    fn row_visible(&self, state: &State, index: usize) -> bool {
        state.page == Page::Listing
            && match state.selected.as_deref() {
                None | Some("") => true,
                Some(value) => self.jobs[index].department == value,
            }
    }

    fn show_listing(&self, state: &mut State) {
        state.page = Page::Listing;
        state.url = format!("{}careers/", BASE_URL);
        state.selected = None;
        state.modal_open = false;
        state.generation += 1;
    }

    fn activate(&self, state: &mut State, handle: &ElementHandle) -> DriverResult<()> {
        match self.node(state, handle)? {
            Node::Static("careers_link") | Node::Static("back") => self.show_listing(state),
            Node::Static("submit") => state.submit_clicked = true,
            Node::Static("close") if !self.sticky_close_button => state.modal_open = false,
            Node::Static("accept") => state.banner = false,
            Node::Static("yes_option") => state.onsite_answered = true,
            Node::Apply(index) => {
                if let Some(left) = state.stale_clicks.get_mut(&index) {
                    if *left > 0 {
                        *left -= 1;
                        state.generation += 1;
                        return Err(DriverError::StaleElement("apply link detached".into()));
                    }
                }
                if state.broken_apply.contains(&index) {
                    return Err(DriverError::Script("apply handler threw".into()));
                }
                state.page = Page::Job(index);
                state.url = format!("{}careers/?gh_jid=40{}", BASE_URL, index);
                state.modal_open = true;
                state.in_frame = false;
                state.viewport_scrolls = 0;
                state.fields.clear();
                state.uploaded = None;
                state.onsite_answered = false;
                state.opened.push(index);
            }
            _ => {}
        }
        Ok(())
    }

    fn top_level_nodes(&self, state: &State, strategy: &str, selector: &str) -> Vec<String> {
        let one = |name: &str| vec![name.to_string()];
        match (state.page, strategy, selector) {
            (Page::Home, "xpath", "//footer//a[text()='Careers']") if self.footer_text_link => {
                one("careers_link")
            }
            (Page::Home, "id", "onetrust-banner-sdk") if state.banner => one("banner"),
            (Page::Home, "id", "onetrust-accept-btn-handler")
                if state.banner && self.accept_button =>
            {
                one("accept")
            }
            (Page::Listing, "id", "department-filter") => one("select"),
            (Page::Listing, "css", ".no-results") => one("no_results"),
            (Page::Listing, "css", rows) if rows.starts_with("tr[data-department='") => {
                let value = rows
                    .strip_prefix("tr[data-department='")
                    .and_then(|r| r.strip_suffix("']"))
                    .unwrap_or_default();
                self.jobs
                    .iter()
                    .enumerate()
                    .filter(|(_, job)| job.department == value)
                    .map(|(i, _)| format!("row:{}:{}", state.generation, i))
                    .collect()
            }
            (Page::Job(_), "css", "button[aria-label='Close']") if state.modal_open => one("close"),
            (Page::Job(_), "css", "a.section-careers-single-back") if self.back_link => {
                one("back")
            }
            (Page::Job(_), "id", "grnhse_iframe")
            | (Page::Job(_), "css", "iframe[src*='greenhouse'], iframe[id*='grnhse']")
            | (Page::Job(_), "css", "iframe")
                if state.viewport_scrolls >= self.frame_after_scrolls =>
            {
                one("iframe")
            }
            _ => Vec::new(),
        }
    }

    fn frame_nodes(&self, state: &State, strategy: &str, selector: &str) -> Vec<String> {
        let Page::Job(index) = state.page else {
            return Vec::new();
        };
        let one = |name: String| vec![name];
        match (strategy, selector) {
            ("id", "application-form") => one("form".into()),
            ("id", "phone") if state.missing_phone.contains(&index) => Vec::new(),
            ("id", field) if FORM_FIELDS.contains(&field) => one(format!("field:{}", field)),
            ("id", "resume") => one("resume".into()),
            ("css", ".file-upload__wrapper .btn") => one("upload_button".into()),
            ("css", ".select__control") if self.select_control => one("select_control".into()),
            ("css", "div[id^='react-select'][id$='-option-0']") => one("yes_option".into()),
            ("css", submit) if submit == SUBMIT_BUTTON.locator.selector() => one("submit".into()),
            _ => Vec::new(),
        }
    }

    fn element_arg(args: &[ScriptArg], index: usize) -> DriverResult<ElementHandle> {
        match args.get(index) {
            Some(ScriptArg::Element(handle)) => Ok(handle.clone()),
            _ => Err(DriverError::Script(format!("arguments[{}] is not an element", index))),
        }
    }

    fn string_arg(args: &[ScriptArg], index: usize) -> String {
        match args.get(index) {
            Some(ScriptArg::Value(Value::String(s))) => s.clone(),
            _ => String::new(),
        }
    }
}

#[async_trait]
impl Driver for FakeSite {
    async fn goto(&self, url: &str) -> DriverResult<()> {
        let mut state = self.state();
        state.calls.push(format!("goto:{}", url));
        state.page = Page::Home;
        state.url = url.to_string();
        state.banner = true;
        state.selected = None;
        state.modal_open = false;
        state.in_frame = false;
        state.generation += 1;
        Ok(())
    }

    async fn current_url(&self) -> DriverResult<String> {
        Ok(self.state().url.clone())
    }

    async fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<ElementHandle>> {
        let state = self.state();
        let (strategy, selector) = (locator.strategy(), locator.selector());
        let found = if state.in_frame {
            self.frame_nodes(&state, strategy, selector)
        } else {
            self.top_level_nodes(&state, strategy, selector)
        };
        Ok(found.into_iter().map(ElementHandle::new).collect())
    }

    async fn find_children(
        &self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> DriverResult<Vec<ElementHandle>> {
        let state = self.state();
        let found = match (self.node(&state, parent)?, locator.selector()) {
            (Node::Static("select"), "option") => (0..self.departments.len())
                .map(|k| format!("option:{}", k))
                .collect(),
            (Node::Row(i), "td.link a[href*='careers']") if self.jobs[i].applyable => {
                vec![format!("apply:{}:{}", state.generation, i)]
            }
            (Node::Row(i), "td.title") => vec![format!("title:{}:{}", state.generation, i)],
            _ => Vec::new(),
        };
        Ok(found.into_iter().map(ElementHandle::new).collect())
    }

    async fn is_displayed(&self, element: &ElementHandle) -> DriverResult<bool> {
        let state = self.state();
        Ok(match self.node(&state, element)? {
            Node::Row(i) => self.row_visible(&state, i),
            Node::Static("no_results") => {
                self.show_no_results
                    && match state.selected.as_deref() {
                        None | Some("") => false,
                        Some(value) => !self.jobs.iter().any(|j| j.department == value),
                    }
            }
            Node::Static("banner") => state.banner,
            Node::Static("close") => state.modal_open,
            _ => true,
        })
    }

    async fn is_enabled(&self, element: &ElementHandle) -> DriverResult<bool> {
        let state = self.state();
        self.node(&state, element).map(|_| true)
    }

    async fn text(&self, element: &ElementHandle) -> DriverResult<String> {
        let state = self.state();
        Ok(match self.node(&state, element)? {
            Node::Option(k) => self.departments[k].0.to_string(),
            Node::Title(i) => self.jobs[i].title.to_string(),
            Node::Apply(_) => "Apply now".to_string(),
            _ => String::new(),
        })
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> DriverResult<Option<String>> {
        let state = self.state();
        Ok(match (self.node(&state, element)?, name) {
            (Node::Option(k), "value") => Some(self.departments[k].1.to_string()),
            (Node::Row(i), "data-department") => Some(self.jobs[i].department.to_string()),
            _ => None,
        })
    }

    async fn value(&self, element: &ElementHandle) -> DriverResult<String> {
        let state = self.state();
        let field = element.as_str().strip_prefix("field:").unwrap_or_default();
        Ok(state.fields.get(field).cloned().unwrap_or_default())
    }

    async fn click(&self, element: &ElementHandle) -> DriverResult<()> {
        let mut state = self.state();
        state.calls.push(format!("click:{}", element));
        self.activate(&mut state, element)
    }

    async fn clear(&self, element: &ElementHandle) -> DriverResult<()> {
        let mut state = self.state();
        if let Some(field) = element.as_str().strip_prefix("field:") {
            state.fields.insert(field.to_string(), String::new());
        }
        Ok(())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> DriverResult<()> {
        let mut state = self.state();
        match element.as_str().strip_prefix("field:") {
            Some(field) => {
                state.fields.entry(field.to_string()).or_default().push_str(text);
                Ok(())
            }
            None => Err(DriverError::NotInteractable(element.to_string())),
        }
    }

    async fn set_file(&self, element: &ElementHandle, path: &Path) -> DriverResult<()> {
        let mut state = self.state();
        if element.as_str() != "resume" {
            return Err(DriverError::NotInteractable(element.to_string()));
        }
        state.uploaded = Some(path.to_path_buf());
        Ok(())
    }

    async fn execute(&self, script: &str, args: Vec<ScriptArg>) -> DriverResult<Value> {
        let mut state = self.state();
        let label = script.trim().lines().next().unwrap_or_default().to_string();
        state.calls.push(format!("script:{}", label));

        if script == js::page::JS_CLICK {
            let handle = Self::element_arg(&args, 0)?;
            state.calls.push(format!("js_click:{}", handle));
            self.activate(&mut state, &handle)?;
            return Ok(json!(true));
        }
        if script == js::page::SCROLL_INTO_VIEW || script == js::page::REVEAL_FILE_INPUT {
            let handle = Self::element_arg(&args, 0)?;
            self.node(&state, &handle)?;
            return Ok(json!(true));
        }
        if script == js::page::SCROLL_BY_VIEWPORT {
            state.viewport_scrolls += 1;
            return Ok(json!(state.viewport_scrolls * 1080));
        }
        if script == js::page::SCROLL_TO_BOTTOM {
            return Ok(json!(true));
        }
        if script == js::page::SELECT_OPTION {
            state.selected = Some(Self::string_arg(&args, 1));
            state.generation += 1;
            return Ok(json!(true));
        }
        if script == js::page::DISPATCH_ESCAPE {
            state.modal_open = false;
            return Ok(json!(true));
        }
        if script == js::cookie::DISMISS_BANNER {
            if self.banner_script_blocked {
                return Err(DriverError::Script("consent script blocked".into()));
            }
            let was_shown = std::mem::replace(&mut state.banner, false);
            return Ok(json!(if was_shown { "clicked" } else { "absent" }));
        }
        if script == js::cookie::REMOVE_BANNER {
            state.banner = false;
            return Ok(json!(2));
        }
        if script.contains("aria-label=\"Close\"") {
            let was_open = std::mem::replace(&mut state.modal_open, false);
            return Ok(json!(was_open));
        }
        if script.contains("react-select") {
            let answered = state.in_frame;
            state.onsite_answered |= answered;
            return Ok(json!(answered));
        }
        Ok(Value::Null)
    }

    async fn query(
        &self,
        script: &str,
        _args: Vec<ScriptArg>,
    ) -> DriverResult<Option<ElementHandle>> {
        let state = self.state();
        if state.page != Page::Home {
            return Ok(None);
        }
        let by_text = script.contains("document.evaluate") && self.footer_text_link;
        let by_href = script.contains("footer a[href");
        Ok((by_text || by_href).then(|| ElementHandle::new("careers_link")))
    }

    async fn switch_to_frame(&self, frame: &ElementHandle) -> DriverResult<()> {
        let mut state = self.state();
        if frame.as_str() != "iframe" {
            return Err(DriverError::Frame(format!("{} is not a frame", frame)));
        }
        state.in_frame = true;
        Ok(())
    }

    async fn switch_to_default(&self) -> DriverResult<()> {
        self.state().in_frame = false;
        Ok(())
    }

    async fn in_frame(&self) -> bool {
        self.state().in_frame
    }

    async fn screenshot(&self) -> DriverResult<Vec<u8>> {
        self.state().calls.push("screenshot".into());
        Ok(b"\x89PNG\r\n\x1a\n".to_vec())
    }
}

/// Artifact sink that keeps everything in memory.
#[derive(Default)]
pub struct MemoryStore {
    pub screenshots: Mutex<Vec<String>>,
    pub reports: Mutex<Vec<RunReport>>,
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn save_screenshot(&self, tag: &str, _png: &[u8]) -> Result<PathBuf> {
        self.screenshots.lock().unwrap().push(tag.to_string());
        Ok(PathBuf::from(format!("{}.png", tag)))
    }

    async fn save_report(&self, report: &RunReport) -> Result<PathBuf> {
        self.reports.lock().unwrap().push(report.clone());
        Ok(PathBuf::from("run.json"))
    }
}

pub struct Harness {
    pub site: Arc<FakeSite>,
    pub store: Arc<MemoryStore>,
    pub config: Arc<ScenarioConfig>,
    _cv: NamedTempFile,
}

impl Harness {
    pub fn new(site: FakeSite, department: &str) -> Self {
        let mut cv = tempfile::Builder::new()
            .prefix("example_cv")
            .suffix(".pdf")
            .tempfile()
            .unwrap();
        cv.write_all(b"%PDF-1.4\n").unwrap();

        let profile = ApplicantProfile {
            first_name: "Test".into(),
            last_name: "Automation".into(),
            email: "test.automation@example.com".into(),
            phone: "+1234567890".into(),
            linkedin_url: Some("https://www.linkedin.com/in/test-automation".into()),
            cv_path: cv.path().to_path_buf(),
        };
        let mut config = ScenarioConfig::new(profile);
        config.base_url = BASE_URL.to_string();
        config.department = department.to_string();
        config.frame_scrolls = 4;

        Self {
            site: Arc::new(site),
            store: Arc::new(MemoryStore::default()),
            config: Arc::new(config),
            _cv: cv,
        }
    }

    pub fn runner(&self) -> ScenarioRunner {
        ScenarioRunner::with_timeouts(
            self.config.clone(),
            self.site.clone(),
            self.store.clone(),
            TimeoutConfig::instant(),
        )
    }

    pub fn actions(&self) -> Arc<ActionHandler> {
        Arc::new(ActionHandler::new(self.site.clone(), TimeoutConfig::instant()))
    }

    pub fn home(&self) -> HomePage {
        let diagnostics = Arc::new(Diagnostics::new(self.site.clone(), self.store.clone()));
        HomePage::new(self.actions(), self.config.clone(), diagnostics)
    }

    pub fn form(&self) -> PositionForm {
        PositionForm::new(self.actions(), &self.config.careers_path, self.config.frame_scrolls)
    }

    pub fn listing(&self) -> ListingPage {
        ListingPage::new(
            self.actions(),
            self.form(),
            Arc::new(DefaultErrorHealer::new(3)),
            &self.config.careers_path,
        )
    }

    /// Home page, careers link, then the listing page object.
    pub async fn at_listing(&self) -> ListingPage {
        let home = self.home();
        home.open().await.unwrap();
        home.navigate_to_careers().await.unwrap();
        self.listing()
    }

    pub fn calls(&self) -> Vec<String> {
        self.site.state().calls.clone()
    }

    pub fn gotos(&self) -> usize {
        self.calls().iter().filter(|c| c.starts_with("goto:")).count()
    }

    /// Whether the page ran `script`, recognised by its first line.
    pub fn ran(&self, script: &str) -> bool {
        let label = format!("script:{}", script.trim().lines().next().unwrap_or_default());
        self.calls().contains(&label)
    }
}
