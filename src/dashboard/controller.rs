//! Dashboard controller
//!
//! Owns the classified feed for a page session and the current view mode.
//! Every transition recomputes the displayed subset through the classifier,
//! asks the renderer for the content fragment and rewrites the caption.
//!
//! ```text
//! Loading ──load ok──▶ Loaded(AllIncomplete | Latest)
//!                         │ show(nav) / select_group(non-empty)
//!                         ▼
//!                      Loaded(mode')
//! ```
//!
//! A failed load leaves the controller where it was: still `Loading` on the
//! first attempt, or on the previously loaded feed for a refresh.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::status::{
    classify, distinct_group_values, filter_by_field, incomplete, latest_updated, sort_by_name,
    DatasetRecord, GroupField, StatusDocument, StatusError, StatusFeed, StatusFeedLoader,
    LATEST_LIMIT,
};

use super::error::{DashboardError, DashboardResult};
use super::render::Renderer;

/// Top-level navigation links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavItem {
    Incomplete,
    All,
    Latest,
}

impl NavItem {
    /// Path segment used in `/view/{slug}`
    pub fn slug(&self) -> &'static str {
        match self {
            NavItem::Incomplete => "incomplete",
            NavItem::All => "all",
            NavItem::Latest => "latest",
        }
    }

    pub fn element_id(&self) -> &'static str {
        match self {
            NavItem::Incomplete => "incomplete-datasets",
            NavItem::All => "all-datasets",
            NavItem::Latest => "latest",
        }
    }
}

impl std::str::FromStr for NavItem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "incomplete" | "incomplete-datasets" => Ok(NavItem::Incomplete),
            "all" | "all-datasets" => Ok(NavItem::All),
            "latest" => Ok(NavItem::Latest),
            other => Err(format!("unknown view: {}", other)),
        }
    }
}

/// Which lens is applied to the record set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewMode {
    AllIncomplete,
    AllDatasets,
    Latest,
    GroupFilter { field: GroupField, value: String },
}

impl ViewMode {
    /// Navbar entry highlighted for this mode
    pub fn nav_item(&self) -> Option<NavItem> {
        match self {
            ViewMode::AllIncomplete => Some(NavItem::Incomplete),
            ViewMode::AllDatasets => Some(NavItem::All),
            ViewMode::Latest => Some(NavItem::Latest),
            ViewMode::GroupFilter { .. } => None,
        }
    }
}

/// Controller lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardState {
    Loading,
    Loaded(ViewMode),
}

/// What is currently on screen
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardViewState {
    pub records: Vec<DatasetRecord>,
    pub caption: String,
    /// The success banner is part of the content
    pub banner: bool,
    /// Rendered content fragment
    pub content: String,
}

/// Everything needed to render the full dashboard document
#[derive(Debug, Clone)]
pub struct DashboardPage {
    pub title: String,
    pub clock: String,
    pub active: Option<NavItem>,
    pub active_group: Option<GroupField>,
    /// Rendered dropdown items per group field; empty until loaded
    pub menus: Vec<(GroupField, String)>,
    pub caption: String,
    pub content: String,
}

/// Owns the feed and the current view for one page session
pub struct DashboardController {
    loader: StatusFeedLoader,
    renderer: Arc<dyn Renderer>,
    latest_limit: usize,
    feed: Option<StatusFeed>,
    incomplete: Vec<DatasetRecord>,
    groups: BTreeMap<GroupField, Vec<String>>,
    state: DashboardState,
    view: Option<DashboardViewState>,
}

impl DashboardController {
    pub fn new(loader: StatusFeedLoader, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            loader,
            renderer,
            latest_limit: LATEST_LIMIT,
            feed: None,
            incomplete: Vec::new(),
            groups: BTreeMap::new(),
            state: DashboardState::Loading,
            view: None,
        }
    }

    /// Builder method: number of rows in the latest view
    pub fn latest_limit(mut self, limit: usize) -> Self {
        self.latest_limit = limit;
        self
    }

    pub fn loader(&self) -> &StatusFeedLoader {
        &self.loader
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn mode(&self) -> Option<&ViewMode> {
        match &self.state {
            DashboardState::Loaded(mode) => Some(mode),
            DashboardState::Loading => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.feed.is_some()
    }

    pub fn feed(&self) -> Option<&StatusFeed> {
        self.feed.as_ref()
    }

    pub fn view(&self) -> Option<&DashboardViewState> {
        self.view.as_ref()
    }

    /// Distinct values of a group field; empty until loaded
    pub fn group_values(&self, field: GroupField) -> &[String] {
        self.groups.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Fetch the feed once and apply it
    ///
    /// On failure nothing changes and the error is returned; there is no retry.
    pub async fn load(&mut self, now: DateTime<Utc>) -> DashboardResult<&DashboardViewState> {
        match self.loader.load().await {
            Ok(document) => Ok(self.apply(document, now)),
            Err(e) => Err(self.load_failed(e)),
        }
    }

    /// Record a failed fetch made through `loader()`
    ///
    /// Used when the fetch runs without the controller borrowed; state is
    /// left untouched.
    pub fn load_failed(&self, error: StatusError) -> DashboardError {
        tracing::error!(
            source = %self.loader.describe(),
            error = %error,
            loaded = self.is_loaded(),
            "Failed to load status feed"
        );
        error.into()
    }

    /// Classify a fetched document and make the initial transition
    pub fn apply(&mut self, document: StatusDocument, now: DateTime<Utc>) -> &DashboardViewState {
        let mut records = classify(&document.datasets, now.timestamp_millis());
        sort_by_name(&mut records);

        self.incomplete = incomplete(&records);
        self.groups = GroupField::all()
            .iter()
            .map(|field| (*field, distinct_group_values(&records, *field)))
            .collect();
        self.feed = Some(StatusFeed {
            fetch_time: document.meta.fetch_time,
            records,
        });

        let mode = if self.incomplete.is_empty() {
            ViewMode::Latest
        } else {
            ViewMode::AllIncomplete
        };
        let mut view = self.build_view(&mode);
        if mode == ViewMode::Latest {
            view.content = format!("{}{}", self.renderer.complete_banner(), view.content);
            view.banner = true;
        }

        tracing::info!(
            datasets = self.feed.as_ref().map(StatusFeed::len).unwrap_or(0),
            incomplete = self.incomplete.len(),
            mode = ?mode,
            "Dashboard loaded"
        );

        self.state = DashboardState::Loaded(mode);
        self.view.insert(view)
    }

    /// Switch to one of the navbar views
    pub fn show(&mut self, nav: NavItem) -> DashboardResult<&DashboardViewState> {
        if !self.is_loaded() {
            return Err(DashboardError::NotLoaded);
        }

        let mode = match nav {
            NavItem::Incomplete => ViewMode::AllIncomplete,
            NavItem::All => ViewMode::AllDatasets,
            NavItem::Latest => ViewMode::Latest,
        };
        let view = self.build_view(&mode);

        tracing::debug!(mode = ?mode, rows = view.records.len(), "Dashboard view changed");
        self.state = DashboardState::Loaded(mode);
        Ok(&*self.view.insert(view))
    }

    /// Show the datasets whose `field` equals `value`
    ///
    /// Returns `false` and keeps the current view when nothing matches.
    pub fn select_group(&mut self, field: GroupField, value: &str) -> DashboardResult<bool> {
        let feed = self.feed.as_ref().ok_or(DashboardError::NotLoaded)?;

        if filter_by_field(&feed.records, field, value).is_empty() {
            tracing::debug!(field = %field, value = %value, "Group selection matched nothing");
            return Ok(false);
        }

        let mode = ViewMode::GroupFilter {
            field,
            value: value.to_string(),
        };
        let view = self.build_view(&mode);
        self.state = DashboardState::Loaded(mode);
        self.view = Some(view);
        Ok(true)
    }

    /// Page model for the current state
    pub fn page(&self, title: &str, now: DateTime<Utc>) -> DashboardPage {
        let mode = self.mode();
        let (active_group, active_value) = match mode {
            Some(ViewMode::GroupFilter { field, value }) => (Some(*field), Some(value.as_str())),
            _ => (None, None),
        };

        let menus = if self.is_loaded() {
            GroupField::all()
                .iter()
                .map(|field| {
                    let active = if active_group == Some(*field) { active_value } else { None };
                    (
                        *field,
                        self.renderer
                            .group_menu(*field, self.group_values(*field), active),
                    )
                })
                .collect()
        } else {
            Vec::new()
        };

        DashboardPage {
            title: title.to_string(),
            clock: now.format("%Y-%m-%d %H:%M:%S").to_string(),
            active: mode.and_then(ViewMode::nav_item),
            active_group,
            menus,
            caption: self.view.as_ref().map(|v| v.caption.clone()).unwrap_or_default(),
            content: self.view.as_ref().map(|v| v.content.clone()).unwrap_or_default(),
        }
    }

    fn build_view(&self, mode: &ViewMode) -> DashboardViewState {
        let (records, fetch_time) = match &self.feed {
            Some(feed) => (feed.records.as_slice(), feed.fetch_time.as_str()),
            None => (&[][..], ""),
        };

        match mode {
            ViewMode::AllIncomplete => {
                let count = self.incomplete.len();
                let (content, banner) = if count > 0 {
                    (self.renderer.incomplete_table(&self.incomplete), false)
                } else {
                    (self.renderer.complete_banner(), true)
                };
                DashboardViewState {
                    records: self.incomplete.clone(),
                    caption: format!("{} Incomplete Datasets as of: {}", count, fetch_time),
                    banner,
                    content,
                }
            }
            ViewMode::AllDatasets => self.table_view(
                records.to_vec(),
                format!("{} Selected Datasets as of: {}", records.len(), fetch_time),
            ),
            ViewMode::Latest => {
                let latest = latest_updated(records, self.latest_limit);
                let caption = format!("{} Latest Dataset Updates as of: {}", latest.len(), fetch_time);
                self.table_view(latest, caption)
            }
            ViewMode::GroupFilter { field, value } => {
                let selected = filter_by_field(records, *field, value);
                let caption = format!("{} Selected Datasets as of: {}", selected.len(), fetch_time);
                self.table_view(selected, caption)
            }
        }
    }

    fn table_view(&self, records: Vec<DatasetRecord>, caption: String) -> DashboardViewState {
        DashboardViewState {
            content: self.renderer.datasets_table(&records),
            records,
            caption,
            banner: false,
        }
    }
}
