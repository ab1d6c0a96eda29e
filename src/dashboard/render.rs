//! HTML rendering for the status dashboard
//!
//! The controller never builds markup itself; it hands records to a
//! `Renderer` and stores the fragments it gets back. `HtmlRenderer` is the
//! Bootstrap markup the portal ships with.

use chrono::DateTime;

use crate::status::{DatasetRecord, GroupField};

use super::controller::{DashboardPage, NavItem};

/// Produces HTML fragments for the dashboard
pub trait Renderer: Send + Sync {
    /// Table of incomplete datasets
    fn incomplete_table(&self, records: &[DatasetRecord]) -> String;

    /// General dataset table used by every other view
    fn datasets_table(&self, records: &[DatasetRecord]) -> String;

    /// Items of one navbar dropdown
    fn group_menu(&self, field: GroupField, values: &[String], active: Option<&str>) -> String;

    /// Banner shown when no dataset is incomplete
    fn complete_banner(&self) -> String;
}

/// Bootstrap markup
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn incomplete_table(&self, records: &[DatasetRecord]) -> String {
        let rows: String = records
            .iter()
            .map(|r| {
                format!(
                    r#"<tr><td>{name}</td><td>{provider}</td><td class="{created_class}" data-value="{created_ms}">{created}</td>{erddap}{thredds}</tr>"#,
                    name = html_escape(r.name()),
                    provider = opt_text(r.raw.username.as_deref()),
                    created_class = r.created_status.map(|s| s.css_class()).unwrap_or(""),
                    created_ms = r.raw.created.unwrap_or_default(),
                    created = format_time(r.raw.created),
                    erddap = endpoint_cell(r.raw.tabledap.as_deref(), "ERDDAP"),
                    thredds = endpoint_cell(r.raw.tds.as_deref(), "THREDDS"),
                )
            })
            .collect();

        format!(
            r#"<table class="table table-condensed sortable" id="incomplete-datasets-table">
<thead><tr><th>Deployment</th><th>Provider</th><th data-defaultsort="desc">Created</th><th>ERDDAP</th><th>THREDDS</th></tr></thead>
<tbody>{}</tbody>
</table>"#,
            rows
        )
    }

    fn datasets_table(&self, records: &[DatasetRecord]) -> String {
        let rows: String = records
            .iter()
            .map(|r| {
                format!(
                    concat!(
                        r#"<tr class="{row_class}"><td>{name}</td><td>{institution}</td><td>{operator}</td><td>{provider}</td><td>{wmo}</td>"#,
                        r#"<td class="{created_class}">{created}</td><td>{updated}</td><td>{start}</td>"#,
                        r#"<td class="{coverage_class}">{end}</td>{erddap}{thredds}</tr>"#
                    ),
                    row_class = r.data_status.map(|s| s.css_class()).unwrap_or(""),
                    name = html_escape(r.name()),
                    institution = opt_text(r.raw.institution.as_deref()),
                    operator = opt_text(r.raw.operator.as_deref()),
                    provider = opt_text(r.raw.username.as_deref()),
                    wmo = opt_text(r.raw.wmo_id.as_deref()),
                    created_class = r.created_status.map(|s| s.css_class()).unwrap_or(""),
                    created = format_time(r.raw.created),
                    updated = format_time(r.raw.updated),
                    start = format_time(r.raw.start),
                    coverage_class = r.time_coverage_status.map(|s| s.css_class()).unwrap_or(""),
                    end = format_time(r.raw.end),
                    erddap = endpoint_cell(r.raw.tabledap.as_deref(), "ERDDAP"),
                    thredds = endpoint_cell(r.raw.tds.as_deref(), "THREDDS"),
                )
            })
            .collect();

        format!(
            r#"<table class="table table-condensed sortable" id="datasets-table">
<thead><tr><th>Deployment</th><th>Institution</th><th>Operator</th><th>Provider</th><th>WMO ID</th><th>Created</th><th>Updated</th><th>Start</th><th data-defaultsort="desc">End</th><th>ERDDAP</th><th>THREDDS</th></tr></thead>
<tbody>{}</tbody>
</table>"#,
            rows
        )
    }

    fn group_menu(&self, field: GroupField, values: &[String], active: Option<&str>) -> String {
        values
            .iter()
            .map(|value| {
                format!(
                    r#"<li{active}><a class="{class}" href="/group/{class}/{href}">{text}</a></li>"#,
                    active = if Some(value.as_str()) == active {
                        r#" class="active""#
                    } else {
                        ""
                    },
                    class = field.link_class(),
                    href = urlencoding::encode(value),
                    text = html_escape(value),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn complete_banner(&self) -> String {
        concat!(
            r#"<div class="alert alert-success alert-dismissable center">"#,
            r#"<button type="button" class="close" data-dismiss="alert" aria-label="Close">"#,
            r#"<span aria-hidden="true">&times;</span></button>"#,
            r#"<h3>All Datasets Are Complete</h3>"#,
            "ERDDAP and THREDDS end points exist for all registered deployments.  Have a nice day.",
            "</div>"
        )
        .to_string()
    }
}

/// Assemble the full dashboard document around already-rendered fragments
pub fn render_page(page: &DashboardPage) -> String {
    let nav_link = |item: NavItem, label: &str| {
        format!(
            r#"<li{active}><a id="{id}" href="/view/{slug}">{label}</a></li>"#,
            active = if page.active == Some(item) { r#" class="active""# } else { "" },
            id = item.element_id(),
            slug = item.slug(),
            label = label,
        )
    };

    let dropdowns: String = page
        .menus
        .iter()
        .map(|(field, items)| {
            format!(
                r##"<li class="dropdown{active}"><a href="#" class="dropdown-toggle" data-toggle="dropdown">{label} <span class="caret"></span></a><ul class="dropdown-menu scrollable-menu" id="{id}-dropdown">{items}</ul></li>"##,
                active = if page.active_group == Some(*field) { " active" } else { "" },
                label = field.label(),
                id = dropdown_id(*field),
                items = items,
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="https://maxcdn.bootstrapcdn.com/bootstrap/3.3.7/css/bootstrap.min.css">
    <style>{css}</style>
</head>
<body>
    <nav class="navbar navbar-default navbar-fixed-top">
        <div class="container-fluid">
            <div class="navbar-header"><a class="navbar-brand" href="/">{title}</a></div>
            <ul class="nav navbar-nav">
                {incomplete}
                {all}
                {latest}
                {dropdowns}
            </ul>
            <p class="navbar-text navbar-right">UTC <span id="utc-clock">{clock}</span></p>
        </div>
    </nav>
    <div class="container-fluid">
        <h4 id="status-msg">{caption}</h4>
        <div id="content">{content}</div>
    </div>
    <script src="https://code.jquery.com/jquery-1.12.4.min.js"></script>
    <script src="https://maxcdn.bootstrapcdn.com/bootstrap/3.3.7/js/bootstrap.min.js"></script>
</body>
</html>"#,
        title = html_escape(&page.title),
        css = DASHBOARD_CSS,
        incomplete = nav_link(NavItem::Incomplete, "Incomplete"),
        all = nav_link(NavItem::All, "All Datasets"),
        latest = nav_link(NavItem::Latest, "Latest"),
        dropdowns = dropdowns,
        clock = html_escape(&page.clock),
        caption = html_escape(&page.caption),
        content = page.content,
    )
}

fn dropdown_id(field: GroupField) -> &'static str {
    match field {
        GroupField::Institution => "institutions",
        GroupField::Operator => "operators",
        GroupField::Provider => "providers",
        GroupField::WmoId => "wmo",
    }
}

/// Display form of an epoch-millisecond timestamp, in UTC on two lines
pub fn format_time(millis: Option<i64>) -> String {
    millis
        .and_then(DateTime::from_timestamp_millis)
        .map(|dt| dt.format("%Y-%m-%d<br />%H:%M").to_string())
        .unwrap_or_default()
}

fn endpoint_cell(url: Option<&str>, label: &str) -> String {
    match url {
        Some(url) => format!(
            r#"<td><a href="{}" target="_blank">{}</a></td>"#,
            html_escape(url),
            label
        ),
        None => r#"<td class="bg-danger">missing</td>"#.to_string(),
    }
}

fn opt_text(value: Option<&str>) -> String {
    value.map(html_escape).unwrap_or_default()
}

pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const DASHBOARD_CSS: &str = r#"
body { padding-top: 60px; }
.scrollable-menu { height: auto; max-height: 400px; overflow-x: hidden; }
.center { text-align: center; }
td.none { color: #999; }
#status-msg { margin: 12px 0; }
"#;
