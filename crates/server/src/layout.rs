use std::fmt::{Display, Write};

use shared::{
    domain::{AboutText, FilterSelection, PageSize},
    protocol::{DashboardControls, RangeControl, TablePage},
};

use crate::query::selection_query;

const BOOTSTRAP_CSS: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css";

/// Full dashboard page. Every control change resubmits the form, so the
/// server always renders from the complete current selection.
pub(crate) fn render_dashboard(
    about: &AboutText,
    controls: &DashboardControls,
    selection: &FilterSelection,
    table: &TablePage,
) -> String {
    let mut html = String::with_capacity(16 * 1024);
    html.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>GapMinder</title>\n");
    let _ = writeln!(html, "<link rel=\"stylesheet\" href=\"{BOOTSTRAP_CSS}\">");
    html.push_str("</head>\n<body>\n<div class=\"container\">\n");

    html.push_str(
        "<div class=\"row\"><h2 style=\"text-align: center\">Introduction TO GapMinder</h2></div>\n",
    );
    let _ = writeln!(
        html,
        "<div class=\"row\"><p>{}</p></div>",
        escape_html(&about.intro_part1)
    );
    html.push_str("<ol>\n");
    for item in about.list_items() {
        let _ = writeln!(html, "<li>{}</li>", escape_html(item));
    }
    html.push_str("</ol>\n");

    html.push_str("<form id=\"filters\" method=\"get\" action=\"/\" novalidate>\n<div class=\"row\">\n");
    push_multi_select(
        &mut html,
        "country-dropdown",
        "country",
        "Select Country Name",
        &controls.countries,
        |option| selection.countries.contains(option),
    );
    push_multi_select(
        &mut html,
        "continent-dropdown",
        "continent",
        "Select Continent Name",
        &controls.continents,
        |option| selection.continents.contains(option),
    );
    push_range(
        &mut html,
        "pop-slider",
        "Population Slider",
        ("pop_min", "pop_max"),
        &controls.population,
        (selection.population.min, selection.population.max),
    );
    push_range(
        &mut html,
        "lifeExp-slider",
        "LifeExp Slider",
        ("life_exp_min", "life_exp_max"),
        &controls.life_expectancy,
        (selection.life_expectancy.min, selection.life_expectancy.max),
    );
    html.push_str("</div>\n");

    push_page_size_select(&mut html, &controls.page_sizes, selection.page_size);
    html.push_str(
        "<button id=\"button\" type=\"submit\" formaction=\"/download\" name=\"n_clicks\" value=\"1\" class=\"btn btn-success\">Download CSV</button>\n",
    );
    html.push_str("</form>\n");

    html.push_str("<div id=\"show-table\">\n");
    push_table(&mut html, table);
    push_pagination(&mut html, selection, table);
    html.push_str("</div>\n</div>\n</body>\n</html>\n");
    html
}

fn push_multi_select(
    html: &mut String,
    id: &str,
    name: &str,
    placeholder: &str,
    options: &[String],
    is_selected: impl Fn(&String) -> bool,
) {
    let _ = writeln!(
        html,
        "<div class=\"col\"><select id=\"{id}\" name=\"{name}\" class=\"form-select\" multiple aria-label=\"{placeholder}\" title=\"{placeholder}\" onchange=\"this.form.submit()\">"
    );
    for option in options {
        let selected = if is_selected(option) { " selected" } else { "" };
        let escaped = escape_html(option);
        let _ = writeln!(
            html,
            "<option value=\"{escaped}\"{selected}>{escaped}</option>"
        );
    }
    html.push_str("</select></div>\n");
}

fn push_range<T: Display + Copy>(
    html: &mut String,
    id: &str,
    label: &str,
    (min_name, max_name): (&str, &str),
    control: &RangeControl<T>,
    (low, high): (T, T),
) {
    let _ = writeln!(html, "<div class=\"col\" id=\"{id}\"><label>{label}</label>");
    for (name, value) in [(min_name, low), (max_name, high)] {
        let _ = writeln!(
            html,
            "<input type=\"number\" class=\"form-control\" name=\"{name}\" min=\"{}\" max=\"{}\" step=\"{}\" value=\"{value}\" list=\"{id}-marks\" onchange=\"this.form.submit()\">",
            control.min, control.max, control.step
        );
    }
    let _ = writeln!(html, "<datalist id=\"{id}-marks\">");
    for mark in &control.marks {
        let _ = writeln!(html, "<option value=\"{mark}\" label=\"{mark}\"></option>");
    }
    html.push_str("</datalist></div>\n");
}

fn push_page_size_select(html: &mut String, page_sizes: &[PageSize], current: PageSize) {
    html.push_str("<div><label class=\"form-label\">Show number of Rows</label>\n");
    html.push_str(
        "<select id=\"page-size-dropdown\" name=\"page_size\" class=\"form-select\" style=\"width: 35%\" onchange=\"this.form.submit()\">\n",
    );
    for size in page_sizes {
        let selected = if *size == current { " selected" } else { "" };
        let _ = writeln!(html, "<option value=\"{size}\"{selected}>{size}</option>");
    }
    html.push_str("</select></div>\n");
}

fn push_table(html: &mut String, table: &TablePage) {
    html.push_str("<table class=\"table table-sm table-striped\">\n<thead><tr>");
    for column in &table.columns {
        let _ = write!(html, "<th>{}</th>", escape_html(column));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for row in &table.rows {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&row.country),
            escape_html(&row.continent),
            row.population,
            row.life_expectancy
        );
    }
    html.push_str("</tbody>\n</table>\n");
}

fn push_pagination(html: &mut String, selection: &FilterSelection, table: &TablePage) {
    let shown_pages = table.page_count.max(1);
    let query = escape_html(&selection_query(selection));
    html.push_str("<nav class=\"d-flex gap-3 align-items-center\">\n");
    if table.page_index > 0 {
        let _ = writeln!(
            html,
            "<a href=\"/?{query}&amp;page={}\">&laquo; Previous</a>",
            table.page_index - 1
        );
    }
    let _ = writeln!(
        html,
        "<span>Page {} of {shown_pages} ({} rows)</span>",
        table.page_index + 1,
        table.total_rows
    );
    if table.page_index + 1 < table.page_count {
        let _ = writeln!(
            html,
            "<a href=\"/?{query}&amp;page={}\">Next &raquo;</a>",
            table.page_index + 1
        );
    }
    html.push_str("</nav>\n");
}

pub(crate) fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
