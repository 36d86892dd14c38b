use dataset::Dataset;
use shared::{
    domain::{ClickSignal, FilterSelection, PageSize, Record, RECORD_COLUMNS},
    error::ApiError,
    protocol::{
        DashboardControls, DashboardEvent, DashboardOutput, ExportPayload, RangeControl,
        TablePage, EXPORT_FILENAME,
    },
};
use tracing::debug;

pub const POPULATION_STEP: u64 = 300_000_000;
pub const LIFE_EXPECTANCY_STEP: f64 = 10.0;

#[derive(Clone)]
pub struct DashboardContext {
    pub dataset: Dataset,
}

impl DashboardContext {
    pub fn new(dataset: Dataset) -> Self {
        Self { dataset }
    }

    /// Selection used on first load.
    pub fn default_selection(&self) -> FilterSelection {
        FilterSelection::all_inclusive(self.dataset.bounds())
    }
}

/// Records matching a selection, borrowed from the dataset in dataset order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    records: Vec<&'a Record>,
}

impl<'a> FilteredView<'a> {
    pub fn records(&self) -> &[&'a Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Conjunction of the four predicates. Empty include-lists match everything;
/// ranges are inclusive and an unsatisfiable range simply matches nothing.
pub fn filter_records<'a>(dataset: &'a Dataset, selection: &FilterSelection) -> FilteredView<'a> {
    let records = dataset
        .records()
        .iter()
        .filter(|record| matches_selection(record, selection))
        .collect();
    FilteredView { records }
}

fn matches_selection(record: &Record, selection: &FilterSelection) -> bool {
    (selection.countries.is_empty() || selection.countries.contains(&record.country))
        && (selection.continents.is_empty() || selection.continents.contains(&record.continent))
        && selection.population.contains(record.population)
        && selection.life_expectancy.contains(record.life_expectancy)
}

pub fn page_count(total_rows: usize, page_size: PageSize) -> usize {
    total_rows.div_ceil(page_size.rows())
}

/// Cut one page out of `view`. Indexes past the end land on the last page.
pub fn render_page(view: &FilteredView<'_>, page_size: PageSize, page_index: usize) -> TablePage {
    let total_rows = view.len();
    let page_count = page_count(total_rows, page_size);
    let page_index = page_index.min(page_count.saturating_sub(1));

    let rows = view
        .records()
        .iter()
        .skip(page_index * page_size.rows())
        .take(page_size.rows())
        .map(|record| (*record).clone())
        .collect();

    TablePage {
        columns: RECORD_COLUMNS.iter().map(|column| column.to_string()).collect(),
        rows,
        page_index,
        page_count,
        page_size,
        total_rows,
    }
}

/// Header plus one line per record, no index column.
pub fn export_csv(view: &FilteredView<'_>) -> Result<String, ApiError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(RECORD_COLUMNS).map_err(internal)?;
    for record in view.records() {
        writer.serialize(record).map_err(internal)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ApiError::internal(format!("csv flush failed: {e}")))?;
    String::from_utf8(bytes).map_err(|e| ApiError::internal(e.to_string()))
}

pub fn export_download(
    view: &FilteredView<'_>,
    click: ClickSignal,
) -> Result<Option<ExportPayload>, ApiError> {
    if !click.is_clicked() {
        return Ok(None);
    }
    Ok(Some(ExportPayload {
        filename: EXPORT_FILENAME.to_string(),
        content: export_csv(view)?,
    }))
}

pub fn normalize_selection(dataset: &Dataset, selection: FilterSelection) -> FilterSelection {
    selection.clamped_to(dataset.bounds())
}

/// Re-filter and re-render after any control change.
pub fn refresh_table(ctx: &DashboardContext, selection: &FilterSelection, page: usize) -> TablePage {
    let selection = normalize_selection(&ctx.dataset, selection.clone());
    let view = filter_records(&ctx.dataset, &selection);
    let table = render_page(&view, selection.page_size, page);
    debug!(
        rows = table.total_rows,
        page = table.page_index,
        page_count = table.page_count,
        "filters applied"
    );
    table
}

/// Build the download for a button press; page size plays no part.
pub fn export_selection(
    ctx: &DashboardContext,
    n_clicks: Option<u64>,
    selection: &FilterSelection,
) -> Result<Option<ExportPayload>, ApiError> {
    let click = ClickSignal::from_click_count(n_clicks);
    if !click.is_clicked() {
        debug!("export suppressed: button not clicked");
        return Ok(None);
    }
    let selection = normalize_selection(&ctx.dataset, selection.clone());
    let view = filter_records(&ctx.dataset, &selection);
    let payload = export_download(&view, click)?;
    if let Some(payload) = &payload {
        debug!(rows = view.len(), bytes = payload.content.len(), "export generated");
    }
    Ok(payload)
}

pub fn handle_event(
    ctx: &DashboardContext,
    event: &DashboardEvent,
) -> Result<DashboardOutput, ApiError> {
    match event {
        DashboardEvent::FiltersChanged { selection, page } => {
            Ok(DashboardOutput::Table(refresh_table(ctx, selection, *page)))
        }
        DashboardEvent::ExportClicked {
            n_clicks,
            selection,
        } => Ok(export_selection(ctx, *n_clicks, selection)?
            .map(DashboardOutput::Download)
            .unwrap_or(DashboardOutput::NoUpdate)),
    }
}

pub fn dashboard_controls(dataset: &Dataset) -> DashboardControls {
    let summary = dataset.summary();
    let bounds = &summary.bounds;

    let population_marks = (bounds.population.min..=bounds.population.max)
        .step_by(POPULATION_STEP as usize)
        .collect();

    let mut life_expectancy_marks = Vec::new();
    let mut mark = bounds.life_expectancy.min;
    while mark <= bounds.life_expectancy.max {
        life_expectancy_marks.push(mark);
        mark += LIFE_EXPECTANCY_STEP;
    }

    DashboardControls {
        countries: summary.countries.clone(),
        continents: summary.continents.clone(),
        population: RangeControl {
            min: bounds.population.min,
            max: bounds.population.max,
            step: POPULATION_STEP,
            marks: population_marks,
        },
        life_expectancy: RangeControl {
            min: bounds.life_expectancy.min,
            max: bounds.life_expectancy.max,
            step: LIFE_EXPECTANCY_STEP,
            marks: life_expectancy_marks,
        },
        page_sizes: PageSize::ALL.to_vec(),
    }
}

fn internal(err: csv::Error) -> ApiError {
    ApiError::internal(err.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
