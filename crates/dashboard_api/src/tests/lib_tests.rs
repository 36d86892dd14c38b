use super::*;
use shared::domain::{DatasetBounds, ValueRange};

const CONTINENTS: [&str; 5] = ["Africa", "Americas", "Asia", "Europe", "Oceania"];
const YEARS: usize = 12;

/// 142 countries x 12 five-year observations, the shape of the public table.
fn canonical_dataset() -> Dataset {
    let mut records = Vec::with_capacity(142 * YEARS);
    for country_index in 0..142 {
        let country = if country_index == 17 {
            "Canada".to_string()
        } else {
            format!("Country {country_index:03}")
        };
        let continent = CONTINENTS[country_index % CONTINENTS.len()];
        for year in 0..YEARS {
            records.push(Record {
                country: country.clone(),
                continent: continent.to_string(),
                population: 60_000 + (country_index as u64 * 9_000_000) + year as u64 * 125_000,
                life_expectancy: 23.6 + (country_index % 50) as f64 + year as f64 * 0.75,
            });
        }
    }
    Dataset::from_records("canonical", records)
}

fn sized_dataset(rows: usize) -> Dataset {
    let records = (0..rows)
        .map(|i| Record {
            country: format!("C{i}"),
            continent: "Asia".to_string(),
            population: 1_000 + i as u64,
            life_expectancy: 50.0,
        })
        .collect();
    Dataset::from_records("sized", records)
}

fn position_of(dataset: &Dataset, record: &Record) -> usize {
    dataset
        .records()
        .iter()
        .position(|candidate| std::ptr::eq(candidate, record))
        .expect("record borrowed from dataset")
}

#[test]
fn canada_selection_returns_one_row_per_year() {
    let dataset = canonical_dataset();
    assert_eq!(dataset.len(), 1_704);

    let mut selection = FilterSelection::all_inclusive(dataset.bounds());
    selection.countries.insert("Canada".to_string());

    let view = filter_records(&dataset, &selection);
    assert_eq!(view.len(), 12);
    assert!(view.records().iter().all(|r| r.country == "Canada"));
}

#[test]
fn default_selection_matches_every_record() {
    let dataset = canonical_dataset();
    let ctx = DashboardContext::new(dataset.clone());
    let view = filter_records(&dataset, &ctx.default_selection());
    assert_eq!(view.len(), dataset.len());
}

#[test]
fn output_is_an_order_preserving_subset() {
    let dataset = canonical_dataset();
    let mut selection = FilterSelection::all_inclusive(dataset.bounds());
    selection.continents.insert("Europe".to_string());
    selection.continents.insert("Africa".to_string());
    selection.life_expectancy = ValueRange::new(40.0, 70.0);

    let view = filter_records(&dataset, &selection);
    assert!(!view.is_empty());

    let positions: Vec<usize> = view
        .records()
        .iter()
        .map(|record| position_of(&dataset, record))
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(view
        .records()
        .iter()
        .all(|r| r.continent == "Europe" || r.continent == "Africa"));
}

#[test]
fn empty_include_lists_leave_only_range_predicates() {
    let dataset = canonical_dataset();
    let mut selection = FilterSelection::all_inclusive(dataset.bounds());
    selection.population = ValueRange::new(100_000_000, 600_000_000);
    selection.life_expectancy = ValueRange::new(30.0, 60.0);

    let view = filter_records(&dataset, &selection);
    let expected: Vec<&Record> = dataset
        .records()
        .iter()
        .filter(|r| {
            (100_000_000..=600_000_000).contains(&r.population)
                && r.life_expectancy >= 30.0
                && r.life_expectancy <= 60.0
        })
        .collect();

    assert!(!expected.is_empty());
    assert_eq!(view.records(), expected.as_slice());
}

#[test]
fn all_predicates_are_conjunctive() {
    let dataset = canonical_dataset();
    let mut selection = FilterSelection::all_inclusive(dataset.bounds());
    selection.countries.insert("Canada".to_string());
    selection.continents.insert("Oceania".to_string());

    // Canada's synthetic continent is Asia, so the intersection is empty.
    assert!(filter_records(&dataset, &selection).is_empty());
}

#[test]
fn filtering_is_idempotent() {
    let dataset = canonical_dataset();
    let mut selection = FilterSelection::all_inclusive(dataset.bounds());
    selection.continents.insert("Asia".to_string());
    selection.population = ValueRange::new(0, 400_000_000);

    let first = filter_records(&dataset, &selection);
    let second = filter_records(&dataset, &selection);
    assert_eq!(first.records(), second.records());
}

#[test]
fn out_of_range_bounds_yield_empty_view() {
    let dataset = canonical_dataset();
    let mut selection = FilterSelection::all_inclusive(dataset.bounds());
    selection.population = ValueRange::new(u64::MAX - 1, u64::MAX);
    assert!(filter_records(&dataset, &selection).is_empty());

    let mut inverted = FilterSelection::all_inclusive(dataset.bounds());
    inverted.life_expectancy = ValueRange::new(70.0, 40.0);
    assert!(filter_records(&dataset, &inverted).is_empty());
}

#[test]
fn twenty_five_rows_at_page_size_ten_make_three_pages() {
    let dataset = sized_dataset(25);
    let selection = FilterSelection::all_inclusive(dataset.bounds());
    let view = filter_records(&dataset, &selection);

    let sizes: Vec<usize> = (0..3)
        .map(|page| render_page(&view, PageSize::Ten, page).rows.len())
        .collect();
    assert_eq!(sizes, [10, 10, 5]);

    let first = render_page(&view, PageSize::Ten, 0);
    assert_eq!(first.page_count, 3);
    assert_eq!(first.total_rows, 25);
    assert_eq!(first.rows[0].country, "C0");
    assert_eq!(first.columns, ["country", "continent", "pop", "lifeExp"]);

    let last = render_page(&view, PageSize::Ten, 2);
    assert_eq!(last.rows[0].country, "C20");
}

#[test]
fn last_page_holds_the_remainder() {
    for rows in [0, 1, 9, 10, 11, 99, 100, 101, 250] {
        let dataset = sized_dataset(rows);
        let view = filter_records(&dataset, &FilterSelection::all_inclusive(dataset.bounds()));
        for page_size in PageSize::ALL {
            let p = page_size.rows();
            let pages = page_count(rows, page_size);
            assert_eq!(pages, rows.div_ceil(p), "rows={rows} page_size={p}");

            let last = render_page(&view, page_size, usize::MAX);
            let expected = match (rows, rows % p) {
                (0, _) => 0,
                (_, 0) => p,
                (_, remainder) => remainder,
            };
            assert_eq!(last.rows.len(), expected, "rows={rows} page_size={p}");
        }
    }
}

#[test]
fn empty_view_renders_empty_first_page() {
    let dataset = sized_dataset(0);
    let view = filter_records(&dataset, &FilterSelection::all_inclusive(dataset.bounds()));
    let page = render_page(&view, PageSize::Fifty, 3);
    assert_eq!(page.page_count, 0);
    assert_eq!(page.page_index, 0);
    assert!(page.rows.is_empty());
}

#[test]
fn export_of_empty_view_is_header_only() {
    let dataset = sized_dataset(0);
    let view = filter_records(&dataset, &FilterSelection::all_inclusive(dataset.bounds()));
    let content = export_csv(&view).expect("csv");
    assert_eq!(content, "country,continent,pop,lifeExp\n");
}

#[test]
fn export_parses_back_to_the_filtered_records() {
    let mut records = canonical_dataset().records()[..30].to_vec();
    records.push(Record {
        country: "Korea, Dem. Rep.".to_string(),
        continent: "Asia".to_string(),
        population: 23_301_725,
        life_expectancy: 67.297,
    });
    let dataset = Dataset::from_records("export", records);
    let view = filter_records(&dataset, &FilterSelection::all_inclusive(dataset.bounds()));

    let content = export_csv(&view).expect("csv");
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .expect("headers")
        .iter()
        .map(str::to_string)
        .collect();
    assert_eq!(headers, RECORD_COLUMNS);

    let parsed: Vec<Record> = reader
        .deserialize::<Record>()
        .collect::<Result<_, _>>()
        .expect("rows parse");
    assert_eq!(parsed.len(), view.len());
    for (parsed, source) in parsed.iter().zip(view.records()) {
        assert_eq!(parsed.country, source.country);
        assert_eq!(parsed.continent, source.continent);
        assert_eq!(parsed.population, source.population);
        assert!((parsed.life_expectancy - source.life_expectancy).abs() < 1e-9);
    }
}

#[test]
fn export_requires_a_click() {
    let ctx = DashboardContext::new(canonical_dataset());
    let selection = ctx.default_selection();

    assert_eq!(export_selection(&ctx, None, &selection).expect("export"), None);
    assert_eq!(export_selection(&ctx, Some(0), &selection).expect("export"), None);

    let payload = export_selection(&ctx, Some(1), &selection)
        .expect("export")
        .expect("payload");
    assert_eq!(payload.filename, "GapMinder_Filtered_Data.csv");
    assert_eq!(payload.content.lines().count(), 1 + ctx.dataset.len());
}

#[test]
fn export_ignores_page_size() {
    let ctx = DashboardContext::new(sized_dataset(40));
    let mut selection = ctx.default_selection();
    selection.page_size = PageSize::Ten;

    let payload = export_selection(&ctx, Some(2), &selection)
        .expect("export")
        .expect("payload");
    assert_eq!(payload.content.lines().count(), 41);
}

#[test]
fn router_dispatches_events_to_handlers() {
    let ctx = DashboardContext::new(canonical_dataset());
    let mut selection = ctx.default_selection();
    selection.countries.insert("Canada".to_string());

    let table = handle_event(
        &ctx,
        &DashboardEvent::FiltersChanged {
            selection: selection.clone(),
            page: 0,
        },
    )
    .expect("table");
    let DashboardOutput::Table(table) = table else {
        panic!("expected table output");
    };
    assert_eq!(table.total_rows, 12);
    assert_eq!(table.page_count, 2);

    let suppressed = handle_event(
        &ctx,
        &DashboardEvent::ExportClicked {
            n_clicks: Some(0),
            selection: selection.clone(),
        },
    )
    .expect("no update");
    assert!(matches!(suppressed, DashboardOutput::NoUpdate));

    let download = handle_event(
        &ctx,
        &DashboardEvent::ExportClicked {
            n_clicks: Some(1),
            selection,
        },
    )
    .expect("download");
    let DashboardOutput::Download(payload) = download else {
        panic!("expected download output");
    };
    assert_eq!(payload.content.lines().count(), 13);
}

#[test]
fn oversized_ranges_are_clamped_before_filtering() {
    let ctx = DashboardContext::new(canonical_dataset());
    let mut selection = ctx.default_selection();
    selection.population = ValueRange::new(0, u64::MAX);
    selection.life_expectancy = ValueRange::new(-10.0, 500.0);

    let normalized = normalize_selection(&ctx.dataset, selection.clone());
    assert_eq!(normalized.population, ctx.dataset.bounds().population);
    assert_eq!(normalized.life_expectancy, ctx.dataset.bounds().life_expectancy);

    let table = refresh_table(&ctx, &selection, 0);
    assert_eq!(table.total_rows, ctx.dataset.len());
}

#[test]
fn filters_changed_event_parses_from_json() {
    let event: DashboardEvent = serde_json::from_value(serde_json::json!({
        "type": "filters_changed",
        "payload": {
            "selection": {
                "countries": ["Canada"],
                "population": { "min": 0, "max": 2000000000 },
                "life_expectancy": { "min": 0.0, "max": 100.0 },
                "page_size": 25
            }
        }
    }))
    .expect("event");

    let DashboardEvent::FiltersChanged { selection, page } = event else {
        panic!("expected filters_changed");
    };
    assert_eq!(page, 0);
    assert!(selection.continents.is_empty());
    assert_eq!(selection.page_size, PageSize::TwentyFive);
}

#[test]
fn controls_span_dataset_bounds() {
    let dataset = Dataset::from_records(
        "controls",
        vec![
            Record {
                country: "A".into(),
                continent: "Asia".into(),
                population: 60_011,
                life_expectancy: 23.599,
            },
            Record {
                country: "B".into(),
                continent: "Europe".into(),
                population: 1_318_683_096,
                life_expectancy: 82.603,
            },
        ],
    );
    let controls = dashboard_controls(&dataset);

    assert_eq!(controls.countries, ["A", "B"]);
    assert_eq!(controls.population.min, 60_011);
    assert_eq!(controls.population.max, 1_318_683_096);
    assert_eq!(
        controls.population.marks,
        [60_011, 300_060_011, 600_060_011, 900_060_011, 1_200_060_011]
    );
    assert_eq!(controls.life_expectancy.min, 23.0);
    assert_eq!(controls.life_expectancy.max, 83.0);
    assert_eq!(
        controls.life_expectancy.marks,
        [23.0, 33.0, 43.0, 53.0, 63.0, 73.0, 83.0]
    );
    assert_eq!(controls.page_sizes, PageSize::ALL);

    let bounds = DatasetBounds {
        population: ValueRange::new(controls.population.min, controls.population.max),
        life_expectancy: ValueRange::new(controls.life_expectancy.min, controls.life_expectancy.max),
    };
    assert_eq!(&bounds, dataset.bounds());
}
