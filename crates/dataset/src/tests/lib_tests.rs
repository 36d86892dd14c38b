use super::*;

const SAMPLE: &str = "\
country,year,pop,continent,lifeExp,gdpPercap
Afghanistan,1952,8425333,Asia,28.801,779.4453145
Afghanistan,1957,9240934.0,Asia,30.332,820.8530296
Albania,1952,1282697,Europe,55.23,1601.056136
Canada,2007,33390141,Americas,80.653,36319.23501
";

fn sample() -> Dataset {
    Dataset::from_csv_reader("inline", SAMPLE.as_bytes()).expect("sample parses")
}

#[test]
fn projects_to_dashboard_columns_in_source_order() {
    let dataset = sample();
    assert_eq!(dataset.len(), 4);
    let countries: Vec<_> = dataset.records().iter().map(|r| r.country.as_str()).collect();
    assert_eq!(countries, ["Afghanistan", "Afghanistan", "Albania", "Canada"]);

    let first = &dataset.records()[0];
    assert_eq!(first.continent, "Asia");
    assert_eq!(first.population, 8_425_333);
    assert_eq!(first.life_expectancy, 28.801);
}

#[test]
fn accepts_population_written_as_float() {
    let dataset = sample();
    assert_eq!(dataset.records()[1].population, 9_240_934);
}

#[test]
fn summary_lists_distinct_values_in_first_appearance_order() {
    let dataset = sample();
    let summary = dataset.summary();
    assert_eq!(summary.countries, ["Afghanistan", "Albania", "Canada"]);
    assert_eq!(summary.continents, ["Asia", "Europe", "Americas"]);
    assert_eq!(summary.source, "inline");
}

#[test]
fn bounds_cover_every_record() {
    let bounds = *sample().bounds();
    assert_eq!(bounds.population, ValueRange::new(1_282_697, 33_390_141));
    assert_eq!(bounds.life_expectancy, ValueRange::new(28.0, 81.0));
}

#[test]
fn empty_table_has_zero_bounds() {
    let dataset =
        Dataset::from_csv_reader("empty", "country,continent,pop,lifeExp\n".as_bytes())
            .expect("header only parses");
    assert!(dataset.is_empty());
    assert_eq!(*dataset.bounds(), DatasetBounds::default());
    assert!(dataset.summary().countries.is_empty());
}

#[test]
fn missing_column_is_rejected() {
    let csv = "country,continent,pop\nCanada,Americas,100\n";
    let err = Dataset::from_csv_reader("bad", csv.as_bytes()).expect_err("should fail");
    assert!(matches!(err, DatasetError::MissingColumn("lifeExp")));
}

#[test]
fn non_numeric_value_is_a_csv_error() {
    let csv = "country,continent,pop,lifeExp\nCanada,Americas,lots,80.1\n";
    let err = Dataset::from_csv_reader("bad", csv.as_bytes()).expect_err("should fail");
    assert!(matches!(err, DatasetError::Csv(_)));
}

#[test]
fn negative_population_is_rejected() {
    let csv = "country,continent,pop,lifeExp\nCanada,Americas,-5,80.1\n";
    let err = Dataset::from_csv_reader("bad", csv.as_bytes()).expect_err("should fail");
    assert!(matches!(
        err,
        DatasetError::InvalidValue {
            row: 1,
            column: "pop",
            ..
        }
    ));
}

#[test]
fn clones_share_records() {
    let dataset = sample();
    let clone = dataset.clone();
    assert!(std::ptr::eq(dataset.records(), clone.records()));
}

#[test]
fn info_reports_counts() {
    let info = sample().info();
    assert_eq!(info.rows, 4);
    assert_eq!(info.countries, 3);
    assert_eq!(info.continents, 3);
}
