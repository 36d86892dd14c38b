use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

use crate::error::InvalidPageSize;

/// Column names of a [`Record`], in export order.
pub const RECORD_COLUMNS: [&str; 4] = ["country", "continent", "pop", "lifeExp"];

/// One row of the GapMinder table, projected to the four dashboard columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub country: String,
    pub continent: String,
    #[serde(rename = "pop")]
    pub population: u64,
    #[serde(rename = "lifeExp")]
    pub life_expectancy: f64,
}

/// Inclusive `[min, max]` interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> ValueRange<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }

    /// Pull both ends into `bounds`. A range lying wholly outside `bounds`
    /// is returned unchanged so it keeps matching nothing.
    pub fn clamp_to(&self, bounds: &ValueRange<T>) -> Self {
        if self.max < bounds.min || self.min > bounds.max {
            return *self;
        }
        Self {
            min: clamp_value(self.min, bounds),
            max: clamp_value(self.max, bounds),
        }
    }
}

fn clamp_value<T: PartialOrd + Copy>(value: T, bounds: &ValueRange<T>) -> T {
    if value < bounds.min {
        bounds.min
    } else if value > bounds.max {
        bounds.max
    } else {
        value
    }
}

/// The span each range control covers. Life expectancy is widened to whole
/// years so the default selection always includes every record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatasetBounds {
    pub population: ValueRange<u64>,
    pub life_expectancy: ValueRange<f64>,
}

impl Default for DatasetBounds {
    fn default() -> Self {
        Self {
            population: ValueRange::new(0, 0),
            life_expectancy: ValueRange::new(0.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PageSize {
    #[default]
    Ten,
    TwentyFive,
    Fifty,
    Hundred,
}

impl PageSize {
    pub const ALL: [PageSize; 4] = [
        PageSize::Ten,
        PageSize::TwentyFive,
        PageSize::Fifty,
        PageSize::Hundred,
    ];

    pub fn rows(self) -> usize {
        match self {
            PageSize::Ten => 10,
            PageSize::TwentyFive => 25,
            PageSize::Fifty => 50,
            PageSize::Hundred => 100,
        }
    }
}

impl TryFrom<u32> for PageSize {
    type Error = InvalidPageSize;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            10 => Ok(PageSize::Ten),
            25 => Ok(PageSize::TwentyFive),
            50 => Ok(PageSize::Fifty),
            100 => Ok(PageSize::Hundred),
            other => Err(InvalidPageSize(other)),
        }
    }
}

impl From<PageSize> for u32 {
    fn from(value: PageSize) -> Self {
        value.rows() as u32
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rows())
    }
}

/// Active filter parameters for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSelection {
    #[serde(default)]
    pub countries: BTreeSet<String>,
    #[serde(default)]
    pub continents: BTreeSet<String>,
    pub population: ValueRange<u64>,
    pub life_expectancy: ValueRange<f64>,
    #[serde(default)]
    pub page_size: PageSize,
}

impl FilterSelection {
    /// Initial selection: no include-lists, ranges spanning the whole dataset.
    pub fn all_inclusive(bounds: &DatasetBounds) -> Self {
        Self {
            countries: BTreeSet::new(),
            continents: BTreeSet::new(),
            population: bounds.population,
            life_expectancy: bounds.life_expectancy,
            page_size: PageSize::default(),
        }
    }

    pub fn clamped_to(mut self, bounds: &DatasetBounds) -> Self {
        self.population = self.population.clamp_to(&bounds.population);
        self.life_expectancy = self.life_expectancy.clamp_to(&bounds.life_expectancy);
        self
    }
}

/// Download button state. A missing or zero click count never exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickSignal {
    NotClicked,
    Clicked(u64),
}

impl ClickSignal {
    pub fn from_click_count(n_clicks: Option<u64>) -> Self {
        match n_clicks {
            None | Some(0) => ClickSignal::NotClicked,
            Some(n) => ClickSignal::Clicked(n),
        }
    }

    pub fn is_clicked(self) -> bool {
        matches!(self, ClickSignal::Clicked(_))
    }
}

impl From<Option<u64>> for ClickSignal {
    fn from(value: Option<u64>) -> Self {
        Self::from_click_count(value)
    }
}

/// Static intro copy shown above the filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AboutText {
    pub intro_part1: String,
    pub intro_part1_list1: String,
    pub intro_part1_list2: String,
    pub intro_part1_list3: String,
    pub intro_part1_list4: String,
}

impl AboutText {
    pub fn list_items(&self) -> [&str; 4] {
        [
            self.intro_part1_list1.as_str(),
            self.intro_part1_list2.as_str(),
            self.intro_part1_list3.as_str(),
            self.intro_part1_list4.as_str(),
        ]
    }
}
