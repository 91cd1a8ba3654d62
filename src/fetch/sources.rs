// src/fetch/sources.rs

use std::path::{Path, PathBuf};
use url::Url;

const HENRY_HUB_WEEKLY_URL: &str = "https://www.eia.gov/dnav/ng/hist/rngwhhdD.htm";
const EIA_CSV_URL: &str = "https://www.eia.gov/totalenergy/data/browser/csv.php";
const EIA_BROWSER_URL: &str = "https://www.eia.gov/totalenergy/data/browser/index.php";

pub const HENRY_HUB_WEEKLY_ID: &str = "henry_hub_weekly";

/// How the response body is turned into a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// HTML page; the weekly price table is located and reshaped.
    HtmlWeeklyTable,
    /// Direct CSV; persisted with the upstream schema unchanged.
    Csv,
}

/// One upstream endpoint and the single file it lands in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub id: String,
    pub url: Url,
    pub referer: Option<Url>,
    pub filename: String,
    pub kind: SourceKind,
}

impl Source {
    pub fn henry_hub_weekly() -> Self {
        Self {
            id: HENRY_HUB_WEEKLY_ID.to_string(),
            url: Url::parse(HENRY_HUB_WEEKLY_URL).expect("static Henry Hub URL is valid"),
            referer: None,
            filename: "henry_hub_weekly.csv".to_string(),
            kind: SourceKind::HtmlWeeklyTable,
        }
    }

    /// A Monthly Energy Review table served by the EIA data browser, e.g.
    /// `T01.11`. The referer points at the browser page the CSV link lives on.
    pub fn eia_table(table_id: &str, filename: &str) -> Self {
        let url = Url::parse_with_params(EIA_CSV_URL, &[("tbl", table_id)])
            .expect("static EIA CSV URL is valid");
        let referer = Url::parse_with_params(EIA_BROWSER_URL, &[("tbl", table_id)])
            .expect("static EIA browser URL is valid");
        Self {
            id: table_id.to_string(),
            url,
            referer: Some(referer),
            filename: filename.to_string(),
            kind: SourceKind::Csv,
        }
    }

    pub fn with_url(mut self, url: Url) -> Self {
        self.url = url;
        self
    }

    pub fn output_path(&self, raw_dir: &Path) -> PathBuf {
        raw_dir.join(&self.filename)
    }
}

/// Every source fetched by a default run, in run order.
pub fn default_sources() -> Vec<Source> {
    vec![
        Source::henry_hub_weekly(),
        Source::eia_table("T01.11", "EIA_T01_11_HDD_by_CensusDivision.csv"),
        Source::eia_table("T01.12", "EIA_T01_12_CDD_by_CensusDivision.csv"),
        Source::eia_table("T04.01", "EIA_T04_01_Natural_Gas_Overview_Monthly.csv"),
    ]
}
