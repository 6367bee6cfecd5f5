//! Year-to-date analysis: price series validation, gain and result
//!
//! A [`DeferredAnalysis`] is a plain value describing one analysis to run
//! later. It owns copies of everything it needs and reaches the outside
//! world only through the collaborators handed to [`DeferredAnalysis::execute`].

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::api::{MarketData, PriceHistory};
use crate::chart::{ChartRenderer, LineChart};
use crate::error::{Result, StockError};
use crate::request::{Intent, StructuredRequest};

/// One closing price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Non-empty closing-price series in provider order
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Validate a provider table
    pub fn from_history(symbol: &str, history: PriceHistory) -> Result<Self> {
        if history.is_empty() {
            return Err(StockError::NoData {
                symbol: symbol.to_string(),
            });
        }

        let closes = history.closes.ok_or_else(|| StockError::MissingField {
            symbol: symbol.to_string(),
            field: "Close",
        })?;

        if closes.len() != history.dates.len() {
            return Err(StockError::MalformedData {
                symbol: symbol.to_string(),
                reason: format!(
                    "{} dates but {} closing prices",
                    history.dates.len(),
                    closes.len()
                ),
            });
        }

        let points = history
            .dates
            .into_iter()
            .zip(closes)
            .map(|(date, close)| PricePoint { date, close })
            .collect();

        Ok(Self { points })
    }

    pub fn first(&self) -> PricePoint {
        self.points[0]
    }

    pub fn last(&self) -> PricePoint {
        self.points[self.points.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }
}

/// Percentage change from `first_close` to `last_close`
pub fn percentage_gain(symbol: &str, first_close: f64, last_close: f64) -> Result<f64> {
    if first_close == 0.0 || !first_close.is_finite() {
        return Err(StockError::InvalidBaseline {
            symbol: symbol.to_string(),
            first_close,
        });
    }
    if !last_close.is_finite() {
        return Err(StockError::MalformedData {
            symbol: symbol.to_string(),
            reason: format!("last close is {last_close}"),
        });
    }

    Ok((last_close - first_close) / first_close * 100.0)
}

/// Title drawn on the chart
pub fn chart_title(symbol: &str, pct_gain: f64) -> String {
    format!("YTD Close Price of {symbol} - Gain: {pct_gain:.2}%")
}

/// Final payload of a successful run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub symbol: String,
    pub intent: Intent,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub first_close: f64,
    pub last_close: f64,
    pub pct_gain: f64,
    pub chart_path: String,
    pub row_count: usize,
}

impl AnalysisResult {
    /// Field name / rendered value pairs, in display order
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("symbol", self.symbol.clone()),
            ("intent", self.intent.to_string()),
            ("first_date", self.first_date.to_string()),
            ("last_date", self.last_date.to_string()),
            ("first_close", format!("{:.4}", self.first_close)),
            ("last_close", format!("{:.4}", self.last_close)),
            ("pct_gain", format!("{:.2}%", self.pct_gain)),
            ("chart_path", self.chart_path.clone()),
            ("row_count", self.row_count.to_string()),
        ]
    }
}

/// An analysis captured by value, run later by the executor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeferredAnalysis {
    request: StructuredRequest,
    as_of: NaiveDate,
    chart_path: PathBuf,
}

impl DeferredAnalysis {
    pub fn new(
        request: StructuredRequest,
        as_of: NaiveDate,
        chart_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            request,
            as_of,
            chart_path: chart_path.into(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.request.symbol
    }

    pub fn intent(&self) -> Intent {
        self.request.intent
    }

    /// Date the year-to-date window ends on
    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    pub fn chart_path(&self) -> &Path {
        &self.chart_path
    }

    /// Fetch, validate, compute and plot
    pub async fn execute(
        &self,
        market: &dyn MarketData,
        renderer: &dyn ChartRenderer,
    ) -> Result<AnalysisResult> {
        let symbol = self.symbol();
        tracing::info!("Fetching YTD data for {symbol}...");

        let series = PriceSeries::from_history(symbol, self.fetch(market).await?)?;
        let (first, last) = (series.first(), series.last());
        let pct_gain = percentage_gain(symbol, first.close, last.close)?;

        let chart = LineChart {
            title: chart_title(symbol, pct_gain),
            x_label: "Date".to_string(),
            y_label: "Price (USD)".to_string(),
            points: series.points().iter().map(|p| (p.date, p.close)).collect(),
            highlights: vec![(first.date, first.close), (last.date, last.close)],
            path: self.chart_path.clone(),
        };
        renderer.render(&chart)?;

        Ok(AnalysisResult {
            symbol: symbol.to_string(),
            intent: self.intent(),
            first_date: first.date,
            last_date: last.date,
            first_close: first.close,
            last_close: last.close,
            pct_gain,
            chart_path: self.chart_path.display().to_string(),
            row_count: series.len(),
        })
    }

    /// Year-to-date request, falling back to an explicit Jan 1 range when empty
    async fn fetch(&self, market: &dyn MarketData) -> Result<PriceHistory> {
        let symbol = self.symbol();
        let fetch_error = |source| StockError::DataFetch {
            symbol: symbol.to_string(),
            source,
        };

        let history = market.ytd_history(symbol).await.map_err(fetch_error)?;
        if !history.is_empty() {
            return Ok(history);
        }

        let start = self.as_of.with_ordinal(1).unwrap_or(self.as_of);
        tracing::warn!(
            %start,
            end = %self.as_of,
            "YTD request returned no rows, retrying with explicit range"
        );
        market
            .daily_history(symbol, start, self.as_of)
            .await
            .map_err(fetch_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MarketDataError, MockMarketData};
    use crate::chart::{ChartError, MockChartRenderer};

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn two_rows() -> PriceHistory {
        PriceHistory::from_rows(vec![(date(1, 2), 100.0), (date(3, 14), 150.0)])
    }

    fn deferred(symbol: &str) -> DeferredAnalysis {
        DeferredAnalysis::new(
            StructuredRequest::new(symbol, Intent::PlotYtdAndGain),
            date(3, 14),
            format!("{symbol}_ytd_plot.png"),
        )
    }

    fn accepting_renderer() -> MockChartRenderer {
        let mut renderer = MockChartRenderer::new();
        renderer.expect_render().returning(|_| Ok(()));
        renderer
    }

    #[test]
    fn test_gain_formula() {
        assert_eq!(percentage_gain("TSLA", 100.0, 150.0).unwrap(), 50.0);
        assert_eq!(percentage_gain("TSLA", 200.0, 150.0).unwrap(), -25.0);
    }

    #[test]
    fn test_zero_baseline_is_rejected() {
        let err = percentage_gain("TSLA", 0.0, 150.0).unwrap_err();
        assert!(matches!(
            err,
            StockError::InvalidBaseline { first_close, .. } if first_close == 0.0
        ));

        let err = percentage_gain("TSLA", f64::NAN, 150.0).unwrap_err();
        assert!(matches!(err, StockError::InvalidBaseline { .. }));
    }

    #[test]
    fn test_series_validation() {
        let err = PriceSeries::from_history("TSLA", PriceHistory::empty()).unwrap_err();
        assert!(matches!(err, StockError::NoData { .. }));

        let err = PriceSeries::from_history("TSLA", PriceHistory::without_close(vec![date(1, 2)]))
            .unwrap_err();
        assert!(matches!(err, StockError::MissingField { field: "Close", .. }));

        let ragged = PriceHistory {
            dates: vec![date(1, 2), date(1, 3)],
            closes: Some(vec![1.0]),
        };
        let err = PriceSeries::from_history("TSLA", ragged).unwrap_err();
        assert!(matches!(err, StockError::MalformedData { .. }));
    }

    #[test]
    fn test_series_keeps_provider_order() {
        let history = PriceHistory::from_rows(vec![(date(3, 14), 150.0), (date(1, 2), 100.0)]);
        let series = PriceSeries::from_history("TSLA", history).unwrap();

        assert_eq!(series.first().date, date(3, 14));
        assert_eq!(series.last().close, 100.0);
        assert_eq!(series.len(), 2);
    }

    #[tokio::test]
    async fn test_execute_two_rows() {
        let mut market = MockMarketData::new();
        market.expect_ytd_history().times(1).returning(|_| Ok(two_rows()));
        market.expect_daily_history().never();

        let mut renderer = MockChartRenderer::new();
        renderer
            .expect_render()
            .withf(|chart| {
                chart.title == "YTD Close Price of TSLA - Gain: 50.00%"
                    && chart.highlights == vec![(date(1, 2), 100.0), (date(3, 14), 150.0)]
                    && chart.points.len() == 2
                    && chart.path == Path::new("TSLA_ytd_plot.png")
            })
            .times(1)
            .returning(|_| Ok(()));

        let result = deferred("TSLA").execute(&market, &renderer).await.unwrap();

        assert_eq!(result.symbol, "TSLA");
        assert_eq!(result.intent, Intent::PlotYtdAndGain);
        assert_eq!(result.pct_gain, 50.0);
        assert_eq!(result.row_count, 2);
        assert_eq!(result.first_date, date(1, 2));
        assert_eq!(result.last_date, date(3, 14));
        assert_eq!(result.chart_path, "TSLA_ytd_plot.png");
    }

    #[tokio::test]
    async fn test_fallback_range_starts_on_january_first() {
        let mut market = MockMarketData::new();
        market
            .expect_ytd_history()
            .times(1)
            .returning(|_| Ok(PriceHistory::empty()));
        market
            .expect_daily_history()
            .withf(|_, start, end| *start == date(1, 1) && *end == date(3, 14))
            .times(1)
            .returning(|_, _, _| Ok(two_rows()));

        let result = deferred("TSLA")
            .execute(&market, &accepting_renderer())
            .await
            .unwrap();
        assert_eq!(result.row_count, 2);
    }

    #[tokio::test]
    async fn test_both_requests_empty() {
        let mut market = MockMarketData::new();
        market
            .expect_ytd_history()
            .returning(|_| Ok(PriceHistory::empty()));
        market
            .expect_daily_history()
            .times(1)
            .returning(|_, _, _| Ok(PriceHistory::empty()));
        let mut renderer = MockChartRenderer::new();
        renderer.expect_render().never();

        let err = deferred("ZZZZ").execute(&market, &renderer).await.unwrap_err();
        assert!(err.to_string().starts_with("No data returned for ZZZZ"));
    }

    #[tokio::test]
    async fn test_fallback_error_is_data_fetch() {
        let mut market = MockMarketData::new();
        market
            .expect_ytd_history()
            .times(1)
            .returning(|_| Ok(PriceHistory::empty()));
        market
            .expect_daily_history()
            .times(1)
            .returning(|_, _, _| Err(MarketDataError::Provider("boom".to_string())));
        let mut renderer = MockChartRenderer::new();
        renderer.expect_render().never();

        let err = deferred("TSLA").execute(&market, &renderer).await.unwrap_err();
        assert!(matches!(
            err,
            StockError::DataFetch {
                source: MarketDataError::Provider(_),
                ..
            }
        ));
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_provider_error_is_data_fetch() {
        let mut market = MockMarketData::new();
        market
            .expect_ytd_history()
            .returning(|_| Err(MarketDataError::Provider("HTTP 503".to_string())));
        market.expect_daily_history().never();

        let err = deferred("TSLA")
            .execute(&market, &accepting_renderer())
            .await
            .unwrap_err();
        assert!(matches!(err, StockError::DataFetch { .. }));
        assert!(err.to_string().contains("HTTP 503"));
    }

    #[tokio::test]
    async fn test_missing_close_column() {
        let mut market = MockMarketData::new();
        market
            .expect_ytd_history()
            .returning(|_| Ok(PriceHistory::without_close(vec![date(1, 2), date(1, 3)])));

        let err = deferred("TSLA")
            .execute(&market, &accepting_renderer())
            .await
            .unwrap_err();
        assert!(matches!(err, StockError::MissingField { .. }));
    }

    #[tokio::test]
    async fn test_render_failure_surfaces() {
        let mut market = MockMarketData::new();
        market.expect_ytd_history().returning(|_| Ok(two_rows()));
        let mut renderer = MockChartRenderer::new();
        renderer
            .expect_render()
            .returning(|_| Err(ChartError::Draw("disk full".to_string())));

        let err = deferred("TSLA").execute(&market, &renderer).await.unwrap_err();
        assert!(matches!(err, StockError::Render(ChartError::Draw(_))));
    }

    #[test]
    fn test_result_fields_order() {
        let result = AnalysisResult {
            symbol: "TSLA".to_string(),
            intent: Intent::PlotYtd,
            first_date: date(1, 2),
            last_date: date(3, 14),
            first_close: 100.0,
            last_close: 150.0,
            pct_gain: 50.0,
            chart_path: "TSLA_ytd_plot.png".to_string(),
            row_count: 2,
        };

        let fields = result.fields();
        assert_eq!(fields[0], ("symbol", "TSLA".to_string()));
        assert_eq!(fields[6], ("pct_gain", "50.00%".to_string()));
        assert_eq!(fields.last().unwrap().0, "row_count");
    }
}
