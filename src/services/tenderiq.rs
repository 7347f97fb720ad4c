use crate::config::AnalysisConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::{
    AnalysisState, AnalysisStatus, AvailableDate, DocumentKind, FilteredBy, FilteredTendersQuery, FilteredTendersResponse,
    ScrapedTender, ScrapedTenderFile, Tender, TenderAction, TenderActionRequest, TenderAnalysis, TenderApiResponse,
    TenderDetailStatus, TenderDetails, TenderDocument, TenderDocumentRef, TenderStatus,
};
use crate::services::api_client::{segment, ApiClient};
use crate::services::currency::{parse_currency, parse_optional_currency};
use crate::services::tender_filter::UNCATEGORIZED;
use reqwest::Method;
use serde::Deserialize;
use std::time::Duration;

/// Scrape-run state the caller carries between TenderIQ requests. Holds the
/// date of the most recent scrape once `/tenderiq/dates` has been read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeContext {
    latest_scrape_date: Option<String>,
}

impl ScrapeContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latest_date(date: impl Into<String>) -> Self {
        Self { latest_scrape_date: Some(date.into()) }
    }

    pub fn latest_date(&self) -> Option<&str> {
        self.latest_scrape_date.as_deref()
    }

    /// Remember the date flagged `is_latest`, or failing that the first one.
    pub fn record_dates(&mut self, dates: &[AvailableDate]) {
        let latest = dates.iter().find(|d| d.is_latest).or_else(|| dates.first());
        if let Some(date) = latest {
            self.latest_scrape_date = Some(date.date.clone());
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DatesResponse {
    dates: Vec<AvailableDate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFilteredTenders {
    tenders: Vec<ScrapedTender>,
    total_count: Option<u64>,
    filtered_by: Option<FilteredBy>,
    available_dates: Vec<String>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn document_refs(files: &[ScrapedTenderFile]) -> Vec<TenderDocumentRef> {
    files
        .iter()
        .map(|file| TenderDocumentRef {
            id: file.id.clone(),
            name: file.file_name.clone(),
            kind: DocumentKind::from_file_name(&file.file_name),
            pages: None,
            is_ai_generated: None,
        })
        .collect()
}

fn tender_documents(files: &[ScrapedTenderFile]) -> Vec<TenderDocument> {
    files
        .iter()
        .map(|file| TenderDocument {
            id: file.id.clone(),
            name: file.file_name.clone(),
            kind: DocumentKind::from_file_name(&file.file_name),
            url: file.file_url.clone(),
            description: file.file_description.clone(),
            size: file.file_size.clone(),
            pages: None,
            is_ai_generated: None,
        })
        .collect()
}

fn scraped_value(scraped: &ScrapedTender) -> Option<f64> {
    let raw = non_empty(Some(scraped.value.as_str())).or_else(|| non_empty(scraped.tender_value.as_deref()));
    parse_optional_currency(raw).amount()
}

fn scraped_location(scraped: &ScrapedTender) -> String {
    non_empty(Some(scraped.city.as_str()))
        .or_else(|| non_empty(scraped.state.as_deref()))
        .unwrap_or("N/A")
        .to_string()
}

fn published_or_now(scraped: &ScrapedTender) -> String {
    non_empty(scraped.publish_date.as_deref())
        .map(str::to_string)
        .unwrap_or_else(|| chrono::Utc::now().to_rfc3339())
}

/// Turn a scraped tender into the listing model. An unreadable value stays
/// `None` so range filters let it through.
pub fn normalize_tender(scraped: &ScrapedTender, category: &str) -> Tender {
    Tender {
        id: scraped.id.clone(),
        title: scraped.tender_name.clone(),
        authority: non_empty(scraped.tendering_authority.as_deref()).unwrap_or("Unknown").to_string(),
        organization: None,
        description: non_empty(Some(scraped.summary.as_str())).map(str::to_string),
        value: scraped_value(scraped),
        due_date: non_empty(Some(scraped.due_date.as_str())).unwrap_or("N/A").to_string(),
        status: TenderStatus::Live,
        category: category.trim().to_string(),
        e_published_date: published_or_now(scraped),
        bid_security: 0.0,
        emd: scraped.emd.as_deref().map(parse_currency).and_then(|v| v.amount()).unwrap_or(0.0),
        location: scraped_location(scraped),
        length: None,
        cost_per_km: None,
        progress_pct: 0,
        documents: document_refs(&scraped.files),
        risk_level: None,
    }
}

/// Category a scraped tender belongs to when it is not nested in a query.
fn scraped_category(scraped: &ScrapedTender) -> &str {
    non_empty(scraped.category.as_deref())
        .or_else(|| non_empty(scraped.query_name.as_deref()))
        .unwrap_or(UNCATEGORIZED)
}

pub fn normalize_tender_details(scraped: &ScrapedTender) -> TenderDetails {
    let tender_no = non_empty(scraped.tender_no.as_deref())
        .or_else(|| non_empty(scraped.tdr.as_deref()))
        .or_else(|| non_empty(Some(scraped.tender_id_str.as_str())))
        .map(str::to_string);

    let due_date = non_empty(Some(scraped.due_date.as_str()))
        .or_else(|| non_empty(scraped.last_date_of_bid_submission.as_deref()))
        .unwrap_or("N/A")
        .to_string();

    let category = non_empty(scraped.query_name.as_deref())
        .or_else(|| non_empty(scraped.category.as_deref()))
        .unwrap_or(UNCATEGORIZED)
        .to_string();

    TenderDetails {
        id: scraped.id.clone(),
        tender_no,
        title: scraped.tender_name.clone(),
        authority: non_empty(scraped.tendering_authority.as_deref()).unwrap_or("N/A").to_string(),
        value: scraped_value(scraped),
        due_date,
        status: TenderDetailStatus::Live,
        category,
        emd: parse_optional_currency(scraped.emd.as_deref()).amount(),
        location: scraped_location(scraped),
        length: None,
        cost_per_km: None,
        e_published_date: published_or_now(scraped),
        documents: tender_documents(&scraped.files),
        risk_level: None,
    }
}

/// Client for the TenderIQ endpoints.
#[derive(Debug, Clone)]
pub struct TenderIqClient {
    api: ApiClient,
}

impl TenderIqClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Tenders from the latest daily scrape, flattened across queries. Each
    /// tender takes its query name as category.
    pub async fn fetch_daily_tenders(&self) -> ClientResult<Vec<Tender>> {
        let data: TenderApiResponse = self.api.get_json("fetch daily tenders", "/tenderiq/dailytenders").await?;

        let mut tenders = Vec::new();
        for query in &data.queries {
            let category = non_empty(Some(query.query_name.as_str())).unwrap_or(UNCATEGORIZED);
            tracing::debug!("Processing category: {}, tenders count: {}", category, query.tenders.len());
            tenders.extend(query.tenders.iter().map(|t| normalize_tender(t, category)));
        }

        tracing::info!("Fetched {} daily tenders across {} queries", tenders.len(), data.queries.len());
        Ok(tenders)
    }

    /// Scrape dates known to the backend. Updates `context` with the latest.
    pub async fn fetch_available_dates(&self, context: &mut ScrapeContext) -> ClientResult<Vec<AvailableDate>> {
        let data: DatesResponse = self.api.get_json("fetch available dates", "/tenderiq/dates").await?;
        context.record_dates(&data.dates);
        tracing::debug!("Available scrape dates: {}, latest: {:?}", data.dates.len(), context.latest_date());
        Ok(data.dates)
    }

    /// Server-side filtered tenders. When the query names no date, date
    /// range or all-dates flag, the latest scrape date from `context` is used.
    pub async fn fetch_filtered_tenders(
        &self,
        query: &FilteredTendersQuery,
        context: &ScrapeContext,
    ) -> ClientResult<FilteredTendersResponse> {
        let mut params: Vec<(&str, String)> = Vec::new();

        let date = query.date.clone().or_else(|| {
            if query.date_range.is_none() && !query.include_all_dates {
                context.latest_date().map(str::to_string)
            } else {
                None
            }
        });
        if let Some(date) = date {
            params.push(("date", date));
        }
        if let Some(range) = query.date_range {
            params.push(("date_range", range.as_str().to_string()));
        }
        if query.include_all_dates {
            params.push(("include_all_dates", "true".to_string()));
        }
        if let Some(category) = non_empty(query.category.as_deref()) {
            params.push(("category", category.to_string()));
        }
        if let Some(location) = non_empty(query.location.as_deref()) {
            params.push(("location", location.to_string()));
        }
        if let Some(min) = query.min_value {
            params.push(("min_value", min.to_string()));
        }
        if let Some(max) = query.max_value {
            params.push(("max_value", max.to_string()));
        }

        let request = self.api.request(Method::GET, "/tenderiq/tenders")?.query(&params);
        let raw: RawFilteredTenders = self.api.send_json("fetch filtered tenders", request).await?;

        let tenders: Vec<Tender> = raw.tenders.iter().map(|t| normalize_tender(t, scraped_category(t))).collect();
        let total_count = raw.total_count.unwrap_or(tenders.len() as u64);

        Ok(FilteredTendersResponse {
            tenders,
            total_count,
            filtered_by: raw.filtered_by.unwrap_or_default(),
            available_dates: raw.available_dates,
        })
    }

    pub async fn fetch_tender_by_id(&self, id: &str) -> ClientResult<TenderDetails> {
        let path = format!("/tenderiq/tenders/{}", segment(id));
        let scraped: ScrapedTender = self.api.get_json("fetch tender details", &path).await?;
        Ok(normalize_tender_details(&scraped))
    }

    pub async fn perform_tender_action(&self, id: &str, action: TenderAction) -> ClientResult<()> {
        let path = format!("/tenderiq/tenders/{}/actions", segment(id));
        let request = self.api.request(Method::POST, &path)?.json(&TenderActionRequest { action });
        self.api.send_empty("perform tender action", request).await?;
        tracing::info!("Applied {:?} to tender {}", action, id);
        Ok(())
    }

    pub async fn fetch_wishlisted_tenders(&self) -> ClientResult<Vec<Tender>> {
        let scraped: Vec<ScrapedTender> = self.api.get_json("fetch wishlisted tenders", "/tenderiq/wishlist").await?;
        Ok(scraped.iter().map(|t| normalize_tender(t, scraped_category(t))).collect())
    }

    pub async fn start_analysis(&self, id: &str) -> ClientResult<AnalysisStatus> {
        let path = format!("/tenderiq/analyze/{}", segment(id));
        let request = self.api.request(Method::POST, &path)?;
        self.api.send_json("start tender analysis", request).await
    }

    pub async fn analysis_status(&self, id: &str) -> ClientResult<AnalysisStatus> {
        let path = format!("/tenderiq/analyze/status/{}", segment(id));
        self.api.get_json("fetch analysis status", &path).await
    }

    pub async fn analysis_results(&self, id: &str) -> ClientResult<TenderAnalysis> {
        let path = format!("/tenderiq/analyze/results/{}", segment(id));
        self.api.get_json("fetch analysis results", &path).await
    }

    /// Start an analysis and poll its status until it completes, then fetch
    /// the results.
    pub async fn analyze_tender(&self, id: &str, config: &AnalysisConfig) -> ClientResult<TenderAnalysis> {
        let mut status = self.start_analysis(id).await?;
        let interval = Duration::from_millis(config.poll_interval_ms);
        let mut attempts = 0;

        while !status.status.is_terminal() {
            if attempts >= config.max_polls {
                tracing::warn!("Gave up waiting for analysis of tender {} after {} checks", id, attempts);
                return Err(ClientError::AnalysisTimeout { tender_id: id.to_string(), attempts });
            }
            tokio::time::sleep(interval).await;
            attempts += 1;
            status = self.analysis_status(id).await?;
            tracing::debug!("Analysis of tender {}: {:?} ({:?}%)", id, status.status, status.progress);
        }

        if status.status == AnalysisState::Failed {
            return Err(ClientError::AnalysisFailed {
                tender_id: id.to_string(),
                message: status.message.unwrap_or_else(|| "no details given".to_string()),
            });
        }

        self.analysis_results(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scraped(value: &str) -> ScrapedTender {
        ScrapedTender {
            id: "t-1".to_string(),
            tender_id_str: "2025_NHAI_1".to_string(),
            tender_name: "Four laning of NH-48".to_string(),
            value: value.to_string(),
            due_date: " 2025-12-15 ".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_tender_defaults() {
        let tender = normalize_tender(&scraped("₹15 Cr"), "  Civil  ");
        assert_eq!(tender.value, Some(150_000_000.0));
        assert_eq!(tender.category, "Civil");
        assert_eq!(tender.authority, "Unknown");
        assert_eq!(tender.location, "N/A");
        assert_eq!(tender.due_date, "2025-12-15");
        assert_eq!(tender.status, TenderStatus::Live);
        assert_eq!(tender.emd, 0.0);
    }

    #[test]
    fn test_normalize_tender_falls_back_to_tender_value_and_state() {
        let mut raw = scraped("");
        raw.tender_value = Some("9 Lakh".to_string());
        raw.state = Some("Maharashtra".to_string());
        let tender = normalize_tender(&raw, "Roads");
        assert_eq!(tender.value, Some(900_000.0));
        assert_eq!(tender.location, "Maharashtra");
    }

    #[test]
    fn test_ref_document_value_stays_unknown() {
        assert_eq!(normalize_tender(&scraped("Ref Document"), "Civil").value, None);
        assert_eq!(normalize_tender_details(&scraped("Ref Document")).value, None);
    }

    #[test]
    fn test_details_tender_number_fallback() {
        let mut raw = scraped("1 Cr");
        assert_eq!(normalize_tender_details(&raw).tender_no.as_deref(), Some("2025_NHAI_1"));
        raw.tdr = Some("TDR-9".to_string());
        assert_eq!(normalize_tender_details(&raw).tender_no.as_deref(), Some("TDR-9"));
        raw.tender_no = Some("NO-1".to_string());
        assert_eq!(normalize_tender_details(&raw).tender_no.as_deref(), Some("NO-1"));
    }

    #[test]
    fn test_scrape_context_prefers_latest_flag() {
        let mut context = ScrapeContext::new();
        context.record_dates(&[]);
        assert_eq!(context.latest_date(), None);

        let dates = vec![
            AvailableDate { date: "2025-11-01".to_string(), ..Default::default() },
            AvailableDate { date: "2025-11-02".to_string(), is_latest: true, ..Default::default() },
        ];
        context.record_dates(&dates);
        assert_eq!(context.latest_date(), Some("2025-11-02"));
    }
}
