use anyhow::{anyhow, Context, Result};
use ceigall_iq::models::{
    ConfidentialityLevel, DateRange, DocumentQuery, FilteredTendersQuery, FolderQuery, Tender, TenderAction,
};
use ceigall_iq::services::{
    file_kind, filter_documents, filter_tenders, format_crore, format_file_size, group_by_category, parse_currency,
    sort_documents, ApiClient, DmsClient, DocumentFilter, DocumentSort, FolderTree, ScrapeContext, TenderFilter,
    TenderIqClient, UploadProgress,
};
use ceigall_iq::AppConfig;
use clap::{Parser, Subcommand, ValueEnum};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ceigall-iq", about = "TenderIQ and DMS client for the Ceigall AI Platform")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List live tenders grouped by category
    Tenders {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        location: Option<String>,
        /// Lower bound, e.g. "20 Cr" or 200000000
        #[arg(long, value_parser = parse_amount)]
        min_value: Option<f64>,
        #[arg(long, value_parser = parse_amount)]
        max_value: Option<f64>,
        /// Scrape date (YYYY-MM-DD); uses the server-side filter endpoint
        #[arg(long)]
        date: Option<String>,
        #[arg(long, value_enum)]
        date_range: Option<Range>,
        #[arg(long)]
        all_dates: bool,
    },
    /// Show the scrape dates known to the backend
    Dates,
    /// Show a single tender
    Tender { id: String },
    /// Toggle a tender on the wishlist
    Wishlist { id: String },
    /// Run the AI analysis for a tender and print the one-pager
    Analyze { id: String },
    /// Print the folder tree
    Folders {
        #[arg(long)]
        department: Option<String>,
    },
    /// List documents
    Documents {
        #[arg(long)]
        folder: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value = "modified-desc")]
        sort: DocumentSort,
    },
    /// Upload a file into a folder
    Upload {
        path: PathBuf,
        #[arg(long)]
        folder: String,
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        #[arg(long, value_enum, default_value = "internal")]
        confidentiality: Confidentiality,
        #[arg(long)]
        category: Option<String>,
    },
    /// Download a document to a local file
    Download { id: String, output: PathBuf },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Range {
    #[value(name = "1d")]
    Last1Day,
    #[value(name = "5d")]
    Last5Days,
    #[value(name = "7d")]
    Last7Days,
    #[value(name = "30d")]
    Last30Days,
}

impl From<Range> for DateRange {
    fn from(range: Range) -> Self {
        match range {
            Range::Last1Day => DateRange::Last1Day,
            Range::Last5Days => DateRange::Last5Days,
            Range::Last7Days => DateRange::Last7Days,
            Range::Last30Days => DateRange::Last30Days,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Confidentiality {
    Public,
    Internal,
    Confidential,
    Restricted,
}

impl From<Confidentiality> for ConfidentialityLevel {
    fn from(level: Confidentiality) -> Self {
        match level {
            Confidentiality::Public => ConfidentialityLevel::Public,
            Confidentiality::Internal => ConfidentialityLevel::Internal,
            Confidentiality::Confidential => ConfidentialityLevel::Confidential,
            Confidentiality::Restricted => ConfidentialityLevel::Restricted,
        }
    }
}

fn parse_amount(raw: &str) -> Result<f64, String> {
    parse_currency(raw).amount().ok_or_else(|| format!("'{}' is not an amount", raw))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ceigall_iq=info,reqwest=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::new()?;
    info!("Using API at {}", config.api.base_url);

    let api = ApiClient::new(&config.api);

    match cli.command {
        Command::Tenders { search, category, location, min_value, max_value, date, date_range, all_dates } => {
            let tenderiq = TenderIqClient::new(api);
            let filter = TenderFilter {
                search_term: search,
                category: category.or(config.tenders.category.clone()),
                location: location.or(config.tenders.location.clone()),
                min_value: min_value.or(config.tenders.min_value),
                max_value: max_value.or(config.tenders.max_value),
            };

            let tenders = if date.is_some() || date_range.is_some() || all_dates {
                let mut context = ScrapeContext::new();
                tenderiq.fetch_available_dates(&mut context).await?;
                let query = FilteredTendersQuery {
                    date,
                    date_range: date_range.map(DateRange::from),
                    include_all_dates: all_dates,
                    ..Default::default()
                };
                tenderiq.fetch_filtered_tenders(&query, &context).await?.tenders
            } else {
                tenderiq.fetch_daily_tenders().await?
            };

            print_tenders(&tenders, &filter);
        }
        Command::Dates => {
            let tenderiq = TenderIqClient::new(api);
            let mut context = ScrapeContext::new();
            for date in tenderiq.fetch_available_dates(&mut context).await? {
                let marker = if date.is_latest { " (latest)" } else { "" };
                println!("{}  {:>5} tenders{}", date.date, date.tender_count, marker);
            }
        }
        Command::Tender { id } => {
            let tender = TenderIqClient::new(api).fetch_tender_by_id(&id).await?;
            println!("{}", tender.title);
            println!("  Tender no:  {}", tender.tender_no.as_deref().unwrap_or("-"));
            println!("  Authority:  {}", tender.authority);
            println!("  Category:   {}", tender.category);
            println!("  Location:   {}", tender.location);
            println!("  Value:      {}", format_crore(tender.value));
            println!("  EMD:        {}", format_crore(tender.emd));
            println!("  Due date:   {}", tender.due_date);
            for doc in &tender.documents {
                println!("  - [{:?}] {} {}", doc.kind, doc.name, doc.url);
            }
        }
        Command::Wishlist { id } => {
            let tenderiq = TenderIqClient::new(api);
            tenderiq.perform_tender_action(&id, TenderAction::ToggleWishlist).await?;
            let wishlisted = tenderiq.fetch_wishlisted_tenders().await?.iter().any(|t| t.id == id);
            println!("{}", if wishlisted { "Added to wishlist" } else { "Removed from wishlist" });
        }
        Command::Analyze { id } => {
            let analysis = TenderIqClient::new(api).analyze_tender(&id, &config.analysis).await?;
            let one_pager = analysis.one_pager_json.ok_or_else(|| anyhow!("Analysis for {} has no one-pager", id))?;
            println!("Project overview:\n  {}", one_pager.project_overview);
            print_section("Eligibility highlights", &one_pager.eligibility_highlights);
            print_section("Important dates", &one_pager.important_dates);
            print_section("Financial requirements", &one_pager.financial_requirements);
            println!("Risk analysis:\n  {}", one_pager.risk_analysis.summary);
        }
        Command::Folders { department } => {
            let folders = DmsClient::new(api).folders(&FolderQuery { department, ..Default::default() }).await?;
            let tree = FolderTree::from_nested(folders).context("Folder listing is not a tree")?;
            let expanded: HashSet<String> = tree
                .roots()
                .iter()
                .flat_map(|root| tree.subtree_ids(&root.id))
                .map(str::to_string)
                .collect();
            for row in tree.visible_rows(&expanded) {
                println!(
                    "{}{} ({} documents)",
                    "  ".repeat(row.depth),
                    row.folder.name,
                    row.folder.document_count
                );
            }
        }
        Command::Documents { folder, search, category, sort } => {
            let dms = DmsClient::new(api);
            let query = DocumentQuery { folder_id: folder.clone(), ..Default::default() };
            let documents = dms.documents(&query).await?;
            let filter = DocumentFilter { folder_id: folder, search, category_id: category, ..Default::default() };
            let mut documents = filter_documents(&documents, &filter);
            sort_documents(&mut documents, sort);
            for doc in &documents {
                println!(
                    "{:<40} {:>10}  {:<12} {:?} {}",
                    doc.display_name(),
                    format_file_size(doc.file_size()),
                    format!("{:?}", file_kind(doc.display_name())),
                    doc.status,
                    doc.last_modified()
                );
            }
        }
        Command::Upload { path, folder, tags, confidentiality, category } => {
            let progress: UploadProgress = Arc::new(|pct| tracing::debug!("Upload progress: {:.0}%", pct));
            let document = DmsClient::new(api)
                .upload_path(&path, &folder, tags, confidentiality.into(), category, Some(progress))
                .await?;
            println!("Uploaded {} as {}", path.display(), document.id);
        }
        Command::Download { id, output } => {
            let bytes = DmsClient::new(api).download_to(&id, &output).await?;
            println!("Saved {} ({})", output.display(), format_file_size(bytes));
        }
    }

    Ok(())
}

fn print_tenders(tenders: &[Tender], filter: &TenderFilter) {
    let filtered = filter_tenders(tenders, filter);
    println!("Showing {} of {} tenders", filtered.len(), tenders.len());

    for (category, group) in group_by_category(filtered) {
        println!("\n{} ({})", category, group.len());
        for tender in group {
            println!(
                "  {:<60} {:>16}  {:<20} due {}",
                tender.title.chars().take(60).collect::<String>(),
                format_crore(tender.value),
                tender.location,
                tender.due_date
            );
        }
    }
}

fn print_section(title: &str, items: &[String]) {
    println!("{}:", title);
    for item in items {
        println!("  - {}", item);
    }
}
