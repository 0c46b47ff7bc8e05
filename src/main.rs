//! SiteSearch-RS: search page client
//!
//! Bootstraps a runner from settings, runs the initial search and then reads
//! interactions from stdin:
//!
//! - `page <n>` clicks a pagination control
//! - `facet <value>` toggles a facet control
//! - any other line is typed into the search box

use anyhow::Result;
use sitesearch_rs::{
    config,
    network::HttpClient,
    providers,
    render::{Execution, ListenerRegistry, QueryParamReflector, RenderGateway, TemplateRenderer},
    Runner,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_usage();
        return Ok(());
    }

    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting SiteSearch-RS v{}", sitesearch_rs::VERSION);

    let settings = config::init(config::load()?)?;

    let mut initial = settings.initial.clone();
    if !args.is_empty() {
        initial.query = args.join(" ");
    }
    initial.page_size.get_or_insert(settings.search.page_size);

    let client = HttpClient::with_settings(&settings.outgoing)?;
    let service = providers::create_service(&settings.provider, &settings.search, client)?;

    let gateway = Arc::new(
        TemplateRenderer::new(&settings.ui, &settings.search.facet_dimension)?
            .with_input_value(&initial.query),
    );
    let binder = Arc::new(ListenerRegistry::new());
    let reflector = Arc::new(QueryParamReflector::new(
        &settings.ui.page_url,
        &settings.ui.query_param,
    )?);

    let runner = Runner::new(
        service,
        gateway.clone(),
        binder.clone(),
        reflector.clone(),
        initial,
        settings.search.pagination_window,
    );

    match runner.start().await {
        Ok(result) => info!("Initial search returned {} hits", result.total_hits),
        Err(e) => warn!("Initial search failed: {}", e),
    }
    print_page(&gateway, &reflector);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let execution = if let Some(page) = line.strip_prefix("page ") {
            match page.trim().parse() {
                Ok(page) => binder.click_page(&gateway.pagination_container(), page),
                Err(_) => {
                    warn!("Not a page number: {}", page);
                    continue;
                }
            }
        } else if let Some(value) = line.strip_prefix("facet ") {
            gateway.click_facet(value.trim())
        } else {
            binder.input(&gateway.input_field(), line)
        };

        if let Some(execution) = execution {
            wait(execution).await;
            print_page(&gateway, &reflector);
        }
    }

    Ok(())
}

async fn wait(execution: Execution) {
    match execution.await {
        Ok(Ok(result)) => info!(
            "Page {}/{} of {} hits",
            result.current_page, result.total_pages, result.total_hits
        ),
        Ok(Err(e)) if e.is_stale() => {}
        Ok(Err(e)) => warn!("Search failed: {}", e),
        Err(e) => warn!("Search task aborted: {}", e),
    }
}

fn print_page(gateway: &TemplateRenderer, reflector: &QueryParamReflector) {
    println!("<!-- {} -->", reflector.current_url());
    println!("{}", gateway.html());
}

/// Print usage information
fn print_usage() {
    println!(
        r#"
SiteSearch-RS v{}
Search page client for hosted search providers

USAGE:
    sitesearch-rs [QUERY...]

STDIN COMMANDS:
    page <n>         Go to page n
    facet <value>    Toggle a facet value
    <text>           Search for text

ENVIRONMENT VARIABLES:
    SITESEARCH_SETTINGS_PATH  Path to sitesearch.yml
    SITESEARCH_PROVIDER       Provider type (algolia)
    SITESEARCH_APP_ID         Provider application id
    SITESEARCH_API_KEY        Search-only API key
    SITESEARCH_COLLECTION     Index / collection name
    SITESEARCH_ENDPOINT       Provider host override
    SITESEARCH_PAGE_URL       Page address used for query reflection
    RUST_LOG                  Log filter (default: info)
"#,
        sitesearch_rs::VERSION
    );
}
