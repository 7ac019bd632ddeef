use clap::Parser;
use shop_spider::config::{MapConfig, SpiderConfig, TaskConfig};
use shop_spider::{SiteMapper, Spider, WebDriverFetcher};
use shop_spider::utils::slugify_url;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    let task = match args.into_task() {
        Ok(task) => task,
        Err(e) => {
            ::log::error!("Invalid invocation: {}", e);
            std::process::exit(2);
        }
    };

    println!("Note: crawling requires a WebDriver server (e.g. chromedriver).");
    println!("Set WEBDRIVER_URL or --webdriver-url if not using the default http://localhost:4444");

    let result = match task {
        TaskConfig::Spider(config) => run_spider(config).await,
        TaskConfig::Map(config) => run_map(config).await,
    };

    if let Err(e) = result {
        ::log::error!("Run failed: {}", e);
        std::process::exit(1);
    }
}

/// Walk each configured site's frontier, printing one JSON record per
/// extracted product
async fn run_spider(config: SpiderConfig) -> Result<(), Box<dyn Error>> {
    let fetcher = WebDriverFetcher::connect(
        &config.webdriver_url,
        Duration::from_secs(config.nav_timeout_secs),
    )
    .await?;

    let spider = Spider::new(config, fetcher)?;
    let (tx, mut rx) = mpsc::channel(1024);

    let printer = tokio::spawn(async move {
        let mut count = 0usize;
        while let Some(record) = rx.recv().await {
            count += 1;
            match serde_json::to_string(&record) {
                Ok(line) => println!("{line}"),
                Err(e) => ::log::error!("Failed to serialize record: {}", e),
            }
        }
        count
    });

    let start_time = std::time::Instant::now();
    let summaries = spider.run(&tx).await;
    drop(tx);
    let count = printer.await?;

    for summary in &summaries {
        ::log::info!(
            "{}: {} pages, {} products, {} failures",
            summary.site,
            summary.pages_fetched,
            summary.products,
            summary.failures
        );
    }
    ::log::info!(
        "Scraping complete - {} products in {:.2} seconds",
        count,
        start_time.elapsed().as_secs_f64()
    );

    spider.into_fetcher().close().await;
    Ok(())
}

/// Map the configured site and write the tree snapshot to
/// `<out_dir>/<slug>/crawl.json`
async fn run_map(config: MapConfig) -> Result<(), Box<dyn Error>> {
    let fetcher = WebDriverFetcher::connect(
        &config.webdriver_url,
        Duration::from_secs(config.nav_timeout_secs),
    )
    .await?;

    let mut mapper = SiteMapper::new(&config, fetcher)?;

    let start_time = std::time::Instant::now();
    let tree = mapper.map_site().await;

    let out_dir = Path::new(&config.out_dir).join(slugify_url(&config.root_url));
    std::fs::create_dir_all(&out_dir)?;
    let out_path = out_dir.join("crawl.json");
    std::fs::write(&out_path, serde_json::to_string_pretty(&tree)?)?;

    ::log::info!(
        "Mapped {} nodes in {:.2} seconds, snapshot at {}",
        tree.node_count(),
        start_time.elapsed().as_secs_f64(),
        out_path.display()
    );

    mapper.into_fetcher().close().await;
    Ok(())
}
