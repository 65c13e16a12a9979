use catalog_harvest::{Catalog, ProductRecord};
use clap::Parser;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();
    let catalog = build_catalog(&args)?;

    ::log::info!("Starting harvest of {}", catalog.url());
    ::log::info!(
        "Web scraping requires a WebDriver server (e.g., ChromeDriver) at {}",
        catalog.config().webdriver_url
    );

    let start_time = std::time::Instant::now();
    let records = if args.single_page {
        catalog.scrape_single_page().await?
    } else {
        catalog.scrape().await?
    };

    ::log::info!(
        "Harvest complete - {} products in {:.2} seconds",
        records.len(),
        start_time.elapsed().as_secs_f64()
    );

    let paths = catalog.save(&records)?;
    if paths.written().next().is_none() {
        ::log::warn!("Nothing was saved");
    }

    for (i, record) in records.iter().take(3).enumerate() {
        log_record(i + 1, record);
    }

    Ok(())
}

fn build_catalog(args: &Args) -> Result<Catalog, Box<dyn std::error::Error>> {
    let mut catalog = Catalog::new(&args.url);
    if let Some(path) = &args.config {
        catalog = catalog.with_config_file(path)?;
    }

    // Flags given on the command line override the file
    if args.headless {
        catalog = catalog.with_headless(true);
    } else if args.headed {
        catalog = catalog.with_headless(false);
    }
    if let Some(timeout) = args.timeout {
        catalog = catalog.with_timeout(timeout);
    }
    if let Some(max_pages) = args.max_pages {
        catalog = catalog.with_max_pages(max_pages);
    }
    if let Some(delay) = args.delay {
        catalog = catalog.with_delay(delay);
    }
    if let Some(dir) = &args.output_dir {
        catalog = catalog.with_output_dir(dir);
    }
    if let Some(url) = &args.webdriver_url {
        catalog = catalog.with_webdriver_url(url);
    }
    Ok(catalog)
}

fn log_record(position: usize, record: &ProductRecord) {
    ::log::info!("{}. {}", position, record.name);
    ::log::info!("   Price: {} ({})", record.price, record.currency);
    ::log::info!("   URL: {}", record.url);
    ::log::info!("   Availability: {} [{}]", record.instock_text, record.instock_schema);
}
