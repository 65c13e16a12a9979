use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_URL: &str = "https://www.divan.ru/category/svet?sort=0";

#[derive(Parser, Debug)]
#[command(name = "catalog-harvest")]
#[command(about = "Collects product listings from a storefront category")]
#[command(version)]
pub struct Args {
    /// Category listing URL
    #[arg(default_value = DEFAULT_URL)]
    pub url: String,

    /// Run the browser without a window (the default unless the config file says otherwise)
    #[arg(long)]
    pub headless: bool,

    /// Show the browser window
    #[arg(long, conflicts_with = "headless")]
    pub headed: bool,

    /// Page load timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Maximum number of listing pages to visit
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Pause between pages in seconds
    #[arg(long)]
    pub delay: Option<u64>,

    /// Scrape only the given URL, without pagination
    #[arg(long)]
    pub single_page: bool,

    /// JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory for the result files
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// WebDriver server URL (the WEBDRIVER_URL environment variable takes precedence)
    #[arg(long)]
    pub webdriver_url: Option<String>,
}
