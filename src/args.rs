use clap::{Parser, ValueEnum};
use shop_spider::config::{MapConfig, SpiderConfig, TaskConfig};
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "shop-spider")]
#[command(about = "Extracts product listings from e-commerce sites or maps a site's link graph")]
#[command(version)]
pub struct Args {
    /// Seed site URLs (spider mode) or the single root URL (map mode)
    pub urls: Vec<String>,

    /// What to do with the URLs
    #[arg(short, long, value_enum, default_value_t = ModeArg::Spider)]
    pub mode: ModeArg,

    /// JSON task configuration file; command-line flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// WebDriver server URL (also settable via WEBDRIVER_URL)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Subpage depth to crawl in map mode
    #[arg(short, long)]
    pub depth: Option<usize>,

    /// Directory map snapshots are written under
    #[arg(long)]
    pub out_dir: Option<String>,

    /// Page-load timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Walk each site's frontier and extract product records
    Spider,
    /// Produce a depth-bounded site map as a JSON tree
    Map,
}

impl Args {
    /// Resolve file config, flags and environment into one task
    pub fn into_task(self) -> Result<TaskConfig, Box<dyn Error>> {
        let mut task = if let Some(path) = &self.config {
            TaskConfig::from_file(path)?
        } else {
            match self.mode {
                ModeArg::Spider => {
                    if self.urls.is_empty() {
                        return Err("spider mode needs at least one site URL".into());
                    }
                    TaskConfig::Spider(SpiderConfig::new(self.urls.clone()))
                }
                ModeArg::Map => {
                    if self.urls.len() != 1 {
                        return Err("map mode needs exactly one root URL".into());
                    }
                    TaskConfig::Map(MapConfig::new(&self.urls[0]))
                }
            }
        };

        let webdriver_url = self
            .webdriver_url
            .clone()
            .or_else(|| std::env::var("WEBDRIVER_URL").ok().filter(|v| !v.is_empty()));

        match &mut task {
            TaskConfig::Spider(cfg) => {
                if self.config.is_some() && !self.urls.is_empty() {
                    cfg.sites = self.urls.clone();
                }
                if let Some(url) = webdriver_url {
                    cfg.webdriver_url = url;
                }
                if let Some(secs) = self.timeout {
                    cfg.nav_timeout_secs = secs;
                }
            }
            TaskConfig::Map(cfg) => {
                if self.config.is_some() && !self.urls.is_empty() {
                    cfg.root_url = self.urls[0].clone();
                }
                if let Some(url) = webdriver_url {
                    cfg.webdriver_url = url;
                }
                if let Some(depth) = self.depth {
                    cfg.max_depth = depth;
                }
                if let Some(dir) = &self.out_dir {
                    cfg.out_dir = dir.clone();
                }
                if let Some(secs) = self.timeout {
                    cfg.nav_timeout_secs = secs;
                }
            }
        }

        Ok(task)
    }
}
