use anyhow::Context;
use clap::Parser;
use elite_checkout::utils::{logger, validation::Validate};
use elite_checkout::{FragmentLoader, HttpFragmentSource, SiteConfig, StdoutSink};

#[derive(Parser)]
#[command(name = "fragment_fetch")]
#[command(about = "Fetch the site header and footer fragments and print them as a page would inject them")]
struct Args {
    /// Path to site configuration (TOML)
    #[arg(short, long)]
    config: Option<String>,

    /// Override site.base_url from the config
    #[arg(long)]
    base_url: Option<String>,

    /// Page the fragments are injected into; nested pages get their links rewritten
    #[arg(long, default_value = "/assets/pages/checkout.html")]
    page: String,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    let mut site = match &args.config {
        Some(path) => SiteConfig::from_file(path)
            .with_context(|| format!("Failed to load config file '{}'", path))?,
        None => SiteConfig::default(),
    };
    if let Some(base_url) = &args.base_url {
        tracing::info!("🔧 Base URL overridden to: {}", base_url);
        site.site.base_url = base_url.clone();
    }
    site.validate().context("Site configuration is invalid")?;

    let source = HttpFragmentSource::new(site.base_url())?;
    let loader = FragmentLoader::new(
        source,
        site.header_spec(),
        site.footer_spec(),
        site.link_rewriter(),
    );

    let report = loader.load_page_chrome(&args.page, &StdoutSink).await;
    if !report.is_complete() {
        // 片段缺失不算致命錯誤，頁面仍可使用
        tracing::warn!("⚠️ Missing fragments: {}", report.failed.join(", "));
    }

    Ok(())
}
