use clap::Parser;
use elite_checkout::core::Step;
use elite_checkout::utils::error::{CheckoutError, ErrorSeverity};
use elite_checkout::utils::{logger, validation::Validate};
use elite_checkout::{
    CheckoutController, CheckoutSettings, CliConfig, ConsoleHost, FormFile, OrderSummary,
    SiteConfig, SubmitOutcome,
};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting elite-checkout CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = run(&config).await {
        tracing::error!(
            "❌ Checkout simulation failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(config: &CliConfig) -> Result<(), CheckoutError> {
    // 載入並驗證網站配置
    let site = match &config.config {
        Some(path) => {
            tracing::info!("📁 Loading site configuration from: {}", path);
            SiteConfig::from_file(path)?
        }
        None => SiteConfig::default(),
    };
    site.validate()?;

    let mut settings = site.checkout_settings();
    if config.no_delay {
        settings = CheckoutSettings {
            processing_delay: Duration::ZERO,
            redirect_delay: Duration::ZERO,
            ..settings
        };
    }

    let Some(form_path) = &config.form else {
        let summary = OrderSummary::for_item(elite_checkout::core::catalog::item_from_query(&config.query));
        print_summary(&summary);
        return Ok(());
    };

    let fixture = FormFile::from_file(form_path)?;
    let form = fixture.to_form()?;
    let mut controller = CheckoutController::from_query(&config.query, form, ConsoleHost, settings);
    print_summary(controller.summary());

    if let Some(method) = fixture.payment_method() {
        controller.select_payment_method(&method);
    }

    // 逐步前進，任一步驗證失敗就停下
    let last_step = controller.form().steps().last().copied().unwrap_or(Step::Review);
    while controller.current_step() < last_step {
        let before = controller.current_step();
        if !controller.advance() {
            println!("⛔ Stopped at {}", controller.current_step());
            return Ok(());
        }
        if controller.current_step() == before {
            break;
        }
    }

    match controller.submit().await {
        SubmitOutcome::Completed(_) => {
            controller.close_completion().await;
        }
        SubmitOutcome::Rejected { step } => {
            println!("⛔ Submission rejected at {}", step);
        }
        SubmitOutcome::Ignored => {}
    }

    Ok(())
}

fn print_summary(summary: &OrderSummary) {
    let breakdown = &summary.breakdown;

    println!("📦 {} ({}{})", summary.item.display_name, summary.price_display(), summary.item.period_label());
    println!("   {}", summary.description);
    if !summary.item.features.is_empty() {
        println!("   Features: {}", summary.item.features.join(", "));
    }
    println!("   Subtotal:  {}", breakdown.subtotal_display());
    println!("   Setup fee: {}", breakdown.setup_fee_display());
    if let Some(discount) = breakdown.discount_display() {
        println!("   Discount:  {}", discount);
    }
    println!("   Tax:       {}", breakdown.tax_display());
    println!("   Total:     {}", breakdown.total_display());
}
