use {
    chart_engine::{Cli, replay},
    clap::Parser,
    std::panic,
    tabled::Table,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        log::error!("CRITICAL PANIC:\n{}\nStack Trace:\n{}", info, backtrace);
    }));

    let (global_level, my_code_level) = if cfg!(debug_assertions) {
        (log::LevelFilter::Warn, log::LevelFilter::Info)
    } else {
        (log::LevelFilter::Error, log::LevelFilter::Warn)
    };

    let mut builder = env_logger::Builder::new();

    builder
        .filter(None, global_level)
        .filter(Some("chart_engine"), my_code_level)
        .init();

    let args = Cli::parse();
    let report = replay::run(&args).await?;

    println!("{}", report.request);
    println!("{} trades replayed", report.ticks);
    if !report.closed.is_empty() {
        println!("\nClosed candles\n{}", Table::new(&report.closed));
    }
    if !report.series.is_empty() {
        println!("\nSeries tail\n{}", Table::new(&report.series));
    }
    if !report.indicators.is_empty() {
        println!("\nIndicators\n{}", Table::new(&report.indicators));
    }
    if !report.alarms.is_empty() {
        println!("\nAlarms\n{}", Table::new(&report.alarms));
    }
    Ok(())
}
