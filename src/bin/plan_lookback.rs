use {
    anyhow::{Context, Result},
    chart_engine::{LookbackPlanner, Resolution, data::indicator_history_count},
    chrono::DateTime,
    clap::Parser,
};

/// Print the history request a chart would issue.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(long, default_value = "AAPL")]
    symbol: String,

    /// Resolution wire code
    #[arg(long, default_value = "1")]
    resolution: Resolution,

    /// Candles the series keeps
    #[arg(long, default_value_t = chart_engine::ENGINE.window_size)]
    window: usize,

    /// Longest indicator period on the chart, if any
    #[arg(long)]
    period: Option<usize>,

    /// Plan as of this unix second instead of the local clock
    #[arg(long)]
    at: Option<i64>,

    /// Print JSON instead of text
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let count = match args.period {
        Some(p) => indicator_history_count(args.window, p),
        None => args.window,
    };

    let planner = LookbackPlanner::default();
    let request = match args.at {
        Some(secs) => {
            let at = DateTime::from_timestamp(secs, 0)
                .with_context(|| format!("timestamp {} out of range", secs))?;
            planner.plan_at(&args.symbol, args.resolution, count, &at)
        }
        None => planner.plan(&args.symbol, args.resolution, count),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&request)?);
    } else {
        println!("{}", request);
    }
    Ok(())
}
