use anyhow::Context;
use chrono::Local;
use clap::Parser;
use invest_event_bot::config::EngineConfig;
use invest_event_bot::engine::{EventEvaluator, Operation};
use invest_event_bot::market::MarketLevel;
use invest_event_bot::outbox::Outbox;
use invest_event_bot::ports::memory::{
    DailyValues, MemoryStorage, StaticDailyProvider, StaticRealtimeProvider,
};
use invest_event_bot::types::*;
use rand::Rng;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "invest-bot", about = "Run portfolio event passes against a demo portfolio")]
struct Args {
    /// JSON engine config; defaults are used when absent.
    #[arg(long, env = "INVEST_BOT_CONFIG")]
    config: Option<PathBuf>,

    /// Operations to run each round (repeatable). All of them when omitted.
    #[arg(long = "event", value_enum)]
    events: Vec<Operation>,

    #[arg(long, default_value_t = 3)]
    iters: u32,

    #[arg(long, default_value_t = 1_000)]
    interval_ms: u64,

    #[arg(long, env = "INVEST_BOT_JSON_LOGS")]
    json_logs: bool,
}

struct Quote {
    code: &'static str,
    price: f64,
}

const QUOTES: [Quote; 6] = [
    Quote { code: "KRW", price: 1.0 },
    Quote { code: "USD", price: 1.0 },
    Quote { code: "153130", price: 108_500.0 },
    Quote { code: "069500", price: 35_200.0 },
    Quote { code: "KRW-BTC", price: 92_000_000.0 },
    Quote { code: "QQQ", price: 440.0 },
];

fn asset(
    id: u64,
    name: &str,
    category: u32,
    currency: Currency,
    code: &str,
    buy: f64,
    sell: f64,
) -> Asset {
    Asset {
        id: AssetId(id),
        name: name.to_string(),
        category,
        currency,
        code: code.to_string(),
        top: sell,
        bottom: buy,
        sell_price: sell,
        buy_price: buy,
    }
}

fn seed(storage: &MemoryStorage, realtime: &StaticRealtimeProvider) -> anyhow::Result<()> {
    storage.insert_fund(Fund { id: FundId(1), name: "pension".into() });
    storage.insert_fund(Fund { id: FundId(2), name: "trading".into() });

    for a in [
        asset(1, "KRW", 1, Currency::Krw, "KRW", 0.0, 0.0),
        asset(2, "USD", 2, Currency::Usd, "USD", 0.0, 0.0),
        asset(3, "KODEX short-term bond", 4, Currency::Krw, "153130", 0.0, 0.0),
        asset(4, "KODEX 200", 8, Currency::Krw, "069500", 34_000.0, 38_000.0),
        asset(5, "Bitcoin", 6, Currency::Krw, "KRW-BTC", 85_000_000.0, 100_000_000.0),
        asset(6, "Invesco QQQ", 9, Currency::Usd, "QQQ", 420.0, 0.0),
    ] {
        storage.insert_asset(a)?;
    }

    for q in QUOTES.iter() {
        realtime.set_price_info(
            q.code,
            PriceInfo {
                current: q.price,
                average: q.price * 0.95,
                highest: q.price * 1.1,
                lowest: q.price * 0.8,
            },
        );
    }

    let lots = [
        (1, 1, 1.0, 5_000_000.0),
        (1, 3, 108_000.0, 40.0),
        (1, 4, 35_000.0, 100.0),
        (1, 6, 430.0, 8.0),
        (2, 1, 1.0, 1_000_000.0),
        (2, 2, 1.0, 2_000.0),
        (2, 5, 90_000_000.0, 0.05),
    ];
    for (fund, asset, price, count) in lots {
        storage.record_invest(Invest {
            fund_id: FundId(fund),
            asset_id: AssetId(asset),
            price,
            count,
        })?;
    }

    storage.set_market(Local::now().date_naive(), MarketLevel::Neutral);
    Ok(())
}

fn jitter(realtime: &StaticRealtimeProvider, daily: &StaticDailyProvider) {
    let mut rng = rand::thread_rng();
    for q in QUOTES.iter().filter(|q| q.price > 1.0) {
        let last = realtime.price(q.code).unwrap_or(q.price);
        realtime.set_price(q.code, last * (1.0 + rng.gen_range(-0.05..=0.05)));
    }
    daily.update(|v| {
        v.exchange_rate *= 1.0 + rng.gen_range(-0.005..=0.005);
        v.benchmark *= 1.0 + rng.gen_range(-0.01..=0.01);
        v.fear_greed_index = rng.gen_range(10..=90);
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = tracing_subscriber::EnvFilter::from_default_env();
    if args.json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let cfg = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    let ops = if args.events.is_empty() {
        Operation::ALL.to_vec()
    } else {
        args.events.clone()
    };

    let storage = Arc::new(MemoryStorage::new());
    let realtime = Arc::new(StaticRealtimeProvider::new(cfg.real_estate_baseline.clone()));
    let daily = Arc::new(StaticDailyProvider::new(DailyValues {
        exchange_rate: 1_350.0,
        fear_greed_index: 45,
        benchmark: 17_000.0,
        cli: 100.2,
    }));
    seed(&storage, &realtime).context("seeding demo portfolio")?;

    let engine = EventEvaluator::new(cfg, storage.clone(), realtime.clone(), daily.clone());

    let (outbox, mut rx) = Outbox::channel();
    let notifier = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            println!("{msg}\n");
        }
    });

    for round in 0..args.iters {
        tracing::info!(round, ?ops, "dispatching event round");
        engine.dispatch(&ops, &outbox).await;

        if round + 1 == args.iters {
            break;
        }
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(args.interval_ms)) => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted, stopping");
                break;
            }
        }
        jitter(&realtime, &daily);
    }

    drop(outbox);
    notifier.await.context("notifier task")?;
    Ok(())
}
