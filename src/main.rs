//! Position report.
//!
//! `position-report <snapshot.json> <account> [chain]` scans an account against
//! a venue snapshot and prints the portfolio as JSON. With no arguments it runs
//! a built-in demo portfolio (one long and one short on Arbitrum).

use anyhow::Context;
use perps_valuation::*;

const DEMO_ACCOUNT: &str = "0x1111111111111111111111111111111111111111";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ValuationConfig::default().with_env_overrides();
    config.validate()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (venue, account, chain) = match args.as_slice() {
        [] => {
            tracing::info!("no snapshot given, running demo portfolio");
            (demo_venue()?, AccountAddress::new(DEMO_ACCOUNT), Chain::Arbitrum)
        }
        [path, account, rest @ ..] => {
            let chain = match rest.first() {
                Some(c) => c.parse::<Chain>()?,
                None => Chain::Arbitrum,
            };
            let venue = SnapshotVenue::load(path)
                .with_context(|| format!("loading snapshot {path}"))?;
            (venue, AccountAddress::new(account), chain)
        }
        _ => anyhow::bail!("usage: position-report <snapshot.json> <account> [chain]"),
    };

    let service = PositionService::new(venue, StaticTokenRegistry::mainnet(), config);
    let summary = service.scan_portfolio(&account, chain).await?;
    let view = service.presenter().portfolio(&summary);

    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

/// Long 5x WETH up 5%, short 5x WBTC against USDC down 5%.
fn demo_venue() -> anyhow::Result<SnapshotVenue> {
    let registry = StaticTokenRegistry::mainnet();
    let weth = registry.resolve(Chain::Arbitrum, "WETH")?;
    let wbtc = registry.resolve(Chain::Arbitrum, "WBTC")?;
    let usdc = registry.resolve(Chain::Arbitrum, "USDC")?;
    let account = AccountAddress::new(DEMO_ACCOUNT);

    let long = RawPosition {
        size_usd: Q30::from_units(1000),
        collateral_usd: Q30::from_units(200),
        avg_price: Q30::from_units(2000),
        last_updated: UnixTime::from_secs(1_700_000_000).context("demo timestamp")?,
        ..RawPosition::default()
    };
    let short = RawPosition {
        size_usd: Q30::from_units(5000),
        collateral_usd: Q30::from_units(1000),
        avg_price: Q30::from_units(60_000),
        last_updated: UnixTime::from_secs(1_700_003_600).context("demo timestamp")?,
        ..RawPosition::default()
    };

    Ok(SnapshotVenue::new()
        .with_position(
            Chain::Arbitrum,
            PositionKey::new(account.clone(), weth.address.clone(), weth.address.clone(), Side::Long),
            &long,
        )
        .with_position(
            Chain::Arbitrum,
            PositionKey::new(account, wbtc.address.clone(), usdc.address.clone(), Side::Short),
            &short,
        )
        .with_price(Chain::Arbitrum, &weth.address, Q30::from_units(2100), Q30::from_units(2101))
        .with_price(Chain::Arbitrum, &wbtc.address, Q30::from_units(56_990), Q30::from_units(57_000))
        .with_price(Chain::Arbitrum, &usdc.address, Q30::from_units(1), Q30::from_units(1)))
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
