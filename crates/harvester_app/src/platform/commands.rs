use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use engine_logging::engine_info;
use harvester_core::query::{find_by_id, paginate, search, RecordFilter};
use harvester_core::Record;
use harvester_engine::{
    load_corpus, load_records, FetchSettings, FileStore, Harvester, HarvestSettings,
    RevealOutcome, StaticPageBackend,
};

use super::cli::{Command, QueryArgs};

pub(crate) async fn execute(
    command: Command,
    settings: HarvestSettings,
    store_dir: &Path,
) -> anyhow::Result<()> {
    let store = Arc::new(FileStore::new(store_dir));
    match command {
        Command::Initial { target } => {
            let target = target.unwrap_or(settings.initial_target);
            let harvester = build_harvester(settings, store)?;
            let harvest = harvester.initial_harvest(target).await?;
            println!(
                "seeded corpus with {} records ({} after {} steps)",
                harvest.records.len(),
                harvest.poll.termination,
                harvest.poll.steps
            );
        }
        Command::More => {
            let harvester = build_harvester(settings, store)?;
            let harvest = harvester.incremental_harvest().await?;
            let note = match &harvest.reveal {
                RevealOutcome::Revealed { range } => {
                    format!("{} new items revealed", range.len())
                }
                RevealOutcome::ControlNotFound { .. } => "no reveal-more control".to_string(),
                RevealOutcome::NoNewItems { .. } => "control revealed nothing".to_string(),
            };
            println!(
                "added {} of {} extracted; corpus now {} records ({note})",
                harvest.added,
                harvest.extracted,
                harvest.corpus.products.len()
            );
        }
        Command::Status => match load_corpus(store.as_ref())? {
            Some(corpus) => {
                println!("records:     {}", corpus.total_products);
                println!("source:      {}", corpus.source);
                println!("scraped at:  {}", corpus.scraped_at);
                println!("provenance:  {}", corpus.provenance.as_str());
                println!("version:     {}", corpus.scraper_version);
                if let Some(added) = corpus.new_products_added {
                    println!("last added:  {added}");
                }
            }
            None => println!("no corpus stored in {}", store_dir.display()),
        },
        Command::Query(args) => {
            let records = load_records(store.as_ref())?;
            print_query(&records, &args);
        }
        Command::Show { id } => {
            let records = load_records(store.as_ref())?;
            let Some(record) = find_by_id(&records, &id) else {
                bail!("no record with id {id:?}");
            };
            let json = serde_json::to_string_pretty(record).context("encoding record")?;
            println!("{json}");
        }
    }
    Ok(())
}

fn build_harvester(settings: HarvestSettings, store: Arc<FileStore>) -> anyhow::Result<Harvester> {
    engine_info!("harvesting {}", settings.target_url);
    let backend = Arc::new(StaticPageBackend::new(FetchSettings::default()));
    Harvester::new(settings, backend, store).context("invalid harvest settings")
}

fn print_query(records: &[Record], args: &QueryArgs) {
    let filter = RecordFilter {
        brand: args.brand.clone(),
        min_price: args.min_price,
        max_price: args.max_price,
        min_rating: args.rating,
    };
    let candidates = match args.q.as_deref() {
        Some(q) => search(records, q),
        None => records.iter().collect(),
    };
    let matched: Vec<&Record> = candidates
        .into_iter()
        .filter(|record| filter.matches(record))
        .collect();
    let page = paginate(&matched, args.page, args.limit);

    for record in page.items {
        println!(
            "{:<14} {:<10} {:>10} {:>4}  {}",
            record.id,
            record.brand,
            record.current_price.as_deref().unwrap_or("-"),
            record.rating.as_deref().unwrap_or("-"),
            record.title
        );
    }
    println!(
        "page {}/{} ({} matches){}{}",
        page.page,
        page.total_pages.max(1),
        page.total,
        if page.has_prev { ", prev" } else { "" },
        if page.has_next { ", next" } else { "" }
    );
}
