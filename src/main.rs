use anyhow::Result;
use redpulse::{Enricher, FsStore, NdjsonDirSource, PipelineOptions, RedditPipeline};
use std::fs;
use std::path::PathBuf;

const SOURCE_ROOT: &str = "./data/sources";
const STORE_ROOT: &str = "./data/buckets";

fn main() -> Result<()> {
    let source_dir = PathBuf::from(SOURCE_ROOT);
    let store_dir = PathBuf::from(STORE_ROOT);
    fs::create_dir_all(&store_dir)?;

    let hw = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4);
    let opts = PipelineOptions::from_env().with_fetch_concurrency(hw.min(8));

    let pipeline = RedditPipeline::from_options(opts).progress(true);
    let store = FsStore::new(&store_dir);
    let source = NdjsonDirSource::new(&source_dir);

    let fetched = pipeline.fetch_partitions(&source, &store);
    println!("fetch [{}]: {}", fetched.status_code(), fetched.body());

    let report = pipeline.transform(&store)?;
    println!(
        "transform: {} objects, {} rows, {} record failures, {} object failures",
        report.written.len(),
        report.rows_written(),
        report.record_failures.len(),
        report.object_failures.len()
    );

    let tagged = pipeline.merge_and_tag(&store, &Enricher::lexicon());
    println!("merge_and_tag: {}", tagged.to_json());

    Ok(())
}
