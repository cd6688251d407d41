use crate::container::PptxContainer;
use crate::layout::LayoutPlaceholderMap;
use crate::media::{MediaRegistry, MediaWriter};
use crate::parser_config::ParserConfig;
use crate::slide::extract_slide;
use crate::types::{DeckReport, SlideReport};
use crate::{Error, Result};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::Path;

/// A slide captured before fan-out: its position and the part names it depends on.
#[derive(Debug, Clone)]
struct SlideTask {
    slide_number: usize,
    slide_path: String,
    layout_path: Option<String>,
}

/// Extracts every slide of the presentation at `path` on a bounded rayon pool.
///
/// The run happens in two phases:
/// 1. Sequentially, the slide list is resolved and the placeholder map of every
///    distinct layout is built into a read-only cache.
/// 2. In parallel, the slides are split into one contiguous chunk per worker.
///    Each chunk opens its own container handle and processes its slides,
///    addressed by part name. Reports land in pre-sized slots indexed by slide
///    number, so scheduling never changes the order.
///
/// A slide that fails is reported with only its number and `error` set; the
/// rest of the deck is unaffected. Images default to content-hash naming, which
/// deduplicates byte-identical pictures across the whole deck.
///
/// # Errors
///
/// Only failures to open the container or resolve its slide list are returned,
/// as well as a failure to start the worker pool.
pub fn parse_all_parallel(path: &Path, config: &ParserConfig) -> Result<DeckReport> {
    let mut container = PptxContainer::open(path, config.clone())?;
    let file = container.file_name();

    let mut layouts: HashMap<String, LayoutPlaceholderMap> = HashMap::new();
    let mut tasks = Vec::with_capacity(container.slide_count());
    for (index, slide_path) in container.slide_paths.clone().into_iter().enumerate() {
        let layout_path = container.layout_path_for(&slide_path);
        if let Some(layout_path) = &layout_path {
            if !layouts.contains_key(layout_path) {
                let map = container.build_layout_map(layout_path);
                layouts.insert(layout_path.clone(), map);
            }
        }
        tasks.push(SlideTask { slide_number: index + 1, slide_path, layout_path });
    }
    drop(container);

    tracing::info!(
        file = %file,
        slides = tasks.len(),
        layouts = layouts.len(),
        workers = config.max_concurrency,
        "Extracting presentation inventory in parallel"
    );

    let registry = MediaRegistry::new();
    let empty_layout = LayoutPlaceholderMap::default();
    let writer = MediaWriter::new(&config.media_dir, config.naming(true), config.embed_images, &registry);
    let media = config.extract_images.then_some(&writer);

    let pool = rayon::ThreadPoolBuilder::new().num_threads(config.max_concurrency).build()?;
    let mut slots: Vec<Option<SlideReport>> = vec![None; tasks.len()];

    let chunk_size = chunk_len(tasks.len(), config.max_concurrency);
    pool.install(|| {
        slots.par_chunks_mut(chunk_size).zip(tasks.par_chunks(chunk_size)).for_each(|(slots, tasks)| {
            let mut worker = PptxContainer::open(path, config.clone());
            for (slot, task) in slots.iter_mut().zip(tasks) {
                let layout = task.layout_path.as_ref().and_then(|l| layouts.get(l)).unwrap_or(&empty_layout);
                let report = match &mut worker {
                    Ok(container) => extract_slide(container, task.slide_number, &task.slide_path, layout, media)
                        .unwrap_or_else(|e| failed_slide(task, &e)),
                    Err(e) => failed_slide(task, e),
                };
                *slot = Some(report);
            }
        });
    });

    let slides = slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| slot.unwrap_or_else(|| SlideReport::failed(index + 1, "slide was not processed".into())))
        .collect();

    Ok(DeckReport::new(file, slides))
}

/// Slides per worker chunk: at most one chunk per worker, never empty.
fn chunk_len(slides: usize, workers: usize) -> usize {
    slides.div_ceil(workers.max(1)).max(1)
}

fn failed_slide(task: &SlideTask, error: &Error) -> SlideReport {
    tracing::warn!(slide = task.slide_number, part = %task.slide_path, error = %error, "Slide extraction failed");
    SlideReport::failed(task.slide_number, error.to_string())
}
