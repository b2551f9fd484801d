//! Book processing pipeline.
//!
//! ```text
//! Book pages
//!     ↓ rasterize + LayoutDetector
//! DetectedRegion[]
//!     ↓ ReadingOrderStrategy
//! ordered regions ─→ place (PageFrame) ─→ resolve (text, fonts)
//!     ↓ PreTracker
//! raw/<ch>.json ──→ FontClassifier ──→ fonts stored in BookConfig
//!     ↓ JoinTracker
//! clean/<ch>.json
//! ```
//!
//! Each stage reads the previous stage's files, so font classification and
//! joining can be rerun without detecting pages again.
//!
//! Faults are contained: a failing page is skipped, a failing chapter is
//! skipped, and only configuration errors end a run.

pub mod source;

pub use source::{BookSource, LayoutDetector, PageSource};

use crate::config::BookConfig;
use crate::error::{Error, Result};
use crate::fonts::{FontClassification, FontClassifier, FontHistogram, FontTally, Glyph};
use crate::geometry::{BBox, PageFrame};
use crate::layout::{create_strategy, DetectedRegion, ReadingOrderStrategy, ResolvedRegion};
use crate::tracker::{CaptionLinker, JoinOutcome, JoinTracker, PreTracker, TrackerEntry};
use image::{DynamicImage, GenericImageView};
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Output layout of one book.
///
/// ```text
/// <root>/raw/<ch>.json
/// <root>/clean/<ch>.json
/// <root>/imgs/<ch>/<pg>-<label>.png
/// <root>/imgs/<ch>/<ref>.txt
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookPaths {
    /// Book output directory
    pub root: PathBuf,
    /// Raw chapter documents
    pub raw: PathBuf,
    /// Clean chapter documents
    pub clean: PathBuf,
    /// Figure crops and caption sidecars
    pub imgs: PathBuf,
}

impl BookPaths {
    /// Paths under `<out_dir>/<stem>`.
    pub fn new(out_dir: impl AsRef<Path>, stem: &str) -> Self {
        let root = out_dir.as_ref().join(stem);
        Self {
            raw: root.join("raw"),
            clean: root.join("clean"),
            imgs: root.join("imgs"),
            root,
        }
    }

    /// Create every output directory.
    pub fn create_all(&self) -> Result<()> {
        for dir in [&self.root, &self.raw, &self.clean, &self.imgs] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Raw document of a chapter.
    pub fn raw_chapter(&self, chapter: usize) -> PathBuf {
        self.raw.join(format!("{}.json", chapter))
    }

    /// Clean document of a chapter.
    pub fn clean_chapter(&self, chapter: usize) -> PathBuf {
        self.clean.join(format!("{}.json", chapter))
    }

    /// Figure and caption directory of a chapter.
    pub fn image_dir(&self, chapter: usize) -> PathBuf {
        self.imgs.join(chapter.to_string())
    }
}

/// Per-chapter outcome counts of a clean run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanStats {
    /// Records read
    pub records: usize,
    /// Blocks written
    pub blocks: usize,
    /// Records appended to a previous block
    pub merged: usize,
    /// Records dropped
    pub dropped: usize,
}

/// Drives the three passes over one book.
pub struct BookPipeline {
    config: BookConfig,
    paths: BookPaths,
    strategy: Box<dyn ReadingOrderStrategy>,
}

impl BookPipeline {
    /// Create a pipeline writing under `paths`.
    pub fn new(config: BookConfig, paths: BookPaths) -> Self {
        let strategy = create_strategy(&config.columns);
        Self {
            config,
            paths,
            strategy,
        }
    }

    /// Book configuration.
    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    /// Output paths.
    pub fn paths(&self) -> &BookPaths {
        &self.paths
    }

    /// Detect and extract every chapter, writing `raw/<ch>.json`.
    ///
    /// Chapters are the configured page ranges of `book`; without them the
    /// whole book is one chapter. With `extract_figs`, figure and table
    /// regions are also saved as image crops and captions are linked to
    /// them, each caption written as a sidecar text file. Returns the number
    /// of chapters written.
    pub fn extract_raw<B: BookSource>(
        &self,
        book: &B,
        detector: &dyn LayoutDetector,
        extract_figs: bool,
    ) -> Result<usize> {
        let chapters: Vec<(&B, Range<usize>)> = match &self.config.chapters {
            Some(ranges) => ranges.iter().map(|&(start, end)| (book, start..end)).collect(),
            None => {
                log::info!("No chapter ranges configured; reading the book as one chapter");
                vec![(book, 0..book.page_count())]
            },
        };
        self.extract_chapters(&chapters, detector, extract_figs)
    }

    /// Detect and extract a book stored as one source per chapter.
    ///
    /// Chapter `n` is every page of `chapters[n - 1]`. The configuration must
    /// not set chapter ranges.
    pub fn extract_raw_chapters<B: BookSource>(
        &self,
        chapters: &[B],
        detector: &dyn LayoutDetector,
        extract_figs: bool,
    ) -> Result<usize> {
        if self.config.chapters.is_some() {
            return Err(Error::InvalidConfig(
                "chapter ranges are set for a book split into chapter files".to_string(),
            ));
        }
        let chapters: Vec<(&B, Range<usize>)> = chapters
            .iter()
            .map(|book| (book, 0..book.page_count()))
            .collect();
        self.extract_chapters(&chapters, detector, extract_figs)
    }

    fn extract_chapters<B: BookSource>(
        &self,
        chapters: &[(&B, Range<usize>)],
        detector: &dyn LayoutDetector,
        extract_figs: bool,
    ) -> Result<usize> {
        self.paths.create_all()?;
        let count = chapters.len();
        let mut written = 0;

        for (ch, (book, range)) in (1..).zip(chapters) {
            log::info!("Processing chapter {}/{}", ch, count);
            match self.extract_chapter(*book, range.clone(), ch, detector, extract_figs) {
                Ok(tracker) => {
                    tracker.to_file(self.paths.raw_chapter(ch))?;
                    log::info!("Chapter {}: {} raw records", ch, tracker.len());
                    written += 1;
                },
                Err(e) => log::error!("Chapter {} skipped: {}", ch, e),
            }
        }
        Ok(written)
    }

    fn extract_chapter<B: BookSource>(
        &self,
        book: &B,
        range: Range<usize>,
        ch: usize,
        detector: &dyn LayoutDetector,
        extract_figs: bool,
    ) -> Result<PreTracker> {
        let pages = book.page_count();
        let range = if range.end > pages {
            log::warn!(
                "Chapter {}: pages {}..{} run past the last page ({})",
                ch,
                range.start,
                range.end,
                pages
            );
            range.start.min(pages)..pages
        } else {
            range
        };

        let mut tracker = PreTracker::new();
        let mut linker = CaptionLinker::new(self.config.join.caption_gap);
        let img_dir = self.paths.image_dir(ch);
        if extract_figs {
            fs::create_dir_all(&img_dir)?;
        }

        for index in range {
            let page = match book.page(index) {
                Ok(page) => page,
                Err(e) => {
                    log::error!("Page index {} unavailable: {}", index, e);
                    continue;
                },
            };
            linker.reset();
            let result = if self.config.use_text_layer {
                self.extract_text_layer(&page)
            } else {
                let figs = extract_figs.then_some(img_dir.as_path());
                self.extract_page(&page, detector, &mut linker, figs)
            };
            match result {
                Ok(entries) => tracker.extend(entries),
                Err(e) => log::error!("Page {} skipped: {}", page.number(), e),
            }
        }
        Ok(tracker)
    }

    /// Detect, order, place and resolve the regions of one page.
    pub fn resolve_page<P: PageSource>(
        &self,
        page: &P,
        detector: &dyn LayoutDetector,
    ) -> Result<(PageFrame, DynamicImage, Vec<ResolvedRegion>)> {
        let image = page.rasterize(self.config.detector.resolution)?;
        let (w_im, h_im) = image.dimensions();
        let (w_pg, h_pg) = page.size();
        let frame = PageFrame::new(w_im as f32, h_im as f32, w_pg, h_pg);

        let mut regions = Vec::new();
        for detection in detector.detect(&image)? {
            match DetectedRegion::from_detection(&detection) {
                Ok(region) => regions.push(region),
                Err(Error::UnknownLabel(name)) => {
                    log::warn!("Page {}: ignoring region with label {:?}", page.number(), name);
                },
                Err(e) => return Err(e),
            }
        }

        let ordered = self.strategy.apply(regions, frame.image_width);
        log::debug!(
            "Page {}: {} regions ({} left) via {}",
            page.number(),
            ordered.regions.len(),
            ordered.split,
            self.strategy.name()
        );

        let placed = ordered
            .regions
            .into_iter()
            .map(|region| region.place(&frame, self.config.detector.box_pad))
            .collect::<Result<Vec<_>>>()?;

        let mut resolved = Vec::with_capacity(placed.len());
        for region in placed {
            if region.region.label.is_image() {
                resolved.push(region.resolve(None, FontHistogram::new()));
                continue;
            }
            let text = page.extract_text(&region.page_bbox)?;
            let fonts = self.histogram(&page.extract_glyphs(&region.page_bbox)?);
            resolved.push(region.resolve(Some(text), fonts));
        }
        Ok((frame, image, resolved))
    }

    /// Records of one page; nothing is kept from a page that fails.
    fn extract_page<P: PageSource>(
        &self,
        page: &P,
        detector: &dyn LayoutDetector,
        linker: &mut CaptionLinker,
        img_dir: Option<&Path>,
    ) -> Result<Vec<TrackerEntry>> {
        let pg = page.number();
        let (frame, image, regions) = self.resolve_page(page, detector)?;
        let mut entries = Vec::with_capacity(regions.len());

        for region in regions {
            let label = region.region.label;
            let id = region.region.id;
            let rel = frame.relative(&region.page_bbox);
            let mut label_type = label.to_string();

            if let Some(dir) = img_dir {
                if label.is_image() {
                    let crop_path = dir.join(format!("{}-{}.png", pg, id));
                    save_crop(&image, &frame, &region.page_bbox, &crop_path)?;
                }
                if let Some(reference) = linker.link(pg, Some(&label_type), region.text(), Some(rel)) {
                    fs::write(dir.join(format!("{}.txt", reference)), region.text())?;
                    label_type = CaptionLinker::caption_tag(&reference);
                }
            }

            let txt = region.text().to_string();
            let entry =
                TrackerEntry::new(pg, Some(label_type), id, txt, region.fonts).with_bbox(Some(rel));
            linker.observe(&entry);
            entries.push(entry);
        }
        Ok(entries)
    }

    fn extract_text_layer<P: PageSource>(&self, page: &P) -> Result<Vec<TrackerEntry>> {
        let pg = page.number();
        let (w_pg, h_pg) = page.size();
        let frame = PageFrame::new(w_pg, h_pg, w_pg, h_pg);
        let mut entries = Vec::new();

        for (index, bbox) in page.text_boxes()?.iter().enumerate() {
            let txt = page.extract_text(bbox)?;
            if txt.trim().is_empty() {
                log::debug!("Page {}: text box {} has no text", pg, index);
                continue;
            }
            let fonts = self.histogram(&page.extract_glyphs(bbox)?);
            let rel = frame.relative(bbox);
            entries.push(TrackerEntry::new(pg, None, index, txt, fonts).with_bbox(Some(rel)));
        }
        Ok(entries)
    }

    fn histogram(&self, glyphs: &[Glyph]) -> FontHistogram {
        FontHistogram::from_glyphs(glyphs, self.config.size_bucket, self.config.clean_font_names)
    }

    /// Chapters the font and clean passes read, numbered from 1.
    ///
    /// These are the configured chapter ranges, or without them every
    /// `raw/<n>.json` on disk.
    pub fn chapters(&self) -> Vec<usize> {
        if self.config.chapters.is_some() {
            return (1..=self.config.chapter_count()).collect();
        }
        let Ok(dir) = fs::read_dir(&self.paths.raw) else {
            return Vec::new();
        };
        let mut found: Vec<usize> = dir
            .filter_map(|item| item.ok().map(|item| item.path()))
            .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("json"))
            .filter_map(|path| path.file_stem()?.to_str()?.parse().ok())
            .collect();
        found.sort_unstable();
        found
    }

    /// Sum the fonts of every raw chapter by record kind.
    ///
    /// Chapters whose raw document cannot be read are skipped.
    pub fn tally_fonts(&self) -> FontTally {
        let mut tally = FontTally::new();
        for ch in self.chapters() {
            let path = self.paths.raw_chapter(ch);
            match TrackerEntry::read_all(&path) {
                Ok(entries) => {
                    for entry in &entries {
                        tally.add(entry.label_type.as_deref(), &entry.fonts);
                    }
                },
                Err(e) => log::error!("Chapter {} skipped ({}): {}", ch, path.display(), e),
            }
        }
        tally
    }

    /// Learn the font classification and store it in the configuration.
    ///
    /// Returns `None` without doing anything when fonts are already stored
    /// and `overwrite` is false.
    pub fn determine_fonts(&mut self, cutoff: f64, overwrite: bool) -> Result<Option<FontClassification>> {
        let classifier = FontClassifier::new(cutoff)?;
        if self.config.fonts().is_some() && !overwrite {
            log::info!("Book already has fonts stored; keeping them");
            return Ok(None);
        }

        let tally = self.tally_fonts();
        log::info!("Font usage:\n{}", tally.report());

        let fonts = classifier.classify(&tally)?;
        self.config.write_fonts(fonts.clone())?;
        Ok(Some(fonts))
    }

    /// Join every raw chapter into `clean/<ch>.json`.
    ///
    /// Linked captions are written as sidecars in the chapter's image
    /// directory. Chapters that fail are logged and skipped.
    pub fn clean_raw(&self) -> Result<Vec<(usize, CleanStats)>> {
        fs::create_dir_all(&self.paths.clean)?;
        let mut done = Vec::new();
        for ch in self.chapters() {
            match self.clean_chapter(ch) {
                Ok(stats) => {
                    log::info!(
                        "Chapter {}: {} records -> {} blocks ({} merged, {} dropped)",
                        ch,
                        stats.records,
                        stats.blocks,
                        stats.merged,
                        stats.dropped
                    );
                    done.push((ch, stats));
                },
                Err(e) => log::error!("Chapter {} skipped: {}", ch, e),
            }
        }
        Ok(done)
    }

    fn clean_chapter(&self, ch: usize) -> Result<CleanStats> {
        let entries = TrackerEntry::read_all(self.paths.raw_chapter(ch))?;
        let mut tracker = JoinTracker::from_config(&self.config);
        let mut stats = CleanStats {
            records: entries.len(),
            ..CleanStats::default()
        };

        for entry in entries {
            match tracker.add_raw(entry) {
                JoinOutcome::Committed(_) => {},
                JoinOutcome::Merged(_) => stats.merged += 1,
                JoinOutcome::Dropped(_) => stats.dropped += 1,
            }
        }
        stats.blocks = tracker.entries().len();

        tracker.to_file(self.paths.clean_chapter(ch))?;
        tracker.write_captions(self.paths.image_dir(ch))?;
        Ok(stats)
    }
}

/// Save the part of a rendered page covered by a page-space box.
fn save_crop(image: &DynamicImage, frame: &PageFrame, bbox: &BBox, path: &Path) -> Result<()> {
    let sx = frame.image_width / frame.page_width;
    let sy = frame.image_height / frame.page_height;

    let x0 = (bbox.x0 * sx).max(0.0).floor() as u32;
    let y0 = (bbox.y0 * sy).max(0.0).floor() as u32;
    let x1 = ((bbox.x1 * sx).ceil() as u32).min(image.width());
    let y1 = ((bbox.y1 * sy).ceil() as u32).min(image.height());
    if x1 <= x0 || y1 <= y0 {
        log::warn!("Figure crop {} is outside the page image", path.display());
        return Ok(());
    }

    image.crop_imm(x0, y0, x1 - x0, y1 - y0).save(path)?;
    Ok(())
}
