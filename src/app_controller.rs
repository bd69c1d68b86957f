use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use lopdf::Document;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::app_config::{Config, JobConfig, TranslateRequest, MIN_TIMEOUT_SECONDS};
use crate::errors::AppError;
use crate::language_utils;
use crate::providers::{ChatTransport, HttpTransport};
use crate::render::fonts::{
    load_font_for_language, BuiltinFontLoader, FontDirectoryLoader, FontLoader,
};
use crate::render::pdf::{extract_page_texts, load_document, source_page_sizes, PdfOutput};
use crate::render::Renderer;
use crate::translation::TranslationService;

// @module: Application controller for PDF translation

/// Outcome of one translation job
#[derive(Debug, Clone, PartialEq)]
pub struct JobSummary {
    // @field: Pages read from the source document
    pub source_pages: usize,
    // @field: Pages written to the output document
    pub output_pages: usize,
    // @field: Time spent waiting on the provider
    pub translation_time: Duration,
    // @field: Wall time of the whole job
    pub total_time: Duration,
}

/// Default output path: `<stem>_translated.pdf` next to the input
pub fn default_output_path(input_file: &Path) -> PathBuf {
    let stem = input_file
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    input_file.with_file_name(format!("{}_translated.pdf", stem))
}

/// Main application controller for PDF translation
pub struct Controller<T: ChatTransport = HttpTransport> {
    // @field: App configuration
    config: Config,
    // @field: Translation service over the job transport
    service: TranslationService<T>,
    // @field: Source of the job font
    font_loader: Box<dyn FontLoader + Send + Sync>,
    // @field: Whether to draw a progress bar on stderr
    show_progress: bool,
}

impl Controller<HttpTransport> {
    // @method: Create a new controller that talks to providers over HTTP
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        let connect_timeout =
            Duration::from_secs(config.llm.request_timeout_seconds.max(MIN_TIMEOUT_SECONDS));
        let transport = HttpTransport::new(connect_timeout)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: ChatTransport> Controller<T> {
    /// Create a controller over an explicit transport.
    ///
    /// Fonts come from the configured font directory, or Helvetica when
    /// none is set.
    pub fn with_transport(config: Config, transport: T) -> Self {
        let font_loader: Box<dyn FontLoader + Send + Sync> = match &config.font_directory {
            Some(directory) => Box::new(FontDirectoryLoader::new(directory.clone())),
            None => Box::new(BuiltinFontLoader),
        };
        Self {
            config,
            service: TranslationService::new(transport),
            font_loader,
            show_progress: false,
        }
    }

    /// Enable or disable the progress bar
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn service(&self) -> &TranslationService<T> {
        &self.service
    }

    /// Translate a PDF file into a new PDF file
    pub async fn translate_file(
        &self,
        input_file: &Path,
        output_file: &Path,
        request: &TranslateRequest,
    ) -> Result<JobSummary, AppError> {
        if !input_file.is_file() {
            return Err(AppError::File(format!(
                "Input file does not exist: {}",
                input_file.display()
            )));
        }

        let source = load_document(input_file)?;
        let (mut output, summary) = self.translate_document(&source, request).await?;

        if let Some(parent) = output_file.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        output.save(output_file)?;

        info!(
            "Success: {} ({} pages -> {} pages) in {}",
            output_file.display(),
            summary.source_pages,
            summary.output_pages,
            Self::format_duration(summary.total_time)
        );
        Ok(summary)
    }

    /// Translate a loaded document and render the result in memory
    pub async fn translate_document(
        &self,
        source: &Document,
        request: &TranslateRequest,
    ) -> Result<(PdfOutput, JobSummary), AppError> {
        let start_time = Instant::now();
        let job = JobConfig::resolve(&self.config.llm, request)?;

        let pages = extract_page_texts(source);
        let sizes = source_page_sizes(source);
        debug!("Extracted {} pages from source document", pages.len());

        info!(
            "{} - {} -> {}",
            job.provider.display_name(),
            job.model,
            language_utils::language_name(&job.target_language)
                .unwrap_or_else(|| job.target_language.clone())
        );

        let progress_bar = self.progress_bar();
        let pb = progress_bar.clone();
        let translation_start = Instant::now();
        let translations = self
            .service
            .translate_pages(&pages, &job, move |completed, total| {
                pb.set_length(total as u64);
                pb.set_position(completed as u64);
            })
            .await;
        progress_bar.finish_and_clear();
        let translations = translations?;
        let translation_time = translation_start.elapsed();

        let font = load_font_for_language(self.font_loader.as_ref(), &job.target_language)?;
        let renderer = Renderer::new(font.clone(), job.font_size)
            .include_original_text(job.include_original_text);
        let mut output = PdfOutput::new(font)?;
        let output_pages = renderer.render(&mut output, &pages, &translations, &sizes)?;

        let summary = JobSummary {
            source_pages: pages.len(),
            output_pages,
            translation_time,
            total_time: start_time.elapsed(),
        };
        Ok((output, summary))
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let progress_bar = ProgressBar::new(0);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar.set_message("Translating");
        progress_bar
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
