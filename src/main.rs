//! Headless driver: load a document, replay a gesture script, write the export.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::{Path, PathBuf};

    use anyhow::{Context, Result, bail};
    use clap::Parser;
    use ritease::upload::mime_from_extension;
    use ritease::{Annotator, AnnotatorConfig, ExportFormat, FileKind, GestureScript};

    #[derive(Debug, Parser)]
    #[command(name = "ritease-native")]
    #[command(about = "Annotate a PDF or image from a gesture script and export it")]
    pub struct Cli {
        /// PDF or image to annotate
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Gesture script (JSON) to replay
        #[arg(long, value_name = "S")]
        script: Option<PathBuf>,

        /// Configuration file (JSON)
        #[arg(long, value_name = "C")]
        config: Option<PathBuf>,

        /// Export format (png or pdf); defaults by document type
        #[arg(long)]
        format: Option<ExportFormat>,

        /// Output directory
        #[arg(long, value_name = "DIR", default_value = ".")]
        out: PathBuf,

        /// Also write the current-page overlay as SVG
        #[arg(long, value_name = "PATH")]
        overlay_svg: Option<PathBuf>,

        /// Also dump all annotations as JSON
        #[arg(long, value_name = "PATH")]
        annotations_json: Option<PathBuf>,
    }

    pub fn run() -> Result<()> {
        let cli = Cli::parse();

        let config = match &cli.config {
            Some(path) => AnnotatorConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => AnnotatorConfig::default(),
        };
        init_logging(&config);

        let path = annotate(&cli, config)?;
        println!("{}", path.display());
        Ok(())
    }

    /// Load, replay and export; returns the written artifact path.
    fn annotate(cli: &Cli, config: AnnotatorConfig) -> Result<PathBuf> {
        let mime = mime_from_extension(&cli.file).unwrap_or("application/octet-stream");
        let bytes = std::fs::read(&cli.file)
            .with_context(|| format!("failed to read {}", cli.file.display()))?;

        let mut annotator = Annotator::new(config);
        let upload = annotator.upload(mime, bytes);
        report_notifications(&mut annotator);
        upload.with_context(|| format!("cannot annotate {}", cli.file.display()))?;

        let (width, height) = default_viewport(&annotator)?;
        annotator.set_viewport(width, height);

        if let Some(path) = &cli.script {
            let script = GestureScript::load(path)
                .with_context(|| format!("failed to load script {}", path.display()))?;
            script.apply(&mut annotator);
        }

        if let Some(path) = &cli.annotations_json {
            write_file(path, annotator.annotations_json()?.as_bytes())?;
        }
        if let Some(path) = &cli.overlay_svg {
            write_file(path, annotator.overlay_svg()?.as_bytes())?;
        }

        let export = annotator.export_current_page(cli.format);
        report_notifications(&mut annotator);
        let artifact = export.context("export failed")?;

        artifact
            .write_to_dir(&cli.out)
            .with_context(|| format!("failed to write into {}", cli.out.display()))
    }

    fn init_logging(config: &AnnotatorConfig) {
        // RUST_LOG wins over the configured level
        env_logger::Builder::new()
            .filter_level(config.log_level.to_level_filter())
            .parse_default_env()
            .init();
    }

    /// Natural image size, or the configured page size for PDFs.
    fn default_viewport(annotator: &Annotator) -> Result<(f32, f32)> {
        let Some(doc) = annotator.document() else {
            bail!("no document loaded");
        };
        match doc.kind {
            FileKind::Image => {
                let image = image::load_from_memory(doc.bytes()).context("failed to decode image")?;
                Ok((image.width() as f32, image.height() as f32))
            }
            FileKind::Pdf => {
                let export = &annotator.config().export;
                Ok((export.pdf_page_width, export.pdf_page_height))
            }
        }
    }

    fn report_notifications(annotator: &mut Annotator) {
        for note in annotator.take_notifications() {
            if note.is_error() {
                log::error!("{}", note.message);
            } else {
                log::info!("{}", note.message);
            }
        }
    }

    fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(error) = native::run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

// WASM doesn't use main(), it uses wasm_bindgen's start function
#[cfg(target_arch = "wasm32")]
fn main() {}
