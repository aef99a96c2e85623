use std::path::PathBuf;
use std::rc::Rc;

use clap::Args;

use profilequiz_core::storage::sessions::file_stem;
use profilequiz_core::{
    AbortSignal, Dictionary, DocumentExporter, NoopHost, Quiz, QuizConfig, SessionStore,
};

#[derive(Args)]
pub struct ExportArgs {
    /// Quiz content file (JSON)
    content: PathBuf,
    /// Content id of the stored session (defaults to the file stem)
    #[arg(long)]
    id: Option<String>,
    /// Output directory
    #[arg(short, long, default_value = ".")]
    out: PathBuf,
}

pub fn run(args: ExportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let content = super::load_content(&args.content)?;
    let id = super::content_id_for(&args.content, args.id);
    let previous = SessionStore::open()?
        .load(&id)
        .ok_or_else(|| format!("no stored session for {id}"))?;

    let mut quiz = Quiz::new(
        content,
        QuizConfig::load_or_default(),
        Rc::new(NoopHost::new(id.clone())),
        Rc::new(Dictionary::default()),
        Some(previous),
    );
    if quiz.config().behaviour.delegate_run {
        quiz.run();
    }
    let elements = quiz.export_elements()?;

    let exporter = DocumentExporter::new(args.out);
    let runtime = tokio::runtime::Runtime::new()?;
    let filename = file_stem(&id);
    let path = runtime.block_on(exporter.export(&elements, Some(&filename), &AbortSignal::new()))?;

    println!("exported: {}", path.display());
    Ok(())
}
